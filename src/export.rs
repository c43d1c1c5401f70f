use crate::models::SavedProject;

/// Serialize the saved-project list as a pretty-printed JSON array. Parsing
/// the output reproduces the same records.
pub fn export_projects_json(projects: &[SavedProject]) -> Result<String, String> {
    serde_json::to_string_pretty(projects)
        .map_err(|e| format!("Failed to serialize projects: {}", e))
}

/// Render the saved-project list as one Markdown document: a headed section
/// per project, separated by horizontal rules.
pub fn export_projects_markdown(projects: &[SavedProject]) -> String {
    let mut markdown = String::new();
    for project in projects {
        markdown.push_str(&format!("# {}\n\n", project.title));
        markdown.push_str(&format!("**Job Role:** {}\n\n", project.job_title));
        markdown.push_str(&format!("**Industry:** {}\n\n", project.industry));
        markdown.push_str(&format!("**Tools:** {}\n\n", project.tools));
        markdown.push_str(&format!("**Saved on:** {}\n\n", project.date_saved));
        markdown.push_str(&format!("## Project Details\n\n{}\n\n", project.details));
        markdown.push_str("---\n\n");
    }
    markdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobProfile;

    fn sample_projects() -> Vec<SavedProject> {
        let profile = JobProfile::new("Data Analyst", "Python, SQL", "Retail");
        vec![
            SavedProject::new("Sales Dashboard", &profile, "Build a dashboard."),
            SavedProject::new("Churn Model", &profile, "Predict churn."),
        ]
    }

    #[test]
    fn test_json_export_round_trip() {
        let projects = sample_projects();
        let json = export_projects_json(&projects).unwrap();
        let parsed: Vec<SavedProject> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, projects);
    }

    #[test]
    fn test_json_export_empty_list() {
        let json = export_projects_json(&[]).unwrap();
        assert_eq!(json.trim(), "[]");
    }

    #[test]
    fn test_markdown_export_sections() {
        let projects = sample_projects();
        let markdown = export_projects_markdown(&projects);

        assert!(markdown.contains("# Sales Dashboard\n"));
        assert!(markdown.contains("# Churn Model\n"));
        assert!(markdown.contains("**Job Role:** Data Analyst\n"));
        assert!(markdown.contains("**Industry:** Retail\n"));
        assert!(markdown.contains("**Tools:** Python, SQL\n"));
        assert!(markdown.contains("## Project Details\n\nPredict churn.\n"));
        // One rule per project
        assert_eq!(markdown.matches("---\n").count(), 2);
    }

    #[test]
    fn test_markdown_export_empty_list() {
        assert!(export_projects_markdown(&[]).is_empty());
    }
}
