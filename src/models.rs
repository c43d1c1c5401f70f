use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// The three free-text fields every prompt is built from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobProfile {
    pub job_title: String,
    pub tools: String,
    pub industry: String,
}

impl JobProfile {
    pub fn new(job_title: &str, tools: &str, industry: &str) -> Self {
        Self {
            job_title: job_title.to_string(),
            tools: tools.to_string(),
            industry: industry.to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.job_title.trim().is_empty()
            && !self.tools.trim().is_empty()
            && !self.industry.trim().is_empty()
    }
}

// Define the structure for a mind map artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindMap {
    pub center: String,
    pub main_branches: Vec<Branch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub sub_branches: Vec<String>,
}

// Define the structure for a timeline artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub phases: Vec<String>,
    pub start_dates: Vec<String>,
    pub end_dates: Vec<String>,
    #[serde(default)]
    pub descriptions: Vec<String>,
}

impl Timeline {
    // Phase and date arrays must line up; descriptions may be shorter and
    // are padded with empty strings by the adapter.
    pub fn validate(&self) -> Result<(), String> {
        if self.phases.len() != self.start_dates.len() || self.phases.len() != self.end_dates.len()
        {
            return Err(format!(
                "mismatched lengths: {} phases, {} start dates, {} end dates",
                self.phases.len(),
                self.start_dates.len(),
                self.end_dates.len()
            ));
        }
        for date in self.start_dates.iter().chain(self.end_dates.iter()) {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| format!("invalid date '{}': {}", date, e))?;
        }
        Ok(())
    }
}

fn default_group() -> i64 {
    1
}

fn default_value() -> i64 {
    1
}

// Define the structure for a skills graph artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsGraph {
    #[serde(default)]
    pub nodes: Vec<SkillNode>,
    #[serde(default)]
    pub links: Vec<SkillLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillNode {
    pub id: String,
    #[serde(default = "default_group")]
    pub group: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillLink {
    pub source: String,
    pub target: String,
    #[serde(default = "default_value")]
    pub value: i64,
}

// A project the user chose to keep; only title/profile/details survive,
// derived artifacts are regenerated on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProject {
    pub title: String,
    pub job_title: String,
    pub tools: String,
    pub industry: String,
    pub details: String,
    pub date_saved: String,
}

impl SavedProject {
    pub fn new(title: &str, profile: &JobProfile, details: &str) -> Self {
        Self {
            title: title.to_string(),
            job_title: profile.job_title.clone(),
            tools: profile.tools.clone(),
            industry: profile.industry.clone(),
            details: details.to_string(),
            date_saved: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// A pre-authored project shown on the explore surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProject {
    pub title: String,
    pub role: String,
    pub industry: String,
    pub tools: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_completeness() {
        let profile = JobProfile::new("Data Analyst", "Python, SQL", "Healthcare");
        assert!(profile.is_complete());

        let partial = JobProfile::new("Data Analyst", "  ", "Healthcare");
        assert!(!partial.is_complete());
        assert!(!JobProfile::default().is_complete());
    }

    #[test]
    fn test_timeline_validation() {
        let timeline = Timeline {
            phases: vec!["A".to_string(), "B".to_string()],
            start_dates: vec!["2025-01-01".to_string(), "2025-02-01".to_string()],
            end_dates: vec!["2025-01-31".to_string(), "2025-02-28".to_string()],
            descriptions: vec![],
        };
        assert!(timeline.validate().is_ok());
    }

    #[test]
    fn test_timeline_length_mismatch() {
        let timeline = Timeline {
            phases: vec!["A".to_string(), "B".to_string()],
            start_dates: vec!["2025-01-01".to_string()],
            end_dates: vec!["2025-01-31".to_string()],
            descriptions: vec![],
        };
        assert!(timeline.validate().is_err());
    }

    #[test]
    fn test_timeline_bad_date() {
        let timeline = Timeline {
            phases: vec!["A".to_string()],
            start_dates: vec!["January 1st".to_string()],
            end_dates: vec!["2025-01-31".to_string()],
            descriptions: vec![],
        };
        assert!(timeline.validate().is_err());
    }

    #[test]
    fn test_skill_node_defaults() {
        let node: SkillNode = serde_json::from_str(r#"{"id": "Python"}"#).unwrap();
        assert_eq!(node.group, 1);

        let link: SkillLink =
            serde_json::from_str(r#"{"source": "Python", "target": "SQL"}"#).unwrap();
        assert_eq!(link.value, 1);
    }

    #[test]
    fn test_saved_project_fields() {
        let profile = JobProfile::new("Data Scientist", "R, SQL", "Finance");
        let project = SavedProject::new("Churn Model", &profile, "Some details");
        assert_eq!(project.title, "Churn Model");
        assert_eq!(project.job_title, "Data Scientist");
        assert_eq!(project.industry, "Finance");
        assert!(NaiveDate::parse_from_str(&project.date_saved[..10], "%Y-%m-%d").is_ok());
    }
}
