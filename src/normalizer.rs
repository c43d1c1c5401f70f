use chrono::{Duration, Utc};
use jsonschema::JSONSchema;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::warn;

// The three structured artifact shapes the model is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    MindMap,
    Timeline,
    SkillsGraph,
}

impl ArtifactKind {
    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::MindMap => "mind map",
            ArtifactKind::Timeline => "timeline",
            ArtifactKind::SkillsGraph => "skills graph",
        }
    }
}

/// Outcome of normalizing a structured model response. Both variants carry
/// valid JSON text; `Fallback` means the model's output was discarded and
/// replaced with the deterministic safety-net document.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Model(String),
    Fallback { document: String, reason: String },
}

impl Normalized {
    pub fn text(&self) -> &str {
        match self {
            Normalized::Model(text) => text,
            Normalized::Fallback { document, .. } => document,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Normalized::Model(text) => text,
            Normalized::Fallback { document, .. } => document,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Normalized::Fallback { .. })
    }
}

lazy_static! {
    static ref MIND_MAP_SCHEMA: JSONSchema = compile_schema(json!({
        "type": "object",
        "required": ["center", "main_branches"],
        "properties": {
            "center": {"type": "string"},
            "main_branches": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name", "sub_branches"],
                    "properties": {
                        "name": {"type": "string"},
                        "sub_branches": {"type": "array", "items": {"type": "string"}}
                    }
                }
            }
        }
    }));
    static ref TIMELINE_SCHEMA: JSONSchema = compile_schema(json!({
        "type": "object",
        "required": ["phases", "start_dates", "end_dates"],
        "properties": {
            "phases": {"type": "array", "items": {"type": "string"}},
            "start_dates": {"type": "array", "items": {"type": "string"}},
            "end_dates": {"type": "array", "items": {"type": "string"}},
            "descriptions": {"type": "array", "items": {"type": "string"}}
        }
    }));
    static ref SKILLS_GRAPH_SCHEMA: JSONSchema = compile_schema(json!({
        "type": "object",
        "required": ["nodes", "links"],
        "properties": {
            "nodes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id"],
                    "properties": {
                        "id": {"type": "string"},
                        "group": {"type": "integer"}
                    }
                }
            },
            "links": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["source", "target"],
                    "properties": {
                        "source": {"type": "string"},
                        "target": {"type": "string"},
                        "value": {"type": "integer"}
                    }
                }
            }
        }
    }));
    static ref LIST_MARKER: Regex =
        Regex::new(r"^\s*(?:\d+[.)]\s*|[-*]\s+)").expect("list marker pattern is valid");
}

fn compile_schema(schema: Value) -> JSONSchema {
    JSONSchema::compile(&schema).expect("artifact schema is valid")
}

fn schema_for(kind: ArtifactKind) -> &'static JSONSchema {
    match kind {
        ArtifactKind::MindMap => &MIND_MAP_SCHEMA,
        ArtifactKind::Timeline => &TIMELINE_SCHEMA,
        ArtifactKind::SkillsGraph => &SKILLS_GRAPH_SCHEMA,
    }
}

/// Remove a leading markdown code fence (optionally tagged "json") and a
/// trailing one. Only the first leading and last trailing markers are
/// touched; fences in the middle of the text are left alone.
pub fn strip_code_fences(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim().to_string()
}

/// Normalize a structured model response: strip fences, check that the
/// remainder is well-formed JSON of the expected shape, and hand back the
/// validated text unchanged. Anything that fails is replaced with the
/// artifact's fallback document; this function never errors.
pub fn normalize_structured(kind: ArtifactKind, raw: &str, project_title: &str) -> Normalized {
    match validate(kind, raw) {
        Ok(text) => Normalized::Model(text),
        Err(reason) => {
            warn!(
                artifact = kind.name(),
                %reason,
                "model output failed validation, substituting fallback"
            );
            Normalized::Fallback {
                document: fallback_document(kind, project_title),
                reason,
            }
        }
    }
}

fn validate(kind: ArtifactKind, raw: &str) -> Result<String, String> {
    let text = strip_code_fences(raw);
    let value: Value =
        serde_json::from_str(&text).map_err(|e| format!("invalid JSON: {}", e))?;
    if let Err(errors) = schema_for(kind).validate(&value) {
        let details: Vec<String> = errors.map(|e| e.to_string()).collect();
        return Err(format!("schema violation: {}", details.join("; ")));
    }
    // The validated string is returned as-is, not a re-serialization of the
    // parsed value, so the model's own formatting survives.
    Ok(text)
}

/// The deterministic safety-net document for an artifact kind. Always valid
/// JSON of the expected shape. Only the mind map interpolates the requested
/// project title; the other two are fixed.
pub fn fallback_document(kind: ArtifactKind, project_title: &str) -> String {
    match kind {
        ArtifactKind::MindMap => json!({
            "center": project_title,
            "main_branches": [
                {
                    "name": "Project Goals",
                    "sub_branches": ["Improve accuracy", "Increase efficiency", "Enhance user experience"]
                },
                {
                    "name": "Technologies",
                    "sub_branches": ["Python", "Data Science", "Machine Learning"]
                },
                {
                    "name": "Deliverables",
                    "sub_branches": ["Technical documentation", "Interactive dashboard", "Final report"]
                },
                {
                    "name": "Timeline",
                    "sub_branches": ["Planning phase", "Development phase", "Testing phase", "Deployment"]
                },
                {
                    "name": "Resources",
                    "sub_branches": ["Team members", "Computing resources", "Data sources"]
                }
            ]
        })
        .to_string(),
        ArtifactKind::Timeline => {
            let phases = [
                "Requirements Gathering",
                "Data Collection",
                "Model Development",
                "Testing",
                "Deployment",
            ];
            let durations = [15i64, 30, 45, 15, 15];

            let mut start_dates = Vec::with_capacity(phases.len());
            let mut end_dates = Vec::with_capacity(phases.len());
            let mut current = Utc::now().date_naive();
            for duration in durations {
                start_dates.push(current.format("%Y-%m-%d").to_string());
                current = current + Duration::days(duration);
                end_dates.push(current.format("%Y-%m-%d").to_string());
                // one day gap between phases
                current = current + Duration::days(1);
            }

            json!({
                "phases": phases,
                "start_dates": start_dates,
                "end_dates": end_dates,
                "descriptions": [
                    "Define project requirements and gather necessary resources.",
                    "Collect and preprocess relevant data from healthcare systems.",
                    "Develop and train machine learning models on the collected data.",
                    "Thoroughly test models and validate results against requirements.",
                    "Deploy the solution to production environment and monitor performance."
                ]
            })
            .to_string()
        }
        ArtifactKind::SkillsGraph => json!({
            "nodes": [
                {"id": "Python", "group": 1},
                {"id": "Data Analysis", "group": 1},
                {"id": "Machine Learning", "group": 1},
                {"id": "Healthcare Domain", "group": 2},
                {"id": "Data Visualization", "group": 1},
                {"id": "Project Management", "group": 3},
                {"id": "Communication", "group": 3},
                {"id": "Problem Solving", "group": 3}
            ],
            "links": [
                {"source": "Python", "target": "Data Analysis", "value": 3},
                {"source": "Python", "target": "Machine Learning", "value": 3},
                {"source": "Machine Learning", "target": "Healthcare Domain", "value": 2},
                {"source": "Data Analysis", "target": "Data Visualization", "value": 2},
                {"source": "Data Analysis", "target": "Healthcare Domain", "value": 2},
                {"source": "Project Management", "target": "Communication", "value": 1},
                {"source": "Problem Solving", "target": "Machine Learning", "value": 1}
            ]
        })
        .to_string(),
    }
}

const IDEA_STOPLIST: [&str; 3] = ["project", "here", "title"];

/// Filter the raw idea-list response down to the idea lines. Drops blank
/// lines and header lines ("Here are your ideas:", "Project ideas:", ...);
/// keeps the model's ordering. An empty result means "no ideas produced",
/// not an error.
pub fn filter_idea_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let lower = line.to_lowercase();
            !IDEA_STOPLIST.iter().any(|header| lower.starts_with(header))
        })
        .map(str::to_string)
        .collect()
}

/// Strip a leading list marker ("1.", "2)", "- ", "* ") from an idea line,
/// used when an idea is promoted to a project title.
pub fn strip_list_marker(line: &str) -> String {
    LIST_MARKER.replace(line, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MindMap, SkillsGraph, Timeline};

    #[test]
    fn test_strip_code_fences_json_tag() {
        let raw = "```json\n{\"center\": \"X\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"center\": \"X\"}");
    }

    #[test]
    fn test_strip_code_fences_untagged() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_code_fences_leaves_inner_fences() {
        let raw = "```json\n{\"text\": \"use ``` for code\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"text\": \"use ``` for code\"}");
    }

    #[test]
    fn test_strip_code_fences_no_fences() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_normalize_passes_through_validated_text() {
        // The exact inner text comes back, not a re-serialized value.
        let inner = "{\"center\": \"X\",  \"main_branches\": [{\"name\": \"A\", \"sub_branches\": [\"a\"]}]}";
        let raw = format!("```json\n{}\n```", inner);
        match normalize_structured(ArtifactKind::MindMap, &raw, "X") {
            Normalized::Model(text) => assert_eq!(text, inner),
            other => panic!("expected model output, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_invalid_json_falls_back() {
        let result = normalize_structured(ArtifactKind::Timeline, "not json at all", "X");
        assert!(result.is_fallback());
        let parsed: Timeline = serde_json::from_str(result.text()).unwrap();
        assert_eq!(parsed.phases.len(), 5);
        assert_eq!(parsed.phases.len(), parsed.start_dates.len());
        assert_eq!(parsed.phases.len(), parsed.end_dates.len());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_normalize_wrong_shape_falls_back() {
        // Valid JSON, but not the mind map shape.
        let result =
            normalize_structured(ArtifactKind::MindMap, "{\"foo\": \"bar\"}", "My Project");
        match result {
            Normalized::Fallback { document, reason } => {
                assert!(reason.contains("schema violation"));
                let parsed: MindMap = serde_json::from_str(&document).unwrap();
                assert_eq!(parsed.center, "My Project");
                assert!(!parsed.main_branches.is_empty());
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_mind_map_fallback_embeds_title() {
        let doc = fallback_document(ArtifactKind::MindMap, "Patient Flow Optimization");
        let parsed: MindMap = serde_json::from_str(&doc).unwrap();
        assert_eq!(parsed.center, "Patient Flow Optimization");
    }

    #[test]
    fn test_skills_graph_fallback_is_well_formed() {
        let doc = fallback_document(ArtifactKind::SkillsGraph, "ignored");
        let parsed: SkillsGraph = serde_json::from_str(&doc).unwrap();
        assert_eq!(parsed.nodes.len(), 8);
        assert_eq!(parsed.links.len(), 7);
        // Every link endpoint refers to an existing node.
        for link in &parsed.links {
            assert!(parsed.nodes.iter().any(|n| n.id == link.source));
            assert!(parsed.nodes.iter().any(|n| n.id == link.target));
        }
    }

    #[test]
    fn test_skills_graph_fallback_ignores_title() {
        assert_eq!(
            fallback_document(ArtifactKind::SkillsGraph, "A"),
            fallback_document(ArtifactKind::SkillsGraph, "B")
        );
    }

    #[test]
    fn test_filter_idea_lines() {
        let raw = "\n  \nHere are your ideas:\n1. Build a dashboard\nProject ideas:\n2. Analyze churn";
        assert_eq!(
            filter_idea_lines(raw),
            vec!["1. Build a dashboard".to_string(), "2. Analyze churn".to_string()]
        );
    }

    #[test]
    fn test_filter_idea_lines_empty_input() {
        assert!(filter_idea_lines("").is_empty());
        assert!(filter_idea_lines("Here are the results\nTitle: ideas\n").is_empty());
    }

    #[test]
    fn test_strip_list_marker() {
        assert_eq!(strip_list_marker("1. Build a dashboard"), "Build a dashboard");
        assert_eq!(strip_list_marker("12) Analyze churn"), "Analyze churn");
        assert_eq!(strip_list_marker("- Forecast demand"), "Forecast demand");
        assert_eq!(strip_list_marker("Plain title"), "Plain title");
    }
}
