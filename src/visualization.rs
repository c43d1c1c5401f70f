use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::models::{MindMap, SkillsGraph, Timeline};

#[derive(Error, Debug)]
pub enum VizError {
    #[error("invalid artifact JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("inconsistent timeline data: {0}")]
    Shape(String),
    #[error("no valid nodes found in the skills data")]
    EmptyGraph,
}

// Fixed seed so the force-directed layout is reproducible across renders
pub const LAYOUT_SEED: u64 = 42;
const LAYOUT_ITERATIONS: usize = 50;

// Set3-style palette; node color is group modulo palette size
const GROUP_PALETTE: [&str; 10] = [
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
    "#d9d9d9", "#bc80bd",
];

/// One row of the Gantt-style timeline chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttRow {
    pub task: String,
    pub start: String,
    pub finish: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineChart {
    pub title: String,
    pub rows: Vec<GanttRow>,
    pub error: Option<String>,
}

/// Build the Gantt chart for a normalized timeline document. Parse or shape
/// errors come back as an error-annotated empty chart, never a panic.
pub fn create_project_timeline(timeline_json: &str) -> TimelineChart {
    match build_timeline_rows(timeline_json) {
        Ok(rows) => TimelineChart {
            title: "Project Timeline".to_string(),
            rows,
            error: None,
        },
        Err(e) => {
            warn!("Error creating timeline: {}", e);
            TimelineChart {
                title: "Project Timeline".to_string(),
                rows: Vec::new(),
                error: Some(format!("Error creating timeline: {}", e)),
            }
        }
    }
}

fn build_timeline_rows(timeline_json: &str) -> Result<Vec<GanttRow>, VizError> {
    let data: Timeline = serde_json::from_str(timeline_json)?;
    data.validate().map_err(VizError::Shape)?;

    let rows = data
        .phases
        .iter()
        .enumerate()
        .map(|(i, phase)| GanttRow {
            task: phase.clone(),
            start: data.start_dates[i].clone(),
            finish: data.end_dates[i].clone(),
            description: data.descriptions.get(i).cloned().unwrap_or_default(),
            color: phase_color(i),
        })
        .collect();

    Ok(rows)
}

// Deterministic per-phase color ramp, linear in the phase index
pub fn phase_color(index: usize) -> String {
    let i = index as i64;
    format!("rgb({}, {}, {})", 50 + i * 40, 100 + i * 20, 200 - i * 20)
}

pub fn group_color(group: i64) -> String {
    GROUP_PALETTE[group.rem_euclid(GROUP_PALETTE.len() as i64) as usize].to_string()
}

/// A laid-out node of the skills network.
#[derive(Debug, Clone, Serialize)]
pub struct GraphNodeView {
    pub id: String,
    pub group: i64,
    pub x: f64,
    pub y: f64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphEdgeView {
    pub source: String,
    pub target: String,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillsGraphView {
    pub nodes: Vec<GraphNodeView>,
    pub edges: Vec<GraphEdgeView>,
    pub error: Option<String>,
}

// Plotly-style traces for the interactive variant: edge coordinates are a
// flat sequence with None separators between segments.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeTrace {
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    pub widths: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeTrace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub text: Vec<String>,
    pub color: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InteractiveGraphFigure {
    pub title: String,
    pub annotation: String,
    pub edge_trace: EdgeTrace,
    pub node_trace: NodeTrace,
    pub error: Option<String>,
}

/// Build the static skills network view: seeded force-directed layout,
/// group-colored nodes, edge width scaled by link value. Links referencing
/// missing nodes are dropped; an empty node set is an error state.
pub fn create_skills_graph(skills_json: &str) -> SkillsGraphView {
    match build_graph(skills_json) {
        Ok((graph, _)) => {
            let pos = spring_layout(&graph, LAYOUT_SEED, LAYOUT_ITERATIONS);

            let nodes = graph
                .node_indices()
                .map(|idx| {
                    let (id, group) = &graph[idx];
                    let (x, y) = pos[idx.index()];
                    GraphNodeView {
                        id: id.clone(),
                        group: *group,
                        x,
                        y,
                        color: group_color(*group),
                    }
                })
                .collect();

            let edges = graph
                .edge_references()
                .map(|edge| {
                    let (x0, y0) = pos[edge.source().index()];
                    let (x1, y1) = pos[edge.target().index()];
                    GraphEdgeView {
                        source: graph[edge.source()].0.clone(),
                        target: graph[edge.target()].0.clone(),
                        x0,
                        y0,
                        x1,
                        y1,
                        width: *edge.weight() as f64 * 1.5,
                    }
                })
                .collect();

            SkillsGraphView {
                nodes,
                edges,
                error: None,
            }
        }
        Err(e) => {
            warn!("Error creating skills graph: {}", e);
            SkillsGraphView {
                nodes: Vec::new(),
                edges: Vec::new(),
                error: Some(format!("Error creating skills graph: {}", e)),
            }
        }
    }
}

/// Interactive variant of the skills network, emitted as plotly-style
/// edge/node traces.
pub fn create_interactive_skills_graph(skills_json: &str) -> InteractiveGraphFigure {
    match build_graph(skills_json) {
        Ok((graph, _)) => {
            let pos = spring_layout(&graph, LAYOUT_SEED, LAYOUT_ITERATIONS);

            let mut edge_trace = EdgeTrace {
                x: Vec::new(),
                y: Vec::new(),
                widths: Vec::new(),
            };
            for edge in graph.edge_references() {
                let (x0, y0) = pos[edge.source().index()];
                let (x1, y1) = pos[edge.target().index()];
                edge_trace.x.extend([Some(x0), Some(x1), None]);
                edge_trace.y.extend([Some(y0), Some(y1), None]);
                edge_trace.widths.push(*edge.weight() as f64 * 2.0);
            }

            let mut node_trace = NodeTrace {
                x: Vec::new(),
                y: Vec::new(),
                text: Vec::new(),
                color: Vec::new(),
            };
            for idx in graph.node_indices() {
                let (id, group) = &graph[idx];
                let (x, y) = pos[idx.index()];
                node_trace.x.push(x);
                node_trace.y.push(y);
                node_trace.text.push(id.clone());
                node_trace.color.push(*group);
            }

            InteractiveGraphFigure {
                title: "Skills Network Graph".to_string(),
                annotation: "Skills required for this project".to_string(),
                edge_trace,
                node_trace,
                error: None,
            }
        }
        Err(e) => {
            warn!("Error creating interactive skills graph: {}", e);
            InteractiveGraphFigure {
                title: "Skills Network Graph".to_string(),
                annotation: String::new(),
                edge_trace: EdgeTrace {
                    x: Vec::new(),
                    y: Vec::new(),
                    widths: Vec::new(),
                },
                node_trace: NodeTrace {
                    x: Vec::new(),
                    y: Vec::new(),
                    text: Vec::new(),
                    color: Vec::new(),
                },
                error: Some(format!("Error creating interactive skills graph: {}", e)),
            }
        }
    }
}

type SkillsNetwork = UnGraph<(String, i64), i64>;

fn build_graph(skills_json: &str) -> Result<(SkillsNetwork, HashMap<String, NodeIndex>), VizError> {
    let data: SkillsGraph = serde_json::from_str(skills_json)?;

    let mut graph = SkillsNetwork::new_undirected();
    let mut index: HashMap<String, NodeIndex> = HashMap::new();

    for node in &data.nodes {
        if node.id.is_empty() || index.contains_key(&node.id) {
            continue;
        }
        let idx = graph.add_node((node.id.clone(), node.group));
        index.insert(node.id.clone(), idx);
    }

    if index.is_empty() {
        return Err(VizError::EmptyGraph);
    }

    for link in &data.links {
        // Links pointing at unknown nodes are silently dropped
        if let (Some(&source), Some(&target)) = (index.get(&link.source), index.get(&link.target)) {
            graph.add_edge(source, target, link.value);
        }
    }

    Ok((graph, index))
}

// Fruchterman-Reingold spring layout over the [-1, 1] square. The RNG seed
// fixes the initial placement, so equal inputs always produce equal layouts.
fn spring_layout(graph: &SkillsNetwork, seed: u64, iterations: usize) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let count = graph.node_count();

    let mut pos: Vec<(f64, f64)> = (0..count)
        .map(|_| (rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect();
    if count <= 1 {
        return pos;
    }

    let k = (4.0 / count as f64).sqrt();
    let mut temperature = 0.2;
    let cooling = temperature / iterations as f64;

    for _ in 0..iterations {
        let mut disp = vec![(0.0f64, 0.0f64); count];

        // Repulsion between every node pair
        for a in 0..count {
            for b in (a + 1)..count {
                let dx = pos[a].0 - pos[b].0;
                let dy = pos[a].1 - pos[b].1;
                let dist = (dx * dx + dy * dy).sqrt().max(1e-6);
                let force = k * k / dist;
                let fx = dx / dist * force;
                let fy = dy / dist * force;
                disp[a].0 += fx;
                disp[a].1 += fy;
                disp[b].0 -= fx;
                disp[b].1 -= fy;
            }
        }

        // Attraction along edges
        for edge in graph.edge_references() {
            let a = edge.source().index();
            let b = edge.target().index();
            let dx = pos[a].0 - pos[b].0;
            let dy = pos[a].1 - pos[b].1;
            let dist = (dx * dx + dy * dy).sqrt().max(1e-6);
            let force = dist * dist / k;
            let fx = dx / dist * force;
            let fy = dy / dist * force;
            disp[a].0 -= fx;
            disp[a].1 -= fy;
            disp[b].0 += fx;
            disp[b].1 += fy;
        }

        for i in 0..count {
            let (dx, dy) = disp[i];
            let len = (dx * dx + dy * dy).sqrt().max(1e-6);
            let step = len.min(temperature);
            pos[i].0 = (pos[i].0 + dx / len * step).clamp(-1.0, 1.0);
            pos[i].1 = (pos[i].1 + dy / len * step).clamp(-1.0, 1.0);
        }

        temperature -= cooling;
    }

    pos
}

/// Render a mind map document as indented text sections. Replaces the old
/// visual-block rendering, which never laid out reliably.
pub fn create_mind_map(mind_map_json: &str) -> String {
    match render_mind_map(mind_map_json) {
        Ok(text) => text,
        Err(e) => {
            warn!("Error creating mind map: {}", e);
            format!("```\nError creating mind map: {}\n```", e)
        }
    }
}

fn render_mind_map(mind_map_json: &str) -> Result<String, VizError> {
    let data: MindMap = serde_json::from_str(mind_map_json)?;

    let mut text = format!("# {}\n\n", data.center);
    for branch in &data.main_branches {
        text.push_str(&format!("## {}\n", branch.name));
        for sub_branch in &branch.sub_branches {
            text.push_str(&format!("* {}\n", sub_branch));
        }
        text.push('\n');
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PHASE_TIMELINE: &str = r#"{
        "phases": ["A", "B"],
        "start_dates": ["2025-01-01", "2025-02-01"],
        "end_dates": ["2025-01-31", "2025-02-28"],
        "descriptions": ["first", "second"]
    }"#;

    #[test]
    fn test_timeline_rows() {
        let chart = create_project_timeline(TWO_PHASE_TIMELINE);
        assert!(chart.error.is_none());
        assert_eq!(chart.rows.len(), 2);
        assert_eq!(chart.rows[0].task, "A");
        assert_eq!(chart.rows[0].start, "2025-01-01");
        assert_eq!(chart.rows[0].finish, "2025-01-31");
        assert_eq!(chart.rows[1].task, "B");
        assert_eq!(chart.rows[1].start, "2025-02-01");
        assert_eq!(chart.rows[1].finish, "2025-02-28");
    }

    #[test]
    fn test_timeline_color_ramp() {
        assert_eq!(phase_color(0), "rgb(50, 100, 200)");
        assert_eq!(phase_color(1), "rgb(90, 120, 180)");
        assert_eq!(phase_color(4), "rgb(210, 180, 120)");
    }

    #[test]
    fn test_timeline_missing_description_padded() {
        let json = r#"{"phases": ["A"], "start_dates": ["2025-01-01"], "end_dates": ["2025-01-31"]}"#;
        let chart = create_project_timeline(json);
        assert!(chart.error.is_none());
        assert_eq!(chart.rows[0].description, "");
    }

    #[test]
    fn test_timeline_error_annotation() {
        let chart = create_project_timeline("not json");
        assert!(chart.rows.is_empty());
        assert!(chart.error.unwrap().contains("Error creating timeline"));

        let mismatched =
            r#"{"phases": ["A", "B"], "start_dates": ["2025-01-01"], "end_dates": ["2025-01-31"]}"#;
        assert!(create_project_timeline(mismatched).error.is_some());
    }

    const SKILLS: &str = r#"{
        "nodes": [
            {"id": "Python", "group": 1},
            {"id": "SQL", "group": 1},
            {"id": "Communication", "group": 3}
        ],
        "links": [
            {"source": "Python", "target": "SQL", "value": 3},
            {"source": "Python", "target": "Tableau", "value": 2}
        ]
    }"#;

    #[test]
    fn test_skills_graph_drops_dangling_links() {
        let view = create_skills_graph(SKILLS);
        assert!(view.error.is_none());
        assert_eq!(view.nodes.len(), 3);
        // The Python -> Tableau link points at a missing node and is dropped
        assert_eq!(view.edges.len(), 1);
        assert_eq!(view.edges[0].source, "Python");
        assert_eq!(view.edges[0].target, "SQL");
        assert_eq!(view.edges[0].width, 4.5);
    }

    #[test]
    fn test_skills_graph_empty_nodes_is_error() {
        let view = create_skills_graph(r#"{"nodes": [], "links": []}"#);
        assert!(view.nodes.is_empty());
        assert!(view.error.unwrap().contains("no valid nodes"));
    }

    #[test]
    fn test_skills_graph_layout_is_deterministic() {
        let a = create_skills_graph(SKILLS);
        let b = create_skills_graph(SKILLS);
        for (na, nb) in a.nodes.iter().zip(b.nodes.iter()) {
            assert_eq!(na.id, nb.id);
            assert_eq!((na.x, na.y), (nb.x, nb.y));
        }
    }

    #[test]
    fn test_group_color_wraps_palette() {
        assert_eq!(group_color(1), group_color(11));
        assert_ne!(group_color(1), group_color(2));
    }

    #[test]
    fn test_interactive_traces() {
        let figure = create_interactive_skills_graph(SKILLS);
        assert!(figure.error.is_none());
        assert_eq!(figure.node_trace.text.len(), 3);
        // One edge: two endpoints plus a None separator
        assert_eq!(figure.edge_trace.x.len(), 3);
        assert_eq!(figure.edge_trace.x[2], None);
        assert_eq!(figure.edge_trace.widths, vec![6.0]);
    }

    #[test]
    fn test_interactive_error_figure() {
        let figure = create_interactive_skills_graph("[]");
        assert!(figure.error.is_some());
        assert!(figure.node_trace.x.is_empty());
    }

    #[test]
    fn test_mind_map_text() {
        let json = r#"{
            "center": "Churn Analysis",
            "main_branches": [
                {"name": "Goals", "sub_branches": ["Reduce churn", "Find drivers"]}
            ]
        }"#;
        let text = create_mind_map(json);
        assert!(text.starts_with("# Churn Analysis\n\n"));
        assert!(text.contains("## Goals\n"));
        assert!(text.contains("* Reduce churn\n"));
        assert!(text.contains("* Find drivers\n"));
    }

    #[test]
    fn test_mind_map_error_block() {
        let text = create_mind_map("{broken");
        assert!(text.starts_with("```\nError creating mind map"));
    }
}
