use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app_config::{AppConfig, AppConfigManager};
use crate::export::{export_projects_json, export_projects_markdown};
use crate::llm_handler;
use crate::models::{CatalogProject, JobProfile, SavedProject};
use crate::normalizer::{self, ArtifactKind, Normalized};
use crate::session::{SessionManager, StoredArtifact};
use crate::visualization::{
    create_interactive_skills_graph, create_mind_map, create_project_timeline,
    create_skills_graph, InteractiveGraphFigure, SkillsGraphView, TimelineChart,
};

// Create a data structure to hold the session store and config manager
pub struct AppState {
    pub session_manager: Arc<SessionManager>,
    pub config_manager: Arc<AppConfigManager>,
}

#[derive(Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

#[derive(Serialize)]
pub struct IdeasResponse {
    pub ideas: Vec<String>,
    pub count: usize,
}

#[derive(Serialize, Deserialize)]
pub struct SelectProjectRequest {
    pub idea: String,
}

#[derive(Serialize, Deserialize)]
pub struct SelectProjectResponse {
    pub selected: String,
}

#[derive(Serialize)]
pub struct DetailsResponse {
    pub title: String,
    pub details: String,
}

#[derive(Serialize)]
pub struct MindMapResponse {
    pub document: String,
    pub fallback: bool,
    pub mind_map: String,
}

#[derive(Serialize)]
pub struct TimelineResponse {
    pub document: String,
    pub fallback: bool,
    pub chart: TimelineChart,
}

#[derive(Serialize)]
pub struct SkillsGraphResponse {
    pub document: String,
    pub fallback: bool,
    pub graph: SkillsGraphView,
    pub figure: InteractiveGraphFigure,
}

#[derive(Serialize)]
pub struct SampleDataResponse {
    pub sample_data: String,
}

#[derive(Serialize, Deserialize)]
pub struct SaveProjectResponse {
    pub saved: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct SavedProjectsQuery {
    pub query: Option<String>,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub role: Option<String>,
    pub industry: Option<String>,
    pub tool: Option<String>,
}

// Register the API routes; shared by the server and the handler tests
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/sessions", web::post().to(create_session_handler))
            .route("/sessions/{id}", web::get().to(get_session_handler))
            .route("/sessions/{id}/reset", web::post().to(reset_session_handler))
            .route("/sessions/{id}/profile", web::put().to(update_profile_handler))
            .route("/sessions/{id}/ideas", web::post().to(generate_ideas_handler))
            .route("/sessions/{id}/select", web::post().to(select_project_handler))
            .route("/sessions/{id}/details", web::post().to(generate_details_handler))
            .route("/sessions/{id}/mind-map", web::post().to(mind_map_handler))
            .route("/sessions/{id}/timeline", web::post().to(timeline_handler))
            .route(
                "/sessions/{id}/skills-graph",
                web::post().to(skills_graph_handler),
            )
            .route(
                "/sessions/{id}/sample-data",
                web::post().to(sample_data_handler),
            )
            .route("/sessions/{id}/projects", web::get().to(list_saved_handler))
            .route(
                "/sessions/{id}/projects/save",
                web::post().to(save_project_handler),
            )
            .route(
                "/sessions/{id}/projects/export",
                web::get().to(export_projects_handler),
            )
            .route(
                "/sessions/{id}/projects/{title}",
                web::delete().to(delete_saved_handler),
            )
            .route("/catalog", web::get().to(catalog_handler))
            .route("/config", web::get().to(get_config_handler))
            .route("/config", web::put().to(update_config_handler)),
    );
}

// API endpoint to open a new session
pub async fn create_session_handler(data: web::Data<AppState>) -> impl Responder {
    let session_id = data.session_manager.create_session().await;
    info!("Created session {}", session_id);
    HttpResponse::Ok().json(CreateSessionResponse { session_id })
}

// API endpoint to fetch the full session state (used for UI hydration)
pub async fn get_session_handler(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    match data.session_manager.get_session(&path.into_inner()).await {
        Some(session) => HttpResponse::Ok().json(session),
        None => HttpResponse::NotFound().body("Unknown session"),
    }
}

// API endpoint to clear ideas, selection and derived artifacts as one group
pub async fn reset_session_handler(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    match data
        .session_manager
        .update(&path.into_inner(), |s| s.reset_generated())
        .await
    {
        Ok(_) => HttpResponse::Ok().body("Session reset"),
        Err(e) => HttpResponse::NotFound().body(e),
    }
}

// API endpoint to update the job profile
pub async fn update_profile_handler(
    path: web::Path<String>,
    profile: web::Json<JobProfile>,
    data: web::Data<AppState>,
) -> impl Responder {
    let profile = profile.into_inner();
    match data
        .session_manager
        .update(&path.into_inner(), |s| s.profile = profile.clone())
        .await
    {
        Ok(_) => HttpResponse::Ok().json(profile),
        Err(e) => HttpResponse::NotFound().body(e),
    }
}

// API endpoint to generate project ideas for the session's profile
pub async fn generate_ideas_handler(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    let session_id = path.into_inner();
    let profile = match data.session_manager.get_session(&session_id).await {
        Some(session) => session.profile,
        None => return HttpResponse::NotFound().body("Unknown session"),
    };

    if !profile.is_complete() {
        return HttpResponse::BadRequest().body(
            "Please fill in your job title, tools, and industry to generate project ideas.",
        );
    }

    let config = data.config_manager.get_config();
    match llm_handler::generate_project_ideas(&config, &profile).await {
        Ok(ideas) => {
            let response = IdeasResponse {
                ideas: ideas.clone(),
                count: ideas.len(),
            };
            if let Err(e) = data
                .session_manager
                .update(&session_id, |s| s.project_ideas = ideas)
                .await
            {
                return HttpResponse::NotFound().body(e);
            }
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            HttpResponse::BadGateway().body(format!("Error generating project ideas: {}", e))
        }
    }
}

// API endpoint to promote an idea to the selected project
pub async fn select_project_handler(
    path: web::Path<String>,
    request: web::Json<SelectProjectRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let title = normalizer::strip_list_marker(&request.idea);
    if title.is_empty() {
        return HttpResponse::BadRequest().body("Cannot select an empty project title");
    }

    match data
        .session_manager
        .update(&path.into_inner(), |s| s.select_project(title.clone()))
        .await
    {
        Ok(_) => HttpResponse::Ok().json(SelectProjectResponse { selected: title }),
        Err(e) => HttpResponse::NotFound().body(e),
    }
}

// API endpoint to generate the detailed write-up for the selected project
pub async fn generate_details_handler(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    let session_id = path.into_inner();
    let session = match data.session_manager.get_session(&session_id).await {
        Some(session) => session,
        None => return HttpResponse::NotFound().body("Unknown session"),
    };
    let title = match session.selected_project {
        Some(title) => title,
        None => return HttpResponse::BadRequest().body("No project selected"),
    };

    let config = data.config_manager.get_config();
    match llm_handler::generate_project_details(&config, &session.profile, &title).await {
        Ok(details) => {
            if let Err(e) = data
                .session_manager
                .update(&session_id, |s| s.project_details = Some(details.clone()))
                .await
            {
                return HttpResponse::NotFound().body(e);
            }
            HttpResponse::Ok().json(DetailsResponse { title, details })
        }
        Err(e) => {
            HttpResponse::BadGateway().body(format!("Error generating project details: {}", e))
        }
    }
}

// Shared flow for the three structured artifacts: check prerequisites, call
// the model, normalize (with fallback), store, and attach the rendered view.
async fn generate_structured(
    kind: ArtifactKind,
    session_id: String,
    data: web::Data<AppState>,
    require_details: bool,
) -> HttpResponse {
    let session = match data.session_manager.get_session(&session_id).await {
        Some(session) => session,
        None => return HttpResponse::NotFound().body("Unknown session"),
    };
    let title = match session.selected_project {
        Some(title) => title,
        None => return HttpResponse::BadRequest().body("No project selected"),
    };
    if require_details && session.project_details.is_none() {
        return HttpResponse::BadRequest().body("Please generate project details first.");
    }

    let config = data.config_manager.get_config();
    let result = match kind {
        ArtifactKind::MindMap => {
            llm_handler::generate_mind_map(&config, &session.profile, &title).await
        }
        ArtifactKind::Timeline => {
            llm_handler::generate_timeline(&config, &session.profile, &title).await
        }
        ArtifactKind::SkillsGraph => {
            llm_handler::generate_skills_graph(&config, &session.profile, &title).await
        }
    };

    let normalized: Normalized = match result {
        Ok(normalized) => normalized,
        Err(e) => {
            return HttpResponse::BadGateway()
                .body(format!("Error generating {}: {}", kind.name(), e));
        }
    };

    let fallback = normalized.is_fallback();
    let document = normalized.into_text();
    let stored = StoredArtifact {
        document: document.clone(),
        fallback,
    };
    let store_result = data
        .session_manager
        .update(&session_id, |s| match kind {
            ArtifactKind::MindMap => s.mind_map = Some(stored),
            ArtifactKind::Timeline => s.timeline = Some(stored),
            ArtifactKind::SkillsGraph => s.skills_graph = Some(stored),
        })
        .await;
    if let Err(e) = store_result {
        return HttpResponse::NotFound().body(e);
    }

    match kind {
        ArtifactKind::MindMap => {
            let mind_map = create_mind_map(&document);
            HttpResponse::Ok().json(MindMapResponse {
                document,
                fallback,
                mind_map,
            })
        }
        ArtifactKind::Timeline => {
            let chart = create_project_timeline(&document);
            HttpResponse::Ok().json(TimelineResponse {
                document,
                fallback,
                chart,
            })
        }
        ArtifactKind::SkillsGraph => {
            let graph = create_skills_graph(&document);
            let figure = create_interactive_skills_graph(&document);
            HttpResponse::Ok().json(SkillsGraphResponse {
                document,
                fallback,
                graph,
                figure,
            })
        }
    }
}

// API endpoint to generate a mind map for the selected project
pub async fn mind_map_handler(path: web::Path<String>, data: web::Data<AppState>) -> impl Responder {
    generate_structured(ArtifactKind::MindMap, path.into_inner(), data, false).await
}

// API endpoint to generate a timeline; requires project details to exist
pub async fn timeline_handler(path: web::Path<String>, data: web::Data<AppState>) -> impl Responder {
    generate_structured(ArtifactKind::Timeline, path.into_inner(), data, true).await
}

// API endpoint to generate a skills graph; requires project details to exist
pub async fn skills_graph_handler(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    generate_structured(ArtifactKind::SkillsGraph, path.into_inner(), data, true).await
}

// API endpoint to sketch a sample data structure for the selected project
pub async fn sample_data_handler(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    let session_id = path.into_inner();
    let session = match data.session_manager.get_session(&session_id).await {
        Some(session) => session,
        None => return HttpResponse::NotFound().body("Unknown session"),
    };
    let title = match session.selected_project {
        Some(title) => title,
        None => return HttpResponse::BadRequest().body("No project selected"),
    };

    let config = data.config_manager.get_config();
    match llm_handler::generate_sample_data(&config, &session.profile, &title).await {
        Ok(sample_data) => {
            if let Err(e) = data
                .session_manager
                .update(&session_id, |s| s.sample_data = Some(sample_data.clone()))
                .await
            {
                return HttpResponse::NotFound().body(e);
            }
            HttpResponse::Ok().json(SampleDataResponse { sample_data })
        }
        Err(e) => HttpResponse::BadGateway().body(format!("Error generating sample data: {}", e)),
    }
}

// API endpoint to save the selected project into the session's list
pub async fn save_project_handler(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> impl Responder {
    match data
        .session_manager
        .update(&path.into_inner(), |s| s.save_project())
        .await
    {
        Ok(Ok(true)) => HttpResponse::Ok().json(SaveProjectResponse {
            saved: true,
            message: "Project saved!".to_string(),
        }),
        Ok(Ok(false)) => HttpResponse::Ok().json(SaveProjectResponse {
            saved: false,
            message: "This project is already saved.".to_string(),
        }),
        Ok(Err(e)) => HttpResponse::BadRequest().body(e),
        Err(e) => HttpResponse::NotFound().body(e),
    }
}

// API endpoint to list (optionally filter) saved projects
pub async fn list_saved_handler(
    path: web::Path<String>,
    query: web::Query<SavedProjectsQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    match data.session_manager.get_session(&path.into_inner()).await {
        Some(session) => {
            let projects: Vec<SavedProject> =
                session.filter_saved(query.query.as_deref().unwrap_or(""));
            HttpResponse::Ok().json(projects)
        }
        None => HttpResponse::NotFound().body("Unknown session"),
    }
}

// API endpoint to delete one saved project by title
pub async fn delete_saved_handler(
    path: web::Path<(String, String)>,
    data: web::Data<AppState>,
) -> impl Responder {
    let (session_id, title) = path.into_inner();
    match data
        .session_manager
        .update(&session_id, |s| s.delete_saved(&title))
        .await
    {
        Ok(true) => HttpResponse::Ok().body("Project deleted"),
        Ok(false) => HttpResponse::NotFound().body(format!("No saved project titled '{}'", title)),
        Err(e) => HttpResponse::NotFound().body(e),
    }
}

// API endpoint to export saved projects as a JSON or Markdown download
pub async fn export_projects_handler(
    path: web::Path<String>,
    query: web::Query<ExportQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    let session = match data.session_manager.get_session(&path.into_inner()).await {
        Some(session) => session,
        None => return HttpResponse::NotFound().body("Unknown session"),
    };

    match query.format.as_deref().unwrap_or("json") {
        "markdown" => HttpResponse::Ok()
            .content_type("text/markdown")
            .insert_header((
                "Content-Disposition",
                "attachment; filename=\"data_projects.md\"",
            ))
            .body(export_projects_markdown(&session.saved_projects)),
        "json" => match export_projects_json(&session.saved_projects) {
            Ok(json) => HttpResponse::Ok()
                .content_type("application/json")
                .insert_header((
                    "Content-Disposition",
                    "attachment; filename=\"data_projects.json\"",
                ))
                .body(json),
            Err(e) => HttpResponse::InternalServerError().body(e),
        },
        other => {
            HttpResponse::BadRequest().body(format!("Unsupported export format: {}", other))
        }
    }
}

// Pre-authored projects for the explore surface
fn catalog_projects() -> Vec<CatalogProject> {
    let presets = [
        (
            "Customer Segmentation Analysis",
            "Data Analyst",
            "Retail",
            "Python, Scikit-learn",
            "Use clustering algorithms to segment customers based on purchasing behavior.",
        ),
        (
            "Fraud Detection System",
            "Data Scientist",
            "Finance",
            "Python, TensorFlow",
            "Build a machine learning model to detect fraudulent transactions.",
        ),
        (
            "Patient Readmission Prediction",
            "Data Scientist",
            "Healthcare",
            "R, SQL",
            "Predict which patients are likely to be readmitted to hospitals within 30 days.",
        ),
        (
            "Data Warehouse ETL Pipeline",
            "Data Engineer",
            "Technology",
            "Python, SQL, Airflow",
            "Design and implement an ETL pipeline for a data warehouse.",
        ),
        (
            "Sales Performance Dashboard",
            "BI Developer",
            "Retail",
            "PowerBI, SQL",
            "Create an interactive dashboard to track sales performance across regions.",
        ),
        (
            "Predictive Maintenance System",
            "ML Engineer",
            "Manufacturing",
            "Python, scikit-learn",
            "Build a model to predict equipment failures before they occur.",
        ),
        (
            "HR Analytics Dashboard",
            "Data Analyst",
            "Technology",
            "Tableau, Excel",
            "Analyze employee data to discover patterns in retention and productivity.",
        ),
        (
            "Credit Scoring Model",
            "Data Scientist",
            "Finance",
            "Python, XGBoost",
            "Develop a machine learning model to assess customer creditworthiness.",
        ),
    ];

    presets
        .iter()
        .map(|(title, role, industry, tools, description)| CatalogProject {
            title: title.to_string(),
            role: role.to_string(),
            industry: industry.to_string(),
            tools: tools.to_string(),
            description: description.to_string(),
        })
        .collect()
}

// API endpoint to browse the preset project catalog with optional filters
pub async fn catalog_handler(query: web::Query<CatalogQuery>) -> impl Responder {
    let mut projects = catalog_projects();

    if let Some(role) = query.role.as_deref().filter(|r| !r.is_empty()) {
        projects.retain(|p| p.role.eq_ignore_ascii_case(role));
    }
    if let Some(industry) = query.industry.as_deref().filter(|i| !i.is_empty()) {
        projects.retain(|p| p.industry.eq_ignore_ascii_case(industry));
    }
    if let Some(tool) = query.tool.as_deref().filter(|t| !t.is_empty()) {
        let tool = tool.to_lowercase();
        projects.retain(|p| p.tools.to_lowercase().contains(&tool));
    }

    HttpResponse::Ok().json(projects)
}

// API endpoint to read the current app configuration
pub async fn get_config_handler(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.config_manager.get_config())
}

// API endpoint to replace and persist the app configuration
pub async fn update_config_handler(
    config: web::Json<AppConfig>,
    data: web::Data<AppState>,
) -> impl Responder {
    let config = config.into_inner();
    match data.config_manager.save_config(&config) {
        Ok(_) => HttpResponse::Ok().json(config),
        Err(e) => HttpResponse::InternalServerError().body(format!("Failed to save config: {}", e)),
    }
}
