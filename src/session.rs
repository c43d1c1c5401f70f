use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{JobProfile, SavedProject};

/// Session identifier type
pub type SessionId = String;

/// A structured artifact held in the session: the normalized JSON document
/// plus whether it came from the safety-net fallback instead of the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredArtifact {
    pub document: String,
    pub fallback: bool,
}

/// One user's in-memory interaction state. Not persisted across restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub profile: JobProfile,
    pub project_ideas: Vec<String>,
    pub selected_project: Option<String>,
    pub project_details: Option<String>,
    pub mind_map: Option<StoredArtifact>,
    pub timeline: Option<StoredArtifact>,
    pub skills_graph: Option<StoredArtifact>,
    pub sample_data: Option<String>,
    pub saved_projects: Vec<SavedProject>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            profile: JobProfile::default(),
            project_ideas: Vec::new(),
            selected_project: None,
            project_details: None,
            mind_map: None,
            timeline: None,
            skills_graph: None,
            sample_data: None,
            saved_projects: Vec::new(),
            created_at: now,
            last_activity: now,
        }
    }

    /// Drop everything derived from the current selection. Called when a
    /// different idea is selected so stale artifacts never leak across
    /// projects.
    pub fn clear_derived(&mut self) {
        self.project_details = None;
        self.mind_map = None;
        self.timeline = None;
        self.skills_graph = None;
        self.sample_data = None;
    }

    /// Reset the generated state as one group: ideas, selection and all
    /// derived artifacts go together. The profile and saved projects stay.
    pub fn reset_generated(&mut self) {
        self.project_ideas.clear();
        self.selected_project = None;
        self.clear_derived();
    }

    pub fn select_project(&mut self, title: String) {
        self.selected_project = Some(title);
        self.clear_derived();
    }

    /// Save the selected project. Idempotent by title: a title already in
    /// the saved list is not added again. Returns whether a record was
    /// appended.
    pub fn save_project(&mut self) -> Result<bool, String> {
        let title = self
            .selected_project
            .clone()
            .ok_or_else(|| "No project selected".to_string())?;
        let details = self
            .project_details
            .clone()
            .ok_or_else(|| "Please generate project details first.".to_string())?;

        if self.saved_projects.iter().any(|p| p.title == title) {
            return Ok(false);
        }

        self.saved_projects
            .push(SavedProject::new(&title, &self.profile, &details));
        Ok(true)
    }

    pub fn delete_saved(&mut self, title: &str) -> bool {
        let before = self.saved_projects.len();
        self.saved_projects.retain(|p| p.title != title);
        self.saved_projects.len() != before
    }

    /// Case-insensitive substring filter over saved project titles. An empty
    /// query returns everything.
    pub fn filter_saved(&self, query: &str) -> Vec<SavedProject> {
        let query = query.trim().to_lowercase();
        self.saved_projects
            .iter()
            .filter(|p| query.is_empty() || p.title.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }
}

/// In-memory session store. Sessions expire after a period of inactivity;
/// nothing is shared between sessions.
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    session_timeout: Duration,
}

impl SessionManager {
    pub fn new(timeout_minutes: i64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            session_timeout: Duration::minutes(timeout_minutes),
        }
    }

    pub async fn create_session(&self) -> SessionId {
        let session = Session::new();
        let id = session.id.clone();
        self.sessions.write().await.insert(id.clone(), session);
        id
    }

    pub async fn get_session(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Apply a mutation to a session, updating its activity timestamp.
    pub async fn update<F, R>(&self, id: &str, mutate: F) -> Result<R, String>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| format!("Unknown session: {}", id))?;
        session.last_activity = Utc::now();
        Ok(mutate(session))
    }

    pub async fn cleanup_expired_sessions(&self) -> usize {
        let cutoff = Utc::now() - self.session_timeout;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_activity >= cutoff);
        before - sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(60)
    }

    #[tokio::test]
    async fn test_session_creation() {
        let manager = manager();
        let id = manager.create_session().await;
        assert!(!id.is_empty());

        let session = manager.get_session(&id).await.unwrap();
        assert_eq!(session.id, id);
        assert!(session.project_ideas.is_empty());
        assert!(manager.get_session("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_save_project_idempotence() {
        let manager = manager();
        let id = manager.create_session().await;

        manager
            .update(&id, |s| {
                s.profile = JobProfile::new("Data Analyst", "SQL", "Retail");
                s.select_project("Sales Dashboard".to_string());
                s.project_details = Some("details".to_string());
            })
            .await
            .unwrap();

        let first = manager.update(&id, |s| s.save_project()).await.unwrap();
        assert_eq!(first, Ok(true));
        let second = manager.update(&id, |s| s.save_project()).await.unwrap();
        assert_eq!(second, Ok(false));

        let session = manager.get_session(&id).await.unwrap();
        assert_eq!(session.saved_projects.len(), 1);
        assert_eq!(session.saved_projects[0].title, "Sales Dashboard");
    }

    #[tokio::test]
    async fn test_save_requires_selection_and_details() {
        let manager = manager();
        let id = manager.create_session().await;

        let result = manager.update(&id, |s| s.save_project()).await.unwrap();
        assert!(result.is_err());

        manager
            .update(&id, |s| s.select_project("X".to_string()))
            .await
            .unwrap();
        let result = manager.update(&id, |s| s.save_project()).await.unwrap();
        assert_eq!(result, Err("Please generate project details first.".to_string()));
    }

    #[tokio::test]
    async fn test_reset_clears_generated_group() {
        let manager = manager();
        let id = manager.create_session().await;

        manager
            .update(&id, |s| {
                s.profile = JobProfile::new("Data Analyst", "SQL", "Retail");
                s.project_ideas = vec!["1. A".to_string(), "2. B".to_string()];
                s.select_project("A".to_string());
                s.project_details = Some("details".to_string());
                s.timeline = Some(StoredArtifact {
                    document: "{}".to_string(),
                    fallback: false,
                });
                s.save_project().unwrap();
                s.reset_generated();
            })
            .await
            .unwrap();

        let session = manager.get_session(&id).await.unwrap();
        assert!(session.project_ideas.is_empty());
        assert!(session.selected_project.is_none());
        assert!(session.project_details.is_none());
        assert!(session.timeline.is_none());
        // Profile and saved projects survive a reset
        assert!(session.profile.is_complete());
        assert_eq!(session.saved_projects.len(), 1);
    }

    #[tokio::test]
    async fn test_selecting_new_project_drops_derived() {
        let manager = manager();
        let id = manager.create_session().await;

        manager
            .update(&id, |s| {
                s.select_project("A".to_string());
                s.project_details = Some("details for A".to_string());
                s.select_project("B".to_string());
            })
            .await
            .unwrap();

        let session = manager.get_session(&id).await.unwrap();
        assert_eq!(session.selected_project.as_deref(), Some("B"));
        assert!(session.project_details.is_none());
    }

    #[tokio::test]
    async fn test_filter_and_delete_saved() {
        let manager = manager();
        let id = manager.create_session().await;

        manager
            .update(&id, |s| {
                s.profile = JobProfile::new("Data Analyst", "SQL", "Retail");
                for title in ["Churn Model", "Sales Dashboard", "Churn Survey"] {
                    s.select_project(title.to_string());
                    s.project_details = Some("d".to_string());
                    s.save_project().unwrap();
                }
            })
            .await
            .unwrap();

        let session = manager.get_session(&id).await.unwrap();
        assert_eq!(session.filter_saved("churn").len(), 2);
        assert_eq!(session.filter_saved("").len(), 3);
        assert!(session.filter_saved("etl").is_empty());

        let deleted = manager
            .update(&id, |s| s.delete_saved("Churn Model"))
            .await
            .unwrap();
        assert!(deleted);
        let session = manager.get_session(&id).await.unwrap();
        assert_eq!(session.saved_projects.len(), 2);
        assert!(!manager.update(&id, |s| s.delete_saved("Churn Model")).await.unwrap());
    }

    #[tokio::test]
    async fn test_session_cleanup() {
        let manager = SessionManager::new(0);
        let id = manager.create_session().await;

        // Zero timeout: any session older than "now" is expired
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let cleaned = manager.cleanup_expired_sessions().await;
        assert_eq!(cleaned, 1);
        assert!(manager.get_session(&id).await.is_none());
        assert_eq!(manager.session_count().await, 0);
    }
}
