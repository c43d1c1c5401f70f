use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use crate::llm_handler::LLMProvider;
use crate::prompts;

pub const APP_CONFIG_FILE: &str = "ideaforge_config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm_provider: Option<LLMProvider>,
    pub gemini_model: Option<String>,
    pub openrouter_model: Option<String>,

    // How many ideas to ask the model for
    pub idea_count: usize,
    pub session_timeout_minutes: i64,

    // User-configurable prompts
    pub ideas_system_prompt: Option<String>,
    pub ideas_user_prompt: Option<String>,
    pub details_system_prompt: Option<String>,
    pub details_user_prompt: Option<String>,
    pub mind_map_system_prompt: Option<String>,
    pub mind_map_user_prompt: Option<String>,
    pub timeline_system_prompt: Option<String>,
    pub timeline_user_prompt: Option<String>,
    pub skills_graph_system_prompt: Option<String>,
    pub skills_graph_user_prompt: Option<String>,
    pub sample_data_system_prompt: Option<String>,
    pub sample_data_user_prompt: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm_provider: None,
            gemini_model: None,
            openrouter_model: None,

            idea_count: 10,
            session_timeout_minutes: 120,

            // Default values for user-configurable prompts
            ideas_system_prompt: Some(prompts::DEFAULT_IDEAS_SYSTEM_PROMPT.to_string()),
            ideas_user_prompt: Some(prompts::DEFAULT_IDEAS_USER_PROMPT.to_string()),
            details_system_prompt: Some(prompts::DEFAULT_DETAILS_SYSTEM_PROMPT.to_string()),
            details_user_prompt: Some(prompts::DEFAULT_DETAILS_USER_PROMPT.to_string()),
            mind_map_system_prompt: Some(prompts::DEFAULT_MIND_MAP_SYSTEM_PROMPT.to_string()),
            mind_map_user_prompt: Some(prompts::DEFAULT_MIND_MAP_USER_PROMPT.to_string()),
            timeline_system_prompt: Some(prompts::DEFAULT_TIMELINE_SYSTEM_PROMPT.to_string()),
            timeline_user_prompt: Some(prompts::DEFAULT_TIMELINE_USER_PROMPT.to_string()),
            skills_graph_system_prompt: Some(
                prompts::DEFAULT_SKILLS_GRAPH_SYSTEM_PROMPT.to_string(),
            ),
            skills_graph_user_prompt: Some(prompts::DEFAULT_SKILLS_GRAPH_USER_PROMPT.to_string()),
            sample_data_system_prompt: Some(prompts::DEFAULT_SAMPLE_DATA_SYSTEM_PROMPT.to_string()),
            sample_data_user_prompt: Some(prompts::DEFAULT_SAMPLE_DATA_USER_PROMPT.to_string()),
        }
    }
}

pub struct AppConfigManager {
    config_file: String,
    config: Mutex<AppConfig>,
}

impl AppConfigManager {
    pub fn new(config_file: &str) -> Self {
        Self {
            config_file: config_file.to_string(),
            config: Mutex::new(AppConfig::default()),
        }
    }

    pub fn load_config(&self) -> io::Result<AppConfig> {
        let config_path = Path::new(&self.config_file);

        // If the file doesn't exist, return the default config
        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let config_str = fs::read_to_string(config_path)?;
        let config: AppConfig = serde_json::from_str(&config_str)?;

        // Update the internal config
        let mut current = self.config.lock().unwrap();
        *current = config.clone();

        Ok(config)
    }

    pub fn save_config(&self, config: &AppConfig) -> io::Result<()> {
        let config_str = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_file, config_str)?;

        let mut current = self.config.lock().unwrap();
        *current = config.clone();

        Ok(())
    }

    pub fn get_config(&self) -> AppConfig {
        self.config.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let manager = AppConfigManager::new(path.to_str().unwrap());

        let config = manager.load_config().unwrap();
        assert_eq!(config.idea_count, 10);
        assert_eq!(
            config.ideas_system_prompt.as_deref(),
            Some(prompts::DEFAULT_IDEAS_SYSTEM_PROMPT)
        );
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let manager = AppConfigManager::new(path.to_str().unwrap());

        let mut config = AppConfig::default();
        config.idea_count = 5;
        config.gemini_model = Some("gemini-2.0-flash".to_string());
        manager.save_config(&config).unwrap();

        let reloaded = manager.load_config().unwrap();
        assert_eq!(reloaded.idea_count, 5);
        assert_eq!(reloaded.gemini_model.as_deref(), Some("gemini-2.0-flash"));
        assert_eq!(manager.get_config().idea_count, 5);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{"idea_count": 3}"#).unwrap();

        let manager = AppConfigManager::new(path.to_str().unwrap());
        let config = manager.load_config().unwrap();
        assert_eq!(config.idea_count, 3);
        assert_eq!(config.session_timeout_minutes, 120);
        assert!(config.timeline_user_prompt.is_some());
    }
}
