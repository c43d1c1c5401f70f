use std::env;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::app_config::AppConfig;
use crate::models::JobProfile;
use crate::normalizer::{self, ArtifactKind, Normalized};
use crate::prompts;

// LLM Provider enum
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LLMProvider {
    Gemini,
    OpenRouter,
}

impl Default for LLMProvider {
    fn default() -> Self {
        LLMProvider::Gemini
    }
}

// Gemini API configuration
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

// OpenRouter API configuration
const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_OPENROUTER_MODEL: &str = "google/gemini-2.0-flash-001";

// Struct to hold the Gemini LLM response
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: String,
}

// Struct to hold the OpenRouter LLM response
#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    choices: Vec<OpenRouterChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterChoice {
    message: OpenRouterMessage,
}

#[derive(Debug, Deserialize)]
struct OpenRouterMessage {
    content: String,
}

// LLM Provider implementation. One blocking request-response exchange per
// prompt; no retries, no streaming.
pub struct LLMProviderImpl {
    provider_type: LLMProvider,
    client: Client,
    gemini_model: Option<String>,
    openrouter_model: Option<String>,
}

impl LLMProviderImpl {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            provider_type: config.llm_provider.clone().unwrap_or_default(),
            client: Client::new(),
            gemini_model: config.gemini_model.clone(),
            openrouter_model: config.openrouter_model.clone(),
        }
    }

    pub async fn send_prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String, String> {
        match self.provider_type {
            LLMProvider::Gemini => self.send_gemini_prompt(system_prompt, user_prompt).await,
            LLMProvider::OpenRouter => self.send_openrouter_prompt(system_prompt, user_prompt).await,
        }
    }

    async fn send_gemini_prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String, String> {
        let api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| "GEMINI_API_KEY environment variable not set".to_string())?;

        let model = self.gemini_model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);

        // Combine system and user prompts for Gemini (no separate roles)
        let combined_prompt = format!("{}\n\n{}", system_prompt, user_prompt);

        let payload = json!({
            "contents": [
                {
                    "parts": [
                        {
                            "text": combined_prompt
                        }
                    ]
                }
            ]
        });

        let url = format!("{}/{}:generateContent?key={}", GEMINI_API_URL, model, api_key);
        let response = self.client.post(url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| format!("Failed to send request to Gemini: {}", e))?;

        let response_body = response.json::<GeminiResponse>()
            .await
            .map_err(|e| format!("Failed to parse Gemini response: {}", e))?;

        if let Some(candidate) = response_body.candidates.first() {
            if let Some(part) = candidate.content.parts.first() {
                return Ok(part.text.clone());
            }
        }

        Err("No response from Gemini".to_string())
    }

    async fn send_openrouter_prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String, String> {
        let api_key = env::var("OPENROUTER_API_KEY")
            .map_err(|_| "OPENROUTER_API_KEY environment variable not set".to_string())?;

        let model = self.openrouter_model.as_deref().unwrap_or(DEFAULT_OPENROUTER_MODEL);

        let payload = json!({
            "model": model,
            "messages": [
                {
                    "role": "system",
                    "content": system_prompt
                },
                {
                    "role": "user",
                    "content": user_prompt
                }
            ]
        });

        let response = self.client.post(OPENROUTER_API_URL)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| format!("Failed to send request to OpenRouter: {}", e))?;

        let response_body = response.json::<OpenRouterResponse>()
            .await
            .map_err(|e| format!("Failed to parse OpenRouter response: {}", e))?;

        if let Some(choice) = response_body.choices.first() {
            Ok(choice.message.content.clone())
        } else {
            Err("No response from OpenRouter".to_string())
        }
    }
}

// Function to generate project ideas for a job profile
pub async fn generate_project_ideas(
    config: &AppConfig,
    profile: &JobProfile,
) -> Result<Vec<String>, String> {
    let provider = LLMProviderImpl::from_config(config);

    let system_prompt = config
        .ideas_system_prompt
        .as_deref()
        .unwrap_or(prompts::DEFAULT_IDEAS_SYSTEM_PROMPT);
    let user_prompt =
        prompts::ideas_prompt(profile, config.idea_count, config.ideas_user_prompt.as_deref());

    let content = provider.send_prompt(system_prompt, &user_prompt).await?;

    Ok(normalizer::filter_idea_lines(&content))
}

// Function to generate the detailed write-up for a selected project
pub async fn generate_project_details(
    config: &AppConfig,
    profile: &JobProfile,
    project_title: &str,
) -> Result<String, String> {
    let provider = LLMProviderImpl::from_config(config);

    let system_prompt = config
        .details_system_prompt
        .as_deref()
        .unwrap_or(prompts::DEFAULT_DETAILS_SYSTEM_PROMPT);
    let user_prompt =
        prompts::details_prompt(profile, project_title, config.details_user_prompt.as_deref());

    provider.send_prompt(system_prompt, &user_prompt).await
}

// Function to generate mind map data for a selected project
pub async fn generate_mind_map(
    config: &AppConfig,
    profile: &JobProfile,
    project_title: &str,
) -> Result<Normalized, String> {
    let provider = LLMProviderImpl::from_config(config);

    let system_prompt = config
        .mind_map_system_prompt
        .as_deref()
        .unwrap_or(prompts::DEFAULT_MIND_MAP_SYSTEM_PROMPT);
    let user_prompt =
        prompts::mind_map_prompt(profile, project_title, config.mind_map_user_prompt.as_deref());

    let content = provider.send_prompt(system_prompt, &user_prompt).await?;

    Ok(normalizer::normalize_structured(
        ArtifactKind::MindMap,
        &content,
        project_title,
    ))
}

// Function to generate timeline data for a selected project
pub async fn generate_timeline(
    config: &AppConfig,
    profile: &JobProfile,
    project_title: &str,
) -> Result<Normalized, String> {
    let provider = LLMProviderImpl::from_config(config);

    let system_prompt = config
        .timeline_system_prompt
        .as_deref()
        .unwrap_or(prompts::DEFAULT_TIMELINE_SYSTEM_PROMPT);
    let user_prompt =
        prompts::timeline_prompt(profile, project_title, config.timeline_user_prompt.as_deref());

    let content = provider.send_prompt(system_prompt, &user_prompt).await?;

    Ok(normalizer::normalize_structured(
        ArtifactKind::Timeline,
        &content,
        project_title,
    ))
}

// Function to generate skills network data for a selected project
pub async fn generate_skills_graph(
    config: &AppConfig,
    profile: &JobProfile,
    project_title: &str,
) -> Result<Normalized, String> {
    let provider = LLMProviderImpl::from_config(config);

    let system_prompt = config
        .skills_graph_system_prompt
        .as_deref()
        .unwrap_or(prompts::DEFAULT_SKILLS_GRAPH_SYSTEM_PROMPT);
    let user_prompt = prompts::skills_graph_prompt(
        profile,
        project_title,
        config.skills_graph_user_prompt.as_deref(),
    );

    let content = provider.send_prompt(system_prompt, &user_prompt).await?;

    Ok(normalizer::normalize_structured(
        ArtifactKind::SkillsGraph,
        &content,
        project_title,
    ))
}

// Function to sketch a sample data structure for a selected project
pub async fn generate_sample_data(
    config: &AppConfig,
    profile: &JobProfile,
    project_title: &str,
) -> Result<String, String> {
    let provider = LLMProviderImpl::from_config(config);

    let system_prompt = config
        .sample_data_system_prompt
        .as_deref()
        .unwrap_or(prompts::DEFAULT_SAMPLE_DATA_SYSTEM_PROMPT);
    let user_prompt = prompts::sample_data_prompt(
        profile,
        project_title,
        config.sample_data_user_prompt.as_deref(),
    );

    let content = provider.send_prompt(system_prompt, &user_prompt).await?;

    Ok(content.trim().to_string())
}
