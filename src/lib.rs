// This file exposes the modules as public modules in the crate

pub mod app_config;
pub mod export;
pub mod handlers;
pub mod llm_handler;
pub mod models;
pub mod normalizer;
pub mod prompts;
pub mod session;
pub mod visualization;
