use std::path::Path;
use std::sync::Arc;

use actix_files as fs;
use actix_web::{web, App, HttpServer, Responder};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use ideaforge::app_config::{AppConfig, AppConfigManager, APP_CONFIG_FILE};
use ideaforge::handlers::{configure_api, AppState};
use ideaforge::session::SessionManager;

/// AI-assisted project idea generator for data professionals
#[derive(Parser, Debug)]
#[command(name = "ideaforge")]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Path to the app configuration file
    #[arg(long, default_value = APP_CONFIG_FILE)]
    config: String,
}

// Index handler to serve the frontend
async fn index() -> impl Responder {
    fs::NamedFile::open_async("./frontend/dist/index.html").await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let file_appender = tracing_appender::rolling::daily("./logs", "ideaforge.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(file_writer.and(std::io::stdout))
        .init();

    // Load the configuration, writing a default file on first run
    let config_manager = Arc::new(AppConfigManager::new(&args.config));
    if !Path::new(&args.config).exists() {
        info!("No configuration at {}, writing defaults", args.config);
        if let Err(e) = config_manager.save_config(&AppConfig::default()) {
            warn!("Failed to write default configuration: {}", e);
        }
    }
    match config_manager.load_config() {
        Ok(_) => info!("Configuration loaded from {}", args.config),
        Err(e) => warn!(
            "Failed to load configuration from {}: {}; continuing with defaults",
            args.config, e
        ),
    }

    let config = config_manager.get_config();
    let session_manager = Arc::new(SessionManager::new(config.session_timeout_minutes));

    // Periodically drop idle sessions
    let cleanup_manager = session_manager.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(600));
        loop {
            interval.tick().await;
            let cleaned = cleanup_manager.cleanup_expired_sessions().await;
            if cleaned > 0 {
                info!("Cleaned up {} expired sessions", cleaned);
            }
        }
    });

    let app_state = web::Data::new(AppState {
        session_manager,
        config_manager,
    });

    info!("Starting server at http://{}:{}", args.host, args.port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            // API routes
            .configure(configure_api)
            // Serve static files from the frontend/dist directory
            .service(fs::Files::new("/assets", "./frontend/dist/assets"))
            // Serve the index.html for all other routes
            .default_service(web::get().to(index))
    })
    .bind((args.host.as_str(), args.port))?
    .run()
    .await
}
