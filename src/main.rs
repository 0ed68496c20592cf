//! # Speech Curator Backend - Main Application Entry Point
//!
//! HTTP server for curating a speech dataset: upload a pipe-delimited
//! transcription index, record or upload `.wav` clips (normalized to mono /
//! 16-bit PCM / 22050 Hz through an external transcoder), and browse or edit
//! the resulting (audio, transcript) pairs.
//!
//! ## Application Architecture:
//! - **config**: layered configuration (TOML file + environment variables)
//! - **state**: shared curator state and request metrics
//! - **transcript**: index parsing and atomic on-disk edits
//! - **audio**: transcoder adapter and WAV metadata
//! - **natsort**: natural filename ordering for listings
//! - **handlers**: the HTTP endpoints
//! - **middleware / health / error**: request logging, monitoring, and the
//!   JSON error boundary

mod audio;
mod config;
mod error;
mod handlers;
mod health;
mod middleware;
mod natsort;
mod state;
mod transcript;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Result;
use audio::FfmpegNormalizer;
use config::AppConfig;
use state::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Global shutdown flag set by the signal handler task.
static SHUTDOWN_SIGNAL: AtomicBool = AtomicBool::new(false);

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    init_tracing()?;

    let config = AppConfig::load()?;
    config.validate()?;

    info!("Starting speech-curator-backend v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded: {}:{}", config.server.host, config.server.port);

    // The storage folder must exist before the first upload lands in it.
    std::fs::create_dir_all(&config.storage.folder)?;
    info!("Storage folder: {}", config.storage.folder);

    let normalizer = Arc::new(FfmpegNormalizer::new(&config.audio));
    let app_state = AppState::new(config.clone(), normalizer);
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    setup_signal_handlers();

    info!("Starting HTTP server on {}", bind_addr);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(middleware::RequestMetrics)
            .route("/", web::get().to(handlers::index_page))
            .route(
                "/upload_transcriptions",
                web::post().to(handlers::upload_transcriptions),
            )
            .route(
                "/update_transcription",
                web::post().to(handlers::update_transcription),
            )
            .route("/record", web::post().to(handlers::record))
            .route("/wavs/{filename}", web::get().to(handlers::serve_audio))
            .route("/list_files", web::get().to(handlers::list_files))
            .route(
                "/list_files_sorted",
                web::get().to(handlers::list_files_sorted),
            )
            .route("/file_info/{filename}", web::get().to(handlers::file_info))
            .route("/set_folder", web::post().to(handlers::set_folder))
            .route("/health", web::get().to(health::health_check))
            .route("/metrics", web::get().to(health::detailed_metrics))
    })
    .bind(&bind_addr)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(server_result) => {
                    if let Err(e) = server_result {
                        error!("Server error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Server task error: {}", e);
                }
            }
        }
        _ = wait_for_shutdown() => {
            info!("Shutdown signal received, stopping server...");
            server_handle.stop(true).await;
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "speech_curator_backend=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

fn setup_signal_handlers() {
    tokio::spawn(async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .expect("Failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }

        SHUTDOWN_SIGNAL.store(true, Ordering::SeqCst);
    });
}

async fn wait_for_shutdown() {
    while !SHUTDOWN_SIGNAL.load(Ordering::SeqCst) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
