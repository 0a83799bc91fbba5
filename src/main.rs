//! Racing Form API
//!
//! REST API and CLI for querying races, runners and form lines, with
//! per-runner win/place statistics.

mod cli;
mod config;
mod courses;
mod error;
mod query;
mod routes;
mod service;
mod stats;
mod storage;
mod types;

use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::courses::CourseTable;
use crate::routes::AppState;
use crate::storage::RaceRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => run_server(host, port).await,
        Commands::Races { filters, output } => cli::run_races(filters, output),
        Commands::Form {
            runner_id,
            filters,
            output,
        } => cli::run_form(runner_id, filters, output),
        Commands::Stats {
            race_id,
            filters,
            output,
        } => cli::run_stats(race_id, filters, output),
        Commands::Courses { output } => cli::run_courses(output),
    }
}

/// Run the API server.
async fn run_server(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "racing_form_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = AppConfig::load()?;

    // Override with CLI args
    if let Some(h) = host {
        config.server.host = h;
    }
    if let Some(p) = port {
        config.server.port = p;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("Database path: {}", config.database.path);

    let repo = RaceRepository::new(Path::new(&config.database.path))?;
    let courses = CourseTable::load(config.courses.path.as_deref())?;
    tracing::info!("Course table: {} courses", courses.len());

    // Create application state
    let state = Arc::new(AppState {
        store: Arc::new(repo),
        courses: Arc::new(courses),
    });

    let app = routes::router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
