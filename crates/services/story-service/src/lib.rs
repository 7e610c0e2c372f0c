//! Story Service Library
//!
//! Challenge stories: posting images, reporting, and listing a user's
//! stories over HTTP. Persistence uses SeaORM, images go to a pluggable
//! image store.

pub mod api;
pub mod config;
pub mod infra;
pub mod repository;
pub mod service;
pub mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::{StorageConfig, StoryServiceConfig};
use crate::infra::{Database, Persistence};
use crate::service::{StoryManager, TracingStoryEvents};
use crate::storage::build_image_store;

/// Run the HTTP server using configuration from the environment.
pub async fn run(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = StoryServiceConfig::from_env();
    config.service.host = host.to_string();
    config.service.port = port;
    run_server_with_config(config).await
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = StoryServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Run the HTTP server with the given configuration.
async fn run_server_with_config(
    config: StoryServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let policy = config.story_policy()?;

    // Initialize database
    let db = Arc::new(Database::connect(&config.database).await?);

    // Wire service
    let uow = Arc::new(Persistence::new(db.get_connection()));
    let images = build_image_store(&config.storage).await?;
    let story_service = Arc::new(StoryManager::new(
        uow,
        images,
        Arc::new(TracingStoryEvents),
        policy,
    ));

    let state = AppState::new(story_service, db).with_max_upload_bytes(config.max_upload_bytes);

    // Build router; local uploads are served by this process
    let mut app = create_router(state);
    if let StorageConfig::Local { root, .. } = &config.storage {
        app = app.nest_service("/uploads", ServeDir::new(root));
    }
    let app = app.layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.service.bind_addr().parse()?;
    info!(
        "{} listening on {} (report threshold {})",
        config.service.service_name,
        addr,
        policy.report_threshold()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
