// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Organizer-Sync API Server
//!
//! Serves the binary sync protocol over HTTP and purges expired tokens in
//! the background.

use organizer_sync::{config::Config, db::Db, services::spawn_token_purge, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        port = config.port,
        local_only = config.local_only,
        max_record_count = config.max_record_count,
        "Starting Organizer-Sync API"
    );

    // Open database and create tables
    let db = Db::open(&config.database_path).expect("Failed to open database");
    tracing::info!(path = %config.database_path, "Database ready");

    if config.clear_db_auth || config.clear_db_data {
        let results = db
            .reset_tables(config.clear_db_auth, config.clear_db_data)
            .expect("Failed to reset tables");
        for (table, result) in results {
            if let Err(e) = result {
                tracing::error!(table, error = %e, "Table reset failed");
            }
        }
    }

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db));

    let purge = spawn_token_purge(state.tokens.clone(), config.token_purge_interval);
    tracing::info!(
        interval_secs = config.token_purge_interval.as_secs(),
        "Token purge scheduled"
    );

    // Build router
    let app = organizer_sync::routes::create_router(state);

    // Start server
    let host = if config.local_only {
        "127.0.0.1"
    } else {
        "0.0.0.0"
    };
    let addr = format!("{host}:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("organizer_sync=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
