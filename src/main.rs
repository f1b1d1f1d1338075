// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use hookrelay::app;
use hookrelay::config::settings::Settings;
use hookrelay::infrastructure::database::connection;
use hookrelay::infrastructure::messenger::client::MessengerClient;
use hookrelay::infrastructure::metrics;
use hookrelay::presentation::routes;
use hookrelay::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Arc::new(Settings::new()?);
    telemetry::init_telemetry(&settings.logging);
    info!("Starting hookrelay...");
    info!("Configuration loaded");

    metrics::init_metrics(&settings.metrics);

    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);
    info!("Database connection established");

    let client = Arc::new(MessengerClient::from_settings(&settings.messenger)?);
    let (state, supervisor) = app::assemble(settings.clone(), db, client);
    let app = routes::routes(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 进行中的重试不持久化，随进程退出
    supervisor.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
