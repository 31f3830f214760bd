//! cftrack - Application Entry Point

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cftrack::{
    codeforces::CodeforcesClient,
    config::CONFIG,
    create_router, db,
    db::repositories::SettingsRepository,
    error::expose_error_details,
    mailer,
    scheduler::SyncScheduler,
    services::SyncRunner,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| CONFIG.server.rust_log.clone().into());
    let registry = tracing_subscriber::registry().with(filter);
    if CONFIG.server.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(environment = %CONFIG.environment, "Starting cftrack server...");
    expose_error_details(!CONFIG.is_production());

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&CONFIG.database)
        .await
        .context("Failed to connect to database")?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&db_pool).await?;

    // Outbound integrations
    let platform = CodeforcesClient::new(&CONFIG.codeforces)?;
    let mailer = mailer::from_config(&CONFIG.mail)?;
    tracing::info!(
        api_url = %CONFIG.codeforces.api_url,
        transport = ?CONFIG.mail.transport,
        "Outbound clients ready"
    );

    let defaults = CONFIG.sync.settings_defaults();
    let runner = SyncRunner::new(
        db_pool.clone(),
        Arc::new(platform),
        Arc::from(mailer),
        CONFIG.sync.options(),
        defaults.clone(),
    );

    // Start the cron job from the stored schedule
    let settings = SettingsRepository::get_or_create(
        &db_pool,
        &defaults.sync_schedule,
        defaults.inactivity_threshold_days,
    )
    .await?;

    let scheduler = Arc::new(SyncScheduler::new(runner.clone()).await?);
    if let Err(e) = scheduler.start(&settings.sync_schedule).await {
        tracing::warn!(
            stored = %settings.sync_schedule,
            fallback = %defaults.sync_schedule,
            error = %e,
            "Stored sync schedule is invalid, using default"
        );
        scheduler.start(&defaults.sync_schedule).await?;
    }

    // Create application state
    let state = AppState::new(db_pool, CONFIG.clone(), runner, scheduler.clone());
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::new(CONFIG.server.host.parse()?, CONFIG.server.port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await?;
    tracing::info!("cftrack stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
