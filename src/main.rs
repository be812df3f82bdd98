//! SchoolDesk admin server
//!
//! Main application entry point

use anyhow::Context;
use tracing::{info, error};

use SchoolDesk::{
    admin::{router, AppState},
    config::Settings,
    database::{create_pool, run_migrations, DatabaseService},
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("loading configuration")?;
    settings.validate()?;

    // Initialize logging; the guard keeps the file writer flushing
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", SchoolDesk::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = create_pool(&settings.database).await?;
    run_migrations(&db_pool).await?;

    // Initialize services
    let services = ServiceFactory::new(DatabaseService::new(db_pool));

    if let Some(user) = services.user_service.ensure_bootstrap_superuser(&settings.admin).await? {
        info!(user_id = user.id, username = %user.username, "Bootstrap superuser created");
    }

    let app = router(AppState::new(services, settings.admin.clone()));

    let addr = settings.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "Admin interface listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("SchoolDesk has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
