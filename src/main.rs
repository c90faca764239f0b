use library_api::{
    adapters::{
        postgres::{PostgresBookRepository, PostgresLoanRepository},
        smtp::SmtpMailDispatcher,
    },
    api::{handlers::AppState, router::create_router},
    application::ServiceDependencies,
    config::AppConfig,
    scheduler::{OverdueScanSchedule, spawn_overdue_scan},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // .envがあれば読み込む（なくてもよい）
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    // Initialize adapters
    let service_deps = ServiceDependencies {
        book_repository: Arc::new(PostgresBookRepository::new(pool.clone())),
        loan_repository: Arc::new(PostgresLoanRepository::new(pool.clone())),
        mail_dispatcher: Arc::new(SmtpMailDispatcher::new(&config.mail)?),
    };

    // 延滞通知バッチ
    let scheduler = config.scheduler.enabled.then(|| {
        spawn_overdue_scan(
            service_deps.clone(),
            OverdueScanSchedule {
                run_at: config.scheduler.run_at,
                message: config.scheduler.late_loans_message.clone(),
            },
        )
    });
    if scheduler.is_none() {
        tracing::warn!("Overdue scan scheduler is disabled");
    }

    // Create router
    let app = create_router(Arc::new(AppState { service_deps }));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = scheduler {
        handle.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}

/// Ctrl+Cを待つ
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
