use std::net::SocketAddr;

use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use tasks_api::application::task_service::TaskServiceImpl;
use tasks_api::domain::repository::TaskRepository;
use tasks_api::http::routing::{self, tasks};
use tasks_api::infrastructure::sqlite_repo::{prepare_sqlite_file, SqliteTaskRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://tasks.db".to_string());
    prepare_sqlite_file(&database_url)?;
    let repo = SqliteTaskRepository::connect(&database_url).await?;
    repo.init().await?;
    let service = TaskServiceImpl::new(repo);
    let tasks_router = tasks::router(tasks::AppState { service });
    let router = routing::app(tasks_router).layer(CorsLayer::permissive());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
