//! Todo List Web Entry Point

mod app;
mod commands;
mod config;
mod context;
mod error;
mod models;

#[cfg(test)]
mod tests;

use rolling_logger::LoggerConfig;
use todo_list_lib::repository::parse_connection_string;
use todo_list_lib::AppState;
use tokio::net::TcpListener;

use app::build_router;
use config::Config;
use context::WebState;

#[tokio::main]
async fn main() -> Result<(), String> {
    // a missing .env file is fine
    let _ = dotenvy::dotenv();
    let config = Config::from_env().map_err(|e| e.to_string())?;

    rolling_logger::init(
        LoggerConfig::new(config.log_dir.clone(), "TodoList").with_filter(&config.log_filter),
    )?;

    let db_path = parse_connection_string(&config.database_url)?;
    let app_state = match AppState::open(&db_path).await {
        Ok(state) => state,
        Err(e) => {
            let _ = rolling_logger::error(&format!("DB init failed: {}", e));
            return Err(e);
        }
    };

    tracing::info!(db = %app_state.db_state.path().display(), "database opened");

    let bind_addr = config.bind_addr;
    let router = build_router(WebState::new(app_state, config));
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!(addr = %bind_addr, started = %chrono::Local::now().format("%H:%M:%S%.3f"), "todo list listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("server error: {}", e))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
