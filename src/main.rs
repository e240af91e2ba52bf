use std::sync::Arc;

use tokio::sync::Notify;

mod auth;
mod config;
mod forms;
mod handler;
mod http;
mod logger;
mod routing;
mod server;
mod session;
mod store;
mod templates;

/// Config file looked up when no path is given (extension optional)
const DEFAULT_CONFIG_PATH: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg.logging)?;

    // Create the Tokio runtime, sized by `server.workers` when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        tracing::debug!(workers, "Using configured worker threads");
    } else {
        tracing::debug!("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr, cfg.server.backlog)?;
    let state = Arc::new(config::AppState::new(&cfg)?);

    logger::log_server_start(&addr, &cfg);
    tracing::info!(
        max_body_size = cfg.http.max_body_size,
        max_connections = ?cfg.performance.max_connections,
        "Loaded configuration"
    );

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;
    server::start_server_loop(listener, state, shutdown).await;

    tracing::info!("Server stopped");
    Ok(())
}
