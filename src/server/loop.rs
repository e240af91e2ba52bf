// Server loop module
// Accepts connections until shutdown is requested, then drains active ones

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop until `shutdown` is notified.
///
/// After shutdown the listener is closed and in-flight connections get up to
/// `performance.shutdown_grace` seconds to finish.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.notified() => {
                tracing::info!("Shutdown requested, no longer accepting connections");
                break;
            }
        }
    }

    drop(listener);
    drain_connections(&active_connections, state.config.performance.shutdown_grace).await;
}

/// Wait for in-flight connections to finish, up to `grace_secs`
async fn drain_connections(active: &AtomicUsize, grace_secs: u64) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(grace_secs);
    while active.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown grace period elapsed with {} connection(s) still open",
                active.load(Ordering::SeqCst)
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
    tracing::info!("All connections closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_returns_when_idle() {
        let active = AtomicUsize::new(0);
        drain_connections(&active, 5).await;
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_grace() {
        let active = AtomicUsize::new(1);
        tokio::time::timeout(Duration::from_secs(5), drain_connections(&active, 0))
            .await
            .expect("drain stops at the deadline");
    }

    #[tokio::test]
    async fn test_loop_stops_on_shutdown() {
        let state = Arc::new(AppState::for_tests());
        let listener = crate::server::create_reusable_listener(
            "127.0.0.1:0".parse().expect("addr"),
            16,
        )
        .expect("bind");
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(start_server_loop(listener, state, Arc::clone(&shutdown)));
        shutdown.notify_one();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("loop exits")
            .expect("loop task");
    }
}
