// Connection handling module
// Accepts a single TCP connection and serves HTTP/1.1 on it

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};

use crate::config::{AppState, PerformanceConfig};
use crate::handler;
use crate::logger;

/// Decrements the active connection counter when dropped
struct ConnectionGuard(Arc<AtomicUsize>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Accept and process a connection, enforcing `performance.max_connections`.
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);
    let guard = ConnectionGuard(Arc::clone(conn_counter));

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    tracing::trace!(%peer_addr, "connection accepted");
    handle_connection(stream, peer_addr, Arc::clone(state), guard);
}

/// How long a connection may wait for a request's headers.
///
/// With keep-alive on this is the idle limit between requests on a reused
/// connection. Without it only the single request's headers are bounded.
fn header_read_limit(performance: &PerformanceConfig) -> Duration {
    if performance.keep_alive_timeout > 0 {
        Duration::from_secs(performance.keep_alive_timeout)
    } else {
        Duration::from_secs(performance.read_timeout)
    }
}

/// Serve one connection in a spawned task
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    guard: ConnectionGuard,
) {
    tokio::spawn(async move {
        let _guard = guard;
        let io = TokioIo::new(stream);
        let performance = &state.config.performance;

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .keep_alive(performance.keep_alive_timeout > 0)
            .header_read_timeout(header_read_limit(performance));

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
        );

        if let Err(err) = conn.await {
            if err.is_timeout() {
                tracing::debug!(%peer_addr, "connection closed after header read timeout");
            } else {
                logger::log_connection_error(&err);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::{create_reusable_listener, start_server_loop};
    use crate::store::Store;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::Notify;

    async fn serve(config: &Config) -> (SocketAddr, Arc<Notify>) {
        let store = Store::open(":memory:").expect("store");
        let state = Arc::new(AppState::with_store(config, store).expect("state"));
        let listener = create_reusable_listener("127.0.0.1:0".parse().expect("addr"), 16)
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let shutdown = Arc::new(Notify::new());
        tokio::spawn(start_server_loop(listener, state, Arc::clone(&shutdown)));
        (addr, shutdown)
    }

    /// Read until the peer closes the connection
    async fn read_to_close(stream: &mut TcpStream) -> Vec<u8> {
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return received,
                Ok(n) => received.extend_from_slice(&buf[..n]),
            }
        }
    }

    #[test]
    fn test_header_read_limit() {
        let mut config = Config::for_tests();
        config.performance.keep_alive_timeout = 75;
        config.performance.read_timeout = 30;
        assert_eq!(header_read_limit(&config.performance), Duration::from_secs(75));

        config.performance.keep_alive_timeout = 0;
        assert_eq!(header_read_limit(&config.performance), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_idle_keep_alive_connection_is_closed() {
        let mut config = Config::for_tests();
        config.performance.keep_alive_timeout = 1;
        let (addr, shutdown) = serve(&config).await;

        let mut stream = TcpStream::connect(addr).await.expect("connect");
        stream
            .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .expect("write request");

        let received = tokio::time::timeout(Duration::from_secs(10), read_to_close(&mut stream))
            .await
            .expect("idle connection closed within the keep-alive timeout");
        let response = String::from_utf8_lossy(&received);
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("\r\n\r\nok"));
        shutdown.notify_one();
    }

    #[tokio::test]
    async fn test_keep_alive_serves_several_requests() {
        let (addr, shutdown) = serve(&Config::for_tests()).await;
        let mut stream = TcpStream::connect(addr).await.expect("connect");
        let mut buf = [0u8; 1024];

        for _ in 0..2 {
            stream
                .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\n\r\n")
                .await
                .expect("write request");
            let mut received = Vec::new();
            while !received.ends_with(b"\r\n\r\nok") {
                let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
                    .await
                    .expect("response arrives")
                    .expect("read");
                assert_ne!(n, 0, "connection closed before the response completed");
                received.extend_from_slice(&buf[..n]);
            }
            assert!(received.starts_with(b"HTTP/1.1 200 OK"));
        }
        shutdown.notify_one();
    }
}
