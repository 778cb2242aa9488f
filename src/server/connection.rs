// Connection handling module
// Serves a single accepted TCP connection on its own task

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::error::ServerError;
use crate::handler;
use crate::logger;

/// Accept a connection and serve it on a spawned task.
///
/// Failures on this connection are logged and never reach other connections.
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    state.connection_opened();
    if state.config.logging.access_log {
        logger::log_connection_accepted(&peer_addr);
    }

    let state = Arc::clone(state);
    tokio::spawn(async move {
        handle_connection(stream, peer_addr, &state).await;
        state.connection_closed();
    });
}

/// Serve HTTP/1.1 on `stream` until the client closes it or the timeout fires
async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    let io = TokioIo::new(stream);
    let performance = &state.config.performance;

    let mut builder = http1::Builder::new();
    builder.keep_alive(performance.keep_alive).timer(TokioTimer::new());

    let service_state = Arc::clone(state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
    );

    if performance.connection_timeout == 0 {
        if let Err(err) = conn.await {
            logger::log_connection_error(&ServerError::Transport(err));
        }
        return;
    }

    let timeout = Duration::from_secs(performance.connection_timeout);
    match tokio::time::timeout(timeout, conn).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => logger::log_connection_error(&ServerError::Transport(err)),
        Err(_) => logger::log_connection_timeout(&peer_addr, performance.connection_timeout),
    }
}
