//! Launcher error type.

use std::net::SocketAddr;

/// Fatal launcher failures. Everything here ends the process; per-request
/// problems are answered over HTTP instead.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid {var}: {value:?}")]
    InvalidConfig { var: &'static str, value: String },

    /// The upstream HTTP client could not be built.
    #[error("http client build failed: {0}")]
    HttpClient(String),

    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The server loop exited with an I/O error.
    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}
