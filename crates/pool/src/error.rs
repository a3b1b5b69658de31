use thiserror::Error;

/// Problems admitting, removing, or driving sockets in a [`crate::ConnectionPool`].
#[derive(Debug, Error)]
pub enum PoolError {
    /// Registering a socket with the OS readiness poller failed.
    #[error("failed to register socket {token} with the poller: {source}")]
    Register {
        /// `mio` token assigned to the socket.
        token: usize,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// No socket in the pool is currently usable.
    #[error("no sockets remain in the pool")]
    NoSocketsAvailable,

    /// A socket that a caller referenced by token is not part of this pool.
    #[error("unknown socket token {0}")]
    UnknownToken(usize),

    /// The peer requested a resend of a frame the sender no longer has
    /// recorded, and it could not be regenerated.
    #[error("peer requested resend of a frame that was never sent or already evicted")]
    ResendUnavailable,

    /// A read or write on a socket failed in a way that was not simple
    /// backpressure (`WouldBlock`).
    #[error("socket {token} IO failure: {source}")]
    SocketIo {
        /// `mio` token assigned to the socket.
        token: usize,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
