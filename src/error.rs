//! Error taxonomy for the connection layer.
//!
//! Errors come in two tiers. `ConnectionError` is connection-fatal: the
//! socket is torn down and no (further) response is sent. Request-recoverable
//! failures (unknown route, missing session, bad event arguments) are not
//! errors at all here; they are ordinary `Response` values built by the
//! handler, and the connection stays usable afterwards.

use thiserror::Error;

/// Fatal per-connection failures. Each of these ends the connection
/// immediately without attempting a response.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Socket receive/send failure.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// No bytes arrived within the configured read idle window.
    #[error("connection idle past the read timeout")]
    ReadTimeout,

    /// The request buffer filled up before the header terminator appeared.
    #[error("request exceeded the {0}-byte buffer before headers completed")]
    BufferOverflow(usize),

    /// Anything other than GET. This server carries no request bodies, so an
    /// unknown method leaves the stream unframeable.
    #[error("unsupported method {0:?}")]
    UnsupportedMethod(String),

    /// Request line missing its resource token.
    #[error("malformed request line")]
    MalformedRequestLine,

    /// A header line without a colon. The stream is presumed corrupted, so
    /// this aborts the connection rather than just the request.
    #[error("malformed header line")]
    MalformedHeader,

    /// A route promised a file body that could not be read. Headers may
    /// already be on the wire, so the only safe move is to drop the
    /// connection.
    #[error("static body file unavailable: {0}")]
    BodyFile(std::io::Error),
}
