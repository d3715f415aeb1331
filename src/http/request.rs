//! Request framing and parsing.
//!
//! `RequestBuffer` accumulates socket bytes and finds frame boundaries (the
//! double-CRLF header terminator); `parse_request` turns one frame into a
//! structured request. The buffer keeps any pipelined remainder across
//! request/response cycles, so back-to-back requests in one TCP segment are
//! each served in order.

use crate::error::ConnectionError;

const FRAME_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Append-only byte buffer with a fixed capacity and a consume cursor.
pub struct RequestBuffer {
    buf: Vec<u8>,
    capacity: usize,
}

impl RequestBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::new(),
            capacity,
        }
    }

    /// Append received bytes. Fails when the fixed capacity would be
    /// exceeded, which aborts the connection (request-too-large).
    pub fn push(&mut self, bytes: &[u8]) -> Result<(), ConnectionError> {
        if self.buf.len() + bytes.len() > self.capacity {
            return Err(ConnectionError::BufferOverflow(self.capacity));
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Bytes of free space left before the capacity cap.
    pub fn remaining_capacity(&self) -> usize {
        self.capacity - self.buf.len().min(self.capacity)
    }

    /// Offset just past the first complete header block, if one is present.
    pub fn find_frame(&self) -> Option<usize> {
        self.buf
            .windows(FRAME_TERMINATOR.len())
            .position(|w| w == FRAME_TERMINATOR)
            .map(|i| i + FRAME_TERMINATOR.len())
    }

    /// Drop the first `n` consumed bytes, keeping any pipelined remainder.
    pub fn consume(&mut self, n: usize) {
        self.buf.drain(..n.min(self.buf.len()));
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// One parsed request, alive only until its response is sent.
#[derive(Debug)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub version: String,
    /// Ordered (name, value) pairs; names compare case-insensitively.
    pub headers: Vec<(String, String)>,
    /// Whether the connection must close after this response, per the
    /// `Connection` header or the protocol-version default.
    pub close: bool,
}

impl Request {
    /// First header value whose name matches, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parse one complete frame (everything up to and including the terminator).
///
/// Errors are connection-fatal: a non-GET method leaves the stream
/// unframeable (bodies are unsupported), and a colon-less header line means
/// the stream is corrupt.
pub fn parse_request(frame: &[u8]) -> Result<Request, ConnectionError> {
    let text = String::from_utf8_lossy(frame);
    let mut lines = text.split("\r\n");

    let request_line = lines.next().ok_or(ConnectionError::MalformedRequestLine)?;
    let (method, rest) = request_line
        .split_once(' ')
        .ok_or(ConnectionError::MalformedRequestLine)?;
    // The version token is optional; ancient clients send "GET /path" only.
    let (path, version) = match rest.split_once(' ') {
        Some((path, version)) => (path, version),
        None => (rest, "HTTP/1.0"),
    };
    if path.is_empty() {
        return Err(ConnectionError::MalformedRequestLine);
    }

    if !method.eq_ignore_ascii_case("GET") {
        return Err(ConnectionError::UnsupportedMethod(method.to_string()));
    }

    let mut close = !version.eq_ignore_ascii_case("HTTP/1.1");
    let mut headers = Vec::new();

    for line in lines {
        if line.is_empty() {
            break;
        }
        let (name, value) = line.split_once(':').ok_or(ConnectionError::MalformedHeader)?;
        let value = value.trim_start_matches([' ', '\t']);

        if name.eq_ignore_ascii_case("connection") {
            if value.eq_ignore_ascii_case("close") {
                close = true;
            }
            if value.eq_ignore_ascii_case("keep-alive") {
                close = false;
            }
        }

        headers.push((name.to_string(), value.to_string()));
    }

    Ok(Request {
        method: method.to_string(),
        path: path.to_string(),
        version: version.to_string(),
        headers,
        close,
    })
}
