//! Response framing and body transmission.
//!
//! Status line, the fixed header block (`Date`, `Server`, `Connection`,
//! `Content-Length`, `Content-Type`), blank line, body. Bodies come either
//! from memory or are streamed from a file in fixed-size chunks; a file that
//! cannot be stat'ed is connection-fatal before any bytes go out, and any
//! partial-send failure aborts the connection without completing the body.

use std::borrow::Cow;
use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ConnectionError;
use crate::http::clock::{httpdate, Clock};

/// Chunk size for file bodies.
const FILE_CHUNK: usize = 8192;

/// Fixed body for unknown routes, served byte-for-byte.
pub const NOT_FOUND_BODY: &[u8] = b"<html><head><title>Resource not found</title></head><body><h1>Resource not found</h1><br>This HTTP server offers very limited resources.</body></html>";

/// Fixed plain-text body shared by every 500-class failure.
pub const EVENT_ERROR_BODY: &[u8] = b"Event Error";

/// Where a response body comes from.
pub enum Body {
    Bytes(Cow<'static, [u8]>),
    File(PathBuf),
}

/// A response ready for framing.
pub struct Response {
    pub status: u16,
    pub reason: &'static str,
    pub content_type: &'static str,
    pub body: Body,
}

impl Response {
    /// 200 with an empty text/plain body. The empty body is deliberate: the
    /// client evaluates it as a script, and "nothing to do" is the common
    /// answer.
    pub fn ok_empty() -> Self {
        Self {
            status: 200,
            reason: "OK",
            content_type: "text/plain",
            body: Body::Bytes(Cow::Borrowed(b"")),
        }
    }

    /// The generic 500 used for failed events and missing sessions alike.
    pub fn event_error() -> Self {
        Self {
            status: 500,
            reason: "Event Error",
            content_type: "text/plain",
            body: Body::Bytes(Cow::Borrowed(EVENT_ERROR_BODY)),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            reason: "Resource not found",
            content_type: "text/html",
            body: Body::Bytes(Cow::Borrowed(NOT_FOUND_BODY)),
        }
    }

    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            status: 200,
            reason: "OK",
            content_type: "image/png",
            body: Body::Bytes(Cow::Owned(bytes)),
        }
    }

    pub fn file(path: PathBuf, content_type: &'static str) -> Self {
        Self {
            status: 200,
            reason: "OK",
            content_type,
            body: Body::File(path),
        }
    }
}

/// Frames responses onto a socket. Holds the clock so the `Date` header is
/// an injected dependency rather than a hardcoded string.
pub struct ResponseWriter<'a> {
    clock: &'a dyn Clock,
}

impl<'a> ResponseWriter<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self { clock }
    }

    /// Send the full response. The status line echoes the request's protocol
    /// version; `close` selects the advertised `Connection` disposition.
    pub async fn write<W>(
        &self,
        writer: &mut W,
        version: &str,
        close: bool,
        response: Response,
    ) -> Result<(), ConnectionError>
    where
        W: AsyncWrite + Unpin,
    {
        // Content-Length must be known before the header block goes out, so
        // a file body is stat'ed first. Failure here is connection-fatal: the
        // route promised a file it cannot deliver.
        let content_length = match &response.body {
            Body::Bytes(bytes) => bytes.len() as u64,
            Body::File(path) => tokio::fs::metadata(path)
                .await
                .map_err(ConnectionError::BodyFile)?
                .len(),
        };

        let header = format!(
            "{} {} {}\r\nDate: {}\r\nServer: webdraw\r\nConnection: {}\r\nContent-Length: {}\r\nContent-Type: {}\r\n\r\n",
            version,
            response.status,
            response.reason,
            httpdate(self.clock.now()),
            if close { "close" } else { "keep-alive" },
            content_length,
            response.content_type,
        );
        writer.write_all(header.as_bytes()).await?;

        match response.body {
            Body::Bytes(bytes) => writer.write_all(&bytes).await?,
            Body::File(path) => {
                let mut file = File::open(&path).await.map_err(ConnectionError::BodyFile)?;
                let mut remaining = content_length;
                let mut chunk = [0u8; FILE_CHUNK];
                while remaining > 0 {
                    let want = (remaining as usize).min(FILE_CHUNK);
                    let n = file
                        .read(&mut chunk[..want])
                        .await
                        .map_err(ConnectionError::BodyFile)?;
                    if n == 0 {
                        // File shrank under us after the length was advertised.
                        return Err(ConnectionError::BodyFile(std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            "file body ended early",
                        )));
                    }
                    writer.write_all(&chunk[..n]).await?;
                    remaining -= n as u64;
                }
            }
        }
        writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2008, 2, 21, 8, 16, 3).unwrap())
    }

    #[tokio::test]
    async fn frames_memory_body_exactly() {
        let clock = fixed_clock();
        let writer = ResponseWriter::new(&clock);
        let mut out = Vec::new();
        writer
            .write(&mut out, "HTTP/1.1", false, Response::event_error())
            .await
            .unwrap();
        let expected = "HTTP/1.1 500 Event Error\r\n\
                        Date: Thu, 21 Feb 2008 08:16:03 GMT\r\n\
                        Server: webdraw\r\n\
                        Connection: keep-alive\r\n\
                        Content-Length: 11\r\n\
                        Content-Type: text/plain\r\n\r\n\
                        Event Error";
        assert_eq!(out, expected.as_bytes());
    }

    #[tokio::test]
    async fn close_disposition_is_advertised() {
        let clock = fixed_clock();
        let writer = ResponseWriter::new(&clock);
        let mut out = Vec::new();
        writer
            .write(&mut out, "HTTP/1.0", true, Response::ok_empty())
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.contains("Content-Length: 0\r\n"));
    }

    #[tokio::test]
    async fn missing_file_body_is_fatal_before_any_bytes() {
        let clock = fixed_clock();
        let writer = ResponseWriter::new(&clock);
        let mut out = Vec::new();
        let resp = Response::file(PathBuf::from("/nonexistent/asset.html"), "text/html");
        let err = writer
            .write(&mut out, "HTTP/1.1", false, resp)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::BodyFile(_)));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn streams_file_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("asset.txt");
        std::fs::write(&path, b"hello file body").unwrap();

        let clock = fixed_clock();
        let writer = ResponseWriter::new(&clock);
        let mut out = Vec::new();
        writer
            .write(
                &mut out,
                "HTTP/1.1",
                false,
                Response::file(path, "text/plain"),
            )
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Content-Length: 15\r\n"));
        assert!(text.ends_with("hello file body"));
    }
}
