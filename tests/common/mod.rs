//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use webdraw::config::ServerConfig;
use webdraw::http::Server;
use webdraw::net::Listener;

/// A running server plus the temp dir holding its static assets. The dir
/// must outlive the server, so it rides along.
pub struct TestServer {
    pub addr: SocketAddr,
    pub static_dir: tempfile::TempDir,
}

impl TestServer {
    #[allow(dead_code)]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Write the static assets a test server serves, including a small white
/// template PNG.
pub fn populate_static_dir(dir: &Path) {
    std::fs::write(dir.join("page.html"), "<html><body>draw</body></html>").unwrap();
    std::fs::write(dir.join("page-test.html"), "<html><body>test</body></html>").unwrap();

    let template = image::RgbaImage::from_pixel(64, 64, image::Rgba([255, 255, 255, 255]));
    template
        .save_with_format(dir.join("blank.png"), image::ImageFormat::Png)
        .unwrap();
}

/// Start a server on an ephemeral port with per-test static assets.
pub async fn start_server() -> TestServer {
    start_server_with(|_| {}).await
}

/// Start a server after letting the test adjust the config.
pub async fn start_server_with<F>(adjust: F) -> TestServer
where
    F: FnOnce(&mut ServerConfig),
{
    let static_dir = tempfile::tempdir().unwrap();
    populate_static_dir(static_dir.path());

    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1".to_string();
    config.listener.port = 0;
    config.statics.dir = static_dir.path().to_path_buf();
    config.statics.template = static_dir.path().join("blank.png");
    adjust(&mut config);

    let listener = Listener::bind(&config.listener).await;
    let addr = listener.local_addr().unwrap();
    let server = Server::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    TestServer { addr, static_dir }
}

/// One parsed raw-socket response.
#[allow(dead_code)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Read exactly one Content-Length-framed response off the stream. Panics
/// on malformed framing; these tests own both ends of the wire.
#[allow(dead_code)]
pub async fn read_response(stream: &mut TcpStream) -> RawResponse {
    // Read one byte at a time so a pipelined follow-up response is never
    // pulled off the stream and lost here.
    let mut buf = Vec::new();
    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let mut chunk = [0u8; 1];
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before a full response header");
        buf.extend_from_slice(&chunk[..n]);
    };

    let header_text = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = header_text.split("\r\n");
    let status_line = lines.next().unwrap();
    let status: u16 = status_line.split(' ').nth(1).unwrap().parse().unwrap();
    let headers: Vec<(String, String)> = lines
        .take_while(|l| !l.is_empty())
        .filter_map(|l| {
            l.split_once(':')
                .map(|(n, v)| (n.to_string(), v.trim_start().to_string()))
        })
        .collect();

    let content_length: usize = headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .map(|(_, v)| v.parse().unwrap())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let mut chunk = [0u8; 4096];
        let want = (content_length - body.len()).min(chunk.len());
        let n = stream.read(&mut chunk[..want]).await.unwrap();
        assert!(n > 0, "connection closed mid-body");
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    RawResponse {
        status,
        headers,
        body,
    }
}

/// Send raw bytes and collect responses until the peer closes or `count`
/// responses have arrived.
#[allow(dead_code)]
pub async fn exchange(addr: SocketAddr, request: &[u8], count: usize) -> Vec<RawResponse> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();
    let mut responses = Vec::new();
    for _ in 0..count {
        responses.push(read_response(&mut stream).await);
    }
    responses
}
