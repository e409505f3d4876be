//! Local HTTP stub answering a fixed sequence of responses.

use reqwest::StatusCode;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl StubServer {
    /// Serves `responses` in order, one per connection, then stops accepting.
    pub async fn start(responses: Vec<(StatusCode, Value)>) -> Self {
        // port 0 lets the OS pick a free port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let request = read_body(&mut stream).await;
                recorded
                    .lock()
                    .unwrap()
                    .push(serde_json::from_slice(&request).unwrap_or(Value::Null));

                let body = body.to_string();
                let response = format!(
                    "HTTP/1.1 {} {}\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\
                     \r\n\
                     {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or(""),
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { url, requests }
    }

    /// JSON bodies received so far.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_body(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return Vec::new(),
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|len| len.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let start = end + 4;
            if buf.len() >= start + len {
                return buf[start..start + len].to_vec();
            }
        }
    }
}
