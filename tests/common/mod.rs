//! A throwaway HTTP server standing in for the Gemini endpoint.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use serde_json::json;

/// `(method, path)` of a received request.
pub type Seen = (String, String);

type Responder = dyn Fn(&str, &str) -> (u16, String) + Send + Sync;

pub struct GeminiStub {
    base: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl GeminiStub {
    /// Serve `responder(method, path)` on a loopback port, one request per
    /// connection.
    pub fn start<F>(responder: F) -> Self
    where
        F: Fn(&str, &str) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let responder: Arc<Responder> = Arc::new(responder);

        let log = Arc::clone(&seen);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                handle(stream, &*responder, &log);
            }
        });

        Self { base, seen }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().clone()
    }
}

fn handle(stream: TcpStream, responder: &Responder, log: &Mutex<Vec<Seen>>) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 || line.trim().is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }

    let (status, payload) = responder(&method, &path);
    log.lock().push((method, path));

    let response = format!(
        "HTTP/1.1 {status} Stub\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{payload}",
        payload.len()
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

pub fn metadata(resource: &str) -> String {
    json!({
        "name": resource,
        "supportedGenerationMethods": ["generateContent"]
    })
    .to_string()
}

/// A `generateContent` reply carrying the fruit puzzle with "Wrench" as the
/// outlier.
pub fn fruit_reply() -> String {
    let puzzle = json!({
        "tokens": ["Apple", "Banana", "Wrench", "Cherry", "Grape"],
        "answer_index": 2,
        "category": "Fruits",
        "explanation": "A wrench is a tool; the rest are fruits."
    });
    json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": puzzle.to_string() } ] } }
        ]
    })
    .to_string()
}
