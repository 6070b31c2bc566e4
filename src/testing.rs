//! Test doubles shared by unit tests: a scripted model provider and a
//! minimal HTTP server standing in for the Gemini endpoint.

use std::collections::{HashMap, VecDeque};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::models::{ModelError, ModelProvider, PuzzleModel, MODEL_NAMESPACE};

pub(crate) type Step = Result<Value, ModelError>;

type Script = Arc<Mutex<VecDeque<Step>>>;

/// Serves canned replies per model. Unknown models fail to connect with
/// `ModelError::NotFound`; a model whose script runs dry answers with a 500.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    scripts: HashMap<String, Script>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn model(mut self, name: &str, steps: Vec<Step>) -> Self {
        self.scripts
            .insert(name.to_string(), Arc::new(Mutex::new(steps.into())));
        self
    }

    /// `(model, prompt)` for every generate call, in order.
    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    pub(crate) fn calls_to(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|(m, _)| m == name).count()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn connect(
        &self,
        identifier: &str,
        _system_instruction: &str,
        response_schema: Option<&Value>,
    ) -> Result<Box<dyn PuzzleModel>, ModelError> {
        let name = identifier
            .strip_prefix(MODEL_NAMESPACE)
            .unwrap_or(identifier);
        let script = self
            .scripts
            .get(name)
            .ok_or_else(|| ModelError::NotFound(identifier.to_string()))?;
        Ok(Box::new(ScriptedModel {
            name: name.to_string(),
            structured: response_schema.is_some(),
            script: Arc::clone(script),
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct ScriptedModel {
    name: String,
    structured: bool,
    script: Script,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl PuzzleModel for ScriptedModel {
    fn identifier(&self) -> &str {
        &self.name
    }

    fn is_structured(&self) -> bool {
        self.structured
    }

    async fn generate(&self, prompt: &str) -> Result<Value, ModelError> {
        self.calls
            .lock()
            .push((self.name.clone(), prompt.to_string()));
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| {
            Err(ModelError::Status {
                status: 500,
                body: "script exhausted".into(),
            })
        })
    }
}

/// A Gemini-shaped response body carrying `text`.
pub(crate) fn reply_text(text: &str) -> Step {
    Ok(json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    }))
}

pub(crate) fn puzzle_reply(tokens: [&str; 5], answer_index: usize, category: &str) -> Step {
    let payload = json!({
        "tokens": tokens,
        "answer_index": answer_index,
        "category": category,
        "explanation": format!("Four of these are {category}."),
    });
    reply_text(&payload.to_string())
}

pub(crate) fn fruit_reply() -> Step {
    puzzle_reply(["Apple", "Banana", "Wrench", "Cherry", "Grape"], 2, "Fruits")
}

pub(crate) fn garbage_reply() -> Step {
    reply_text("Sorry, I could not come up with a puzzle this time.")
}

pub(crate) fn quota_error() -> Step {
    Err(ModelError::Status {
        status: 429,
        body: r#"{"error": {"code": 429, "status": "RESOURCE_EXHAUSTED"}}"#.into(),
    })
}

pub(crate) fn server_error() -> Step {
    Err(ModelError::Status {
        status: 503,
        body: "backend overloaded".into(),
    })
}

// =========================================================================
// HTTP stub
// =========================================================================

/// One request received by [`StubServer`].
#[derive(Debug, Clone)]
pub(crate) struct StubRequest {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) api_key: Option<String>,
    pub(crate) body: String,
}

type Responder = dyn Fn(&StubRequest) -> (u16, String) + Send + Sync;

/// Answers every connection with the responder's status and JSON body, one
/// request per connection.
pub(crate) struct StubServer {
    base: String,
    requests: Arc<Mutex<Vec<StubRequest>>>,
}

impl StubServer {
    pub(crate) fn start<F>(responder: F) -> Self
    where
        F: Fn(&StubRequest) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responder: Arc<Responder> = Arc::new(responder);

        let log = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                serve(stream, &*responder, &log);
            }
        });

        Self { base, requests }
    }

    /// Value for `GeminiProvider::new`'s `api_base`.
    pub(crate) fn base(&self) -> &str {
        &self.base
    }

    pub(crate) fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().clone()
    }
}

fn serve(stream: TcpStream, responder: &Responder, log: &Mutex<Vec<StubRequest>>) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut api_key = None;
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 || line.trim().is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().unwrap_or(0),
                "x-goog-api-key" => api_key = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    let mut body = vec![0; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }

    let request = StubRequest {
        method,
        path,
        api_key,
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    let (status, payload) = responder(&request);
    log.lock().push(request);

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

/// `models.get` metadata for a model that supports `generateContent`.
pub(crate) fn model_metadata(resource: &str) -> String {
    json!({
        "name": resource,
        "displayName": "Stub model",
        "supportedGenerationMethods": ["generateContent", "countTokens"]
    })
    .to_string()
}
