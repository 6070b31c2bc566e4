//! Google Gemini over the Generative Language REST API.
//!
//! Connecting resolves the model's metadata (`GET /v1beta/models/{id}`) so an
//! unknown identifier fails before any prompt is sent. Metadata lookups are
//! cached per resource name for the lifetime of the provider.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::types::{ModelError, ModelProvider, PuzzleModel};

/// Public endpoint of the Generative Language API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

const API_VERSION: &str = "v1beta";
const GENERATE_CONTENT: &str = "generateContent";

/// Model metadata as returned by `models.get`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|method| method == GENERATE_CONTENT)
    }
}

/// Connects to Gemini models with an API key.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    known: Mutex<HashMap<String, ModelInfo>>,
    missing: Mutex<HashSet<String>>,
}

impl GeminiProvider {
    /// Create a provider whose requests time out after `timeout`.
    pub fn new(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            known: Mutex::new(HashMap::new()),
            missing: Mutex::new(HashSet::new()),
        })
    }

    async fn model_info(&self, resource: &str) -> Result<ModelInfo, ModelError> {
        if let Some(info) = self.known.lock().get(resource) {
            return Ok(info.clone());
        }
        if self.missing.lock().contains(resource) {
            return Err(ModelError::NotFound(resource.to_string()));
        }

        let url = format!("{}/{}/{}", self.api_base, API_VERSION, resource);
        debug!(resource = %resource, "Fetching model metadata");
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = status_error(resource, status.as_u16(), body);
            if matches!(err, ModelError::NotFound(_)) {
                self.missing.lock().insert(resource.to_string());
            }
            return Err(err);
        }

        let info: ModelInfo = response.json().await?;
        self.known.lock().insert(resource.to_string(), info.clone());
        Ok(info)
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn connect(
        &self,
        identifier: &str,
        system_instruction: &str,
        response_schema: Option<&Value>,
    ) -> Result<Box<dyn PuzzleModel>, ModelError> {
        let resource = resource_name(identifier)?;
        let info = self.model_info(&resource).await?;

        if !info.supports_generate_content() {
            return Err(ModelError::Unsupported(identifier.to_string()));
        }
        if response_schema.is_some() && !supports_structured_output(&resource) {
            return Err(ModelError::StructuredOutputUnavailable(
                identifier.to_string(),
            ));
        }

        info!(
            model = %identifier,
            resource = %info.name,
            display_name = info.display_name.as_deref().unwrap_or(""),
            structured = response_schema.is_some(),
            "Gemini model ready"
        );

        Ok(Box::new(GeminiModel {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            url: format!(
                "{}/{}/{}:{}",
                self.api_base, API_VERSION, resource, GENERATE_CONTENT
            ),
            identifier: identifier.to_string(),
            system_instruction: system_instruction.to_string(),
            response_schema: response_schema.cloned(),
        }))
    }
}

/// A Gemini model bound to a system instruction and output mode.
pub struct GeminiModel {
    client: reqwest::Client,
    api_key: String,
    url: String,
    identifier: String,
    system_instruction: String,
    response_schema: Option<Value>,
}

impl GeminiModel {
    fn request_body(&self, prompt: &str) -> Value {
        build_request_body(&self.system_instruction, prompt, self.response_schema.as_ref())
    }
}

#[async_trait]
impl PuzzleModel for GeminiModel {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn is_structured(&self) -> bool {
        self.response_schema.is_some()
    }

    async fn generate(&self, prompt: &str) -> Result<Value, ModelError> {
        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(&self.identifier, status.as_u16(), body));
        }

        Ok(response.json().await?)
    }
}

/// Map a model identifier in bare (`gemini-2.5-flash`) or namespaced
/// (`models/gemini-2.5-flash`) form to its API resource name.
pub fn resource_name(identifier: &str) -> Result<String, ModelError> {
    let invalid = || ModelError::InvalidIdentifier(identifier.to_string());
    let id = identifier.trim();
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    match id.split_once('/') {
        None => Ok(format!("models/{id}")),
        Some((collection, name))
            if (collection == "models" || collection == "tunedModels")
                && !name.is_empty()
                && !name.contains('/') =>
        {
            Ok(id.to_string())
        }
        Some(_) => Err(invalid()),
    }
}

/// JSON mode and response schemas arrived with Gemini 1.5; the 1.0 family
/// rejects them.
fn supports_structured_output(resource: &str) -> bool {
    let name = resource.rsplit('/').next().unwrap_or(resource);
    !(name.starts_with("gemini-1.0") || name == "gemini-pro" || name.starts_with("gemini-pro-"))
}

fn status_error(subject: &str, status: u16, body: String) -> ModelError {
    if status == 404 {
        ModelError::NotFound(subject.to_string())
    } else {
        ModelError::Status { status, body }
    }
}

fn build_request_body(system_instruction: &str, prompt: &str, schema: Option<&Value>) -> Value {
    let mut body = json!({
        "systemInstruction": {
            "parts": [ { "text": system_instruction } ]
        },
        "contents": [
            { "role": "user", "parts": [ { "text": prompt } ] }
        ]
    });
    if let Some(schema) = schema {
        body["generationConfig"] = json!({
            "responseMimeType": "application/json",
            "responseSchema": schema
        });
    }
    body
}
