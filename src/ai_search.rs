//! Natural-language product search.
//!
//! [`QueryInterpreter`] turns free text into catalog filters by asking an
//! external language model, and degrades to a plain substring search when the
//! model is not configured, too slow, or replies with something unusable.

use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Map, Value, json};

use crate::config::AiSearchConfig;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const SYSTEM_PROMPT: &str = "\
You are the search assistant of a marketplace where non-profit organizations sell products.
Read the shopper's query and answer with a single JSON object following the response schema.
- When the query names a kind of product, fill `category` (e.g. Alimentos, Vestuário, Decoração, Acessórios).
- When the query mentions amounts ('up to 50', 'above 10', 'between 10 and 30'), fill `price_min` and/or `price_max`.
- When the query uses descriptive terms, fill `keywords`.
- For a bare product word such as 'bolsas', fill only `keywords`.
- Reply with the JSON object only, no extra text.";

/// The external model behind the interpreter.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends `prompt` and returns the model's raw JSON reply.
    async fn generate_json(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Filters understood by the model, with null and empty values removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelFilters {
    pub category: Option<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub keywords: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    Filters(ModelFilters),
    Fallback { error: String, fallback_term: String },
}

impl Interpretation {
    fn fallback(error: impl Into<String>, text: &str) -> Self {
        Interpretation::Fallback {
            error: error.into(),
            fallback_term: text.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct QueryInterpreter {
    model: Option<Arc<dyn LanguageModel>>,
    timeout: Duration,
}

impl QueryInterpreter {
    pub fn new(model: Option<Arc<dyn LanguageModel>>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Builds the interpreter from configuration. Without an API key the
    /// interpreter is created unconfigured.
    pub fn from_config(config: &AiSearchConfig) -> anyhow::Result<Self> {
        let model = match &config.api_key {
            Some(key) => {
                let client = GeminiClient::new(key.clone(), config.model.clone())?;
                Some(Arc::new(client) as Arc<dyn LanguageModel>)
            }
            None => {
                tracing::warn!("GEMINI_API_KEY is not set, smart search is disabled");
                None
            }
        };
        Ok(Self::new(model, config.timeout))
    }

    pub fn configured(&self) -> bool {
        self.model.is_some()
    }

    pub async fn interpret(&self, text: &str) -> Interpretation {
        let Some(model) = &self.model else {
            tracing::warn!(query = %text, "smart search skipped: model not configured");
            return Interpretation::fallback("not configured", text);
        };

        let prompt = format!("Analyze the following query: '{text}'");
        match tokio::time::timeout(self.timeout, model.generate_json(&prompt)).await {
            Err(_) => {
                tracing::warn!(
                    query = %text,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "smart search timed out"
                );
                Interpretation::fallback("timeout", text)
            }
            Ok(Err(err)) => {
                tracing::error!(query = %text, error = %err, "smart search call failed");
                Interpretation::fallback(err.to_string(), text)
            }
            Ok(Ok(raw)) => match parse_filters(&raw) {
                Ok(filters) => Interpretation::Filters(filters),
                Err(err) => {
                    tracing::error!(query = %text, error = %err, "smart search reply rejected");
                    Interpretation::fallback(err.to_string(), text)
                }
            },
        }
    }
}

/// Parses the model reply. Unknown keys are ignored; nulls and empty strings
/// count as absent.
pub fn parse_filters(raw: &str) -> anyhow::Result<ModelFilters> {
    let raw = strip_code_fence(raw);
    let value: Value = serde_json::from_str(raw).context("model reply is not valid JSON")?;
    let object = value
        .as_object()
        .ok_or_else(|| anyhow!("model reply is not a JSON object"))?;

    Ok(ModelFilters {
        category: text_field(object, "category")?,
        price_min: price_field(object, "price_min")?,
        price_max: price_field(object, "price_max")?,
        keywords: text_field(object, "keywords")?,
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn text_field(object: &Map<String, Value>, key: &str) -> anyhow::Result<Option<String>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => Err(anyhow!("field `{key}` should be a string, got {other}")),
    }
}

fn price_field(object: &Map<String, Value>, key: &str) -> anyhow::Result<Option<Decimal>> {
    let parsed = match object.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => Decimal::from_str(s.trim()),
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string())),
        Some(other) => return Err(anyhow!("field `{key}` should be a number, got {other}")),
    };
    let price = parsed.with_context(|| format!("field `{key}` is not a valid amount"))?;
    Ok(Some(price.round_dp(2)))
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "category": {
                "type": "STRING",
                "description": "Product category (e.g. Alimentos, Vestuário, Decoração, Acessórios)"
            },
            "price_min": { "type": "NUMBER", "description": "Minimum price" },
            "price_max": { "type": "NUMBER", "description": "Maximum price" },
            "keywords": {
                "type": "STRING",
                "description": "Terms to look for in the product name or description"
            }
        }
    })
}

/// Google Gemini `generateContent` client asking for a JSON reply.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            api_key,
            model,
            endpoint: GEMINI_ENDPOINT.to_string(),
        })
    }

    fn request_body(prompt: &str) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        })
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate_json(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!("{}/{}:generateContent", self.endpoint, self.model);
        let payload: Value = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(prompt))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| anyhow!("model reply has no text content"))
    }
}
