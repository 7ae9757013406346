//! OpenAICompletionClient - Direct REST client for the OpenAI Chat Completions API.
//!
//! Credential priority: ~/.config/regdesk/secret.json > environment variables.

use crate::sse::{SseEvent, parse_sse_events};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use regdesk_core::completion::{CompletionClient, FragmentStream, PromptMessage};
use regdesk_core::config::{GenerationParams, ProviderConfig, SecretConfig};
use regdesk_core::{RegdeskError, Result};
use regdesk_infrastructure::SecretStorage;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::pin::Pin;

const API_KEY_ENV: &str = "OPENAI_API_KEY";
const MODEL_ENV: &str = "OPENAI_MODEL_NAME";

/// Completion client that talks to the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAICompletionClient {
    client: Client,
    api_key: String,
    base_url: String,
    params: GenerationParams,
}

impl std::fmt::Debug for OpenAICompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAICompletionClient")
            .field("base_url", &self.base_url)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl OpenAICompletionClient {
    /// Creates a client from provider settings and an explicit key.
    pub fn from_config(config: &ProviderConfig, api_key: impl Into<String>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RegdeskError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: config.base_url.clone(),
            params: config.generation_params(),
        })
    }

    /// Loads credentials from ~/.config/regdesk/secret.json or environment variables.
    ///
    /// Priority:
    /// 1. ~/.config/regdesk/secret.json
    /// 2. Environment variables (OPENAI_API_KEY, OPENAI_MODEL_NAME)
    ///
    /// The model is taken from `secret.json`, then `OPENAI_MODEL_NAME`, then
    /// `config.model`. The first source that names one wins.
    pub fn try_from_env(config: &ProviderConfig) -> Result<Self> {
        let secret = SecretStorage::new().ok().and_then(|storage| match storage.load() {
            Ok(secret) => Some(secret),
            Err(e) => {
                tracing::debug!("No usable secret file: {e}");
                None
            }
        });

        let credentials = resolve_credentials(
            secret,
            env::var(API_KEY_ENV).ok(),
            env::var(MODEL_ENV).ok(),
        )?;

        let mut client = Self::from_config(config, credentials.api_key)?;
        if let Some(model) = credentials.model {
            client.params.model = model;
        }
        tracing::info!(model = %client.params.model, "OpenAI completion client ready");
        Ok(client)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send_request(&self, body: &ChatCompletionRequest<'_>) -> Result<Response> {
        tracing::debug!(
            model = body.model,
            messages = body.messages.len(),
            stream = body.stream,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| RegdeskError::Provider {
                status_code: None,
                message: format!("OpenAI API request failed: {err}"),
                is_retryable: err.is_connect() || err.is_timeout(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            let err = map_http_error(status, body_text);
            tracing::warn!("Chat completion failed: {err}");
            return Err(err);
        }

        Ok(response)
    }

    fn request<'a>(
        &'a self,
        messages: &'a [PromptMessage],
        stream: bool,
    ) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.params.model,
            messages,
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
            stream,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAICompletionClient {
    async fn complete_once(&self, messages: &[PromptMessage]) -> Result<String> {
        let response = self.send_request(&self.request(messages, false)).await?;

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            RegdeskError::provider(format!("Failed to parse OpenAI response: {err}"), false)
        })?;

        extract_text_response(parsed)
    }

    async fn complete_streaming(&self, messages: &[PromptMessage]) -> Result<FragmentStream> {
        let response = self.send_request(&self.request(messages, true)).await?;
        let events = parse_sse_events(response.bytes_stream());
        Ok(Box::pin(fragments_from_events(events)))
    }
}

struct Credentials {
    api_key: String,
    model: Option<String>,
}

fn resolve_credentials(
    secret: Option<SecretConfig>,
    env_api_key: Option<String>,
    env_model: Option<String>,
) -> Result<Credentials> {
    if let Some(openai) = secret.and_then(|s| s.openai) {
        return Ok(Credentials {
            api_key: openai.api_key,
            model: openai.model_name.or(env_model),
        });
    }

    let api_key = env_api_key.filter(|key| !key.trim().is_empty()).ok_or_else(|| {
        RegdeskError::config(
            "OPENAI_API_KEY not found in ~/.config/regdesk/secret.json or environment variables",
        )
    })?;

    Ok(Credentials { api_key, model: env_model })
}

/// Maps SSE events to text fragments.
///
/// Chunks without text are skipped. An `error` payload or a stream that
/// ends before `[DONE]` yields one `Err` and ends the output.
fn fragments_from_events<S>(events: S) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = Result<SseEvent>> + Send + 'static,
{
    let events: Pin<Box<S>> = Box::pin(events);

    futures::stream::unfold(Some(events), |state| async move {
        let mut events = state?;
        loop {
            match events.next().await {
                Some(Ok(SseEvent::Data(data))) => match parse_chunk(&data) {
                    ChunkOutcome::Text(text) => return Some((Ok(text), Some(events))),
                    ChunkOutcome::Empty => continue,
                    ChunkOutcome::Failed(message) => {
                        return Some((Err(RegdeskError::provider(message, false)), None));
                    }
                },
                Some(Ok(SseEvent::Done)) => return None,
                Some(Err(err)) => return Some((Err(err), None)),
                None => {
                    let err = RegdeskError::provider("Stream ended before completion", true);
                    return Some((Err(err), None));
                }
            }
        }
    })
}

enum ChunkOutcome {
    Text(String),
    Empty,
    Failed(String),
}

fn parse_chunk(data: &str) -> ChunkOutcome {
    let chunk: StreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::warn!("Skipping unparseable stream chunk: {e}");
            return ChunkOutcome::Empty;
        }
    };

    if let Some(error) = chunk.error {
        return ChunkOutcome::Failed(error.message);
    }

    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|text| !text.is_empty())
        .map_or(ChunkOutcome::Empty, ChunkOutcome::Text)
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Deserialize, Default)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            RegdeskError::provider("OpenAI API returned no content in the response", false)
        })
}

fn map_http_error(status: StatusCode, body: String) -> RegdeskError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    RegdeskError::Provider {
        status_code: Some(status.as_u16()),
        message,
        is_retryable,
    }
}
