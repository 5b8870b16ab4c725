/// LLM Client — the single point of entry for all AI gateway calls.
///
/// ARCHITECTURAL RULE: No other module may call the gateway directly.
/// Structured output is obtained through a forced function call; free-form message
/// content is never parsed.
///
/// Model: google/gemini-2.5-flash (hardcoded — do not make configurable to prevent drift)
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

const AI_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
/// The model used for all LLM calls.
pub const MODEL: &str = "google/gemini-2.5-flash";
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited by AI gateway")]
    RateLimited,

    #[error("AI gateway credits exhausted")]
    QuotaExhausted,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Response did not contain a '{0}' tool call")]
    MissingToolCall(String),
}

/// A function the model is forced to call. `parameters` is its JSON schema.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    tools: Vec<ToolDefinition<'a>>,
    tool_choice: ToolChoice<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ToolDefinition<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    function: FunctionDefinition<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionDefinition<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    function: FunctionName<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionName<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
pub struct ToolCall {
    pub function: FunctionCall,
}

#[derive(Debug, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, as a string.
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Raw arguments of the first call to `tool` in the first choice.
    pub fn tool_arguments(&self, tool: &str) -> Option<&str> {
        self.choices
            .first()?
            .message
            .tool_calls
            .iter()
            .find(|c| c.function.name == tool)
            .map(|c| c.function.arguments.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct GatewayError {
    error: GatewayErrorBody,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    message: String,
}

/// The single LLM client used by all services.
/// Wraps the chat-completions API with retry on transient failures and tool-call parsing.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl LlmClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            endpoint: AI_GATEWAY_URL.to_string(),
        })
    }

    #[cfg(test)]
    fn with_endpoint(api_key: String, timeout: Duration, endpoint: String) -> Result<Self, LlmError> {
        Ok(Self {
            endpoint,
            ..Self::new(api_key, timeout)?
        })
    }

    /// Calls the model with `tool` forced and returns the full response object.
    /// Retries on 5xx and transport errors with exponential backoff.
    /// 429 and 402 are returned immediately: the caller decides what to do.
    pub async fn call(
        &self,
        system: &str,
        prompt: &str,
        tool: &ToolSpec,
    ) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            tools: vec![ToolDefinition {
                kind: "function",
                function: FunctionDefinition {
                    name: tool.name,
                    description: tool.description,
                    parameters: &tool.parameters,
                },
            }],
            tool_choice: ToolChoice {
                kind: "function",
                function: FunctionName { name: tool.name },
            },
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1s
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(LlmError::RateLimited);
            }
            if status == StatusCode::PAYMENT_REQUIRED {
                return Err(LlmError::QuotaExhausted);
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("AI gateway returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GatewayError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat_response: ChatResponse = response.json().await?;

            if let Some(usage) = &chat_response.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(chat_response);
        }

        Err(last_error.unwrap_or(LlmError::Api {
            status: 0,
            message: "no attempt was made".to_string(),
        }))
    }

    /// Calls the model with `tool` forced and deserializes the tool-call arguments.
    pub async fn call_tool<T: DeserializeOwned>(
        &self,
        system: &str,
        prompt: &str,
        tool: &ToolSpec,
    ) -> Result<T, LlmError> {
        let response = self.call(system, prompt, tool).await?;
        parse_tool_arguments(&response, tool.name)
    }
}

fn parse_tool_arguments<T: DeserializeOwned>(
    response: &ChatResponse,
    tool: &str,
) -> Result<T, LlmError> {
    let arguments = response
        .tool_arguments(tool)
        .ok_or_else(|| LlmError::MissingToolCall(tool.to_string()))?;
    serde_json::from_str(arguments).map_err(LlmError::Parse)
}
