// HTTP client for OpenAI-compatible chat completion APIs

use crate::streaming::parse_chat_sse_stream;
use crate::traits::{
    ChatClient, ChatEventStream, ChatOptions, ChatRequest, ChatResponse, GeneratedImage,
    ImageClient, ImageRequest, TokenUsage,
};
use crate::types::{Content, ContentPart, Message, ToolCall};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Gemini's OpenAI-compatible endpoint
pub const GOOGLE_OPENAI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Client for any provider speaking the OpenAI chat completions protocol
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
    provider_label: &'static str,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: OPENAI_API_BASE.to_string(),
            provider_label: "OpenAI",
        })
    }

    /// Client pointed at Gemini's OpenAI-compatible endpoint
    pub fn google(api_key: impl Into<String>) -> Result<Self> {
        let mut client = Self::new(api_key)?.with_base_url(GOOGLE_OPENAI_API_BASE);
        client.provider_label = "Google";
        Ok(client)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_chat_request(
        &self,
        model: &str,
        messages: Vec<Message>,
        options: &ChatOptions,
        stream: bool,
    ) -> Result<Value> {
        let converted: Vec<Value> = messages
            .into_iter()
            .map(convert_message)
            .collect::<Result<Vec<_>>>()?;

        let mut obj = Map::new();
        obj.insert("model".to_string(), Value::from(model));
        obj.insert("messages".to_string(), Value::Array(converted));
        obj.insert("stream".to_string(), Value::Bool(stream));

        if let Some(temp) = options.temperature {
            obj.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = options.max_tokens {
            obj.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
        }
        if let Some(tools) = &options.tools {
            obj.insert("tools".to_string(), serde_json::to_value(tools)?);
        }
        if let Some(tool_choice) = &options.tool_choice {
            obj.insert("tool_choice".to_string(), serde_json::to_value(tool_choice)?);
        }
        if let Some(format) = &options.response_format {
            obj.insert("response_format".to_string(), serde_json::to_value(format)?);
        }

        Ok(Value::Object(obj))
    }

    async fn post(&self, path: &str, payload: &Value) -> Result<reqwest::Response> {
        let response = self
            .http_client
            .post(format!("{}/{}", self.base_url, path))
            .json(payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("{} API error ({}): {}", self.provider_label, status, error_text);
        }

        Ok(response)
    }
}

fn convert_message(message: Message) -> Result<Value> {
    let value = match message {
        Message::System { content, name } => with_name(
            serde_json::json!({ "role": "system", "content": convert_content(content) }),
            name,
        ),
        Message::Human { content, name } => with_name(
            serde_json::json!({ "role": "user", "content": convert_content(content) }),
            name,
        ),
        Message::AI { content, tool_calls, name } => {
            let mut map = Map::new();
            map.insert("role".to_string(), Value::from("assistant"));
            map.insert(
                "content".to_string(),
                content.map(convert_content).unwrap_or(Value::Null),
            );
            if let Some(tool_calls) = tool_calls {
                map.insert("tool_calls".to_string(), serde_json::to_value(tool_calls)?);
            }
            with_name(Value::Object(map), name)
        }
        Message::Tool { tool_call_id, content } => serde_json::json!({
            "role": "tool",
            "tool_call_id": tool_call_id,
            "content": convert_content(content),
        }),
    };
    Ok(value)
}

fn with_name(mut value: Value, name: Option<String>) -> Value {
    if let (Some(name), Some(map)) = (name, value.as_object_mut()) {
        map.insert("name".to_string(), Value::from(name));
    }
    value
}

fn convert_content(content: Content) -> Value {
    match content {
        Content::Text(s) => Value::from(s),
        Content::Parts(parts) => Value::Array(
            parts
                .into_iter()
                .map(|ContentPart::Text { text }| {
                    serde_json::json!({ "type": "text", "text": text })
                })
                .collect(),
        ),
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(
            &request.model,
            request.messages,
            &request.options,
            false,
        )?;

        let raw: OpenAIChatResponse = self
            .post("chat/completions", &payload)
            .await?
            .json()
            .await
            .context("Failed to parse response")?;

        let choice = raw.choices.first();
        Ok(ChatResponse {
            content: choice.and_then(|c| c.message.content.clone()),
            tool_calls: choice.and_then(|c| c.message.tool_calls.clone()),
            usage: raw.usage.as_ref().map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.and_then(|c| c.finish_reason.clone()),
            raw: serde_json::to_value(&raw)?,
        })
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatEventStream> {
        let payload = self.build_chat_request(
            &request.model,
            request.messages,
            &request.options,
            true,
        )?;

        let response = self.post("chat/completions", &payload).await?;
        Ok(parse_chat_sse_stream(response))
    }
}

#[async_trait]
impl ImageClient for OpenAIClient {
    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage> {
        let payload = serde_json::json!({
            "model": request.model,
            "prompt": request.prompt,
            "n": 1,
            "size": request.size.unwrap_or_else(|| "1024x1024".to_string()),
            "response_format": "b64_json",
        });

        let raw: ImagesResponse = self
            .post("images/generations", &payload)
            .await?
            .json()
            .await
            .context("Failed to parse image response")?;

        let base64 = raw
            .data
            .into_iter()
            .find_map(|d| d.b64_json)
            .context("Image response contained no data")?;

        Ok(GeneratedImage { base64 })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResponseMessage {
    pub role: String,
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}
