use std::pin::Pin;
use anyhow::Result;
use reqwest::Response;
use std::collections::VecDeque;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

/// Provider-agnostic event decoded from a streaming chat completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Message {
        content: String,
    },

    /// Fragment of a tool call; fragments sharing an `index` belong together
    ToolCall {
        index: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        arguments: Option<String>,
    },

    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    pub role: Option<String>,
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallDelta {
    #[serde(default)]
    pub index: u32,
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub tool_type: Option<String>,
    pub function: Option<FunctionDelta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDelta {
    pub name: Option<String>,
    pub arguments: Option<String>,
}

impl ChatStreamChunk {
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
    }

    fn to_stream_events(&self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if let Some(choice) = self.choices.first() {
            if let Some(content) = &choice.delta.content {
                if !content.is_empty() {
                    events.push(StreamEvent::Message {
                        content: content.clone(),
                    });
                }
            }

            if let Some(tool_calls) = &choice.delta.tool_calls {
                for tc in tool_calls {
                    events.push(StreamEvent::ToolCall {
                        index: tc.index,
                        id: tc.id.clone(),
                        name: tc.function.as_ref().and_then(|f| f.name.clone()),
                        arguments: tc.function.as_ref().and_then(|f| f.arguments.clone()),
                    });
                }
            }

            if let Some(finish_reason) = &choice.finish_reason {
                events.push(StreamEvent::Done {
                    finish_reason: Some(finish_reason.clone()),
                });
            }
        }

        events
    }
}

/// Decode one SSE line. `None` for blank lines, comments and non-data fields.
pub fn parse_sse_line(line: &str) -> Option<Result<Vec<StreamEvent>>> {
    let line = line.trim();
    let data = line.strip_prefix("data:")?.trim_start();

    if data == "[DONE]" {
        return Some(Ok(vec![StreamEvent::Done { finish_reason: None }]));
    }

    Some(
        serde_json::from_str::<ChatStreamChunk>(data)
            .map(|chunk| chunk.to_stream_events())
            .map_err(|e| anyhow::anyhow!("Failed to parse chat chunk: {}", e)),
    )
}

pub fn parse_chat_sse_stream(
    response: Response,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>> {
    let stream = response.bytes_stream();

    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer = VecDeque::with_capacity(8192);
        let mut finished = false;

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes);

                    while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();

                        let Ok(line) = std::str::from_utf8(&line_bytes) else {
                            continue;
                        };

                        match parse_sse_line(line) {
                            Some(Ok(events)) => {
                                for event in events {
                                    let is_terminal = matches!(event, StreamEvent::Done { finish_reason: None });
                                    yield Ok(event);
                                    if is_terminal {
                                        finished = true;
                                    }
                                }
                            }
                            Some(Err(e)) => yield Err(e),
                            None => {}
                        }

                        if finished {
                            break;
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    break;
                }
            }

            if finished {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_line() {
        let line = r#"data: {"id":"1","model":"m","choices":[{"index":0,"delta":{"content":"Hi"},"finish_reason":null}]}"#;
        let events = parse_sse_line(line).unwrap().unwrap();
        assert_eq!(events, vec![StreamEvent::Message { content: "Hi".into() }]);
    }

    #[test]
    fn test_parse_tool_call_fragment() {
        let line = r#"data: {"choices":[{"index":0,"delta":{"tool_calls":[{"index":1,"id":"call_1","type":"function","function":{"name":"getWeather","arguments":"{\"lat"}}]},"finish_reason":null}]}"#;
        let events = parse_sse_line(line).unwrap().unwrap();
        assert_eq!(
            events,
            vec![StreamEvent::ToolCall {
                index: 1,
                id: Some("call_1".into()),
                name: Some("getWeather".into()),
                arguments: Some("{\"lat".into()),
            }]
        );
    }

    #[test]
    fn test_done_marker_and_ignored_lines() {
        let done = parse_sse_line("data: [DONE]").unwrap().unwrap();
        assert_eq!(done, vec![StreamEvent::Done { finish_reason: None }]);
        assert!(parse_sse_line("").is_none());
        assert!(parse_sse_line(": keep-alive").is_none());
        assert!(parse_sse_line("event: ping").is_none());
    }

    #[test]
    fn test_malformed_chunk_is_error() {
        assert!(parse_sse_line("data: {not json").unwrap().is_err());
    }
}
