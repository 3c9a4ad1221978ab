//! Structured (JSON-schema constrained) generation.
//!
//! The model is asked for JSON matching a schema through `response_format`.
//! Streaming variants re-parse the accumulated text after every token with
//! [`parse_partial_json`], so callers see a growing object (or one array
//! element at a time) long before the response is complete.

use crate::streaming::StreamEvent;
use crate::traits::{ChatClient, ChatOptions, ChatRequest, ResponseFormat};
use crate::types::Message;
use anyhow::{Context, Result};
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::pin::Pin;

/// Stream of successively more complete partial objects
pub type ObjectStream = Pin<Box<dyn Stream<Item = Result<Value>> + Send>>;

/// Stream of completed array elements, in order
pub type ElementStream = Pin<Box<dyn Stream<Item = Result<Value>> + Send>>;

#[derive(Debug, Clone)]
pub struct ObjectRequest {
    pub model: String,
    pub system: Option<String>,
    pub prompt: String,
    pub schema_name: String,
    pub schema: Value,
}

impl ObjectRequest {
    pub fn new(model: impl Into<String>, schema_name: impl Into<String>, schema: Value) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: String::new(),
            schema_name: schema_name.into(),
            schema,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    fn into_chat_request(self) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system {
            messages.push(Message::system(system));
        }
        messages.push(Message::human(self.prompt));

        ChatRequest::new(self.model, messages).with_options(
            ChatOptions::new().response_format(ResponseFormat::json_schema(self.schema_name, self.schema)),
        )
    }
}

/// One-shot structured generation deserialized into `T`
pub async fn generate_object<T: DeserializeOwned>(
    client: &dyn ChatClient,
    request: ObjectRequest,
) -> Result<T> {
    let response = client.chat(request.into_chat_request()).await?;
    let content = response
        .content
        .context("Model returned no content for structured output")?;

    serde_json::from_str(strip_json_fence(&content))
        .context("Model output did not match the requested schema")
}

/// Streams partial objects; each yielded value differs from the previous one
pub async fn stream_object(client: &dyn ChatClient, request: ObjectRequest) -> Result<ObjectStream> {
    let mut events = client.chat_stream(request.into_chat_request()).await?;

    Ok(Box::pin(async_stream::try_stream! {
        let mut buffer = String::new();
        let mut last: Option<Value> = None;

        while let Some(event) = events.next().await {
            if let StreamEvent::Message { content } = event? {
                buffer.push_str(&content);

                if let Some(partial) = parse_partial_json(strip_json_fence(&buffer)) {
                    if last.as_ref() != Some(&partial) {
                        last = Some(partial.clone());
                        yield partial;
                    }
                }
            }
        }
    }))
}

/// Streams the elements of an array-shaped output as each one completes.
///
/// `element_schema` describes a single element; the request wraps it in an
/// object with an `elements` array since providers require an object root.
/// An element is released once the next one starts, the last one when the
/// response ends.
pub async fn stream_elements(
    client: &dyn ChatClient,
    mut request: ObjectRequest,
    max_elements: Option<usize>,
) -> Result<ElementStream> {
    let mut items = serde_json::json!({
        "type": "array",
        "items": request.schema,
    });
    if let (Some(max), Some(map)) = (max_elements, items.as_object_mut()) {
        map.insert("maxItems".to_string(), Value::from(max));
    }
    request.schema = serde_json::json!({
        "type": "object",
        "properties": { "elements": items },
        "required": ["elements"],
    });

    let mut events = client.chat_stream(request.into_chat_request()).await?;
    let limit = max_elements.unwrap_or(usize::MAX);

    Ok(Box::pin(async_stream::try_stream! {
        let mut buffer = String::new();
        let mut emitted = 0usize;

        while let Some(event) = events.next().await {
            if let StreamEvent::Message { content } = event? {
                buffer.push_str(&content);

                let elements = partial_elements(&buffer);
                while emitted + 1 < elements.len() && emitted < limit {
                    yield elements[emitted].clone();
                    emitted += 1;
                }
            }
        }

        let elements = partial_elements(&buffer);
        while emitted < elements.len() && emitted < limit {
            yield elements[emitted].clone();
            emitted += 1;
        }
    }))
}

fn partial_elements(buffer: &str) -> Vec<Value> {
    match parse_partial_json(strip_json_fence(buffer)) {
        Some(Value::Object(mut map)) => match map.remove("elements") {
            Some(Value::Array(elements)) => elements,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Drops a surrounding markdown code fence, complete or still open
pub fn strip_json_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ObjState {
    /// just after `{`
    KeyOrEnd,
    /// just after `,`
    Key,
    Colon,
    Value,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ArrState {
    ValueOrEnd,
    Value,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Frame {
    Object(ObjState),
    Array(ArrState),
}

fn value_done(stack: &mut [Frame]) {
    match stack.last_mut() {
        Some(Frame::Object(state)) => *state = ObjState::Next,
        Some(Frame::Array(state)) => *state = ArrState::Next,
        None => {}
    }
}

fn trim_trailing_comma(out: &mut String) {
    out.truncate(out.trim_end().len());
    if out.ends_with(',') {
        out.pop();
    }
}

fn is_literal_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '+')
}

/// Parses a JSON prefix by closing whatever is still open.
///
/// Unterminated strings are closed, partial keys dropped, dangling commas
/// removed, keys without a value mapped to `null` and partial literals
/// completed (`tr` → `true`) or trimmed (`1.` → `1`). Returns `None` when
/// the prefix cannot be repaired into valid JSON.
pub fn parse_partial_json(text: &str) -> Option<Value> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut stack: Vec<Frame> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut string_is_key = false;
    let mut string_start = 0usize;
    let mut literal_start: Option<usize> = None;

    for ch in text.chars() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
                if string_is_key {
                    if let Some(Frame::Object(state)) = stack.last_mut() {
                        *state = ObjState::Colon;
                    }
                } else {
                    value_done(&mut stack);
                }
            }
            continue;
        }

        if literal_start.is_some() && !is_literal_char(ch) {
            literal_start = None;
            value_done(&mut stack);
        }

        match ch {
            '"' => {
                string_is_key = matches!(
                    stack.last(),
                    Some(Frame::Object(ObjState::KeyOrEnd | ObjState::Key))
                );
                string_start = out.len();
                in_string = true;
                out.push(ch);
            }
            '{' => {
                out.push(ch);
                stack.push(Frame::Object(ObjState::KeyOrEnd));
            }
            '[' => {
                out.push(ch);
                stack.push(Frame::Array(ArrState::ValueOrEnd));
            }
            '}' | ']' => {
                out.push(ch);
                stack.pop();
                value_done(&mut stack);
            }
            ':' => {
                out.push(ch);
                if let Some(Frame::Object(state)) = stack.last_mut() {
                    *state = ObjState::Value;
                }
            }
            ',' => {
                out.push(ch);
                match stack.last_mut() {
                    Some(Frame::Object(state)) => *state = ObjState::Key,
                    Some(Frame::Array(state)) => *state = ArrState::Value,
                    None => {}
                }
            }
            c if c.is_whitespace() => out.push(c),
            c => {
                if literal_start.is_none() {
                    literal_start = Some(out.len());
                }
                out.push(c);
            }
        }
    }

    if in_string {
        if string_is_key {
            out.truncate(string_start);
        } else {
            if escaped {
                out.pop();
            }
            if let Some(pos) = out[string_start..].rfind("\\u") {
                let abs = string_start + pos;
                let tail = &out[abs + 2..];
                // `\\u` is an escaped backslash followed by a plain `u`
                let backslashes = out[string_start..=abs].bytes().rev().take_while(|b| *b == b'\\').count();
                if backslashes % 2 == 1 && tail.len() < 4 && tail.chars().all(|c| c.is_ascii_hexdigit()) {
                    out.truncate(abs);
                }
            }
            out.push('"');
            value_done(&mut stack);
        }
    } else if let Some(start) = literal_start {
        let literal = out[start..].to_string();
        out.truncate(start);
        if let Some(full) = ["true", "false", "null"]
            .iter()
            .find(|word| word.starts_with(literal.as_str()))
        {
            out.push_str(full);
            value_done(&mut stack);
        } else {
            let trimmed = literal.trim_end_matches(['.', '-', '+', 'e', 'E']);
            if !trimmed.is_empty() {
                out.push_str(trimmed);
                value_done(&mut stack);
            }
        }
    }

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Object(state) => {
                match state {
                    ObjState::Key => trim_trailing_comma(&mut out),
                    ObjState::Colon => out.push_str(":null"),
                    ObjState::Value => out.push_str("null"),
                    ObjState::KeyOrEnd | ObjState::Next => {}
                }
                out.push('}');
            }
            Frame::Array(state) => {
                if state == ArrState::Value {
                    trim_trailing_comma(&mut out);
                }
                out.push(']');
            }
        }
        value_done(&mut stack);
    }

    serde_json::from_str(&out).ok()
}
