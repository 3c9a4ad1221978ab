use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{DocumentKind, RoadmapEvent, SuggestionPayload};

/// Out-of-band data written next to the model output during a turn.
///
/// Serialized as `{"type": "...", "content": ...}`, the shape the client
/// reducer switches on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum DataPart {
    /// Server id of the user message that opened the turn
    UserMessageId(String),

    Id(String),
    Title(String),
    Kind(DocumentKind),
    Clear(String),

    TextDelta(String),
    /// Full code generated so far, not an increment
    CodeDelta(String),
    /// Base64 image
    ImageDelta(String),

    Finish,

    Suggestion(SuggestionPayload),
    RoadmapCreation(Vec<RoadmapEvent>),
    CoursePlanSave(CoursePlanSaved),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePlanSaved {
    pub course_id: String,
}

/// Every event of a turn, in the order it is written to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamEvent {
    Start {
        run_id: String,
        chat_id: String,
        timestamp: i64,
    },

    /// Model text token
    Text {
        content: String,
    },

    /// Fragment of a tool call as the model streams it
    ToolCall {
        call_index: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        arguments: Option<String>,
    },

    ToolResult {
        tool_call_id: String,
        tool_name: String,
        result: Value,
        is_error: bool,
        duration_ms: u64,
    },

    Data {
        data: DataPart,
    },

    /// End of one model step
    FinishStep {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },

    MessageAnnotation {
        #[serde(rename = "messageIdFromServer")]
        message_id_from_server: String,
    },

    Error {
        message: String,
    },

    End {
        status: String,
        total_duration_ms: u64,
    },
}

/// The three kinds of traffic multiplexed on one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    TokenDelta,
    StructuralMarker,
    ApplicationEvent,
}

impl StreamEvent {
    pub fn data(part: DataPart) -> Self {
        Self::Data { data: part }
    }

    pub fn category(&self) -> EventCategory {
        match self {
            Self::Text { .. } => EventCategory::TokenDelta,
            Self::Start { .. } | Self::FinishStep { .. } | Self::End { .. } => {
                EventCategory::StructuralMarker
            }
            Self::Data { data } => match data {
                DataPart::TextDelta(_) | DataPart::CodeDelta(_) | DataPart::ImageDelta(_) => {
                    EventCategory::TokenDelta
                }
                DataPart::Id(_)
                | DataPart::Title(_)
                | DataPart::Kind(_)
                | DataPart::Clear(_)
                | DataPart::Finish => EventCategory::StructuralMarker,
                DataPart::UserMessageId(_)
                | DataPart::Suggestion(_)
                | DataPart::RoadmapCreation(_)
                | DataPart::CoursePlanSave(_) => EventCategory::ApplicationEvent,
            },
            Self::ToolCall { .. }
            | Self::ToolResult { .. }
            | Self::MessageAnnotation { .. }
            | Self::Error { .. } => EventCategory::ApplicationEvent,
        }
    }

    /// SSE `event:` name
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Text { .. } => "text",
            Self::ToolCall { .. } => "tool-call",
            Self::ToolResult { .. } => "tool-result",
            Self::Data { .. } => "data",
            Self::FinishStep { .. } => "finish-step",
            Self::MessageAnnotation { .. } => "message-annotation",
            Self::Error { .. } => "error",
            Self::End { .. } => "end",
        }
    }

    pub fn as_data(&self) -> Option<&DataPart> {
        match self {
            Self::Data { data } => Some(data),
            _ => None,
        }
    }
}

/// An event stamped with its position in the turn's stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedEvent {
    pub index: u64,
    #[serde(flatten)]
    pub event: StreamEvent,
}

impl SequencedEvent {
    pub fn new(index: u64, event: StreamEvent) -> Self {
        Self { index, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_part_wire_shape() {
        let part = DataPart::TextDelta("Hel".into());
        assert_eq!(serde_json::to_value(&part).unwrap(), json!({"type": "text-delta", "content": "Hel"}));

        let kind = DataPart::Kind(DocumentKind::Code);
        assert_eq!(serde_json::to_value(&kind).unwrap(), json!({"type": "kind", "content": "code"}));

        let saved = DataPart::CoursePlanSave(CoursePlanSaved { course_id: "u1".into() });
        assert_eq!(
            serde_json::to_value(&saved).unwrap(),
            json!({"type": "course-plan-save", "content": {"courseId": "u1"}})
        );
    }

    #[test]
    fn test_finish_has_no_content() {
        assert_eq!(serde_json::to_value(DataPart::Finish).unwrap(), json!({"type": "finish"}));
        let back: DataPart = serde_json::from_value(json!({"type": "finish"})).unwrap();
        assert_eq!(back, DataPart::Finish);
    }

    #[test]
    fn test_sequenced_event_flattens() {
        let event = SequencedEvent::new(3, StreamEvent::data(DataPart::Clear("".into())));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["index"], 3);
        assert_eq!(value["type"], "data");
        assert_eq!(value["data"]["type"], "clear");

        let back: SequencedEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_annotation_field_name() {
        let event = StreamEvent::MessageAnnotation { message_id_from_server: "m1".into() };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!({"type": "message-annotation", "messageIdFromServer": "m1"}));
    }

    #[test]
    fn test_categories() {
        assert_eq!(StreamEvent::Text { content: "a".into() }.category(), EventCategory::TokenDelta);
        assert_eq!(
            StreamEvent::data(DataPart::CodeDelta("x".into())).category(),
            EventCategory::TokenDelta
        );
        assert_eq!(StreamEvent::data(DataPart::Finish).category(), EventCategory::StructuralMarker);
        assert_eq!(
            StreamEvent::data(DataPart::UserMessageId("u".into())).category(),
            EventCategory::ApplicationEvent
        );
        assert_eq!(
            StreamEvent::Error { message: "boom".into() }.category(),
            EventCategory::ApplicationEvent
        );
    }
}
