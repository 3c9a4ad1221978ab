use amigo_llm::{Content, Message, Tool, ToolCall, ToolChoice};
use amigo_llm::types::ContentPart;
use serde_json::json;

#[test]
fn test_content_text_creation() {
    let content = Content::text("Hello, world!");
    assert_eq!(content.as_text(), Some("Hello, world!"));
}

#[test]
fn test_content_parts_join_to_plain_text() {
    let content = Content::Parts(vec![
        ContentPart::Text { text: "Hello, ".into() },
        ContentPart::Text { text: "learner".into() },
    ]);
    assert_eq!(content.as_text(), None);
    assert_eq!(content.to_plain_text(), "Hello, learner");
    assert!(!content.is_empty());
    assert!(Content::Parts(vec![ContentPart::Text { text: String::new() }]).is_empty());
}

#[test]
fn test_message_roles() {
    assert_eq!(Message::system("You are helpful").role(), "system");
    assert_eq!(Message::human("Hello").role(), "user");
    assert_eq!(Message::ai("Hi there!").role(), "assistant");
    assert_eq!(Message::tool_result("call_123", "42").role(), "tool");
}

#[test]
fn test_message_serialization_human() {
    let msg = Message::human("Hello");
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"role\":\"user\""));
    assert!(json.contains("Hello"));
}

#[test]
fn test_message_deserialization() {
    let json = r#"{"role":"user","content":"Test"}"#;
    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(msg.role(), "user");
    assert_eq!(msg.text(), "Test");
}

#[test]
fn test_ai_message_with_tools_has_no_text() {
    let msg = Message::ai_with_tools(None, vec![ToolCall::new("c1", "createRoadmap", "{}")]);
    assert_eq!(msg.text(), "");
}

#[test]
fn test_tool_creation() {
    let tool = Tool::new(
        "getWeather",
        "Get the current weather at a location",
        json!({
            "type": "object",
            "properties": {
                "latitude": {"type": "number"},
                "longitude": {"type": "number"}
            },
            "required": ["latitude", "longitude"]
        }),
    );

    assert_eq!(tool.tool_type, "function");
    assert_eq!(tool.name(), "getWeather");
}

#[test]
fn test_tool_call_arguments() {
    let call = ToolCall::new("call_1", "getWeather", r#"{"latitude": 52.5, "longitude": 13.4}"#);
    let args = call.arguments_value().unwrap();
    assert_eq!(args["latitude"], 52.5);

    let empty = ToolCall::new("call_2", "createRoadmap", "");
    assert_eq!(empty.arguments_value().unwrap(), json!({}));

    let broken = ToolCall::new("call_3", "getWeather", "{\"lat");
    assert!(broken.arguments_value().is_err());
}

#[test]
fn test_tool_choice_serialization() {
    assert_eq!(serde_json::to_value(ToolChoice::auto()).unwrap(), json!("auto"));
    assert_eq!(
        serde_json::to_value(ToolChoice::force("getWeather")).unwrap(),
        json!({"type": "function", "function": {"name": "getWeather"}})
    );
}
