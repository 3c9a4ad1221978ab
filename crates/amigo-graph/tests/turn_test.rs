mod common;

use std::time::{Duration, Instant};

use amigo_graph::{GraphConfig, Tool, ToolContext, ToolError, ToolRegistry, WeatherTool};
use amigo_llm::Message;
use amigo_persist::{MessageContent, MessagePart, MessageRole, PersistenceClient};
use amigo_types::{DataPart, EventCategory, LLMConfig, ModelProvider, StreamEvent, StreamReducer, TurnInput};
use async_trait::async_trait;
use common::*;
use mockito::Matcher;
use serde_json::{json, Value};

#[tokio::test]
async fn test_plain_answer_turn_framing() {
    let h = harness();
    h.llm.push_text("Hello there, learner!");

    let events = run_turn(&h.graph, Some("user-1"), "hi").await;

    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.index, i as u64);
    }
    assert!(matches!(events[0].event, StreamEvent::Start { .. }));
    assert_eq!(
        events[1].event.as_data(),
        Some(&DataPart::UserMessageId("user-msg-1".into()))
    );
    let user_ids = data_parts(&events)
        .into_iter()
        .filter(|p| matches!(p, DataPart::UserMessageId(_)))
        .count();
    assert_eq!(user_ids, 1);

    let text: String = events
        .iter()
        .filter_map(|e| match &e.event {
            StreamEvent::Text { content } => Some(content.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "Hello there, learner!");
    assert!(events.iter().any(|e| matches!(e.event, StreamEvent::FinishStep { .. })));
    assert_eq!(end_status(&events).as_deref(), Some("success"));

    let stored = h.store.get_messages("chat-1").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].role, MessageRole::Assistant);

    let annotations: Vec<&str> = events
        .iter()
        .filter_map(|e| match &e.event {
            StreamEvent::MessageAnnotation { message_id_from_server } => Some(message_id_from_server.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(annotations, vec![stored[0].id.as_str()]);
}

#[tokio::test]
async fn test_system_prompt_and_tools_are_sent() {
    let h = harness();
    h.llm.push_text("ok");
    run_turn(&h.graph, Some("user-1"), "hi").await;

    let requests = h.llm.requests();
    assert_eq!(requests[0].messages[0].role(), "system");
    let tools = requests[0].options.tools.as_ref().unwrap();
    assert_eq!(tools.len(), 8);
}

#[tokio::test]
async fn test_weather_tool_round_trip() {
    let mut server = mockito::Server::new_async().await;
    let forecast = json!({"current": {"temperature_2m": 12.5}});
    let mock = server
        .mock("GET", "/v1/forecast")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("latitude".into(), "52.52".into()),
            Matcher::UrlEncoded("longitude".into(), "13.41".into()),
            Matcher::UrlEncoded("current".into(), "temperature_2m".into()),
            Matcher::UrlEncoded("daily".into(), "sunrise,sunset".into()),
            Matcher::UrlEncoded("timezone".into(), "auto".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(forecast.to_string())
        .create_async()
        .await;

    let weather = WeatherTool::new(reqwest::Client::new(), format!("{}/v1/forecast", server.url()));
    let h = harness_with(HarnessOptions {
        tools: Some(ToolRegistry::standard(weather)),
        ..Default::default()
    });
    h.llm
        .push_tool_call("call_1", "getWeather", json!({"latitude": 52.52, "longitude": 13.41}))
        .push_text("It is 12.5 degrees in Berlin.");

    let events = run_turn(&h.graph, Some("user-1"), "weather in Berlin?").await;
    mock.assert_async().await;

    let results = tool_results(&events);
    assert_eq!(results, vec![("getWeather".to_string(), forecast.clone(), false)]);

    let stored = h.store.get_messages("chat-1").await.unwrap();
    let roles: Vec<MessageRole> = stored.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![MessageRole::Assistant, MessageRole::Tool, MessageRole::Assistant]);
    assert_eq!(
        stored[1].content,
        MessageContent::Parts(vec![MessagePart::ToolResult {
            tool_call_id: "call_1".into(),
            tool_name: "getWeather".into(),
            result: forecast,
        }])
    );

    let annotations = events
        .iter()
        .filter(|e| matches!(e.event, StreamEvent::MessageAnnotation { .. }))
        .count();
    assert_eq!(annotations, 2);
}

#[tokio::test]
async fn test_invalid_coordinates_become_error_result() {
    let h = harness();
    h.llm
        .push_tool_call("call_1", "getWeather", json!({"latitude": 123.0, "longitude": 0.0}))
        .push_text("Those coordinates look wrong.");

    let events = run_turn(&h.graph, Some("user-1"), "weather?").await;

    let results = tool_results(&events);
    assert_eq!(results.len(), 1);
    assert!(results[0].2);
    assert!(results[0].1["error"].as_str().unwrap().contains("latitude"));
    assert_eq!(end_status(&events).as_deref(), Some("success"));
}

#[tokio::test]
async fn test_unknown_tool_becomes_error_result() {
    let h = harness();
    h.llm
        .push_tool_call("call_1", "launchRocket", json!({}))
        .push_text("I can't do that.");

    let events = run_turn(&h.graph, Some("user-1"), "launch").await;

    let results = tool_results(&events);
    assert_eq!(results[0].0, "launchRocket");
    assert_eq!(results[0].1, json!({"error": "Unknown tool: launchRocket"}));
}

#[tokio::test]
async fn test_provider_failure_ends_turn_with_error() {
    let h = harness();
    h.llm.push_failure("upstream unavailable");

    let events = run_turn(&h.graph, Some("user-1"), "hi").await;

    assert!(events.iter().any(|e| matches!(
        &e.event,
        StreamEvent::Error { message } if message.contains("upstream unavailable")
    )));
    assert_eq!(end_status(&events).as_deref(), Some("error"));
    assert!(h.store.get_messages("chat-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_step_limit_stops_the_loop() {
    let h = harness_with(HarnessOptions {
        config: GraphConfig::default().with_max_steps(1),
        ..Default::default()
    });
    h.llm.push_tool_call(
        "call_1",
        "createRoadmap",
        json!({"roadmapEvents": [{"id": "w1", "title": "Setup"}]}),
    );

    let events = run_turn(&h.graph, Some("user-1"), "plan").await;

    assert_eq!(h.llm.requests().len(), 1);
    assert_eq!(tool_results(&events).len(), 1);
    assert_eq!(end_status(&events).as_deref(), Some("success"));
}

#[tokio::test]
async fn test_anonymous_turn_is_not_persisted() {
    let h = harness();
    h.llm.push_text("Hi");

    let events = run_turn(&h.graph, None, "hi").await;

    assert!(h.store.get_messages("chat-1").await.unwrap().is_empty());
    assert!(!events.iter().any(|e| matches!(e.event, StreamEvent::MessageAnnotation { .. })));
}

#[tokio::test]
async fn test_storage_failure_skips_annotations() {
    let h = harness();
    h.llm.push_text("Hi");
    h.store.set_unavailable(true);

    let events = run_turn(&h.graph, Some("user-1"), "hi").await;

    assert!(!events.iter().any(|e| matches!(e.event, StreamEvent::MessageAnnotation { .. })));
    assert_eq!(end_status(&events).as_deref(), Some("success"));
}

#[tokio::test]
async fn test_reducer_folds_a_real_turn() {
    let h = harness();
    h.llm
        .push_tool_call(
            "call_1",
            "createRoadmap",
            json!({"roadmapEvents": [{"id": "w1", "title": "Setup"}, {"id": "w2", "title": "Basics"}]}),
        )
        .push_text("Here is your roadmap.");

    let events = run_turn(&h.graph, Some("user-1"), "roadmap please").await;

    let mut reducer = StreamReducer::new();
    let now = Instant::now();
    let half = events.len() / 2;
    reducer.apply_suffix(&events[..half], now);
    reducer.apply_suffix(&events, now);
    reducer.apply_suffix(&events, now);

    assert!(reducer.roadmap.has_roadmap);
    assert_eq!(reducer.roadmap.events.len(), 2);
    assert_eq!(reducer.assistant_text, "Here is your roadmap.");
    assert_eq!(reducer.user_message_id.as_deref(), Some("user-msg-1"));
    assert_eq!(reducer.assistant_message_ids.len(), 2);

    let categories: Vec<EventCategory> = events.iter().map(|e| e.event.category()).collect();
    assert!(categories.contains(&EventCategory::TokenDelta));
    assert!(categories.contains(&EventCategory::ApplicationEvent));
}

/// Opens an artifact and streams deltas until the turn is cancelled
struct EndlessDocumentTool;

#[async_trait]
impl Tool for EndlessDocumentTool {
    fn name(&self) -> &'static str {
        "endlessDocument"
    }

    fn definition(&self) -> amigo_llm::Tool {
        amigo_llm::Tool::new("endlessDocument", "Streams forever", json!({"type": "object"}))
    }

    async fn execute(&self, _args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let mut artifact = ctx.writer.artifact();
        artifact.clear("").await?;
        loop {
            artifact.delta(DataPart::TextDelta("more ".into())).await?;
        }
    }
}

#[tokio::test]
async fn test_timeout_with_full_buffer_still_finishes_artifact() {
    let h = harness_with(HarnessOptions {
        config: GraphConfig::new()
            .with_channel_capacity(2)
            .with_timeout(Duration::from_millis(200)),
        tools: Some(ToolRegistry::new().with(EndlessDocumentTool)),
        ..Default::default()
    });
    h.llm.push_tool_call("call-1", "endlessDocument", json!({}));

    let input = TurnInput::new(
        "chat-1",
        "user-msg-1",
        vec![Message::human("write forever")],
        LLMConfig::new("test-model", ModelProvider::Google),
    )
    .with_user("user-1");
    let mut rx = h.graph.spawn_run(input);

    // Read up to the artifact's clear, then stall so the buffer stays full past the timeout
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        let is_clear = matches!(event.event.as_data(), Some(DataPart::Clear(_)));
        events.push(event);
        if is_clear {
            break;
        }
    }
    tokio::time::sleep(Duration::from_millis(500)).await;
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.index, i as u64);
    }
    assert_artifacts_balanced(&data_parts(&events));

    let finish = events
        .iter()
        .position(|e| e.event.as_data() == Some(&DataPart::Finish))
        .expect("finish written");
    let error = events
        .iter()
        .position(|e| matches!(&e.event, StreamEvent::Error { message } if message.contains("timed out")))
        .expect("error written");
    assert!(finish < error);
    assert_eq!(end_status(&events).as_deref(), Some("error"));
}
