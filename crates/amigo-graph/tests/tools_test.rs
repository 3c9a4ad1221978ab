mod common;

use std::sync::Arc;

use amigo_llm::scripted::{ScriptedImageClient, ScriptedTurn};
use amigo_llm::StreamEvent as LlmEvent;
use amigo_persist::{
    ActivityKind, DBDocument, FileProfileCache, InMemoryPersistenceClient, PersistenceClient,
    ProfileCache,
};
use amigo_types::{CoursePlanSaved, DataPart, DocumentKind};
use common::*;
use serde_json::{json, Value};

fn temp_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("amigo-graph-{}", uuid::Uuid::new_v4()))
}

fn message_chunks(chunks: &[&str]) -> ScriptedTurn {
    let mut events: Vec<LlmEvent> = chunks
        .iter()
        .map(|c| LlmEvent::Message { content: c.to_string() })
        .collect();
    events.push(LlmEvent::Done { finish_reason: Some("stop".to_string()) });
    ScriptedTurn::Events(events)
}

fn course_plan_json(modules: usize) -> Value {
    json!({
        "title": "Rust for Backend Developers",
        "description": "From ownership to async services",
        "learningObjectives": ["Ownership", "Async"],
        "totalEstimatedTime": "4 weeks",
        "modules": (0..modules).map(|i| json!({
            "id": format!("m{}", i),
            "title": format!("Module {}", i),
            "description": "",
            "estimatedTime": "1 week",
            "topics": [{"id": "t1", "title": "Intro", "estimatedTime": "1h"}],
            "resources": [{"type": "article", "title": "Read me", "url": null}]
        })).collect::<Vec<_>>()
    })
}

async fn seed_document(store: &InMemoryPersistenceClient, id: &str, kind: DocumentKind, content: &str) {
    store
        .save_document(DBDocument::new_version(id, "Essay", kind, content.to_string(), "user-1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_text_document_streams_and_saves() {
    let h = harness();
    h.llm
        .push_tool_call("call_1", "createDocument", json!({"title": "Essay", "kind": "text"}))
        .push_text("Hello world")
        .push_text("I wrote the essay.");

    let events = run_turn(&h.graph, Some("user-1"), "write an essay").await;
    let parts = data_parts(&events);
    assert_artifacts_balanced(&parts);

    let doc_id = parts
        .iter()
        .find_map(|p| match p {
            DataPart::Id(id) => Some(id.clone()),
            _ => None,
        })
        .unwrap();
    assert!(parts.contains(&DataPart::Title("Essay".into())));
    assert!(parts.contains(&DataPart::Kind(DocumentKind::Text)));

    let deltas: String = parts
        .iter()
        .filter_map(|p| match p {
            DataPart::TextDelta(d) => Some(d.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(deltas, "Hello world");

    let saved = h.store.get_document(&doc_id).await.unwrap().unwrap();
    assert_eq!(saved.content.as_deref(), Some("Hello world"));
    assert_eq!(saved.kind, DocumentKind::Text);

    let (_, result, is_error) = &tool_results(&events)[0];
    assert!(!is_error);
    assert_eq!(result["id"], doc_id.as_str());
    assert_eq!(result["kind"], "text");
}

#[tokio::test]
async fn test_code_document_sends_full_code_each_delta() {
    let h = harness();
    h.llm
        .push_tool_call("call_1", "createDocument", json!({"title": "Hello", "kind": "code"}))
        .push(message_chunks(&[r#"{"code": "print("#, r#"1)"}"#]))
        .push_text("Done.");

    let events = run_turn(&h.graph, Some("user-1"), "write code").await;
    let parts = data_parts(&events);
    assert_artifacts_balanced(&parts);

    let code: Vec<&str> = parts
        .iter()
        .filter_map(|p| match p {
            DataPart::CodeDelta(c) => Some(c.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(code, vec!["print(", "print(1)"]);
}

#[tokio::test]
async fn test_image_document_uses_image_client() {
    let h = harness_with(HarnessOptions {
        image: Some(ScriptedImageClient::returning("aGVsbG8=")),
        ..Default::default()
    });
    h.llm
        .push_tool_call("call_1", "createDocument", json!({"title": "A cat", "kind": "image"}))
        .push_text("Here is your cat.");

    let events = run_turn(&h.graph, Some("user-1"), "draw a cat").await;
    let parts = data_parts(&events);
    assert_artifacts_balanced(&parts);
    assert!(parts.contains(&DataPart::ImageDelta("aGVsbG8=".into())));
}

#[tokio::test]
async fn test_failed_generation_still_finishes_artifact() {
    let h = harness();
    h.llm
        .push_tool_call("call_1", "createDocument", json!({"title": "Essay", "kind": "text"}))
        .push_failure("model overloaded")
        .push_text("Sorry, that failed.");

    let events = run_turn(&h.graph, Some("user-1"), "write").await;
    let parts = data_parts(&events);
    assert_artifacts_balanced(&parts);
    assert!(parts.contains(&DataPart::Finish));

    let (_, result, is_error) = &tool_results(&events)[0];
    assert!(is_error);
    assert!(result["error"].as_str().unwrap().contains("model overloaded"));
    assert_eq!(end_status(&events).as_deref(), Some("success"));
}

#[tokio::test]
async fn test_failed_code_generation_still_finishes_artifact() {
    let h = harness();
    h.llm
        .push_tool_call("call_1", "createDocument", json!({"title": "Script", "kind": "code"}))
        .push_failure("rate limited")
        .push_text("Sorry, that failed.");

    let events = run_turn(&h.graph, Some("user-1"), "write code").await;
    let parts = data_parts(&events);
    assert_artifacts_balanced(&parts);
    assert_eq!(parts.iter().filter(|p| **p == DataPart::Finish).count(), 1);
    assert!(!parts.iter().any(|p| matches!(p, DataPart::CodeDelta(_))));

    let (_, result, is_error) = &tool_results(&events)[0];
    assert!(is_error);
    assert!(result["error"].as_str().unwrap().contains("rate limited"));
    let id = parts
        .iter()
        .find_map(|p| match p {
            DataPart::Id(id) => Some(id.clone()),
            _ => None,
        })
        .unwrap();
    assert!(h.store.get_document_versions(&id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_image_generation_still_finishes_artifact() {
    let h = harness_with(HarnessOptions {
        image: Some(ScriptedImageClient::failing("content policy")),
        ..Default::default()
    });
    h.llm
        .push_tool_call("call_1", "createDocument", json!({"title": "A cat", "kind": "image"}))
        .push_text("I could not draw that.");

    let events = run_turn(&h.graph, Some("user-1"), "draw a cat").await;
    let parts = data_parts(&events);
    assert_artifacts_balanced(&parts);
    assert_eq!(parts.iter().filter(|p| **p == DataPart::Finish).count(), 1);
    assert!(!parts.iter().any(|p| matches!(p, DataPart::ImageDelta(_))));

    let (_, result, is_error) = &tool_results(&events)[0];
    assert!(is_error);
    assert!(result["error"].as_str().unwrap().contains("content policy"));
    assert_eq!(end_status(&events).as_deref(), Some("success"));
}

#[tokio::test]
async fn test_update_missing_document() {
    let h = harness();
    h.llm
        .push_tool_call("call_1", "updateDocument", json!({"id": "nope", "description": "shorter"}))
        .push_text("I could not find it.");

    let events = run_turn(&h.graph, Some("user-1"), "update").await;

    assert_eq!(tool_results(&events)[0].1, json!({"error": "Document not found"}));
    assert!(!data_parts(&events).iter().any(|p| matches!(p, DataPart::Clear(_))));
}

#[tokio::test]
async fn test_update_document_adds_version() {
    let h = harness();
    seed_document(&h.store, "doc-1", DocumentKind::Text, "Old text").await;
    h.llm
        .push_tool_call("call_1", "updateDocument", json!({"id": "doc-1", "description": "rewrite"}))
        .push_text("New text")
        .push_text("Updated.");

    let events = run_turn(&h.graph, Some("user-1"), "rewrite it").await;
    let parts = data_parts(&events);
    assert_artifacts_balanced(&parts);
    assert!(parts.contains(&DataPart::Clear("Essay".into())));

    let versions = h.store.get_document_versions("doc-1").await.unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[1].content.as_deref(), Some("New text"));

    // the nested request carries the current content in its system prompt
    let nested = &h.llm.requests()[1];
    assert!(nested.messages[0].text().contains("Old text"));
}

#[tokio::test]
async fn test_suggestions_stream_and_persist() {
    let h = harness();
    seed_document(&h.store, "doc-1", DocumentKind::Text, "Teh cat sat. It were happy.").await;
    h.llm
        .push_tool_call("call_1", "requestSuggestions", json!({"documentId": "doc-1"}))
        .push(message_chunks(&[
            r#"{"elements": [{"originalSentence": "Teh cat sat.", "suggestedSentence": "The cat sat.", "#,
            r#""description": "typo"}, {"originalSentence": "It were happy.", "#,
            r#""suggestedSentence": "It was happy.", "description": "grammar"}]}"#,
        ]))
        .push_text("Added two suggestions.");

    let events = run_turn(&h.graph, Some("user-1"), "review my essay").await;

    let suggestions: Vec<_> = data_parts(&events)
        .into_iter()
        .filter_map(|p| match p {
            DataPart::Suggestion(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].suggested_text, "The cat sat.");
    assert!(suggestions.iter().all(|s| s.document_id == "doc-1" && !s.is_resolved));

    let stored = h.store.get_suggestions("doc-1").await.unwrap();
    assert_eq!(stored.len(), 2);

    assert_eq!(tool_results(&events)[0].1["count"], 2);
}

#[tokio::test]
async fn test_suggestions_for_empty_document() {
    let h = harness();
    seed_document(&h.store, "doc-1", DocumentKind::Text, "").await;
    h.llm
        .push_tool_call("call_1", "requestSuggestions", json!({"documentId": "doc-1"}))
        .push_text("Nothing to review.");

    let events = run_turn(&h.graph, Some("user-1"), "review").await;
    assert_eq!(tool_results(&events)[0].1, json!({"error": "Document not found"}));
}

#[tokio::test]
async fn test_roadmap_event() {
    let h = harness();
    h.llm
        .push_tool_call(
            "call_1",
            "createRoadmap",
            json!({"roadmapEvents": [{"id": "week-1", "title": "Setup"}]}),
        )
        .push_text("Roadmap ready.");

    let events = run_turn(&h.graph, None, "roadmap").await;

    let roadmap = data_parts(&events).into_iter().find_map(|p| match p {
        DataPart::RoadmapCreation(events) => Some(events),
        _ => None,
    });
    assert_eq!(roadmap.unwrap()[0].id, "week-1");
    assert_eq!(tool_results(&events)[0].1["success"], true);
}

#[tokio::test]
async fn test_generate_course_plan() {
    let h = harness();
    h.llm
        .push_tool_call(
            "call_1",
            "generateInitialCoursePlan",
            json!({"learningGoals": "Learn Rust", "currentGoal": "Build a web service"}),
        )
        .push_text(&course_plan_json(3).to_string())
        .push_text("Here is your plan.");

    let events = run_turn(&h.graph, Some("user-1"), "plan").await;
    let result = &tool_results(&events)[0].1;

    assert_eq!(result["success"], true);
    assert_eq!(result["courseUrl"], "/course");
    assert_eq!(result["coursePlan"]["modules"].as_array().unwrap().len(), 3);

    let nested = &h.llm.requests()[1];
    assert!(nested.messages[0].text().contains("at most 5 modules"));
}

#[tokio::test]
async fn test_generate_course_plan_over_module_cap() {
    let h = harness();
    h.llm
        .push_tool_call(
            "call_1",
            "generateInitialCoursePlan",
            json!({"learningGoals": "Learn Rust", "currentGoal": "Build a web service"}),
        )
        .push_text(&course_plan_json(7).to_string())
        .push_text("Sorry.");

    let events = run_turn(&h.graph, Some("user-1"), "plan").await;
    let (_, result, is_error) = &tool_results(&events)[0];

    assert!(!is_error);
    assert_eq!(result["success"], false);
    assert_eq!(
        result["message"],
        "There was an error generating your course plan. Please try again."
    );
}

#[tokio::test]
async fn test_save_course_plan_requires_user() {
    let h = harness();
    h.llm
        .push_tool_call("call_1", "saveCoursePlan", course_plan_json(2))
        .push_text("Please log in.");

    let events = run_turn(&h.graph, None, "save").await;

    assert_eq!(tool_results(&events)[0].1["success"], false);
    assert!(!data_parts(&events).iter().any(|p| matches!(p, DataPart::CoursePlanSave(_))));
}

#[tokio::test]
async fn test_save_course_plan_overwrites_latest() {
    let cache = Arc::new(FileProfileCache::new(temp_dir()));
    let h = harness_with(HarnessOptions {
        cache: Some(cache.clone()),
        ..Default::default()
    });

    for _ in 0..2 {
        h.llm
            .push_tool_call("call_1", "saveCoursePlan", course_plan_json(2))
            .push_text("Saved.");
        let events = run_turn(&h.graph, Some("user-1"), "save it").await;

        assert_eq!(tool_results(&events)[0].1["success"], true);
        assert!(data_parts(&events).contains(&DataPart::CoursePlanSave(CoursePlanSaved {
            course_id: "user-1".into()
        })));
    }

    assert_eq!(h.store.course_plan_count("user-1").await, 1);
    let activities = cache.list_activities("user-1").await.unwrap();
    assert_eq!(activities.len(), 2);
    assert!(activities.iter().all(|a| a.kind == ActivityKind::CoursePlanCreate));
}

#[tokio::test]
async fn test_save_course_plan_storage_failure() {
    let h = harness();
    h.store.set_unavailable(true);
    h.llm
        .push_tool_call("call_1", "saveCoursePlan", course_plan_json(2))
        .push_text("Sorry.");

    let events = run_turn(&h.graph, Some("user-1"), "save").await;

    assert_eq!(
        tool_results(&events)[0].1["message"],
        "There was an error saving your course plan. Please try again."
    );
}

#[tokio::test]
async fn test_profile_generation_stores_and_caches() {
    let cache = Arc::new(FileProfileCache::new(temp_dir()));
    let h = harness_with(HarnessOptions {
        cache: Some(cache.clone()),
        ..Default::default()
    });
    h.llm
        .push_tool_call(
            "call_1",
            "userProfileGeneration",
            json!({"name": "ada", "learningGoals": "Rust", "currentGoal": "Ship a CLI"}),
        )
        .push_text("Profile ready.");

    let events = run_turn(&h.graph, Some("user-1"), "make my profile").await;
    let result = &tool_results(&events)[0].1;

    assert_eq!(result["success"], true);
    assert!(result.get("warning").is_none());
    assert_eq!(result["profile"]["userProfile"]["avatarFallback"], "A");
    assert_eq!(result["profile"]["userProfile"]["education"], "");
    assert_eq!(result["profile"]["currentGoal"], "Ship a CLI");

    assert!(h.store.get_profile("user-1").await.unwrap().is_some());
    assert!(cache.load_profile("user-1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_profile_generation_with_broken_cache_warns() {
    let dir = temp_dir();
    std::fs::create_dir_all(&dir).unwrap();
    let blocker = dir.join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();
    let h = harness_with(HarnessOptions {
        cache: Some(Arc::new(FileProfileCache::new(&blocker))),
        ..Default::default()
    });
    h.llm
        .push_tool_call(
            "call_1",
            "userProfileGeneration",
            json!({"name": "Grace", "learningGoals": "Compilers", "currentGoal": "Write a parser"}),
        )
        .push_text("Done.");

    let events = run_turn(&h.graph, None, "profile").await;
    let (_, result, is_error) = &tool_results(&events)[0];

    assert!(!is_error);
    assert_eq!(result["success"], true);
    assert!(result["message"].as_str().unwrap().starts_with("Profile processed for Grace"));
    assert!(result["warning"].is_string());
}
