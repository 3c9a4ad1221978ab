use amigo_persist::{
    DBChat, DBDocument, DBMessage, InMemoryPersistenceClient, PersistError, PersistenceClient,
    Visibility,
};
use amigo_types::{set_topic_completed, CourseModule, CoursePlanContent, CourseTopic, DocumentKind};

fn plan(title: &str) -> CoursePlanContent {
    CoursePlanContent {
        title: title.to_string(),
        description: format!("{} course", title),
        learning_objectives: Some(vec!["basics".to_string()]),
        total_estimated_time: Some("4h".to_string()),
        modules: vec![CourseModule {
            id: "m1".to_string(),
            title: "Intro".to_string(),
            description: String::new(),
            estimated_time: "1h".to_string(),
            topics: vec![CourseTopic {
                id: "t1".to_string(),
                title: "Setup".to_string(),
                estimated_time: "15m".to_string(),
                completed: false,
            }],
            resources: Vec::new(),
        }],
    }
}

#[tokio::test]
async fn test_second_course_plan_save_overwrites_first() {
    let store = InMemoryPersistenceClient::new();

    let first = store.save_course_plan("user-1", plan("Rust")).await.unwrap();
    let second = store.save_course_plan("user-1", plan("Go")).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(store.course_plan_count("user-1").await, 1);

    let plans = store.list_course_plans("user-1").await.unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].plan.title, "Go");
}

#[tokio::test]
async fn test_course_plans_are_per_user() {
    let store = InMemoryPersistenceClient::new();
    store.save_course_plan("user-1", plan("Rust")).await.unwrap();
    store.save_course_plan("user-2", plan("Go")).await.unwrap();

    assert_eq!(store.course_plan_count("user-1").await, 1);
    assert_eq!(store.list_course_plans("user-2").await.unwrap()[0].plan.title, "Go");
}

#[tokio::test]
async fn test_update_modules_marks_topic() {
    let store = InMemoryPersistenceClient::new();
    let saved = store.save_course_plan("user-1", plan("Rust")).await.unwrap();

    let mut modules = saved.plan.modules.clone();
    assert!(set_topic_completed(&mut modules, "m1", "t1", true));
    let updated = store.update_course_plan_modules(&saved.id, modules).await.unwrap();

    assert!(updated.plan.modules[0].topics[0].completed);
    assert!(updated.updated_at >= saved.updated_at);
}

#[tokio::test]
async fn test_update_modules_of_unknown_plan() {
    let store = InMemoryPersistenceClient::new();
    let err = store.update_course_plan_modules("nope", Vec::new()).await.unwrap_err();
    assert!(matches!(err, PersistError::NotFound { entity: "course plan", .. }));
}

#[tokio::test]
async fn test_delete_chat_removes_messages() {
    let store = InMemoryPersistenceClient::new();
    store.save_chat(DBChat::new("chat-1", "user-1", "Weather")).await.unwrap();
    store.save_chat(DBChat::new("chat-2", "user-1", "Other")).await.unwrap();
    store
        .save_messages(vec![
            DBMessage::user("m1", "chat-1", "hi"),
            DBMessage::user("m2", "chat-2", "hello"),
        ])
        .await
        .unwrap();

    store.delete_chat("chat-1").await.unwrap();

    assert!(store.get_chat("chat-1").await.unwrap().is_none());
    assert!(store.get_messages("chat-1").await.unwrap().is_empty());
    assert_eq!(store.get_messages("chat-2").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_saving_existing_chat_keeps_title() {
    let store = InMemoryPersistenceClient::new();
    store.save_chat(DBChat::new("chat-1", "user-1", "First")).await.unwrap();
    store.save_chat(DBChat::new("chat-1", "user-1", "Second")).await.unwrap();

    let chat = store.get_chat("chat-1").await.unwrap().unwrap();
    assert_eq!(chat.title, "First");
    assert_eq!(chat.visibility, Visibility::Private);

    store.update_chat_visibility("chat-1", Visibility::Public).await.unwrap();
    assert_eq!(store.get_chat("chat-1").await.unwrap().unwrap().visibility, Visibility::Public);
}

#[tokio::test]
async fn test_document_versions() {
    let store = InMemoryPersistenceClient::new();
    let mut first = DBDocument::new_version("doc-1", "Essay", DocumentKind::Text, "draft", "user-1");
    first.created_at -= chrono::Duration::seconds(10);
    let second = DBDocument::new_version("doc-1", "Essay", DocumentKind::Text, "final", "user-1");

    store.save_document(second).await.unwrap();
    store.save_document(first).await.unwrap();

    let versions = store.get_document_versions("doc-1").await.unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].content.as_deref(), Some("draft"));

    let latest = store.get_document("doc-1").await.unwrap().unwrap();
    assert_eq!(latest.content.as_deref(), Some("final"));
    assert!(store.get_document("doc-2").await.unwrap().is_none());
}

#[tokio::test]
async fn test_unavailable_store_fails() {
    let store = InMemoryPersistenceClient::new();
    store.set_unavailable(true);
    let err = store.get_chat("chat-1").await.unwrap_err();
    assert!(matches!(err, PersistError::Connection(_)));

    store.set_unavailable(false);
    assert!(store.get_chat("chat-1").await.unwrap().is_none());
}
