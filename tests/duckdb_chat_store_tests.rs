use std::sync::Arc;

use serde_json::{json, Map, Value};
use swasthya::application::{CaseRepository, MessageRepository, ProfileRepository};
use swasthya::{AIAnalysis, Case, DuckdbChatStore, Identity, NewMessage, Role, UserProfile};
use tempfile::tempdir;

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[tokio::test]
async fn duckdb_chat_store_profile_roundtrip_and_overwrite() {
    let dir = tempdir().expect("tempdir");
    let store = DuckdbChatStore::new(&dir.path().join("swasthya.duckdb")).expect("duckdb init");

    assert!(store.find_profile("u1").await.expect("find").is_none());

    let profile = UserProfile::new("asha@example.com", fields(json!({ "age": 34 })));
    store.save_profile("u1", &profile).await.expect("save");

    let found = store.find_profile("u1").await.expect("find").expect("exists");
    assert_eq!(found.email(), "asha@example.com");
    assert_eq!(found.field("age"), Some(&json!(34)));
    assert_eq!(found.created_at(), profile.created_at());

    let replaced = UserProfile::new("asha@example.com", fields(json!({ "village": "Rampur" })));
    store.save_profile("u1", &replaced).await.expect("overwrite");
    let found = store.find_profile("u1").await.expect("find").expect("exists");
    assert!(found.field("age").is_none());
    assert_eq!(found.field("village"), Some(&json!("Rampur")));
}

#[tokio::test]
async fn duckdb_chat_store_cases_are_scoped_and_newest_first() {
    let store = DuckdbChatStore::in_memory().expect("duckdb init");
    let user = Identity::new("u1", None);

    let case_at = |id: &str, created_at: i64| {
        Case::reconstitute(id.into(), "u1".into(), "anonymous".into(), created_at, None, None)
    };
    let older = case_at("case-a", 1_000);
    let newer = case_at("case-b", 2_000);
    let foreign = Case::start(&Identity::new("u2", None));

    store.create_case(&older).await.expect("create older");
    store.create_case(&newer).await.expect("create newer");
    store.create_case(&foreign).await.expect("create foreign");

    let cases = store.list_cases(user.uid()).await.expect("list");
    let ids: Vec<&str> = cases.iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec!["case-b", "case-a"]);

    assert!(store
        .find_case("u1", foreign.id())
        .await
        .expect("find")
        .is_none());
}

#[tokio::test]
async fn duckdb_chat_store_merge_analysis() {
    let store = DuckdbChatStore::in_memory().expect("duckdb init");
    let case = Case::start(&Identity::new("u1", Some("a@b.c".into())));
    store.create_case(&case).await.expect("create");

    store
        .merge_analysis("u1", case.id(), &AIAnalysis::baseline())
        .await
        .expect("merge");

    let found = store.find_case("u1", case.id()).await.expect("find").expect("exists");
    assert_eq!(found.analysis(), Some(&AIAnalysis::baseline()));
    assert!(found.analysis_updated_at().is_some());
    assert_eq!(found.started_by(), "a@b.c");

    let err = store
        .merge_analysis("u1", "missing", &AIAnalysis::baseline())
        .await
        .expect_err("unknown case");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn duckdb_chat_store_messages_keep_write_order() {
    let store = DuckdbChatStore::in_memory().expect("duckdb init");
    let case = Case::start(&Identity::new("u1", None));
    store.create_case(&case).await.expect("create");

    for i in 0..5 {
        store
            .append_message("u1", case.id(), NewMessage::user(format!("question {}", i)))
            .await
            .expect("append user");
        store
            .append_message("u1", case.id(), NewMessage::bot(format!("answer {}", i)))
            .await
            .expect("append bot");
    }

    let messages = store.list_messages("u1", case.id()).await.expect("list");
    assert_eq!(messages.len(), 10);
    for (i, pair) in messages.chunks(2).enumerate() {
        assert_eq!(pair[0].role(), Role::User);
        assert_eq!(pair[0].text(), format!("question {}", i));
        assert_eq!(pair[1].role(), Role::Bot);
        assert_eq!(pair[1].text(), format!("answer {}", i));
    }
    assert!(messages
        .windows(2)
        .all(|w| (w[0].created_at(), w[0].sequence()) < (w[1].created_at(), w[1].sequence())));
}

#[tokio::test]
async fn duckdb_chat_store_rejects_messages_for_unknown_case() {
    let store = DuckdbChatStore::in_memory().expect("duckdb init");
    let err = store
        .append_message("u1", "missing", NewMessage::user("hello"))
        .await
        .expect_err("unknown case");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn duckdb_chat_store_subscription_sees_new_messages() {
    let store = Arc::new(DuckdbChatStore::in_memory().expect("duckdb init"));
    let case = Case::start(&Identity::new("u1", None));
    store.create_case(&case).await.expect("create");
    store
        .append_message("u1", case.id(), NewMessage::user("before"))
        .await
        .expect("append");

    let mut subscription = store.subscribe("u1", case.id()).await.expect("subscribe");
    assert_eq!(subscription.snapshot().len(), 1);
    assert_eq!(store.listener_count("u1", case.id()), 1);

    store
        .append_message("u1", case.id(), NewMessage::bot("after"))
        .await
        .expect("append");
    let snapshot = subscription.changed().await.expect("changed");
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[1].text(), "after");

    subscription.cancel();
    assert_eq!(store.listener_count("u1", case.id()), 0);
    assert_eq!(store.channel_count(), 0);
}

#[tokio::test]
async fn duckdb_chat_store_persists_across_reopen() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("swasthya.duckdb");
    let case = Case::start(&Identity::new("u1", None));

    {
        let store = DuckdbChatStore::new(&db_path).expect("duckdb init");
        store
            .save_profile("u1", &UserProfile::new("", Map::new()))
            .await
            .expect("save profile");
        store.create_case(&case).await.expect("create");
        store
            .append_message("u1", case.id(), NewMessage::user("persist me"))
            .await
            .expect("append");
    }

    let reopened = DuckdbChatStore::new(&db_path).expect("duckdb reopen");
    assert!(reopened.find_profile("u1").await.expect("find").is_some());
    assert!(reopened.find_case("u1", case.id()).await.expect("find").is_some());
    let messages = reopened.list_messages("u1", case.id()).await.expect("list");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text(), "persist me");
}
