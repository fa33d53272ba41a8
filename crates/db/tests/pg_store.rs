//! Integration tests for [`PgStore`] against a real database.
//!
//! These need a reachable PostgreSQL server (`DATABASE_URL`); run them with
//! `cargo test -p portfolio-db -- --ignored`.

use assert_matches::assert_matches;
use portfolio_core::comment::NewComment;
use portfolio_core::error::CoreError;
use portfolio_core::message::NewMessage;
use portfolio_core::project::{
    DescriptionFields, DescriptionInput, ObjectiveInput, ProjectFields, ProjectInput,
};
use portfolio_core::reconcile::AggregateReconciler;
use portfolio_core::store::{CommentStore, MessageStore, ProjectStore};
use portfolio_db::PgStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_project(title: &str, objectives: &[&str]) -> ProjectInput {
    ProjectInput {
        fields: ProjectFields {
            title: title.to_string(),
            technologies: vec!["rust".to_string(), "postgres".to_string()],
            ..Default::default()
        },
        desc: Some(DescriptionInput {
            fields: DescriptionFields {
                title: "Overview".to_string(),
                ..Default::default()
            },
            objectives: objectives.iter().map(|t| ObjectiveInput::new(*t)).collect(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_and_fetch_full_graph(pool: PgPool) {
    let store = PgStore::new(pool);

    let created = store
        .insert_project(&new_project("Site", &["A", "B"]))
        .await
        .unwrap();
    assert_eq!(created.version, 1);

    let fetched = store.get_project(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.fields.technologies, vec!["rust", "postgres"]);
    let texts: Vec<&str> = fetched
        .desc
        .as_ref()
        .unwrap()
        .objectives
        .iter()
        .map(|o| o.text.as_str())
        .collect();
    assert_eq!(texts, vec!["A", "B"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_reconcile_preserves_objective_identity(pool: PgPool) {
    let store = PgStore::new(pool);
    let existing = store
        .insert_project(&new_project("Site", &["A", "B"]))
        .await
        .unwrap();
    let objectives = &existing.desc.as_ref().unwrap().objectives;
    let (id_a, id_b) = (objectives[0].id, objectives[1].id);

    let mut desired = ProjectInput::from_project(&existing);
    desired.desc.as_mut().unwrap().objectives = vec![
        ObjectiveInput::with_id(id_a, "A2"),
        ObjectiveInput::new("C"),
    ];

    let updated = AggregateReconciler::new(&store)
        .reconcile(&existing, &desired)
        .await
        .unwrap();

    let after = &updated.desc.as_ref().unwrap().objectives;
    assert_eq!(after.len(), 2);
    assert_eq!(after[0].id, id_a);
    assert_eq!(after[0].text, "A2");
    assert_eq!(after[1].text, "C");
    assert_ne!(after[1].id, id_b);
    assert_eq!(updated.version, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_stale_version_is_rejected(pool: PgPool) {
    let store = PgStore::new(pool);
    let existing = store
        .insert_project(&new_project("Site", &["A"]))
        .await
        .unwrap();

    let reconciler = AggregateReconciler::new(&store);
    let mut first = ProjectInput::from_project(&existing);
    first.fields.title = "First".to_string();
    reconciler.reconcile(&existing, &first).await.unwrap();

    let mut second = ProjectInput::from_project(&existing);
    second.version = None;
    second.fields.title = "Second".to_string();
    let err = reconciler.reconcile(&existing, &second).await.unwrap_err();

    assert_matches!(err, CoreError::ConcurrencyConflict { .. });
    let stored = store.get_project(existing.id).await.unwrap().unwrap();
    assert_eq!(stored.fields.title, "First");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_removes_all_children(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let project = store
        .insert_project(&new_project("Site", &["A", "B", "C"]))
        .await
        .unwrap();
    store
        .insert_comment(&NewComment {
            project_id: project.id,
            content: "Nice".to_string(),
            author_name: "Bo".to_string(),
        })
        .await
        .unwrap();

    assert!(store.delete_project(project.id).await.unwrap());
    assert!(!store.delete_project(project.id).await.unwrap());

    assert_eq!(count(&pool, "project_descriptions").await, 0);
    assert_eq!(count(&pool, "objectives").await, 0);
    assert_eq!(count(&pool, "comments").await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_update_and_delete_never_fail_internally(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let texts: Vec<String> = (0..20).map(|i| format!("objective {i}")).collect();
    let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();

    let mut handles = Vec::new();
    for n in 0..30 {
        let existing = store
            .insert_project(&new_project(&format!("Site {n}"), &text_refs))
            .await
            .unwrap();

        // Rewrite every objective so the update touches every child row.
        let mut desired = ProjectInput::from_project(&existing);
        for objective in &mut desired.desc.as_mut().unwrap().objectives {
            objective.text.push_str(" (edited)");
        }

        let id = existing.id;
        let writer = store.clone();
        handles.push(tokio::spawn(async move {
            AggregateReconciler::new(&writer)
                .reconcile(&existing, &desired)
                .await
                .map(|_| ())
        }));

        let deleter = store.clone();
        handles.push(tokio::spawn(async move {
            deleter.delete_project(id).await.map(|_| ())
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert_matches!(
            result,
            Ok(()) | Err(CoreError::NotFound { .. }) | Err(CoreError::ConcurrencyConflict { .. })
        );
    }

    // Every delete committed; nothing is left behind.
    assert_eq!(count(&pool, "projects").await, 0);
    assert_eq!(count(&pool, "objectives").await, 0);
}

// ---------------------------------------------------------------------------
// Comments and messages
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_comment_on_missing_project_is_invalid_reference(pool: PgPool) {
    let store = PgStore::new(pool);
    let err = store
        .insert_comment(&NewComment {
            project_id: 999,
            content: "Hello".to_string(),
            author_name: "Bo".to_string(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::InvalidReference { id: 999, .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_recent_messages_newest_first_and_bounded(pool: PgPool) {
    let store = PgStore::new(pool);
    for i in 0..5 {
        store
            .append_message(&NewMessage::new("bot", format!("msg {i}")))
            .await
            .unwrap();
    }

    let recent = store.recent_messages(3).await.unwrap();
    let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["msg 4", "msg 3", "msg 2"]);
}
