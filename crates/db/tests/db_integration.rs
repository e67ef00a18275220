//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `forum_test`)
//!   `TEST_DB_PASSWORD` (default: `forum_test`)
//!   `TEST_DB_NAME` (default: `forum_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use forum_db::{
    entities::{
        classes, department, group_chat, group_chat_participant, group_message, message,
        message::MessageType,
        message_vote::VoteKind,
        user,
    },
    repositories::{
        ClassesRepository, DepartmentRepository, GroupChatRepository, MessageRepository,
        UserRepository,
    },
    test_utils::{TestDatabase, TestDbConfig},
};
use sea_orm::Set;

fn new_user(id: &str, unity_id: &str) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id.to_string()),
        unity_id: Set(unity_id.to_string()),
        display_name: Set(unity_id.to_uppercase()),
        email: Set(None),
        bio: Set(None),
        profile_picture_url: Set(None),
        is_student: Set(true),
        department: Set(None),
        created_at: Set(Utc::now().into()),
    }
}

fn new_department(id: &str, name: &str) -> department::ActiveModel {
    department::ActiveModel {
        id: Set(id.to_string()),
        name: Set(name.to_string()),
        code: Set(None),
        description: Set(None),
        created_at: Set(Utc::now().into()),
    }
}

fn new_message(id: &str, parent_id: Option<&str>) -> message::ActiveModel {
    message::ActiveModel {
        id: Set(id.to_string()),
        sender_id: Set("u1".to_string()),
        department_id: Set(Some("d1".to_string())),
        professor_id: Set(None),
        class_id: Set(None),
        parent_id: Set(parent_id.map(ToString::to_string)),
        title: Set(format!("title {id}")),
        body: Set(format!("body {id}")),
        message_type: Set(MessageType::General),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

async fn seed(conn: Arc<sea_orm::DatabaseConnection>) {
    UserRepository::new(conn.clone())
        .create(new_user("u1", "jdoe"))
        .await
        .unwrap();
    DepartmentRepository::new(conn)
        .create(new_department("d1", "Computer Science"))
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::connect(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_delete_thread_removes_all_descendants() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = db.connection();
    seed(conn.clone()).await;

    let repo = MessageRepository::new(conn.clone());
    repo.create(new_message("m1", None)).await.unwrap();
    repo.create(new_message("m2", Some("m1"))).await.unwrap();
    repo.create(new_message("m3", Some("m2"))).await.unwrap();
    repo.create(new_message("m4", None)).await.unwrap();
    repo.cast_vote("v1".to_string(), "m3", "jdoe", VoteKind::Like)
        .await
        .unwrap();

    let removed = repo.delete_thread("m1").await.unwrap();

    assert_eq!(removed, 3);
    assert!(repo.find_by_id("m3").await.unwrap().is_none());
    assert!(repo.find_by_id("m4").await.unwrap().is_some());
    assert!(repo.find_votes("m3").await.unwrap().is_empty());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_vote_flip_keeps_one_row_per_identity() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = db.connection();
    seed(conn.clone()).await;

    let repo = MessageRepository::new(conn.clone());
    repo.create(new_message("m1", None)).await.unwrap();

    repo.cast_vote("v1".to_string(), "m1", "jdoe", VoteKind::Dislike)
        .await
        .unwrap();
    repo.cast_vote("v2".to_string(), "m1", "jdoe", VoteKind::Like)
        .await
        .unwrap();
    repo.cast_vote("v3".to_string(), "m1", "jdoe", VoteKind::Like)
        .await
        .unwrap();

    let votes = repo.find_votes("m1").await.unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].kind, VoteKind::Like);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_class_search_is_case_insensitive() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = db.connection();
    seed(conn.clone()).await;

    let repo = ClassesRepository::new(conn.clone());
    for (id, title) in [("c1", "CSC116"), ("c2", "MA141")] {
        repo.create(classes::ActiveModel {
            id: Set(id.to_string()),
            course_title: Set(title.to_string()),
            chat_enabled: Set(true),
            department_id: Set(Some("d1".to_string())),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();
    }

    let found = repo.search("csc").await.unwrap();
    let titles: Vec<_> = found.iter().map(|c| c.course_title.as_str()).collect();
    assert_eq!(titles, vec!["CSC116"]);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_append_message_moves_last_message_pointer() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = db.connection();
    seed(conn.clone()).await;

    let repo = GroupChatRepository::new(conn.clone());
    let (chat, first) = repo
        .create_with_message(
            group_chat::ActiveModel {
                id: Set("g1".to_string()),
                group_title: Set("Study group".to_string()),
                last_message_id: Set(None),
                last_message_at: Set(None),
                created_at: Set(Utc::now().into()),
            },
            vec![group_chat_participant::ActiveModel {
                id: Set("p1".to_string()),
                group_chat_id: Set("g1".to_string()),
                user_id: Set("u1".to_string()),
                joined_at: Set(Utc::now().into()),
            }],
            group_message::ActiveModel {
                id: Set("gm1".to_string()),
                group_chat_id: Set("g1".to_string()),
                sender_id: Set("u1".to_string()),
                content: Set("first".to_string()),
                created_at: Set(Utc::now().into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(chat.last_message_id.as_deref(), Some(first.id.as_str()));

    let second = repo
        .append_message(group_message::ActiveModel {
            id: Set("gm2".to_string()),
            group_chat_id: Set("g1".to_string()),
            sender_id: Set("u1".to_string()),
            content: Set("second".to_string()),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    let chat = repo.get_by_id("g1").await.unwrap();
    assert_eq!(chat.last_message_id.as_deref(), Some("gm2"));
    assert_eq!(chat.last_message_at, Some(second.created_at));
    assert_eq!(repo.find_messages("g1").await.unwrap().len(), 2);

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("testdb"));
}
