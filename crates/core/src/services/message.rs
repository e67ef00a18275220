//! Message service (forum posts, comments and votes).

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use forum_common::{AppError, AppResult, IdGenerator};
use forum_db::{
    entities::{
        message::{self, MessageType},
        message_vote::{self, VoteKind},
    },
    repositories::{
        ClassesRepository, DepartmentRepository, MessageFilter, MessageRepository,
        ProfessorRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for creating a post or a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageInput {
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
    #[validate(length(max = 256))]
    #[serde(default)]
    pub title: String,
    /// Unity id of the author.
    pub sender_id: String,
    pub department_id: Option<String>,
    pub professor_id: Option<String>,
    pub class_id: Option<String>,
    pub parent_id: Option<String>,
}

/// Input for editing a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessageInput {
    #[validate(length(max = 256))]
    pub title: String,
    #[validate(length(min = 1, max = 10000))]
    pub body: String,
    #[serde(alias = "prof")]
    pub professor_id: Option<String>,
    #[serde(alias = "clazz")]
    pub class_id: Option<String>,
}

/// Optional narrowing for a department feed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub class_id: Option<String>,
    pub professor_id: Option<String>,
    #[serde(rename = "type")]
    pub message_type: Option<MessageType>,
}

impl From<FeedQuery> for MessageFilter {
    fn from(query: FeedQuery) -> Self {
        Self {
            class_id: query.class_id,
            professor_id: query.professor_id,
            message_type: query.message_type,
        }
    }
}

/// Message response with its vote tallies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub sender_id: String,
    pub department_id: Option<String>,
    pub professor_id: Option<String>,
    pub class_id: Option<String>,
    pub parent_id: Option<String>,
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub liked_by: Vec<String>,
    pub disliked_by: Vec<String>,
    /// Likes minus dislikes.
    pub likes: i64,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl MessageResponse {
    fn new(message: message::Model, votes: &[message_vote::Model]) -> Self {
        let mut liked_by = Vec::new();
        let mut disliked_by = Vec::new();
        for vote in votes.iter().filter(|v| v.message_id == message.id) {
            match vote.kind {
                VoteKind::Like => liked_by.push(vote.unity_id.clone()),
                VoteKind::Dislike => disliked_by.push(vote.unity_id.clone()),
            }
        }

        #[allow(clippy::cast_possible_wrap)]
        let likes = liked_by.len() as i64 - disliked_by.len() as i64;

        Self {
            id: message.id,
            sender_id: message.sender_id,
            department_id: message.department_id,
            professor_id: message.professor_id,
            class_id: message.class_id,
            parent_id: message.parent_id,
            title: message.title,
            body: message.body,
            message_type: message.message_type,
            liked_by,
            disliked_by,
            likes,
            created_at: message.created_at,
            updated_at: message.updated_at,
        }
    }
}

/// A post together with its direct comments.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDetail {
    #[serde(flatten)]
    pub message: MessageResponse,
    pub comments: Vec<MessageResponse>,
}

/// Message service for business logic.
#[derive(Clone)]
pub struct MessageService {
    message_repo: MessageRepository,
    user_repo: UserRepository,
    department_repo: DepartmentRepository,
    professor_repo: ProfessorRepository,
    classes_repo: ClassesRepository,
    id_gen: IdGenerator,
}

impl MessageService {
    /// Create a new message service.
    #[must_use]
    pub const fn new(
        message_repo: MessageRepository,
        user_repo: UserRepository,
        department_repo: DepartmentRepository,
        professor_repo: ProfessorRepository,
        classes_repo: ClassesRepository,
    ) -> Self {
        Self {
            message_repo,
            user_repo,
            department_repo,
            professor_repo,
            classes_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post or, when `parentId` is set, a comment.
    ///
    /// Comments inherit their parent's department.
    pub async fn create(&self, input: CreateMessageInput) -> AppResult<MessageResponse> {
        input.validate()?;

        let sender = self.user_repo.get_by_unity_id(&input.sender_id).await?;

        if let Some(professor_id) = &input.professor_id {
            self.professor_repo.get_by_id(professor_id).await?;
        }
        if let Some(class_id) = &input.class_id {
            self.classes_repo.get_by_id(class_id).await?;
        }

        let department_id = match (&input.parent_id, &input.department_id) {
            (Some(parent_id), _) => self.message_repo.get_by_id(parent_id).await?.department_id,
            (None, Some(department_id)) => {
                Some(self.department_repo.get_by_id(department_id).await?.id)
            }
            (None, None) => {
                return Err(AppError::BadRequest(
                    "Either departmentId or parentId is required".to_string(),
                ));
            }
        };

        let message_type =
            MessageType::classify(input.professor_id.is_some(), input.class_id.is_some());

        let model = message::ActiveModel {
            id: Set(self.id_gen.generate()),
            sender_id: Set(sender.id.clone()),
            department_id: Set(department_id),
            professor_id: Set(input.professor_id),
            class_id: Set(input.class_id),
            parent_id: Set(input.parent_id),
            title: Set(input.title),
            body: Set(input.content),
            message_type: Set(message_type),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let message = self.message_repo.create(model).await?;
        tracing::info!(
            message_id = %message.id,
            sender_id = %sender.id,
            message_type = ?message.message_type,
            "Created message"
        );

        Ok(MessageResponse::new(message, &[]))
    }

    /// Every message, newest first.
    pub async fn list_all(&self) -> AppResult<Vec<MessageResponse>> {
        let messages = self.message_repo.find_all().await?;
        self.with_votes(messages).await
    }

    /// A department's feed, newest first.
    pub async fn list_by_department(
        &self,
        department_id: &str,
        filter: MessageFilter,
    ) -> AppResult<Vec<MessageResponse>> {
        let messages = self
            .message_repo
            .find_by_department(department_id, &filter)
            .await?;
        self.with_votes(messages).await
    }

    /// Direct replies to a message, newest first.
    pub async fn list_replies(&self, id: &str) -> AppResult<Vec<MessageResponse>> {
        self.message_repo.get_by_id(id).await?;
        let replies = self.message_repo.find_replies(id).await?;
        self.with_votes(replies).await
    }

    /// A message with its direct comments.
    pub async fn get(&self, id: &str) -> AppResult<MessageDetail> {
        let message = self.message_repo.get_by_id(id).await?;
        let votes = self.message_repo.find_votes(id).await?;
        let comments = self.list_replies_of(id).await?;

        Ok(MessageDetail {
            message: MessageResponse::new(message, &votes),
            comments,
        })
    }

    /// Edit a message.
    ///
    /// A professor or class id that does not resolve clears that reference.
    /// The type is derived again from the references left afterwards.
    pub async fn update(&self, id: &str, input: UpdateMessageInput) -> AppResult<MessageResponse> {
        input.validate()?;
        let message = self.message_repo.get_by_id(id).await?;

        let mut professor_id = message.professor_id.clone();
        if let Some(requested) = &input.professor_id {
            professor_id = self
                .professor_repo
                .find_by_id(requested)
                .await?
                .map(|p| p.id);
        }

        let mut class_id = message.class_id.clone();
        if let Some(requested) = &input.class_id {
            class_id = self.classes_repo.find_by_id(requested).await?.map(|c| c.id);
        }

        let message_type = MessageType::classify(professor_id.is_some(), class_id.is_some());

        let mut active: message::ActiveModel = message.into();
        active.title = Set(input.title);
        active.body = Set(input.body);
        active.professor_id = Set(professor_id);
        active.class_id = Set(class_id);
        active.message_type = Set(message_type);
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.message_repo.update(active).await?;
        let votes = self.message_repo.find_votes(&updated.id).await?;
        Ok(MessageResponse::new(updated, &votes))
    }

    /// Delete a message and every comment beneath it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.message_repo.get_by_id(id).await?;
        let removed = self.message_repo.delete_thread(id).await?;
        tracing::info!(message_id = %id, removed, "Deleted message thread");
        Ok(())
    }

    /// Like a message, replacing any dislike by the same identity.
    pub async fn like(&self, id: &str, unity_id: Option<&str>) -> AppResult<MessageResponse> {
        self.vote(id, unity_id, VoteKind::Like).await
    }

    /// Dislike a message, replacing any like by the same identity.
    pub async fn dislike(&self, id: &str, unity_id: Option<&str>) -> AppResult<MessageResponse> {
        self.vote(id, unity_id, VoteKind::Dislike).await
    }

    /// Withdraw a like.
    pub async fn remove_like(&self, id: &str, unity_id: Option<&str>) -> AppResult<MessageResponse> {
        self.unvote(id, unity_id, VoteKind::Like).await
    }

    /// Withdraw a dislike.
    pub async fn remove_dislike(
        &self,
        id: &str,
        unity_id: Option<&str>,
    ) -> AppResult<MessageResponse> {
        self.unvote(id, unity_id, VoteKind::Dislike).await
    }

    async fn vote(
        &self,
        id: &str,
        unity_id: Option<&str>,
        kind: VoteKind,
    ) -> AppResult<MessageResponse> {
        let message = self.message_repo.get_by_id(id).await?;
        let unity_id = require_unity_id(unity_id)?;

        self.message_repo
            .cast_vote(self.id_gen.generate(), id, unity_id, kind)
            .await?;
        tracing::debug!(message_id = %id, unity_id = %unity_id, kind = ?kind, "Vote cast");

        let votes = self.message_repo.find_votes(id).await?;
        Ok(MessageResponse::new(message, &votes))
    }

    async fn unvote(
        &self,
        id: &str,
        unity_id: Option<&str>,
        kind: VoteKind,
    ) -> AppResult<MessageResponse> {
        let message = self.message_repo.get_by_id(id).await?;
        let unity_id = require_unity_id(unity_id)?;

        self.message_repo.remove_vote(id, unity_id, kind).await?;

        let votes = self.message_repo.find_votes(id).await?;
        Ok(MessageResponse::new(message, &votes))
    }

    async fn list_replies_of(&self, id: &str) -> AppResult<Vec<MessageResponse>> {
        let replies = self.message_repo.find_replies(id).await?;
        self.with_votes(replies).await
    }

    async fn with_votes(&self, messages: Vec<message::Model>) -> AppResult<Vec<MessageResponse>> {
        if messages.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<String> = messages.iter().map(|m| m.id.clone()).collect();
        let mut by_message: HashMap<String, Vec<message_vote::Model>> = HashMap::new();
        for vote in self.message_repo.find_votes_for(&ids).await? {
            by_message.entry(vote.message_id.clone()).or_default().push(vote);
        }

        Ok(messages
            .into_iter()
            .map(|m| {
                let votes = by_message.remove(&m.id).unwrap_or_default();
                MessageResponse::new(m, &votes)
            })
            .collect())
    }
}

fn require_unity_id(unity_id: Option<&str>) -> AppResult<&str> {
    unity_id
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing unityId in request".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use forum_db::entities::{department, user};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: &str, unity_id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            unity_id: unity_id.to_string(),
            display_name: "Test".to_string(),
            email: None,
            bio: None,
            profile_picture_url: None,
            is_student: true,
            department: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_message(id: &str, parent_id: Option<&str>) -> message::Model {
        message::Model {
            id: id.to_string(),
            sender_id: "u1".to_string(),
            department_id: Some("d1".to_string()),
            professor_id: None,
            class_id: None,
            parent_id: parent_id.map(ToString::to_string),
            title: "Title".to_string(),
            body: "Body".to_string(),
            message_type: MessageType::General,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_vote(message_id: &str, unity_id: &str, kind: VoteKind) -> message_vote::Model {
        message_vote::Model {
            id: format!("v-{message_id}-{unity_id}"),
            message_id: message_id.to_string(),
            unity_id: unity_id.to_string(),
            kind,
            created_at: Utc::now().into(),
        }
    }

    struct Mocks {
        message: MockDatabase,
        user: MockDatabase,
        department: MockDatabase,
        professor: MockDatabase,
        classes: MockDatabase,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                message: MockDatabase::new(DatabaseBackend::Postgres),
                user: MockDatabase::new(DatabaseBackend::Postgres),
                department: MockDatabase::new(DatabaseBackend::Postgres),
                professor: MockDatabase::new(DatabaseBackend::Postgres),
                classes: MockDatabase::new(DatabaseBackend::Postgres),
            }
        }

        fn into_service(self) -> MessageService {
            MessageService::new(
                MessageRepository::new(Arc::new(self.message.into_connection())),
                UserRepository::new(Arc::new(self.user.into_connection())),
                DepartmentRepository::new(Arc::new(self.department.into_connection())),
                ProfessorRepository::new(Arc::new(self.professor.into_connection())),
                ClassesRepository::new(Arc::new(self.classes.into_connection())),
            )
        }
    }

    fn create_input(department_id: Option<&str>, parent_id: Option<&str>) -> CreateMessageInput {
        CreateMessageInput {
            content: "Anyone taking CSC116?".to_string(),
            title: "CSC116".to_string(),
            sender_id: "jdoe".to_string(),
            department_id: department_id.map(ToString::to_string),
            professor_id: None,
            class_id: None,
            parent_id: parent_id.map(ToString::to_string),
        }
    }

    #[test]
    fn test_response_score() {
        let votes = vec![
            create_test_vote("m1", "a", VoteKind::Like),
            create_test_vote("m1", "b", VoteKind::Like),
            create_test_vote("m1", "c", VoteKind::Dislike),
            create_test_vote("m2", "d", VoteKind::Dislike),
        ];

        let response = MessageResponse::new(create_test_message("m1", None), &votes);

        assert_eq!(response.liked_by, vec!["a", "b"]);
        assert_eq!(response.disliked_by, vec!["c"]);
        assert_eq!(response.likes, 1);
    }

    #[tokio::test]
    async fn test_create_without_department_or_parent() {
        let mut mocks = Mocks::new();
        mocks.user = mocks
            .user
            .append_query_results([[create_test_user("u1", "jdoe")]]);

        let result = mocks.into_service().create(create_input(None, None)).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_unknown_sender() {
        let mut mocks = Mocks::new();
        mocks.user = mocks
            .user
            .append_query_results([Vec::<user::Model>::new()]);

        let result = mocks
            .into_service()
            .create(create_input(Some("d1"), None))
            .await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_post_in_department() {
        let mut mocks = Mocks::new();
        mocks.user = mocks
            .user
            .append_query_results([[create_test_user("u1", "jdoe")]]);
        mocks.department = mocks.department.append_query_results([[department::Model {
            id: "d1".to_string(),
            name: "Computer Science".to_string(),
            code: Some("CSC".to_string()),
            description: None,
            created_at: Utc::now().into(),
        }]]);
        mocks.message = mocks
            .message
            .append_query_results([[create_test_message("m1", None)]]);

        let response = mocks
            .into_service()
            .create(create_input(Some("d1"), None))
            .await
            .unwrap();

        assert_eq!(response.message_type, MessageType::General);
        assert_eq!(response.likes, 0);
        assert!(response.liked_by.is_empty());
    }

    #[tokio::test]
    async fn test_reply_inherits_parent_department() {
        let parent = message::Model {
            department_id: Some("d7".to_string()),
            ..create_test_message("m1", None)
        };
        let reply = message::Model {
            department_id: Some("d7".to_string()),
            ..create_test_message("m2", Some("m1"))
        };

        let mut mocks = Mocks::new();
        mocks.user = mocks
            .user
            .append_query_results([[create_test_user("u1", "jdoe")]]);
        mocks.message = mocks
            .message
            .append_query_results([[parent]])
            .append_query_results([[reply]]);

        // The department mock is empty, so any department lookup would fail.
        let response = mocks
            .into_service()
            .create(create_input(None, Some("m1")))
            .await
            .unwrap();

        assert_eq!(response.parent_id.as_deref(), Some("m1"));
        assert_eq!(response.department_id.as_deref(), Some("d7"));
    }

    #[tokio::test]
    async fn test_like_without_unity_id() {
        let mut mocks = Mocks::new();
        mocks.message = mocks
            .message
            .append_query_results([[create_test_message("m1", None)]]);

        let result = mocks.into_service().like("m1", Some("  ")).await;

        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Missing unityId in request"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_like_missing_message() {
        let mut mocks = Mocks::new();
        mocks.message = mocks
            .message
            .append_query_results([Vec::<message::Model>::new()]);

        let result = mocks.into_service().like("m404", Some("jdoe")).await;

        assert!(matches!(result, Err(AppError::MessageNotFound(_))));
    }

    #[tokio::test]
    async fn test_like_replaces_dislike() {
        let mut mocks = Mocks::new();
        mocks.message = mocks
            .message
            .append_query_results([[create_test_message("m1", None)]])
            .append_query_results([[create_test_vote("m1", "jdoe", VoteKind::Dislike)]])
            .append_query_results([[create_test_vote("m1", "jdoe", VoteKind::Like)]])
            .append_query_results([[
                create_test_vote("m1", "jdoe", VoteKind::Like),
                create_test_vote("m1", "asmith", VoteKind::Like),
            ]]);

        let response = mocks.into_service().like("m1", Some("jdoe")).await.unwrap();

        assert_eq!(response.liked_by, vec!["jdoe", "asmith"]);
        assert!(response.disliked_by.is_empty());
        assert_eq!(response.likes, 2);
    }

    #[tokio::test]
    async fn test_remove_dislike() {
        let mut mocks = Mocks::new();
        mocks.message = mocks
            .message
            .append_query_results([[create_test_message("m1", None)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([Vec::<message_vote::Model>::new()]);

        let response = mocks
            .into_service()
            .remove_dislike("m1", Some("jdoe"))
            .await
            .unwrap();

        assert_eq!(response.likes, 0);
        assert!(response.disliked_by.is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_class_clears_reference() {
        let existing = message::Model {
            class_id: Some("c1".to_string()),
            message_type: MessageType::Class,
            ..create_test_message("m1", None)
        };
        let saved = message::Model {
            title: "Edited".to_string(),
            class_id: None,
            message_type: MessageType::General,
            updated_at: Some(Utc::now().into()),
            ..create_test_message("m1", None)
        };

        let mut mocks = Mocks::new();
        mocks.message = mocks
            .message
            .append_query_results([[existing]])
            .append_query_results([[saved]])
            .append_query_results([Vec::<message_vote::Model>::new()]);
        mocks.classes = mocks
            .classes
            .append_query_results([Vec::<forum_db::entities::classes::Model>::new()]);

        let response = mocks
            .into_service()
            .update(
                "m1",
                UpdateMessageInput {
                    title: "Edited".to_string(),
                    body: "Body".to_string(),
                    professor_id: None,
                    class_id: Some("c404".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(response.message_type, MessageType::General);
        assert!(response.class_id.is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_message() {
        let mut mocks = Mocks::new();
        mocks.message = mocks
            .message
            .append_query_results([Vec::<message::Model>::new()]);

        let result = mocks.into_service().delete("m404").await;

        assert!(matches!(result, Err(AppError::MessageNotFound(_))));
    }

    #[tokio::test]
    async fn test_get_with_comments() {
        let mut mocks = Mocks::new();
        mocks.message = mocks
            .message
            .append_query_results([[create_test_message("m1", None)]])
            .append_query_results([[create_test_vote("m1", "jdoe", VoteKind::Dislike)]])
            .append_query_results([[
                create_test_message("m3", Some("m1")),
                create_test_message("m2", Some("m1")),
            ]])
            .append_query_results([[create_test_vote("m2", "jdoe", VoteKind::Like)]]);

        let detail = mocks.into_service().get("m1").await.unwrap();

        assert_eq!(detail.message.likes, -1);
        assert_eq!(detail.comments.len(), 2);
        assert_eq!(detail.comments[0].id, "m3");
        assert_eq!(detail.comments[1].likes, 1);
    }

    #[test]
    fn test_feed_query_type() {
        let query: FeedQuery =
            serde_json::from_value(serde_json::json!({ "classId": "c1", "type": "CLASS" }))
                .unwrap();
        let filter = MessageFilter::from(query);

        assert_eq!(filter.class_id.as_deref(), Some("c1"));
        assert_eq!(filter.message_type, Some(MessageType::Class));
        assert!(filter.professor_id.is_none());
    }

    #[test]
    fn test_update_input_aliases() {
        let input: UpdateMessageInput = serde_json::from_value(serde_json::json!({
            "title": "t",
            "body": "b",
            "prof": "p1",
            "clazz": "c1"
        }))
        .unwrap();

        assert_eq!(input.professor_id.as_deref(), Some("p1"));
        assert_eq!(input.class_id.as_deref(), Some("c1"));
    }
}
