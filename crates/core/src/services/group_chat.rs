//! Group chat service (direct and group messaging).

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use forum_common::{AppError, AppResult, IdGenerator};
use forum_db::{
    entities::{group_chat, group_chat_participant, group_message},
    repositories::{GroupChatRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for starting a conversation.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatInput {
    #[serde(default)]
    pub participant_ids: Vec<String>,
    #[validate(length(max = 128))]
    #[serde(default)]
    pub group_title: String,
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
}

/// Input for sending a message into an existing chat.
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageInput {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
}

/// Group message response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessageResponse {
    pub id: String,
    pub group_chat_id: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<group_message::Model> for GroupMessageResponse {
    fn from(message: group_message::Model) -> Self {
        Self {
            id: message.id,
            group_chat_id: message.group_chat_id,
            sender_id: message.sender_id,
            content: message.content,
            created_at: message.created_at,
        }
    }
}

/// Group chat response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupChatResponse {
    pub id: String,
    pub group_title: String,
    pub participant_ids: Vec<String>,
    pub last_message: Option<GroupMessageResponse>,
    pub last_message_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
}

impl GroupChatResponse {
    fn new(
        chat: group_chat::Model,
        participant_ids: Vec<String>,
        last_message: Option<group_message::Model>,
    ) -> Self {
        Self {
            id: chat.id,
            group_title: chat.group_title,
            participant_ids,
            last_message: last_message.map(Into::into),
            last_message_at: chat.last_message_at,
            created_at: chat.created_at,
        }
    }
}

/// Group chat service for business logic.
#[derive(Clone)]
pub struct GroupChatService {
    chat_repo: GroupChatRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl GroupChatService {
    /// Create a new group chat service.
    #[must_use]
    pub const fn new(chat_repo: GroupChatRepository, user_repo: UserRepository) -> Self {
        Self {
            chat_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Start a conversation with an opening message.
    ///
    /// Unknown participant IDs are skipped. The creator is always a participant.
    pub async fn create_chat(
        &self,
        creator_id: &str,
        input: CreateChatInput,
    ) -> AppResult<GroupChatResponse> {
        input.validate()?;

        let Some(creator) = self.user_repo.find_by_id(creator_id).await? else {
            return Err(AppError::BadRequest("User not found".to_string()));
        };

        let mut participant_ids = vec![creator.id.clone()];
        for user in self.user_repo.find_by_ids(&input.participant_ids).await? {
            if !participant_ids.contains(&user.id) {
                participant_ids.push(user.id);
            }
        }

        let now = Utc::now();
        let chat_id = self.id_gen.generate();

        let chat = group_chat::ActiveModel {
            id: Set(chat_id.clone()),
            group_title: Set(input.group_title),
            last_message_id: Set(None),
            last_message_at: Set(None),
            created_at: Set(now.into()),
        };
        let participants = participant_ids
            .iter()
            .map(|user_id| group_chat_participant::ActiveModel {
                id: Set(self.id_gen.generate()),
                group_chat_id: Set(chat_id.clone()),
                user_id: Set(user_id.clone()),
                joined_at: Set(now.into()),
            })
            .collect();
        let first_message = group_message::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_chat_id: Set(chat_id.clone()),
            sender_id: Set(creator.id.clone()),
            content: Set(input.content),
            created_at: Set(now.into()),
        };

        let (chat, message) = self
            .chat_repo
            .create_with_message(chat, participants, first_message)
            .await?;

        tracing::info!(
            group_chat_id = %chat.id,
            creator_id = %creator.id,
            participants = participant_ids.len(),
            "Created group chat"
        );

        Ok(GroupChatResponse::new(chat, participant_ids, Some(message)))
    }

    /// Send a message into a chat.
    pub async fn send_message(
        &self,
        group_chat_id: &str,
        user_id: &str,
        input: SendMessageInput,
    ) -> AppResult<GroupMessageResponse> {
        input.validate()?;

        let sender = self.user_repo.get_by_id(user_id).await?;
        let chat = self.chat_repo.get_by_id(group_chat_id).await?;

        let model = group_message::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_chat_id: Set(chat.id),
            sender_id: Set(sender.id),
            content: Set(input.content),
            created_at: Set(Utc::now().into()),
        };

        let message = self.chat_repo.append_message(model).await?;
        tracing::debug!(group_chat_id = %group_chat_id, message_id = %message.id, "Sent group message");
        Ok(message.into())
    }

    /// Chats a user takes part in, most recently active first.
    pub async fn list_conversations(&self, user_id: &str) -> AppResult<Vec<GroupChatResponse>> {
        let chats = self.chat_repo.find_for_user(user_id).await?;

        let last_ids: Vec<String> = chats
            .iter()
            .filter_map(|c| c.last_message_id.clone())
            .collect();
        let mut last_messages: HashMap<String, group_message::Model> = self
            .chat_repo
            .find_messages_by_ids(&last_ids)
            .await?
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();

        let mut conversations = Vec::with_capacity(chats.len());
        for chat in chats {
            let participant_ids = self.chat_repo.find_participant_ids(&chat.id).await?;
            let last_message = chat
                .last_message_id
                .as_ref()
                .and_then(|id| last_messages.remove(id));
            conversations.push(GroupChatResponse::new(chat, participant_ids, last_message));
        }

        Ok(conversations)
    }

    /// Add a user to a chat. Adding an existing participant is a no-op.
    pub async fn add_participant(
        &self,
        user_id: &str,
        group_chat_id: &str,
    ) -> AppResult<GroupChatResponse> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let chat = self.chat_repo.get_by_id(group_chat_id).await?;

        if self
            .chat_repo
            .find_participant(&chat.id, &user.id)
            .await?
            .is_none()
        {
            let model = group_chat_participant::ActiveModel {
                id: Set(self.id_gen.generate()),
                group_chat_id: Set(chat.id.clone()),
                user_id: Set(user.id.clone()),
                joined_at: Set(Utc::now().into()),
            };
            self.chat_repo.add_participant(model).await?;
            tracing::info!(group_chat_id = %chat.id, user_id = %user.id, "Added participant");
        }

        let participant_ids = self.chat_repo.find_participant_ids(&chat.id).await?;
        Ok(GroupChatResponse::new(chat, participant_ids, None))
    }

    /// Messages in a chat, oldest first.
    pub async fn list_messages(&self, group_chat_id: &str) -> AppResult<Vec<GroupMessageResponse>> {
        self.chat_repo.get_by_id(group_chat_id).await?;
        let messages = self.chat_repo.find_messages(group_chat_id).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use forum_db::entities::user;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            unity_id: format!("unity-{id}"),
            display_name: "Test".to_string(),
            email: None,
            bio: None,
            profile_picture_url: None,
            is_student: true,
            department: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_chat(id: &str) -> group_chat::Model {
        group_chat::Model {
            id: id.to_string(),
            group_title: "Study group".to_string(),
            last_message_id: None,
            last_message_at: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_message(id: &str, chat_id: &str, sender_id: &str) -> group_message::Model {
        group_message::Model {
            id: id.to_string(),
            group_chat_id: chat_id.to_string(),
            sender_id: sender_id.to_string(),
            content: "hello".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_participant(chat_id: &str, user_id: &str) -> group_chat_participant::Model {
        group_chat_participant::Model {
            id: format!("gp-{user_id}"),
            group_chat_id: chat_id.to_string(),
            user_id: user_id.to_string(),
            joined_at: Utc::now().into(),
        }
    }

    fn service(chat_db: MockDatabase, user_db: MockDatabase) -> GroupChatService {
        GroupChatService::new(
            GroupChatRepository::new(Arc::new(chat_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
        )
    }

    fn user_id_row(id: &str) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("user_id", sea_orm::Value::from(id.to_string()))])
    }

    #[tokio::test]
    async fn test_create_chat_missing_creator() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let result = service
            .create_chat(
                "u404",
                CreateChatInput {
                    participant_ids: vec![],
                    group_title: String::new(),
                    content: "hi".to_string(),
                },
            )
            .await;

        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "User not found"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_create_chat_skips_unknown_and_includes_creator() {
        let chat = create_test_chat("g1");
        let message = create_test_message("gm1", "g1", "u1");

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[chat]])
                .append_query_results([[create_test_participant("g1", "u1")]])
                .append_query_results([[create_test_participant("g1", "u2")]])
                .append_query_results([[message]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1")]])
                // u404 does not resolve; u1 is listed again and must not be duplicated.
                .append_query_results([[create_test_user("u2"), create_test_user("u1")]]),
        );

        let response = service
            .create_chat(
                "u1",
                CreateChatInput {
                    participant_ids: vec!["u2".to_string(), "u404".to_string(), "u1".to_string()],
                    group_title: "Study group".to_string(),
                    content: "hello".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(response.participant_ids, vec!["u1", "u2"]);
        assert_eq!(response.last_message.as_ref().unwrap().id, "gm1");
        assert!(response.last_message_at.is_some());
    }

    #[tokio::test]
    async fn test_send_message_rejects_oversized_content() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service
            .send_message(
                "g1",
                "u1",
                SendMessageInput {
                    content: "x".repeat(1001),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_send_message_unknown_chat() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group_chat::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1")]]),
        );

        let result = service
            .send_message(
                "g404",
                "u1",
                SendMessageInput {
                    content: "hi".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_participant_is_idempotent() {
        // Existing membership found, so no insert is scripted.
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_chat("g1")]])
                .append_query_results([[create_test_participant("g1", "u2")]])
                .append_query_results([vec![user_id_row("u1"), user_id_row("u2")]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u2")]]),
        );

        let response = service.add_participant("u2", "g1").await.unwrap();

        assert_eq!(response.participant_ids, vec!["u1", "u2"]);
    }

    #[tokio::test]
    async fn test_list_conversations_attaches_last_message() {
        let message = create_test_message("gm1", "g1", "u1");
        let chat = group_chat::Model {
            last_message_id: Some("gm1".to_string()),
            last_message_at: Some(message.created_at),
            ..create_test_chat("g1")
        };

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[chat]])
                .append_query_results([[message]])
                .append_query_results([vec![user_id_row("u1"), user_id_row("u2")]]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let conversations = service.list_conversations("u1").await.unwrap();

        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].last_message.as_ref().unwrap().content, "hello");
        assert_eq!(conversations[0].participant_ids.len(), 2);
    }
}
