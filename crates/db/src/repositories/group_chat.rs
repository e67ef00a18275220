//! Group chat repository.

use std::sync::Arc;

use crate::entities::{
    GroupChat, GroupChatParticipant, GroupMessage, group_chat, group_chat_participant,
    group_message,
};
use forum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
    sea_query::{Expr, NullOrdering, Order},
};

/// Group chat repository for database operations.
#[derive(Clone)]
pub struct GroupChatRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupChatRepository {
    /// Create a new group chat repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a chat by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<group_chat::Model>> {
        GroupChat::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a chat by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<group_chat::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group chat not found: {id}")))
    }

    /// Create a chat, its participants and its opening message atomically.
    ///
    /// The chat's last-message pointer is set to the opening message.
    pub async fn create_with_message(
        &self,
        chat: group_chat::ActiveModel,
        participants: Vec<group_chat_participant::ActiveModel>,
        first_message: group_message::ActiveModel,
    ) -> AppResult<(group_chat::Model, group_message::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let chat = chat
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for participant in participants {
            participant
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        let message = first_message
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        touch_last_message(&txn, &chat.id, &message).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let chat = group_chat::Model {
            last_message_id: Some(message.id.clone()),
            last_message_at: Some(message.created_at),
            ..chat
        };
        Ok((chat, message))
    }

    /// Append a message to a chat and advance its last-message pointer.
    pub async fn append_message(
        &self,
        message: group_message::ActiveModel,
    ) -> AppResult<group_message::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let message = message
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        touch_last_message(&txn, &message.group_chat_id, &message).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(message)
    }

    /// Chats a user participates in, most recently active first.
    pub async fn find_for_user(&self, user_id: &str) -> AppResult<Vec<group_chat::Model>> {
        GroupChat::find()
            .join(JoinType::InnerJoin, group_chat::Relation::Participants.def())
            .filter(group_chat_participant::Column::UserId.eq(user_id))
            .order_by_with_nulls(
                group_chat::Column::LastMessageAt,
                Order::Desc,
                NullOrdering::Last,
            )
            .order_by_desc(group_chat::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Participants ====================

    /// Find a user's membership in a chat.
    pub async fn find_participant(
        &self,
        group_chat_id: &str,
        user_id: &str,
    ) -> AppResult<Option<group_chat_participant::Model>> {
        GroupChatParticipant::find()
            .filter(group_chat_participant::Column::GroupChatId.eq(group_chat_id))
            .filter(group_chat_participant::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add a participant to a chat.
    pub async fn add_participant(
        &self,
        model: group_chat_participant::ActiveModel,
    ) -> AppResult<group_chat_participant::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// User IDs of every participant in a chat, in join order.
    pub async fn find_participant_ids(&self, group_chat_id: &str) -> AppResult<Vec<String>> {
        GroupChatParticipant::find()
            .filter(group_chat_participant::Column::GroupChatId.eq(group_chat_id))
            .order_by_asc(group_chat_participant::Column::JoinedAt)
            .select_only()
            .column(group_chat_participant::Column::UserId)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Messages ====================

    /// Messages in a chat, oldest first.
    pub async fn find_messages(&self, group_chat_id: &str) -> AppResult<Vec<group_message::Model>> {
        GroupMessage::find()
            .filter(group_message::Column::GroupChatId.eq(group_chat_id))
            .order_by_asc(group_message::Column::CreatedAt)
            .order_by_asc(group_message::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Messages by IDs.
    pub async fn find_messages_by_ids(
        &self,
        ids: &[String],
    ) -> AppResult<Vec<group_message::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        GroupMessage::find()
            .filter(group_message::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

async fn touch_last_message(
    txn: &DatabaseTransaction,
    group_chat_id: &str,
    message: &group_message::Model,
) -> AppResult<()> {
    GroupChat::update_many()
        .col_expr(
            group_chat::Column::LastMessageId,
            Expr::value(message.id.clone()),
        )
        .col_expr(
            group_chat::Column::LastMessageAt,
            Expr::value(message.created_at),
        )
        .filter(group_chat::Column::Id.eq(group_chat_id))
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_chat(id: &str) -> group_chat::Model {
        group_chat::Model {
            id: id.to_string(),
            group_title: "Study group".to_string(),
            last_message_id: None,
            last_message_at: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_message(id: &str, chat_id: &str) -> group_message::Model {
        group_message::Model {
            id: id.to_string(),
            group_chat_id: chat_id.to_string(),
            sender_id: "u1".to_string(),
            content: "hello".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_append_message_moves_last_message_pointer() {
        let message = create_test_message("gm1", "g1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[message.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = GroupChatRepository::new(db.clone());
        let model = group_message::ActiveModel {
            id: Set("gm1".to_string()),
            group_chat_id: Set("g1".to_string()),
            sender_id: Set("u1".to_string()),
            content: Set("hello".to_string()),
            created_at: Set(message.created_at),
        };
        let saved = repo.append_message(model).await.unwrap();
        assert_eq!(saved.id, "gm1");

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let update = log
            .iter()
            .flat_map(|txn| txn.statements())
            .find(|stmt| stmt.sql.starts_with("UPDATE"))
            .unwrap();

        assert!(update.sql.contains("\"last_message_id\""));
        assert!(update.sql.contains("\"last_message_at\""));
        let values = &update.values.as_ref().unwrap().0;
        assert!(values.contains(&sea_orm::Value::from("gm1".to_string())));
        assert!(values.contains(&sea_orm::Value::from(message.created_at)));
        assert!(values.contains(&sea_orm::Value::from("g1".to_string())));
    }

    #[tokio::test]
    async fn test_create_with_message_sets_pointer() {
        let chat = create_test_chat("g1");
        let message = create_test_message("gm1", "g1");
        let participant = group_chat_participant::Model {
            id: "p1".to_string(),
            group_chat_id: "g1".to_string(),
            user_id: "u1".to_string(),
            joined_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[chat.clone()]])
                .append_query_results([[participant.clone()]])
                .append_query_results([[message.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = GroupChatRepository::new(db);
        let (saved_chat, saved_message) = repo
            .create_with_message(
                group_chat::ActiveModel {
                    id: Set("g1".to_string()),
                    group_title: Set("Study group".to_string()),
                    last_message_id: Set(None),
                    last_message_at: Set(None),
                    created_at: Set(chat.created_at),
                },
                vec![group_chat_participant::ActiveModel {
                    id: Set("p1".to_string()),
                    group_chat_id: Set("g1".to_string()),
                    user_id: Set("u1".to_string()),
                    joined_at: Set(participant.joined_at),
                }],
                group_message::ActiveModel {
                    id: Set("gm1".to_string()),
                    group_chat_id: Set("g1".to_string()),
                    sender_id: Set("u1".to_string()),
                    content: Set("hello".to_string()),
                    created_at: Set(message.created_at),
                },
            )
            .await
            .unwrap();

        assert_eq!(saved_chat.last_message_id.as_deref(), Some("gm1"));
        assert_eq!(saved_chat.last_message_at, Some(saved_message.created_at));
    }
}
