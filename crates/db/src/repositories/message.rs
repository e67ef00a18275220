//! Message repository (forum posts, comments and votes).

use std::sync::Arc;

use crate::entities::{
    Message, MessageVote,
    message::{self, MessageType},
    message_vote::{self, VoteKind},
};
use chrono::Utc;
use forum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

/// Optional narrowing for department feeds.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub class_id: Option<String>,
    pub professor_id: Option<String>,
    pub message_type: Option<MessageType>,
}

/// Message repository for database operations.
#[derive(Clone)]
pub struct MessageRepository {
    db: Arc<DatabaseConnection>,
}

impl MessageRepository {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a message by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<message::Model>> {
        Message::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a message by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<message::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::MessageNotFound(id.to_string()))
    }

    /// Every message, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<message::Model>> {
        Message::find()
            .order_by_desc(message::Column::CreatedAt)
            .order_by_desc(message::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Messages in a department, newest first, optionally narrowed.
    pub async fn find_by_department(
        &self,
        department_id: &str,
        filter: &MessageFilter,
    ) -> AppResult<Vec<message::Model>> {
        let mut query = Message::find().filter(message::Column::DepartmentId.eq(department_id));

        if let Some(class_id) = &filter.class_id {
            query = query.filter(message::Column::ClassId.eq(class_id.as_str()));
        }
        if let Some(professor_id) = &filter.professor_id {
            query = query.filter(message::Column::ProfessorId.eq(professor_id.as_str()));
        }
        if let Some(message_type) = filter.message_type {
            query = query.filter(message::Column::MessageType.eq(message_type));
        }

        query
            .order_by_desc(message::Column::CreatedAt)
            .order_by_desc(message::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Direct replies to a message, newest first.
    pub async fn find_replies(&self, parent_id: &str) -> AppResult<Vec<message::Model>> {
        Message::find()
            .filter(message::Column::ParentId.eq(parent_id))
            .order_by_desc(message::Column::CreatedAt)
            .order_by_desc(message::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new message.
    pub async fn create(&self, model: message::ActiveModel) -> AppResult<message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a message.
    pub async fn update(&self, model: message::ActiveModel) -> AppResult<message::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a message together with every comment beneath it and their votes.
    ///
    /// Returns the number of messages removed.
    pub async fn delete_thread(&self, id: &str) -> AppResult<u64> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut thread = vec![id.to_string()];
        let mut frontier = vec![id.to_string()];
        while !frontier.is_empty() {
            let children: Vec<String> = Message::find()
                .filter(message::Column::ParentId.is_in(frontier))
                .select_only()
                .column(message::Column::Id)
                .into_tuple()
                .all(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            thread.extend(children.iter().cloned());
            frontier = children;
        }

        MessageVote::delete_many()
            .filter(message_vote::Column::MessageId.is_in(thread.clone()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = Message::delete_many()
            .filter(message::Column::Id.is_in(thread))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    // ==================== Votes ====================

    /// Votes on a single message.
    pub async fn find_votes(&self, message_id: &str) -> AppResult<Vec<message_vote::Model>> {
        MessageVote::find()
            .filter(message_vote::Column::MessageId.eq(message_id))
            .order_by_asc(message_vote::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Votes on several messages at once.
    pub async fn find_votes_for(&self, message_ids: &[String]) -> AppResult<Vec<message_vote::Model>> {
        if message_ids.is_empty() {
            return Ok(vec![]);
        }

        MessageVote::find()
            .filter(message_vote::Column::MessageId.is_in(message_ids.to_vec()))
            .order_by_asc(message_vote::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the vote an identity has cast on a message, if any.
    pub async fn find_vote(
        &self,
        message_id: &str,
        unity_id: &str,
    ) -> AppResult<Option<message_vote::Model>> {
        MessageVote::find()
            .filter(message_vote::Column::MessageId.eq(message_id))
            .filter(message_vote::Column::UnityId.eq(unity_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a vote, replacing an opposite vote by the same identity.
    ///
    /// Casting the same vote twice leaves the existing row untouched.
    pub async fn cast_vote(
        &self,
        vote_id: String,
        message_id: &str,
        unity_id: &str,
        kind: VoteKind,
    ) -> AppResult<()> {
        match self.find_vote(message_id, unity_id).await? {
            Some(existing) if existing.kind == kind => Ok(()),
            Some(existing) => {
                let mut active: message_vote::ActiveModel = existing.into();
                active.kind = Set(kind);
                active
                    .update(self.db.as_ref())
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            None => {
                let model = message_vote::ActiveModel {
                    id: Set(vote_id),
                    message_id: Set(message_id.to_string()),
                    unity_id: Set(unity_id.to_string()),
                    kind: Set(kind),
                    created_at: Set(Utc::now().into()),
                };
                model
                    .insert(self.db.as_ref())
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
        }
    }

    /// Withdraw a vote of the given kind. Returns whether a row was removed.
    pub async fn remove_vote(
        &self,
        message_id: &str,
        unity_id: &str,
        kind: VoteKind,
    ) -> AppResult<bool> {
        let result = MessageVote::delete_many()
            .filter(message_vote::Column::MessageId.eq(message_id))
            .filter(message_vote::Column::UnityId.eq(unity_id))
            .filter(message_vote::Column::Kind.eq(kind))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}
