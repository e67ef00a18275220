//! Friendship repository (friend edges and pending requests).

use std::sync::Arc;

use crate::entities::{FriendRequest, Friendship, friend_request, friendship};
use chrono::Utc;
use forum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// Friendship repository for database operations.
#[derive(Clone)]
pub struct FriendshipRepository {
    db: Arc<DatabaseConnection>,
}

impl FriendshipRepository {
    /// Create a new friendship repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check whether `user_id` has `friend_id` as a friend.
    pub async fn are_friends(&self, user_id: &str, friend_id: &str) -> AppResult<bool> {
        let edge = Friendship::find()
            .filter(friendship::Column::UserId.eq(user_id))
            .filter(friendship::Column::FriendId.eq(friend_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(edge.is_some())
    }

    /// IDs of a user's friends, in the order the friendships were made.
    pub async fn find_friend_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        Friendship::find()
            .filter(friendship::Column::UserId.eq(user_id))
            .order_by_asc(friendship::Column::CreatedAt)
            .select_only()
            .column(friendship::Column::FriendId)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove both directions of a friendship. Returns the number of rows removed.
    pub async fn delete_pair(&self, user_id: &str, friend_id: &str) -> AppResult<u64> {
        let result = Friendship::delete_many()
            .filter(pair_condition(user_id, friend_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    // ==================== Requests ====================

    /// Find a pending request from `sender_id` to `receiver_id`.
    pub async fn find_request(
        &self,
        sender_id: &str,
        receiver_id: &str,
    ) -> AppResult<Option<friend_request::Model>> {
        FriendRequest::find()
            .filter(friend_request::Column::SenderId.eq(sender_id))
            .filter(friend_request::Column::ReceiverId.eq(receiver_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a pending request.
    pub async fn create_request(
        &self,
        model: friend_request::ActiveModel,
    ) -> AppResult<friend_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Requests a user has sent, oldest first.
    pub async fn find_sent_requests(&self, user_id: &str) -> AppResult<Vec<friend_request::Model>> {
        FriendRequest::find()
            .filter(friend_request::Column::SenderId.eq(user_id))
            .order_by_asc(friend_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Requests a user has received, oldest first.
    pub async fn find_received_requests(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<friend_request::Model>> {
        FriendRequest::find()
            .filter(friend_request::Column::ReceiverId.eq(user_id))
            .order_by_asc(friend_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Turn a pending request into a friendship.
    ///
    /// Both friend edges are written and every pending request between the
    /// pair, in either direction, is deleted in one transaction. `edge_ids`
    /// supplies the IDs for the two new rows.
    pub async fn accept_request(
        &self,
        request: friend_request::Model,
        edge_ids: (String, String),
    ) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        insert_edge_if_missing(&txn, edge_ids.0, &request.sender_id, &request.receiver_id).await?;
        insert_edge_if_missing(&txn, edge_ids.1, &request.receiver_id, &request.sender_id).await?;

        FriendRequest::delete_many()
            .filter(request_pair_condition(&request.sender_id, &request.receiver_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn pair_condition(a: &str, b: &str) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(friendship::Column::UserId.eq(a))
                .add(friendship::Column::FriendId.eq(b)),
        )
        .add(
            Condition::all()
                .add(friendship::Column::UserId.eq(b))
                .add(friendship::Column::FriendId.eq(a)),
        )
}

fn request_pair_condition(a: &str, b: &str) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(friend_request::Column::SenderId.eq(a))
                .add(friend_request::Column::ReceiverId.eq(b)),
        )
        .add(
            Condition::all()
                .add(friend_request::Column::SenderId.eq(b))
                .add(friend_request::Column::ReceiverId.eq(a)),
        )
}

async fn insert_edge_if_missing(
    txn: &DatabaseTransaction,
    id: String,
    user_id: &str,
    friend_id: &str,
) -> AppResult<()> {
    let existing = Friendship::find()
        .filter(friendship::Column::UserId.eq(user_id))
        .filter(friendship::Column::FriendId.eq(friend_id))
        .one(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    if existing.is_some() {
        return Ok(());
    }

    friendship::ActiveModel {
        id: Set(id),
        user_id: Set(user_id.to_string()),
        friend_id: Set(friend_id.to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(txn)
    .await
    .map_err(|e| AppError::Database(e.to_string()))?;
    Ok(())
}
