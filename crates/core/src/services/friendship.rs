//! Friendship service.

use chrono::Utc;
use forum_common::{AppError, AppResult, IdGenerator};
use forum_db::{
    entities::{friend_request, user},
    repositories::{FriendshipRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// Relationship between two users as seen from the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FriendStatus {
    /// A request from the first user is waiting.
    Pending,
    /// They are friends.
    Friends,
    /// Neither.
    None,
}

impl FriendStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Friends => "FRIENDS",
            Self::None => "NONE",
        }
    }
}

/// Compact user reference used in friend lists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendSummary {
    pub id: String,
    pub unity_id: String,
    pub display_name: String,
    pub profile_picture_url: Option<String>,
}

impl From<user::Model> for FriendSummary {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            unity_id: user.unity_id,
            display_name: user.display_name,
            profile_picture_url: user.profile_picture_url,
        }
    }
}

/// A user's friends and pending requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendDto {
    pub id: String,
    pub friends: Vec<FriendSummary>,
    pub requests_sent: Vec<FriendSummary>,
    pub requests_received: Vec<FriendSummary>,
}

/// Friendship service for business logic.
#[derive(Clone)]
pub struct FriendshipService {
    friendship_repo: FriendshipRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FriendshipService {
    /// Create a new friendship service.
    #[must_use]
    pub const fn new(friendship_repo: FriendshipRepository, user_repo: UserRepository) -> Self {
        Self {
            friendship_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Ask `friend_id` to become friends with `user_id`.
    ///
    /// Repeating a pending request is accepted without writing a second row.
    pub async fn send_request(&self, user_id: &str, friend_id: &str) -> AppResult<&'static str> {
        if user_id == friend_id {
            return Err(AppError::BadRequest(
                "You cannot befriend yourself.".to_string(),
            ));
        }

        self.require_both(user_id, friend_id).await?;

        if self.friendship_repo.are_friends(user_id, friend_id).await? {
            return Err(AppError::BadRequest("You are already friends.".to_string()));
        }

        if self
            .friendship_repo
            .find_request(user_id, friend_id)
            .await?
            .is_none()
        {
            let model = friend_request::ActiveModel {
                id: Set(self.id_gen.generate()),
                sender_id: Set(user_id.to_string()),
                receiver_id: Set(friend_id.to_string()),
                created_at: Set(Utc::now().into()),
            };
            self.friendship_repo.create_request(model).await?;
            tracing::debug!(sender_id = %user_id, receiver_id = %friend_id, "Friend request sent");
        }

        Ok("Friend request sent.")
    }

    /// Where `user_id` stands with `friend_id`.
    pub async fn status(&self, user_id: &str, friend_id: &str) -> AppResult<FriendStatus> {
        self.require_both(user_id, friend_id).await?;

        if self
            .friendship_repo
            .find_request(user_id, friend_id)
            .await?
            .is_some()
        {
            return Ok(FriendStatus::Pending);
        }
        if self.friendship_repo.are_friends(user_id, friend_id).await? {
            return Ok(FriendStatus::Friends);
        }
        Ok(FriendStatus::None)
    }

    /// Accept the pending request `requester_id` sent to `user_id`.
    pub async fn accept_request(&self, user_id: &str, requester_id: &str) -> AppResult<&'static str> {
        self.require_both(user_id, requester_id).await?;

        let request = self
            .friendship_repo
            .find_request(requester_id, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No pending friend request from {requester_id} to {user_id}"
                ))
            })?;

        self.friendship_repo
            .accept_request(request, (self.id_gen.generate(), self.id_gen.generate()))
            .await?;

        tracing::info!(user_id = %user_id, friend_id = %requester_id, "Friend request accepted");
        Ok("Friend request accepted.")
    }

    /// A user's friends together with sent and received requests.
    pub async fn list_friends(&self, user_id: &str) -> AppResult<FriendDto> {
        self.user_repo.get_by_id(user_id).await?;

        let friend_ids = self.friendship_repo.find_friend_ids(user_id).await?;
        let friends = self.summaries(&friend_ids).await?;
        let (requests_sent, requests_received) = self.requests(user_id).await?;

        Ok(FriendDto {
            id: user_id.to_string(),
            friends,
            requests_sent,
            requests_received,
        })
    }

    /// Pending requests only (friends list left empty).
    pub async fn list_requests(&self, user_id: &str) -> AppResult<FriendDto> {
        self.user_repo.get_by_id(user_id).await?;
        let (requests_sent, requests_received) = self.requests(user_id).await?;

        Ok(FriendDto {
            id: user_id.to_string(),
            friends: vec![],
            requests_sent,
            requests_received,
        })
    }

    /// End a friendship in both directions.
    pub async fn remove_friend(&self, user_id: &str, friend_id: &str) -> AppResult<&'static str> {
        self.require_both(user_id, friend_id).await?;
        self.friendship_repo.delete_pair(user_id, friend_id).await?;
        tracing::info!(user_id = %user_id, friend_id = %friend_id, "Friend removed");
        Ok("Friend removed")
    }

    async fn require_both(&self, a: &str, b: &str) -> AppResult<()> {
        let first = self.user_repo.find_by_id(a).await?;
        let second = self.user_repo.find_by_id(b).await?;
        if first.is_none() || second.is_none() {
            return Err(AppError::UserNotFound(
                "One or both users not found".to_string(),
            ));
        }
        Ok(())
    }

    async fn requests(
        &self,
        user_id: &str,
    ) -> AppResult<(Vec<FriendSummary>, Vec<FriendSummary>)> {
        let sent: Vec<String> = self
            .friendship_repo
            .find_sent_requests(user_id)
            .await?
            .into_iter()
            .map(|r| r.receiver_id)
            .collect();
        let received: Vec<String> = self
            .friendship_repo
            .find_received_requests(user_id)
            .await?
            .into_iter()
            .map(|r| r.sender_id)
            .collect();

        Ok((self.summaries(&sent).await?, self.summaries(&received).await?))
    }

    /// Resolve user IDs to summaries, keeping the input order.
    async fn summaries(&self, ids: &[String]) -> AppResult<Vec<FriendSummary>> {
        let mut users = self.user_repo.find_by_ids(ids).await?;
        users.sort_by_key(|u| ids.iter().position(|id| id == &u.id));
        Ok(users.into_iter().map(FriendSummary::from).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use forum_db::entities::friendship;
    use maplit::hashset;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            unity_id: format!("{id}-unity"),
            display_name: id.to_uppercase(),
            email: None,
            bio: None,
            profile_picture_url: None,
            is_student: true,
            department: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_request(sender: &str, receiver: &str) -> friend_request::Model {
        friend_request::Model {
            id: format!("{sender}-{receiver}"),
            sender_id: sender.to_string(),
            receiver_id: receiver.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_edge(user_id: &str, friend_id: &str) -> friendship::Model {
        friendship::Model {
            id: format!("{user_id}-{friend_id}"),
            user_id: user_id.to_string(),
            friend_id: friend_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service(friend_db: MockDatabase, user_db: MockDatabase) -> FriendshipService {
        FriendshipService::new(
            FriendshipRepository::new(Arc::new(friend_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
        )
    }

    fn both_users(a: &str, b: &str) -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user(a)]])
            .append_query_results([[create_test_user(b)]])
    }

    #[tokio::test]
    async fn test_befriend_yourself_is_rejected() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        match service.send_request("alice", "alice").await {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "You cannot befriend yourself."),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_send_request_unknown_user() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("alice")]])
                .append_query_results([Vec::<user::Model>::new()]),
        );

        assert!(matches!(
            service.send_request("alice", "ghost").await,
            Err(AppError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_send_request_already_friends() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_edge("alice", "bob")]]),
            both_users("alice", "bob"),
        );

        match service.send_request("alice", "bob").await {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "You are already friends."),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_repeated_request_does_not_insert() {
        // Not friends, request already exists; no insert is scripted.
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<friendship::Model>::new()])
                .append_query_results([[create_test_request("alice", "bob")]]),
            both_users("alice", "bob"),
        );

        assert_eq!(
            service.send_request("alice", "bob").await.unwrap(),
            "Friend request sent."
        );
    }

    #[tokio::test]
    async fn test_status_prefers_pending() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_request("alice", "bob")]]),
            both_users("alice", "bob"),
        );

        assert_eq!(
            service.status("alice", "bob").await.unwrap(),
            FriendStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_status_none() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<friend_request::Model>::new()])
                .append_query_results([Vec::<friendship::Model>::new()]),
            both_users("alice", "bob"),
        );

        assert_eq!(
            service.status("alice", "bob").await.unwrap().as_str(),
            "NONE"
        );
    }

    #[tokio::test]
    async fn test_accept_without_request_is_not_found() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<friend_request::Model>::new()]),
            both_users("bob", "alice"),
        );

        assert!(matches!(
            service.accept_request("bob", "alice").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_accept_request_creates_friendship() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_request("alice", "bob")]])
                .append_query_results([Vec::<friendship::Model>::new()])
                .append_query_results([[create_test_edge("alice", "bob")]])
                .append_query_results([Vec::<friendship::Model>::new()])
                .append_query_results([[create_test_edge("bob", "alice")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
            both_users("bob", "alice"),
        );

        assert_eq!(
            service.accept_request("bob", "alice").await.unwrap(),
            "Friend request accepted."
        );
    }

    #[tokio::test]
    async fn test_list_friends_resolves_users() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    maplit::btreemap! { "friend_id" => sea_orm::Value::from("bob".to_string()) },
                    maplit::btreemap! { "friend_id" => sea_orm::Value::from("carol".to_string()) },
                ]])
                .append_query_results([Vec::<friend_request::Model>::new()])
                .append_query_results([[create_test_request("dave", "alice")]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("alice")]])
                .append_query_results([[create_test_user("carol"), create_test_user("bob")]])
                .append_query_results([[create_test_user("dave")]]),
        );

        let dto = service.list_friends("alice").await.unwrap();

        let friend_ids: Vec<_> = dto.friends.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(friend_ids, vec!["bob", "carol"]);
        assert!(dto.requests_sent.is_empty());

        let received: HashSet<_> = dto.requests_received.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(received, hashset! {"dave"});
    }
}
