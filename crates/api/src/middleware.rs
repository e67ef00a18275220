//! API middleware.

#![allow(missing_docs)]

use std::{sync::Arc, time::Instant};

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use forum_common::Config;
use forum_core::{
    ClassesService, DepartmentService, FriendshipService, GroupChatService, MessageService,
    ProfessorService, UserService,
};
use forum_db::repositories::{
    ClassesRepository, DepartmentRepository, FriendshipRepository, GroupChatRepository,
    MessageRepository, ProfessorRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<Config>,
    pub user_service: UserService,
    pub friendship_service: FriendshipService,
    pub department_service: DepartmentService,
    pub classes_service: ClassesService,
    pub professor_service: ProfessorService,
    pub message_service: MessageService,
    pub group_chat_service: GroupChatService,
}

impl AppState {
    /// Wire every repository and service over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: Config) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let department_repo = DepartmentRepository::new(Arc::clone(&db));
        let professor_repo = ProfessorRepository::new(Arc::clone(&db));
        let classes_repo = ClassesRepository::new(Arc::clone(&db));
        let message_repo = MessageRepository::new(Arc::clone(&db));
        let friendship_repo = FriendshipRepository::new(Arc::clone(&db));
        let group_chat_repo = GroupChatRepository::new(Arc::clone(&db));

        let message_service = MessageService::new(
            message_repo,
            user_repo.clone(),
            department_repo.clone(),
            professor_repo.clone(),
            classes_repo.clone(),
        );

        Self {
            user_service: UserService::new(user_repo.clone(), department_repo.clone()),
            friendship_service: FriendshipService::new(friendship_repo, user_repo.clone()),
            department_service: DepartmentService::new(
                department_repo.clone(),
                classes_repo.clone(),
                professor_repo.clone(),
                message_service.clone(),
            ),
            classes_service: ClassesService::new(
                classes_repo,
                department_repo.clone(),
                professor_repo.clone(),
            ),
            professor_service: ProfessorService::new(professor_repo, department_repo),
            message_service,
            group_chat_service: GroupChatService::new(group_chat_repo, user_repo),
            config: Arc::new(config),
            db,
        }
    }
}

/// Log one line per request with its status and latency.
pub async fn log_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();
    if status.is_server_error() {
        tracing::warn!(%method, %path, status = status.as_u16(), elapsed_ms, "Request failed");
    } else {
        tracing::debug!(%method, %path, status = status.as_u16(), elapsed_ms, "Request handled");
    }

    response
}
