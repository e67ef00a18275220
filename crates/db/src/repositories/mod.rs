//! Repository layer for database operations.

#![allow(missing_docs)]

pub mod classes;
pub mod department;
pub mod friendship;
pub mod group_chat;
pub mod message;
pub mod professor;
pub mod user;

pub use classes::ClassesRepository;
pub use department::DepartmentRepository;
pub use friendship::FriendshipRepository;
pub use group_chat::GroupChatRepository;
pub use message::{MessageFilter, MessageRepository};
pub use professor::ProfessorRepository;
pub use user::UserRepository;
