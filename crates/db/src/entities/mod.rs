//! Database entities.

#![allow(missing_docs)]

pub mod class_professor;
pub mod classes;
pub mod department;
pub mod department_follower;
pub mod friend_request;
pub mod friendship;
pub mod group_chat;
pub mod group_chat_participant;
pub mod group_message;
pub mod message;
pub mod message_vote;
pub mod professor;
pub mod user;

pub use class_professor::Entity as ClassProfessor;
pub use classes::Entity as Classes;
pub use department::Entity as Department;
pub use department_follower::Entity as DepartmentFollower;
pub use friend_request::Entity as FriendRequest;
pub use friendship::Entity as Friendship;
pub use group_chat::Entity as GroupChat;
pub use group_chat_participant::Entity as GroupChatParticipant;
pub use group_message::Entity as GroupMessage;
pub use message::Entity as Message;
pub use message_vote::Entity as MessageVote;
pub use professor::Entity as Professor;
pub use user::Entity as User;
