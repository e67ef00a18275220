//! Business logic services.

#![allow(missing_docs)]

pub mod classes;
pub mod department;
pub mod friendship;
pub mod group_chat;
pub mod message;
pub mod professor;
pub mod user;

pub use classes::{ClassDetail, ClassInput, ClassResponse, ClassesService, DEFAULT_POPULAR_LIMIT};
pub use department::{DepartmentDetail, DepartmentInput, DepartmentResponse, DepartmentService};
pub use friendship::{FriendDto, FriendStatus, FriendSummary, FriendshipService};
pub use group_chat::{
    CreateChatInput, GroupChatResponse, GroupChatService, GroupMessageResponse, SendMessageInput,
};
pub use message::{
    CreateMessageInput, FeedQuery, MessageDetail, MessageResponse, MessageService,
    UpdateMessageInput,
};
pub use professor::{ProfessorInput, ProfessorResponse, ProfessorService};
pub use user::{
    CreateUserInput, FollowedDepartment, ProfileDto, SsoIdentity, UpdateUserInput, UserResponse,
    UserService,
};
