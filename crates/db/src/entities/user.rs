//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Campus identity handed over by the SSO layer
    #[sea_orm(unique)]
    pub unity_id: String,

    pub display_name: String,

    #[sea_orm(nullable)]
    pub email: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    /// NULL when the user has no picture (empty strings are never stored)
    #[sea_orm(nullable)]
    pub profile_picture_url: Option<String>,

    #[sea_orm(default_value = true)]
    pub is_student: bool,

    /// Free-text department label from the identity provider
    #[sea_orm(nullable)]
    pub department: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::message::Entity")]
    Messages,
    #[sea_orm(has_many = "super::department_follower::Entity")]
    FollowedDepartments,
    #[sea_orm(has_many = "super::group_chat_participant::Entity")]
    ChatMemberships,
}

impl Related<super::message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl Related<super::department_follower::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FollowedDepartments.def()
    }
}

impl Related<super::group_chat_participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChatMemberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
