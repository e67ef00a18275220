//! Message entity (forum posts and their comments).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What a forum post is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    /// Department-wide discussion.
    #[sea_orm(string_value = "general")]
    General,
    /// About a professor, not tied to a class.
    #[sea_orm(string_value = "professor")]
    Professor,
    /// About a class (with or without a professor).
    #[sea_orm(string_value = "class")]
    Class,
}

impl MessageType {
    /// Derive the type from which targets a message references.
    ///
    /// A class always wins; a professor alone makes it a professor post.
    #[must_use]
    pub const fn classify(has_professor: bool, has_class: bool) -> Self {
        match (has_professor, has_class) {
            (_, true) => Self::Class,
            (true, false) => Self::Professor,
            (false, false) => Self::General,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub sender_id: String,

    #[sea_orm(nullable)]
    pub department_id: Option<String>,

    #[sea_orm(nullable)]
    pub professor_id: Option<String>,

    #[sea_orm(nullable)]
    pub class_id: Option<String>,

    /// Set on comments; top-level posts have no parent
    #[sea_orm(nullable)]
    pub parent_id: Option<String>,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    pub message_type: MessageType,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SenderId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Sender,
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id",
        on_delete = "Cascade"
    )]
    Department,
    #[sea_orm(
        belongs_to = "super::professor::Entity",
        from = "Column::ProfessorId",
        to = "super::professor::Column::Id",
        on_delete = "SetNull"
    )]
    Professor,
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id",
        on_delete = "SetNull"
    )]
    Class,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_delete = "Cascade"
    )]
    Parent,
    #[sea_orm(has_many = "super::message_vote::Entity")]
    Votes,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sender.def()
    }
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::professor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Professor.def()
    }
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::message_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(MessageType::classify(false, false), MessageType::General);
        assert_eq!(MessageType::classify(true, false), MessageType::Professor);
        assert_eq!(MessageType::classify(false, true), MessageType::Class);
        assert_eq!(MessageType::classify(true, true), MessageType::Class);
    }

    #[test]
    fn test_serializes_uppercase() {
        let json = serde_json::to_string(&MessageType::Professor).unwrap_or_default();
        assert_eq!(json, "\"PROFESSOR\"");
    }
}
