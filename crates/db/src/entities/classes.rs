//! Class (course) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "classes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Course title, e.g. `CSC116`
    pub course_title: String,

    #[sea_orm(default_value = true)]
    pub chat_enabled: bool,

    #[sea_orm(nullable)]
    pub department_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id",
        on_delete = "Cascade"
    )]
    Department,
    #[sea_orm(has_many = "super::class_professor::Entity")]
    ProfessorAssignments,
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::class_professor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProfessorAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
