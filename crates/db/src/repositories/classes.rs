//! Classes repository.

use std::sync::Arc;

use crate::entities::{ClassProfessor, Classes, class_professor, classes};
use forum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect,
    sea_query::{Expr, Func},
};

/// Classes repository for database operations.
#[derive(Clone)]
pub struct ClassesRepository {
    db: Arc<DatabaseConnection>,
}

impl ClassesRepository {
    /// Create a new classes repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a class by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<classes::Model>> {
        Classes::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a class by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<classes::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Class not found: {id}")))
    }

    /// List every class, ordered by course title.
    pub async fn find_all(&self) -> AppResult<Vec<classes::Model>> {
        Classes::find()
            .order_by_asc(classes::Column::CourseTitle)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Classes of a department, ordered by course title.
    pub async fn find_by_department(&self, department_id: &str) -> AppResult<Vec<classes::Model>> {
        Classes::find()
            .filter(classes::Column::DepartmentId.eq(department_id))
            .order_by_asc(classes::Column::CourseTitle)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Case-insensitive substring search on the course title.
    pub async fn search(&self, query: &str) -> AppResult<Vec<classes::Model>> {
        let pattern = format!(
            "%{}%",
            query
                .to_lowercase()
                .replace('%', "\\%")
                .replace('_', "\\_")
        );

        Classes::find()
            .filter(
                Expr::expr(Func::lower(Expr::col((
                    Classes,
                    classes::Column::CourseTitle,
                ))))
                .like(pattern),
            )
            .order_by_asc(classes::Column::CourseTitle)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The first `limit` classes in creation order.
    pub async fn find_popular(&self, limit: u64) -> AppResult<Vec<classes::Model>> {
        Classes::find()
            .order_by_asc(classes::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new class.
    pub async fn create(&self, model: classes::ActiveModel) -> AppResult<classes::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a class.
    pub async fn update(&self, model: classes::ActiveModel) -> AppResult<classes::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a class.
    pub async fn delete(&self, class: classes::Model) -> AppResult<()> {
        class
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ==================== Professor assignments ====================

    /// Find the assignment row linking a class and a professor.
    pub async fn find_assignment(
        &self,
        class_id: &str,
        professor_id: &str,
    ) -> AppResult<Option<class_professor::Model>> {
        ClassProfessor::find()
            .filter(class_professor::Column::ClassId.eq(class_id))
            .filter(class_professor::Column::ProfessorId.eq(professor_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Assign a professor to a class.
    pub async fn add_assignment(
        &self,
        model: class_professor::ActiveModel,
    ) -> AppResult<class_professor::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Unassign a professor from a class. Returns whether a row was removed.
    pub async fn remove_assignment(&self, class_id: &str, professor_id: &str) -> AppResult<bool> {
        let result = ClassProfessor::delete_many()
            .filter(class_professor::Column::ClassId.eq(class_id))
            .filter(class_professor::Column::ProfessorId.eq(professor_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// IDs of professors teaching a class.
    pub async fn find_professor_ids(&self, class_id: &str) -> AppResult<Vec<String>> {
        ClassProfessor::find()
            .filter(class_professor::Column::ClassId.eq(class_id))
            .select_only()
            .column(class_professor::Column::ProfessorId)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
