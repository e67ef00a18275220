//! Department repository.

use std::sync::Arc;

use crate::entities::{Department, DepartmentFollower, department, department_follower};
use forum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Department repository for database operations.
#[derive(Clone)]
pub struct DepartmentRepository {
    db: Arc<DatabaseConnection>,
}

impl DepartmentRepository {
    /// Create a new department repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a department by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<department::Model>> {
        Department::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a department by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<department::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Department not found: {id}")))
    }

    /// Find a department by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<department::Model>> {
        Department::find()
            .filter(department::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find departments by IDs, ordered by name.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<department::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Department::find()
            .filter(department::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(department::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List every department, ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<department::Model>> {
        Department::find()
            .order_by_asc(department::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new department.
    pub async fn create(&self, model: department::ActiveModel) -> AppResult<department::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a department.
    pub async fn update(&self, model: department::ActiveModel) -> AppResult<department::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a department. Classes, messages and followers cascade;
    /// professors are detached.
    pub async fn delete(&self, department: department::Model) -> AppResult<()> {
        department
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ==================== Followers ====================

    /// Find a follow row for a (department, user) pair.
    pub async fn find_follow(
        &self,
        department_id: &str,
        user_id: &str,
    ) -> AppResult<Option<department_follower::Model>> {
        DepartmentFollower::find()
            .filter(department_follower::Column::DepartmentId.eq(department_id))
            .filter(department_follower::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record that a user follows a department.
    pub async fn add_follower(
        &self,
        model: department_follower::ActiveModel,
    ) -> AppResult<department_follower::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a user's follow of a department. Returns whether a row was removed.
    pub async fn remove_follower(&self, department_id: &str, user_id: &str) -> AppResult<bool> {
        let result = DepartmentFollower::delete_many()
            .filter(department_follower::Column::DepartmentId.eq(department_id))
            .filter(department_follower::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// IDs of departments a user follows.
    pub async fn find_followed_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        DepartmentFollower::find()
            .filter(department_follower::Column::UserId.eq(user_id))
            .select_only()
            .column(department_follower::Column::DepartmentId)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
