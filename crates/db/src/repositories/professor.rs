//! Professor repository.

use std::sync::Arc;

use crate::entities::{Professor, professor};
use forum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};

/// Professor repository for database operations.
#[derive(Clone)]
pub struct ProfessorRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfessorRepository {
    /// Create a new professor repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a professor by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<professor::Model>> {
        Professor::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a professor by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<professor::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Professor not found: {id}")))
    }

    /// Find professors by IDs, ordered by name.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<professor::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Professor::find()
            .filter(professor::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(professor::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List every professor, ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<professor::Model>> {
        Professor::find()
            .order_by_asc(professor::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Professors of a department, ordered by name.
    pub async fn find_by_department(&self, department_id: &str) -> AppResult<Vec<professor::Model>> {
        Professor::find()
            .filter(professor::Column::DepartmentId.eq(department_id))
            .order_by_asc(professor::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new professor.
    pub async fn create(&self, model: professor::ActiveModel) -> AppResult<professor::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a professor.
    pub async fn update(&self, model: professor::ActiveModel) -> AppResult<professor::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a professor.
    pub async fn delete(&self, professor: professor::Model) -> AppResult<()> {
        professor
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_professor(id: &str, name: &str) -> professor::Model {
        professor::Model {
            id: id.to_string(),
            name: name.to_string(),
            email: None,
            department_id: Some("d1".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_department() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_professor("p1", "Ada Lovelace"),
                    create_test_professor("p2", "Grace Hopper"),
                ]])
                .into_connection(),
        );

        let repo = ProfessorRepository::new(db);
        let result = repo.find_by_department("d1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<professor::Model>::new()])
                .into_connection(),
        );

        let repo = ProfessorRepository::new(db);
        assert!(matches!(
            repo.get_by_id("nope").await,
            Err(AppError::NotFound(_))
        ));
    }
}
