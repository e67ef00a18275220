//! Professor service.

use chrono::Utc;
use forum_common::{AppResult, IdGenerator};
use forum_db::{
    entities::professor,
    repositories::{DepartmentRepository, ProfessorRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for creating or replacing a professor.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfessorInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub department_id: Option<String>,
}

/// Professor response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessorResponse {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub department_id: Option<String>,
}

impl From<professor::Model> for ProfessorResponse {
    fn from(professor: professor::Model) -> Self {
        Self {
            id: professor.id,
            name: professor.name,
            email: professor.email,
            department_id: professor.department_id,
        }
    }
}

/// Professor service for business logic.
#[derive(Clone)]
pub struct ProfessorService {
    professor_repo: ProfessorRepository,
    department_repo: DepartmentRepository,
    id_gen: IdGenerator,
}

impl ProfessorService {
    /// Create a new professor service.
    #[must_use]
    pub const fn new(
        professor_repo: ProfessorRepository,
        department_repo: DepartmentRepository,
    ) -> Self {
        Self {
            professor_repo,
            department_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List every professor.
    pub async fn list_all(&self) -> AppResult<Vec<professor::Model>> {
        self.professor_repo.find_all().await
    }

    /// Get a professor by ID.
    pub async fn get(&self, id: &str) -> AppResult<professor::Model> {
        self.professor_repo.get_by_id(id).await
    }

    /// Create a professor, optionally in a department.
    pub async fn create(&self, input: ProfessorInput) -> AppResult<professor::Model> {
        input.validate()?;
        if let Some(department_id) = &input.department_id {
            self.department_repo.get_by_id(department_id).await?;
        }

        let model = professor::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            email: Set(input.email),
            department_id: Set(input.department_id),
            created_at: Set(Utc::now().into()),
        };
        self.professor_repo.create(model).await
    }

    /// Replace a professor's name, email and department.
    pub async fn update(&self, id: &str, input: ProfessorInput) -> AppResult<professor::Model> {
        input.validate()?;
        let professor = self.professor_repo.get_by_id(id).await?;
        if let Some(department_id) = &input.department_id {
            self.department_repo.get_by_id(department_id).await?;
        }

        let mut active: professor::ActiveModel = professor.into();
        active.name = Set(input.name);
        active.email = Set(input.email);
        active.department_id = Set(input.department_id);
        self.professor_repo.update(active).await
    }

    /// Delete a professor.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let professor = self.professor_repo.get_by_id(id).await?;
        self.professor_repo.delete(professor).await
    }
}
