//! Department service.

use chrono::Utc;
use forum_common::{AppError, AppResult, IdGenerator};
use forum_db::{
    entities::department,
    repositories::{ClassesRepository, DepartmentRepository, MessageFilter, ProfessorRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    classes::ClassResponse,
    message::{MessageResponse, MessageService},
    professor::ProfessorResponse,
};

/// Input for creating or replacing a department.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 16))]
    pub code: Option<String>,
    #[validate(length(max = 2048))]
    pub description: Option<String>,
}

/// Department response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResponse {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
}

impl From<department::Model> for DepartmentResponse {
    fn from(department: department::Model) -> Self {
        Self {
            id: department.id,
            name: department.name,
            code: department.code,
            description: department.description,
        }
    }
}

/// Department with its classes, professors and posts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentDetail {
    #[serde(flatten)]
    pub department: DepartmentResponse,
    pub classes: Vec<ClassResponse>,
    pub professors: Vec<ProfessorResponse>,
    pub messages: Vec<MessageResponse>,
}

/// Department service for business logic.
#[derive(Clone)]
pub struct DepartmentService {
    department_repo: DepartmentRepository,
    classes_repo: ClassesRepository,
    professor_repo: ProfessorRepository,
    message_service: MessageService,
    id_gen: IdGenerator,
}

impl DepartmentService {
    /// Create a new department service.
    #[must_use]
    pub const fn new(
        department_repo: DepartmentRepository,
        classes_repo: ClassesRepository,
        professor_repo: ProfessorRepository,
        message_service: MessageService,
    ) -> Self {
        Self {
            department_repo,
            classes_repo,
            professor_repo,
            message_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// List every department.
    pub async fn list_all(&self) -> AppResult<Vec<department::Model>> {
        self.department_repo.find_all().await
    }

    /// Get a department with everything that hangs off it.
    pub async fn get_detail(&self, id: &str) -> AppResult<DepartmentDetail> {
        let department = self.department_repo.get_by_id(id).await?;
        let classes = self.classes_repo.find_by_department(id).await?;
        let professors = self.professor_repo.find_by_department(id).await?;
        let messages = self
            .message_service
            .list_by_department(id, MessageFilter::default())
            .await?;

        Ok(DepartmentDetail {
            department: department.into(),
            classes: classes.into_iter().map(Into::into).collect(),
            professors: professors.into_iter().map(Into::into).collect(),
            messages,
        })
    }

    /// Look a department up by its exact name.
    pub async fn get_by_name(&self, name: &str) -> AppResult<department::Model> {
        self.department_repo
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Department not found: {name}")))
    }

    /// Create a department. Names are unique.
    pub async fn create(&self, input: DepartmentInput) -> AppResult<department::Model> {
        input.validate()?;
        let id = self.id_gen.generate();
        self.insert(id, input).await
    }

    /// Replace a department's fields, creating it under `id` if it does not exist.
    pub async fn upsert(&self, id: &str, input: DepartmentInput) -> AppResult<department::Model> {
        input.validate()?;

        let Some(department) = self.department_repo.find_by_id(id).await? else {
            return self.insert(id.to_string(), input).await;
        };

        if department.name != input.name {
            self.ensure_name_free(&input.name).await?;
        }

        let mut active: department::ActiveModel = department.into();
        active.name = Set(input.name);
        active.code = Set(input.code);
        active.description = Set(input.description);
        self.department_repo.update(active).await
    }

    /// Delete a department. Its classes and posts go with it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let department = self.department_repo.get_by_id(id).await?;
        self.department_repo.delete(department).await?;
        tracing::info!(department_id = %id, "Deleted department");
        Ok(())
    }

    async fn insert(&self, id: String, input: DepartmentInput) -> AppResult<department::Model> {
        self.ensure_name_free(&input.name).await?;

        let model = department::ActiveModel {
            id: Set(id),
            name: Set(input.name),
            code: Set(input.code),
            description: Set(input.description),
            created_at: Set(Utc::now().into()),
        };

        let department = self.department_repo.create(model).await?;
        tracing::info!(department_id = %department.id, name = %department.name, "Created department");
        Ok(department)
    }

    async fn ensure_name_free(&self, name: &str) -> AppResult<()> {
        if self.department_repo.find_by_name(name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Department name already exists: {name}"
            )));
        }
        Ok(())
    }
}
