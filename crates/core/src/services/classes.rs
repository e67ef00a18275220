//! Classes service.

use chrono::Utc;
use forum_common::{AppError, AppResult, IdGenerator};
use forum_db::{
    entities::{class_professor, classes},
    repositories::{ClassesRepository, DepartmentRepository, ProfessorRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::professor::ProfessorResponse;

/// How many classes the popular list returns when no limit is given.
pub const DEFAULT_POPULAR_LIMIT: u64 = 20;

/// Input for creating or renaming a class.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClassInput {
    #[validate(length(min = 1, max = 256))]
    pub course_title: String,
    #[serde(default = "default_true")]
    pub chat_enabled: bool,
}

const fn default_true() -> bool {
    true
}

/// Class response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassResponse {
    pub id: String,
    pub course_title: String,
    pub chat_enabled: bool,
    pub department_id: Option<String>,
}

impl From<classes::Model> for ClassResponse {
    fn from(class: classes::Model) -> Self {
        Self {
            id: class.id,
            course_title: class.course_title,
            chat_enabled: class.chat_enabled,
            department_id: class.department_id,
        }
    }
}

/// Class with the professors who teach it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDetail {
    #[serde(flatten)]
    pub class: ClassResponse,
    pub professors: Vec<ProfessorResponse>,
}

/// Classes service for business logic.
#[derive(Clone)]
pub struct ClassesService {
    classes_repo: ClassesRepository,
    department_repo: DepartmentRepository,
    professor_repo: ProfessorRepository,
    id_gen: IdGenerator,
}

impl ClassesService {
    /// Create a new classes service.
    #[must_use]
    pub const fn new(
        classes_repo: ClassesRepository,
        department_repo: DepartmentRepository,
        professor_repo: ProfessorRepository,
    ) -> Self {
        Self {
            classes_repo,
            department_repo,
            professor_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a class, attaching it to `department_id` when given.
    ///
    /// An unknown department is a bad request rather than a missing resource.
    pub async fn create(
        &self,
        input: ClassInput,
        department_id: Option<&str>,
    ) -> AppResult<classes::Model> {
        input.validate()?;

        if let Some(department_id) = department_id
            && self.department_repo.find_by_id(department_id).await?.is_none()
        {
            return Err(AppError::BadRequest(format!(
                "Unknown department: {department_id}"
            )));
        }

        let model = classes::ActiveModel {
            id: Set(self.id_gen.generate()),
            course_title: Set(input.course_title),
            chat_enabled: Set(input.chat_enabled),
            department_id: Set(department_id.map(ToString::to_string)),
            created_at: Set(Utc::now().into()),
        };

        let class = self.classes_repo.create(model).await?;
        tracing::info!(class_id = %class.id, title = %class.course_title, "Created class");
        Ok(class)
    }

    /// Get a class with its professors.
    pub async fn get(&self, id: &str) -> AppResult<ClassDetail> {
        let class = self.classes_repo.get_by_id(id).await?;
        let professor_ids = self.classes_repo.find_professor_ids(id).await?;
        let professors = self.professor_repo.find_by_ids(&professor_ids).await?;

        Ok(ClassDetail {
            class: class.into(),
            professors: professors.into_iter().map(Into::into).collect(),
        })
    }

    /// List every class.
    pub async fn list_all(&self) -> AppResult<Vec<classes::Model>> {
        self.classes_repo.find_all().await
    }

    /// Rename a class and set its chat flag.
    pub async fn update(&self, id: &str, input: ClassInput) -> AppResult<classes::Model> {
        input.validate()?;
        let class = self.classes_repo.get_by_id(id).await?;

        let mut active: classes::ActiveModel = class.into();
        active.course_title = Set(input.course_title);
        active.chat_enabled = Set(input.chat_enabled);
        self.classes_repo.update(active).await
    }

    /// Delete a class.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let class = self.classes_repo.get_by_id(id).await?;
        self.classes_repo.delete(class).await
    }

    /// Turn the class chat on or off.
    pub async fn set_chat_enabled(&self, id: &str, enabled: bool) -> AppResult<classes::Model> {
        let class = self.classes_repo.get_by_id(id).await?;
        let mut active: classes::ActiveModel = class.into();
        active.chat_enabled = Set(enabled);
        self.classes_repo.update(active).await
    }

    /// Classes whose title contains `query`, ignoring case.
    pub async fn search(&self, query: &str) -> AppResult<Vec<classes::Model>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }
        self.classes_repo.search(query).await
    }

    /// Classes of a department.
    pub async fn list_by_department(&self, department_id: &str) -> AppResult<Vec<classes::Model>> {
        self.department_repo.get_by_id(department_id).await?;
        self.classes_repo.find_by_department(department_id).await
    }

    /// The first `limit` classes.
    pub async fn popular(&self, limit: Option<u64>) -> AppResult<Vec<classes::Model>> {
        self.classes_repo
            .find_popular(limit.unwrap_or(DEFAULT_POPULAR_LIMIT))
            .await
    }

    /// Follow a class. Only checks that the class exists.
    pub async fn follow(&self, id: &str) -> AppResult<()> {
        self.classes_repo.get_by_id(id).await?;
        Ok(())
    }

    /// Assign a professor to a class. Assigning twice is a no-op.
    pub async fn assign_professor(&self, class_id: &str, professor_id: &str) -> AppResult<ClassDetail> {
        self.classes_repo.get_by_id(class_id).await?;
        self.professor_repo.get_by_id(professor_id).await?;

        if self
            .classes_repo
            .find_assignment(class_id, professor_id)
            .await?
            .is_none()
        {
            let model = class_professor::ActiveModel {
                id: Set(self.id_gen.generate()),
                class_id: Set(class_id.to_string()),
                professor_id: Set(professor_id.to_string()),
            };
            self.classes_repo.add_assignment(model).await?;
        }

        self.get(class_id).await
    }

    /// Remove a professor from a class.
    pub async fn unassign_professor(&self, class_id: &str, professor_id: &str) -> AppResult<()> {
        if !self
            .classes_repo
            .remove_assignment(class_id, professor_id)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "Professor {professor_id} is not assigned to class {class_id}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use forum_db::entities::{department, professor};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn create_test_class(id: &str, title: &str) -> classes::Model {
        classes::Model {
            id: id.to_string(),
            course_title: title.to_string(),
            chat_enabled: true,
            department_id: Some("d1".to_string()),
            created_at: Utc::now().into(),
        }
    }

    fn service(classes_db: MockDatabase, dept_db: MockDatabase, prof_db: MockDatabase) -> ClassesService {
        ClassesService::new(
            ClassesRepository::new(Arc::new(classes_db.into_connection())),
            DepartmentRepository::new(Arc::new(dept_db.into_connection())),
            ProfessorRepository::new(Arc::new(prof_db.into_connection())),
        )
    }

    #[tokio::test]
    async fn test_create_with_unknown_department_is_bad_request() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<department::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service
            .create(
                ClassInput {
                    course_title: "CSC116".to_string(),
                    chat_enabled: true,
                },
                Some("d404"),
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_search_blank_query_returns_nothing() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        assert!(service.search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_unknown_department() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<department::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        assert!(matches!(
            service.list_by_department("d404").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_set_chat_enabled() {
        let class = create_test_class("c1", "CSC116");
        let disabled = classes::Model {
            chat_enabled: false,
            ..class.clone()
        };

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[class]])
                .append_query_results([[disabled]]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let updated = service.set_chat_enabled("c1", false).await.unwrap();
        assert!(!updated.chat_enabled);
    }

    #[tokio::test]
    async fn test_get_includes_professors() {
        let professor = professor::Model {
            id: "p1".to_string(),
            name: "Grace Hopper".to_string(),
            email: None,
            department_id: Some("d1".to_string()),
            created_at: Utc::now().into(),
        };

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_class("c1", "CSC116")]])
                .append_query_results([vec![BTreeMap::from([(
                    "professor_id",
                    sea_orm::Value::from("p1".to_string()),
                )])]]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[professor]]),
        );

        let detail = service.get("c1").await.unwrap();
        assert_eq!(detail.class.course_title, "CSC116");
        assert_eq!(detail.professors.len(), 1);
        assert_eq!(detail.professors[0].name, "Grace Hopper");
    }

    #[tokio::test]
    async fn test_follow_missing_class() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<classes::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        assert!(matches!(service.follow("c404").await, Err(AppError::NotFound(_))));
    }
}
