//! User service.

use chrono::Utc;
use forum_common::{AppError, AppResult, IdGenerator};
use forum_db::{
    entities::{department, department_follower, user},
    repositories::{DepartmentRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Placeholder identity used when the SSO layer sends no unity id.
pub const ANONYMOUS_UNITY_ID: &str = "Nothin";
const DEFAULT_DISPLAY_NAME: &str = "Unknown User";
const DEFAULT_EMAIL: &str = "no-email@example.com";
const DEFAULT_DEPARTMENT: &str = "Unknown Department";

/// Welcome text for the student-only discussion area.
pub const STUDENT_AREA_WELCOME: &str = "Welcome to student discussion!";

/// Input for creating a user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 64))]
    pub unity_id: String,
    #[validate(length(min = 1, max = 256))]
    pub display_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 2048))]
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_student: bool,
    pub department: Option<String>,
}

const fn default_true() -> bool {
    true
}

/// Input for editing a user's profile. Every field replaces the stored value.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 256))]
    pub display_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 2048))]
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
}

/// Identity attributes forwarded by the SSO layer. Any of them may be absent.
#[derive(Debug, Clone, Default)]
pub struct SsoIdentity {
    pub unity_id: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub unity_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub is_student: bool,
    pub department: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            unity_id: user.unity_id,
            display_name: user.display_name,
            email: user.email,
            bio: user.bio,
            profile_picture_url: user.profile_picture_url,
            is_student: user.is_student,
            department: user.department,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Profile summary returned to the signed-in user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub id: String,
    pub unity_id: String,
    pub display_name: String,
    pub department: Option<String>,
    pub email: Option<String>,
    pub is_student: bool,
}

impl From<user::Model> for ProfileDto {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            unity_id: user.unity_id,
            display_name: user.display_name,
            department: user.department,
            email: user.email,
            is_student: user.is_student,
        }
    }
}

/// Department as seen from a follower's list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowedDepartment {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
}

impl From<department::Model> for FollowedDepartment {
    fn from(department: department::Model) -> Self {
        Self {
            id: department.id,
            name: department.name,
            code: department.code,
        }
    }
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    department_repo: DepartmentRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, department_repo: DepartmentRepository) -> Self {
        Self {
            user_repo,
            department_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a user. The unity id must not already be taken.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_unity_id(&input.unity_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Unity id already registered: {}",
                input.unity_id
            )));
        }

        let display_name = input
            .display_name
            .unwrap_or_else(|| input.unity_id.clone());

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            unity_id: Set(input.unity_id),
            display_name: Set(display_name),
            email: Set(input.email),
            bio: Set(input.bio),
            profile_picture_url: Set(present(input.profile_picture_url)),
            is_student: Set(input.is_student),
            department: Set(input.department),
            created_at: Set(Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, unity_id = %user.unity_id, "Created user");
        Ok(user)
    }

    /// List every user.
    pub async fn list_all(&self) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_all().await
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a user by unity id.
    pub async fn get_by_unity_id(&self, unity_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_unity_id(unity_id).await
    }

    /// Replace a user's editable profile fields.
    ///
    /// An empty picture URL clears the picture.
    pub async fn update(&self, id: &str, input: UpdateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(id).await?;
        let display_name = input
            .display_name
            .unwrap_or_else(|| user.display_name.clone());

        let mut active: user::ActiveModel = user.into();
        active.display_name = Set(display_name);
        active.email = Set(input.email);
        active.bio = Set(input.bio);
        active.profile_picture_url = Set(present(input.profile_picture_url));

        self.user_repo.update(active).await
    }

    /// Delete a user.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let user = self.user_repo.get_by_id(id).await?;
        self.user_repo.delete(user).await?;
        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }

    /// Look up the signed-in user from SSO attributes, creating a student
    /// profile on first sight.
    pub async fn provision_profile(&self, identity: SsoIdentity) -> AppResult<ProfileDto> {
        let unity_id = present(identity.unity_id)
            .unwrap_or_else(|| ANONYMOUS_UNITY_ID.to_string());

        if let Some(user) = self.user_repo.find_by_unity_id(&unity_id).await? {
            return Ok(user.into());
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            unity_id: Set(unity_id),
            display_name: Set(present(identity.display_name)
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string())),
            email: Set(Some(
                present(identity.email).unwrap_or_else(|| DEFAULT_EMAIL.to_string()),
            )),
            bio: Set(None),
            profile_picture_url: Set(None),
            is_student: Set(true),
            department: Set(Some(DEFAULT_DEPARTMENT.to_string())),
            created_at: Set(Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, unity_id = %user.unity_id, "Provisioned profile");
        Ok(user.into())
    }

    /// Find the user behind an SSO login, creating a faculty account if
    /// this is the first visit.
    pub async fn find_or_create_faculty(
        &self,
        unity_id: &str,
        display_name: Option<String>,
    ) -> AppResult<user::Model> {
        if let Some(user) = self.user_repo.find_by_unity_id(unity_id).await? {
            return Ok(user);
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            unity_id: Set(unity_id.to_string()),
            display_name: Set(present(display_name).unwrap_or_else(|| unity_id.to_string())),
            email: Set(None),
            bio: Set(None),
            profile_picture_url: Set(None),
            is_student: Set(false),
            department: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, unity_id = %user.unity_id, "Registered SSO user");
        Ok(user)
    }

    /// Gate for the student-only discussion area.
    pub async fn student_area(&self, unity_id: &str) -> AppResult<&'static str> {
        let user = self.user_repo.get_by_unity_id(unity_id).await?;
        if !user.is_student {
            return Err(AppError::Forbidden(
                "Access denied: Faculty cannot access student-only area.".to_string(),
            ));
        }
        Ok(STUDENT_AREA_WELCOME)
    }

    // ==================== Department follows ====================

    /// Follow a department. Following twice is a no-op.
    pub async fn follow_department(&self, user_id: &str, department_id: &str) -> AppResult<()> {
        self.user_repo.get_by_id(user_id).await?;
        self.department_repo.get_by_id(department_id).await?;

        if self
            .department_repo
            .find_follow(department_id, user_id)
            .await?
            .is_some()
        {
            return Ok(());
        }

        let model = department_follower::ActiveModel {
            id: Set(self.id_gen.generate()),
            department_id: Set(department_id.to_string()),
            user_id: Set(user_id.to_string()),
            created_at: Set(Utc::now().into()),
        };
        self.department_repo.add_follower(model).await?;
        Ok(())
    }

    /// Stop following a department.
    pub async fn unfollow_department(&self, user_id: &str, department_id: &str) -> AppResult<()> {
        self.user_repo.get_by_id(user_id).await?;
        if !self
            .department_repo
            .remove_follower(department_id, user_id)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "User {user_id} does not follow department {department_id}"
            )));
        }
        Ok(())
    }

    /// Departments a user follows, ordered by name.
    pub async fn followed_departments(&self, user_id: &str) -> AppResult<Vec<department::Model>> {
        self.user_repo.get_by_id(user_id).await?;
        let ids = self.department_repo.find_followed_ids(user_id).await?;
        self.department_repo.find_by_ids(&ids).await
    }
}

/// Treat empty strings from forms and headers as missing.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
