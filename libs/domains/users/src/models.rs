use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::UserResult;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap()
});

/// Reject names that are empty or whitespace only
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name_blank")
            .with_message(Cow::Borrowed("Name cannot be empty")));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::new("email_format")
            .with_message(Cow::Borrowed("Invalid email format")));
    }
    Ok(())
}

pub fn validate_age(age: i32) -> Result<(), ValidationError> {
    if age < 0 {
        return Err(ValidationError::new("age_negative")
            .with_message(Cow::Borrowed("Age cannot be negative")));
    }
    Ok(())
}

fn single_field(field: &'static str, error: ValidationError) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    errors
}

/// Opaque user identity, a random (v4) UUID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// User entity
///
/// Fields are private: a `User` only exists after passing through
/// [`User::create`] or one of the `update_*` operations, or after being
/// loaded back from a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    age: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Validate the inputs and build a user with a fresh identity.
    ///
    /// Every violated field is reported, not only the first one.
    pub fn create(
        name: impl Into<String>,
        email: impl Into<String>,
        age: Option<i32>,
    ) -> UserResult<Self> {
        let name = name.into();
        let email = email.into();

        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_name(&name) {
            errors.add("name", e);
        }
        if let Err(e) = validate_email(&email) {
            errors.add("email", e);
        }
        if let Some(Err(e)) = age.map(validate_age) {
            errors.add("age", e);
        }
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let now = Utc::now();
        Ok(Self {
            id: UserId::new(),
            name,
            email,
            age,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a user from persisted state
    pub(crate) fn from_parts(
        id: UserId,
        name: String,
        email: String,
        age: Option<i32>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            age,
            created_at,
            updated_at,
        }
    }

    pub fn update_name(self, name: impl Into<String>) -> UserResult<Self> {
        let name = name.into();
        validate_name(&name).map_err(|e| single_field("name", e))?;
        Ok(Self { name, ..self })
    }

    pub fn update_email(self, email: impl Into<String>) -> UserResult<Self> {
        let email = email.into();
        validate_email(&email).map_err(|e| single_field("email", e))?;
        Ok(Self { email, ..self })
    }

    pub fn update_age(self, age: Option<i32>) -> UserResult<Self> {
        if let Some(value) = age {
            validate_age(value).map_err(|e| single_field("age", e))?;
        }
        Ok(Self { age, ..self })
    }

    pub(crate) fn with_updated_at(self, updated_at: DateTime<Utc>) -> Self {
        Self { updated_at, ..self }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn age(&self) -> Option<i32> {
        self.age
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(custom(function = "validate_email"))]
    #[schema(example = "ada@example.com")]
    pub email: String,

    #[validate(custom(function = "validate_name"))]
    #[schema(example = "Ada Lovelace")]
    pub name: String,

    #[validate(range(min = 0, message = "Age cannot be negative"))]
    #[serde(default)]
    #[schema(example = 36)]
    pub age: Option<i32>,
}

/// DTO for partially updating a user; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_email"))]
    pub email: Option<String>,

    #[validate(range(min = 0, message = "Age cannot be negative"))]
    pub age: Option<i32>,
}

/// User as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into_uuid(),
            email: user.email,
            name: user.name,
            age: user.age,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UserError;

    fn field_codes(err: UserError) -> Vec<(String, String)> {
        let errors = match err {
            UserError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        };
        let mut codes: Vec<_> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter()
                    .map(move |e| (field.to_string(), e.code.to_string()))
            })
            .collect();
        codes.sort();
        codes
    }

    #[test]
    fn test_create_valid_user() {
        let user = User::create("Ada", "ada@example.com", Some(36)).unwrap();

        assert_eq!(user.name(), "Ada");
        assert_eq!(user.email(), "ada@example.com");
        assert_eq!(user.age(), Some(36));
        assert_eq!(user.created_at(), user.updated_at());
    }

    #[test]
    fn test_create_assigns_distinct_ids() {
        let a = User::create("A", "a@example.com", None).unwrap();
        let b = User::create("B", "b@example.com", None).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let err = User::create("   ", "a@example.com", None).unwrap_err();
        assert_eq!(
            field_codes(err),
            vec![("name".to_string(), "name_blank".to_string())]
        );
    }

    #[test]
    fn test_create_rejects_malformed_email() {
        for email in ["", "plain", "a@b", "a@b.c", "a b@example.com"] {
            let err = User::create("A", email, None).unwrap_err();
            assert_eq!(
                field_codes(err),
                vec![("email".to_string(), "email_format".to_string())],
                "email {email:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_create_rejects_negative_age() {
        let err = User::create("A", "a@example.com", Some(-1)).unwrap_err();
        assert_eq!(
            field_codes(err),
            vec![("age".to_string(), "age_negative".to_string())]
        );
    }

    #[test]
    fn test_create_accepts_zero_age() {
        assert!(User::create("A", "a@example.com", Some(0)).is_ok());
    }

    #[test]
    fn test_create_reports_every_violation() {
        let err = User::create("", "nope", Some(-5)).unwrap_err();
        assert_eq!(
            field_codes(err),
            vec![
                ("age".to_string(), "age_negative".to_string()),
                ("email".to_string(), "email_format".to_string()),
                ("name".to_string(), "name_blank".to_string()),
            ]
        );
    }

    #[test]
    fn test_updates_preserve_identity() {
        let user = User::create("A", "a@example.com", None).unwrap();
        let id = user.id();
        let created_at = user.created_at();

        let user = user
            .update_name("B")
            .and_then(|u| u.update_email("b@example.com"))
            .and_then(|u| u.update_age(Some(40)))
            .unwrap();

        assert_eq!(user.id(), id);
        assert_eq!(user.created_at(), created_at);
        assert_eq!(user.name(), "B");
        assert_eq!(user.email(), "b@example.com");
        assert_eq!(user.age(), Some(40));
    }

    #[test]
    fn test_update_rejects_invalid_values() {
        let user = User::create("A", "a@example.com", Some(1)).unwrap();

        assert!(user.clone().update_name("").is_err());
        assert!(user.clone().update_email("broken").is_err());
        assert!(user.clone().update_age(Some(-1)).is_err());
        assert_eq!(user.update_age(None).unwrap().age(), None);
    }

    #[test]
    fn test_user_id_parse() {
        let id = UserId::new();
        assert_eq!(id.to_string().parse::<UserId>().unwrap(), id);
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn test_create_dto_validation() {
        let dto = CreateUser {
            email: "bad".into(),
            name: " ".into(),
            age: Some(-3),
        };
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("age"));
    }

    #[test]
    fn test_update_dto_skips_absent_fields() {
        assert!(UpdateUser::default().validate().is_ok());

        let dto = UpdateUser {
            email: Some("nope".into()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_response_from_user() {
        let user = User::create("A", "a@example.com", Some(3)).unwrap();
        let id = user.id();
        let response = UserResponse::from(user);

        assert_eq!(response.id, id.into_uuid());
        assert_eq!(response.age, Some(3));
    }
}
