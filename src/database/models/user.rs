use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{check_text, is_valid_email, ValidationErrors};
use crate::filter::{FieldKind, FieldSpec};
use crate::types::Role;

pub const MIN_PASSWORD_LEN: usize = 6;

pub static USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "id", FieldKind::Uuid),
    FieldSpec::new("name", "name", FieldKind::Text),
    FieldSpec::new("email", "email", FieldKind::Text),
    FieldSpec::new("role", "role", FieldKind::Text),
    FieldSpec::new("createdAt", "created_at", FieldKind::Timestamp),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for create and partial update. The password is write-only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

impl UserInput {
    /// Password rules; on update an absent password keeps the current hash
    pub fn password_errors(&self, required: bool, errors: &mut ValidationErrors) {
        match self.password.as_deref() {
            None if required => errors.add("password", "Please add a password"),
            Some(pw) if pw.chars().count() < MIN_PASSWORD_LEN => {
                errors.add("password", format!("Password must be at least {} characters", MIN_PASSWORD_LEN))
            }
            _ => {}
        }
    }
}

impl User {
    /// Unvalidated user without credentials; the caller hashes the password
    pub fn new(input: &UserInput) -> Self {
        let mut user = Self {
            id: Uuid::new_v4(),
            name: String::new(),
            email: String::new(),
            role: Role::default(),
            password_hash: String::new(),
            created_at: Utc::now(),
        };
        user.merge(input);
        user
    }

    pub fn merge(&mut self, input: &UserInput) {
        if let Some(name) = &input.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = &input.email {
            self.email = email.trim().to_string();
        }
        if let Some(role) = input.role {
            self.role = role;
        }
    }

    pub fn validation_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        check_text(&mut errors, "name", &self.name, "Please add a name", None);
        if self.email.is_empty() {
            errors.add("email", "Please add an email");
        } else if !is_valid_email(&self.email) {
            errors.add("email", "Please add a valid email");
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_user_role() {
        let user = User::new(&UserInput {
            name: Some("John Doe".into()),
            email: Some("john@gmail.com".into()),
            ..Default::default()
        });
        assert_eq!(user.role, Role::User);
        assert!(user.validation_errors().is_empty());
    }

    #[test]
    fn password_rules() {
        let mut errors = ValidationErrors::default();
        UserInput::default().password_errors(true, &mut errors);
        assert_eq!(errors.get("password"), Some("Please add a password"));

        let mut errors = ValidationErrors::default();
        UserInput::default().password_errors(false, &mut errors);
        assert!(errors.is_empty());

        let mut errors = ValidationErrors::default();
        UserInput { password: Some("12345".into()), ..Default::default() }.password_errors(false, &mut errors);
        assert!(errors.get("password").is_some());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let mut user = User::new(&UserInput {
            name: Some("Jane".into()),
            email: Some("jane@gmail.com".into()),
            ..Default::default()
        });
        user.password_hash = "$argon2id$secret".into();
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert!(!value.to_string().contains("argon2"));
    }

    #[test]
    fn invalid_email_reported() {
        let user = User::new(&UserInput {
            name: Some("Jane".into()),
            email: Some("jane".into()),
            ..Default::default()
        });
        assert_eq!(user.validation_errors().get("email"), Some("Please add a valid email"));
    }
}
