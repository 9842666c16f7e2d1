pub mod bootcamp;
pub mod review;
pub mod user;

use std::collections::{BTreeMap, HashMap};

pub use bootcamp::{Bootcamp, BootcampInput, BootcampSummary, Career, Location, BOOTCAMP_FIELDS, DEFAULT_PHOTO};
pub use review::{Review, ReviewDetail, ReviewInput, REVIEW_FIELDS};
pub use user::{User, UserInput, USER_FIELDS};

/// Field-level validation failures collected before any write
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn summary(&self) -> String {
        self.errors.values().cloned().collect::<Vec<_>>().join(", ")
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.errors.into_iter().collect()
    }
}

/// Required text with an optional maximum length (in characters)
fn check_text(errors: &mut ValidationErrors, field: &str, value: &str, missing: &str, max: Option<(usize, &str)>) {
    if value.trim().is_empty() {
        errors.add(field, missing);
    } else if let Some((max, too_long)) = max {
        if value.chars().count() > max {
            errors.add(field, too_long);
        }
    }
}

pub(crate) fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !value.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

pub(crate) fn is_valid_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("john@gmail.com"));
        assert!(!is_valid_email("john@gmail"));
        assert!(!is_valid_email("john gmail.com"));
        assert!(!is_valid_email("@gmail.com"));
        assert!(!is_valid_email("a@b@c.com"));
    }

    #[test]
    fn url_requires_http_scheme() {
        assert!(is_valid_url("https://devworks.com"));
        assert!(is_valid_url("http://devcentral.com/path"));
        assert!(!is_valid_url("ftp://devworks.com"));
        assert!(!is_valid_url("devworks.com"));
    }

    #[test]
    fn summary_joins_messages_in_field_order() {
        let mut errors = ValidationErrors::default();
        errors.add("name", "Please add a name");
        errors.add("description", "Please add a description");
        errors.add("name", "ignored second message");
        assert_eq!(errors.summary(), "Please add a description, Please add a name");
        assert!(errors.into_result().is_err());
    }
}
