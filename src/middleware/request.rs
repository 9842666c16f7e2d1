use axum::extract::FromRequest;
use uuid::Uuid;

use crate::error::ApiError;

/// `axum::Json` whose rejections render as the failure envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Parse a record id from a path segment. Malformed ids are reported as a
/// missing resource rather than a client error.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("Resource not found with id of {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_id_is_not_found() {
        let err = parse_id("5d713995b721c3bb38c1f5d0").unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn uuid_parses() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
