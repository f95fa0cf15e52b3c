// API errors — every failure a handler can return, rendered as JSON.
//
// Body shape: { "message": "..." }, plus an "errors" array of per-field
// details when a request body fails to parse or validate.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use validator::ValidationErrors;

use crate::db::StoreError;

/// One field-level validation problem.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl FieldError {
    /// Flatten validator output into a stable, field-sorted list.
    pub fn from_validation(errors: &ValidationErrors) -> Vec<Self> {
        let mut out: Vec<Self> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| FieldError {
                    field: field.clone(),
                    code: e.code.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {field}")),
                })
            })
            .collect();
        out.sort_by(|a, b| a.field.cmp(&b.field));
        out
    }

    /// The whole body could not be read as the expected JSON shape.
    pub fn body(detail: String) -> Self {
        FieldError {
            field: "body".to_string(),
            code: "parse".to_string(),
            message: detail,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    BadRequest(&'static str),
    Invalid {
        message: &'static str,
        errors: Vec<FieldError>,
    },
    Conflict(String),
    /// The store failed; the message is the route's generic failure text.
    Internal(&'static str),
}

impl ApiError {
    /// Map a store failure. Duplicate keys are the caller's fault (409);
    /// anything else is logged and hidden behind `context`.
    pub fn store(context: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { .. } => ApiError::Conflict(err.to_string()),
            other => {
                tracing::error!(error = %other, "{context}");
                ApiError::Internal(context)
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match &self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, *m, None),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, *m, None),
            ApiError::Invalid { message, errors } => {
                (StatusCode::BAD_REQUEST, *message, Some(errors.as_slice()))
            }
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m.as_str(), None),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, *m, None),
        };
        (status, Json(ErrorBody { message, errors })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Signup {
        #[validate(length(min = 1, message = "Title is required"))]
        title: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn validation_errors_are_sorted_by_field() {
        let signup = Signup {
            title: String::new(),
            email: "nope".to_string(),
        };
        let errors = FieldError::from_validation(&signup.validate().unwrap_err());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "email");
        assert_eq!(errors[0].code, "email");
        assert_eq!(errors[0].message, "Invalid email");
        assert_eq!(errors[1].field, "title");
        assert_eq!(errors[1].message, "Title is required");
    }

    #[test]
    fn duplicate_key_maps_to_conflict() {
        let err = StoreError::DuplicateKey {
            field: "username",
            value: "sarahchen".to_string(),
        };
        let resp = ApiError::store("Failed to create user", err).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn corrupt_row_maps_to_internal() {
        let resp = ApiError::store("Failed to fetch user", StoreError::Corrupt("x".into()))
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
