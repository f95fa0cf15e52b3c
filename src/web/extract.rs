// Request extractors — JSON bodies that must also pass validator rules.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::db::models::{ArticlePatch, NewArticle, NewComment, NewUser, UserPatch};
use crate::web::error::{ApiError, FieldError};

/// Top-level message for a body that fails to parse or validate.
pub trait InvalidMessage {
    const INVALID_MESSAGE: &'static str;
}

impl InvalidMessage for NewArticle {
    const INVALID_MESSAGE: &'static str = "Invalid article data";
}

impl InvalidMessage for ArticlePatch {
    const INVALID_MESSAGE: &'static str = "Invalid article data";
}

impl InvalidMessage for NewComment {
    const INVALID_MESSAGE: &'static str = "Invalid comment data";
}

impl InvalidMessage for NewUser {
    const INVALID_MESSAGE: &'static str = "Invalid user data";
}

impl InvalidMessage for UserPatch {
    const INVALID_MESSAGE: &'static str = "Invalid user data";
}

/// `Json<T>` that rejects with 400 and per-field details instead of axum's
/// plain-text rejection.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + InvalidMessage,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Invalid {
                message: T::INVALID_MESSAGE,
                errors: vec![FieldError::body(rejection.body_text())],
            })?;

        value.validate().map_err(|errors| ApiError::Invalid {
            message: T::INVALID_MESSAGE,
            errors: FieldError::from_validation(&errors),
        })?;

        Ok(Self(value))
    }
}
