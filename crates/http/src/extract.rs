//! Request extractors that reject with [`AppError`].

use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A wrapper around [`axum::Json`] that rejects malformed bodies with
/// [`AppError::BadRequest`] instead of axum's plain-text rejection.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                tracing::warn!(rejection = %rejection.body_text(), "json body rejected");
                Err(AppError::bad_request(rejection.body_text()))
            }
        }
    }
}
