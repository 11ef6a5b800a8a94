//! Custom Axum extractors.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use pantryctl_core::validate::ValidationError;

use super::error::ApiError;

/// JSON body extractor whose rejection keeps the `{"error": ...}` response
/// shape instead of axum's default plain-text rejection.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::Validation(ValidationError::MalformedBody {
                reason: rejection.body_text(),
            })),
        }
    }
}
