use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sitetrack_core::errors::{ApplicationError, InterfaceError};
use tracing::{error, warn};
use uuid::Uuid;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Request correlation id: the caller's `x-correlation-id` header when it is
/// usable, otherwise a fresh UUID.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn fail(&self, error: impl Into<ApplicationError>) -> ApiError {
        ApiError(error.into().into_interface(self.0.clone()))
    }
}

impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let supplied = parts
            .headers
            .get(CORRELATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty() && value.len() <= 128)
            .map(str::to_owned);

        Ok(Self(supplied.unwrap_or_else(|| Uuid::new_v4().to_string())))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    pub correlation_id: String,
}

/// Transport wrapper that renders an [`InterfaceError`] as a JSON response.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            InterfaceError::Forbidden { .. } => StatusCode::FORBIDDEN,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let correlation_id = self.0.correlation_id().to_owned();

        if status.is_server_error() {
            error!(
                event_name = "system.request.failed",
                correlation_id = %correlation_id,
                status = status.as_u16(),
                error = %self.0,
                "request failed"
            );
        } else {
            warn!(
                event_name = "system.request.rejected",
                correlation_id = %correlation_id,
                status = status.as_u16(),
                error = %self.0,
                "request rejected"
            );
        }

        let body = ErrorBody { detail: self.0.user_message(), correlation_id };
        (status, Json(body)).into_response()
    }
}
