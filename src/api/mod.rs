use crate::core::error::ServiceError;
use crate::core::policy::Principal;
use async_trait::async_trait;
use axum::Json;
use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use log::error;
use tower_sessions::Session;

pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod messages;
pub mod services;

/// Session key holding the serialized [`Principal`].
pub const PRINCIPAL_KEY: &str = "principal";

/// The whole `/api` surface.
pub fn router() -> Router {
    Router::new()
        .merge(auth::router())
        .nest("/categories", catalog::categories_router())
        .nest("/event-types", catalog::event_types_router())
        .nest("/services", services::router())
        .nest("/business", services::business_router())
        .nest("/bookings", bookings::router())
        .nest("/messages", messages::router())
}

/// Extracts the authenticated principal from the request's session.
/// Rejects with 401 when no principal is attached.
#[derive(Debug)]
pub struct CurrentUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| ServiceError::Internal(anyhow::anyhow!(message)))?;

        let principal: Principal = session
            .get(PRINCIPAL_KEY)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;

        Ok(CurrentUser(principal))
    }
}

impl From<tower_sessions::session::Error> for ServiceError {
    fn from(err: tower_sessions::session::Error) -> Self {
        ServiceError::Internal(err.into())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Database(e) => {
                error!("database error: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::Internal(e) => {
                error!("internal error: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}
