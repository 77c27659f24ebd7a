//! Booking lifecycle endpoints

use crate::api::CurrentUser;
use crate::core::error::ServiceError;
use crate::core::traits::BookingService;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_bookings))
        .route("/:id/status", patch(update_status))
}

/// `POST /api/services/:id/book`; mounted by the services router.
pub async fn create_booking(
    Inject(bookings): Inject<dyn BookingService>,
    CurrentUser(principal): CurrentUser,
    Path(service_id): Path<Uuid>,
    Json(payload): Json<schemas::CreateBooking>,
) -> Result<(StatusCode, Json<schemas::Booking>), ServiceError> {
    let booking = bookings
        .create_booking(&principal, service_id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

async fn list_bookings(
    Inject(bookings): Inject<dyn BookingService>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<schemas::EnrichedBooking>>, ServiceError> {
    let views = bookings.bookings_for(&principal).await?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}

async fn update_status(
    Inject(bookings): Inject<dyn BookingService>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<schemas::UpdateBookingStatus>,
) -> Result<Json<schemas::Booking>, ServiceError> {
    let booking = bookings
        .update_status(&principal, id, &payload.status)
        .await?;
    Ok(Json(booking.into()))
}

pub mod schemas {
    use crate::api::auth::schemas::User;
    use crate::api::services::schemas::Service;
    use crate::core::traits::{BookingView, NewBooking};
    use crate::infrastructure::entities;
    use crate::infrastructure::entities::BookingStatus;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct CreateBooking {
        pub event_date: DateTime<Utc>,
        #[serde(default)]
        pub notes: Option<String>,
    }

    impl From<CreateBooking> for NewBooking {
        fn from(payload: CreateBooking) -> Self {
            NewBooking {
                event_date: payload.event_date,
                notes: payload.notes,
            }
        }
    }

    /// The target status arrives as a raw string so anything outside the
    /// four lifecycle values maps to a 400 rather than a deserialize error.
    #[derive(Deserialize, Debug)]
    pub struct UpdateBookingStatus {
        pub status: String,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Booking {
        pub id: Uuid,
        pub user_id: Uuid,
        pub service_id: Uuid,
        pub event_date: DateTime<Utc>,
        pub notes: Option<String>,
        pub status: BookingStatus,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Booking> for Booking {
        fn from(booking: entities::Booking) -> Self {
            Booking {
                id: booking.id,
                user_id: booking.user_id,
                service_id: booking.service_id,
                event_date: booking.event_date,
                notes: booking.notes,
                status: booking.status,
                created_at: booking.created_at,
            }
        }
    }

    /// A booking plus the service and customer snapshots the dashboards
    /// render; the customer is sanitized like every other user on the wire.
    #[derive(Serialize, Debug)]
    pub struct EnrichedBooking {
        #[serde(flatten)]
        pub booking: Booking,
        pub service: Service,
        pub customer: User,
    }

    impl From<BookingView> for EnrichedBooking {
        fn from(view: BookingView) -> Self {
            EnrichedBooking {
                booking: view.booking.into(),
                service: view.service.into(),
                customer: view.customer.into(),
            }
        }
    }
}
