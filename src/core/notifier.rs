//! Booking notification dispatcher.
//!
//! Booking mutations emit events onto a global channel; a background task
//! consumes them and persists a notification row for the interested party.
//! Delivery is best-effort and never affects the request that produced the
//! event.

use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::BookingStatus;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum BookingEventKind {
    Created,
    StatusChanged {
        from: BookingStatus,
        to: BookingStatus,
    },
}

#[derive(Debug, Clone)]
pub struct BookingEvent {
    pub kind: BookingEventKind,
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_title: String,
    pub event_date: DateTime<Utc>,
}

/// Fire-and-forget emit. A missing sender (tests, or the dispatcher not yet
/// started) is not an error.
pub fn emit(event: BookingEvent) {
    if let Some(sender) = crate::BOOKING_EVENTS.get() {
        if let Err(e) = sender.try_send(event) {
            warn!("dropping booking event: {e}");
        }
    }
}

pub async fn background_task(
    connection: DatabaseConnection,
    mut receiver: tokio::sync::mpsc::Receiver<BookingEvent>,
) {
    info!("notification dispatcher started");
    while let Some(event) = receiver.recv().await {
        if let Err(e) = deliver(&connection, event).await {
            error!("failed to deliver notification: {e}");
        }
    }
    info!("notification dispatcher stopped");
}

async fn deliver(
    connection: &DatabaseConnection,
    event: BookingEvent,
) -> Result<(), sqlx::Error> {
    let (recipient, kind, title, body) = match event.kind {
        BookingEventKind::Created => (
            event.provider_id,
            "booking_created",
            "New booking request".to_owned(),
            format!(
                "New booking request for {} on {}",
                event.service_title,
                event.event_date.date_naive()
            ),
        ),
        BookingEventKind::StatusChanged { from, to } => (
            event.customer_id,
            "booking_status",
            format!("Booking {to}"),
            format!(
                "Your booking for {} changed from {from} to {to}",
                event.service_title
            ),
        ),
    };

    sqlx::query(
        "INSERT INTO notifications (id, user_id, kind, title, body, booking_id, read, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(Uuid::new_v4())
    .bind(recipient)
    .bind(kind)
    .bind(&title)
    .bind(&body)
    .bind(event.booking_id)
    .bind(Utc::now())
    .execute(&**connection)
    .await?;

    info!("notified {recipient}: {title}");
    Ok(())
}
