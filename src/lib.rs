//! Eventique marketplace web API - Library exports for testing

pub mod api;
pub mod core;
pub mod infrastructure;

use crate::core::notifier::BookingEvent;
use tokio::sync::OnceCell;
use tokio::sync::mpsc;

/// Channel feeding the notification dispatcher. Left unset in tests, in
/// which case booking events are silently dropped.
pub static BOOKING_EVENTS: OnceCell<mpsc::Sender<BookingEvent>> = OnceCell::const_new();
