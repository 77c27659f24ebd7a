//! Authorization policy.
//!
//! Every role/ownership decision lives here as a pure function over the
//! session principal and the resource rows, so the handlers and services
//! never branch on roles themselves.

use crate::infrastructure::entities::{Booking, Service, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated party attached to a request by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: UserRole,
}

/// Only customers create bookings.
pub fn may_create_booking(principal: &Principal) -> bool {
    principal.role == UserRole::Customer
}

/// A booking's status may be changed by the customer who requested it or by
/// the business owning the referenced service, nobody else.
pub fn may_update_booking_status(
    principal: &Principal,
    booking: &Booking,
    service: &Service,
) -> bool {
    match principal.role {
        UserRole::Customer => booking.user_id == principal.id,
        UserRole::Business => service.user_id == principal.id,
    }
}

/// Only businesses create services.
pub fn may_create_service(principal: &Principal) -> bool {
    principal.role == UserRole::Business
}

/// Service mutation is restricted to the owning business.
pub fn may_modify_service(principal: &Principal, service: &Service) -> bool {
    service.user_id == principal.id
}

/// Only customers post reviews.
pub fn may_create_review(principal: &Principal) -> bool {
    principal.role == UserRole::Customer
}
