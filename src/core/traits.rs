//! DI "Interfaces"

use crate::core::error::ServiceError;
use crate::core::policy::Principal;
use crate::infrastructure::entities::{
    Booking, Category, EventType, Message, Review, Service, ServicePackage, User,
};
use crate::infrastructure::traits::{ServiceFilter, ServiceUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Registration input. `role` arrives as the raw wire string and is validated
/// by the account service.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub role: String,
    pub business_name: Option<String>,
    pub business_description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

#[async_trait]
pub trait AccountService: Send + Sync {
    /// Creates a user with a hashed password.
    ///
    /// Fails with `Validation` on an unknown role or a taken username/email.
    async fn register(&self, data: NewUser) -> Result<User, ServiceError>;

    /// Fails with `Unauthenticated` when the credentials don't match.
    async fn login(&self, username: &str, password: &str) -> Result<User, ServiceError>;

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub title: String,
    pub description: String,
    pub price: String,
    pub price_description: Option<String>,
    pub location: Option<String>,
    pub images: Vec<String>,
    pub packages: Vec<ServicePackage>,
    pub category_id: Uuid,
    pub featured: bool,
    pub event_type_ids: Vec<Uuid>,
    pub tags: Vec<String>,
}

/// A service plus the joins and owner snapshot the detail endpoint returns.
#[derive(Debug, Clone)]
pub struct ServiceDetailView {
    pub service: Service,
    pub tags: Vec<String>,
    pub event_type_ids: Vec<Uuid>,
    pub owner: User,
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError>;
    async fn category(&self, id: Uuid) -> Result<Category, ServiceError>;
    async fn list_event_types(&self) -> Result<Vec<EventType>, ServiceError>;
    async fn event_type(&self, id: Uuid) -> Result<EventType, ServiceError>;

    async fn list_services(&self, filter: ServiceFilter) -> Result<Vec<Service>, ServiceError>;
    async fn service_detail(&self, id: Uuid) -> Result<ServiceDetailView, ServiceError>;
    /// Business-only; stamps the caller as owner and writes the tag and
    /// event-type join rows.
    async fn create_service(
        &self,
        principal: &Principal,
        data: NewService,
    ) -> Result<Service, ServiceError>;
    /// Owner-only partial update; ownership itself is immutable.
    async fn update_service(
        &self,
        principal: &Principal,
        id: Uuid,
        update: ServiceUpdate,
    ) -> Result<Service, ServiceError>;
    /// Owner-only.
    async fn delete_service(&self, principal: &Principal, id: Uuid) -> Result<(), ServiceError>;
    /// All services owned by the calling business.
    async fn services_for_owner(&self, principal: &Principal)
    -> Result<Vec<Service>, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub rating: i64,
    pub comment: Option<String>,
}

/// A review joined with its (possibly deleted) author.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub review: Review,
    pub user: Option<User>,
}

#[async_trait]
pub trait ReviewService: Send + Sync {
    async fn reviews_for_service(&self, service_id: Uuid) -> Result<Vec<ReviewView>, ServiceError>;

    /// Customer-only. Recomputes the service's aggregate rating in the same
    /// transaction as the insert.
    async fn create_review(
        &self,
        principal: &Principal,
        service_id: Uuid,
        data: NewReview,
    ) -> Result<Review, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub event_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// A booking enriched with its service and the requesting customer.
#[derive(Debug, Clone)]
pub struct BookingView {
    pub booking: Booking,
    pub service: Service,
    pub customer: User,
}

#[async_trait]
pub trait BookingService: Send + Sync {
    /// Customer-only. Stamps the caller as the booking's customer and the
    /// initial status as `pending`; caller-supplied status or user ids are
    /// rejected by construction.
    ///
    /// Fails with `NotFound` when the service does not exist and `Forbidden`
    /// for business callers.
    async fn create_booking(
        &self,
        principal: &Principal,
        service_id: Uuid,
        data: NewBooking,
    ) -> Result<Booking, ServiceError>;

    /// Customer: own bookings. Business: bookings across all owned services.
    async fn bookings_for(&self, principal: &Principal)
    -> Result<Vec<BookingView>, ServiceError>;

    /// Transitions a booking's status.
    ///
    /// `Forbidden` unless the caller is the booking's customer or the owning
    /// business; `Validation` when `status` is not one of the four lifecycle
    /// values (the row is never touched in that case).
    async fn update_status(
        &self,
        principal: &Principal,
        booking_id: Uuid,
        status: &str,
    ) -> Result<Booking, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub content: String,
    pub booking_id: Option<Uuid>,
}

/// A derived conversation: the counterparty plus the tail of the thread.
/// Conversations are not stored rows.
#[derive(Debug, Clone)]
pub struct ConversationView {
    pub other_user: User,
    pub last_message: Message,
    pub unread_count: usize,
}

#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Partitions the caller's messages by counterparty. Counterparties that
    /// no longer resolve to a user are dropped silently. Read-only.
    async fn conversations(&self, user_id: Uuid) -> Result<Vec<ConversationView>, ServiceError>;

    /// The chronological thread with `other_id`. Viewing marks every unread
    /// message addressed to the caller as read before the thread is returned.
    ///
    /// Fails with `NotFound` when the counterparty does not exist.
    async fn conversation_with(
        &self,
        user_id: Uuid,
        other_id: Uuid,
    ) -> Result<Vec<Message>, ServiceError>;

    /// Fails with `NotFound` when the recipient does not exist and
    /// `Validation` on empty content.
    async fn send_message(
        &self,
        user_id: Uuid,
        to_user_id: Uuid,
        data: NewMessage,
    ) -> Result<Message, ServiceError>;
}
