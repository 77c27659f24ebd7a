//! Infrastructure traits, used for DI on higher levels

use crate::infrastructure::entities::{
    Booking, BookingStatus, Category, EventType, Message, Review, Service, User,
};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: User) -> Result<User, sqlx::Error>;
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
}

/// Optional filters for the public service listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceFilter {
    pub featured: Option<bool>,
    pub category_id: Option<Uuid>,
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn categories(&self) -> Result<Vec<Category>, sqlx::Error>;
    async fn category_by_id(&self, id: Uuid) -> Result<Option<Category>, sqlx::Error>;
    async fn event_types(&self) -> Result<Vec<EventType>, sqlx::Error>;
    async fn event_type_by_id(&self, id: Uuid) -> Result<Option<EventType>, sqlx::Error>;

    async fn services(&self, filter: ServiceFilter) -> Result<Vec<Service>, sqlx::Error>;
    async fn service_by_id(&self, id: Uuid) -> Result<Option<Service>, sqlx::Error>;
    async fn services_by_owner(&self, user_id: Uuid) -> Result<Vec<Service>, sqlx::Error>;
    async fn create_service(&self, service: Service) -> Result<Service, sqlx::Error>;
    /// Applies the non-`None` fields of `update`; ownership is never touched.
    async fn update_service(
        &self,
        id: Uuid,
        update: ServiceUpdate,
    ) -> Result<Option<Service>, sqlx::Error>;
    async fn delete_service(&self, id: Uuid) -> Result<(), sqlx::Error>;

    async fn tags_for_service(&self, service_id: Uuid) -> Result<Vec<String>, sqlx::Error>;
    async fn event_type_ids_for_service(&self, service_id: Uuid)
    -> Result<Vec<Uuid>, sqlx::Error>;
    async fn add_service_tag(&self, service_id: Uuid, tag: &str) -> Result<(), sqlx::Error>;
    async fn add_service_event_type(
        &self,
        service_id: Uuid,
        event_type_id: Uuid,
    ) -> Result<(), sqlx::Error>;
}

/// Partial update of a service row; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ServiceUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub price_description: Option<String>,
    pub location: Option<String>,
    pub images: Option<Vec<String>>,
    pub packages: Option<Vec<crate::infrastructure::entities::ServicePackage>>,
    pub category_id: Option<Uuid>,
    pub featured: Option<bool>,
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn reviews_for_service(&self, service_id: Uuid) -> Result<Vec<Review>, sqlx::Error>;
    /// Inserts the review and recomputes the service's denormalized
    /// `rating`/`review_count` in the same transaction.
    async fn create_review(&self, review: Review) -> Result<Review, sqlx::Error>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(&self, booking: Booking) -> Result<Booking, sqlx::Error>;
    async fn booking_by_id(&self, id: Uuid) -> Result<Option<Booking>, sqlx::Error>;
    async fn bookings_for_customer(&self, user_id: Uuid) -> Result<Vec<Booking>, sqlx::Error>;
    /// All bookings against any service owned by `user_id`, via one joined query.
    async fn bookings_for_provider(&self, user_id: Uuid) -> Result<Vec<Booking>, sqlx::Error>;
    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Option<Booking>, sqlx::Error>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Every message where `user_id` is sender or recipient, oldest first.
    async fn messages_for_user(&self, user_id: Uuid) -> Result<Vec<Message>, sqlx::Error>;
    /// The bidirectional message set between two users, oldest first.
    async fn conversation_between(
        &self,
        user_id: Uuid,
        other_id: Uuid,
    ) -> Result<Vec<Message>, sqlx::Error>;
    /// Flips `read` on every unread message from `other_id` to `user_id`.
    async fn mark_conversation_read(
        &self,
        user_id: Uuid,
        other_id: Uuid,
    ) -> Result<(), sqlx::Error>;
    async fn create_message(&self, message: Message) -> Result<Message, sqlx::Error>;
}
