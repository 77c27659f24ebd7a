//! Implementations for the services the app needs.
//!

use crate::core::error::ServiceError;
use crate::core::notifier::{self, BookingEvent, BookingEventKind};
use crate::core::password;
use crate::core::policy::{self, Principal};
use crate::core::traits::{
    AccountService, BookingService, BookingView, CatalogService, ConversationView,
    MessagingService, NewBooking, NewMessage, NewReview, NewService, NewUser, ReviewService,
    ReviewView, ServiceDetailView,
};
use crate::infrastructure::entities::{
    Booking, BookingStatus, Category, EventType, Message, Review, Service, User, UserRole,
};
use crate::infrastructure::traits::{
    BookingRepository, CatalogRepository, MessageRepository, ReviewRepository, ServiceFilter,
    ServiceUpdate, UserRepository,
};
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use log::warn;
use sqlx::types::Json;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

#[injectable(AccountService)]
pub struct DefaultAccountService {
    users: Ref<dyn UserRepository>,
}

#[async_trait]
impl AccountService for DefaultAccountService {
    async fn register(&self, data: NewUser) -> Result<User, ServiceError> {
        let role = UserRole::from_str(&data.role)
            .map_err(|_| ServiceError::Validation("Invalid user type".to_owned()))?;

        if self.users.user_by_username(&data.username).await?.is_some() {
            return Err(ServiceError::Validation(
                "Username already exists".to_owned(),
            ));
        }
        if self.users.user_by_email(&data.email).await?.is_some() {
            return Err(ServiceError::Validation("Email already exists".to_owned()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: password::hash_password(&data.password)?,
            first_name: data.first_name,
            last_name: data.last_name,
            phone: data.phone,
            profile_image: data.profile_image,
            role,
            business_name: data.business_name,
            business_description: data.business_description,
            address: data.address,
            city: data.city,
            state: data.state,
            zip: data.zip,
            created_at: Utc::now(),
        };

        Ok(self.users.create_user(user).await?)
    }

    async fn login(&self, username: &str, password: &str) -> Result<User, ServiceError> {
        let user = self
            .users
            .user_by_username(username)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;

        if !password::verify_password(password, &user.password_hash) {
            return Err(ServiceError::Unauthenticated);
        }

        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(self.users.user_by_id(id).await?)
    }
}

#[injectable(CatalogService)]
pub struct DefaultCatalogService {
    catalog: Ref<dyn CatalogRepository>,
    users: Ref<dyn UserRepository>,
}

#[async_trait]
impl CatalogService for DefaultCatalogService {
    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(self.catalog.categories().await?)
    }

    async fn category(&self, id: Uuid) -> Result<Category, ServiceError> {
        self.catalog
            .category_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Category"))
    }

    async fn list_event_types(&self) -> Result<Vec<EventType>, ServiceError> {
        Ok(self.catalog.event_types().await?)
    }

    async fn event_type(&self, id: Uuid) -> Result<EventType, ServiceError> {
        self.catalog
            .event_type_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Event type"))
    }

    async fn list_services(&self, filter: ServiceFilter) -> Result<Vec<Service>, ServiceError> {
        Ok(self.catalog.services(filter).await?)
    }

    async fn service_detail(&self, id: Uuid) -> Result<ServiceDetailView, ServiceError> {
        let service = self
            .catalog
            .service_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Service"))?;

        let tags = self.catalog.tags_for_service(service.id).await?;
        let event_type_ids = self.catalog.event_type_ids_for_service(service.id).await?;
        let owner = self
            .users
            .user_by_id(service.user_id)
            .await?
            .ok_or(ServiceError::NotFound("Service provider"))?;

        Ok(ServiceDetailView {
            service,
            tags,
            event_type_ids,
            owner,
        })
    }

    async fn create_service(
        &self,
        principal: &Principal,
        data: NewService,
    ) -> Result<Service, ServiceError> {
        if !policy::may_create_service(principal) {
            return Err(ServiceError::Forbidden(
                "Only business users can create services",
            ));
        }

        let service = Service {
            id: Uuid::new_v4(),
            user_id: principal.id,
            title: data.title,
            description: data.description,
            price: data.price,
            price_description: data.price_description,
            location: data.location,
            images: Json(data.images),
            packages: Json(data.packages),
            category_id: data.category_id,
            featured: data.featured,
            rating: 0.0,
            review_count: 0,
            created_at: Utc::now(),
        };
        let service = self.catalog.create_service(service).await?;

        for event_type_id in data.event_type_ids {
            self.catalog
                .add_service_event_type(service.id, event_type_id)
                .await?;
        }
        for tag in &data.tags {
            self.catalog.add_service_tag(service.id, tag).await?;
        }

        Ok(service)
    }

    async fn update_service(
        &self,
        principal: &Principal,
        id: Uuid,
        update: ServiceUpdate,
    ) -> Result<Service, ServiceError> {
        let service = self
            .catalog
            .service_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Service"))?;

        if !policy::may_modify_service(principal, &service) {
            return Err(ServiceError::Forbidden(
                "You can only update your own services",
            ));
        }

        self.catalog
            .update_service(id, update)
            .await?
            .ok_or(ServiceError::NotFound("Service"))
    }

    async fn delete_service(&self, principal: &Principal, id: Uuid) -> Result<(), ServiceError> {
        let service = self
            .catalog
            .service_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Service"))?;

        if !policy::may_modify_service(principal, &service) {
            return Err(ServiceError::Forbidden(
                "You can only delete your own services",
            ));
        }

        Ok(self.catalog.delete_service(id).await?)
    }

    async fn services_for_owner(
        &self,
        principal: &Principal,
    ) -> Result<Vec<Service>, ServiceError> {
        if !policy::may_create_service(principal) {
            return Err(ServiceError::Forbidden(
                "Only business users can access this endpoint",
            ));
        }

        Ok(self.catalog.services_by_owner(principal.id).await?)
    }
}

#[injectable(ReviewService)]
pub struct DefaultReviewService {
    reviews: Ref<dyn ReviewRepository>,
    catalog: Ref<dyn CatalogRepository>,
    users: Ref<dyn UserRepository>,
}

#[async_trait]
impl ReviewService for DefaultReviewService {
    async fn reviews_for_service(
        &self,
        service_id: Uuid,
    ) -> Result<Vec<ReviewView>, ServiceError> {
        let reviews = self.reviews.reviews_for_service(service_id).await?;

        let mut authors: HashMap<Uuid, Option<User>> = HashMap::new();
        let mut views = Vec::with_capacity(reviews.len());
        for review in reviews {
            if !authors.contains_key(&review.user_id) {
                let user = self.users.user_by_id(review.user_id).await?;
                authors.insert(review.user_id, user);
            }
            let user = authors[&review.user_id].clone();
            views.push(ReviewView { review, user });
        }

        Ok(views)
    }

    async fn create_review(
        &self,
        principal: &Principal,
        service_id: Uuid,
        data: NewReview,
    ) -> Result<Review, ServiceError> {
        if !policy::may_create_review(principal) {
            return Err(ServiceError::Forbidden("Only customers can post reviews"));
        }

        if self.catalog.service_by_id(service_id).await?.is_none() {
            return Err(ServiceError::NotFound("Service"));
        }

        if !(1..=5).contains(&data.rating) {
            return Err(ServiceError::Validation(
                "Rating must be between 1 and 5".to_owned(),
            ));
        }

        let review = Review {
            id: Uuid::new_v4(),
            user_id: principal.id,
            service_id,
            rating: data.rating,
            comment: data.comment,
            created_at: Utc::now(),
        };

        Ok(self.reviews.create_review(review).await?)
    }
}

#[injectable(BookingService)]
pub struct DefaultBookingService {
    bookings: Ref<dyn BookingRepository>,
    catalog: Ref<dyn CatalogRepository>,
    users: Ref<dyn UserRepository>,
}

#[async_trait]
impl BookingService for DefaultBookingService {
    async fn create_booking(
        &self,
        principal: &Principal,
        service_id: Uuid,
        data: NewBooking,
    ) -> Result<Booking, ServiceError> {
        if !policy::may_create_booking(principal) {
            return Err(ServiceError::Forbidden("Only customers can book services"));
        }

        let service = self
            .catalog
            .service_by_id(service_id)
            .await?
            .ok_or(ServiceError::NotFound("Service"))?;

        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: principal.id,
            service_id,
            event_date: data.event_date,
            notes: data.notes,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        };
        let booking = self.bookings.create_booking(booking).await?;

        notifier::emit(BookingEvent {
            kind: BookingEventKind::Created,
            booking_id: booking.id,
            customer_id: booking.user_id,
            provider_id: service.user_id,
            service_title: service.title,
            event_date: booking.event_date,
        });

        Ok(booking)
    }

    async fn bookings_for(
        &self,
        principal: &Principal,
    ) -> Result<Vec<BookingView>, ServiceError> {
        let bookings = match principal.role {
            UserRole::Customer => self.bookings.bookings_for_customer(principal.id).await?,
            UserRole::Business => self.bookings.bookings_for_provider(principal.id).await?,
        };

        let mut services: HashMap<Uuid, Service> = HashMap::new();
        let mut customers: HashMap<Uuid, User> = HashMap::new();

        let mut views = Vec::with_capacity(bookings.len());
        for booking in bookings {
            if !services.contains_key(&booking.service_id) {
                match self.catalog.service_by_id(booking.service_id).await? {
                    Some(service) => {
                        services.insert(booking.service_id, service);
                    }
                    None => {
                        warn!("booking {} references missing service", booking.id);
                        continue;
                    }
                }
            }
            if !customers.contains_key(&booking.user_id) {
                match self.users.user_by_id(booking.user_id).await? {
                    Some(user) => {
                        customers.insert(booking.user_id, user);
                    }
                    None => {
                        warn!("booking {} references missing customer", booking.id);
                        continue;
                    }
                }
            }

            views.push(BookingView {
                service: services[&booking.service_id].clone(),
                customer: customers[&booking.user_id].clone(),
                booking,
            });
        }

        Ok(views)
    }

    async fn update_status(
        &self,
        principal: &Principal,
        booking_id: Uuid,
        status: &str,
    ) -> Result<Booking, ServiceError> {
        let booking = self
            .bookings
            .booking_by_id(booking_id)
            .await?
            .ok_or(ServiceError::NotFound("Booking"))?;

        let service = self
            .catalog
            .service_by_id(booking.service_id)
            .await?
            .ok_or(ServiceError::NotFound("Service"))?;

        if !policy::may_update_booking_status(principal, &booking, &service) {
            return Err(match principal.role {
                UserRole::Business => ServiceError::Forbidden(
                    "You can only update bookings for your own services",
                ),
                UserRole::Customer => {
                    ServiceError::Forbidden("You can only update your own bookings")
                }
            });
        }

        let status = BookingStatus::from_str(status)
            .map_err(|_| ServiceError::Validation("Invalid status".to_owned()))?;

        let updated = self
            .bookings
            .update_status(booking_id, status)
            .await?
            .ok_or(ServiceError::NotFound("Booking"))?;

        notifier::emit(BookingEvent {
            kind: BookingEventKind::StatusChanged {
                from: booking.status,
                to: updated.status,
            },
            booking_id: updated.id,
            customer_id: updated.user_id,
            provider_id: service.user_id,
            service_title: service.title,
            event_date: updated.event_date,
        });

        Ok(updated)
    }
}

#[injectable(MessagingService)]
pub struct DefaultMessagingService {
    messages: Ref<dyn MessageRepository>,
    users: Ref<dyn UserRepository>,
}

#[async_trait]
impl MessagingService for DefaultMessagingService {
    async fn conversations(&self, user_id: Uuid) -> Result<Vec<ConversationView>, ServiceError> {
        let messages = self.messages.messages_for_user(user_id).await?;

        // Messages arrive oldest-first, so each partition stays chronological.
        let mut partitions: HashMap<Uuid, Vec<Message>> = HashMap::new();
        for message in messages {
            let other_id = if message.from_user_id == user_id {
                message.to_user_id
            } else {
                message.from_user_id
            };
            partitions.entry(other_id).or_default().push(message);
        }

        let mut views = Vec::with_capacity(partitions.len());
        for (other_id, thread) in partitions {
            // Counterparties that no longer resolve drop the conversation.
            let Some(other_user) = self.users.user_by_id(other_id).await? else {
                continue;
            };
            let unread_count = thread
                .iter()
                .filter(|m| m.to_user_id == user_id && !m.read)
                .count();
            let Some(last_message) = thread.into_iter().last() else {
                continue;
            };

            views.push(ConversationView {
                other_user,
                last_message,
                unread_count,
            });
        }

        views.sort_by(|a, b| b.last_message.created_at.cmp(&a.last_message.created_at));
        Ok(views)
    }

    async fn conversation_with(
        &self,
        user_id: Uuid,
        other_id: Uuid,
    ) -> Result<Vec<Message>, ServiceError> {
        if self.users.user_by_id(other_id).await?.is_none() {
            return Err(ServiceError::NotFound("User"));
        }

        // Viewing is what marks the thread read; the returned state already
        // reflects the flip.
        self.messages
            .mark_conversation_read(user_id, other_id)
            .await?;

        Ok(self
            .messages
            .conversation_between(user_id, other_id)
            .await?)
    }

    async fn send_message(
        &self,
        user_id: Uuid,
        to_user_id: Uuid,
        data: NewMessage,
    ) -> Result<Message, ServiceError> {
        if self.users.user_by_id(to_user_id).await?.is_none() {
            return Err(ServiceError::NotFound("Recipient"));
        }

        if data.content.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Message content must not be empty".to_owned(),
            ));
        }

        let message = Message {
            id: Uuid::new_v4(),
            from_user_id: user_id,
            to_user_id,
            content: data.content,
            booking_id: data.booking_id,
            read: false,
            created_at: Utc::now(),
        };

        Ok(self.messages.create_message(message).await?)
    }
}
