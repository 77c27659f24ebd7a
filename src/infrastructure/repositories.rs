//! DB Repository abstractions

use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{
    Booking, BookingStatus, Category, EventType, Message, Review, Service, User,
};
use crate::infrastructure::traits::{
    BookingRepository, CatalogRepository, MessageRepository, ReviewRepository, ServiceFilter,
    ServiceUpdate, UserRepository,
};
use async_trait::async_trait;
use di::{Ref, injectable};
use sqlx::types::Json;
use uuid::Uuid;

#[injectable(UserRepository)]
pub struct DbUserRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl UserRepository for DbUserRepository {
    async fn create_user(&self, user: User) -> Result<User, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO users (id, username, email, password_hash, first_name, last_name, \
             phone, profile_image, role, business_name, business_description, address, city, \
             state, zip, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(user.id)
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.phone)
        .bind(user.profile_image)
        .bind(user.role)
        .bind(user.business_name)
        .bind(user.business_description)
        .bind(user.address)
        .bind(user.city)
        .bind(user.state)
        .bind(user.zip)
        .bind(user.created_at)
        .fetch_one(&**self.connection)
        .await
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&**self.connection)
            .await
    }
}

#[injectable(CatalogRepository)]
pub struct DbCatalogRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl CatalogRepository for DbCatalogRepository {
    async fn categories(&self) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(&**self.connection)
            .await
    }

    async fn category_by_id(&self, id: Uuid) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn event_types(&self) -> Result<Vec<EventType>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM event_types ORDER BY name ASC")
            .fetch_all(&**self.connection)
            .await
    }

    async fn event_type_by_id(&self, id: Uuid) -> Result<Option<EventType>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM event_types WHERE id = ?")
            .bind(id)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn services(&self, filter: ServiceFilter) -> Result<Vec<Service>, sqlx::Error> {
        if let Some(category_id) = filter.category_id {
            sqlx::query_as(
                "SELECT * FROM services WHERE category_id = ? ORDER BY datetime(created_at) DESC",
            )
            .bind(category_id)
            .fetch_all(&**self.connection)
            .await
        } else if filter.featured == Some(true) {
            sqlx::query_as(
                "SELECT * FROM services WHERE featured = 1 ORDER BY datetime(created_at) DESC",
            )
            .fetch_all(&**self.connection)
            .await
        } else {
            sqlx::query_as("SELECT * FROM services ORDER BY datetime(created_at) DESC")
                .fetch_all(&**self.connection)
                .await
        }
    }

    async fn service_by_id(&self, id: Uuid) -> Result<Option<Service>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM services WHERE id = ?")
            .bind(id)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn services_by_owner(&self, user_id: Uuid) -> Result<Vec<Service>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM services WHERE user_id = ? ORDER BY datetime(created_at) DESC",
        )
        .bind(user_id)
        .fetch_all(&**self.connection)
        .await
    }

    async fn create_service(&self, service: Service) -> Result<Service, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO services (id, user_id, title, description, price, price_description, \
             location, images, packages, category_id, featured, rating, review_count, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(service.id)
        .bind(service.user_id)
        .bind(service.title)
        .bind(service.description)
        .bind(service.price)
        .bind(service.price_description)
        .bind(service.location)
        .bind(service.images)
        .bind(service.packages)
        .bind(service.category_id)
        .bind(service.featured)
        .bind(service.rating)
        .bind(service.review_count)
        .bind(service.created_at)
        .fetch_one(&**self.connection)
        .await
    }

    async fn update_service(
        &self,
        id: Uuid,
        update: ServiceUpdate,
    ) -> Result<Option<Service>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE services SET \
             title = COALESCE(?, title), \
             description = COALESCE(?, description), \
             price = COALESCE(?, price), \
             price_description = COALESCE(?, price_description), \
             location = COALESCE(?, location), \
             images = COALESCE(?, images), \
             packages = COALESCE(?, packages), \
             category_id = COALESCE(?, category_id), \
             featured = COALESCE(?, featured) \
             WHERE id = ? RETURNING *",
        )
        .bind(update.title)
        .bind(update.description)
        .bind(update.price)
        .bind(update.price_description)
        .bind(update.location)
        .bind(update.images.map(Json))
        .bind(update.packages.map(Json))
        .bind(update.category_id)
        .bind(update.featured)
        .bind(id)
        .fetch_optional(&**self.connection)
        .await
    }

    async fn delete_service(&self, id: Uuid) -> Result<(), sqlx::Error> {
        let mut tx = self.connection.begin().await?;
        sqlx::query("DELETE FROM service_tags WHERE service_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM service_event_types WHERE service_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await
    }

    async fn tags_for_service(&self, service_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT tag FROM service_tags WHERE service_id = ? ORDER BY rowid ASC")
                .bind(service_id)
                .fetch_all(&**self.connection)
                .await?;
        Ok(rows.into_iter().map(|(tag,)| tag).collect())
    }

    async fn event_type_ids_for_service(
        &self,
        service_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT event_type_id FROM service_event_types WHERE service_id = ? ORDER BY rowid ASC",
        )
        .bind(service_id)
        .fetch_all(&**self.connection)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn add_service_tag(&self, service_id: Uuid, tag: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO service_tags (id, service_id, tag) VALUES (?, ?, ?)")
            .bind(Uuid::new_v4())
            .bind(service_id)
            .bind(tag)
            .execute(&**self.connection)
            .await?;
        Ok(())
    }

    async fn add_service_event_type(
        &self,
        service_id: Uuid,
        event_type_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO service_event_types (id, service_id, event_type_id) VALUES (?, ?, ?)",
        )
        .bind(Uuid::new_v4())
        .bind(service_id)
        .bind(event_type_id)
        .execute(&**self.connection)
        .await?;
        Ok(())
    }
}

#[injectable(ReviewRepository)]
pub struct DbReviewRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl ReviewRepository for DbReviewRepository {
    async fn reviews_for_service(&self, service_id: Uuid) -> Result<Vec<Review>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM reviews WHERE service_id = ? ORDER BY datetime(created_at) DESC",
        )
        .bind(service_id)
        .fetch_all(&**self.connection)
        .await
    }

    async fn create_review(&self, review: Review) -> Result<Review, sqlx::Error> {
        let mut tx = self.connection.begin().await?;

        let created: Review = sqlx::query_as(
            "INSERT INTO reviews (id, user_id, service_id, rating, comment, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(review.id)
        .bind(review.user_id)
        .bind(review.service_id)
        .bind(review.rating)
        .bind(review.comment)
        .bind(review.created_at)
        .fetch_one(&mut *tx)
        .await?;

        let (rating, review_count): (f64, i64) = sqlx::query_as(
            "SELECT COALESCE(AVG(rating), 0.0), COUNT(*) FROM reviews WHERE service_id = ?",
        )
        .bind(created.service_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE services SET rating = ?, review_count = ? WHERE id = ?")
            .bind(rating)
            .bind(review_count)
            .bind(created.service_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }
}

#[injectable(BookingRepository)]
pub struct DbBookingRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl BookingRepository for DbBookingRepository {
    async fn create_booking(&self, booking: Booking) -> Result<Booking, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO bookings (id, user_id, service_id, event_date, notes, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.service_id)
        .bind(booking.event_date)
        .bind(booking.notes)
        .bind(booking.status)
        .bind(booking.created_at)
        .fetch_one(&**self.connection)
        .await
    }

    async fn booking_by_id(&self, id: Uuid) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&**self.connection)
            .await
    }

    async fn bookings_for_customer(&self, user_id: Uuid) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM bookings WHERE user_id = ? ORDER BY datetime(created_at) DESC",
        )
        .bind(user_id)
        .fetch_all(&**self.connection)
        .await
    }

    async fn bookings_for_provider(&self, user_id: Uuid) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as(
            "SELECT b.* FROM bookings b \
             INNER JOIN services s ON s.id = b.service_id \
             WHERE s.user_id = ? ORDER BY datetime(b.created_at) DESC",
        )
        .bind(user_id)
        .fetch_all(&**self.connection)
        .await
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as("UPDATE bookings SET status = ? WHERE id = ? RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(&**self.connection)
            .await
    }
}

#[injectable(MessageRepository)]
pub struct DbMessageRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl MessageRepository for DbMessageRepository {
    async fn messages_for_user(&self, user_id: Uuid) -> Result<Vec<Message>, sqlx::Error> {
        // rowid breaks created_at ties so conversation order is deterministic
        sqlx::query_as(
            "SELECT * FROM messages WHERE from_user_id = ? OR to_user_id = ? \
             ORDER BY datetime(created_at) ASC, rowid ASC",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&**self.connection)
        .await
    }

    async fn conversation_between(
        &self,
        user_id: Uuid,
        other_id: Uuid,
    ) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM messages \
             WHERE (from_user_id = ? AND to_user_id = ?) OR (from_user_id = ? AND to_user_id = ?) \
             ORDER BY datetime(created_at) ASC, rowid ASC",
        )
        .bind(user_id)
        .bind(other_id)
        .bind(other_id)
        .bind(user_id)
        .fetch_all(&**self.connection)
        .await
    }

    async fn mark_conversation_read(
        &self,
        user_id: Uuid,
        other_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE messages SET read = 1 \
             WHERE to_user_id = ? AND from_user_id = ? AND read = 0",
        )
        .bind(user_id)
        .bind(other_id)
        .execute(&**self.connection)
        .await?;
        Ok(())
    }

    async fn create_message(&self, message: Message) -> Result<Message, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO messages (id, from_user_id, to_user_id, content, booking_id, read, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(message.id)
        .bind(message.from_user_id)
        .bind(message.to_user_id)
        .bind(message.content)
        .bind(message.booking_id)
        .bind(message.read)
        .bind(message.created_at)
        .fetch_one(&**self.connection)
        .await
    }
}
