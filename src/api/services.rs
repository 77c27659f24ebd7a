//! Service catalog endpoints, including reviews and the booking entry point

use crate::api::{CurrentUser, bookings};
use crate::core::error::ServiceError;
use crate::core::traits::{CatalogService, ReviewService};
use crate::infrastructure::traits::ServiceFilter;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_services).post(create_service))
        .route(
            "/:id",
            get(service_detail)
                .put(update_service)
                .delete(delete_service),
        )
        .route("/:id/book", post(bookings::create_booking))
        .route("/:id/reviews", get(list_reviews).post(create_review))
}

pub fn business_router() -> Router {
    Router::new().route("/services", get(my_services))
}

async fn list_services(
    Inject(catalog): Inject<dyn CatalogService>,
    Query(query): Query<schemas::ListServicesQuery>,
) -> Result<Json<Vec<schemas::Service>>, ServiceError> {
    let filter = ServiceFilter {
        featured: query.featured,
        category_id: query.category_id,
    };
    let services = catalog.list_services(filter).await?;
    Ok(Json(services.into_iter().map(Into::into).collect()))
}

async fn service_detail(
    Inject(catalog): Inject<dyn CatalogService>,
    Path(id): Path<Uuid>,
) -> Result<Json<schemas::ServiceDetail>, ServiceError> {
    Ok(Json(catalog.service_detail(id).await?.into()))
}

async fn create_service(
    Inject(catalog): Inject<dyn CatalogService>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<schemas::CreateService>,
) -> Result<(StatusCode, Json<schemas::Service>), ServiceError> {
    let service = catalog.create_service(&principal, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(service.into())))
}

async fn update_service(
    Inject(catalog): Inject<dyn CatalogService>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<schemas::UpdateService>,
) -> Result<Json<schemas::Service>, ServiceError> {
    let service = catalog
        .update_service(&principal, id, payload.into())
        .await?;
    Ok(Json(service.into()))
}

async fn delete_service(
    Inject(catalog): Inject<dyn CatalogService>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    catalog.delete_service(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn my_services(
    Inject(catalog): Inject<dyn CatalogService>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<schemas::Service>>, ServiceError> {
    let services = catalog.services_for_owner(&principal).await?;
    Ok(Json(services.into_iter().map(Into::into).collect()))
}

async fn list_reviews(
    Inject(reviews): Inject<dyn ReviewService>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<schemas::ReviewWithUser>>, ServiceError> {
    let views = reviews.reviews_for_service(id).await?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}

async fn create_review(
    Inject(reviews): Inject<dyn ReviewService>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<schemas::CreateReview>,
) -> Result<(StatusCode, Json<schemas::Review>), ServiceError> {
    let review = reviews
        .create_review(&principal, id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

pub mod schemas {
    use crate::api::auth::schemas::User;
    use crate::core::traits::{NewReview, NewService, ReviewView, ServiceDetailView};
    use crate::infrastructure::entities;
    use crate::infrastructure::entities::ServicePackage;
    use crate::infrastructure::traits::ServiceUpdate;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct ListServicesQuery {
        #[serde(default)]
        pub featured: Option<bool>,
        #[serde(default)]
        pub category_id: Option<Uuid>,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Service {
        pub id: Uuid,
        pub user_id: Uuid,
        pub title: String,
        pub description: String,
        pub price: String,
        pub price_description: Option<String>,
        pub location: Option<String>,
        pub images: Vec<String>,
        pub packages: Vec<ServicePackage>,
        pub category_id: Uuid,
        pub featured: bool,
        pub rating: f64,
        pub review_count: i64,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Service> for Service {
        fn from(service: entities::Service) -> Self {
            Service {
                id: service.id,
                user_id: service.user_id,
                title: service.title,
                description: service.description,
                price: service.price,
                price_description: service.price_description,
                location: service.location,
                images: service.images.0,
                packages: service.packages.0,
                category_id: service.category_id,
                featured: service.featured,
                rating: service.rating,
                review_count: service.review_count,
                created_at: service.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ServiceDetail {
        #[serde(flatten)]
        pub service: Service,
        pub tags: Vec<String>,
        pub event_types: Vec<Uuid>,
        pub owner: User,
    }

    impl From<ServiceDetailView> for ServiceDetail {
        fn from(view: ServiceDetailView) -> Self {
            ServiceDetail {
                service: view.service.into(),
                tags: view.tags,
                event_types: view.event_type_ids,
                owner: view.owner.into(),
            }
        }
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct CreateService {
        pub title: String,
        pub description: String,
        pub price: String,
        #[serde(default)]
        pub price_description: Option<String>,
        #[serde(default)]
        pub location: Option<String>,
        #[serde(default)]
        pub images: Vec<String>,
        #[serde(default)]
        pub packages: Vec<ServicePackage>,
        pub category_id: Uuid,
        #[serde(default)]
        pub featured: bool,
        #[serde(default)]
        pub event_types: Vec<Uuid>,
        #[serde(default)]
        pub tags: Vec<String>,
    }

    impl From<CreateService> for NewService {
        fn from(payload: CreateService) -> Self {
            NewService {
                title: payload.title,
                description: payload.description,
                price: payload.price,
                price_description: payload.price_description,
                location: payload.location,
                images: payload.images,
                packages: payload.packages,
                category_id: payload.category_id,
                featured: payload.featured,
                event_type_ids: payload.event_types,
                tags: payload.tags,
            }
        }
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct UpdateService {
        #[serde(default)]
        pub title: Option<String>,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub price: Option<String>,
        #[serde(default)]
        pub price_description: Option<String>,
        #[serde(default)]
        pub location: Option<String>,
        #[serde(default)]
        pub images: Option<Vec<String>>,
        #[serde(default)]
        pub packages: Option<Vec<ServicePackage>>,
        #[serde(default)]
        pub category_id: Option<Uuid>,
        #[serde(default)]
        pub featured: Option<bool>,
    }

    impl From<UpdateService> for ServiceUpdate {
        fn from(payload: UpdateService) -> Self {
            ServiceUpdate {
                title: payload.title,
                description: payload.description,
                price: payload.price,
                price_description: payload.price_description,
                location: payload.location,
                images: payload.images,
                packages: payload.packages,
                category_id: payload.category_id,
                featured: payload.featured,
            }
        }
    }

    #[derive(Deserialize, Debug)]
    pub struct CreateReview {
        pub rating: i64,
        #[serde(default)]
        pub comment: Option<String>,
    }

    impl From<CreateReview> for NewReview {
        fn from(payload: CreateReview) -> Self {
            NewReview {
                rating: payload.rating,
                comment: payload.comment,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Review {
        pub id: Uuid,
        pub user_id: Uuid,
        pub service_id: Uuid,
        pub rating: i64,
        pub comment: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Review> for Review {
        fn from(review: entities::Review) -> Self {
            Review {
                id: review.id,
                user_id: review.user_id,
                service_id: review.service_id,
                rating: review.rating,
                comment: review.comment,
                created_at: review.created_at,
            }
        }
    }

    /// A review joined with its author; `user` is `null` when the author's
    /// account no longer exists.
    #[derive(Serialize, Debug)]
    pub struct ReviewWithUser {
        #[serde(flatten)]
        pub review: Review,
        pub user: Option<User>,
    }

    impl From<ReviewView> for ReviewWithUser {
        fn from(view: ReviewView) -> Self {
            ReviewWithUser {
                review: view.review.into(),
                user: view.user.map(Into::into),
            }
        }
    }
}
