//! Category and event-type endpoints

use crate::core::error::ServiceError;
use crate::core::traits::CatalogService;
use axum::extract::Path;
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn categories_router() -> Router {
    Router::new()
        .route("/", get(list_categories))
        .route("/:id", get(get_category))
}

pub fn event_types_router() -> Router {
    Router::new()
        .route("/", get(list_event_types))
        .route("/:id", get(get_event_type))
}

async fn list_categories(
    Inject(catalog): Inject<dyn CatalogService>,
) -> Result<Json<Vec<schemas::Category>>, ServiceError> {
    let categories = catalog.list_categories().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

async fn get_category(
    Inject(catalog): Inject<dyn CatalogService>,
    Path(id): Path<Uuid>,
) -> Result<Json<schemas::Category>, ServiceError> {
    Ok(Json(catalog.category(id).await?.into()))
}

async fn list_event_types(
    Inject(catalog): Inject<dyn CatalogService>,
) -> Result<Json<Vec<schemas::EventType>>, ServiceError> {
    let event_types = catalog.list_event_types().await?;
    Ok(Json(event_types.into_iter().map(Into::into).collect()))
}

async fn get_event_type(
    Inject(catalog): Inject<dyn CatalogService>,
    Path(id): Path<Uuid>,
) -> Result<Json<schemas::EventType>, ServiceError> {
    Ok(Json(catalog.event_type(id).await?.into()))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use serde::Serialize;
    use uuid::Uuid;

    #[derive(Serialize, Debug)]
    pub struct Category {
        pub id: Uuid,
        pub name: String,
        pub icon: String,
        pub description: Option<String>,
    }

    impl From<entities::Category> for Category {
        fn from(category: entities::Category) -> Self {
            Category {
                id: category.id,
                name: category.name,
                icon: category.icon,
                description: category.description,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct EventType {
        pub id: Uuid,
        pub name: String,
        pub image: Option<String>,
        pub description: Option<String>,
    }

    impl From<entities::EventType> for EventType {
        fn from(event_type: entities::EventType) -> Self {
            EventType {
                id: event_type.id,
                name: event_type.name,
                image: event_type.image,
                description: event_type.description,
            }
        }
    }
}
