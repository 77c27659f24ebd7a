//! Registration, login and session endpoints

use crate::api::{CurrentUser, PRINCIPAL_KEY};
use crate::core::error::ServiceError;
use crate::core::policy::Principal;
use crate::core::traits::AccountService;
use crate::infrastructure::entities;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;
use tower_sessions::Session;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/user", get(current_user))
}

async fn register(
    Inject(accounts): Inject<dyn AccountService>,
    session: Session,
    Json(payload): Json<schemas::RegisterUser>,
) -> Result<(StatusCode, Json<schemas::User>), ServiceError> {
    let user = accounts.register(payload.into()).await?;
    establish_session(&session, &user).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn login(
    Inject(accounts): Inject<dyn AccountService>,
    session: Session,
    Json(payload): Json<schemas::LoginUser>,
) -> Result<Json<schemas::User>, ServiceError> {
    let user = accounts.login(&payload.username, &payload.password).await?;
    establish_session(&session, &user).await?;

    Ok(Json(user.into()))
}

async fn logout(session: Session) -> Result<StatusCode, ServiceError> {
    session.flush().await?;
    Ok(StatusCode::OK)
}

async fn current_user(
    Inject(accounts): Inject<dyn AccountService>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<schemas::User>, ServiceError> {
    let user = accounts
        .user_by_id(principal.id)
        .await?
        .ok_or(ServiceError::NotFound("User"))?;

    Ok(Json(user.into()))
}

async fn establish_session(
    session: &Session,
    user: &entities::User,
) -> Result<(), ServiceError> {
    session
        .insert(
            PRINCIPAL_KEY,
            Principal {
                id: user.id,
                role: user.role,
            },
        )
        .await?;
    Ok(())
}

pub mod schemas {
    use crate::core::traits::NewUser;
    use crate::infrastructure::entities;
    use crate::infrastructure::entities::UserRole;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct RegisterUser {
        pub username: String,
        pub email: String,
        pub password: String,
        pub first_name: String,
        pub last_name: String,
        #[serde(default)]
        pub phone: Option<String>,
        #[serde(default)]
        pub profile_image: Option<String>,
        pub user_type: String,
        #[serde(default)]
        pub business_name: Option<String>,
        #[serde(default)]
        pub business_description: Option<String>,
        #[serde(default)]
        pub address: Option<String>,
        #[serde(default)]
        pub city: Option<String>,
        #[serde(default)]
        pub state: Option<String>,
        #[serde(default)]
        pub zip: Option<String>,
    }

    impl From<RegisterUser> for NewUser {
        fn from(payload: RegisterUser) -> Self {
            NewUser {
                username: payload.username,
                email: payload.email,
                password: payload.password,
                first_name: payload.first_name,
                last_name: payload.last_name,
                phone: payload.phone,
                profile_image: payload.profile_image,
                role: payload.user_type,
                business_name: payload.business_name,
                business_description: payload.business_description,
                address: payload.address,
                city: payload.city,
                state: payload.state,
                zip: payload.zip,
            }
        }
    }

    #[derive(Deserialize, Debug)]
    pub struct LoginUser {
        pub username: String,
        pub password: String,
    }

    /// A user as it appears on the wire: the row minus the password hash.
    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct User {
        pub id: Uuid,
        pub username: String,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub phone: Option<String>,
        pub profile_image: Option<String>,
        pub user_type: UserRole,
        pub business_name: Option<String>,
        pub business_description: Option<String>,
        pub address: Option<String>,
        pub city: Option<String>,
        pub state: Option<String>,
        pub zip: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::User> for User {
        fn from(user: entities::User) -> Self {
            User {
                id: user.id,
                username: user.username,
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
                phone: user.phone,
                profile_image: user.profile_image,
                user_type: user.role,
                business_name: user.business_name,
                business_description: user.business_description,
                address: user.address,
                city: user.city,
                state: user.state,
                zip: user.zip,
                created_at: user.created_at,
            }
        }
    }
}
