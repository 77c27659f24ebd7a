//! Messaging endpoints
//!
//! Conversations are derived views over the messages table; opening one is
//! what marks its unread messages read.

use crate::api::CurrentUser;
use crate::core::error::ServiceError;
use crate::core::traits::MessagingService;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_conversations))
        .route("/:user_id", get(get_conversation).post(send_message))
}

async fn list_conversations(
    Inject(messaging): Inject<dyn MessagingService>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<schemas::Conversation>>, ServiceError> {
    let conversations = messaging.conversations(principal.id).await?;
    Ok(Json(conversations.into_iter().map(Into::into).collect()))
}

async fn get_conversation(
    Inject(messaging): Inject<dyn MessagingService>,
    CurrentUser(principal): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<schemas::Message>>, ServiceError> {
    let messages = messaging.conversation_with(principal.id, user_id).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

async fn send_message(
    Inject(messaging): Inject<dyn MessagingService>,
    CurrentUser(principal): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<schemas::SendMessage>,
) -> Result<(StatusCode, Json<schemas::Message>), ServiceError> {
    let message = messaging
        .send_message(principal.id, user_id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(message.into())))
}

pub mod schemas {
    use crate::api::auth::schemas::User;
    use crate::core::traits::{ConversationView, NewMessage};
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct SendMessage {
        pub content: String,
        #[serde(default)]
        pub booking_id: Option<Uuid>,
    }

    impl From<SendMessage> for NewMessage {
        fn from(payload: SendMessage) -> Self {
            NewMessage {
                content: payload.content,
                booking_id: payload.booking_id,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Message {
        pub id: Uuid,
        pub from_user_id: Uuid,
        pub to_user_id: Uuid,
        pub content: String,
        pub booking_id: Option<Uuid>,
        pub read: bool,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Message> for Message {
        fn from(message: entities::Message) -> Self {
            Message {
                id: message.id,
                from_user_id: message.from_user_id,
                to_user_id: message.to_user_id,
                content: message.content,
                booking_id: message.booking_id,
                read: message.read,
                created_at: message.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Conversation {
        pub other_user: User,
        pub last_message: Message,
        pub unread_count: usize,
    }

    impl From<ConversationView> for Conversation {
        fn from(view: ConversationView) -> Self {
            Conversation {
                other_user: view.other_user.into(),
                last_message: view.last_message.into(),
                unread_count: view.unread_count,
            }
        }
    }
}
