//! Eventique: event-services marketplace web server

use eventique_api::BOOKING_EVENTS;
use eventique_api::api;
use eventique_api::core;
use eventique_api::core::services::{
    DefaultAccountService, DefaultBookingService, DefaultCatalogService, DefaultMessagingService,
    DefaultReviewService,
};
use eventique_api::infrastructure::database::DatabaseConnection;
use eventique_api::infrastructure::repositories::{
    DbBookingRepository, DbCatalogRepository, DbMessageRepository, DbReviewRepository,
    DbUserRepository,
};

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use log::info;
use std::env;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;

    // background task persisting booking notifications
    let (event_sender, event_receiver) = mpsc::channel(64);
    BOOKING_EVENTS
        .set(event_sender)
        .expect("event sender should not be set");

    let dispatcher_join_handle = runtime.spawn(async move {
        let connection = DatabaseConnection::create();
        core::notifier::background_task(connection, event_receiver).await;
    });

    let web_task_handle = runtime.spawn(web_server_task());

    runtime.block_on(async {
        web_task_handle
            .await
            .expect("failed to join web_task_handle");
        dispatcher_join_handle
            .await
            .expect("failed to join dispatcher_join_handle");
    });

    Ok(())
}

async fn web_server_task() {
    let connection = DatabaseConnection::create();
    sqlx::migrate!()
        .run(&*connection)
        .await
        .expect("failed to run database migrations");

    let provider = ServiceCollection::new()
        .add(DatabaseConnection::singleton())
        .add(DbUserRepository::scoped())
        .add(DbCatalogRepository::scoped())
        .add(DbReviewRepository::scoped())
        .add(DbBookingRepository::scoped())
        .add(DbMessageRepository::scoped())
        .add(DefaultAccountService::scoped())
        .add(DefaultCatalogService::scoped())
        .add(DefaultReviewService::scoped())
        .add(DefaultBookingService::scoped())
        .add(DefaultMessagingService::scoped())
        .build_provider()
        .unwrap();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(24)));

    let app = Router::new()
        .nest("/api", api::router())
        .layer(
            CorsLayer::new()
                .allow_headers([header::CONTENT_TYPE])
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_origin([
                    "http://localhost:3000".parse::<HeaderValue>().unwrap(),
                    "http://localhost:5173".parse::<HeaderValue>().unwrap(),
                ])
                .allow_credentials(true),
        )
        .layer(session_layer)
        .with_provider(provider);

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_owned());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();
    info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
    info!("Shutting down...");
}
