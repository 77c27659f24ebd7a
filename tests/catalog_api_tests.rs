//! Catalog, service CRUD and review tests

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use serial_test::serial;
use sqlx::SqlitePool;
use uuid::Uuid;

async fn insert_category(pool: &SqlitePool, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO categories (id, name, icon, description) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind("sparkles")
        .bind("seeded for tests")
        .execute(pool)
        .await
        .unwrap();
    id
}

async fn insert_event_type(pool: &SqlitePool, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO event_types (id, name, image, description) VALUES (?, ?, NULL, NULL)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await
        .unwrap();
    id
}

#[tokio::test]
#[serial]
async fn test_categories_and_event_types_are_public() {
    let pool = setup_test_db().await;
    let app = create_test_app();

    let category_id = insert_category(&pool, "Catering").await;
    let event_type_id = insert_event_type(&pool, "Wedding").await;

    let (status, body) = request(&app, "GET", "/api/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Catering");

    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/categories/{category_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Catering");

    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/event-types/{event_type_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Wedding");

    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/categories/{}", Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_only_business_users_create_services() {
    let _pool = setup_test_db().await;
    let app = create_test_app();

    let (_, customer_cookie) = register_user(&app, "customer", "customer").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/services",
        Some(&customer_cookie),
        Some(json!({
            "title": "Nope",
            "description": "Customers cannot list services",
            "price": "$",
            "categoryId": Uuid::new_v4(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only business users can create services");

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_service_detail_is_enriched() {
    let pool = setup_test_db().await;
    let app = create_test_app();

    let (vendor, vendor_cookie) = register_user(&app, "vendor", "business").await;
    let category_id = insert_category(&pool, "Music").await;
    let event_type_id = insert_event_type(&pool, "Corporate").await;

    let (status, service) = request(
        &app,
        "POST",
        "/api/services",
        Some(&vendor_cookie),
        Some(json!({
            "title": "String Quartet",
            "description": "Chamber music for receptions",
            "price": "$$$",
            "categoryId": category_id,
            "tags": ["classical", "live"],
            "eventTypes": [event_type_id],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let service_id = service["id"].as_str().unwrap();

    let (status, detail) = request(
        &app,
        "GET",
        &format!("/api/services/{service_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "String Quartet");
    assert_eq!(detail["tags"], json!(["classical", "live"]));
    assert_eq!(detail["eventTypes"], json!([event_type_id]));
    assert_eq!(detail["owner"]["id"], vendor["id"]);
    assert!(detail["owner"]["password"].is_null());
    assert!(detail["owner"]["passwordHash"].is_null());

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_update_and_delete_are_owner_only() {
    let _pool = setup_test_db().await;
    let app = create_test_app();

    let (_, owner_cookie) = register_user(&app, "owner", "business").await;
    let (_, rival_cookie) = register_user(&app, "rival", "business").await;

    let service = create_service(&app, &owner_cookie, "Balloon Arches").await;
    let service_id = service["id"].as_str().unwrap();

    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/services/{service_id}"),
        Some(&rival_cookie),
        Some(json!({ "title": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only update your own services");

    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/services/{service_id}"),
        Some(&owner_cookie),
        Some(json!({ "title": "Balloon Arches Deluxe" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Balloon Arches Deluxe");
    // untouched fields survive a partial update
    assert_eq!(body["description"], service["description"]);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/services/{service_id}"),
        Some(&rival_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/services/{service_id}"),
        Some(&owner_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/services/{service_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_listing_filters() {
    let pool = setup_test_db().await;
    let app = create_test_app();

    let (_, vendor_cookie) = register_user(&app, "vendor", "business").await;
    let weddings = insert_category(&pool, "Weddings").await;
    let parties = insert_category(&pool, "Parties").await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/services",
        Some(&vendor_cookie),
        Some(json!({
            "title": "Featured Wedding Package",
            "description": "All-inclusive",
            "price": "$$$",
            "categoryId": weddings,
            "featured": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = request(
        &app,
        "POST",
        "/api/services",
        Some(&vendor_cookie),
        Some(json!({
            "title": "Birthday Clown",
            "description": "Balloons included",
            "price": "$",
            "categoryId": parties,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = request(&app, "GET", "/api/services", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = request(&app, "GET", "/api/services?featured=true", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Featured Wedding Package");

    let (_, body) = request(
        &app,
        "GET",
        &format!("/api/services?categoryId={parties}"),
        None,
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Birthday Clown");

    // the owner dashboard lists the same two services
    let (status, body) = request(&app, "GET", "/api/business/services", Some(&vendor_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_reviews_update_service_aggregates() {
    let _pool = setup_test_db().await;
    let app = create_test_app();

    let (_, vendor_cookie) = register_user(&app, "vendor", "business").await;
    let (_, customer_cookie) = register_user(&app, "customer", "customer").await;
    let (reviewer, reviewer_cookie) = register_user(&app, "reviewer", "customer").await;

    let service = create_service(&app, &vendor_cookie, "DJ Set").await;
    let service_id = service["id"].as_str().unwrap();
    assert_eq!(service["rating"], 0.0);
    assert_eq!(service["reviewCount"], 0);

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/services/{service_id}/reviews"),
        Some(&customer_cookie),
        Some(json!({ "rating": 5, "comment": "Great energy" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/services/{service_id}/reviews"),
        Some(&reviewer_cookie),
        Some(json!({ "rating": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, detail) = request(
        &app,
        "GET",
        &format!("/api/services/{service_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(detail["rating"], 4.5);
    assert_eq!(detail["reviewCount"], 2);

    // listing includes each author, sanitized
    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/services/{service_id}/reviews"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reviews = body.as_array().unwrap();
    assert_eq!(reviews.len(), 2);
    let by_reviewer = reviews
        .iter()
        .find(|r| r["rating"] == 4)
        .expect("the four-star review should be listed");
    assert_eq!(by_reviewer["user"]["id"], reviewer["id"]);
    assert!(by_reviewer["user"]["password"].is_null());

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_review_validation() {
    let _pool = setup_test_db().await;
    let app = create_test_app();

    let (_, vendor_cookie) = register_user(&app, "vendor", "business").await;
    let (_, customer_cookie) = register_user(&app, "customer", "customer").await;
    let service = create_service(&app, &vendor_cookie, "Photo Booth").await;
    let service_id = service["id"].as_str().unwrap();

    // only customers review
    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/services/{service_id}/reviews"),
        Some(&vendor_cookie),
        Some(json!({ "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only customers can post reviews");

    // rating bounds
    for rating in [0, 6] {
        let (status, _) = request(
            &app,
            "POST",
            &format!("/api/services/{service_id}/reviews"),
            Some(&customer_cookie),
            Some(json!({ "rating": rating })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // missing service
    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/services/{}/reviews", Uuid::new_v4()),
        Some(&customer_cookie),
        Some(json!({ "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    cleanup_test_db();
}
