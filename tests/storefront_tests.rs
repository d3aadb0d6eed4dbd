//! End-to-end tests for the storefront flows the frontend depends on.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use std::sync::Arc;
use tower::ServiceExt;
use vitrine::config::Config;
use vitrine::db::NewUser;
use vitrine::services::password::hash_password_sync;

async fn spawn_app() -> (Arc<vitrine::api::AppState>, Router) {
    let db_path =
        std::env::temp_dir().join(format!("vitrine-test-{}.db", uuid::Uuid::new_v4()));
    let images_path =
        std::env::temp_dir().join(format!("vitrine-test-images-{}", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;
    config.uploads.images_path = images_path.to_string_lossy().into_owned();
    config.observability.metrics_enabled = false;

    let state = vitrine::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");

    let router = vitrine::api::router(state.clone()).await;
    (state, router)
}

async fn seed_user(state: &vitrine::api::AppState, email: &str) -> String {
    let hash = hash_password_sync("secret-pw", None).expect("hash password");
    let user = state
        .store()
        .create_user(NewUser {
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
            gender: "Female".to_string(),
            email: email.to_string(),
            password_hash: hash,
            image_path: None,
            date_of_birth: "1990-01-01".to_string(),
            mobile: "0300-0000000".to_string(),
            address: "1 Analytical Way".to_string(),
            country_id: 1,
            state_id: 1,
            city_id: 1,
        })
        .await
        .expect("seed user");
    user.id
}

async fn seed_product(state: &vitrine::api::AppState, name: &str, price: &str, stock: i32) -> String {
    let category = state
        .store()
        .create_category("Gadgets")
        .await
        .expect("seed category");
    let product = state
        .store()
        .create_product(vitrine::db::NewProduct {
            name: name.to_string(),
            description: "A test product".to_string(),
            price: price.parse::<Decimal>().expect("price"),
            stock,
            image_url: None,
            category_id: category.id,
        })
        .await
        .expect("seed product");
    product.id
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Option<String>, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(Body::from(
                    serde_json::json!({ "email": email, "password": password }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).to_string());

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value =
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, cookie, json)
}

async fn json_request(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie);
    builder = builder.header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
    let request = match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value =
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn multipart_registration(email: &str) -> (String, String) {
    let boundary = "vitrine-test-boundary";
    let mut body = String::new();
    for (name, value) in [
        ("first_name", "Grace"),
        ("gender", "Female"),
        ("email", email),
        ("password", "another-pw"),
        ("date_of_birth", "1992-12-09"),
        ("mobile", "0301-1111111"),
        ("address", "2 Compiler Court"),
        ("country_id", "1"),
        ("state_id", "1"),
        ("city_id", "1"),
    ] {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    (format!("multipart/form-data; boundary={boundary}"), body)
}

#[tokio::test]
async fn login_distinguishes_roles_and_fills_cart_count() {
    let (state, app) = spawn_app().await;
    seed_user(&state, "ada@example.com").await;

    // Bootstrap admin is seeded by the migrations.
    let (status, cookie, json) = login(&app, "superadmin@ecommerce.com", "password").await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie.is_some());
    assert_eq!(json["role"], "Admin");

    let (status, cookie, json) = login(&app, "ada@example.com", "secret-pw").await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie.is_some());
    assert_eq!(json["role"], "User");
    assert_eq!(json["cart_count"], 0);

    let (status, _, _) = login(&app, "ada@example.com", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_email_registration_is_rejected() {
    let (state, app) = spawn_app().await;
    seed_user(&state, "grace@example.com").await;

    let (content_type, body) = multipart_registration("grace@example.com");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register-user")
                .header("Content-Type", content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn duplicate_email_with_padding_is_rejected() {
    let (state, app) = spawn_app().await;
    seed_user(&state, "grace@example.com").await;

    let (content_type, body) = multipart_registration("  grace@example.com  ");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register-user")
                .header("Content-Type", content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn fresh_registration_succeeds_and_can_log_in() {
    let (_, app) = spawn_app().await;

    let (content_type, body) = multipart_registration("grace@example.com");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register-user")
                .header("Content-Type", content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let (status, _, json) = login(&app, "grace@example.com", "another-pw").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["role"], "User");
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let (state, app) = spawn_app().await;
    seed_user(&state, "ada@example.com").await;

    let (_, cookie, _) = login(&app, "ada@example.com", "secret-pw").await;
    let cookie = cookie.expect("session cookie");

    let (status, _) = json_request(&app, "POST", "/api/auth/logout", &cookie, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = json_request(&app, "GET", "/api/orders/mine", &cookie, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn adding_to_cart_decrements_stock_and_never_oversells() {
    let (state, app) = spawn_app().await;
    seed_user(&state, "ada@example.com").await;
    let product_id = seed_product(&state, "Mug", "10.00", 5).await;

    let (_, cookie, _) = login(&app, "ada@example.com", "secret-pw").await;
    let cookie = cookie.expect("session cookie");

    let (status, json) = json_request(
        &app,
        "POST",
        "/api/cart/add",
        &cookie,
        Some(serde_json::json!({ "product_id": product_id, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Product successfully added to cart!");
    assert_eq!(json["cart_count"], 1);

    let product = state
        .store()
        .get_product(&product_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.stock, 3);

    // Merging past the remaining stock is rejected and changes nothing.
    let (status, json) = json_request(
        &app,
        "POST",
        "/api/cart/add",
        &cookie,
        Some(serde_json::json!({ "product_id": product_id, "quantity": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Insufficient stock.");

    let (status, json) = json_request(
        &app,
        "POST",
        "/api/cart/add",
        &cookie,
        Some(serde_json::json!({ "product_id": product_id, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Not enough stock to add more of this item.");

    let product = state
        .store()
        .get_product(&product_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.stock, 3);
}

#[tokio::test]
async fn invalid_coupon_rejects_the_add_without_touching_stock() {
    let (state, app) = spawn_app().await;
    seed_user(&state, "ada@example.com").await;
    let product_id = seed_product(&state, "Mug", "10.00", 5).await;

    let (_, cookie, _) = login(&app, "ada@example.com", "secret-pw").await;
    let cookie = cookie.expect("session cookie");

    let (status, json) = json_request(
        &app,
        "POST",
        "/api/cart/add",
        &cookie,
        Some(serde_json::json!({
            "product_id": product_id,
            "quantity": 1,
            "coupon_code": "BOGUS99"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid or expired coupon code.");

    let product = state
        .store()
        .get_product(&product_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.stock, 5);

    let (status, json) = json_request(
        &app,
        "POST",
        "/api/cart/add",
        &cookie,
        Some(serde_json::json!({
            "product_id": product_id,
            "quantity": 1,
            "coupon_code": "save10"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["discount_message"], "Coupon applied! 10% discount.");
}

#[tokio::test]
async fn cart_checkout_totals_and_empties_the_cart() {
    let (state, app) = spawn_app().await;
    let user_id = seed_user(&state, "ada@example.com").await;
    let product_id = seed_product(&state, "Mug", "10.00", 5).await;

    let (_, cookie, _) = login(&app, "ada@example.com", "secret-pw").await;
    let cookie = cookie.expect("session cookie");

    // Empty cart cannot be checked out and creates no order.
    let (status, json) = json_request(&app, "POST", "/api/orders/cart-buy", &cookie, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Cart is empty.");
    let orders = state.store().list_orders_for_user(&user_id).await.unwrap();
    assert!(orders.is_empty());

    let (status, _) = json_request(
        &app,
        "POST",
        "/api/cart/add",
        &cookie,
        Some(serde_json::json!({ "product_id": product_id, "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = json_request(&app, "POST", "/api/orders/cart-buy", &cookie, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Order placed successfully!");

    let orders = state.store().list_orders_for_user(&user_id).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total_amount, "30.00".parse::<Decimal>().unwrap());

    let cart = state.store().list_cart_for_user(&user_id).await.unwrap();
    assert!(cart.is_empty());

    let (status, json) = json_request(&app, "GET", "/api/orders/mine", &cookie, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn direct_buy_takes_one_unit_and_snapshots_the_price() {
    let (state, app) = spawn_app().await;
    seed_user(&state, "ada@example.com").await;
    let product_id = seed_product(&state, "Mug", "12.50", 1).await;

    let (_, cookie, _) = login(&app, "ada@example.com", "secret-pw").await;
    let cookie = cookie.expect("session cookie");

    let (status, json) = json_request(
        &app,
        "POST",
        "/api/orders/buy",
        &cookie,
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Order placed successfully!");
    let redirect = json["redirect_url"].as_str().expect("redirect url");
    assert!(redirect.starts_with("/api/orders/Ord"));

    let product = state
        .store()
        .get_product(&product_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.stock, 0);

    // The last unit is gone; a second buy is rejected.
    let (status, json) = json_request(
        &app,
        "POST",
        "/api/orders/buy",
        &cookie,
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Product is out of stock.");
}

#[tokio::test]
async fn invoice_download_renders_and_missing_order_redirects() {
    let (state, app) = spawn_app().await;
    seed_user(&state, "ada@example.com").await;
    let product_id = seed_product(&state, "Mug", "10.00", 5).await;

    let (_, cookie, _) = login(&app, "ada@example.com", "secret-pw").await;
    let cookie = cookie.expect("session cookie");

    let (status, _) = json_request(
        &app,
        "POST",
        "/api/cart/add",
        &cookie,
        Some(serde_json::json!({ "product_id": product_id, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = json_request(&app, "POST", "/api/orders/cart-buy", &cookie, None).await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/orders/Ord0001/invoice")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("My ECommerce App"));
    assert!(text.contains("Invoice #Ord0001"));
    assert!(text.contains("Grand Total:"));
    assert!(text.contains("$22.00"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/orders/Ord9999/invoice")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/api/orders/mine")
    );
}

#[tokio::test]
async fn admin_order_list_searches_sorts_and_pages() {
    let (state, app) = spawn_app().await;
    seed_user(&state, "ada@example.com").await;
    let cheap = seed_product(&state, "Pen", "5.00", 5).await;
    let mid = seed_product(&state, "Mug", "10.00", 5).await;
    let dear = seed_product(&state, "Lamp", "25.00", 5).await;

    let (_, user_cookie, _) = login(&app, "ada@example.com", "secret-pw").await;
    let user_cookie = user_cookie.expect("session cookie");
    for product_id in [&cheap, &mid, &dear] {
        let (status, _) = json_request(
            &app,
            "POST",
            "/api/orders/buy",
            &user_cookie,
            Some(serde_json::json!({ "product_id": product_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, admin_cookie, _) = login(&app, "superadmin@ecommerce.com", "password").await;
    let admin_cookie = admin_cookie.expect("session cookie");

    // Default sort is ascending by date; page size 2 over 3 orders.
    let (status, json) =
        json_request(&app, "GET", "/api/orders?page_size=2", &admin_cookie, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["page"], 1);
    assert_eq!(json["total_items"], 3);
    assert_eq!(json["total_pages"], 2);
    assert_eq!(json["orders"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["orders"][0]["id"], "Ord0001");

    let (status, json) = json_request(
        &app,
        "GET",
        "/api/orders?page_size=2&page=2",
        &admin_cookie,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["orders"].as_array().map(Vec::len), Some(1));

    let (status, json) = json_request(
        &app,
        "GET",
        "/api/orders?sort=total_desc",
        &admin_cookie,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["orders"][0]["total_amount"], "25.00");

    let (status, json) = json_request(
        &app,
        "GET",
        "/api/orders?sort=total",
        &admin_cookie,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["orders"][0]["total_amount"], "5.00");

    let (status, json) = json_request(
        &app,
        "GET",
        "/api/orders?search=Ord0002",
        &admin_cookie,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_items"], 1);
    assert_eq!(json["orders"][0]["id"], "Ord0002");
}

#[tokio::test]
async fn admin_routes_reject_users_and_serve_admins() {
    let (state, app) = spawn_app().await;
    seed_user(&state, "ada@example.com").await;

    // Anonymous callers are turned away.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (_, user_cookie, _) = login(&app, "ada@example.com", "secret-pw").await;
    let user_cookie = user_cookie.expect("session cookie");
    let (status, _) = json_request(&app, "GET", "/api/users", &user_cookie, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, admin_cookie, _) = login(&app, "superadmin@ecommerce.com", "password").await;
    let admin_cookie = admin_cookie.expect("session cookie");
    let (status, json) = json_request(&app, "GET", "/api/users", &admin_cookie, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["users"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn health_probes_answer() {
    let (_, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health/live")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["database"], true);
}

#[tokio::test]
async fn cascading_location_lookups_follow_the_hierarchy() {
    let (_, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/locations/states?country_id=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let states: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let states = states.as_array().expect("states array");
    assert!(!states.is_empty());

    let state_id = states[0]["id"].as_i64().expect("state id");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/locations/cities?state_id={state_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let cities: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(!cities.as_array().expect("cities array").is_empty());
}
