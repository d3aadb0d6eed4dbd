use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::services::UploadService;
use crate::state::SharedState;

pub mod auth;
mod cart;
mod categories;
mod error;
mod locations;
mod observability;
mod orders;
mod products;
mod profile;
mod types;
mod users;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub uploads: Arc<UploadService>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let config = shared.config.read().await.clone();

    let uploads = Arc::new(UploadService::new(config.uploads));

    Ok(Arc::new(AppState {
        shared,
        uploads,
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle).await
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (images_path, cors_origins, secure_cookies, session_idle_minutes) = {
        let config = state.config().read().await;
        (
            config.uploads.images_path.clone(),
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_idle_minutes,
        )
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_idle_minutes,
        )));

    let api_router = Router::new()
        .merge(public_routes())
        .merge(user_routes())
        .merge(admin_routes())
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .route("/metrics", get(observability::get_metrics))
        .route("/health/live", get(observability::health_live))
        .route("/health/ready", get(observability::health_ready))
        .nest_service("/images", tower_http::services::ServeDir::new(images_path))
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register-admin", post(auth::register_admin))
        .route("/auth/register-user", post(auth::register_user))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/locations/countries", get(locations::list_countries))
        .route("/locations/states", get(locations::list_states))
        .route("/locations/cities", get(locations::list_cities))
        .route("/products", get(products::list_products))
        .route("/products/{id}", get(products::get_product))
        .route("/categories", get(categories::list_categories))
        .route("/categories/{id}", get(categories::get_category))
}

fn user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cart/add", post(cart::add_to_cart))
        .route("/cart", get(cart::my_cart))
        .route("/orders/buy", post(orders::buy))
        .route("/orders/cart-buy", post(orders::cart_buy))
        .route("/orders/mine", get(orders::my_orders))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/invoice", get(orders::download_invoice))
        .route("/profile", get(profile::my_profile))
        .route("/profile", put(profile::update_my_profile))
        .route_layer(middleware::from_fn(auth::require_login))
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(orders::list_orders))
        .route("/orders/{id}", put(orders::update_order))
        .route("/orders/{id}", delete(orders::delete_order))
        .route("/order-items", get(orders::list_order_items))
        .route("/order-items/{id}", get(orders::get_order_item))
        .route("/order-items/{id}", put(orders::update_order_item))
        .route("/order-items/{id}", delete(orders::delete_order_item))
        .route("/cart-items", get(cart::list_cart_items))
        .route("/cart-items/{id}", get(cart::get_cart_item))
        .route("/cart-items/{id}", put(cart::update_cart_item))
        .route("/cart-items/{id}", delete(cart::delete_cart_item))
        .route("/products", post(products::create_product))
        .route("/products/{id}", put(products::update_product))
        .route("/products/{id}/stock", put(products::update_stock))
        .route("/products/{id}", delete(products::delete_product))
        .route("/categories", post(categories::create_category))
        .route("/categories/{id}", put(categories::update_category))
        .route("/categories/{id}", delete(categories::delete_category))
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", put(users::update_user))
        .route("/users/{id}", delete(users::delete_user))
        .route("/profile/admin", get(profile::admin_profile))
        .route("/profile/admin", put(profile::update_admin_profile))
        .route_layer(middleware::from_fn(auth::require_admin))
}
