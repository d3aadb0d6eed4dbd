use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use crate::db::CartError;
use crate::services::discount_for_code;

use super::{
    ApiError, AppState, MessageBody,
    auth::{refresh_cart_count, session_account},
    types::{CartItemDto, CartView},
};

#[derive(Deserialize)]
pub struct AddCartRequest {
    pub product_id: String,
    pub quantity: i32,
    pub coupon_code: Option<String>,
}

#[derive(Serialize)]
pub struct AddCartResponse {
    pub message: String,
    pub cart_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_message: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

fn map_cart_error(err: CartError) -> ApiError {
    match err {
        CartError::ProductNotFound
        | CartError::InsufficientStock
        | CartError::MergeExceedsStock => ApiError::validation(err.to_string()),
        CartError::Db(e) => ApiError::DatabaseError(e.to_string()),
        CartError::Other(e) => ApiError::internal(e.to_string()),
    }
}

/// POST /cart/add
/// Adds a product to the signed-in user's cart, merging with an existing row
/// and decrementing stock. An invalid coupon rejects the request before any
/// state changes; a valid one only affects the message, never stored amounts.
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<AddCartRequest>,
) -> Result<Json<AddCartResponse>, ApiError> {
    let account = session_account(&session).await?;

    let user = state
        .store()
        .get_user_by_email(&account.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found."))?;

    if payload.quantity < 1 {
        return Err(ApiError::validation("Quantity must be at least 1."));
    }

    let discount_message = match payload.coupon_code.as_deref().filter(|c| !c.is_empty()) {
        Some(code) => match discount_for_code(code) {
            Some(percent) => Some(format!("Coupon applied! {percent}% discount.")),
            None => return Err(ApiError::validation("Invalid or expired coupon code.")),
        },
        None => None,
    };

    let cart_count = state
        .store()
        .add_to_cart(&user.id, &payload.product_id, payload.quantity)
        .await
        .map_err(map_cart_error)?;

    refresh_cart_count(&session, account, cart_count).await?;

    Ok(Json(AddCartResponse {
        message: "Product successfully added to cart!".to_string(),
        cart_count,
        discount_message,
    }))
}

/// GET /cart
/// The signed-in user's cart with line totals.
pub async fn my_cart(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<CartView>, ApiError> {
    let account = session_account(&session).await?;

    let user = state
        .store()
        .get_user_by_email(&account.email)
        .await?
        .ok_or_else(|| ApiError::not_found("User", account.email))?;

    let rows = state.store().list_cart_for_user(&user.id).await?;
    let items: Vec<CartItemDto> = rows
        .into_iter()
        .map(|(item, product)| CartItemDto::from_row(item, product))
        .collect();

    let cart_total = items
        .iter()
        .filter_map(|i| i.line_total)
        .sum::<Decimal>();

    Ok(Json(CartView { items, cart_total }))
}

// Admin surface over raw cart rows.

/// GET /cart-items
pub async fn list_cart_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CartItemDto>>, ApiError> {
    let rows = state.store().list_cart_items().await?;
    Ok(Json(
        rows.into_iter()
            .map(|(item, product)| CartItemDto::from_row(item, product))
            .collect(),
    ))
}

/// GET /cart-items/{id}
pub async fn get_cart_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CartItemDto>, ApiError> {
    let (item, product) = state
        .store()
        .get_cart_item(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cart item", &id))?;

    Ok(Json(CartItemDto::from_row(item, product)))
}

/// PUT /cart-items/{id}
/// Quantity overwrite. Stock is not adjusted here.
pub async fn update_cart_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    if payload.quantity < 1 {
        return Err(ApiError::validation("Quantity must be at least 1."));
    }

    let updated = state
        .store()
        .update_cart_quantity(&id, payload.quantity)
        .await?;
    if !updated {
        return Err(ApiError::not_found("Cart item", &id));
    }

    Ok(Json(MessageBody {
        message: "Cart item updated.".to_string(),
    }))
}

/// DELETE /cart-items/{id}
pub async fn delete_cart_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let deleted = state.store().delete_cart_item(&id).await?;
    if !deleted {
        return Err(ApiError::not_found("Cart item", &id));
    }

    Ok(Json(MessageBody {
        message: "Cart item removed.".to_string(),
    }))
}
