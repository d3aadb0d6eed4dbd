use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use crate::db::{OrderError, OrderSort};
use crate::services::render_invoice;

use super::{
    ApiError, AppState, MessageBody,
    auth::session_account,
    types::{BuyResponse, OrderDetailDto, OrderDto, OrderItemDto, OrderListResponse},
};

#[derive(Deserialize)]
pub struct BuyRequest {
    pub product_id: String,
}

#[derive(Deserialize)]
pub struct OrderListQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Deserialize)]
pub struct UpdateOrderRequest {
    pub user_id: String,
    pub order_date: String,
    pub total_amount: Decimal,
}

#[derive(Deserialize)]
pub struct UpdateOrderItemRequest {
    pub quantity: i32,
    pub unit_price: Decimal,
}

fn map_order_error(err: OrderError) -> ApiError {
    match err {
        OrderError::ProductNotFound => ApiError::NotFound(err.to_string()),
        OrderError::OutOfStock | OrderError::EmptyCart => ApiError::validation(err.to_string()),
        OrderError::Db(e) => ApiError::DatabaseError(e.to_string()),
        OrderError::Other(e) => ApiError::internal(e.to_string()),
    }
}

async fn session_user_id(
    state: &Arc<AppState>,
    session: &Session,
) -> Result<String, ApiError> {
    let account = session_account(session).await?;
    let user = state
        .store()
        .get_user_by_email(&account.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;
    Ok(user.id)
}

/// POST /orders/buy
/// One-click purchase of a single unit at the current price.
pub async fn buy(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<BuyRequest>,
) -> Result<Json<BuyResponse>, ApiError> {
    let user_id = session_user_id(&state, &session).await?;

    let order = state
        .store()
        .direct_buy(&user_id, &payload.product_id)
        .await
        .map_err(map_order_error)?;

    Ok(Json(BuyResponse {
        message: "Order placed successfully!".to_string(),
        redirect_url: format!("/api/orders/{}", order.id),
    }))
}

/// POST /orders/cart-buy
/// Checks out the whole cart in one transaction; a failure leaves the cart
/// and stock untouched.
pub async fn cart_buy(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<MessageBody>, ApiError> {
    let user_id = session_user_id(&state, &session).await?;

    state
        .store()
        .cart_checkout(&user_id)
        .await
        .map_err(map_order_error)?;

    let account = session_account(&session).await?;
    super::auth::refresh_cart_count(&session, account, 0).await?;

    Ok(Json(MessageBody {
        message: "Order placed successfully!".to_string(),
    }))
}

/// GET /orders?search=&sort=&page=&page_size=
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = match query.page_size {
        Some(size) if size > 0 => size,
        _ => {
            let config = state.shared.config().await;
            config.server.default_page_size
        }
    };
    let sort = OrderSort::parse(query.sort.as_deref());

    let (rows, total_pages, total_items) = state
        .store()
        .list_orders(query.search.as_deref(), sort, page, page_size)
        .await?;

    Ok(Json(OrderListResponse {
        orders: rows
            .into_iter()
            .map(|(order, user)| OrderDto::from_row(order, user))
            .collect(),
        page,
        total_pages,
        total_items,
    }))
}

/// GET /orders/mine
pub async fn my_orders(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<Vec<OrderDto>>, ApiError> {
    let user_id = session_user_id(&state, &session).await?;

    let rows = state.store().list_orders_for_user(&user_id).await?;
    Ok(Json(
        rows.into_iter()
            .map(|order| OrderDto::from_row(order, None))
            .collect(),
    ))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetailDto>, ApiError> {
    let graph = state
        .store()
        .get_order_graph(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &id))?;

    Ok(Json(OrderDetailDto {
        order: OrderDto::from_row(graph.order, graph.user),
        items: graph
            .items
            .into_iter()
            .map(|(item, product)| OrderItemDto::from_row(item, product))
            .collect(),
    }))
}

/// GET /orders/{id}/invoice
/// Invoice document download; a missing order logs a warning and redirects
/// back to the caller's order list.
pub async fn download_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Some(graph) = state.store().get_order_graph(&id).await? else {
        tracing::warn!(order_id = %id, "Invoice requested for missing order");
        return Ok(Redirect::to("/api/orders/mine").into_response());
    };

    let document = render_invoice(&graph);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        "text/plain; charset=utf-8".parse().map_err(|_| {
            ApiError::internal("Invalid content type header")
        })?,
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"Invoice_Order_{id}.txt\"")
            .parse()
            .map_err(|_| ApiError::internal("Invalid content disposition header"))?,
    );

    Ok((headers, document).into_response())
}

/// PUT /orders/{id}
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    let updated = state
        .store()
        .update_order(&id, &payload.user_id, &payload.order_date, payload.total_amount)
        .await?;
    if !updated {
        return Err(ApiError::not_found("Order", &id));
    }

    Ok(Json(MessageBody {
        message: "Order updated.".to_string(),
    }))
}

/// DELETE /orders/{id}
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let deleted = state.store().delete_order(&id).await?;
    if !deleted {
        return Err(ApiError::not_found("Order", &id));
    }

    Ok(Json(MessageBody {
        message: "Order deleted.".to_string(),
    }))
}

// Order item admin surface.

/// GET /order-items
pub async fn list_order_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OrderItemDto>>, ApiError> {
    let rows = state.store().list_order_items().await?;
    Ok(Json(
        rows.into_iter()
            .map(|(item, product)| OrderItemDto::from_row(item, product))
            .collect(),
    ))
}

/// GET /order-items/{id}
pub async fn get_order_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderItemDto>, ApiError> {
    let (item, product) = state
        .store()
        .get_order_item(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order item", &id))?;

    Ok(Json(OrderItemDto::from_row(item, product)))
}

/// PUT /order-items/{id}
pub async fn update_order_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateOrderItemRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    if payload.quantity < 1 {
        return Err(ApiError::validation("Quantity must be at least 1."));
    }

    let updated = state
        .store()
        .update_order_item(&id, payload.quantity, payload.unit_price)
        .await?;
    if !updated {
        return Err(ApiError::not_found("Order item", &id));
    }

    Ok(Json(MessageBody {
        message: "Order item updated.".to_string(),
    }))
}

/// DELETE /order-items/{id}
pub async fn delete_order_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let deleted = state.store().delete_order_item(&id).await?;
    if !deleted {
        return Err(ApiError::not_found("Order item", &id));
    }

    Ok(Json(MessageBody {
        message: "Order item deleted.".to_string(),
    }))
}
