use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState, MessageBody, types::CategoryDto};

#[derive(Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

/// GET /categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryDto>>, ApiError> {
    let rows = state.store().list_categories().await?;
    Ok(Json(rows.into_iter().map(CategoryDto::from).collect()))
}

/// GET /categories/{id}
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryDto>, ApiError> {
    let category = state
        .store()
        .get_category(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", id))?;

    Ok(Json(category.into()))
}

/// POST /categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryDto>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Name is required."));
    }

    let category = state.store().create_category(payload.name.trim()).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// PUT /categories/{id}
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Name is required."));
    }

    let updated = state.store().update_category(id, payload.name.trim()).await?;
    if !updated {
        return Err(ApiError::not_found("Category", id));
    }

    Ok(Json(MessageBody {
        message: "Category updated.".to_string(),
    }))
}

/// DELETE /categories/{id}
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<MessageBody>, ApiError> {
    let deleted = state.store().delete_category(id).await?;
    if !deleted {
        return Err(ApiError::not_found("Category", id));
    }

    Ok(Json(MessageBody {
        message: "Category deleted.".to_string(),
    }))
}
