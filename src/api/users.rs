use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{ProfileUpdate, UserFilter};

use super::{ApiError, AppState, MessageBody, types::{UserDto, UserListResponse}};

#[derive(Deserialize)]
pub struct UserListQuery {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: Option<String>,
    pub gender: String,
    pub date_of_birth: String,
    pub mobile: String,
    pub address: String,
    pub country_id: i32,
    pub state_id: i32,
    pub city_id: i32,
}

/// GET /users?name=&gender=&page=&page_size=&sort_field=&sort_order=
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = match query.page_size {
        Some(size) if size > 0 => size,
        _ => {
            let config = state.shared.config().await;
            config.server.default_page_size
        }
    };

    let filter = UserFilter {
        name: query.name.filter(|n| !n.trim().is_empty()),
        gender: query.gender.filter(|g| !g.trim().is_empty()),
        sort_field: query.sort_field,
        sort_desc: query.sort_order.as_deref() == Some("desc"),
        page,
        page_size,
    };

    let (rows, total_pages) = state.store().list_users(&filter).await?;

    Ok(Json(UserListResponse {
        users: rows.into_iter().map(UserDto::from).collect(),
        page,
        total_pages,
    }))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state
        .store()
        .get_user_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &id))?;

    Ok(Json(user.into()))
}

/// PUT /users/{id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    if payload.first_name.trim().is_empty() {
        return Err(ApiError::validation("First name is required."));
    }

    let updated = state
        .store()
        .update_user_profile(
            &id,
            ProfileUpdate {
                first_name: payload.first_name,
                last_name: payload.last_name,
                gender: payload.gender,
                date_of_birth: payload.date_of_birth,
                mobile: payload.mobile,
                address: payload.address,
                country_id: payload.country_id,
                state_id: payload.state_id,
                city_id: payload.city_id,
                image_path: None,
            },
        )
        .await?;
    if !updated {
        return Err(ApiError::not_found("User", &id));
    }

    Ok(Json(MessageBody {
        message: "User updated.".to_string(),
    }))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let deleted = state.store().delete_user(&id).await?;
    if !deleted {
        return Err(ApiError::not_found("User", &id));
    }

    Ok(Json(MessageBody {
        message: "User deleted.".to_string(),
    }))
}
