use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use crate::db::ProfileUpdate;

use super::{
    ApiError, AppState, MessageBody, SessionAccount,
    auth::session_account,
    types::{AdminProfileDto, ProfileDto, UserDto},
};

#[derive(Deserialize)]
pub struct UpdateAdminProfileRequest {
    pub full_name: String,
}

/// GET /profile
/// The signed-in user's profile with resolved geography names.
pub async fn my_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ProfileDto>, ApiError> {
    let account = session_account(&session).await?;

    let row = state
        .store()
        .get_user_with_geography(&account.email)
        .await?
        .ok_or_else(|| ApiError::not_found("User", account.email))?;

    Ok(Json(ProfileDto {
        user: UserDto::from(row.user),
        country_name: row.country.map(|c| c.name),
        state_name: row.state.map(|s| s.name),
        city_name: row.city.map(|c| c.name),
    }))
}

#[derive(Default)]
struct ProfileForm {
    first_name: Option<String>,
    last_name: Option<String>,
    gender: Option<String>,
    date_of_birth: Option<String>,
    mobile: Option<String>,
    address: Option<String>,
    country_id: Option<i32>,
    state_id: Option<i32>,
    city_id: Option<i32>,
    image: Option<(String, Vec<u8>)>,
}

async fn read_profile_form(mut multipart: Multipart) -> Result<ProfileForm, ApiError> {
    let mut form = ProfileForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let filename = field.file_name().unwrap_or("upload.jpg").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(format!("Invalid image upload: {e}")))?;
            if !bytes.is_empty() {
                form.image = Some((filename, bytes.to_vec()));
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::validation(format!("Invalid field {name}: {e}")))?;

        match name.as_str() {
            "first_name" => form.first_name = Some(value),
            "last_name" => form.last_name = Some(value).filter(|v| !v.is_empty()),
            "gender" => form.gender = Some(value),
            "date_of_birth" => form.date_of_birth = Some(value),
            "mobile" => form.mobile = Some(value),
            "address" => form.address = Some(value),
            "country_id" => form.country_id = value.parse().ok(),
            "state_id" => form.state_id = value.parse().ok(),
            "city_id" => form.city_id = value.parse().ok(),
            _ => {}
        }
    }

    Ok(form)
}

/// PUT /profile (multipart)
/// Updates the signed-in user's profile. A new image replaces the stored
/// one; otherwise the existing image is kept.
pub async fn update_my_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    multipart: Multipart,
) -> Result<Json<MessageBody>, ApiError> {
    let account = session_account(&session).await?;

    let user = state
        .store()
        .get_user_by_email(&account.email)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &account.email))?;

    let form = read_profile_form(multipart).await?;

    let first_name = form
        .first_name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::validation("First name is required."))?;

    let image_path = match form.image {
        Some((filename, bytes)) => Some(state.uploads.save_image(&filename, &bytes).await?),
        None => None,
    };

    let update = ProfileUpdate {
        first_name: first_name.clone(),
        last_name: form.last_name,
        gender: form.gender.unwrap_or(user.gender),
        date_of_birth: form.date_of_birth.unwrap_or(user.date_of_birth),
        mobile: form.mobile.unwrap_or(user.mobile),
        address: form.address.unwrap_or(user.address),
        country_id: form.country_id.unwrap_or(user.country_id),
        state_id: form.state_id.unwrap_or(user.state_id),
        city_id: form.city_id.unwrap_or(user.city_id),
        image_path: image_path.clone(),
    };

    let updated = state.store().update_user_profile(&user.id, update).await?;
    if !updated {
        return Err(ApiError::not_found("User", &user.id));
    }

    // The session badge shows the name and image.
    let refreshed = SessionAccount {
        name: first_name,
        user_image: image_path.or(account.user_image.clone()),
        ..account
    };
    session
        .insert(SessionAccount::KEY, &refreshed)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    Ok(Json(MessageBody {
        message: "Profile updated.".to_string(),
    }))
}

/// GET /profile/admin
pub async fn admin_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<AdminProfileDto>, ApiError> {
    let account = session_account(&session).await?;

    let admin = state
        .store()
        .get_admin_by_email(&account.email)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin", account.email))?;

    Ok(Json(admin.into()))
}

/// PUT /profile/admin
pub async fn update_admin_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<UpdateAdminProfileRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    let account = session_account(&session).await?;

    if payload.full_name.trim().is_empty() {
        return Err(ApiError::validation("Full name is required."));
    }

    let updated = state
        .store()
        .update_admin_profile(&account.email, payload.full_name.trim())
        .await?;
    if !updated {
        return Err(ApiError::not_found("Admin", &account.email));
    }

    let refreshed = SessionAccount {
        name: payload.full_name.trim().to_string(),
        ..account
    };
    session
        .insert(SessionAccount::KEY, &refreshed)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    Ok(Json(MessageBody {
        message: "Profile updated.".to_string(),
    }))
}
