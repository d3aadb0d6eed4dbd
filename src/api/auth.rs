use axum::{
    Json,
    extract::{Multipart, Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use crate::db::NewUser;
use crate::services::{hash_password, verify_password};

use super::{ApiError, AppState, MessageBody, SessionAccount, types::LoginResponse};

#[derive(Deserialize)]
pub struct RegisterAdminRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub access_id: String,
    pub access_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Gate for customer-facing routes: any signed-in account passes.
pub async fn require_login(
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    match session.get::<SessionAccount>(SessionAccount::KEY).await {
        Ok(Some(account)) => {
            tracing::Span::current().record("user_id", &account.email);
            Ok(next.run(request).await)
        }
        Ok(None) => Err(ApiError::unauthorized("User not logged in.")),
        Err(e) => Err(ApiError::internal(format!("Session error: {e}"))),
    }
}

/// Gate for management routes: only the `Admin` role passes.
pub async fn require_admin(
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    match session.get::<SessionAccount>(SessionAccount::KEY).await {
        Ok(Some(account)) if account.is_admin() => {
            tracing::Span::current().record("user_id", &account.email);
            Ok(next.run(request).await)
        }
        Ok(Some(_)) => Err(ApiError::Forbidden("Admin access required.".to_string())),
        Ok(None) => Err(ApiError::unauthorized("User not logged in.")),
        Err(e) => Err(ApiError::internal(format!("Session error: {e}"))),
    }
}

pub async fn session_account(session: &Session) -> Result<SessionAccount, ApiError> {
    session
        .get::<SessionAccount>(SessionAccount::KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::unauthorized("User not logged in."))
}

/// Cart mutations change the badge count the UI renders from the session, so
/// refresh it right after.
pub async fn refresh_cart_count(
    session: &Session,
    mut account: SessionAccount,
    cart_count: u64,
) -> Result<(), ApiError> {
    account.cart_count = cart_count;
    session
        .insert(SessionAccount::KEY, &account)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register-admin
/// Creates an admin account; guarded by the shared access credentials.
pub async fn register_admin(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterAdminRequest>,
) -> Result<(StatusCode, Json<MessageBody>), ApiError> {
    let config = state.shared.config().await;

    if payload.access_id != config.security.admin_access_id
        || payload.access_password != config.security.admin_access_password
    {
        return Err(ApiError::unauthorized("Invalid access credentials."));
    }

    let email = payload.email.trim();

    if payload.full_name.trim().is_empty() {
        return Err(ApiError::validation("Full name is required."));
    }
    if email.is_empty() {
        return Err(ApiError::validation("Email is required."));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required."));
    }

    if state.store().admin_email_exists(email).await? {
        return Err(ApiError::Conflict("Email is already registered.".to_string()));
    }

    let hash = hash_password(payload.password, Some(config.security.clone())).await?;
    state
        .store()
        .create_admin(payload.full_name.trim(), email, &hash)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageBody {
            message: "Admin registered successfully.".to_string(),
        }),
    ))
}

#[derive(Default)]
struct RegisterUserForm {
    first_name: Option<String>,
    last_name: Option<String>,
    gender: Option<String>,
    email: Option<String>,
    password: Option<String>,
    date_of_birth: Option<String>,
    mobile: Option<String>,
    address: Option<String>,
    country_id: Option<i32>,
    state_id: Option<i32>,
    city_id: Option<i32>,
    image: Option<(String, Vec<u8>)>,
}

async fn read_register_form(mut multipart: Multipart) -> Result<RegisterUserForm, ApiError> {
    let mut form = RegisterUserForm::default();

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
            "email" => form.email = Some(value),
            "password" => form.password = Some(value),
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

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::validation(format!("{field} is required.")))
}

/// POST /auth/register-user (multipart)
/// Creates a customer account with an optional profile image.
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<MessageBody>), ApiError> {
    let form = read_register_form(multipart).await?;

    let email = required(form.email, "Email")?.trim().to_string();
    let password = required(form.password, "Password")?;
    let first_name = required(form.first_name, "First name")?;
    let gender = required(form.gender, "Gender")?;
    let date_of_birth = required(form.date_of_birth, "Date of birth")?;
    let mobile = required(form.mobile, "Mobile")?;
    let address = required(form.address, "Address")?;
    let country_id = form
        .country_id
        .ok_or_else(|| ApiError::validation("Country is required."))?;
    let state_id = form
        .state_id
        .ok_or_else(|| ApiError::validation("State is required."))?;
    let city_id = form
        .city_id
        .ok_or_else(|| ApiError::validation("City is required."))?;

    if state.store().user_email_exists(&email).await? {
        return Err(ApiError::Conflict("Email is already registered.".to_string()));
    }

    let image_path = match form.image {
        Some((filename, bytes)) => Some(state.uploads.save_image(&filename, &bytes).await?),
        None => None,
    };

    let config = state.shared.config().await;
    let password_hash = hash_password(password, Some(config.security.clone())).await?;

    state
        .store()
        .create_user(NewUser {
            first_name,
            last_name: form.last_name,
            gender,
            email,
            password_hash,
            image_path,
            date_of_birth,
            mobile,
            address,
            country_id,
            state_id,
            city_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageBody {
            message: "User registered successfully.".to_string(),
        }),
    ))
}

/// POST /auth/login
/// Tries the admin table first, then users, and fills the session with the
/// account the UI renders from.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required."));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required."));
    }

    if let Some(admin) = state.store().get_admin_by_email(&payload.email).await?
        && verify_password(payload.password.clone(), admin.password_hash.clone()).await?
    {
        let account = SessionAccount {
            role: "Admin".to_string(),
            name: admin.full_name.clone(),
            email: admin.email,
            user_image: None,
            cart_count: 0,
        };
        session
            .insert(SessionAccount::KEY, &account)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

        return Ok(Json(LoginResponse {
            message: format!("Welcome {}, to Admin Dashboard.", admin.full_name),
            role: account.role,
            name: account.name,
            cart_count: 0,
        }));
    }

    if let Some(user) = state.store().get_user_by_email(&payload.email).await?
        && verify_password(payload.password, user.password_hash.clone()).await?
    {
        let cart_count = state.store().count_cart_for_user(&user.id).await?;
        let default_image = state.uploads.default_user_image();
        let account = SessionAccount {
            role: "User".to_string(),
            name: user.first_name.clone(),
            email: user.email,
            user_image: Some(user.image_path.unwrap_or(default_image)),
            cart_count,
        };
        session
            .insert(SessionAccount::KEY, &account)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

        return Ok(Json(LoginResponse {
            message: "Successfully Login".to_string(),
            role: account.role,
            name: account.name,
            cart_count,
        }));
    }

    Err(ApiError::unauthorized("Invalid Email or Password."))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = session.flush().await {
        tracing::warn!("Failed to flush session on logout: {e}");
    }
    (StatusCode::OK, Json(MessageBody {
        message: "Logged out.".to_string(),
    }))
}
