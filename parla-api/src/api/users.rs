//! Account registration, login, and profile endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use bcrypt::{hash, verify, DEFAULT_COST};
use serde::Deserialize;
use tracing::info;

use parla_common::db::models::UserProfile;

use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNameRequest {
    pub name: String,
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/users/:id", get(get_profile))
        .route("/api/users/:id/name", put(update_name))
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let name = request.name.trim();
    let email = request.email.trim();

    if name.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email, and password are required".to_string(),
        ));
    }

    if users::find_by_email(&state.db, email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash(&request.password, DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;

    let id = users::insert(&state.db, name, email, &password_hash).await?;
    info!("Registered user {} ({})", id, email);

    let profile = UserProfile {
        id,
        name: name.to_string(),
        email: email.to_string(),
        image_url: None,
    };

    Ok((StatusCode::CREATED, Json(profile)))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<UserProfile>> {
    let email = request.email.trim();

    let user = users::find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    // The seeded anonymous account has no hash and can never log in.
    if user.password_hash.is_empty() {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let matches = verify(&request.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(format!("Failed to verify password: {}", e)))?;

    if !matches {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    info!("User {} logged in", user.id);
    Ok(Json(user.profile()))
}

async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserProfile>> {
    let user = users::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No user with id {}", id)))?;

    Ok(Json(user.profile()))
}

async fn update_name(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateNameRequest>,
) -> ApiResult<Json<UserProfile>> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }

    if !users::update_name(&state.db, id, name).await? {
        return Err(ApiError::NotFound(format!("No user with id {}", id)));
    }

    let user = users::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No user with id {}", id)))?;

    Ok(Json(user.profile()))
}
