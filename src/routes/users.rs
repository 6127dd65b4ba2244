// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: registration, login, token refresh.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError};

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::routes::extract::ValidatedJson;
use crate::services::token::{Identity, TokenError};
use crate::AppState;

/// Public account routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/refresh", post(refresh))
}

/// Account routes that require an access token.
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/users/me", get(me))
}

// ─── Registration ────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64))]
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 72))]
    pub password: String,
}

/// Login accepts a username or an email in the same field, so a username
/// must never look like an email.
pub fn validate_username(username: &str) -> std::result::Result<(), ValidationError> {
    if username.contains('@') {
        let mut error = ValidationError::new("username_format");
        error.message = Some("Username may not contain '@'".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: String,
}

async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let username = payload.username.as_str();
    let email = payload.email.as_str();

    let hasher = state.passwords.clone();
    let password = payload.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let user = state
        .db
        .register_user(username, email, &password_hash)
        .await
        .inspect_err(|e| {
            if matches!(e, AppError::Conflict(_)) {
                tracing::info!(username, "Registration rejected: username or email taken");
            }
        })?;

    tracing::info!(user_id = %user.id, username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered".to_string(),
            user_id: user.id,
        }),
    ))
}

// ─── Login ───────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email
    #[validate(length(min = 1, max = 254))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
    pub username: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let identifier = payload.username.as_str();

    let user = match state.db.find_user_by_username_or_email(identifier).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => {
            tracing::info!(identifier, "Login failed: unknown user");
            return Err(AppError::Unauthorized);
        }
        Err(e) => return Err(e),
    };

    let hasher = state.passwords.clone();
    let digest = user.password_hash.clone();
    let matched = tokio::task::spawn_blocking(move || hasher.verify(&payload.password, &digest))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    if !matched {
        tracing::info!(user_id = %user.id, "Login failed: wrong password");
        return Err(AppError::Unauthorized);
    }

    let identity = Identity {
        user_id: user.id,
        username: user.username,
    };
    let tokens = state.tokens.issue_pair(&identity).map_err(token_failure)?;

    tracing::info!(user_id = %identity.user_id, "User logged in");

    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user_id: identity.user_id,
        username: identity.username,
    }))
}

// ─── Refresh ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>> {
    let (identity, tokens) = state
        .tokens
        .refresh(payload.refresh_token.trim())
        .map_err(|e| match e {
            TokenError::Signing(_) => token_failure(e),
            other => {
                tracing::info!(error = %other, "Refresh token rejected");
                AppError::InvalidToken
            }
        })?;

    tracing::debug!(user_id = %identity.user_id, "Token pair refreshed");

    Ok(Json(RefreshResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

// ─── Current User ────────────────────────────────────────────

#[derive(Serialize)]
pub struct MeResponse {
    pub user_id: String,
    pub username: String,
}

async fn me(Extension(user): Extension<AuthUser>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: user.user_id,
        username: user.username,
    })
}

fn token_failure(err: TokenError) -> AppError {
    AppError::Internal(anyhow::anyhow!("Token generation failed: {}", err))
}
