use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use sitetrack_core::domain::user::{NewUser, DEFAULT_SIGNUP_ROLE};
use sitetrack_core::errors::ApplicationError;
use sitetrack_db::UserRepository;
use tracing::{info, warn};

use crate::app::AppState;
use crate::error::{ApiError, CorrelationId};

/// Placeholder bearer value returned to the mobile client; tokens are not
/// verified anywhere.
pub const LOGIN_TOKEN: &str = "fake_token_123";

pub fn routes() -> Router<AppState> {
    Router::new().route("/signup", post(signup)).route("/login", post(login))
}

fn default_role() -> String {
    DEFAULT_SIGNUP_ROLE.to_string()
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub phone_number: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
    pub user_id: i64,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub user_id: i64,
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id_text: String,
    pub name: String,
    pub role: String,
    pub token: &'static str,
}

pub async fn signup(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(request): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    if request.phone_number.trim().is_empty() {
        return Err(correlation_id
            .fail(ApplicationError::InvalidInput("phone_number is required".to_string())));
    }

    let existing = state
        .users
        .find_by_phone(&request.phone_number)
        .await
        .map_err(|error| correlation_id.fail(error))?;
    if existing.is_some() {
        return Err(correlation_id.fail(ApplicationError::InvalidInput(
            "Phone number already registered".to_string(),
        )));
    }

    let user = state
        .users
        .create(NewUser {
            name: request.name,
            phone_number: request.phone_number,
            password: request.password,
            role: request.role,
        })
        .await
        .map_err(|error| correlation_id.fail(error))?;

    info!(
        event_name = "records.user.created",
        correlation_id = %correlation_id.as_str(),
        user_id = user.id.0,
        role = %user.role,
        "user registered"
    );

    Ok(Json(SignupResponse { message: "User created successfully!", user_id: user.id.0 }))
}

pub async fn login(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .users
        .find_by_phone(&request.phone_number)
        .await
        .map_err(|error| correlation_id.fail(error))?
        .ok_or_else(|| {
            warn!(
                event_name = "records.user.login_rejected",
                correlation_id = %correlation_id.as_str(),
                reason = "unknown_phone",
                "login rejected"
            );
            correlation_id
                .fail(ApplicationError::Unauthorized("Phone number not registered".to_string()))
        })?;

    user.verify_password(&request.password).map_err(|error| {
        warn!(
            event_name = "records.user.login_rejected",
            correlation_id = %correlation_id.as_str(),
            user_id = user.id.0,
            reason = "wrong_password",
            "login rejected"
        );
        correlation_id.fail(error)
    })?;

    info!(
        event_name = "records.user.logged_in",
        correlation_id = %correlation_id.as_str(),
        user_id = user.id.0,
        "login succeeded"
    );

    Ok(Json(LoginResponse {
        status: "success",
        message: "Login successful",
        user_id: user.id.0,
        id: user.id.0,
        user_id_text: user.id.0.to_string(),
        name: user.name,
        role: user.role,
        token: LOGIN_TOKEN,
    }))
}
