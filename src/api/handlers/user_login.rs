use crate::auth::{AuthOutcome, Authenticator};
use axum::{
    Json,
    extract::Extension,
    http::{StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct UserLogin {
    #[serde(default)]
    email: String,
    #[serde(default)]
    #[schema(value_type = String)]
    password: SecretString,
}

/// Minimal identity handed to the session framework on success.
#[derive(ToSchema, Serialize, Debug)]
pub struct Identity {
    id: String,
    email: String,
    name: String,
}

#[utoipa::path(
    post,
    path = "/user/login",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Credentials verified", body = [Identity], content_type = "application/json"),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid email or password"),
        (status = 429, description = "Too many failed attempts; retry after the lockout window"),
    ),
    tag = "login"
)]
#[instrument(skip(auth, payload))]
pub async fn login(
    auth: Extension<Arc<Authenticator>>,
    payload: Option<Json<UserLogin>>,
) -> Response {
    let request: UserLogin = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing payload" })),
            )
                .into_response();
        }
    };

    if request.email.is_empty() || request.password.expose_secret().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Email and password are required" })),
        )
            .into_response();
    }

    match auth.authenticate(&request.email, &request.password) {
        Ok(AuthOutcome::Success(user)) => (
            StatusCode::OK,
            Json(Identity {
                id: user.id,
                email: user.email,
                name: user.name,
            }),
        )
            .into_response(),

        Ok(AuthOutcome::RateLimited { minutes }) => (
            StatusCode::TOO_MANY_REQUESTS,
            [(RETRY_AFTER, (minutes * 60).to_string())],
            Json(json!({
                "error": format!(
                    "Too many failed attempts. Please try again in {minutes} minutes."
                ),
            })),
        )
            .into_response(),

        Ok(AuthOutcome::InvalidCredentials) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid email or password" })),
        )
            .into_response(),

        Err(err) => {
            error!("Login failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}
