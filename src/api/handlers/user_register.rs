use crate::auth::{Authenticator, PublicUser, RegisterOutcome};
use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct UserRegister {
    #[serde(default)]
    email: String,
    // Missing fields deserialize as empty so validation can answer with the
    // field-specific message instead of a rejection from the extractor.
    #[serde(default)]
    #[schema(value_type = String)]
    password: SecretString,
    #[serde(default)]
    name: String,
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    id: String,
    email: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<PublicUser> for RegisteredUser {
    fn from(user: PublicUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/user/register",
    request_body = UserRegister,
    responses (
        (status = 201, description = "Registration successful", body = [RegisteredUser], content_type = "application/json"),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "User with the specified email already exists"),
    ),
    tag = "register"
)]
#[instrument(skip(auth, payload))]
pub async fn register(
    auth: Extension<Arc<Authenticator>>,
    payload: Option<Json<UserRegister>>,
) -> impl IntoResponse {
    let request: UserRegister = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing payload" })),
            );
        }
    };

    match auth.register(&request.email, &request.password, &request.name) {
        Ok(RegisterOutcome::Created(user)) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "User created successfully",
                "user": RegisteredUser::from(user),
            })),
        ),

        Ok(RegisterOutcome::InvalidInput(reason)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": reason })))
        }

        Ok(RegisterOutcome::AlreadyExists) => {
            error!("User already exists");
            (
                StatusCode::CONFLICT,
                Json(json!({ "error": "User already exists" })),
            )
        }

        Err(err) => {
            // Full detail stays server-side; the response is opaque.
            error!("Registration failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
        }
    }
}
