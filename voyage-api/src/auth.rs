use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use voyage_core::User;

use crate::{error::AppError, middleware::auth::issue_token, state::AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GuestProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    user_id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/guest", post(login_guest))
}

/// POST /auth/guest
/// Registers a profile and returns a bearer token for it.
async fn login_guest(
    State(state): State<AppState>,
    WithRejection(Json(profile), _): WithRejection<Json<GuestProfile>, AppError>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let user = User::new(profile.first_name, profile.last_name, profile.email);
    state.user_repo.create_user(&user).await?;

    let token = issue_token(&state.auth, user.id)?;
    tracing::info!("Issued guest token for user {}", user.id);

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user_id: user.id })))
}
