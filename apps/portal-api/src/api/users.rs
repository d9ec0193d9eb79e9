//! User Management Handlers (admin only)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::auth::UserInfo;
use crate::auth::{ensure_admin, hash_password, CurrentUser};
use crate::error::ApiError;
use crate::state::AppState;
use mercato_core::validation::{validate_name, validate_password, validate_username};
use mercato_core::{Account, PriceTier};
use mercato_db::repository::account::generate_account_id;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub tier: PriceTier,
    pub company_name: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: String,
}

/// GET /api/users - list all accounts (admin)
///
/// Password hashes are stripped by the DTO conversion.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<UserInfo>>, ApiError> {
    ensure_admin(&user)?;

    let accounts = state.db.accounts().list().await?;
    Ok(Json(accounts.into_iter().map(UserInfo::from).collect()))
}

/// POST /api/users - create an account (admin)
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    ensure_admin(&user)?;

    validate_username(&req.username)?;
    validate_password(&req.password)?;
    validate_name("companyName", &req.company_name)?;

    let account = Account {
        id: generate_account_id(),
        username: req.username.trim().to_string(),
        password_hash: hash_password(&req.password)?,
        tier: req.tier,
        company_name: req.company_name.trim().to_string(),
        address: req.address,
        contact_number: req.contact_number,
        email: req.email,
        is_admin: req.is_admin,
        created_at: Utc::now(),
    };

    state.db.accounts().insert(&account).await?;

    info!(
        id = %account.id,
        username = %account.username,
        tier = %account.tier,
        "Account created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: account.id }),
    ))
}

/// DELETE /api/users/{id} - delete an account (admin)
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ensure_admin(&user)?;

    state.db.accounts().delete(&id).await?;

    info!(id = %id, "Account deleted");

    Ok(StatusCode::NO_CONTENT)
}
