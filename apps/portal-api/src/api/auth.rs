//! Authentication Handlers
//!
//! Handles login and token issuing.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::verify_password;
use crate::error::ApiError;
use crate::state::AppState;
use mercato_core::{Account, PriceTier};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Account profile as exposed to clients; never carries the hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub tier: PriceTier,
    pub company_name: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub is_admin: bool,
}

impl From<Account> for UserInfo {
    fn from(account: Account) -> Self {
        UserInfo {
            id: account.id,
            username: account.username,
            tier: account.tier,
            company_name: account.company_name,
            address: account.address,
            contact_number: account.contact_number,
            email: account.email,
            is_admin: account.is_admin,
        }
    }
}

/// Login handler
///
/// Authenticates account credentials and returns a JWT token.
///
/// Unknown username and wrong password both produce the same generic
/// 401 so the endpoint cannot be used for username enumeration.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let account = state.db.accounts().get_by_username(&req.username).await?;

    let account = match account {
        Some(account) => {
            if !verify_password(&req.password, &account.password_hash)? {
                warn!(username = %req.username, "Login failed - invalid credentials");
                return Err(ApiError::invalid_credentials());
            }
            account
        }
        None => {
            warn!(username = %req.username, "Login failed - user not found");
            return Err(ApiError::invalid_credentials());
        }
    };

    let token = state.jwt.generate_token(&account)?;

    info!(
        user_id = %account.id,
        username = %account.username,
        tier = %account.tier,
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        token,
        user: UserInfo::from(account),
    }))
}
