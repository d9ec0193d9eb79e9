//! JWT authentication module.
//!
//! Handles token generation and validation, argon2 password hashing, and
//! the bearer-token middleware that guards the protected routes.
//!
//! ## Request Authentication Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  POST /api/login {username, password}                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  verify argon2 hash ──► issue JWT {sub, tier, is_admin, exp}           │
//! │                                                                         │
//! │  Any protected request                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  require_auth middleware                                               │
//! │       ├── no/invalid Authorization header ──► 401                      │
//! │       ├── expired/invalid token ───────────► 401                       │
//! │       └── valid ──► CurrentUser injected into request extensions       │
//! │                                                                         │
//! │  Admin-only handlers additionally call ensure_admin() ──► 403          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{Request, State};
use axum::http::{header, Method};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use mercato_core::{Account, PriceTier};

// =============================================================================
// Claims & Token Manager
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account id)
    pub sub: String,

    /// Login name
    pub username: String,

    /// Price tier the account orders at
    pub tier: PriceTier,

    /// Administrator flag
    pub is_admin: bool,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    /// Generate a token for an authenticated account.
    pub fn generate_token(&self, account: &Account) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: account.id.clone(),
            username: account.username.clone(),
            tier: account.tier,
            is_admin: account.is_admin,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::auth(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a plaintext password with argon2 (PHC string output).
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    use argon2::{
        password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
        Argon2,
    };

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored argon2 hash.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ApiError> {
    use argon2::{
        password_hash::{PasswordHash, PasswordVerifier},
        Argon2,
    };

    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| ApiError::internal(format!("Stored hash is invalid: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

// =============================================================================
// Current User
// =============================================================================

/// The authenticated principal, injected into request extensions by
/// [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub tier: PriceTier,
    pub is_admin: bool,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        CurrentUser {
            id: claims.sub,
            username: claims.username,
            tier: claims.tier,
            is_admin: claims.is_admin,
        }
    }
}

/// Returns Forbidden unless the user carries the admin flag.
///
/// Admin checks live in the handlers (not a separate middleware) so each
/// admin operation states its requirement explicitly.
pub fn ensure_admin(user: &CurrentUser) -> Result<(), ApiError> {
    if !user.is_admin {
        return Err(ApiError::forbidden("Admin access required"));
    }
    Ok(())
}

// =============================================================================
// Middleware
// =============================================================================

/// Paths reachable without a token.
///
/// The catalog read endpoints are public: customers see the product list
/// before logging in. Everything else requires a bearer token.
fn is_public_route(method: &Method, path: &str) -> bool {
    if method == Method::OPTIONS {
        // CORS preflight
        return true;
    }

    if method == Method::POST && path == "/api/login" {
        return true;
    }

    method == Method::GET && matches!(path, "/api/categories" | "/api/products")
}

/// Authentication middleware - requires a valid bearer token.
///
/// Extracts and validates the JWT from `Authorization: Bearer <token>`.
/// On success the [`CurrentUser`] is injected into request extensions
/// (`req.extensions_mut().insert(user)`).
///
/// ## Error Handling
///
/// | Error | HTTP status |
/// |------|------------|
/// | No Authorization header | 401 |
/// | Malformed header | 401 |
/// | Invalid/expired token | 401 |
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();

    if is_public_route(req.method(), &path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header_value) => extract_bearer_token(header_value)
            .ok_or_else(|| ApiError::auth("Invalid authorization header"))?,
        None => {
            tracing::warn!(path = %path, "Request without authorization header");
            return Err(ApiError::auth("No token provided"));
        }
    };

    match state.jwt.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Token validation failed");
            Err(e)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_account(is_admin: bool) -> Account {
        Account {
            id: "u-1".to_string(),
            username: "trattoria".to_string(),
            password_hash: String::new(),
            tier: PriceTier::B,
            company_name: "Trattoria Roma".to_string(),
            address: None,
            contact_number: None,
            email: None,
            is_admin,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);

        let token = manager.generate_token(&sample_account(false)).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.username, "trattoria");
        assert_eq!(claims.tier, PriceTier::B);
        assert!(!claims.is_admin);
    }

    #[test]
    fn test_admin_flag_carried_in_claims() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);

        let token = manager.generate_token(&sample_account(true)).unwrap();
        let claims = manager.validate_token(&token).unwrap();
        assert!(claims.is_admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);
        let other = JwtManager::new("other-secret".to_string(), 3600);

        let token = manager.generate_token(&sample_account(false)).unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token(""), None);
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("correct horse battery").unwrap();

        // PHC string format
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_ensure_admin() {
        let admin = CurrentUser {
            id: "a".to_string(),
            username: "admin".to_string(),
            tier: PriceTier::A,
            is_admin: true,
        };
        let customer = CurrentUser {
            is_admin: false,
            ..admin.clone()
        };

        assert!(ensure_admin(&admin).is_ok());
        assert!(ensure_admin(&customer).is_err());
    }

    #[test]
    fn test_public_routes() {
        assert!(is_public_route(&Method::POST, "/api/login"));
        assert!(is_public_route(&Method::GET, "/api/categories"));
        assert!(is_public_route(&Method::GET, "/api/products"));

        assert!(!is_public_route(&Method::POST, "/api/categories"));
        assert!(!is_public_route(&Method::POST, "/api/products"));
        assert!(!is_public_route(&Method::GET, "/api/orders"));
        assert!(!is_public_route(&Method::POST, "/api/orders"));
        assert!(!is_public_route(&Method::GET, "/api/users"));
    }
}
