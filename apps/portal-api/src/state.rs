//! Shared application state.
//!
//! One `AppState` is built at startup and cloned into every handler via
//! axum's `State` extractor. Everything inside is cheap to clone: the
//! database handle wraps a pool, the rest sit behind `Arc`.

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::config::PortalConfig;
use crate::services::notifier::OrderNotifier;
use mercato_db::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database handle (pooled).
    pub db: Database,

    /// Token issuing/validation.
    pub jwt: Arc<JwtManager>,

    /// Order notification mailer; None when no relay is configured.
    pub notifier: Option<Arc<OrderNotifier>>,
}

impl AppState {
    /// Builds the state from loaded configuration and an open database.
    pub fn new(db: Database, config: &PortalConfig, notifier: Option<OrderNotifier>) -> Self {
        let jwt = Arc::new(JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_lifetime_secs,
        ));

        AppState {
            db,
            jwt,
            notifier: notifier.map(Arc::new),
        }
    }
}
