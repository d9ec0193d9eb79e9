//! # Service Implementations
//!
//! - [`notifier`] - order notification mail (fire-and-forget SMTP)

pub mod notifier;
