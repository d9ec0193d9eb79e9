//! Order notification mail.
//!
//! When an order is persisted, the administrator gets a plain-text summary
//! by mail. Dispatch is fire-and-forget relative to persistence:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit_order handler                                                   │
//! │       │                                                                 │
//! │       ├── persist order (transaction) ──► failure ──► 500, no mail     │
//! │       │                                                                 │
//! │       ├── 201 Created returned to the customer                         │
//! │       │                                                                 │
//! │       └── tokio::spawn ──► notifier.send_order_submitted()             │
//! │                                 │                                       │
//! │                                 └── failure ──► warn! and swallow      │
//! │                                                                         │
//! │  A slow or dead relay can never stall or fail order confirmation.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::Error as SmtpError;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::config::MailConfig;
use mercato_core::{Money, Order, OrderLine};

/// Errors that can occur when sending the notification mail.
///
/// These never cross the order submission boundary: the caller logs and
/// swallows them.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Sends order summaries to the configured administrator address.
#[derive(Clone)]
pub struct OrderNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    admin_email: String,
}

impl OrderNotifier {
    /// Create a notifier from mail configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP transport cannot be constructed.
    pub fn new(config: &MailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(OrderNotifier {
            mailer,
            from_address: config.from_address.clone(),
            admin_email: config.admin_email.clone(),
        })
    }

    /// Send the order summary for a just-persisted order.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or the relay refuses
    /// it. Callers log and swallow — see the module docs.
    pub async fn send_order_submitted(
        &self,
        order: &Order,
        lines: &[OrderLine],
        customer_email: Option<&str>,
    ) -> Result<(), NotifyError> {
        let subject = format!("New order from {}", order.company_name);
        let body = format_order_mail(order, lines, customer_email);

        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| NotifyError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(self
                .admin_email
                .parse()
                .map_err(|_| NotifyError::InvalidAddress(self.admin_email.clone()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.mailer.send(email).await?;

        info!(order_id = %order.id, to = %self.admin_email, "Order notification sent");
        Ok(())
    }
}

/// Formats the plain-text order summary.
///
/// One line per order line: product name, size, quantity and line total,
/// preceded by the customer's contact block.
fn format_order_mail(order: &Order, lines: &[OrderLine], customer_email: Option<&str>) -> String {
    let summary = lines
        .iter()
        .map(|line| {
            format!(
                "{} ({}) - Quantity: {} - Price: {}",
                line.product_name,
                line.size,
                line.quantity,
                line.line_total()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Order ID: {}\n\
         \n\
         Company Details:\n\
         Company Name: {}\n\
         Address: {}\n\
         Contact Number: {}\n\
         Email: {}\n\
         Tier: {}\n\
         \n\
         Order Summary:\n\
         {}\n\
         \n\
         Total: {}\n",
        order.id,
        order.company_name,
        or_na(&order.address),
        or_na(&order.contact_number),
        customer_email.unwrap_or("N/A"),
        order.tier,
        summary,
        Money::from_cents(order.total_cents),
    )
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mercato_core::{OrderStatus, PriceTier};

    fn sample_order() -> (Order, Vec<OrderLine>) {
        let order = Order {
            id: "o-1".to_string(),
            user_id: "u-1".to_string(),
            company_name: "Trattoria Roma".to_string(),
            address: "Via Appia 12".to_string(),
            contact_number: String::new(),
            tier: PriceTier::B,
            status: OrderStatus::Pending,
            total_cents: 2400,
            created_at: Utc::now(),
        };
        let lines = vec![
            OrderLine {
                id: "l-1".to_string(),
                order_id: "o-1".to_string(),
                product_id: "p-1".to_string(),
                product_name: "Olive Oil".to_string(),
                variant_id: "v-1".to_string(),
                size: "5L".to_string(),
                unit_price_cents: 1050,
                quantity: 2,
                line_total_cents: 2100,
            },
            OrderLine {
                id: "l-2".to_string(),
                order_id: "o-1".to_string(),
                product_id: "p-2".to_string(),
                product_name: "Flour".to_string(),
                variant_id: "v-2".to_string(),
                size: "25kg".to_string(),
                unit_price_cents: 300,
                quantity: 1,
                line_total_cents: 300,
            },
        ];
        (order, lines)
    }

    #[test]
    fn test_mail_body_contains_lines_and_total() {
        let (order, lines) = sample_order();
        let body = format_order_mail(&order, &lines, Some("orders@trattoria.it"));

        assert!(body.contains("Order ID: o-1"));
        assert!(body.contains("Company Name: Trattoria Roma"));
        assert!(body.contains("Olive Oil (5L) - Quantity: 2 - Price: €21.00"));
        assert!(body.contains("Flour (25kg) - Quantity: 1 - Price: €3.00"));
        assert!(body.contains("Total: €24.00"));
        assert!(body.contains("Email: orders@trattoria.it"));
    }

    #[test]
    fn test_mail_body_falls_back_to_na() {
        let (order, lines) = sample_order();
        let body = format_order_mail(&order, &lines, None);

        // Empty contact number and missing email render as N/A
        assert!(body.contains("Contact Number: N/A"));
        assert!(body.contains("Email: N/A"));
        assert!(body.contains("Address: Via Appia 12"));
    }
}
