//! Order Handlers
//!
//! The order submission workflow:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/orders                                                       │
//! │                                                                         │
//! │  1. Replay submitted lines through a fresh Cart                        │
//! │     (dedup per (product, variant); zero removes; negative declines)    │
//! │  2. Empty cart? ──► 400 "Order cannot be empty", no side effects       │
//! │  3. Recompute line totals from the SNAPSHOT prices in the lines        │
//! │     (never re-read the catalog — price changes after the cart was      │
//! │     filled must not change this order)                                 │
//! │  4. Persist order + lines in one transaction (status = pending)        │
//! │  5. Fire-and-forget the notification mail                              │
//! │  6. 201 with the order id; the client clears its cart on success       │
//! │     and keeps it on failure so the customer can retry                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{ensure_admin, CurrentUser};
use crate::error::ApiError;
use crate::state::AppState;
use mercato_core::validation::{validate_order_size, validate_price_cents, validate_quantity};
use mercato_core::{Account, Cart, CoreError, Money, Order, OrderLine, OrderStatus, PriceTier};
use mercato_db::repository::order::{generate_order_id, generate_order_line_id};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderRequest {
    pub items: Vec<OrderLineRequest>,
}

/// One cart line as submitted by the client. `unit_price_cents` is the
/// tier price snapshot taken when the line entered the client's cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: String,
    pub product_name: String,
    pub variant_id: String,
    pub size: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderResponse {
    pub order_id: String,
    pub total_cents: i64,
    pub item_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: String,
    pub company_name: String,
    pub address: String,
    pub contact_number: String,
    pub tier: PriceTier,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub created_at: String,
    pub items: Vec<OrderLineDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineDto {
    pub product_id: String,
    pub product_name: String,
    pub variant_id: String,
    pub size: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
}

impl From<OrderLine> for OrderLineDto {
    fn from(line: OrderLine) -> Self {
        OrderLineDto {
            product_id: line.product_id,
            product_name: line.product_name,
            variant_id: line.variant_id,
            size: line.size,
            unit_price_cents: line.unit_price_cents,
            quantity: line.quantity,
            line_total_cents: line.line_total_cents,
        }
    }
}

// =============================================================================
// Workflow
// =============================================================================

/// Builds the immutable order record from submitted lines.
///
/// Pure: no storage access. The submitted lines are replayed through the
/// cart engine, so duplicate `(product, variant)` pairs collapse to the
/// last edit, zero quantities drop out, and negative quantities are
/// declined. Totals come from the snapshot prices carried in the lines.
fn build_order(
    lines: &[OrderLineRequest],
    account: &Account,
) -> Result<(Order, Vec<OrderLine>), CoreError> {
    let mut cart = Cart::new();
    for line in lines {
        if line.quantity > 0 {
            validate_quantity(line.quantity)?;
            validate_price_cents(line.unit_price_cents)?;
        }
        cart.set_quantity(
            &line.product_id,
            &line.product_name,
            &line.variant_id,
            &line.size,
            Money::from_cents(line.unit_price_cents),
            line.quantity,
        );
    }

    if cart.is_empty() {
        return Err(CoreError::EmptyOrder);
    }
    validate_order_size(cart.item_count())?;

    let order_id = generate_order_id();
    let order_lines: Vec<OrderLine> = cart
        .items()
        .iter()
        .map(|item| OrderLine {
            id: generate_order_line_id(),
            order_id: order_id.clone(),
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            variant_id: item.variant_id.clone(),
            size: item.size.clone(),
            unit_price_cents: item.unit_price_cents,
            quantity: item.quantity,
            line_total_cents: item.line_total_cents(),
        })
        .collect();

    let order = Order {
        id: order_id,
        user_id: account.id.clone(),
        company_name: account.company_name.clone(),
        address: account.address.clone().unwrap_or_default(),
        contact_number: account.contact_number.clone().unwrap_or_default(),
        tier: account.tier,
        status: OrderStatus::Pending,
        total_cents: cart.total().cents(),
        created_at: Utc::now(),
    };

    Ok((order, order_lines))
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/orders - submit an order (any authenticated tier-holder)
pub async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<SubmitOrderRequest>,
) -> Result<(StatusCode, Json<SubmitOrderResponse>), ApiError> {
    // The profile denormalized onto the order comes from the accounts
    // table, not the token: a deleted account cannot submit.
    let account = state
        .db
        .accounts()
        .get_by_id(&user.id)
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;

    let (order, lines) = build_order(&req.items, &account)?;

    state.db.orders().insert(&order, &lines).await?;

    info!(
        order_id = %order.id,
        user_id = %account.id,
        username = %user.username,
        tier = %user.tier,
        total = %order.total_cents,
        items = lines.len(),
        "Order submitted"
    );

    // Notification is fire-and-forget: the order is already durable, and
    // a dead relay must not fail or stall the confirmation.
    if let Some(notifier) = state.notifier.clone() {
        let customer_email = account.email.clone();
        let order_for_mail = order.clone();
        let lines_for_mail = lines.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier
                .send_order_submitted(&order_for_mail, &lines_for_mail, customer_email.as_deref())
                .await
            {
                warn!(order_id = %order_for_mail.id, error = %e, "Order notification failed");
            }
        });
    }

    Ok((
        StatusCode::CREATED,
        Json(SubmitOrderResponse {
            order_id: order.id,
            total_cents: order.total_cents,
            item_count: lines.len(),
        }),
    ))
}

/// GET /api/orders - list submitted orders, newest first (admin)
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<OrderDto>>, ApiError> {
    ensure_admin(&user)?;

    let orders = state.db.orders().list_with_lines().await?;

    let dtos = orders
        .into_iter()
        .map(|(order, lines)| OrderDto {
            id: order.id,
            company_name: order.company_name,
            address: order.address,
            contact_number: order.contact_number,
            tier: order.tier,
            status: order.status,
            total_cents: order.total_cents,
            created_at: order.created_at.to_rfc3339(),
            items: lines.into_iter().map(OrderLineDto::from).collect(),
        })
        .collect();

    Ok(Json(dtos))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            id: "u-1".to_string(),
            username: "trattoria".to_string(),
            password_hash: String::new(),
            tier: PriceTier::B,
            company_name: "Trattoria Roma".to_string(),
            address: Some("Via Appia 12".to_string()),
            contact_number: None,
            email: Some("orders@trattoria.it".to_string()),
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    fn line(product: &str, variant: &str, cents: i64, qty: i64) -> OrderLineRequest {
        OrderLineRequest {
            product_id: product.to_string(),
            product_name: format!("Product {}", product),
            variant_id: variant.to_string(),
            size: "1kg".to_string(),
            unit_price_cents: cents,
            quantity: qty,
        }
    }

    #[test]
    fn test_build_order_totals() {
        let lines = vec![line("p1", "v1", 1050, 2), line("p2", "v1", 300, 1)];
        let (order, order_lines) = build_order(&lines, &account()).unwrap();

        assert_eq!(order.total_cents, 2400); // €24.00
        assert_eq!(order_lines.len(), 2);
        assert_eq!(order_lines[0].line_total_cents, 2100);
        assert_eq!(order_lines[1].line_total_cents, 300);
        assert_eq!(order.status, OrderStatus::Pending);
        // Profile denormalized from the account
        assert_eq!(order.company_name, "Trattoria Roma");
        assert_eq!(order.address, "Via Appia 12");
        assert_eq!(order.contact_number, "");
        assert_eq!(order.tier, PriceTier::B);
    }

    #[test]
    fn test_empty_order_rejected() {
        let err = build_order(&[], &account()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyOrder));
    }

    #[test]
    fn test_all_zero_quantities_is_empty() {
        let lines = vec![line("p1", "v1", 1050, 0), line("p2", "v1", 300, 0)];
        let err = build_order(&lines, &account()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyOrder));
    }

    #[test]
    fn test_duplicate_pairs_collapse_to_last_edit() {
        let lines = vec![
            line("p1", "v1", 1050, 2),
            line("p1", "v1", 1050, 5), // same pair, later edit wins
        ];
        let (order, order_lines) = build_order(&lines, &account()).unwrap();

        assert_eq!(order_lines.len(), 1);
        assert_eq!(order_lines[0].quantity, 5);
        assert_eq!(order.total_cents, 5250);
    }

    #[test]
    fn test_negative_quantity_declined_not_error() {
        let lines = vec![line("p1", "v1", 1050, 2), line("p2", "v1", 300, -4)];
        let (order, order_lines) = build_order(&lines, &account()).unwrap();

        // The negative line is declined; the rest of the order stands
        assert_eq!(order_lines.len(), 1);
        assert_eq!(order.total_cents, 2100);
    }

    #[test]
    fn test_negative_price_rejected() {
        let lines = vec![line("p1", "v1", -100, 2)];
        let err = build_order(&lines, &account()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_oversized_quantity_rejected() {
        let lines = vec![line("p1", "v1", 100, 1000)];
        let err = build_order(&lines, &account()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_snapshot_price_used_not_catalog() {
        // The submitted snapshot (old price) is authoritative even if the
        // catalog price changed meanwhile; build_order never consults a
        // catalog at all.
        let lines = vec![line("p1", "v1", 1050, 2)];
        let (order, order_lines) = build_order(&lines, &account()).unwrap();

        assert_eq!(order_lines[0].unit_price_cents, 1050);
        assert_eq!(order.total_cents, 2100);
    }
}
