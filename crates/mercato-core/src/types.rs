//! # Domain Types
//!
//! Core domain types used throughout Mercato.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Account      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  category_id    │   │  status         │   │  username       │       │
//! │  │  name, icon     │   │  total_cents    │   │  tier (A/B/C)   │       │
//! │  │  variants[]     │   │  lines[]        │   │  is_admin       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   PriceTier     │   │   TierPrices    │   │   OrderStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  A | B | C      │   │  a/b/c cents    │   │  Pending        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Price Selection
//! Every variant carries all three tier prices. Exactly one applies per
//! order line, chosen by the ordering account's tier via
//! [`TierPrices::price_for`]. The selected price becomes a snapshot on the
//! cart item and is never re-read from the catalog afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Price Tier
// =============================================================================

/// Wholesale price level assigned to an account.
///
/// ## Why Three Tiers?
/// Wholesale customers are grouped into three negotiated price levels.
/// The tier lives on the account and is read-only input to pricing:
/// the ordering flow never changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
pub enum PriceTier {
    A,
    B,
    C,
}

impl PriceTier {
    /// Returns the tier letter used in storage and mail bodies.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            PriceTier::A => "A",
            PriceTier::B => "B",
            PriceTier::C => "C",
        }
    }
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tier Prices
// =============================================================================

/// The three per-tier prices carried by a product variant.
///
/// All three are required and non-negative; there is no currency field
/// (single implicit currency).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPrices {
    /// Tier A price in cents.
    pub a_cents: i64,

    /// Tier B price in cents.
    pub b_cents: i64,

    /// Tier C price in cents.
    pub c_cents: i64,
}

impl TierPrices {
    /// Selects the price that applies to the given tier.
    ///
    /// ## Example
    /// ```rust
    /// use mercato_core::types::{PriceTier, TierPrices};
    ///
    /// let prices = TierPrices { a_cents: 1000, b_cents: 1100, c_cents: 1200 };
    /// assert_eq!(prices.price_for(PriceTier::B).cents(), 1100);
    /// ```
    #[inline]
    pub const fn price_for(&self, tier: PriceTier) -> Money {
        match tier {
            PriceTier::A => Money::from_cents(self.a_cents),
            PriceTier::B => Money::from_cents(self.b_cents),
            PriceTier::C => Money::from_cents(self.c_cents),
        }
    }

    /// Checks that all three prices are non-negative.
    #[inline]
    pub const fn all_non_negative(&self) -> bool {
        self.a_cents >= 0 && self.b_cents >= 0 && self.c_cents >= 0
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
///
/// Deleting a category cascades: its products and their variants are
/// removed in the same atomic operation (see the category repository).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    /// Unique identifier (UUID v4 or a human-chosen slug).
    pub id: String,

    /// Display name shown in the catalog.
    pub name: String,
}

// =============================================================================
// Product & Variant
// =============================================================================

/// A size/packaging option of a product, carrying its own tier price set.
///
/// Variants have no lifecycle of their own: they are created, replaced and
/// deleted together with their product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Size label shown to the customer ("5L", "25kg", ...).
    pub size: String,

    /// The three tier prices.
    pub prices: TierPrices,
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Category this product belongs to; must reference an existing
    /// category at write time.
    pub category_id: String,

    /// Icon URL, or empty when the product has none.
    pub icon: String,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,

    /// Owned variants; never empty at creation.
    pub variants: Vec<ProductVariant>,
}

// =============================================================================
// Account
// =============================================================================

/// A wholesale customer account (or an administrator).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Account {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login name; unique.
    pub username: String,

    /// Argon2 PHC-format password hash. Never serialized out of the
    /// storage layer unredacted: API DTOs strip this field.
    pub password_hash: String,

    /// Price tier this account orders at.
    pub tier: PriceTier,

    /// Company name, denormalized onto submitted orders.
    pub company_name: String,

    /// Delivery address.
    pub address: Option<String>,

    /// Contact phone number.
    pub contact_number: Option<String>,

    /// Contact email.
    pub email: Option<String>,

    /// Grants catalog mutation and user management.
    pub is_admin: bool,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of a submitted order.
///
/// `Pending` is the only status this system ever assigns; any further
/// transitions happen outside the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Submitted, awaiting handling by the administrator.
    Pending,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Order
// =============================================================================

/// A submitted order, immutable once created.
///
/// The submitting account's profile fields are denormalized onto the order
/// so that later account edits do not rewrite order history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub company_name: String,
    pub address: String,
    pub contact_number: String,
    pub tier: PriceTier,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item of a submitted order.
/// Uses snapshot pattern to freeze product data at time of submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at time of submission (frozen).
    pub product_name: String,
    pub variant_id: String,
    /// Size label at time of submission (frozen).
    pub size: String,
    /// Unit price in cents at time of submission (frozen).
    pub unit_price_cents: i64,
    /// Quantity ordered; always positive.
    pub quantity: i64,
    /// Line total (unit_price × quantity), recomputed at submission.
    pub line_total_cents: i64,
}

impl OrderLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_price_selection() {
        let prices = TierPrices {
            a_cents: 1000,
            b_cents: 1100,
            c_cents: 1200,
        };

        assert_eq!(prices.price_for(PriceTier::A).cents(), 1000);
        assert_eq!(prices.price_for(PriceTier::B).cents(), 1100);
        assert_eq!(prices.price_for(PriceTier::C).cents(), 1200);
    }

    #[test]
    fn test_tier_prices_non_negative() {
        let ok = TierPrices {
            a_cents: 0,
            b_cents: 50,
            c_cents: 100,
        };
        assert!(ok.all_non_negative());

        let bad = TierPrices {
            a_cents: 100,
            b_cents: -1,
            c_cents: 100,
        };
        assert!(!bad.all_non_negative());
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(PriceTier::A.to_string(), "A");
        assert_eq!(PriceTier::B.as_str(), "B");
        assert_eq!(PriceTier::C.as_str(), "C");
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }
}
