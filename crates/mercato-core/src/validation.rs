//! # Validation Module
//!
//! Input validation utilities for the Mercato portal.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Portal client                                                │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: API handler (Rust)                                           │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::TierPrices;
use crate::{MAX_LINE_QUANTITY, MAX_ORDER_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required name field (product, category, company).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
///
/// ## Example
/// ```rust
/// use mercato_core::validation::validate_name;
///
/// assert!(validate_name("name", "Extra Virgin Olive Oil").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a login username.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 3 and 50 characters
/// - Must contain only alphanumerics, dots, hyphens, underscores, `@`
///   (usernames double as email addresses for some customers)
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }

    if username.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | '@'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, and . - _ @".to_string(),
        });
    }

    Ok(())
}

/// Validates a plaintext password before hashing.
///
/// ## Rules
/// - At least 8 characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.len() < 8 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
///
/// ## Note
/// Zero and negative quantities never reach this check in the ordering
/// flow: the cart engine drops zeros and declines negatives before lines
/// are validated for submission.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (promotional items)
///
/// ## Example
/// ```rust
/// use mercato_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());  // €10.99
/// assert!(validate_price_cents(0).is_ok());     // Free item
/// assert!(validate_price_cents(-100).is_err()); // Invalid
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Variant Validators
// =============================================================================

/// A variant as submitted by the admin panel, before ids are assigned.
#[derive(Debug, Clone)]
pub struct VariantInput {
    pub size: String,
    pub prices: TierPrices,
}

/// Validates the variant set of a product create/update request.
///
/// ## Rules
/// - At least one variant (a product's variant list is never empty)
/// - Every variant has a non-empty size label
/// - Every variant has three non-negative prices
pub fn validate_variants(variants: &[VariantInput]) -> ValidationResult<()> {
    if variants.is_empty() {
        return Err(ValidationError::Empty {
            field: "variants".to_string(),
        });
    }

    for variant in variants {
        if variant.size.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "variant size".to_string(),
            });
        }

        if !variant.prices.all_non_negative() {
            return Err(ValidationError::MustBeNonNegative {
                field: "variant price".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates order size (number of distinct lines).
///
/// ## Rules
/// - Must not exceed MAX_ORDER_LINES (100)
pub fn validate_order_size(line_count: usize) -> ValidationResult<()> {
    if line_count > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "order lines".to_string(),
            min: 0,
            max: MAX_ORDER_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Id Validators
// =============================================================================

/// Validates an entity id.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 64 characters (UUIDs and category slugs both fit)
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Extra Virgin Olive Oil 5L").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("trattoria-roma").is_ok());
        assert!(validate_username("orders@trattoria.it").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(60)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("long-enough").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_variants() {
        let ok = vec![VariantInput {
            size: "5L".to_string(),
            prices: TierPrices {
                a_cents: 1000,
                b_cents: 1100,
                c_cents: 1200,
            },
        }];
        assert!(validate_variants(&ok).is_ok());

        // Empty variant set is rejected
        assert!(validate_variants(&[]).is_err());

        // Blank size is rejected
        let blank_size = vec![VariantInput {
            size: "  ".to_string(),
            prices: TierPrices {
                a_cents: 100,
                b_cents: 100,
                c_cents: 100,
            },
        }];
        assert!(validate_variants(&blank_size).is_err());

        // Negative price is rejected
        let negative = vec![VariantInput {
            size: "1kg".to_string(),
            prices: TierPrices {
                a_cents: 100,
                b_cents: -1,
                c_cents: 100,
            },
        }];
        assert!(validate_variants(&negative).is_err());
    }

    #[test]
    fn test_validate_order_size() {
        assert!(validate_order_size(0).is_ok());
        assert!(validate_order_size(100).is_ok());
        assert!(validate_order_size(101).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_id("id", "drinks").is_ok());
        assert!(validate_id("id", "").is_err());
        assert!(validate_id("id", &"x".repeat(100)).is_err());
    }
}
