//! # Validation Module
//!
//! Input validation for catalog, registry and engine requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP (serde)                                                 │
//! │  └── Enum values, field types                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required/trimmed names, positive quantities                       │
//! │  └── Non-empty orders, non-negative prices                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── UNIQUE (sku, names, table_number, order_number)                   │
//! │  └── CHECK (stock_* >= 0)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::requests::OrderLineRequest;
use crate::MAX_ORDER_LINES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest explicit SKU accepted.
pub const MAX_EXPLICIT_SKU_LENGTH: usize = 50;

/// Longest name accepted for items, categories, locations and tables.
pub const MAX_NAME_LENGTH: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Trims a required text field and checks its length.
///
/// ## Example
/// ```rust
/// use venue_core::validation::validate_name;
///
/// assert_eq!(validate_name("name", "  Main Store ").unwrap(), "Main Store");
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(value.to_string())
}

/// Trims optional free text; blank becomes `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validates an explicit SKU. Blank means "no SKU".
pub fn validate_sku(sku: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(sku) = normalize_optional(sku) else {
        return Ok(None);
    };

    if sku.chars().count() > MAX_EXPLICIT_SKU_LENGTH {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_EXPLICIT_SKU_LENGTH,
        });
    }

    Ok(Some(sku))
}

/// Requires a non-blank identifier.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Quantities on order lines and transfers are strictly positive.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    validate_positive("quantity", quantity)
}

pub fn validate_positive(field: &str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Prices and absolute stock levels may be zero but never negative.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Order Validators
// =============================================================================

/// Checks the line list of a new order: non-empty, bounded, every line
/// names an item and a positive quantity.
pub fn validate_order_lines(lines: &[OrderLineRequest]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if lines.len() > MAX_ORDER_LINES {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_ORDER_LINES,
        });
    }

    for line in lines {
        validate_id("item_id", &line.item_id)?;
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(item_id: &str, quantity: i64) -> OrderLineRequest {
        OrderLineRequest {
            item_id: item_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("name", " Bar ").unwrap(), "Bar");
        assert!(matches!(
            validate_name("name", ""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_name("name", &"x".repeat(MAX_NAME_LENGTH + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_sku() {
        assert_eq!(validate_sku(Some(" GIN-750 ")).unwrap().as_deref(), Some("GIN-750"));
        assert_eq!(validate_sku(Some("   ")).unwrap(), None);
        assert_eq!(validate_sku(None).unwrap(), None);
        assert_eq!(validate_sku(Some(" GIN 750 ")).unwrap().as_deref(), Some("GIN 750"));
        assert!(matches!(
            validate_sku(Some(&"S".repeat(MAX_EXPLICIT_SKU_LENGTH + 1))),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_numeric() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-2).is_err());
        assert!(validate_non_negative("unit_cost_cents", 0).is_ok());
        assert!(validate_non_negative("unit_cost_cents", -1).is_err());
    }

    #[test]
    fn test_order_lines() {
        assert!(validate_order_lines(&[line("a", 2), line("b", 1)]).is_ok());
        assert!(validate_order_lines(&[]).is_err());
        assert!(validate_order_lines(&[line("a", 0)]).is_err());
        assert!(validate_order_lines(&[line("  ", 1)]).is_err());

        let many: Vec<_> = (0..=MAX_ORDER_LINES).map(|_| line("a", 1)).collect();
        assert!(matches!(
            validate_order_lines(&many),
            Err(ValidationError::TooMany { .. })
        ));
    }
}
