//! # Validation Module
//!
//! Input validation utilities for Till POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Cart (till-core::cart)                                       │
//! │  ├── Quantity range, optimistic stock snapshot                         │
//! │  └── Immediate cashier feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Store entry points (till-db)                                 │
//! │  └── THIS MODULE: request validation before any SQL runs               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE constraints (sale_number, username, barcode)               │
//! │  ├── CHECK (quantity >= 0)                                             │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::validation::{validate_quantity, validate_username};
//!
//! validate_username("amina").unwrap();
//! validate_quantity(5).unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::SaleRequest;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name (1-200 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required("name", name, 200)
}

/// Validates a barcode.
///
/// ## Rules
/// - 1 to 50 characters
/// - Letters, digits and hyphens only (covers EAN/UPC and in-store codes)
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_barcode;
///
/// assert!(validate_barcode("6130000000017").is_ok());
/// assert!(validate_barcode("has space").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    required("barcode", barcode, 50)?;

    if !barcode
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters, numbers, and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates a username (1-50 characters, no whitespace).
pub fn validate_username(username: &str) -> ValidationResult<()> {
    required("username", username, 50)?;

    if username.trim().chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must not contain spaces".to_string(),
        });
    }

    Ok(())
}

pub fn validate_full_name(full_name: &str) -> ValidationResult<()> {
    required("full name", full_name, 100)
}

/// Passwords must be at least [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

/// Validates a sale or return number.
///
/// ## Rules
/// - 1 to 64 characters
/// - Uppercase letters, digits and hyphens (`SALE-20260131-1A2B3C4D`)
pub fn validate_document_number(field: &str, number: &str) -> ValidationResult<()> {
    required(field, number, 64)?;

    if !number
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only uppercase letters, numbers, and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query (may be empty, max 100 characters).
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// Cashier enters quantity: 5
///      │
///      ▼
/// validate_quantity(5) ← THIS FUNCTION
///      │
///      ├── qty <= 0?  → Error: "quantity must be positive"
///      ├── qty > 999? → Error: "quantity must be between 1 and 999"
///      └── OK → stock check against the product snapshot
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Stock levels and thresholds are never negative.
pub fn validate_stock_level(field: &str, quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size before a new line is appended.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

/// Validates a sale request before the store opens a transaction.
///
/// ## Rules
/// ```text
/// sale_number    well-formed document number
/// items          at least one
/// each line      quantity ≥ 1, unit price ≥ 0,
///                total_price = quantity × unit_price
/// header         subtotal = Σ line totals, tax ≥ 0, discount ≥ 0,
///                total = subtotal + tax − discount
/// ```
pub fn validate_sale_request(request: &SaleRequest) -> ValidationResult<()> {
    let sale = &request.sale;

    validate_document_number("sale_number", &sale.sale_number)?;

    if sale.user_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "user_id".to_string(),
        });
    }

    if request.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    let mut subtotal = Money::zero();
    for item in &request.items {
        if item.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
        validate_price_cents(item.unit_price_cents)?;

        let expected = Money::from_cents(item.unit_price_cents)
            .checked_multiply_quantity(item.quantity)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "line total".to_string(),
                min: 0,
                max: i64::MAX,
            })?;
        if expected.cents() != item.total_price_cents {
            return Err(ValidationError::Mismatch {
                field: "line total".to_string(),
                expected: expected.cents(),
                actual: item.total_price_cents,
            });
        }
        subtotal = subtotal
            .checked_add(expected)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "subtotal".to_string(),
                min: 0,
                max: i64::MAX,
            })?;
    }

    if subtotal.cents() != sale.subtotal_cents {
        return Err(ValidationError::Mismatch {
            field: "subtotal".to_string(),
            expected: subtotal.cents(),
            actual: sale.subtotal_cents,
        });
    }

    if sale.tax_cents < 0 || sale.discount_cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "tax/discount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    let total = sale
        .subtotal_cents
        .checked_add(sale.tax_cents)
        .and_then(|v| v.checked_sub(sale.discount_cents))
        .ok_or_else(|| ValidationError::OutOfRange {
            field: "total".to_string(),
            min: 0,
            max: i64::MAX,
        })?;
    if total != sale.total_cents {
        return Err(ValidationError::Mismatch {
            field: "total".to_string(),
            expected: total,
            actual: sale.total_cents,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewSale, NewSaleItem, PaymentMethod};

    fn request(lines: &[(i64, i64)]) -> SaleRequest {
        let items: Vec<NewSaleItem> = lines
            .iter()
            .enumerate()
            .map(|(i, (qty, unit))| NewSaleItem {
                product_id: format!("p-{}", i),
                quantity: *qty,
                unit_price_cents: *unit,
                total_price_cents: qty * unit,
            })
            .collect();
        let subtotal: i64 = items.iter().map(|i| i.total_price_cents).sum();

        SaleRequest {
            sale: NewSale {
                sale_number: "SALE-20260131-1A2B3C4D".to_string(),
                user_id: "u-1".to_string(),
                customer_name: None,
                subtotal_cents: subtotal,
                tax_cents: 0,
                discount_cents: 0,
                total_cents: subtotal,
                payment_method: PaymentMethod::Cash,
            },
            items,
        }
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("6130000000017").is_ok());
        assert!(validate_barcode("INSTORE-42").is_ok());
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("has space").is_err());
        assert!(validate_barcode(&"1".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_username_and_password() {
        assert!(validate_username("amina").is_ok());
        assert!(validate_username("   ").is_err());
        assert!(validate_username("two words").is_err());

        assert!(validate_password("admin123").is_ok());
        assert!(matches!(
            validate_password("12345"),
            Err(ValidationError::TooShort { min: 6, .. })
        ));
        assert!(validate_password("").is_err());
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
    fn test_validate_document_number() {
        assert!(validate_document_number("sale_number", "SALE-20260131-1A2B3C4D").is_ok());
        assert!(validate_document_number("sale_number", "").is_err());
        assert!(validate_document_number("sale_number", "sale-lowercase").is_err());
    }

    #[test]
    fn test_validate_sale_request_accepts_consistent_totals() {
        assert!(validate_sale_request(&request(&[(7, 50000), (2, 150)])).is_ok());
    }

    #[test]
    fn test_validate_sale_request_rejects_bad_input() {
        let mut empty = request(&[(1, 100)]);
        empty.items.clear();
        empty.sale.subtotal_cents = 0;
        empty.sale.total_cents = 0;
        assert!(matches!(
            validate_sale_request(&empty),
            Err(ValidationError::Required { .. })
        ));

        let mut zero_qty = request(&[(1, 100)]);
        zero_qty.items[0].quantity = 0;
        assert!(matches!(
            validate_sale_request(&zero_qty),
            Err(ValidationError::MustBePositive { .. })
        ));

        let mut bad_line = request(&[(2, 100)]);
        bad_line.items[0].total_price_cents = 150;
        assert!(matches!(
            validate_sale_request(&bad_line),
            Err(ValidationError::Mismatch { .. })
        ));

        let mut bad_total = request(&[(2, 100)]);
        bad_total.sale.total_cents = 999;
        assert!(matches!(
            validate_sale_request(&bad_total),
            Err(ValidationError::Mismatch { .. })
        ));
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());

        assert!(validate_price_cents(-1).is_err());
        assert!(matches!(
            validate_price_cents(MAX_PRICE_CENTS + 1),
            Err(ValidationError::OutOfRange { max: MAX_PRICE_CENTS, .. })
        ));
        assert!(validate_price_cents(i64::MAX / 2).is_err());
    }

    #[test]
    fn test_validate_sale_request_rejects_overflowing_totals() {
        let mut huge_tax = request(&[(1, 100)]);
        huge_tax.sale.tax_cents = i64::MAX;
        huge_tax.sale.total_cents = i64::MAX;
        assert!(matches!(
            validate_sale_request(&huge_tax),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "total"
        ));

        // Each line is within range on its own; their sum is not.
        let unit = MAX_PRICE_CENTS;
        let qty = i64::MAX / unit / 2 + 1;
        let mut items = request(&[(1, 100)]).items;
        items.clear();
        for i in 0..2 {
            items.push(NewSaleItem {
                product_id: format!("p-{}", i),
                quantity: qty,
                unit_price_cents: unit,
                total_price_cents: qty * unit,
            });
        }
        let mut wide = request(&[(1, 100)]);
        wide.items = items;
        wide.sale.subtotal_cents = i64::MAX;
        wide.sale.total_cents = i64::MAX;
        assert!(matches!(
            validate_sale_request(&wide),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "subtotal"
        ));
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
