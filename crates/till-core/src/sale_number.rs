//! # Sale Numbers
//!
//! Human-readable document numbers printed on receipts.
//!
//! ```text
//! SALE-20260131-1A2B3C4D
//! ──── ──────── ────────
//!  │      │        └── first 8 hex digits of a fresh UUID v4, uppercase
//!  │      └── UTC date of the sale
//!  └── document prefix (RET for returns)
//! ```
//!
//! Uniqueness is enforced by the store (UNIQUE on `sales.sale_number`); a
//! collision surfaces as a `Conflict` and the register simply asks for a
//! new number.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of sale and return numbers.
///
/// The store never generates numbers itself; callers pass them in, so
/// tests can use fixed numbers.
pub trait SaleNumberGenerator: Send + Sync {
    fn next_sale_number(&self) -> String;
    fn next_return_number(&self) -> String;
}

/// Date-stamped numbers with a random suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailySaleNumbers;

impl DailySaleNumbers {
    pub fn new() -> Self {
        DailySaleNumbers
    }

    /// Formats a number for the given instant. Exposed for tests.
    pub fn format(prefix: &str, at: DateTime<Utc>, id: Uuid) -> String {
        let suffix: String = id.simple().to_string()[..8].to_uppercase();
        format!("{}-{}-{}", prefix, at.format("%Y%m%d"), suffix)
    }
}

impl SaleNumberGenerator for DailySaleNumbers {
    fn next_sale_number(&self) -> String {
        Self::format("SALE", Utc::now(), Uuid::new_v4())
    }

    fn next_return_number(&self) -> String {
        Self::format("RET", Utc::now(), Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_document_number;
    use chrono::TimeZone;

    #[test]
    fn test_format() {
        let at = Utc.with_ymd_and_hms(2026, 1, 31, 12, 0, 0).unwrap();
        let id = Uuid::parse_str("1a2b3c4d-0000-4000-8000-000000000000").unwrap();

        assert_eq!(
            DailySaleNumbers::format("SALE", at, id),
            "SALE-20260131-1A2B3C4D"
        );
    }

    #[test]
    fn test_generated_numbers_are_valid_and_distinct() {
        let numbers = DailySaleNumbers::new();
        let a = numbers.next_sale_number();
        let b = numbers.next_sale_number();

        assert!(a.starts_with("SALE-"));
        assert_ne!(a, b);
        assert!(validate_document_number("sale_number", &a).is_ok());
        assert!(numbers.next_return_number().starts_with("RET-"));
    }
}
