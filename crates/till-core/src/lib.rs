//! # till-core: Pure Business Logic for Till POS
//!
//! This crate holds the business rules of the register as pure functions
//! and plain data types. It never touches a database, a file, or a socket.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Till POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Register (apps/register)                     │   │
//! │  │    login ──► lookup ──► add_to_cart ──► checkout ──► receipt    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │   rules   │  │   │
//! │  │   │   Sale    │  │  tender   │  │ CartLine  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ SaleRequest                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    till-db (SQLite store)                       │   │
//! │  │           commit_sale · adjust_quantity · authenticate          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, User, ActivityLogEntry, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The Cart Aggregator: optimistic stock checks before commit
//! - [`tender`] - Cash tender and change calculation
//! - [`sale_number`] - Human-readable sale/return number generation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::money::Money;
//!
//! let price = Money::from_cents(50000); // 500.00
//! let line_total = price * 7;
//! assert_eq!(line_total.to_string(), "3500.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod sale_number;
pub mod tender;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use sale_number::{DailySaleNumbers, SaleNumberGenerator};
pub use tender::CashTender;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single product in the cart.
///
/// ## Business Reason
/// Mirrors the quantity spinner on the register (1..=999) and stops
/// accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price accepted, in cents (10 billion major units).
///
/// A full cart at this price (100 lines × 999 units) still totals well
/// inside `i64` cents.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000_000;

/// Minimum password length for cashier accounts.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Low-stock threshold used when a product doesn't specify one.
pub const DEFAULT_MIN_QUANTITY: i64 = 5;
