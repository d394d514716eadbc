//! # Domain Types
//!
//! Core domain types used throughout Till POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  sale_id (FK)   │       │
//! │  │  barcode        │   │  sale_number    │   │  product_id(FK) │       │
//! │  │  price_cents    │   │  total_cents    │   │  quantity       │       │
//! │  │  quantity       │   │  payment_method │   │  unit_price     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │ ActivityLogEntry│   │     Return      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  username       │   │  user_id (FK)   │   │  return_number  │       │
//! │  │  role           │   │  action         │   │  sale_id (FK?)  │       │
//! │  │  password_hash  │   │  details        │   │  total_cents    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every persisted entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (username, barcode, sale_number, ...) - human-readable
//!
//! ## Write Models
//! `New*` structs describe what a caller hands to the store. The store
//! assigns ids and timestamps and returns the full entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Users
// =============================================================================

/// What a user is allowed to do at the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Cashier,
    StockManager,
}

impl Role {
    /// Restocking, corrections and returns are not cashier work.
    pub fn can_adjust_stock(&self) -> bool {
        matches!(self, Role::Admin | Role::StockManager)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Cashier => "cashier",
            Role::StockManager => "stock_manager",
        }
    }
}

/// A register account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    /// Argon2 PHC string. Never leaves the process.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub full_name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Input for creating a user. The password is plaintext here and is
/// hashed by the store before it is written.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub full_name: String,
    pub email: Option<String>,
    pub is_active: bool,
}

/// Profile edit. `password: None` keeps the current password.
#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdate {
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub password: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Barcode (EAN-13, UPC-A, etc.). Unique when present.
    pub barcode: Option<String>,

    pub category_id: Option<String>,

    pub description: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Cost in cents (for margin reports).
    pub cost_price_cents: Option<i64>,

    /// Quantity-on-hand. Never negative once a commit completes.
    pub quantity: i64,

    /// Low-stock threshold.
    pub min_quantity: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units could be sold from the current snapshot.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && quantity <= self.quantity
    }

    /// At or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub barcode: Option<String>,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub price_cents: i64,
    pub cost_price_cents: Option<i64>,
    pub quantity: i64,
    pub min_quantity: i64,
}

impl NewProduct {
    /// Minimal product with the default low-stock threshold.
    pub fn new(name: impl Into<String>, price_cents: i64, quantity: i64) -> Self {
        NewProduct {
            name: name.into(),
            barcode: None,
            category_id: None,
            description: None,
            price_cents,
            cost_price_cents: None,
            quantity,
            min_quantity: crate::DEFAULT_MIN_QUANTITY,
        }
    }

    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How a sale was paid. Only cash is taken at the register today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Mixed,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
    Refunded,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Completed
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub sale_number: String,
    /// Cashier who rang the sale.
    pub user_id: String,
    pub customer_name: Option<String>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item in a committed sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// quantity × unit_price_cents.
    pub total_price_cents: i64,
}

impl SaleItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// Sale header as submitted for commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSale {
    /// Caller-supplied, must be unique across all sales.
    pub sale_number: String,
    pub user_id: String,
    pub customer_name: Option<String>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
}

/// One line as submitted for commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSaleItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
}

/// Everything the store needs to commit one sale: the header and its lines
/// in cart order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRequest {
    pub sale: NewSale,
    pub items: Vec<NewSaleItem>,
}

/// One row of the sales report (sale joined with the cashier's name).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleReportRow {
    pub id: String,
    pub sale_number: String,
    pub user_id: String,
    pub cashier_name: String,
    pub customer_name: Option<String>,
    pub subtotal_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Returns
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Return {
    pub id: String,
    pub return_number: String,
    pub sale_id: Option<String>,
    pub user_id: String,
    pub reason: Option<String>,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// A product coming back onto the shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLine {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReturn {
    pub return_number: String,
    pub sale_id: Option<String>,
    pub user_id: String,
    pub reason: Option<String>,
    pub total_cents: i64,
    pub lines: Vec<ReturnLine>,
}

// =============================================================================
// Activity Log
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Login,
    Logout,
    SaleCompleted,
    StockAdjusted,
    ReturnRecorded,
}

/// Append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ActivityLogEntry {
    pub id: String,
    pub user_id: String,
    pub action: ActivityAction,
    pub details: String,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
