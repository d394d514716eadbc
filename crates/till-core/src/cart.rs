//! # Cart Aggregator
//!
//! Holds the lines of the sale being rung up on one register.
//!
//! ## Two Stock Checks
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where stock is checked                             │
//! │                                                                         │
//! │  Scan / type product                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Cart::add_or_increment ← THIS MODULE                                  │
//! │  ├── quantity in 1..=999                                               │
//! │  ├── product active                                                    │
//! │  └── merged quantity ≤ quantity-on-hand snapshot  (optimistic)         │
//! │       │                                                                 │
//! │       ▼  Cart::to_sale_request                                         │
//! │  till-db SaleRepository::commit_sale                                   │
//! │  └── guarded decrement inside one transaction     (authoritative)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is reserved: the snapshot can be stale by the time the sale is
//! committed, and the store rejects the commit if it is.
//!
//! ## Example
//! ```rust
//! use till_core::{Cart, Product};
//! # use chrono::Utc;
//! # let now = Utc::now();
//! # let product = Product {
//! #     id: "p-1".into(), name: "Espresso Beans 1kg".into(), barcode: None,
//! #     category_id: None, description: None, price_cents: 50000,
//! #     cost_price_cents: None, quantity: 10, min_quantity: 5, is_active: true,
//! #     created_at: now, updated_at: now,
//! # };
//! let mut cart = Cart::new();
//! cart.add_or_increment(&product, 4).unwrap();
//! cart.add_or_increment(&product, 3).unwrap();
//! assert!(cart.add_or_increment(&product, 5).is_err());
//! assert_eq!(cart.total().to_string(), "3500.00");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{NewSale, NewSaleItem, PaymentMethod, Product, SaleRequest};
use crate::validation::{validate_cart_size, validate_price_cents, validate_quantity};
use crate::MAX_CART_ITEMS;

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart.
///
/// Name and unit price are frozen copies taken when the line was last
/// added to, so the cart displays consistently even if the product row
/// changes underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
            added_at: Utc::now(),
        }
    }

    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Quantity × unit price. Never stored, always recomputed.
    pub fn line_total(&self) -> Money {
        self.unit_price() * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart of a single cashier session.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product merges)
/// - Every line has quantity in 1..=999
/// - A line's quantity never exceeds the stock snapshot it was checked
///   against
/// - At most [`MAX_CART_ITEMS`] lines
/// - A failed operation leaves the cart exactly as it was
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
    created_at: DateTime<Utc>,
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a product or increases the quantity of its existing line.
    ///
    /// ## Behavior
    /// - `quantity` outside 1..=999 → `Validation` (checked first)
    /// - inactive product → `ProductInactive`
    /// - unit price outside 0..=[`MAX_PRICE_CENTS`](crate::MAX_PRICE_CENTS) → `Validation`
    /// - merged quantity above `product.quantity` → `InsufficientStock`
    /// - a merge re-prices the whole line at `product.price_cents`
    /// - a new line beyond [`MAX_CART_ITEMS`] → `CartTooLarge`
    pub fn add_or_increment(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if !product.is_active {
            return Err(CoreError::ProductInactive(product.name.clone()));
        }
        validate_price_cents(product.price_cents)?;

        match self.position(&product.id) {
            Some(index) => {
                let merged = self.lines[index].quantity + quantity;
                validate_quantity(merged)?;
                check_stock(product, merged)?;

                let line = &mut self.lines[index];
                line.quantity = merged;
                line.name = product.name.clone();
                line.unit_price_cents = product.price_cents;
            }
            None => {
                check_stock(product, quantity)?;
                validate_cart_size(self.lines.len())
                    .map_err(|_| CoreError::CartTooLarge { max: MAX_CART_ITEMS })?;

                self.lines.push(CartLine::from_product(product, quantity));
            }
        }

        Ok(())
    }

    /// Replaces the quantity of an existing line, with the same stock check.
    pub fn set_quantity(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let index = self
            .position(&product.id)
            .ok_or_else(|| CoreError::LineNotFound(product.id.clone()))?;

        check_stock(product, quantity)?;
        self.lines[index].quantity = quantity;

        Ok(())
    }

    /// Removes the line at `index`. No stock is touched.
    pub fn remove_line(&mut self, index: usize) -> Option<CartLine> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    /// Takes the `committed` lines of a finished sale out of the cart.
    ///
    /// Each committed quantity is subtracted from the line for the same
    /// product; lines that reach zero are dropped. Anything scanned after
    /// the sale was taken stays in the cart.
    pub fn remove_committed(&mut self, committed: &[CartLine]) {
        for sold in committed {
            if let Some(index) = self.position(&sold.product_id) {
                let line = &mut self.lines[index];
                line.quantity -= sold.quantity;
                if line.quantity <= 0 {
                    self.lines.remove(index);
                }
            }
        }

        if self.lines.is_empty() {
            self.clear();
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of line totals over the current lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_checkout_ready(&self) -> bool {
        !self.lines.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Builds the commit request for the store.
    ///
    /// ```text
    /// Cart lines (in order)          SaleRequest
    /// ─────────────────────          ──────────────────────────────
    /// P × 7 @ 500.00       ──────►   items[0] = P, 7, 50000, 350000
    ///                                sale.subtotal = sale.total = 350000
    ///                                tax = discount = 0, cash
    /// ```
    pub fn to_sale_request(
        &self,
        sale_number: impl Into<String>,
        user_id: impl Into<String>,
        customer_name: Option<String>,
    ) -> CoreResult<SaleRequest> {
        if !self.is_checkout_ready() {
            return Err(CoreError::EmptyCart);
        }

        let items: Vec<NewSaleItem> = self
            .lines
            .iter()
            .map(|line| NewSaleItem {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                total_price_cents: line.line_total().cents(),
            })
            .collect();

        let total = self.total().cents();

        Ok(SaleRequest {
            sale: NewSale {
                sale_number: sale_number.into(),
                user_id: user_id.into(),
                customer_name: customer_name.filter(|name| !name.trim().is_empty()),
                subtotal_cents: total,
                tax_cents: 0,
                discount_cents: 0,
                total_cents: total,
                payment_method: PaymentMethod::Cash,
            },
            items,
        })
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

fn check_stock(product: &Product, requested: i64) -> CoreResult<()> {
    if requested > product.quantity {
        return Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available: product.quantity,
            requested,
        });
    }
    Ok(())
}

// =============================================================================
// Totals Summary
// =============================================================================

/// Cart totals summary for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub total_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        let total = cart.total().cents();
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            subtotal_cents: total,
            total_cents: total,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
