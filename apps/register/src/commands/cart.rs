//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│  Tender  │────►│ Committed│       │
//! │  │  Cart    │     │          │     │          │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                 │              │
//! │                   add_to_cart                       checkout           │
//! │                   set_cart_quantity                 (sale.rs)          │
//! │                   remove_cart_line                       │              │
//! │                        │                                 ▼              │
//! │                   clear_cart ─────────────────────► (back to empty)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock checks here run against a product row read just before the
//! change. The store checks again, authoritatively, at commit.

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{CartState, DbState};
use till_core::{Cart, CartLine, CartTotals, Product};

/// Cart response including lines and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            lines: cart.lines().to_vec(),
            totals: CartTotals::from(cart),
        }
    }
}

pub fn get_cart(cart: &CartState) -> CartResponse {
    cart.with_cart(|c| CartResponse::from(c))
}

/// Adds a product to the cart, or increases its line.
///
/// ## Behavior
/// - The product row is read fresh; its price and stock are the snapshot
///   the cart checks against
/// - A merge re-prices the whole line at the current price
/// - On any error the cart is unchanged
///
/// ## Arguments
/// * `product_id` - Product UUID to add
/// * `quantity` - Quantity to add (default: 1)
pub async fn add_to_cart(
    db: &DbState,
    cart: &CartState,
    product_id: &str,
    quantity: Option<i64>,
) -> Result<CartResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %product_id, quantity, "add_to_cart command");

    let product = fresh_product(db, product_id).await?;

    cart.with_cart_mut(|c| -> Result<CartResponse, ApiError> {
        c.add_or_increment(&product, quantity)?;
        Ok(CartResponse::from(&*c))
    })
}

/// Replaces the quantity of a line, checked against current stock.
pub async fn set_cart_quantity(
    db: &DbState,
    cart: &CartState,
    product_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, quantity, "set_cart_quantity command");

    let product = fresh_product(db, product_id).await?;

    cart.with_cart_mut(|c| -> Result<CartResponse, ApiError> {
        c.set_quantity(&product, quantity)?;
        Ok(CartResponse::from(&*c))
    })
}

/// Removes the line at `index` (display order).
pub fn remove_cart_line(cart: &CartState, index: usize) -> Result<CartResponse, ApiError> {
    debug!(index, "remove_cart_line command");

    cart.with_cart_mut(|c| match c.remove_line(index) {
        Some(_) => Ok(CartResponse::from(&*c)),
        None => Err(ApiError::cart(format!("No cart line at position {}", index))),
    })
}

pub fn clear_cart(cart: &CartState) -> CartResponse {
    debug!("clear_cart command");

    cart.with_cart_mut(|c| {
        c.clear();
        CartResponse::from(&*c)
    })
}

async fn fresh_product(db: &DbState, product_id: &str) -> Result<Product, ApiError> {
    db.inner()
        .products()
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", product_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{open_register, stock};

    #[tokio::test]
    async fn test_add_merges_and_totals() {
        let reg = open_register().await;
        let p = stock(&reg, "Olive Oil", 50000, 10).await;

        add_to_cart(&reg.db, &reg.cart, &p.id, Some(4)).await.unwrap();
        let response = add_to_cart(&reg.db, &reg.cart, &p.id, Some(3)).await.unwrap();

        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.lines[0].quantity, 7);
        assert_eq!(response.totals.total_cents, 350000);
        assert_eq!(get_cart(&reg.cart), response);
    }

    #[tokio::test]
    async fn test_overdraw_refused_and_cart_unchanged() {
        let reg = open_register().await;
        let p = stock(&reg, "Olive Oil", 50000, 10).await;
        add_to_cart(&reg.db, &reg.cart, &p.id, Some(7)).await.unwrap();

        let err = add_to_cart(&reg.db, &reg.cart, &p.id, Some(5)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(get_cart(&reg.cart).lines[0].quantity, 7);
    }

    #[tokio::test]
    async fn test_merge_uses_current_price() {
        let reg = open_register().await;
        let mut p = stock(&reg, "Olive Oil", 50000, 10).await;
        add_to_cart(&reg.db, &reg.cart, &p.id, Some(1)).await.unwrap();

        p.price_cents = 45000;
        reg.db.inner().products().update(&p).await.unwrap();

        let response = add_to_cart(&reg.db, &reg.cart, &p.id, None).await.unwrap();
        assert_eq!(response.lines[0].unit_price_cents, 45000);
        assert_eq!(response.totals.total_cents, 90000);
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_products() {
        let reg = open_register().await;
        let err = add_to_cart(&reg.db, &reg.cart, "missing", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let p = stock(&reg, "Old Stock", 100, 5).await;
        reg.db.inner().products().deactivate(&p.id).await.unwrap();
        let err = add_to_cart(&reg.db, &reg.cart, &p.id, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
        assert!(get_cart(&reg.cart).lines.is_empty());
    }

    #[tokio::test]
    async fn test_set_quantity_checks_stock() {
        let reg = open_register().await;
        let p = stock(&reg, "Dates", 1200, 6).await;

        let err = set_cart_quantity(&reg.db, &reg.cart, &p.id, 2).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        add_to_cart(&reg.db, &reg.cart, &p.id, Some(1)).await.unwrap();
        let response = set_cart_quantity(&reg.db, &reg.cart, &p.id, 6).await.unwrap();
        assert_eq!(response.totals.total_quantity, 6);

        let err = set_cart_quantity(&reg.db, &reg.cart, &p.id, 7).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err = set_cart_quantity(&reg.db, &reg.cart, &p.id, 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let reg = open_register().await;
        let a = stock(&reg, "Dates", 1200, 6).await;
        let b = stock(&reg, "Mint Tea", 350, 6).await;
        add_to_cart(&reg.db, &reg.cart, &a.id, None).await.unwrap();
        add_to_cart(&reg.db, &reg.cart, &b.id, Some(2)).await.unwrap();

        let response = remove_cart_line(&reg.cart, 0).unwrap();
        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.lines[0].product_id, b.id);
        assert_eq!(response.totals.total_cents, 700);

        let err = remove_cart_line(&reg.cart, 5).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        assert_eq!(clear_cart(&reg.cart).totals.line_count, 0);
    }
}
