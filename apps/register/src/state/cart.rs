//! # Cart State
//!
//! The cart of the current cashier session.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI Action               Command                  Cart Change           │
//! │  ─────────               ───────                  ───────────           │
//! │                                                                         │
//! │  Scan / click product ──► add_to_cart() ────────► add_or_increment     │
//! │  Change quantity ───────► set_cart_quantity() ──► set_quantity         │
//! │  Remove line ───────────► remove_cart_line() ───► remove_line          │
//! │  Cancel sale ───────────► clear_cart() ─────────► clear                │
//! │  Pay ───────────────────► checkout() ───────────► remove_committed     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A panic inside a cart closure can't leave a half-applied change behind
//! (every `Cart` operation validates before it mutates), so a poisoned lock
//! is recovered rather than propagated.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use till_core::Cart;

#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        CartState::default()
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = cart_state.with_cart(|c| CartTotals::from(c));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        f(&self.lock())
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.add_or_increment(&product, 1))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        f(&mut self.lock())
    }

    /// A copy of the cart, for work that has to `.await` (checkout).
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use till_core::{CartTotals, Product};

    fn product(id: &str, price_cents: i64, quantity: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            barcode: None,
            category_id: None,
            description: None,
            price_cents,
            cost_price_cents: None,
            quantity,
            min_quantity: 5,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_mutations_are_shared_between_clones() {
        let state = CartState::new();
        let other = state.clone();

        state
            .with_cart_mut(|c| c.add_or_increment(&product("1", 999, 10), 2))
            .unwrap();

        let totals = other.with_cart(|c| CartTotals::from(c));
        assert_eq!(totals.line_count, 1);
        assert_eq!(totals.total_cents, 1998);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let state = CartState::new();
        state
            .with_cart_mut(|c| c.add_or_increment(&product("1", 500, 10), 1))
            .unwrap();

        let snapshot = state.snapshot();
        state.with_cart_mut(|c| c.clear());

        assert_eq!(snapshot.line_count(), 1);
        assert!(state.with_cart(|c| c.is_empty()));
    }

    #[test]
    fn test_survives_poisoned_lock() {
        let state = CartState::new();
        let poisoner = state.clone();

        let _ = std::thread::spawn(move || {
            poisoner.with_cart_mut(|_| panic!("boom"));
        })
        .join();

        state
            .with_cart_mut(|c| c.add_or_increment(&product("1", 500, 10), 1))
            .unwrap();
        assert_eq!(state.with_cart(|c| c.line_count()), 1);
    }
}
