//! # Register Commands
//!
//! Everything a UI shell can ask the register to do.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── auth.rs     ◄─── login, logout, current_user
//! ├── product.rs  ◄─── barcode lookup, search, low stock, adjust_stock
//! ├── cart.rs     ◄─── cart manipulation
//! └── sale.rs     ◄─── checkout and receipt
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI shell                                                               │
//! │  ────────                                                               │
//! │  let cart = add_to_cart(&reg.db, &reg.cart, &product_id, Some(2))       │
//! │      .await?;                                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Command                                                                │
//! │  ───────                                                                │
//! │  1. Takes only the state it needs, by reference                         │
//! │  2. Delegates rules to till-core, persistence to till-db                │
//! │  3. Returns a serializable response or an ApiError                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod cart;
pub mod product;
pub mod sale;
