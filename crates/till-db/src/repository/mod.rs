//! # Repository Module
//!
//! Repository implementations for the Till POS store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Register command                                                      │
//! │       │                                                                 │
//! │       │  db.sales().commit_sale(&request)                              │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── commit_sale(&self, request)   one transaction                     │
//! │  ├── get_by_id(&self, id)                                              │
//! │  └── report(&self, from, to)                                           │
//! │       │                                                                 │
//! │       │  SQL (typed rows via sqlx::FromRow)                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository holds a clone of the pool; none of them holds state of
//! its own. Multi-statement writes always run inside one transaction owned
//! by a single repository method.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog and stock adjustments
//! - [`category::CategoryRepository`] - Product categories
//! - [`sale::SaleRepository`] - Atomic sale commit and sale queries
//! - [`returns::ReturnRepository`] - Returns with restocking
//! - [`user::UserRepository`] - Accounts and authentication
//! - [`activity::ActivityRepository`] - Append-only audit log
//! - [`settings::SettingsRepository`] - Key/value settings and store profile

pub mod activity;
pub mod category;
pub mod product;
pub mod returns;
pub mod sale;
pub mod settings;
pub mod user;
