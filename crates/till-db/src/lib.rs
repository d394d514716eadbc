//! # till-db: Inventory/Sale Store for Till POS
//!
//! This crate owns every byte of persisted state: products, users, sales,
//! returns, the activity log and settings. It uses SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Till POS Data Flow                               │
//! │                                                                         │
//! │  Register command (checkout)                                           │
//! │       │  SaleRequest (from till-core Cart)                             │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     till-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ 001_initial_ │  │   │
//! │  │   │ lifecycle     │    │ UserRepo  ... │    │ schema.sql   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, configuration and lifecycle
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store error types and their kinds
//! - [`repository`] - Repository implementations
//! - [`bootstrap`] - First-run defaults (admin account, categories, settings)
//! - [`password`] - Argon2 password hashing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/till.db")).await?;
//! db.bootstrap().await?;
//!
//! let user = db.users().authenticate("admin", "admin123").await?;
//! let sale = db.sales().commit_sale(&request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bootstrap;
pub mod error;
pub mod migrations;
pub mod password;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use bootstrap::BootstrapReport;
pub use error::{DbError, DbResult, StoreErrorKind};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::activity::ActivityRepository;
pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
pub use repository::returns::ReturnRepository;
pub use repository::sale::SaleRepository;
pub use repository::settings::{SettingsRepository, StoreProfile};
pub use repository::user::UserRepository;
