//! # State Module
//!
//! Register state, split by concern. Each command takes exactly the state
//! it needs as a parameter; nothing is global.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │   DbState    │  │  CartState   │  │ SessionState │  │ProfileState│  │
//! │  │              │  │              │  │              │  │            │  │
//! │  │  Database    │  │  Arc<Mutex<  │  │  RwLock<     │  │  RwLock<   │  │
//! │  │  (SQLite     │  │    Cart      │  │   Option<    │  │   Store    │  │
//! │  │   pool)      │  │  >>          │  │    User>>    │  │   Profile>>│  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • CartState: Arc<Mutex<T>> for exclusive access                       │
//! │  • SessionState / ProfileState: read often, written on login/reload    │
//! │                                                                         │
//! │  No lock is ever held across an `.await`.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod db;
mod profile;
mod session;

pub use cart::CartState;
pub use db::DbState;
pub use profile::ProfileState;
pub use session::SessionState;
