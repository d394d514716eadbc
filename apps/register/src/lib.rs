//! # Till Register Library
//!
//! The headless register: state, commands and startup. A UI shell links
//! this crate and calls the commands; the `till-register` binary only opens
//! the store, prepares it and reports.
//!
//! ## Module Organization
//! ```text
//! till_register/
//! ├── lib.rs          ◄─── You are here (Register, startup & run)
//! ├── config.rs       ◄─── RegisterConfig (env vars, data dir)
//! ├── error.rs        ◄─── ApiError for commands, StartupError
//! ├── state/
//! │   ├── db.rs       ◄─── Store handle
//! │   ├── cart.rs     ◄─── Cart of the current session
//! │   ├── session.rs  ◄─── Logged-in user
//! │   └── profile.rs  ◄─── Store profile for receipts
//! └── commands/
//!     ├── auth.rs     ◄─── login / logout
//!     ├── product.rs  ◄─── lookup, search, stock adjustment
//!     ├── cart.rs     ◄─── cart manipulation
//!     └── sale.rs     ◄─── checkout
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::RegisterConfig;
use error::StartupError;
use state::{CartState, DbState, ProfileState, SessionState};
use till_core::DailySaleNumbers;
use till_db::{Database, DbConfig};

/// Every piece of register state, built once at startup.
///
/// Commands borrow the parts they need:
/// ```rust,ignore
/// let reg = Register::open(&RegisterConfig::load()?).await?;
/// commands::auth::login(&reg.db, &reg.session, &reg.cart, "admin", "admin123").await?;
/// ```
#[derive(Debug)]
pub struct Register {
    pub db: DbState,
    pub cart: CartState,
    pub session: SessionState,
    pub profile: ProfileState,
    pub numbers: DailySaleNumbers,
}

impl Register {
    /// Opens the configured store file, creating its folder if needed.
    pub async fn open(config: &RegisterConfig) -> Result<Self, StartupError> {
        if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| StartupError::DataDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        Self::with_database(config.db_config(), config.seed_defaults).await
    }

    /// Connects, migrates, optionally bootstraps, and loads the profile.
    pub async fn with_database(
        db_config: DbConfig,
        seed_defaults: bool,
    ) -> Result<Self, StartupError> {
        let db = Database::new(db_config).await?;

        if seed_defaults {
            let report = db.bootstrap().await?;
            if report.admin_created {
                warn!("Default admin account created; change its password");
            }
        }

        let profile = db.settings().profile().await?;
        info!(store = %profile.company_name, currency = %profile.currency, "Register ready");

        Ok(Register {
            db: DbState::new(db),
            cart: CartState::new(),
            session: SessionState::new(),
            profile: ProfileState::new(profile),
            numbers: DailySaleNumbers::new(),
        })
    }

    /// Closes the store. Outstanding commits finish first.
    pub async fn close(self) {
        self.db.inner().close().await;
        info!("Register closed");
    }
}

/// Runs the register binary.
///
/// ## Startup Sequence
/// ```text
/// 1. Initialize logging (RUST_LOG, default info,till=debug,sqlx=warn)
/// 2. Load configuration (TILL_* env vars)
/// 3. Open store: WAL file, migrations, bootstrap when enabled
/// 4. Report store status (products, low stock)
/// 5. Close
/// ```
pub async fn run() -> Result<(), StartupError> {
    init_tracing();

    info!("Starting Till POS register");

    let config = RegisterConfig::load()?;
    info!(db_path = %config.db_path.display(), "Configuration loaded");

    let register = Register::open(&config).await?;

    let store = register.db.inner();
    let products = store.products().count().await?;
    let low = store.products().low_stock(u32::MAX).await?;
    info!(products, low_stock = low.len(), "Store status");

    register.close().await;
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=till_db=trace` - Trace the store only
/// - Default: `info,till=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,till=debug,sqlx=warn"));

    // A subscriber may already be installed by an embedding shell
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
