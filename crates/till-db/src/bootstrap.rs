//! # First-Run Bootstrap
//!
//! A fresh store has no way in: no account, no categories, no receipt
//! header. Bootstrap fills those in once.
//!
//! ```text
//! bootstrap()
//!   │
//!   ├── any admin account?  yes ──► nothing to do
//!   │
//!   └── no ──► one transaction:
//!              ├── admin / admin123  (role admin, "System Administrator")
//!              ├── default categories   (INSERT OR IGNORE)
//!              └── default settings     (INSERT OR IGNORE)
//! ```
//!
//! The default password is meant to be changed on first login.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbResult;
use crate::password::hash_password;
use crate::repository::settings::DEFAULT_SETTINGS;
use till_core::Role;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Electronics", "Electronic devices and accessories"),
    ("Clothing", "Apparel and fashion items"),
    ("Food & Beverages", "Food and drink items"),
    ("Books", "Books and educational materials"),
    ("Home & Garden", "Home improvement and garden items"),
];

/// What a bootstrap run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub admin_created: bool,
    pub categories_created: u64,
    pub settings_created: u64,
}

pub(crate) async fn bootstrap(pool: &SqlitePool) -> DbResult<BootstrapReport> {
    let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?1")
        .bind(Role::Admin)
        .fetch_one(pool)
        .await?;

    if admins > 0 {
        info!("Admin account present, skipping bootstrap");
        return Ok(BootstrapReport::default());
    }

    warn!(
        username = DEFAULT_ADMIN_USERNAME,
        "No admin account found, creating the default one"
    );

    let now = Utc::now();
    let password_hash = hash_password(DEFAULT_ADMIN_PASSWORD)?;
    let mut report = BootstrapReport::default();

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO users (id, username, password_hash, role, full_name, email, is_active, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(DEFAULT_ADMIN_USERNAME)
    .bind(&password_hash)
    .bind(Role::Admin)
    .bind("System Administrator")
    .bind("admin@pos.com")
    .bind(now)
    .execute(&mut *tx)
    .await?;
    report.admin_created = true;

    for (name, description) in DEFAULT_CATEGORIES {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO categories (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(*name)
        .bind(*description)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        report.categories_created += result.rows_affected();
    }

    for (key, value, description) in DEFAULT_SETTINGS {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO settings (key, value, description, updated_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(*key)
        .bind(*value)
        .bind(*description)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        report.settings_created += result.rows_affected();
    }

    tx.commit().await?;

    info!(
        categories = report.categories_created,
        settings = report.settings_created,
        "Bootstrap complete"
    );

    Ok(report)
}
