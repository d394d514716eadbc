//! # Settings Repository
//!
//! Key/value settings and the typed store profile printed on receipts.
//!
//! ```text
//! settings table                      StoreProfile
//! ────────────────────────────        ─────────────────────────────
//! company_name    = "LKS POS System"  company_name
//! company_address = ...           ──► company_address
//! company_phone   = ...               company_phone
//! company_email   = (missing)         company_email   = ""
//! currency        = "DZD"             currency
//! receipt_footer  = (missing)         receipt_footer  = default footer
//! ```

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use till_core::Setting;

/// Settings written on first run: `(key, value, description)`.
pub const DEFAULT_SETTINGS: &[(&str, &str, &str)] = &[
    ("currency", "DZD", "Default currency"),
    ("language", "en", "Default language"),
    ("theme", "light", "Default theme"),
    ("receipt_printer", "", "Receipt printer name"),
    ("company_name", "LKS POS System", "Company name for receipts"),
    ("company_address", "123 Main St, City, State", "Company address"),
    ("company_phone", "+213-XXX-XXX-XXX", "Company phone number"),
];

pub const DEFAULT_RECEIPT_FOOTER: &str = "Thank you for your business!";

/// Store identity and receipt texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreProfile {
    pub company_name: String,
    pub company_address: String,
    pub company_phone: String,
    pub company_email: String,
    pub currency: String,
    pub receipt_footer: String,
}

impl Default for StoreProfile {
    fn default() -> Self {
        StoreProfile {
            company_name: "LKS POS System".to_string(),
            company_address: String::new(),
            company_phone: String::new(),
            company_email: String::new(),
            currency: "DZD".to_string(),
            receipt_footer: DEFAULT_RECEIPT_FOOTER.to_string(),
        }
    }
}

impl StoreProfile {
    /// Builds a profile from raw settings; missing or blank keys keep the
    /// default.
    pub fn from_settings(values: &HashMap<String, String>) -> Self {
        let defaults = StoreProfile::default();
        let pick = |key: &str, fallback: String| {
            values
                .get(key)
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .unwrap_or(fallback)
        };

        StoreProfile {
            company_name: pick("company_name", defaults.company_name),
            company_address: pick("company_address", defaults.company_address),
            company_phone: pick("company_phone", defaults.company_phone),
            company_email: pick("company_email", defaults.company_email),
            currency: pick("currency", defaults.currency),
            receipt_footer: pick("receipt_footer", defaults.receipt_footer),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// The raw value of one setting.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Creates or updates a setting. An existing description is kept.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, "Updating setting");

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list(&self) -> DbResult<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT key, value, description, updated_at FROM settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }

    /// The store profile, with defaults for anything not configured.
    pub async fn profile(&self) -> DbResult<StoreProfile> {
        let values: HashMap<String, String> = self
            .list()
            .await?
            .into_iter()
            .map(|s| (s.key, s.value))
            .collect();

        Ok(StoreProfile::from_settings(&values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_db;

    #[tokio::test]
    async fn test_get_and_set() {
        let db = memory_db().await;
        assert_eq!(db.settings().get("currency").await.unwrap(), None);

        db.settings().set("currency", "EUR").await.unwrap();
        assert_eq!(
            db.settings().get("currency").await.unwrap().as_deref(),
            Some("EUR")
        );

        db.settings().set("currency", "DZD").await.unwrap();
        assert_eq!(
            db.settings().get("currency").await.unwrap().as_deref(),
            Some("DZD")
        );
    }

    #[tokio::test]
    async fn test_set_keeps_description() {
        let db = memory_db().await;
        db.bootstrap().await.unwrap();

        db.settings().set("theme", "dark").await.unwrap();

        let theme = db
            .settings()
            .list()
            .await
            .unwrap()
            .into_iter()
            .find(|s| s.key == "theme")
            .unwrap();
        assert_eq!(theme.value, "dark");
        assert_eq!(theme.description.as_deref(), Some("Default theme"));
    }

    #[tokio::test]
    async fn test_profile_defaults_and_overrides() {
        let db = memory_db().await;
        assert_eq!(db.settings().profile().await.unwrap(), StoreProfile::default());

        db.settings().set("company_name", "Epicerie Amina").await.unwrap();
        db.settings().set("receipt_footer", "").await.unwrap();

        let profile = db.settings().profile().await.unwrap();
        assert_eq!(profile.company_name, "Epicerie Amina");
        assert_eq!(profile.receipt_footer, DEFAULT_RECEIPT_FOOTER);
        assert_eq!(profile.currency, "DZD");
    }
}
