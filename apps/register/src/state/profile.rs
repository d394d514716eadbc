//! # Profile State
//!
//! The store profile (name, address, currency, receipt footer), read from
//! the `settings` table at startup and reloaded on demand. Receipts and
//! audit messages are formatted from it.

use std::sync::{PoisonError, RwLock};

use till_core::Money;
use till_db::{Database, DbResult, StoreProfile};

#[derive(Debug, Default)]
pub struct ProfileState {
    profile: RwLock<StoreProfile>,
}

impl ProfileState {
    pub fn new(profile: StoreProfile) -> Self {
        ProfileState {
            profile: RwLock::new(profile),
        }
    }

    pub fn get(&self) -> StoreProfile {
        self.profile
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-reads the profile after settings were edited.
    pub async fn reload(&self, db: &Database) -> DbResult<StoreProfile> {
        let profile = db.settings().profile().await?;
        *self.profile.write().unwrap_or_else(PoisonError::into_inner) = profile.clone();
        Ok(profile)
    }

    /// Formats an amount in the store currency.
    ///
    /// ## Example
    /// ```rust,ignore
    /// assert_eq!(profile.format_amount(Money::from_cents(350000)), "3500.00 DZD");
    /// ```
    pub fn format_amount(&self, amount: Money) -> String {
        let profile = self.profile.read().unwrap_or_else(PoisonError::into_inner);
        format!("{} {}", amount, profile.currency)
    }
}
