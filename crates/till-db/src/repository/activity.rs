//! # Activity Repository
//!
//! Append-only audit trail: logins, logouts, completed sales, stock
//! adjustments and returns.
//!
//! ## Best-Effort Writes
//! ```text
//! authenticate() succeeds ──► record_best_effort(Login) ──► Err? → warn!, move on
//! commit_sale() succeeds ───► record_best_effort(SaleCompleted) ──► same
//! ```
//! An audit entry never turns a successful operation into a failure.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::DbResult;
use till_core::{ActivityAction, ActivityLogEntry};

const ENTRY_COLUMNS: &str = "id, user_id, action, details, ip_address, created_at";

#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

impl ActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ActivityRepository { pool }
    }

    /// Appends one entry.
    pub async fn record(
        &self,
        user_id: &str,
        action: ActivityAction,
        details: &str,
    ) -> DbResult<ActivityLogEntry> {
        let entry = ActivityLogEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            action,
            details: details.to_string(),
            ip_address: None,
            created_at: Utc::now(),
        };

        debug!(user_id = %user_id, action = ?action, "Recording activity");

        sqlx::query(
            r#"
            INSERT INTO activity_logs (id, user_id, action, details, ip_address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(entry.action)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Appends one entry; a failure is logged and swallowed.
    pub async fn record_best_effort(&self, user_id: &str, action: ActivityAction, details: &str) {
        if let Err(e) = self.record(user_id, action, details).await {
            warn!(user_id = %user_id, action = ?action, error = %e, "Failed to record activity");
        }
    }

    /// Most recent entries across all users, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<ActivityLogEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM activity_logs ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        );

        let entries = sqlx::query_as::<_, ActivityLogEntry>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    /// Entries for one user, newest first.
    pub async fn for_user(&self, user_id: &str, limit: u32) -> DbResult<Vec<ActivityLogEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM activity_logs WHERE user_id = ?1 \
             ORDER BY created_at DESC, rowid DESC LIMIT ?2"
        );

        let entries = sqlx::query_as::<_, ActivityLogEntry>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cashier, memory_db};

    #[tokio::test]
    async fn test_record_and_list() {
        let db = memory_db().await;
        let user = cashier(&db, "amina").await;

        db.activity()
            .record(&user.id, ActivityAction::Login, "User amina logged in")
            .await
            .unwrap();
        db.activity()
            .record(&user.id, ActivityAction::Logout, "User amina logged out")
            .await
            .unwrap();

        let entries = db.activity().for_user(&user.id, 10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, ActivityAction::Logout);
        assert_eq!(entries[1].action, ActivityAction::Login);

        assert_eq!(db.activity().recent(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_best_effort_swallows_failure() {
        let db = memory_db().await;

        // Unknown user violates the foreign key; nothing is written, nothing panics.
        db.activity()
            .record_best_effort("ghost", ActivityAction::Login, "nobody")
            .await;

        assert!(db.activity().recent(10).await.unwrap().is_empty());
    }
}
