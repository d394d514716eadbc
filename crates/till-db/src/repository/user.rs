//! # User Repository
//!
//! Register accounts and authentication.
//!
//! ## Authentication
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  authenticate(username, password)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... WHERE username = ? AND is_active = 1                        │
//! │       ├── no row ───────────────────────────────► Ok(None), no audit    │
//! │       ▼                                                                 │
//! │  argon2 verify(password, password_hash)                                 │
//! │       ├── mismatch ─────────────────────────────► Ok(None), no audit    │
//! │       ▼                                                                 │
//! │  UPDATE last_login          (best effort, warn! on failure)             │
//! │  INSERT activity_logs login (best effort, warn! on failure)             │
//! │       ▼                                                                 │
//! │  Ok(Some(user))                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::password::{hash_password, verify_password};
use crate::repository::activity::ActivityRepository;
use till_core::validation::{validate_full_name, validate_password, validate_username};
use till_core::{ActivityAction, NewUser, Role, User, UserUpdate};

const USER_COLUMNS: &str =
    "id, username, password_hash, role, full_name, email, is_active, created_at, last_login";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Verifies credentials against an active account.
    ///
    /// ## Returns
    /// - `Ok(Some(user))` - credentials match an active user
    /// - `Ok(None)` - unknown user, inactive user or wrong password
    /// - `Err(_)` - the lookup itself failed
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1 AND is_active = 1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username.trim())
            .fetch_optional(&self.pool)
            .await?;

        let Some(mut user) = user else {
            warn!(username = %username, "Login refused: no active account");
            return Ok(None);
        };

        if !verify_password(password, &user.password_hash) {
            warn!(username = %username, "Login refused: wrong password");
            return Ok(None);
        }

        let now = Utc::now();
        match sqlx::query("UPDATE users SET last_login = ?2 WHERE id = ?1")
            .bind(&user.id)
            .bind(now)
            .execute(&self.pool)
            .await
        {
            Ok(_) => user.last_login = Some(now),
            Err(e) => warn!(user_id = %user.id, error = %e, "Failed to update last login"),
        }

        ActivityRepository::new(self.pool.clone())
            .record_best_effort(
                &user.id,
                ActivityAction::Login,
                &format!("User {} logged in", user.username),
            )
            .await;

        info!(user_id = %user.id, role = user.role.as_str(), "User authenticated");
        Ok(Some(user))
    }

    /// Creates an account. A duplicate username fails with `Conflict`.
    pub async fn create(&self, new_user: &NewUser) -> DbResult<User> {
        validate_username(&new_user.username)?;
        validate_full_name(&new_user.full_name)?;
        validate_password(&new_user.password)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: new_user.username.trim().to_string(),
            password_hash: hash_password(&new_user.password)?,
            role: new_user.role,
            full_name: new_user.full_name.trim().to_string(),
            email: new_user.email.clone().filter(|e| !e.trim().is_empty()),
            is_active: new_user.is_active,
            created_at: Utc::now(),
            last_login: None,
        };

        debug!(id = %user.id, username = %user.username, "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, password_hash, role, full_name, email, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_conflict_value(&user.username))?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// All accounts, active and inactive, by username.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username");

        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Edits an account. `update.password: None` keeps the current password.
    pub async fn update(&self, id: &str, update: &UserUpdate) -> DbResult<User> {
        validate_username(&update.username)?;
        validate_full_name(&update.full_name)?;

        let password_hash = match update.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        debug!(id = %id, "Updating user");

        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = ?2,
                full_name = ?3,
                email = ?4,
                role = ?5,
                is_active = ?6,
                password_hash = COALESCE(?7, password_hash)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.username.trim())
        .bind(update.full_name.trim())
        .bind(update.email.as_deref().filter(|e| !e.trim().is_empty()))
        .bind(update.role)
        .bind(update.is_active)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_conflict_value(update.username.trim()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Activates or deactivates an account. Inactive accounts can't log in.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE users SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    pub async fn count_with_role(&self, role: Role) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?1")
            .bind(role)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
