//! # Auth Commands
//!
//! ```text
//! login(username, password)
//!   ├── refused ──► UNAUTHENTICATED, no session, no audit entry
//!   └── accepted ─► session = user, one `login` entry (written by the store)
//!
//! logout()
//!   └── session cleared, cart cleared, best-effort `logout` entry
//! ```

use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{CartState, DbState, SessionState};
use till_core::{ActivityAction, User};

/// Verifies credentials and starts a session.
///
/// A different user logging in takes over the register with an empty cart.
pub async fn login(
    db: &DbState,
    session: &SessionState,
    cart: &CartState,
    username: &str,
    password: &str,
) -> Result<User, ApiError> {
    debug!(username = %username, "login command");

    if username.trim().is_empty() || password.is_empty() {
        return Err(ApiError::validation("Username and password are required"));
    }

    let user = db
        .inner()
        .users()
        .authenticate(username, password)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("Invalid username or password"))?;

    if let Some(previous) = session.sign_in(user.clone()) {
        if previous.id != user.id {
            cart.with_cart_mut(|c| c.clear());
            info!(previous = %previous.username, "Session taken over, cart cleared");
        }
    }

    Ok(user)
}

/// Ends the session. Logging out with nobody logged in is a no-op.
pub async fn logout(
    db: &DbState,
    session: &SessionState,
    cart: &CartState,
) -> Result<(), ApiError> {
    debug!("logout command");

    let Some(user) = session.sign_out() else {
        return Ok(());
    };

    cart.with_cart_mut(|c| c.clear());

    db.inner()
        .activity()
        .record_best_effort(
            &user.id,
            ActivityAction::Logout,
            &format!("User {} logged out", user.username),
        )
        .await;

    info!(user_id = %user.id, "User logged out");
    Ok(())
}

pub fn current_user(session: &SessionState) -> Option<User> {
    session.current()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{create_user, open_register, stock};
    use till_core::Role;

    #[tokio::test]
    async fn test_login_starts_session_and_logs_once() {
        let reg = open_register().await;
        create_user(&reg, "amina", Role::Cashier).await;

        let user = login(&reg.db, &reg.session, &reg.cart, "amina", "secret123")
            .await
            .unwrap();

        assert_eq!(current_user(&reg.session).unwrap().id, user.id);
        let entries = reg.db.inner().activity().for_user(&user.id, 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, ActivityAction::Login);
    }

    #[tokio::test]
    async fn test_wrong_password_refused_without_entry() {
        let reg = open_register().await;
        let user = create_user(&reg, "amina", Role::Cashier).await;

        let err = login(&reg.db, &reg.session, &reg.cart, "amina", "nope-nope")
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Unauthenticated);
        assert!(current_user(&reg.session).is_none());
        assert!(reg.db.inner().activity().for_user(&user.id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_credentials_are_a_validation_error() {
        let reg = open_register().await;

        let err = login(&reg.db, &reg.session, &reg.cart, "  ", "secret123")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_cart() {
        let reg = open_register().await;
        let user = create_user(&reg, "amina", Role::Cashier).await;
        login(&reg.db, &reg.session, &reg.cart, "amina", "secret123")
            .await
            .unwrap();

        let p = stock(&reg, "Kettle", 2500, 4).await;
        reg.cart
            .with_cart_mut(|c| c.add_or_increment(&p, 1))
            .unwrap();

        logout(&reg.db, &reg.session, &reg.cart).await.unwrap();

        assert!(current_user(&reg.session).is_none());
        assert!(reg.cart.with_cart(|c| c.is_empty()));

        let entries = reg.db.inner().activity().for_user(&user.id, 10).await.unwrap();
        assert_eq!(entries[0].action, ActivityAction::Logout);

        // Nobody left to log out
        logout(&reg.db, &reg.session, &reg.cart).await.unwrap();
    }

    #[tokio::test]
    async fn test_different_user_takes_over_with_empty_cart() {
        let reg = open_register().await;
        create_user(&reg, "amina", Role::Cashier).await;
        create_user(&reg, "karim", Role::Cashier).await;
        let p = stock(&reg, "Kettle", 2500, 4).await;

        login(&reg.db, &reg.session, &reg.cart, "amina", "secret123")
            .await
            .unwrap();
        reg.cart
            .with_cart_mut(|c| c.add_or_increment(&p, 1))
            .unwrap();

        // Same user again keeps the cart
        login(&reg.db, &reg.session, &reg.cart, "amina", "secret123")
            .await
            .unwrap();
        assert_eq!(reg.cart.with_cart(|c| c.line_count()), 1);

        login(&reg.db, &reg.session, &reg.cart, "karim", "secret123")
            .await
            .unwrap();
        assert!(reg.cart.with_cart(|c| c.is_empty()));
        assert_eq!(current_user(&reg.session).unwrap().username, "karim");
    }
}
