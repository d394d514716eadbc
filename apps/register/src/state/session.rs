//! # Session State
//!
//! Who is working the register right now. One cashier session per cart.

use std::sync::{PoisonError, RwLock};

use till_core::User;

use crate::error::ApiError;

#[derive(Debug, Default)]
pub struct SessionState {
    user: RwLock<Option<User>>,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState::default()
    }

    /// Starts a session, returning whoever was logged in before.
    pub fn sign_in(&self, user: User) -> Option<User> {
        self.user
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(user)
    }

    /// Ends the session, returning the user that was logged in.
    pub fn sign_out(&self) -> Option<User> {
        self.user.write().unwrap_or_else(PoisonError::into_inner).take()
    }

    pub fn current(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The logged-in user, or `UNAUTHENTICATED`.
    pub fn require(&self) -> Result<User, ApiError> {
        self.current()
            .ok_or_else(|| ApiError::unauthenticated("No cashier is logged in"))
    }

    /// The logged-in user if their role may change stock levels, else
    /// `FORBIDDEN`.
    pub fn require_stock_access(&self) -> Result<User, ApiError> {
        let user = self.require()?;
        if !user.role.can_adjust_stock() {
            return Err(ApiError::forbidden(format!(
                "Role {} cannot adjust stock",
                user.role.as_str()
            )));
        }
        Ok(user)
    }
}
