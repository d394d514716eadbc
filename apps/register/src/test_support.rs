//! Fixtures shared by the command tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use till_core::{NewProduct, NewUser, Product, Role, SaleNumberGenerator, User};
use till_db::DbConfig;

use crate::Register;

/// An in-memory register without the default admin (no hashing at startup).
pub async fn open_register() -> Register {
    Register::with_database(DbConfig::in_memory(), false)
        .await
        .unwrap()
}

/// Creates an account with password `secret123`.
pub async fn create_user(reg: &Register, username: &str, role: Role) -> User {
    reg.db
        .inner()
        .users()
        .create(&NewUser {
            username: username.to_string(),
            password: "secret123".to_string(),
            role,
            full_name: format!("Cashier {}", username),
            email: None,
            is_active: true,
        })
        .await
        .unwrap()
}

/// Creates an account and puts it in the session directly.
pub async fn sign_in(reg: &Register, username: &str, role: Role) -> User {
    let user = create_user(reg, username, role).await;
    reg.session.sign_in(user.clone());
    user
}

pub async fn stock(reg: &Register, name: &str, price_cents: i64, quantity: i64) -> Product {
    reg.db
        .inner()
        .products()
        .insert(&NewProduct::new(name, price_cents, quantity))
        .await
        .unwrap()
}

/// Hands out the given numbers in order, then repeats the last one.
pub struct FixedNumbers {
    numbers: Vec<String>,
    next: AtomicUsize,
}

impl FixedNumbers {
    pub fn new(numbers: &[&str]) -> Self {
        FixedNumbers {
            numbers: numbers.iter().map(|n| n.to_string()).collect(),
            next: AtomicUsize::new(0),
        }
    }

    fn take(&self) -> String {
        let i = self.next.fetch_add(1, Ordering::SeqCst);
        self.numbers[i.min(self.numbers.len() - 1)].clone()
    }
}

impl SaleNumberGenerator for FixedNumbers {
    fn next_sale_number(&self) -> String {
        self.take()
    }

    fn next_return_number(&self) -> String {
        self.take().replacen("SALE", "RET", 1)
    }
}
