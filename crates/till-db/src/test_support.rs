//! Fixtures shared by the repository tests.

use till_core::{NewProduct, NewUser, Product, Role, User};

use crate::pool::{Database, DbConfig};

pub async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// A file-backed store with a real pool, for tests that need more than one
/// connection. The file lives in the temp dir and is unique per call.
pub async fn file_db(max_connections: u32) -> (Database, std::path::PathBuf) {
    let path = std::env::temp_dir().join(format!("till-test-{}.db", uuid::Uuid::new_v4()));
    let db = Database::new(DbConfig::new(&path).max_connections(max_connections))
        .await
        .unwrap();
    (db, path)
}

pub async fn cashier(db: &Database, username: &str) -> User {
    db.users()
        .create(&NewUser {
            username: username.to_string(),
            password: "secret123".to_string(),
            role: Role::Cashier,
            full_name: format!("Cashier {}", username),
            email: None,
            is_active: true,
        })
        .await
        .unwrap()
}

pub async fn product(db: &Database, name: &str, price_cents: i64, quantity: i64) -> Product {
    db.products()
        .insert(&NewProduct::new(name, price_cents, quantity))
        .await
        .unwrap()
}

pub async fn quantity_of(db: &Database, product_id: &str) -> i64 {
    db.products()
        .get_by_id(product_id)
        .await
        .unwrap()
        .unwrap()
        .quantity
}
