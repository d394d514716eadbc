//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Barcode lookup and name/barcode search
//! - CRUD (products are deactivated, never deleted)
//! - Guarded quantity changes
//!
//! ## Guarded Quantity Change
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE products                                                        │
//! │     SET quantity = quantity + :delta                                    │
//! │   WHERE id = :id AND quantity + :delta >= 0                             │
//! │                                                                         │
//! │  1 row  → done (new quantity returned)                                  │
//! │  0 rows → SELECT quantity WHERE id = :id                                │
//! │             ├── no row  → NotFound                                      │
//! │             └── row     → InsufficientStock { available }               │
//! │                                                                         │
//! │  The check and the write are one statement, so no other writer can     │
//! │  slip in between them.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use till_core::validation::{
    validate_barcode, validate_price_cents, validate_product_name, validate_search_query,
    validate_stock_level,
};
use till_core::{NewProduct, Product, ValidationError};

const PRODUCT_COLUMNS: &str = "id, name, barcode, category_id, description, price_cents, \
     cost_price_cents, quantity, min_quantity, is_active, created_at, updated_at";

/// Largest stock change accepted in one adjustment, in either direction.
const MAX_ADJUSTMENT: i64 = i32::MAX as i64;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let hits = repo.search("beans", None, 20).await?;
/// let scanned = repo.get_by_barcode("6130000000017").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches active products by name or barcode substring.
    ///
    /// ## Arguments
    /// * `query` - Search term (may be empty: lists active products)
    /// * `category_id` - Optional category filter
    /// * `limit` - Maximum results to return
    ///
    /// Results are ordered by name.
    pub async fn search(
        &self,
        query: &str,
        category_id: Option<&str>,
        limit: u32,
    ) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, ?category_id, limit = %limit, "Searching products");

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 \
               AND (?1 = '' OR name LIKE '%' || ?1 || '%' OR barcode LIKE '%' || ?1 || '%') \
               AND (?2 IS NULL OR category_id = ?2) \
             ORDER BY name \
             LIMIT ?3"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(&query)
            .bind(category_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Gets a product by its ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets an active product by barcode (scanner lookup).
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        debug!(barcode = %barcode, "Looking up barcode");

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1 AND is_active = 1"
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// The stored product. A duplicate barcode fails with `Conflict`.
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        validate_new_product(product)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let barcode = product
            .barcode
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty());

        debug!(id = %id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, barcode, category_id, description,
                price_cents, cost_price_cents, quantity, min_quantity,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?10)
            "#,
        )
        .bind(&id)
        .bind(product.name.trim())
        .bind(barcode)
        .bind(&product.category_id)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_price_cents)
        .bind(product.quantity)
        .bind(product.min_quantity)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_conflict_value(barcode.unwrap_or_default()))?;

        Ok(Product {
            id,
            name: product.name.trim().to_string(),
            barcode: barcode.map(str::to_string),
            category_id: product.category_id.clone(),
            description: product.description.clone(),
            price_cents: product.price_cents,
            cost_price_cents: product.cost_price_cents,
            quantity: product.quantity,
            min_quantity: product.min_quantity,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Updates a product's catalog fields.
    ///
    /// Quantity is NOT written here: stock only moves through
    /// [`adjust_quantity`](Self::adjust_quantity), sale commits and returns.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        validate_product_name(&product.name)?;
        validate_price_cents(product.price_cents)?;
        validate_stock_level("min_quantity", product.min_quantity)?;
        if let Some(barcode) = &product.barcode {
            validate_barcode(barcode)?;
        }

        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                barcode = ?3,
                category_id = ?4,
                description = ?5,
                price_cents = ?6,
                cost_price_cents = ?7,
                min_quantity = ?8,
                is_active = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(product.name.trim())
        .bind(&product.barcode)
        .bind(&product.category_id)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_price_cents)
        .bind(product.min_quantity)
        .bind(product.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DbError::from(e).with_conflict_value(product.barcode.as_deref().unwrap_or_default())
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Soft-deletes a product. Past sales keep referring to it.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deactivating product");

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Active products at or below their low-stock threshold, emptiest first.
    pub async fn low_stock(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND quantity <= min_quantity \
             ORDER BY quantity, name \
             LIMIT ?1"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Counts all products (used by the seed binary).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Applies a relative stock adjustment (restock, shrinkage, correction).
    ///
    /// Durable before returning. Independent of the sale commit protocol.
    /// Unlike a plain overwrite of the stock figure, a change that would
    /// leave quantity-on-hand negative is refused.
    ///
    /// ## Returns
    /// The new quantity-on-hand.
    ///
    /// ## Errors
    /// - `Validation` when `|delta|` exceeds `i32::MAX`
    /// - `NotFound` for an unknown product
    /// - `InsufficientStock` when the result would be negative
    pub async fn adjust_quantity(&self, product_id: &str, delta: i64) -> DbResult<i64> {
        if !(-MAX_ADJUSTMENT..=MAX_ADJUSTMENT).contains(&delta) {
            return Err(ValidationError::OutOfRange {
                field: "delta".to_string(),
                min: -MAX_ADJUSTMENT,
                max: MAX_ADJUSTMENT,
            }
            .into());
        }

        debug!(product_id = %product_id, delta = delta, "Adjusting quantity");

        let mut conn = self.pool.acquire().await?;
        apply_delta(&mut conn, product_id, delta, Utc::now()).await
    }
}

fn validate_new_product(product: &NewProduct) -> DbResult<()> {
    validate_product_name(&product.name)?;
    validate_price_cents(product.price_cents)?;
    validate_stock_level("quantity", product.quantity)?;
    validate_stock_level("min_quantity", product.min_quantity)?;
    if let Some(cost) = product.cost_price_cents {
        validate_price_cents(cost)?;
    }
    if let Some(barcode) = product.barcode.as_deref().filter(|b| !b.trim().is_empty()) {
        validate_barcode(barcode)?;
    }
    Ok(())
}

// =============================================================================
// Connection-level helpers (shared with sale and return transactions)
// =============================================================================

/// Guarded relative change of quantity-on-hand on an open connection or
/// transaction. Returns the new quantity.
pub(crate) async fn apply_delta(
    conn: &mut SqliteConnection,
    product_id: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<i64> {
    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET quantity = quantity + ?2, updated_at = ?3
        WHERE id = ?1 AND quantity + ?2 >= 0
        RETURNING quantity
        "#,
    )
    .bind(product_id)
    .bind(delta)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(quantity) = updated {
        return Ok(quantity);
    }

    let available: Option<i64> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;

    match available {
        None => Err(DbError::not_found("Product", product_id)),
        Some(available) => Err(DbError::InsufficientStock {
            product_id: product_id.to_string(),
            available,
            requested: delta.saturating_neg(),
        }),
    }
}

/// Removes `quantity` units, failing instead of going negative.
pub(crate) async fn decrement_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<i64> {
    apply_delta(conn, product_id, -quantity, now).await
}

// =============================================================================
// Unit Tests
// =============================================================================
