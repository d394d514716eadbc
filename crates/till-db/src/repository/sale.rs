//! # Sale Repository
//!
//! The atomic sale commit, and read access to committed sales.
//!
//! ## Commit Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       commit_sale(request)                              │
//! │                                                                         │
//! │  0. validate_sale_request          ── ValidationError, nothing touched  │
//! │                                                                         │
//! │  1. BEGIN                                                               │
//! │  2. INSERT sales (header)          ── first write takes SQLite's write  │
//! │     │                                 lock; competing commits queue     │
//! │     │                                 here until COMMIT / ROLLBACK      │
//! │     │                              ── duplicate sale_number → Conflict  │
//! │     ▼                                                                   │
//! │  3. for each line, in cart order:                                       │
//! │       INSERT sale_items                                                 │
//! │       UPDATE products SET quantity = quantity - n                       │
//! │        WHERE id = ? AND quantity >= n                                   │
//! │                                    ── NotFound / InsufficientStock      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  4. COMMIT                         ── Sale returned                     │
//! │                                                                         │
//! │  Any error in 2-4: the transaction is dropped uncommitted and SQLite    │
//! │  rolls back every write. Nothing of the sale is ever observable.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A sale is immutable once committed: there is no update or delete here.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::decrement_stock;
use till_core::validation::validate_sale_request;
use till_core::{PaymentStatus, Sale, SaleItem, SaleReportRow, SaleRequest, ValidationError};

const SALE_COLUMNS: &str = "id, sale_number, user_id, customer_name, subtotal_cents, tax_cents, \
     discount_cents, total_cents, payment_method, payment_status, created_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Durably records a sale and its inventory effects as one unit.
    ///
    /// ## Returns
    /// The stored sale header. Its items are readable with
    /// [`get_items`](Self::get_items).
    ///
    /// ## Errors
    /// - `Validation` - malformed request (checked before any SQL)
    /// - `Conflict` - the sale number is already used
    /// - `NotFound` - a line references an unknown product, or the cashier
    ///   doesn't exist
    /// - `InsufficientStock` - a line asks for more than is on hand
    /// - storage faults (I/O, pool, busy timeout)
    ///
    /// On every error the store is left exactly as before the call.
    pub async fn commit_sale(&self, request: &SaleRequest) -> DbResult<Sale> {
        validate_sale_request(request)?;

        let header = &request.sale;
        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            sale_number: header.sale_number.clone(),
            user_id: header.user_id.clone(),
            customer_name: header.customer_name.clone(),
            subtotal_cents: header.subtotal_cents,
            tax_cents: header.tax_cents,
            discount_cents: header.discount_cents,
            total_cents: header.total_cents,
            payment_method: header.payment_method,
            payment_status: PaymentStatus::Completed,
            created_at: now,
        };

        debug!(
            sale_number = %sale.sale_number,
            lines = request.items.len(),
            total_cents = sale.total_cents,
            "Committing sale"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, sale_number, user_id, customer_name,
                subtotal_cents, tax_cents, discount_cents, total_cents,
                payment_method, payment_status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.sale_number)
        .bind(&sale.user_id)
        .bind(&sale.customer_name)
        .bind(sale.subtotal_cents)
        .bind(sale.tax_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(sale.payment_status)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::ForeignKeyViolation { .. } => DbError::not_found("User", &sale.user_id),
            other => other.with_conflict_value(&sale.sale_number),
        })?;

        for item in &request.items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, quantity, unit_price_cents, total_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale.id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.total_price_cents)
            .execute(&mut *tx)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => {
                    DbError::not_found("Product", &item.product_id)
                }
                other => other,
            })?;

            decrement_stock(&mut tx, &item.product_id, item.quantity, now).await?;
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            sale_number = %sale.sale_number,
            total_cents = sale.total_cents,
            "Sale committed"
        );

        Ok(sale)
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets a sale by its printed number.
    pub async fn get_by_number(&self, sale_number: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE sale_number = ?1");

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(sale_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets all items of a sale, in the order they were committed.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price_cents, total_price_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Sales between two calendar dates (UTC, both inclusive), newest first,
    /// with the cashier's full name.
    pub async fn report(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Vec<SaleReportRow>> {
        let start = start_of_day(from);
        let end = to
            .checked_add_days(Days::new(1))
            .map(start_of_day)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "to".to_string(),
                reason: "date is out of range".to_string(),
            })?;

        debug!(%from, %to, "Building sales report");

        let rows = sqlx::query_as::<_, SaleReportRow>(
            r#"
            SELECT
                s.id,
                s.sale_number,
                s.user_id,
                u.full_name AS cashier_name,
                s.customer_name,
                s.subtotal_cents,
                s.total_cents,
                s.payment_method,
                s.payment_status,
                s.created_at
            FROM sales s
            INNER JOIN users u ON u.id = s.user_id
            WHERE s.created_at >= ?1 AND s.created_at < ?2
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreErrorKind;
    use crate::test_support::{cashier, file_db, memory_db, product, quantity_of};
    use std::sync::Arc;
    use till_core::{Cart, NewSale, NewSaleItem, PaymentMethod};

    fn request(number: &str, user_id: &str, lines: &[(&str, i64, i64)]) -> SaleRequest {
        let items: Vec<NewSaleItem> = lines
            .iter()
            .map(|(product_id, quantity, unit)| NewSaleItem {
                product_id: product_id.to_string(),
                quantity: *quantity,
                unit_price_cents: *unit,
                total_price_cents: quantity * unit,
            })
            .collect();
        let total: i64 = items.iter().map(|i| i.total_price_cents).sum();

        SaleRequest {
            sale: NewSale {
                sale_number: number.to_string(),
                user_id: user_id.to_string(),
                customer_name: None,
                subtotal_cents: total,
                tax_cents: 0,
                discount_cents: 0,
                total_cents: total,
                payment_method: PaymentMethod::Cash,
            },
            items,
        }
    }

    #[tokio::test]
    async fn test_worked_example() {
        let db = memory_db().await;
        let user = cashier(&db, "amina").await;
        let p = product(&db, "Espresso Beans 1kg", 50000, 10).await;

        let mut cart = Cart::new();
        cart.add_or_increment(&p, 4).unwrap();
        cart.add_or_increment(&p, 3).unwrap();
        assert!(cart.add_or_increment(&p, 5).is_err());

        let request = cart
            .to_sale_request("SALE-20260131-0000000A", &user.id, None)
            .unwrap();
        let sale = db.sales().commit_sale(&request).await.unwrap();

        assert_eq!(sale.total_cents, 350000);
        assert_eq!(sale.total().to_string(), "3500.00");
        assert_eq!(quantity_of(&db, &p.id).await, 3);

        let items = db.sales().get_items(&sale.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 7);
        assert_eq!(items[0].total_price_cents, 350000);
    }

    #[tokio::test]
    async fn test_commit_round_trip() {
        let db = memory_db().await;
        let user = cashier(&db, "amina").await;
        let a = product(&db, "A", 100, 10).await;
        let b = product(&db, "B", 250, 5).await;
        let untouched = product(&db, "C", 999, 8).await;

        let sale = db
            .sales()
            .commit_sale(&request(
                "SALE-20260131-00000001",
                &user.id,
                &[(&a.id, 3, 100), (&b.id, 5, 250)],
            ))
            .await
            .unwrap();

        let stored = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored.sale_number, "SALE-20260131-00000001");
        assert_eq!(stored.subtotal_cents, 1550);
        assert_eq!(stored.total_cents, 1550);
        assert_eq!(stored.payment_method, PaymentMethod::Cash);
        assert_eq!(stored.payment_status, PaymentStatus::Completed);

        let by_number = db
            .sales()
            .get_by_number("SALE-20260131-00000001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_number.id, sale.id);

        let items = db.sales().get_items(&sale.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_id, a.id);
        assert_eq!(items[1].product_id, b.id);

        assert_eq!(quantity_of(&db, &a.id).await, 7);
        assert_eq!(quantity_of(&db, &b.id).await, 0);
        assert_eq!(quantity_of(&db, &untouched.id).await, 8);
    }

    #[tokio::test]
    async fn test_failure_on_later_line_rolls_back_everything() {
        let db = memory_db().await;
        let user = cashier(&db, "amina").await;
        let a = product(&db, "A", 100, 10).await;
        let b = product(&db, "B", 100, 2).await;

        let err = db
            .sales()
            .commit_sale(&request(
                "SALE-20260131-00000002",
                &user.id,
                &[(&a.id, 4, 100), (&b.id, 3, 100)],
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::InsufficientStock {
                ref product_id,
                available: 2,
                requested: 3,
            } if *product_id == b.id
        ));

        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert!(db
            .sales()
            .get_by_number("SALE-20260131-00000002")
            .await
            .unwrap()
            .is_none());
        assert_eq!(quantity_of(&db, &a.id).await, 10);
        assert_eq!(quantity_of(&db, &b.id).await, 2);

        let orphan_items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphan_items, 0);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found_and_rolls_back() {
        let db = memory_db().await;
        let user = cashier(&db, "amina").await;
        let a = product(&db, "A", 100, 10).await;

        let err = db
            .sales()
            .commit_sale(&request(
                "SALE-20260131-00000003",
                &user.id,
                &[(&a.id, 1, 100), ("no-such-product", 1, 100)],
            ))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), StoreErrorKind::NotFound);
        assert_eq!(quantity_of(&db, &a.id).await, 10);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_sale_number_conflicts() {
        let db = memory_db().await;
        let user = cashier(&db, "amina").await;
        let a = product(&db, "A", 100, 10).await;

        let first = db
            .sales()
            .commit_sale(&request("SALE-20260131-00000004", &user.id, &[(&a.id, 1, 100)]))
            .await
            .unwrap();

        let err = db
            .sales()
            .commit_sale(&request("SALE-20260131-00000004", &user.id, &[(&a.id, 2, 100)]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), StoreErrorKind::Conflict);
        assert!(matches!(
            err,
            DbError::Conflict { ref field, ref value }
                if field == "sale_number" && value == "SALE-20260131-00000004"
        ));

        let items = db.sales().get_items(&first.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);
        assert_eq!(quantity_of(&db, &a.id).await, 9);
    }

    #[tokio::test]
    async fn test_invalid_request_never_touches_storage() {
        let db = memory_db().await;
        let user = cashier(&db, "amina").await;
        let a = product(&db, "A", 100, 10).await;

        let mut bad = request("SALE-20260131-00000005", &user.id, &[(&a.id, 2, 100)]);
        bad.items[0].total_price_cents = 150;

        let err = db.sales().commit_sale(&bad).await.unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::Validation);

        let empty = request("SALE-20260131-00000006", &user.id, &[]);
        let err = db.sales().commit_sale(&empty).await.unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::Validation);

        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(quantity_of(&db, &a.id).await, 10);
    }

    #[tokio::test]
    async fn test_unknown_cashier_is_not_found() {
        let db = memory_db().await;
        let a = product(&db, "A", 100, 10).await;

        let err = db
            .sales()
            .commit_sale(&request("SALE-20260131-00000007", "ghost", &[(&a.id, 1, 100)]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::NotFound);
        assert_eq!(quantity_of(&db, &a.id).await, 10);
    }

    #[tokio::test]
    async fn test_report() {
        let db = memory_db().await;
        let user = cashier(&db, "amina").await;
        let a = product(&db, "A", 100, 10).await;

        db.sales()
            .commit_sale(&request("SALE-20260131-00000008", &user.id, &[(&a.id, 1, 100)]))
            .await
            .unwrap();
        db.sales()
            .commit_sale(&request("SALE-20260131-00000009", &user.id, &[(&a.id, 2, 100)]))
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let rows = db.sales().report(today, today).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cashier_name, "Cashier amina");
        assert!(rows[0].created_at >= rows[1].created_at);

        let yesterday = today.pred_opt().unwrap();
        let rows = db.sales().report(yesterday, yesterday).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_commits_never_overdraw() {
        let (db, path) = file_db(4).await;
        let user = cashier(&db, "amina").await;
        let last = product(&db, "Last Units", 100, 3).await;

        let db = Arc::new(db);
        let mut handles = Vec::new();
        for n in 0..2 {
            let db = Arc::clone(&db);
            let req = request(
                &format!("SALE-20260131-0000001{}", n),
                &user.id,
                &[(&last.id, 2, 100)],
            );
            handles.push(tokio::spawn(async move { db.sales().commit_sale(&req).await }));
        }

        let mut ok = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => {
                    assert_eq!(e.kind(), StoreErrorKind::InsufficientStock);
                    refused += 1;
                }
            }
        }

        assert_eq!(ok, 1);
        assert_eq!(refused, 1);
        assert_eq!(quantity_of(&db, &last.id).await, 1);
        assert_eq!(db.sales().count().await.unwrap(), 1);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
