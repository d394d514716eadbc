//! # Return Repository
//!
//! Customer returns. The return row and the restocking of every returned
//! line are written in one transaction, the same way a sale is.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::apply_delta;
use till_core::validation::{validate_document_number, validate_quantity};
use till_core::{NewReturn, Return, ValidationError};

const RETURN_COLUMNS: &str = "id, return_number, sale_id, user_id, reason, total_cents, created_at";

#[derive(Debug, Clone)]
pub struct ReturnRepository {
    pool: SqlitePool,
}

impl ReturnRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReturnRepository { pool }
    }

    /// Records a return and puts the returned units back on the shelf.
    ///
    /// ## Errors
    /// - `Validation` - bad number, no lines, non-positive quantity or
    ///   negative amount
    /// - `Conflict` - the return number is already used
    /// - `NotFound` - a line references an unknown product
    pub async fn record_return(&self, request: &NewReturn) -> DbResult<Return> {
        validate_document_number("return_number", &request.return_number)?;
        if request.lines.is_empty() {
            return Err(ValidationError::Required {
                field: "lines".to_string(),
            }
            .into());
        }
        for line in &request.lines {
            validate_quantity(line.quantity)?;
        }
        if request.total_cents < 0 {
            return Err(ValidationError::OutOfRange {
                field: "total".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        let now = Utc::now();
        let record = Return {
            id: Uuid::new_v4().to_string(),
            return_number: request.return_number.clone(),
            sale_id: request.sale_id.clone(),
            user_id: request.user_id.clone(),
            reason: request.reason.clone(),
            total_cents: request.total_cents,
            created_at: now,
        };

        debug!(return_number = %record.return_number, lines = request.lines.len(), "Recording return");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO returns (id, return_number, sale_id, user_id, reason, total_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&record.id)
        .bind(&record.return_number)
        .bind(&record.sale_id)
        .bind(&record.user_id)
        .bind(&record.reason)
        .bind(record.total_cents)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_conflict_value(&record.return_number))?;

        for line in &request.lines {
            apply_delta(&mut tx, &line.product_id, line.quantity, now).await?;
        }

        tx.commit().await?;

        info!(return_id = %record.id, return_number = %record.return_number, "Return recorded");
        Ok(record)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Return>> {
        let sql = format!("SELECT {RETURN_COLUMNS} FROM returns WHERE id = ?1");

        let record = sqlx::query_as::<_, Return>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Returns recorded against one sale, oldest first.
    pub async fn for_sale(&self, sale_id: &str) -> DbResult<Vec<Return>> {
        let sql = format!("SELECT {RETURN_COLUMNS} FROM returns WHERE sale_id = ?1 ORDER BY created_at");

        let records = sqlx::query_as::<_, Return>(&sql)
            .bind(sale_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreErrorKind;
    use crate::test_support::{cashier, memory_db, product, quantity_of};
    use till_core::ReturnLine;

    fn new_return(number: &str, user_id: &str, lines: &[(&str, i64)]) -> NewReturn {
        NewReturn {
            return_number: number.to_string(),
            sale_id: None,
            user_id: user_id.to_string(),
            reason: Some("Damaged".to_string()),
            total_cents: 500,
            lines: lines
                .iter()
                .map(|(product_id, quantity)| ReturnLine {
                    product_id: product_id.to_string(),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_return_restocks() {
        let db = memory_db().await;
        let user = cashier(&db, "amina").await;
        let p = product(&db, "Kettle", 500, 1).await;

        let record = db
            .returns()
            .record_return(&new_return("RET-20260131-00000001", &user.id, &[(&p.id, 2)]))
            .await
            .unwrap();

        assert_eq!(quantity_of(&db, &p.id).await, 3);
        let stored = db.returns().get_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.reason.as_deref(), Some("Damaged"));
    }

    #[tokio::test]
    async fn test_unknown_product_rolls_back_return() {
        let db = memory_db().await;
        let user = cashier(&db, "amina").await;
        let p = product(&db, "Kettle", 500, 1).await;

        let err = db
            .returns()
            .record_return(&new_return(
                "RET-20260131-00000002",
                &user.id,
                &[(&p.id, 1), ("missing", 1)],
            ))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), StoreErrorKind::NotFound);
        assert_eq!(quantity_of(&db, &p.id).await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_return_number_conflicts() {
        let db = memory_db().await;
        let user = cashier(&db, "amina").await;
        let p = product(&db, "Kettle", 500, 1).await;
        let request = new_return("RET-20260131-00000003", &user.id, &[(&p.id, 1)]);

        db.returns().record_return(&request).await.unwrap();
        let err = db.returns().record_return(&request).await.unwrap_err();

        assert_eq!(err.kind(), StoreErrorKind::Conflict);
        assert_eq!(quantity_of(&db, &p.id).await, 2);
    }

    #[tokio::test]
    async fn test_empty_return_rejected() {
        let db = memory_db().await;
        let user = cashier(&db, "amina").await;

        let err = db
            .returns()
            .record_return(&new_return("RET-20260131-00000004", &user.id, &[]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::Validation);
    }
}
