//! # Product Commands
//!
//! Catalog lookups for the selling screen, plus stock adjustment for
//! stock managers and admins.
//!
//! ```text
//! Scanner ──► lookup_barcode("6130000000017") ──► Product (active only)
//! Search box ► search_products("kett", None, Some(20)) ──► [Product]
//! Back office ► adjust_stock(product_id, +12, Some("Delivery")) ──► Product
//! ```

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{DbState, SessionState};
use till_core::{ActivityAction, Product};

pub const DEFAULT_SEARCH_LIMIT: u32 = 50;
pub const MAX_SEARCH_LIMIT: u32 = 200;

/// A stock correction as entered in the back office.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub product_id: String,
    /// Positive restocks, negative writes off.
    pub delta: i64,
    pub reason: Option<String>,
}

/// Looks up an active product by its scanned barcode.
pub async fn lookup_barcode(db: &DbState, barcode: &str) -> Result<Product, ApiError> {
    debug!(barcode = %barcode, "lookup_barcode command");

    if barcode.trim().is_empty() {
        return Err(ApiError::validation("Barcode is required"));
    }

    db.inner()
        .products()
        .get_by_barcode(barcode)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", barcode.trim()))
}

/// Searches active products by name or barcode.
///
/// ## Arguments
/// * `query` - Search term; empty lists active products by name
/// * `category_id` - Optional category filter
/// * `limit` - Defaults to 50, capped at 200
pub async fn search_products(
    db: &DbState,
    query: &str,
    category_id: Option<&str>,
    limit: Option<u32>,
) -> Result<Vec<Product>, ApiError> {
    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
    debug!(query = %query, ?category_id, limit, "search_products command");

    let products = db.inner().products().search(query, category_id, limit).await?;
    Ok(products)
}

/// Products at or below their low-stock threshold.
pub async fn low_stock(db: &DbState, limit: Option<u32>) -> Result<Vec<Product>, ApiError> {
    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
    debug!(limit, "low_stock command");

    let products = db.inner().products().low_stock(limit).await?;
    Ok(products)
}

/// Applies a stock correction. Stock managers and admins only.
///
/// ## Errors
/// - `UNAUTHENTICATED` / `FORBIDDEN` - no session, or a cashier
/// - `VALIDATION_ERROR` - zero delta
/// - `NOT_FOUND` - unknown product
/// - `INSUFFICIENT_STOCK` - the write-off exceeds quantity-on-hand
pub async fn adjust_stock(
    db: &DbState,
    session: &SessionState,
    adjustment: &StockAdjustment,
) -> Result<Product, ApiError> {
    debug!(
        product_id = %adjustment.product_id,
        delta = adjustment.delta,
        "adjust_stock command"
    );

    let user = session.require_stock_access()?;

    if adjustment.delta == 0 {
        return Err(ApiError::validation("Adjustment must not be zero"));
    }

    let store = db.inner();
    let mut product = store
        .products()
        .get_by_id(&adjustment.product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &adjustment.product_id))?;

    product.quantity = store
        .products()
        .adjust_quantity(&product.id, adjustment.delta)
        .await?;

    let mut details = format!(
        "Adjusted {} by {:+} to {}",
        product.name, adjustment.delta, product.quantity
    );
    if let Some(reason) = adjustment.reason.as_deref().filter(|r| !r.trim().is_empty()) {
        details.push_str(&format!(" ({})", reason.trim()));
    }

    store
        .activity()
        .record_best_effort(&user.id, ActivityAction::StockAdjusted, &details)
        .await;

    info!(
        product_id = %product.id,
        delta = adjustment.delta,
        quantity = product.quantity,
        "Stock adjusted"
    );
    Ok(product)
}
