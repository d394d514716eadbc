//! # Sale Commands
//!
//! ## Checkout
//! ```text
//! checkout(cash_tendered)
//!   │
//!   ├── 1. session? ────────────── no ──► UNAUTHENTICATED
//!   ├── 2. cart ready? ─────────── no ──► CART_ERROR
//!   ├── 3. tender ≥ total? ─────── no ──► PAYMENT_ERROR
//!   ├── 4. SaleRequest (fresh SALE-YYYYMMDD-XXXXXXXX number)
//!   ├── 5. commit_sale ─────────── err ─► error returned, cart kept
//!   ├── 6. `sale_completed` audit entry (best effort)
//!   ├── 7. cart cleared
//!   └── 8. Receipt
//! ```
//!
//! Nothing is written before step 5, and step 5 is all-or-nothing.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::{CartState, DbState, ProfileState, SessionState};
use till_core::{ActivityAction, CashTender, CoreError, Money, PaymentMethod, SaleNumberGenerator};
use till_db::{DbError, StoreProfile};

/// Fresh numbers tried when the store reports a sale-number collision.
const SALE_NUMBER_ATTEMPTS: usize = 3;

/// What the customer takes home.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub sale_id: String,
    pub sale_number: String,
    pub created_at: DateTime<Utc>,
    /// Full name of the cashier.
    pub cashier: String,
    pub customer_name: Option<String>,
    pub store: StoreProfile,
    pub lines: Vec<ReceiptLine>,
    pub total_cents: i64,
    pub tendered_cents: i64,
    pub change_cents: i64,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl Receipt {
    /// Plain-text rendering for a receipt printer.
    pub fn render(&self) -> String {
        let currency = &self.store.currency;
        let mut out = String::new();

        out.push_str(&format!("{}\n", self.store.company_name));
        for line in [&self.store.company_address, &self.store.company_phone] {
            if !line.is_empty() {
                out.push_str(&format!("{}\n", line));
            }
        }
        out.push_str(&format!(
            "{}  {}\n",
            self.sale_number,
            self.created_at.format("%Y-%m-%d %H:%M")
        ));
        out.push_str(&format!("Cashier: {}\n", self.cashier));
        if let Some(customer) = &self.customer_name {
            out.push_str(&format!("Customer: {}\n", customer));
        }
        out.push('\n');

        for line in &self.lines {
            out.push_str(&format!(
                "{} x{} @ {} = {}\n",
                line.name,
                line.quantity,
                Money::from_cents(line.unit_price_cents),
                Money::from_cents(line.line_total_cents)
            ));
        }

        out.push('\n');
        out.push_str(&format!("TOTAL    {} {}\n", Money::from_cents(self.total_cents), currency));
        out.push_str(&format!("CASH     {} {}\n", Money::from_cents(self.tendered_cents), currency));
        out.push_str(&format!("CHANGE   {} {}\n", Money::from_cents(self.change_cents), currency));
        out.push('\n');
        out.push_str(&self.store.receipt_footer);
        out.push('\n');
        out
    }
}

/// Pays the cart in cash and commits it as one sale.
///
/// ## Arguments
/// * `numbers` - Sale number source (`DailySaleNumbers` in production)
/// * `cash_tendered_cents` - Cash handed over by the customer
/// * `customer_name` - Optional; blank is treated as none
///
/// On success only the lines that were sold leave the cart; anything
/// added while the sale was being written stays for the next one.
///
/// ## Errors
/// On any error nothing is persisted and the cart is left as it was.
pub async fn checkout<N>(
    db: &DbState,
    cart: &CartState,
    session: &SessionState,
    profile: &ProfileState,
    numbers: &N,
    cash_tendered_cents: i64,
    customer_name: Option<String>,
) -> Result<Receipt, ApiError>
where
    N: SaleNumberGenerator + ?Sized,
{
    debug!(cash_tendered_cents, "checkout command");

    let user = session.require()?;
    let snapshot = cart.snapshot();
    if !snapshot.is_checkout_ready() {
        return Err(CoreError::EmptyCart.into());
    }

    let tender = CashTender::settle(snapshot.total(), Money::from_cents(cash_tendered_cents))?;

    let store = db.inner();
    let mut attempt = 1;
    let sale = loop {
        let request =
            snapshot.to_sale_request(numbers.next_sale_number(), &user.id, customer_name.clone())?;

        match store.sales().commit_sale(&request).await {
            Ok(sale) => break sale,
            Err(DbError::Conflict { ref field, ref value })
                if field == "sale_number" && attempt < SALE_NUMBER_ATTEMPTS =>
            {
                warn!(sale_number = %value, attempt, "Sale number taken, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    };

    store
        .activity()
        .record_best_effort(
            &user.id,
            ActivityAction::SaleCompleted,
            &format!(
                "Sale {} completed for {}",
                sale.sale_number,
                profile.format_amount(sale.total())
            ),
        )
        .await;

    cart.with_cart_mut(|c| c.remove_committed(snapshot.lines()));

    info!(
        sale_id = %sale.id,
        sale_number = %sale.sale_number,
        total = %sale.total(),
        change = %tender.change,
        "Checkout complete"
    );

    Ok(Receipt {
        sale_id: sale.id,
        sale_number: sale.sale_number,
        created_at: sale.created_at,
        cashier: user.full_name,
        customer_name: sale.customer_name,
        store: profile.get(),
        lines: snapshot
            .lines()
            .iter()
            .map(|line| ReceiptLine {
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line.line_total().cents(),
            })
            .collect(),
        total_cents: sale.total_cents,
        tendered_cents: tender.tendered.cents(),
        change_cents: tender.change.cents(),
        payment_method: sale.payment_method,
    })
}
