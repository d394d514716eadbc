//! # Cash Tender
//!
//! The only payment the register models. The cashier types the cash handed
//! over; the tender is settled against the cart total before anything is
//! committed.
//!
//! ```text
//! total 3500.00, tendered 4000.00
//!      │
//!      ▼
//! CashTender::settle → tendered 4000.00, change 500.00
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// A settled cash payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashTender {
    pub total: Money,
    pub tendered: Money,
    pub change: Money,
}

impl CashTender {
    /// Settles `tendered` against `total`.
    ///
    /// Fails with `InsufficientTender` when the cash doesn't cover the total.
    pub fn settle(total: Money, tendered: Money) -> CoreResult<Self> {
        if tendered < total {
            return Err(CoreError::InsufficientTender {
                tendered: tendered.cents(),
                total: total.cents(),
            });
        }

        Ok(CashTender {
            total,
            tendered,
            change: tendered - total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_calculated() {
        let tender =
            CashTender::settle(Money::from_cents(350000), Money::from_cents(400000)).unwrap();
        assert_eq!(tender.change, Money::from_cents(50000));
    }

    #[test]
    fn test_exact_cash_gives_no_change() {
        let tender = CashTender::settle(Money::from_cents(999), Money::from_cents(999)).unwrap();
        assert!(tender.change.is_zero());
    }

    #[test]
    fn test_short_cash_rejected() {
        let err = CashTender::settle(Money::from_cents(1000), Money::from_cents(999)).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientTender {
                tendered: 999,
                total: 1000
            }
        );
    }
}
