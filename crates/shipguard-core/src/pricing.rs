// SPDX-License-Identifier: Apache-2.0

use crate::money::round_money;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PricingError {
    NegativeSubtotal(Decimal),
}

impl Display for PricingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeSubtotal(value) => {
                write!(f, "subtotal must be non-negative, got {value}")
            }
        }
    }
}

impl std::error::Error for PricingError {}

/// Tiered insurance pricing rule. Rates are percentages of the
/// physical-goods subtotal; the threshold boundary is inclusive on the
/// at-or-below side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingRule {
    pub threshold_amount: Decimal,
    pub rate_at_or_below_threshold: Decimal,
    pub rate_above_threshold: Decimal,
}

impl Default for PricingRule {
    fn default() -> Self {
        Self {
            threshold_amount: Decimal::from(200),
            rate_at_or_below_threshold: Decimal::from(2),
            rate_above_threshold: Decimal::new(15, 1),
        }
    }
}

impl PricingRule {
    /// Computes the insurance amount for a subtotal, rounded to 2
    /// decimal places. Pure and deterministic; a negative subtotal is
    /// a caller error, not a runtime fault.
    pub fn insurance_amount(&self, subtotal: Decimal) -> Result<Decimal, PricingError> {
        if subtotal.is_sign_negative() {
            return Err(PricingError::NegativeSubtotal(subtotal));
        }
        let rate = self.rate_applied(subtotal);
        Ok(round_money(subtotal * rate / Decimal::from(100)))
    }

    /// Which tier rate applies to a subtotal. A subtotal exactly at the
    /// threshold uses the lower-tier rate.
    #[must_use]
    pub fn rate_applied(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.threshold_amount {
            self.rate_above_threshold
        } else {
            self.rate_at_or_below_threshold
        }
    }
}
