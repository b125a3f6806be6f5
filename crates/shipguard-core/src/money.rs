// SPDX-License-Identifier: Apache-2.0

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to 2 decimal places, half-up. The rounded
/// value is the only value ever sent upstream or returned to callers.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_up_at_two_places() {
        assert_eq!(round_money(dec!(3.745)), dec!(3.75));
        assert_eq!(round_money(dec!(3.744)), dec!(3.74));
        assert_eq!(round_money(dec!(4.005)), dec!(4.01));
    }

    #[test]
    fn leaves_two_place_values_unchanged() {
        assert_eq!(round_money(dec!(4.00)), dec!(4.00));
        assert_eq!(round_money(dec!(0)), Decimal::ZERO);
    }
}
