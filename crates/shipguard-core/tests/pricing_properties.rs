// SPDX-License-Identifier: Apache-2.0

use proptest::prelude::*;
use proptest::test_runner::Config;
use rust_decimal::Decimal;
use shipguard_core::{round_money, PricingRule};

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn amount_matches_selected_tier_formula(cents in 0i64..5_000_000) {
        let rule = PricingRule::default();
        let subtotal = Decimal::new(cents, 2);
        let amount = rule.insurance_amount(subtotal).expect("non-negative subtotal");
        let rate = if subtotal > rule.threshold_amount {
            rule.rate_above_threshold
        } else {
            rule.rate_at_or_below_threshold
        };
        prop_assert_eq!(amount, round_money(subtotal * rate / Decimal::from(100)));
    }

    #[test]
    fn amount_always_has_at_most_two_decimal_places(cents in 0i64..5_000_000) {
        let rule = PricingRule::default();
        let amount = rule
            .insurance_amount(Decimal::new(cents, 2))
            .expect("non-negative subtotal");
        prop_assert!(amount.scale() <= 2);
        prop_assert!(!amount.is_sign_negative());
    }
}
