//! Property-based tests for earnings aggregation.
//!
//! - Fee identity: net + platform fee + processing fee == gross
//! - Available balance is never negative
//! - Same-currency money addition is commutative and associative;
//!   mixed-currency addition always fails

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tikera_shared::types::{Currency, EventId, Money, MoneyError, OrganizerId, SaleId};

use super::service::EarningsCalculator;
use super::types::{ConfirmedSale, EventMeta};
use crate::fees::{LocationFeeConfig, ProcessingFeeSchedule};

/// Strategy for positive minor-unit amounts (1 cent to 1M major units).
fn positive_minor() -> impl Strategy<Value = i64> {
    1i64..100_000_000i64
}

/// Strategy for a supported currency.
fn currency() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::Usd),
        Just(Currency::Cad),
        Just(Currency::Htg),
    ]
}

/// Strategy for a platform fee rate in [0, 1] with up to 4 decimals.
fn fee_rate() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn make_event(cur: Currency) -> EventMeta {
    EventMeta {
        event_id: EventId::new(),
        organizer_id: OrganizerId::new(),
        country_code: "US".to_string(),
        currency: cur,
        end_at: Utc::now(),
    }
}

fn make_sales(amounts: &[i64], cur: Currency) -> Vec<ConfirmedSale> {
    amounts
        .iter()
        .map(|&minor| ConfirmedSale {
            sale_id: SaleId::new(),
            amount: Money::new(minor, cur),
            sold_at: Utc::now(),
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_money_add_commutative(a in positive_minor(), b in positive_minor(), cur in currency()) {
        let x = Money::new(a, cur);
        let y = Money::new(b, cur);
        prop_assert_eq!(x.checked_add(y).unwrap(), y.checked_add(x).unwrap());
    }

    #[test]
    fn prop_money_add_associative(
        a in positive_minor(),
        b in positive_minor(),
        c in positive_minor(),
        cur in currency(),
    ) {
        let x = Money::new(a, cur);
        let y = Money::new(b, cur);
        let z = Money::new(c, cur);
        let left = x.checked_add(y).unwrap().checked_add(z).unwrap();
        let right = x.checked_add(y.checked_add(z).unwrap()).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_money_add_mixed_currency_fails(a in positive_minor(), b in positive_minor()) {
        let x = Money::new(a, Currency::Usd);
        let y = Money::new(b, Currency::Htg);
        let is_mismatch = matches!(
            x.checked_add(y),
            Err(MoneyError::CurrencyMismatch { .. })
        );
        prop_assert!(is_mismatch);
    }

    #[test]
    fn prop_fee_identity_and_nonnegative_available(
        amounts in prop::collection::vec(positive_minor(), 0..20),
        rate in fee_rate(),
        hold_days in 0u32..60,
        withdrawn in 0i64..200_000_000i64,
        cur in currency(),
    ) {
        let event = make_event(cur);
        let sales = make_sales(&amounts, cur);
        let config = LocationFeeConfig {
            platform_fee_rate: rate,
            settlement_hold_days: hold_days,
        };
        let schedule = ProcessingFeeSchedule::for_currency(cur);

        let earnings = EarningsCalculator::recompute(
            &event,
            &sales,
            &config,
            &schedule,
            Money::new(withdrawn, cur),
            Utc::now(),
        )
        .unwrap();

        // net + platform + processing == gross, to the minor unit.
        let reassembled = earnings
            .net_amount
            .checked_add(earnings.platform_fee)
            .unwrap()
            .checked_add(earnings.processing_fee)
            .unwrap();
        prop_assert_eq!(reassembled, earnings.gross_sales);

        // Available is net - withdrawn floored at zero.
        prop_assert!(!earnings.available_to_withdraw.is_negative());
        let expected = earnings.net_amount.minor - withdrawn;
        prop_assert_eq!(earnings.available_to_withdraw.minor, expected.max(0));
    }
}
