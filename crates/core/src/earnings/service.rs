//! Earnings recompute and organizer roll-up.

use chrono::{DateTime, Utc};
use tikera_shared::types::{Currency, Money, OrganizerId, money::project_preferred};

use crate::earnings::error::EarningsError;
use crate::earnings::types::{
    ConfirmedSale, EventEarnings, EventMeta, OrganizerBucket, OrganizerEarnings, SettlementStatus,
};
use crate::fees::{LocationFeeConfig, ProcessingFeeSchedule, platform_fee, settlement_ready_at};

/// Stateless earnings calculator.
///
/// `recompute` is a pure function of the ledger slice and fee policy, so
/// it can run on demand, concurrently with payout execution, and in
/// reconciliation jobs; repeated runs over the same inputs are idempotent.
pub struct EarningsCalculator;

impl EarningsCalculator {
    /// Recomputes the earnings projection for a single event.
    ///
    /// # Errors
    ///
    /// Returns an error if any sale or the withdrawn amount is in a
    /// different currency than the event, or if fee computation fails.
    pub fn recompute(
        event: &EventMeta,
        sales: &[ConfirmedSale],
        fee_config: &LocationFeeConfig,
        schedule: &ProcessingFeeSchedule,
        withdrawn: Money,
        now: DateTime<Utc>,
    ) -> Result<EventEarnings, EarningsError> {
        let mut gross = Money::zero(event.currency);
        for sale in sales {
            gross = gross.checked_add(sale.amount)?;
        }

        let platform = platform_fee(gross, fee_config)?;
        let processing = schedule.fee(gross)?;
        let net = gross.checked_sub(platform)?.checked_sub(processing)?;

        let remaining = net.checked_sub(withdrawn)?;
        let available = if remaining.is_negative() {
            Money::zero(event.currency)
        } else {
            remaining
        };

        let ready_at = settlement_ready_at(event.end_at, fee_config);
        let status = if available.is_zero() && !withdrawn.is_zero() {
            SettlementStatus::Withdrawn
        } else if now >= ready_at {
            SettlementStatus::Ready
        } else {
            SettlementStatus::Pending
        };

        Ok(EventEarnings {
            event_id: event.event_id,
            organizer_id: event.organizer_id,
            currency: event.currency,
            gross_sales: gross,
            platform_fee: platform,
            processing_fee: processing,
            net_amount: net,
            withdrawn_amount: withdrawn,
            available_to_withdraw: available,
            settlement_status: status,
            settlement_ready_at: ready_at,
        })
    }

    /// Rolls up per-event earnings into per-currency organizer totals.
    ///
    /// Currencies are kept separate; the preferred-currency projection is
    /// the only single-figure collapse.
    pub fn rollup(
        organizer_id: OrganizerId,
        earnings: &[EventEarnings],
        preferred: Currency,
    ) -> Result<OrganizerEarnings, EarningsError> {
        let mut buckets: Vec<OrganizerBucket> = Vec::new();

        for e in earnings {
            let idx = match buckets.iter().position(|b| b.currency == e.currency) {
                Some(idx) => idx,
                None => {
                    buckets.push(OrganizerBucket {
                        currency: e.currency,
                        gross_sales: Money::zero(e.currency),
                        net_amount: Money::zero(e.currency),
                        available_to_withdraw: Money::zero(e.currency),
                        event_count: 0,
                    });
                    buckets.len() - 1
                }
            };
            let bucket = &mut buckets[idx];
            bucket.gross_sales = bucket.gross_sales.checked_add(e.gross_sales)?;
            bucket.net_amount = bucket.net_amount.checked_add(e.net_amount)?;
            bucket.available_to_withdraw = bucket
                .available_to_withdraw
                .checked_add(e.available_to_withdraw)?;
            bucket.event_count += 1;
        }

        let available: Vec<Money> = buckets.iter().map(|b| b.available_to_withdraw).collect();
        let preferred_display = project_preferred(&available, preferred);

        Ok(OrganizerEarnings {
            organizer_id,
            buckets,
            preferred_display,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use tikera_shared::types::{EventId, SaleId};

    fn meta(currency: Currency, end_at: DateTime<Utc>) -> EventMeta {
        EventMeta {
            event_id: EventId::new(),
            organizer_id: OrganizerId::new(),
            country_code: match currency {
                Currency::Htg => "HT".to_string(),
                _ => "US".to_string(),
            },
            currency,
            end_at,
        }
    }

    fn sale(minor: i64, currency: Currency) -> ConfirmedSale {
        ConfirmedSale {
            sale_id: SaleId::new(),
            amount: Money::new(minor, currency),
            sold_at: Utc::now(),
        }
    }

    fn us_config() -> LocationFeeConfig {
        LocationFeeConfig {
            platform_fee_rate: dec!(0.10),
            settlement_hold_days: 7,
        }
    }

    fn card_schedule() -> ProcessingFeeSchedule {
        ProcessingFeeSchedule::for_currency(Currency::Usd)
    }

    #[test]
    fn test_recompute_us_event() {
        let now = Utc::now();
        let event = meta(Currency::Usd, now - Duration::days(10));
        let sales = vec![sale(60_000, Currency::Usd), sale(40_000, Currency::Usd)];

        let earnings = EarningsCalculator::recompute(
            &event,
            &sales,
            &us_config(),
            &card_schedule(),
            Money::zero(Currency::Usd),
            now,
        )
        .unwrap();

        assert_eq!(earnings.gross_sales.minor, 100_000);
        assert_eq!(earnings.platform_fee.minor, 10_000);
        assert_eq!(earnings.processing_fee.minor, 2930);
        assert_eq!(earnings.net_amount.minor, 87_070);
        assert_eq!(earnings.available_to_withdraw.minor, 87_070);
        // Hold elapsed 3 days ago.
        assert_eq!(earnings.settlement_status, SettlementStatus::Ready);
    }

    #[test]
    fn test_recompute_fee_identity() {
        let now = Utc::now();
        let event = meta(Currency::Usd, now);
        let sales = vec![sale(33_333, Currency::Usd), sale(12_345, Currency::Usd)];

        let e = EarningsCalculator::recompute(
            &event,
            &sales,
            &us_config(),
            &card_schedule(),
            Money::zero(Currency::Usd),
            now,
        )
        .unwrap();

        let reassembled = e
            .net_amount
            .checked_add(e.platform_fee)
            .unwrap()
            .checked_add(e.processing_fee)
            .unwrap();
        assert_eq!(reassembled, e.gross_sales);
    }

    #[test]
    fn test_recompute_haiti_zero_hold_ready_at_event_end() {
        let end = Utc::now();
        let event = meta(Currency::Htg, end);
        let config = LocationFeeConfig {
            platform_fee_rate: dec!(0.07),
            settlement_hold_days: 0,
        };

        let earnings = EarningsCalculator::recompute(
            &event,
            &[sale(500_000, Currency::Htg)],
            &config,
            &ProcessingFeeSchedule::for_currency(Currency::Htg),
            Money::zero(Currency::Htg),
            end,
        )
        .unwrap();

        assert_eq!(earnings.settlement_ready_at, end);
        assert_eq!(earnings.settlement_status, SettlementStatus::Ready);
    }

    #[test]
    fn test_recompute_pending_before_hold_elapses() {
        let now = Utc::now();
        let event = meta(Currency::Usd, now - Duration::days(2));

        let earnings = EarningsCalculator::recompute(
            &event,
            &[sale(10_000, Currency::Usd)],
            &us_config(),
            &card_schedule(),
            Money::zero(Currency::Usd),
            now,
        )
        .unwrap();

        assert_eq!(earnings.settlement_status, SettlementStatus::Pending);
    }

    #[test]
    fn test_recompute_fully_withdrawn() {
        let now = Utc::now();
        let event = meta(Currency::Usd, now - Duration::days(30));
        let sales = vec![sale(100_000, Currency::Usd)];

        let first = EarningsCalculator::recompute(
            &event,
            &sales,
            &us_config(),
            &card_schedule(),
            Money::zero(Currency::Usd),
            now,
        )
        .unwrap();

        let again = EarningsCalculator::recompute(
            &event,
            &sales,
            &us_config(),
            &card_schedule(),
            first.net_amount,
            now,
        )
        .unwrap();

        assert!(again.available_to_withdraw.is_zero());
        assert_eq!(again.settlement_status, SettlementStatus::Withdrawn);
    }

    #[test]
    fn test_recompute_available_never_negative() {
        let now = Utc::now();
        let event = meta(Currency::Usd, now - Duration::days(30));

        // Withdrawn more than net (e.g., policy changed between recomputes).
        let earnings = EarningsCalculator::recompute(
            &event,
            &[sale(10_000, Currency::Usd)],
            &us_config(),
            &card_schedule(),
            Money::new(50_000, Currency::Usd),
            now,
        )
        .unwrap();

        assert!(!earnings.available_to_withdraw.is_negative());
        assert!(earnings.available_to_withdraw.is_zero());
    }

    #[test]
    fn test_recompute_rejects_foreign_currency_sale() {
        let now = Utc::now();
        let event = meta(Currency::Usd, now);
        let sales = vec![sale(1000, Currency::Htg)];

        let result = EarningsCalculator::recompute(
            &event,
            &sales,
            &us_config(),
            &card_schedule(),
            Money::zero(Currency::Usd),
            now,
        );
        assert!(matches!(result, Err(EarningsError::Money(_))));
    }

    #[test]
    fn test_recompute_no_sales() {
        let now = Utc::now();
        let event = meta(Currency::Usd, now - Duration::days(10));

        let earnings = EarningsCalculator::recompute(
            &event,
            &[],
            &us_config(),
            &card_schedule(),
            Money::zero(Currency::Usd),
            now,
        )
        .unwrap();

        assert!(earnings.gross_sales.is_zero());
        assert!(earnings.platform_fee.is_zero());
        assert!(earnings.processing_fee.is_zero());
        assert!(earnings.available_to_withdraw.is_zero());
        // Nothing withdrawn, nothing earned: still just Ready, not Withdrawn.
        assert_eq!(earnings.settlement_status, SettlementStatus::Ready);
    }

    #[test]
    fn test_rollup_keeps_currencies_separate() {
        let now = Utc::now();
        let organizer = OrganizerId::new();

        let mut usd_event = meta(Currency::Usd, now - Duration::days(10));
        usd_event.organizer_id = organizer;
        let mut htg_event = meta(Currency::Htg, now - Duration::days(10));
        htg_event.organizer_id = organizer;

        let usd = EarningsCalculator::recompute(
            &usd_event,
            &[sale(100_000, Currency::Usd)],
            &us_config(),
            &card_schedule(),
            Money::zero(Currency::Usd),
            now,
        )
        .unwrap();
        let htg = EarningsCalculator::recompute(
            &htg_event,
            &[sale(250_000, Currency::Htg)],
            &LocationFeeConfig {
                platform_fee_rate: dec!(0.07),
                settlement_hold_days: 0,
            },
            &ProcessingFeeSchedule::for_currency(Currency::Htg),
            Money::zero(Currency::Htg),
            now,
        )
        .unwrap();

        let rollup =
            EarningsCalculator::rollup(organizer, &[usd, htg], Currency::Usd).unwrap();

        assert_eq!(rollup.buckets.len(), 2);
        let display = rollup.preferred_display.unwrap();
        assert_eq!(display.currency, Currency::Usd);
    }

    #[test]
    fn test_rollup_preferred_zero_falls_back() {
        let now = Utc::now();
        let organizer = OrganizerId::new();

        let mut htg_event = meta(Currency::Htg, now);
        htg_event.organizer_id = organizer;
        let htg = EarningsCalculator::recompute(
            &htg_event,
            &[sale(5000, Currency::Htg)],
            &LocationFeeConfig {
                platform_fee_rate: dec!(0),
                settlement_hold_days: 0,
            },
            &ProcessingFeeSchedule {
                rate: dec!(0),
                fixed_minor: 0,
            },
            Money::zero(Currency::Htg),
            now,
        )
        .unwrap();

        // No USD earnings at all: the display figure is the HTG bucket.
        let rollup = EarningsCalculator::rollup(organizer, &[htg], Currency::Usd).unwrap();
        let display = rollup.preferred_display.unwrap();
        assert_eq!(display, Money::new(5000, Currency::Htg));
    }

    #[test]
    fn test_rollup_empty() {
        let rollup =
            EarningsCalculator::rollup(OrganizerId::new(), &[], Currency::Usd).unwrap();
        assert!(rollup.buckets.is_empty());
        assert!(rollup.preferred_display.is_none());
    }
}
