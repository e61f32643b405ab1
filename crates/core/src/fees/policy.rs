//! Fee configuration and computation.
//!
//! All fee amounts are derived in `Decimal` over integer minor units and
//! rounded half-up to the minor unit exactly once; downstream code never
//! re-rounds.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tikera_shared::types::{AdminId, Currency, Money, money::round_minor};

use crate::fees::error::FeeError;
use crate::fees::jurisdiction::Jurisdiction;

/// Per-jurisdiction fee percentage and settlement hold period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFeeConfig {
    /// Platform fee as a fraction of gross sales, in `[0, 1]`.
    pub platform_fee_rate: Decimal,
    /// Mandatory waiting period after an event ends before its earnings
    /// are withdrawable.
    pub settlement_hold_days: u32,
}

/// Versioned platform settings singleton.
///
/// Mutated only by administrators; read-mostly and cached process-wide
/// with explicit invalidation on write (see the settings repository).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSettings {
    /// Fee configuration for Haiti-jurisdiction events.
    pub haiti: LocationFeeConfig,
    /// Fee configuration for US/Canada-jurisdiction events.
    pub us_canada: LocationFeeConfig,
    /// Smallest payout the platform will create.
    pub minimum_payout: Money,
    /// When the settings were last changed.
    pub updated_at: DateTime<Utc>,
    /// Administrator who made the last change.
    pub updated_by: Option<AdminId>,
}

impl PlatformSettings {
    /// Returns the fee configuration for a jurisdiction bucket.
    #[must_use]
    pub const fn fee_config(&self, jurisdiction: Jurisdiction) -> &LocationFeeConfig {
        match jurisdiction {
            Jurisdiction::Haiti => &self.haiti,
            Jurisdiction::UsCanada => &self.us_canada,
        }
    }
}

/// External payment-processor fee schedule: a percentage of gross plus a
/// fixed component, per currency.
///
/// The real rates belong to the payment processor contract; this is a pure
/// function of `(gross, currency)` so the schedule can be swapped without
/// touching the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingFeeSchedule {
    /// Percentage component, in `[0, 1]`.
    pub rate: Decimal,
    /// Fixed component in minor units.
    pub fixed_minor: i64,
}

impl ProcessingFeeSchedule {
    /// Returns the schedule for a currency.
    #[must_use]
    pub fn for_currency(currency: Currency) -> Self {
        // Same card-processor schedule on every supported currency today.
        let _ = currency;
        Self {
            rate: Decimal::new(29, 3), // 2.9%
            fixed_minor: 30,
        }
    }

    /// Computes the processing fee for a gross amount.
    ///
    /// Zero gross carries zero fee: the fixed component only applies when
    /// money actually moved.
    pub fn fee(&self, gross: Money) -> Result<Money, FeeError> {
        validate_rate(self.rate)?;
        if gross.is_zero() {
            return Ok(Money::zero(gross.currency));
        }
        let raw = Decimal::from(gross.minor) * self.rate + Decimal::from(self.fixed_minor);
        Ok(Money::new(round_minor(raw)?, gross.currency))
    }
}

/// Computes the platform fee on a gross amount, rounded half-up once.
pub fn platform_fee(gross: Money, config: &LocationFeeConfig) -> Result<Money, FeeError> {
    validate_rate(config.platform_fee_rate)?;
    let raw = Decimal::from(gross.minor) * config.platform_fee_rate;
    Ok(Money::new(round_minor(raw)?, gross.currency))
}

/// Computes when an event's earnings become withdrawable.
///
/// Monotonic in `settlement_hold_days`; zero hold days means the ready
/// date equals the event end time exactly.
#[must_use]
pub fn settlement_ready_at(
    event_end: DateTime<Utc>,
    config: &LocationFeeConfig,
) -> DateTime<Utc> {
    event_end + Duration::days(i64::from(config.settlement_hold_days))
}

fn validate_rate(rate: Decimal) -> Result<(), FeeError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(FeeError::InvalidRate { rate });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn us_config() -> LocationFeeConfig {
        LocationFeeConfig {
            platform_fee_rate: dec!(0.10),
            settlement_hold_days: 7,
        }
    }

    fn haiti_config() -> LocationFeeConfig {
        LocationFeeConfig {
            platform_fee_rate: dec!(0.07),
            settlement_hold_days: 0,
        }
    }

    #[test]
    fn test_platform_fee_ten_percent() {
        let gross = Money::new(100_000, Currency::Usd);
        let fee = platform_fee(gross, &us_config()).unwrap();
        assert_eq!(fee, Money::new(10_000, Currency::Usd));
    }

    #[test]
    fn test_platform_fee_rounds_half_up() {
        // 10005 * 7% = 700.35 -> 700; 10007 * 7% = 700.49 -> 700;
        // 10050 * 7% = 703.5 -> 704
        let config = haiti_config();
        let fee = platform_fee(Money::new(10_050, Currency::Htg), &config).unwrap();
        assert_eq!(fee.minor, 704);
    }

    #[test]
    fn test_platform_fee_invalid_rate() {
        let config = LocationFeeConfig {
            platform_fee_rate: dec!(1.5),
            settlement_hold_days: 0,
        };
        let result = platform_fee(Money::new(1000, Currency::Usd), &config);
        assert!(matches!(result, Err(FeeError::InvalidRate { .. })));
    }

    #[test]
    fn test_processing_fee_card_schedule() {
        // 100000 * 2.9% + 30 = 2930
        let schedule = ProcessingFeeSchedule::for_currency(Currency::Usd);
        let fee = schedule.fee(Money::new(100_000, Currency::Usd)).unwrap();
        assert_eq!(fee, Money::new(2930, Currency::Usd));
    }

    #[test]
    fn test_processing_fee_zero_gross() {
        let schedule = ProcessingFeeSchedule::for_currency(Currency::Htg);
        let fee = schedule.fee(Money::zero(Currency::Htg)).unwrap();
        assert!(fee.is_zero());
    }

    #[test]
    fn test_settlement_ready_at_monotonic_in_hold_days() {
        let end = Utc::now();
        let mut previous = settlement_ready_at(
            end,
            &LocationFeeConfig {
                platform_fee_rate: dec!(0.1),
                settlement_hold_days: 0,
            },
        );
        for days in 1..30 {
            let ready = settlement_ready_at(
                end,
                &LocationFeeConfig {
                    platform_fee_rate: dec!(0.1),
                    settlement_hold_days: days,
                },
            );
            assert!(ready > previous);
            previous = ready;
        }
    }

    #[test]
    fn test_settlement_ready_at_zero_hold_is_event_end() {
        let end = Utc::now();
        assert_eq!(settlement_ready_at(end, &haiti_config()), end);
    }

    #[test]
    fn test_fee_config_lookup() {
        let settings = PlatformSettings {
            haiti: haiti_config(),
            us_canada: us_config(),
            minimum_payout: Money::new(2000, Currency::Usd),
            updated_at: Utc::now(),
            updated_by: None,
        };
        assert_eq!(
            settings.fee_config(Jurisdiction::Haiti).settlement_hold_days,
            0
        );
        assert_eq!(
            settings
                .fee_config(Jurisdiction::UsCanada)
                .platform_fee_rate,
            dec!(0.10)
        );
    }
}
