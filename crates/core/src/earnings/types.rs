//! Earnings domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tikera_shared::types::{Currency, EventId, Money, OrganizerId, SaleId};

/// Settlement status of an event's earnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    /// Earnings exist but the settlement hold has not elapsed.
    Pending,
    /// The hold has elapsed; the available balance is withdrawable.
    Ready,
    /// Everything earned has been withdrawn.
    Withdrawn,
}

impl SettlementStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "ready" => Some(Self::Ready),
            "withdrawn" => Some(Self::Withdrawn),
            _ => None,
        }
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event metadata read from the sales ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    /// Event identifier.
    pub event_id: EventId,
    /// Organizer who owns the event.
    pub organizer_id: OrganizerId,
    /// ISO country code of the event location.
    pub country_code: String,
    /// Currency tickets were sold in.
    pub currency: Currency,
    /// When the event ends; the settlement hold counts from here.
    pub end_at: DateTime<Utc>,
}

/// A single confirmed ticket sale from the upstream ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedSale {
    /// Sale identifier.
    pub sale_id: SaleId,
    /// Amount paid, in the event's currency.
    pub amount: Money,
    /// When the sale was confirmed.
    pub sold_at: DateTime<Utc>,
}

/// Earnings projection for a single event.
///
/// Invariants: `net_amount = gross_sales - platform_fee - processing_fee`;
/// `available_to_withdraw = max(0, net_amount - withdrawn_amount)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEarnings {
    /// Event identifier.
    pub event_id: EventId,
    /// Organizer who owns the event.
    pub organizer_id: OrganizerId,
    /// Currency of every amount below.
    pub currency: Currency,
    /// Total confirmed sales.
    pub gross_sales: Money,
    /// Platform fee withheld.
    pub platform_fee: Money,
    /// External processor fee withheld.
    pub processing_fee: Money,
    /// Gross minus both fees.
    pub net_amount: Money,
    /// Amount already paid out.
    pub withdrawn_amount: Money,
    /// Amount still claimable; never negative.
    pub available_to_withdraw: Money,
    /// Where the earnings sit in the settlement cycle.
    pub settlement_status: SettlementStatus,
    /// When the settlement hold elapses.
    pub settlement_ready_at: DateTime<Utc>,
}

/// Per-currency totals in an organizer roll-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizerBucket {
    /// Currency of this bucket.
    pub currency: Currency,
    /// Gross sales across the organizer's events in this currency.
    pub gross_sales: Money,
    /// Net earnings in this currency.
    pub net_amount: Money,
    /// Withdrawable balance in this currency.
    pub available_to_withdraw: Money,
    /// Number of events contributing to the bucket.
    pub event_count: u32,
}

/// Cross-event earnings roll-up for one organizer.
///
/// Currencies are never collapsed; `preferred_display` is the explicit
/// single-figure projection (`None` means "no earnings yet").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizerEarnings {
    /// Organizer identifier.
    pub organizer_id: OrganizerId,
    /// Per-currency totals, reported separately.
    pub buckets: Vec<OrganizerBucket>,
    /// Single display figure in the preferred currency, if any earnings exist.
    pub preferred_display: Option<Money>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_status_roundtrip() {
        for status in [
            SettlementStatus::Pending,
            SettlementStatus::Ready,
            SettlementStatus::Withdrawn,
        ] {
            assert_eq!(SettlementStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SettlementStatus::parse("READY"), Some(SettlementStatus::Ready));
        assert_eq!(SettlementStatus::parse("unknown"), None);
    }
}
