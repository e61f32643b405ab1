//! Postgres enum mappings for the settlement and payout engine.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Settlement status of an event's earnings.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "settlement_status")]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    /// Hold period still running.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Withdrawable.
    #[sea_orm(string_value = "ready")]
    Ready,
    /// Fully paid out.
    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
}

/// Payout lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payout_status")]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    /// Waiting for admin approval.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved, transfer not yet confirmed.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Funds delivered (terminal).
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Provider failure; retryable.
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Withdrawn from the lifecycle (terminal).
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Money-movement provider kind.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "provider_kind")]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Mobile-money transfer rail.
    #[sea_orm(string_value = "mobile_money")]
    MobileMoney,
    /// Connected-account payout rail.
    #[sea_orm(string_value = "connected_account")]
    ConnectedAccount,
    /// Prefunded-balance fast path.
    #[sea_orm(string_value = "prefunded")]
    Prefunded,
}

/// Verification status of a payout profile.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "profile_status")]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    /// Verification not begun.
    #[sea_orm(string_value = "not_started")]
    NotStarted,
    /// Verification in progress.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Destination verified.
    #[sea_orm(string_value = "verified")]
    Verified,
    /// Verification rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// More documents needed.
    #[sea_orm(string_value = "requires_more_info")]
    RequiresMoreInfo,
}
