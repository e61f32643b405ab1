//! Disbursement domain types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tikera_shared::types::{Money, OrganizerId};

use crate::disbursement::error::ProviderError;

/// The money-movement rails the platform can disburse through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Mobile-money transfer (Haiti jurisdiction).
    MobileMoney,
    /// Card-network connected-account payout rails (US/Canada).
    ConnectedAccount,
    /// Platform-held prefunded balance (instant fast path).
    Prefunded,
}

impl ProviderKind {
    /// Returns the string representation of the provider kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MobileMoney => "mobile_money",
            Self::ConnectedAccount => "connected_account",
            Self::Prefunded => "prefunded",
        }
    }

    /// Parses a provider kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mobile_money" => Some(Self::MobileMoney),
            "connected_account" => Some(Self::ConnectedAccount),
            "prefunded" => Some(Self::Prefunded),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verification status of a payout profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    /// Organizer has not begun verification.
    NotStarted,
    /// Verification is in progress.
    Pending,
    /// Destination verified; disbursement allowed.
    Verified,
    /// Verification rejected.
    Rejected,
    /// Verifier needs more documents.
    RequiresMoreInfo,
}

impl ProfileStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::RequiresMoreInfo => "requires_more_info",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "not_started" => Some(Self::NotStarted),
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            "rejected" => Some(Self::Rejected),
            "requires_more_info" => Some(Self::RequiresMoreInfo),
            _ => None,
        }
    }
}

/// Destination details for one organizer on one provider.
///
/// Written by the external verification workflow; the disbursement
/// engine only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutProfile {
    /// Organizer who owns the profile.
    pub organizer_id: OrganizerId,
    /// Rail this profile belongs to.
    pub provider: ProviderKind,
    /// Opaque destination identifier (wallet number, connected account id).
    pub destination: String,
    /// Verification status.
    pub status: ProfileStatus,
    /// Whether the prefunded instant fast path may be used.
    pub instant_transfer_allowed: bool,
}

/// Provider-reported state of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    /// Funds delivered.
    Completed,
    /// Accepted but not yet settled; poll again later.
    Processing,
    /// The provider gave up on the transfer.
    Failed,
}

/// Result of an accepted transfer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Provider-side transaction identifier.
    pub transaction_id: String,
    /// Provider-reported state at acceptance time.
    pub status: ProviderStatus,
}

/// Uniform contract over every money-movement rail.
///
/// `reference` is always the caller-supplied idempotency key: a retried
/// call with the same reference must not move funds twice, and callers
/// must never synthesize a fresh reference for a retry of the same
/// logical transfer.
#[async_trait]
pub trait DisbursementProvider: Send + Sync {
    /// Which rail this provider drives.
    fn kind(&self) -> ProviderKind;

    /// Pushes funds to a destination, deduplicated on `reference`.
    async fn transfer(
        &self,
        amount: Money,
        destination: &str,
        reference: &str,
    ) -> Result<TransferReceipt, ProviderError>;

    /// Polls the state of a previously requested transfer.
    async fn status(&self, reference: &str) -> Result<ProviderStatus, ProviderError>;

    /// Returns the platform-side liquidity, where the rail has any.
    async fn balance(&self) -> Result<Money, ProviderError> {
        Err(ProviderError::Unsupported(self.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_roundtrip() {
        for kind in [
            ProviderKind::MobileMoney,
            ProviderKind::ConnectedAccount,
            ProviderKind::Prefunded,
        ] {
            assert_eq!(ProviderKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ProviderKind::parse("carrier_pigeon"), None);
    }

    #[test]
    fn test_profile_status_roundtrip() {
        for status in [
            ProfileStatus::NotStarted,
            ProfileStatus::Pending,
            ProfileStatus::Verified,
            ProfileStatus::Rejected,
            ProfileStatus::RequiresMoreInfo,
        ] {
            assert_eq!(ProfileStatus::parse(status.as_str()), Some(status));
        }
    }
}
