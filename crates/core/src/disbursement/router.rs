//! Jurisdiction-based provider selection and transfer execution.

use tikera_shared::config::ProvidersConfig;
use tikera_shared::types::Money;
use tracing::warn;

use crate::disbursement::error::ProviderError;
use crate::disbursement::providers::{
    ConnectedAccountClient, MobileMoneyClient, PrefundedBalanceClient,
};
use crate::disbursement::types::{
    DisbursementProvider, PayoutProfile, ProfileStatus, ProviderKind, ProviderStatus,
    TransferReceipt,
};
use crate::fees::Jurisdiction;

/// Selects exactly one money-movement provider per organizer/jurisdiction
/// and drives transfers through it.
pub struct DisbursementRouter {
    mobile_money: MobileMoneyClient,
    connected_account: ConnectedAccountClient,
    prefunded: Option<PrefundedBalanceClient>,
}

impl DisbursementRouter {
    /// Builds the router and its provider clients from configuration.
    #[must_use]
    pub fn from_config(config: &ProvidersConfig) -> Self {
        Self {
            mobile_money: MobileMoneyClient::new(&config.mobile_money),
            connected_account: ConnectedAccountClient::new(&config.connected_account),
            prefunded: config
                .prefunded_enabled
                .then(|| PrefundedBalanceClient::new(&config.mobile_money)),
        }
    }

    /// Selects the provider for an organizer's payout.
    ///
    /// Haiti routes to mobile money, with the prefunded fast path when
    /// liquidity is enabled and the profile allows instant transfers;
    /// US/Canada routes to connected-account rails. The profile must be
    /// verified.
    pub fn route(
        &self,
        jurisdiction: Jurisdiction,
        profile: &PayoutProfile,
    ) -> Result<&dyn DisbursementProvider, ProviderError> {
        if profile.status != ProfileStatus::Verified {
            return Err(ProviderError::DestinationInvalid(format!(
                "payout profile is {} (must be verified)",
                profile.status.as_str()
            )));
        }

        Ok(match jurisdiction {
            Jurisdiction::Haiti => match &self.prefunded {
                Some(prefunded) if profile.instant_transfer_allowed => prefunded,
                _ => &self.mobile_money,
            },
            Jurisdiction::UsCanada => &self.connected_account,
        })
    }

    /// Executes a transfer through the routed provider.
    ///
    /// `reference` is the payout's idempotency key; it is passed through
    /// unchanged on the prefunded-to-standard fallback so the rails can
    /// dedupe a retried logical transfer.
    pub async fn execute(
        &self,
        jurisdiction: Jurisdiction,
        profile: &PayoutProfile,
        amount: Money,
        reference: &str,
    ) -> Result<TransferReceipt, ProviderError> {
        let provider = self.route(jurisdiction, profile)?;

        match provider
            .transfer(amount, &profile.destination, reference)
            .await
        {
            Err(ProviderError::InsufficientPrefundedBalance {
                available,
                requested,
            }) if provider.kind() == ProviderKind::Prefunded => {
                warn!(
                    available = %available.format_display(),
                    requested = %requested.format_display(),
                    reference,
                    "prefunded balance exhausted, falling back to standard rail"
                );
                self.mobile_money
                    .transfer(amount, &profile.destination, reference)
                    .await
            }
            other => other,
        }
    }

    /// Polls the provider for the state of an in-flight transfer.
    ///
    /// Used to resolve payouts whose transfer call timed out: a timeout
    /// means unknown, so the payout stays approved until this answers.
    pub async fn poll_status(
        &self,
        jurisdiction: Jurisdiction,
        profile: &PayoutProfile,
        reference: &str,
    ) -> Result<ProviderStatus, ProviderError> {
        let provider = self.route(jurisdiction, profile)?;
        let status = provider.status(reference).await;

        // A transfer that fell back to the standard rail lives there, not
        // on the prefunded path; check both before giving up.
        if matches!(&status, Err(e) if !e.is_retryable())
            && provider.kind() == ProviderKind::Prefunded
        {
            return self.mobile_money.status(reference).await;
        }
        status
    }

    /// Returns the prefunded wallet balance, if the fast path is enabled.
    pub async fn prefunded_balance(&self) -> Option<Result<Money, ProviderError>> {
        match &self.prefunded {
            Some(prefunded) => Some(prefunded.balance().await),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tikera_shared::config::ProviderEndpoint;
    use tikera_shared::types::OrganizerId;

    fn endpoint() -> ProviderEndpoint {
        ProviderEndpoint {
            base_url: "http://localhost:9".to_string(),
            api_key: "test-key".to_string(),
            timeout_secs: 1,
        }
    }

    fn router(prefunded_enabled: bool) -> DisbursementRouter {
        DisbursementRouter::from_config(&ProvidersConfig {
            mobile_money: endpoint(),
            connected_account: endpoint(),
            prefunded_enabled,
        })
    }

    fn profile(
        provider: ProviderKind,
        status: ProfileStatus,
        instant: bool,
    ) -> PayoutProfile {
        PayoutProfile {
            organizer_id: OrganizerId::new(),
            provider,
            destination: "wallet-123".to_string(),
            status,
            instant_transfer_allowed: instant,
        }
    }

    #[test]
    fn test_route_haiti_to_mobile_money() {
        let router = router(false);
        let profile = profile(ProviderKind::MobileMoney, ProfileStatus::Verified, false);
        let provider = router.route(Jurisdiction::Haiti, &profile).unwrap();
        assert_eq!(provider.kind(), ProviderKind::MobileMoney);
    }

    #[test]
    fn test_route_haiti_prefers_prefunded_when_allowed() {
        let router = router(true);
        let profile = profile(ProviderKind::MobileMoney, ProfileStatus::Verified, true);
        let provider = router.route(Jurisdiction::Haiti, &profile).unwrap();
        assert_eq!(provider.kind(), ProviderKind::Prefunded);
    }

    #[test]
    fn test_route_haiti_ignores_prefunded_without_flag() {
        let router = router(true);
        let profile = profile(ProviderKind::MobileMoney, ProfileStatus::Verified, false);
        let provider = router.route(Jurisdiction::Haiti, &profile).unwrap();
        assert_eq!(provider.kind(), ProviderKind::MobileMoney);
    }

    #[test]
    fn test_route_us_canada_to_connected_account() {
        let router = router(true);
        let profile = profile(
            ProviderKind::ConnectedAccount,
            ProfileStatus::Verified,
            false,
        );
        let provider = router.route(Jurisdiction::UsCanada, &profile).unwrap();
        assert_eq!(provider.kind(), ProviderKind::ConnectedAccount);
    }

    #[test]
    fn test_route_rejects_unverified_profile() {
        let router = router(false);
        for status in [
            ProfileStatus::NotStarted,
            ProfileStatus::Pending,
            ProfileStatus::Rejected,
            ProfileStatus::RequiresMoreInfo,
        ] {
            let profile = profile(ProviderKind::MobileMoney, status, false);
            let result = router.route(Jurisdiction::Haiti, &profile);
            assert!(matches!(
                result,
                Err(ProviderError::DestinationInvalid(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_prefunded_balance_none_when_disabled() {
        let router = router(false);
        assert!(router.prefunded_balance().await.is_none());
    }
}
