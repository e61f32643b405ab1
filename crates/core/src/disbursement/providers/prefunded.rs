//! Prefunded-balance fast path.
//!
//! Wraps the mobile-money rail: when the platform holds enough liquidity
//! in its prefunded wallet, transfers go out instantly instead of waiting
//! on the underlying rail. The balance check happens before every
//! transfer; an underfunded wallet yields `InsufficientPrefundedBalance`
//! so the router can fall back to the standard rail with the SAME
//! reference.

use async_trait::async_trait;
use tikera_shared::config::ProviderEndpoint;
use tikera_shared::types::Money;

use crate::disbursement::error::ProviderError;
use crate::disbursement::providers::mobile_money::MobileMoneyClient;
use crate::disbursement::types::{
    DisbursementProvider, ProviderKind, ProviderStatus, TransferReceipt,
};

/// Instant-transfer wrapper over the mobile-money rail.
#[derive(Debug, Clone)]
pub struct PrefundedBalanceClient {
    inner: MobileMoneyClient,
}

impl PrefundedBalanceClient {
    /// Creates a prefunded client over the mobile-money endpoint.
    #[must_use]
    pub fn new(endpoint: &ProviderEndpoint) -> Self {
        Self {
            inner: MobileMoneyClient::new(endpoint),
        }
    }
}

#[async_trait]
impl DisbursementProvider for PrefundedBalanceClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Prefunded
    }

    async fn transfer(
        &self,
        amount: Money,
        destination: &str,
        reference: &str,
    ) -> Result<TransferReceipt, ProviderError> {
        let available = self.balance().await?;

        let covered = available.currency == amount.currency
            && available.cmp_amount(&amount).is_ok_and(std::cmp::Ordering::is_ge);
        if !covered {
            return Err(ProviderError::InsufficientPrefundedBalance {
                available,
                requested: amount,
            });
        }

        self.inner
            .transfer_instant(amount, destination, reference)
            .await
    }

    async fn status(&self, reference: &str) -> Result<ProviderStatus, ProviderError> {
        self.inner.status(reference).await
    }

    async fn balance(&self) -> Result<Money, ProviderError> {
        self.inner.wallet_balance().await
    }
}
