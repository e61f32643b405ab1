//! Mobile-money transfer client (Haiti jurisdiction).

use async_trait::async_trait;
use std::time::Duration;
use tikera_shared::config::ProviderEndpoint;
use tikera_shared::types::Money;

use crate::disbursement::error::ProviderError;
use crate::disbursement::providers::{
    TransferRequest, TransferResponse, map_error_response, map_transport_error, parse_status,
};
use crate::disbursement::types::{
    DisbursementProvider, ProviderKind, ProviderStatus, TransferReceipt,
};

/// HTTP client for the mobile-money rail.
#[derive(Debug, Clone)]
pub struct MobileMoneyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl MobileMoneyClient {
    /// Creates a client for the configured endpoint.
    #[must_use]
    pub fn new(endpoint: &ProviderEndpoint) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            api_key: endpoint.api_key.clone(),
            timeout: Duration::from_secs(endpoint.timeout_secs),
        }
    }

    async fn post_transfer(
        &self,
        amount: Money,
        destination: &str,
        reference: &str,
        instant: bool,
    ) -> Result<TransferReceipt, ProviderError> {
        let body = TransferRequest {
            amount_minor: amount.minor,
            currency: amount.currency.as_str(),
            destination,
            reference,
            instant,
        };

        let response = self
            .http
            .post(format!("{}/transfers", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(&e, reference))?;

        if !response.status().is_success() {
            return Err(map_error_response(response).await);
        }

        let parsed: TransferResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Protocol(e.to_string()))?;
        parsed.into_receipt()
    }

    async fn get_status(&self, reference: &str) -> Result<ProviderStatus, ProviderError> {
        let response = self
            .http
            .get(format!("{}/transfers/{reference}", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(&e, reference))?;

        if !response.status().is_success() {
            return Err(map_error_response(response).await);
        }

        let parsed: TransferResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Protocol(e.to_string()))?;
        parse_status(&parsed.status)
    }
}

#[async_trait]
impl DisbursementProvider for MobileMoneyClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::MobileMoney
    }

    async fn transfer(
        &self,
        amount: Money,
        destination: &str,
        reference: &str,
    ) -> Result<TransferReceipt, ProviderError> {
        self.post_transfer(amount, destination, reference, false)
            .await
    }

    async fn status(&self, reference: &str) -> Result<ProviderStatus, ProviderError> {
        self.get_status(reference).await
    }
}

impl MobileMoneyClient {
    /// Requests a transfer on the instant (prefunded) path.
    ///
    /// Used by the prefunded wrapper; same idempotency semantics as
    /// `transfer`.
    pub(crate) async fn transfer_instant(
        &self,
        amount: Money,
        destination: &str,
        reference: &str,
    ) -> Result<TransferReceipt, ProviderError> {
        self.post_transfer(amount, destination, reference, true)
            .await
    }

    /// Reads the platform's prefunded wallet balance on this rail.
    pub(crate) async fn wallet_balance(&self) -> Result<Money, ProviderError> {
        let response = self
            .http
            .get(format!("{}/balance", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(&e, "balance"))?;

        if !response.status().is_success() {
            return Err(map_error_response(response).await);
        }

        let parsed: super::BalanceResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Protocol(e.to_string()))?;
        parsed.into_money()
    }
}
