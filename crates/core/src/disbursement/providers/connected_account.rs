//! Connected-account payout client (US/Canada jurisdiction).

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

/// HTTP client for the card-network connected-account rail.
///
/// `destination` is the organizer's connected account identifier from
/// their verified payout profile.
#[derive(Debug, Clone)]
pub struct ConnectedAccountClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl ConnectedAccountClient {
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
}

#[async_trait]
impl DisbursementProvider for ConnectedAccountClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::ConnectedAccount
    }

    async fn transfer(
        &self,
        amount: Money,
        destination: &str,
        reference: &str,
    ) -> Result<TransferReceipt, ProviderError> {
        let body = TransferRequest {
            amount_minor: amount.minor,
            currency: amount.currency.as_str(),
            destination,
            reference,
            instant: false,
        };

        let response = self
            .http
            .post(format!("{}/payouts", self.base_url))
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

    async fn status(&self, reference: &str) -> Result<ProviderStatus, ProviderError> {
        let response = self
            .http
            .get(format!("{}/payouts/{reference}", self.base_url))
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
