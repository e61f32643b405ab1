//! HTTP clients for the concrete money-movement rails.
//!
//! Each client treats its rail as opaque transfer/status/balance
//! operations with a bounded per-request timeout. The `reference` field
//! in every request is the idempotency key the provider dedupes on.

pub mod connected_account;
pub mod mobile_money;
pub mod prefunded;

pub use connected_account::ConnectedAccountClient;
pub use mobile_money::MobileMoneyClient;
pub use prefunded::PrefundedBalanceClient;

use serde::{Deserialize, Serialize};
use tikera_shared::types::{Currency, Money};

use crate::disbursement::error::ProviderError;
use crate::disbursement::types::{ProviderStatus, TransferReceipt};

/// Wire body for a transfer request.
#[derive(Debug, Serialize)]
pub(crate) struct TransferRequest<'a> {
    /// Amount in minor units.
    pub amount_minor: i64,
    /// ISO currency code.
    pub currency: &'a str,
    /// Opaque destination identifier.
    pub destination: &'a str,
    /// Caller-supplied idempotency key.
    pub reference: &'a str,
    /// Whether the prefunded instant path is requested.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub instant: bool,
}

/// Wire body of a transfer or status response.
#[derive(Debug, Deserialize)]
pub(crate) struct TransferResponse {
    pub transaction_id: String,
    pub status: String,
}

/// Wire body of a balance response.
#[derive(Debug, Deserialize)]
pub(crate) struct BalanceResponse {
    pub amount_minor: i64,
    pub currency: String,
}

impl TransferResponse {
    pub(crate) fn into_receipt(self) -> Result<TransferReceipt, ProviderError> {
        Ok(TransferReceipt {
            status: parse_status(&self.status)?,
            transaction_id: self.transaction_id,
        })
    }
}

impl BalanceResponse {
    pub(crate) fn into_money(self) -> Result<Money, ProviderError> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e: String| ProviderError::Protocol(e))?;
        Ok(Money::new(self.amount_minor, currency))
    }
}

pub(crate) fn parse_status(raw: &str) -> Result<ProviderStatus, ProviderError> {
    match raw {
        "completed" | "succeeded" => Ok(ProviderStatus::Completed),
        "processing" | "pending" => Ok(ProviderStatus::Processing),
        "failed" => Ok(ProviderStatus::Failed),
        other => Err(ProviderError::Protocol(format!(
            "unknown transfer status: {other}"
        ))),
    }
}

/// Maps a transport-level failure onto the provider taxonomy.
pub(crate) fn map_transport_error(err: &reqwest::Error, reference: &str) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout {
            reference: reference.to_string(),
        }
    } else {
        ProviderError::Unavailable(err.to_string())
    }
}

/// Maps a non-2xx provider response onto the provider taxonomy.
pub(crate) async fn map_error_response(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY
        || status == reqwest::StatusCode::BAD_REQUEST
    {
        ProviderError::DestinationInvalid(if body.is_empty() {
            format!("provider rejected the destination ({status})")
        } else {
            body
        })
    } else {
        ProviderError::Unavailable(format!("{status}: {body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("completed").unwrap(), ProviderStatus::Completed);
        assert_eq!(parse_status("succeeded").unwrap(), ProviderStatus::Completed);
        assert_eq!(parse_status("processing").unwrap(), ProviderStatus::Processing);
        assert_eq!(parse_status("failed").unwrap(), ProviderStatus::Failed);
        assert!(matches!(
            parse_status("exploded"),
            Err(ProviderError::Protocol(_))
        ));
    }

    #[test]
    fn test_balance_response_parses_currency() {
        let response = BalanceResponse {
            amount_minor: 750_000,
            currency: "HTG".to_string(),
        };
        let money = response.into_money().unwrap();
        assert_eq!(money, Money::new(750_000, Currency::Htg));
    }

    #[test]
    fn test_balance_response_rejects_unknown_currency() {
        let response = BalanceResponse {
            amount_minor: 1,
            currency: "XAU".to_string(),
        };
        assert!(matches!(
            response.into_money(),
            Err(ProviderError::Protocol(_))
        ));
    }
}
