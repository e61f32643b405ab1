//! Disbursement routing across money-movement providers.
//!
//! Selects exactly one provider per organizer/jurisdiction and exposes a
//! uniform transfer/status/balance contract regardless of rail. The wire
//! protocols themselves are opaque transfer/status/balance operations.
//!
//! # Modules
//!
//! - `types` - Provider kinds, payout profiles, transfer receipts
//! - `error` - Provider failure taxonomy
//! - `router` - Jurisdiction-based provider selection and execution
//! - `providers` - HTTP clients for the concrete rails

pub mod error;
pub mod providers;
pub mod router;
pub mod types;

pub use error::ProviderError;
pub use providers::{ConnectedAccountClient, MobileMoneyClient, PrefundedBalanceClient};
pub use router::DisbursementRouter;
pub use types::{
    DisbursementProvider, PayoutProfile, ProfileStatus, ProviderKind, ProviderStatus,
    TransferReceipt,
};
