//! Platform fee and settlement-hold policy.
//!
//! Resolves a coarse jurisdiction bucket from an event's country code and
//! applies the per-jurisdiction fee percentage and hold period from the
//! mutable platform settings record.
//!
//! # Modules
//!
//! - `jurisdiction` - Country-code to jurisdiction bucket resolution
//! - `policy` - Fee configuration, fee computation, settlement-ready dates
//! - `error` - Fee-policy error types

pub mod error;
pub mod jurisdiction;
pub mod policy;

pub use error::FeeError;
pub use jurisdiction::Jurisdiction;
pub use policy::{
    LocationFeeConfig, PlatformSettings, ProcessingFeeSchedule, platform_fee, settlement_ready_at,
};
