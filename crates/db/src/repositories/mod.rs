//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Payout status transitions are guarded here: the current
//! status is re-asserted inside the same atomic update that writes the
//! new status.

pub mod convert;
pub mod disbursement;
pub mod earnings;
pub mod payout;
pub mod profile;
pub mod sales;
pub mod settings;

pub use disbursement::{
    DisbursementError, DisbursementRepository, DisbursementStats, EndedEventAwaiting,
};
pub use earnings::EarningsRepository;
pub use payout::{CreatePayoutInput, ExecuteError, PayoutRepository};
pub use profile::PayoutProfileRepository;
pub use sales::SalesLedgerRepository;
pub use settings::{SettingsError, SettingsRepository, SettingsUpdate};
