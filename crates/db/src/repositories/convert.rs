//! Conversions between database models and core domain types.

use tikera_shared::types::{Currency, EventId, Money, OrganizerId, SaleId};

use tikera_core::disbursement::{PayoutProfile, ProfileStatus, ProviderKind};
use tikera_core::earnings::{ConfirmedSale, EventMeta, SettlementStatus};
use tikera_core::payout::PayoutStatus;

use crate::entities::{events, payout_profiles, sea_orm_active_enums, ticket_sales};

/// Parses a stored currency code, reporting the offending value.
pub fn parse_currency(raw: &str) -> Result<Currency, String> {
    raw.parse()
        .map_err(|_| format!("unknown currency in store: {raw}"))
}

/// Converts an events row into the core event metadata.
pub fn event_meta_from_model(model: &events::Model) -> Result<EventMeta, String> {
    Ok(EventMeta {
        event_id: EventId::from_uuid(model.id),
        organizer_id: OrganizerId::from_uuid(model.organizer_id),
        country_code: model.country_code.clone(),
        currency: parse_currency(&model.currency)?,
        end_at: model.end_at.into(),
    })
}

/// Converts a ticket_sales row into a core confirmed sale.
pub fn sale_from_model(model: &ticket_sales::Model) -> Result<ConfirmedSale, String> {
    Ok(ConfirmedSale {
        sale_id: SaleId::from_uuid(model.id),
        amount: Money::new(model.amount_minor, parse_currency(&model.currency)?),
        sold_at: model.sold_at.into(),
    })
}

/// Converts a payout_profiles row into the core profile type.
pub fn profile_from_model(model: &payout_profiles::Model) -> PayoutProfile {
    PayoutProfile {
        organizer_id: OrganizerId::from_uuid(model.organizer_id),
        provider: provider_kind_to_core(&model.provider),
        destination: model.destination.clone(),
        status: profile_status_to_core(&model.status),
        instant_transfer_allowed: model.instant_transfer_allowed,
    }
}

/// Converts a database payout status to the core status.
pub fn payout_status_to_core(status: &sea_orm_active_enums::PayoutStatus) -> PayoutStatus {
    match status {
        sea_orm_active_enums::PayoutStatus::Pending => PayoutStatus::Pending,
        sea_orm_active_enums::PayoutStatus::Approved => PayoutStatus::Approved,
        sea_orm_active_enums::PayoutStatus::Paid => PayoutStatus::Paid,
        sea_orm_active_enums::PayoutStatus::Failed => PayoutStatus::Failed,
        sea_orm_active_enums::PayoutStatus::Cancelled => PayoutStatus::Cancelled,
    }
}

/// Converts a core payout status to the database enum.
pub fn payout_status_to_db(status: PayoutStatus) -> sea_orm_active_enums::PayoutStatus {
    match status {
        PayoutStatus::Pending => sea_orm_active_enums::PayoutStatus::Pending,
        PayoutStatus::Approved => sea_orm_active_enums::PayoutStatus::Approved,
        PayoutStatus::Paid => sea_orm_active_enums::PayoutStatus::Paid,
        PayoutStatus::Failed => sea_orm_active_enums::PayoutStatus::Failed,
        PayoutStatus::Cancelled => sea_orm_active_enums::PayoutStatus::Cancelled,
    }
}

/// Converts a database provider kind to the core kind.
pub fn provider_kind_to_core(kind: &sea_orm_active_enums::ProviderKind) -> ProviderKind {
    match kind {
        sea_orm_active_enums::ProviderKind::MobileMoney => ProviderKind::MobileMoney,
        sea_orm_active_enums::ProviderKind::ConnectedAccount => ProviderKind::ConnectedAccount,
        sea_orm_active_enums::ProviderKind::Prefunded => ProviderKind::Prefunded,
    }
}

/// Converts a core provider kind to the database enum.
pub fn provider_kind_to_db(kind: ProviderKind) -> sea_orm_active_enums::ProviderKind {
    match kind {
        ProviderKind::MobileMoney => sea_orm_active_enums::ProviderKind::MobileMoney,
        ProviderKind::ConnectedAccount => sea_orm_active_enums::ProviderKind::ConnectedAccount,
        ProviderKind::Prefunded => sea_orm_active_enums::ProviderKind::Prefunded,
    }
}

/// Converts a database profile status to the core status.
pub fn profile_status_to_core(status: &sea_orm_active_enums::ProfileStatus) -> ProfileStatus {
    match status {
        sea_orm_active_enums::ProfileStatus::NotStarted => ProfileStatus::NotStarted,
        sea_orm_active_enums::ProfileStatus::Pending => ProfileStatus::Pending,
        sea_orm_active_enums::ProfileStatus::Verified => ProfileStatus::Verified,
        sea_orm_active_enums::ProfileStatus::Rejected => ProfileStatus::Rejected,
        sea_orm_active_enums::ProfileStatus::RequiresMoreInfo => ProfileStatus::RequiresMoreInfo,
    }
}

/// Converts a core profile status to the database enum.
pub fn profile_status_to_db(status: ProfileStatus) -> sea_orm_active_enums::ProfileStatus {
    match status {
        ProfileStatus::NotStarted => sea_orm_active_enums::ProfileStatus::NotStarted,
        ProfileStatus::Pending => sea_orm_active_enums::ProfileStatus::Pending,
        ProfileStatus::Verified => sea_orm_active_enums::ProfileStatus::Verified,
        ProfileStatus::Rejected => sea_orm_active_enums::ProfileStatus::Rejected,
        ProfileStatus::RequiresMoreInfo => sea_orm_active_enums::ProfileStatus::RequiresMoreInfo,
    }
}

/// Converts a core settlement status to the database enum.
pub fn settlement_status_to_db(
    status: SettlementStatus,
) -> sea_orm_active_enums::SettlementStatus {
    match status {
        SettlementStatus::Pending => sea_orm_active_enums::SettlementStatus::Pending,
        SettlementStatus::Ready => sea_orm_active_enums::SettlementStatus::Ready,
        SettlementStatus::Withdrawn => sea_orm_active_enums::SettlementStatus::Withdrawn,
    }
}

/// Converts a database settlement status to the core status.
pub fn settlement_status_to_core(
    status: &sea_orm_active_enums::SettlementStatus,
) -> SettlementStatus {
    match status {
        sea_orm_active_enums::SettlementStatus::Pending => SettlementStatus::Pending,
        sea_orm_active_enums::SettlementStatus::Ready => SettlementStatus::Ready,
        sea_orm_active_enums::SettlementStatus::Withdrawn => SettlementStatus::Withdrawn,
    }
}
