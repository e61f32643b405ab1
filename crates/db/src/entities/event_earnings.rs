//! `SeaORM` Entity for the event_earnings projection table.
//!
//! One row per event; derived from the sales ledger and payout history,
//! recomputable at any time for reconciliation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::SettlementStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "event_earnings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_id: Uuid,
    pub organizer_id: Uuid,
    pub currency: String,
    pub gross_sales_minor: i64,
    pub platform_fee_minor: i64,
    pub processing_fee_minor: i64,
    pub net_amount_minor: i64,
    pub withdrawn_minor: i64,
    pub available_minor: i64,
    pub settlement_status: SettlementStatus,
    pub settlement_ready_at: DateTimeWithTimeZone,
    pub computed_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::events::Entity",
        from = "Column::EventId",
        to = "super::events::Column::Id"
    )]
    Events,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
