//! `SeaORM` Entity for the events table (read-only ledger replica).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub name: String,
    pub country_code: String,
    pub currency: String,
    pub end_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ticket_sales::Entity")]
    TicketSales,
    #[sea_orm(has_one = "super::event_earnings::Entity")]
    EventEarnings,
}

impl Related<super::ticket_sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketSales.def()
    }
}

impl Related<super::event_earnings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventEarnings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
