//! `SeaORM` Entity for the platform_settings_history audit table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "platform_settings_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub haiti_fee_rate: Decimal,
    pub haiti_hold_days: i32,
    pub us_canada_fee_rate: Decimal,
    pub us_canada_hold_days: i32,
    pub minimum_payout_minor: i64,
    pub minimum_payout_currency: String,
    pub changed_at: DateTimeWithTimeZone,
    pub changed_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
