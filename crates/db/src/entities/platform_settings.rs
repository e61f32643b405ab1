//! `SeaORM` Entity for the platform_settings singleton.
//!
//! Exactly one row (`id = 1`, enforced in the schema); every update is
//! mirrored into platform_settings_history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "platform_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i16,
    pub haiti_fee_rate: Decimal,
    pub haiti_hold_days: i32,
    pub us_canada_fee_rate: Decimal,
    pub us_canada_hold_days: i32,
    pub minimum_payout_minor: i64,
    pub minimum_payout_currency: String,
    pub updated_at: DateTimeWithTimeZone,
    pub updated_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
