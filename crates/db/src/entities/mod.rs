//! `SeaORM` entity definitions for the settlement and payout engine.

pub mod event_earnings;
pub mod events;
pub mod payout_profiles;
pub mod payouts;
pub mod platform_settings;
pub mod platform_settings_history;
pub mod sea_orm_active_enums;
pub mod ticket_sales;
