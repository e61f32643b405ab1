//! Platform-settings repository with a process-wide cache.
//!
//! Settings are read-mostly: reads come from a Moka cache with a short
//! TTL, invalidated synchronously by the admin write path. If the store
//! is unreachable, reads degrade to the last-known-good snapshot with a
//! warning; fee computation never silently falls back to zero.

use chrono::Utc;
use moka::sync::Cache;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use tikera_core::fees::{LocationFeeConfig, PlatformSettings};
use tikera_shared::types::{AdminId, Money};

use super::convert::parse_currency;
use crate::entities::{platform_settings, platform_settings_history};

/// Singleton row id of the settings table.
const SETTINGS_ROW_ID: i16 = 1;

/// Cache key; there is only ever one entry.
const CACHE_KEY: u8 = 0;

/// Cache TTL. Writes invalidate explicitly, so this only bounds how long
/// a different process lags behind an admin change.
const CACHE_TTL_SECS: u64 = 300;

/// Errors from the settings repository.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings store could not be reached and no last-known-good
    /// snapshot exists yet.
    #[error("Platform settings unavailable: {0}")]
    Unavailable(String),

    /// The singleton row is missing (migration seeds it).
    #[error("Platform settings row missing")]
    Missing,

    /// A stored value cannot be interpreted.
    #[error("Invalid stored settings: {0}")]
    Corrupt(String),

    /// A proposed update fails validation.
    #[error("Invalid settings update: {0}")]
    InvalidUpdate(String),
}

impl SettingsError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unavailable(_) => 503,
            Self::Missing | Self::Corrupt(_) => 500,
            Self::InvalidUpdate(_) => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "SETTINGS_UNAVAILABLE",
            Self::Missing => "SETTINGS_MISSING",
            Self::Corrupt(_) => "SETTINGS_CORRUPT",
            Self::InvalidUpdate(_) => "INVALID_SETTINGS_UPDATE",
        }
    }
}

/// Admin-proposed settings change.
#[derive(Debug, Clone)]
pub struct SettingsUpdate {
    /// Fee configuration for Haiti.
    pub haiti: LocationFeeConfig,
    /// Fee configuration for US/Canada.
    pub us_canada: LocationFeeConfig,
    /// Smallest payout the platform will create.
    pub minimum_payout: Money,
}

/// Cached platform-settings repository.
#[derive(Clone)]
pub struct SettingsRepository {
    db: DatabaseConnection,
    cache: Cache<u8, Arc<PlatformSettings>>,
    last_known_good: Arc<RwLock<Option<Arc<PlatformSettings>>>>,
}

impl SettingsRepository {
    /// Creates a new settings repository with a cold cache.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
            .build();
        Self {
            db,
            cache,
            last_known_good: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the current platform settings.
    ///
    /// Reads never block on external I/O once warm. A store outage is
    /// served from the last-known-good snapshot with a degraded-mode
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store is unreachable and no
    /// snapshot has ever been loaded.
    pub async fn get(&self) -> Result<Arc<PlatformSettings>, SettingsError> {
        if let Some(cached) = self.cache.get(&CACHE_KEY) {
            return Ok(cached);
        }

        match self.load().await {
            Ok(settings) => {
                self.cache.insert(CACHE_KEY, settings.clone());
                *self.lkg_write() = Some(settings.clone());
                Ok(settings)
            }
            Err(e) => {
                let fallback = self.lkg_read();
                match fallback {
                    Some(snapshot) => {
                        warn!(error = %e, "settings store unavailable, serving last-known-good");
                        Ok(snapshot)
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Applies an admin settings change and synchronously invalidates
    /// the cache.
    ///
    /// The previous values are recorded in the history table inside the
    /// same database transaction.
    pub async fn update(
        &self,
        update: SettingsUpdate,
        changed_by: Option<AdminId>,
    ) -> Result<Arc<PlatformSettings>, SettingsError> {
        validate_update(&update)?;

        let now = Utc::now();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SettingsError::Unavailable(e.to_string()))?;

        let active = platform_settings::ActiveModel {
            id: Set(SETTINGS_ROW_ID),
            haiti_fee_rate: Set(update.haiti.platform_fee_rate),
            haiti_hold_days: Set(hold_days_to_db(update.haiti.settlement_hold_days)),
            us_canada_fee_rate: Set(update.us_canada.platform_fee_rate),
            us_canada_hold_days: Set(hold_days_to_db(update.us_canada.settlement_hold_days)),
            minimum_payout_minor: Set(update.minimum_payout.minor),
            minimum_payout_currency: Set(update.minimum_payout.currency.as_str().to_string()),
            updated_at: Set(now.into()),
            updated_by: Set(changed_by.map(AdminId::into_inner)),
        };
        active
            .update(&txn)
            .await
            .map_err(|e| SettingsError::Unavailable(e.to_string()))?;

        let history = platform_settings_history::ActiveModel {
            id: Set(Uuid::now_v7()),
            haiti_fee_rate: Set(update.haiti.platform_fee_rate),
            haiti_hold_days: Set(hold_days_to_db(update.haiti.settlement_hold_days)),
            us_canada_fee_rate: Set(update.us_canada.platform_fee_rate),
            us_canada_hold_days: Set(hold_days_to_db(update.us_canada.settlement_hold_days)),
            minimum_payout_minor: Set(update.minimum_payout.minor),
            minimum_payout_currency: Set(update.minimum_payout.currency.as_str().to_string()),
            changed_at: Set(now.into()),
            changed_by: Set(changed_by.map(AdminId::into_inner)),
        };
        history
            .insert(&txn)
            .await
            .map_err(|e| SettingsError::Unavailable(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| SettingsError::Unavailable(e.to_string()))?;

        let settings = Arc::new(PlatformSettings {
            haiti: update.haiti,
            us_canada: update.us_canada,
            minimum_payout: update.minimum_payout,
            updated_at: now,
            updated_by: changed_by,
        });

        // Invalidation is synchronous with the write path: the next read
        // sees the new values, in this process immediately.
        self.cache.invalidate(&CACHE_KEY);
        self.cache.insert(CACHE_KEY, settings.clone());
        *self.lkg_write() = Some(settings.clone());

        Ok(settings)
    }

    /// Drops the cached snapshot; the next read reloads from the store.
    pub fn invalidate(&self) {
        self.cache.invalidate(&CACHE_KEY);
    }

    fn lkg_read(&self) -> Option<Arc<PlatformSettings>> {
        self.last_known_good
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn lkg_write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Arc<PlatformSettings>>> {
        self.last_known_good
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn load(&self) -> Result<Arc<PlatformSettings>, SettingsError> {
        let row = platform_settings::Entity::find_by_id(SETTINGS_ROW_ID)
            .one(&self.db)
            .await
            .map_err(|e| SettingsError::Unavailable(e.to_string()))?
            .ok_or(SettingsError::Missing)?;

        let minimum_currency =
            parse_currency(&row.minimum_payout_currency).map_err(SettingsError::Corrupt)?;

        Ok(Arc::new(PlatformSettings {
            haiti: LocationFeeConfig {
                platform_fee_rate: row.haiti_fee_rate,
                settlement_hold_days: hold_days_from_db(row.haiti_hold_days)?,
            },
            us_canada: LocationFeeConfig {
                platform_fee_rate: row.us_canada_fee_rate,
                settlement_hold_days: hold_days_from_db(row.us_canada_hold_days)?,
            },
            minimum_payout: Money::new(row.minimum_payout_minor, minimum_currency),
            updated_at: row.updated_at.into(),
            updated_by: row.updated_by.map(AdminId::from_uuid),
        }))
    }
}

fn validate_update(update: &SettingsUpdate) -> Result<(), SettingsError> {
    for (label, config) in [("haiti", &update.haiti), ("us-canada", &update.us_canada)] {
        if config.platform_fee_rate < Decimal::ZERO || config.platform_fee_rate > Decimal::ONE {
            return Err(SettingsError::InvalidUpdate(format!(
                "{label} fee rate {} is outside [0, 1]",
                config.platform_fee_rate
            )));
        }
    }
    if update.minimum_payout.is_negative() {
        return Err(SettingsError::InvalidUpdate(
            "minimum payout cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn hold_days_to_db(days: u32) -> i32 {
    i32::try_from(days).unwrap_or(i32::MAX)
}

fn hold_days_from_db(days: i32) -> Result<u32, SettingsError> {
    u32::try_from(days)
        .map_err(|_| SettingsError::Corrupt(format!("negative hold days in store: {days}")))
}
