//! Payout-profile repository.
//!
//! Profiles are owned by the external verification workflow; the engine
//! reads them to resolve transfer destinations. The upsert exists for
//! the verification webhook and the development seeder.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use tikera_core::disbursement::{PayoutProfile, ProviderKind};
use tikera_shared::types::OrganizerId;

use super::convert::{profile_from_model, profile_status_to_db, provider_kind_to_db};
use crate::entities::payout_profiles;

/// Repository over payout_profiles.
#[derive(Debug, Clone)]
pub struct PayoutProfileRepository {
    db: DatabaseConnection,
}

impl PayoutProfileRepository {
    /// Creates a new payout-profile repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the profile for an organizer on a provider, if any.
    pub async fn get(
        &self,
        organizer_id: OrganizerId,
        provider: ProviderKind,
    ) -> Result<Option<PayoutProfile>, DbErr> {
        let model = payout_profiles::Entity::find()
            .filter(payout_profiles::Column::OrganizerId.eq(organizer_id.into_inner()))
            .filter(payout_profiles::Column::Provider.eq(provider_kind_to_db(provider)))
            .one(&self.db)
            .await?;

        Ok(model.as_ref().map(profile_from_model))
    }

    /// Creates or replaces the profile for (organizer, provider).
    pub async fn upsert(&self, profile: &PayoutProfile) -> Result<(), DbErr> {
        let now = Utc::now();
        let active = payout_profiles::ActiveModel {
            id: Set(Uuid::now_v7()),
            organizer_id: Set(profile.organizer_id.into_inner()),
            provider: Set(provider_kind_to_db(profile.provider)),
            destination: Set(profile.destination.clone()),
            status: Set(profile_status_to_db(profile.status)),
            instant_transfer_allowed: Set(profile.instant_transfer_allowed),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        payout_profiles::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    payout_profiles::Column::OrganizerId,
                    payout_profiles::Column::Provider,
                ])
                .update_columns([
                    payout_profiles::Column::Destination,
                    payout_profiles::Column::Status,
                    payout_profiles::Column::InstantTransferAllowed,
                    payout_profiles::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }
}
