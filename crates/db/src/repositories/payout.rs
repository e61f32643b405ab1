//! Payout repository with guarded lifecycle transitions.
//!
//! Every status change re-asserts the observed status inside the same
//! atomic UPDATE that writes the new one (`UPDATE ... WHERE id = ? AND
//! status = ?`). Two concurrent approvals on one payout therefore end
//! with exactly one success; the loser observes the new status and gets
//! an idempotency violation. Bulk operations must iterate ids through
//! these same single-payout guards.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use thiserror::Error;
use tracing::warn;

use tikera_core::disbursement::{DisbursementRouter, ProviderError, ProviderStatus};
use tikera_core::earnings::EarningsError;
use tikera_core::fees::{Jurisdiction, PlatformSettings};
use tikera_core::payout::{PayoutAction, PayoutError, PayoutLifecycle, PayoutStatus};
use tikera_shared::types::{AdminId, EventId, Money, OrganizerId, PayoutId, PageRequest, PageResponse};

use super::convert::{parse_currency, payout_status_to_core, payout_status_to_db, provider_kind_to_core, provider_kind_to_db};
use super::earnings::EarningsRepository;
use super::profile::PayoutProfileRepository;
use crate::entities::{events, payouts, sea_orm_active_enums};

/// Errors from driving a transfer through a provider.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Lifecycle or persistence failure.
    #[error(transparent)]
    Payout(#[from] PayoutError),

    /// Provider-side failure; the payout state reflects the taxonomy
    /// (failed for non-retryable, still approved for retryable).
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ExecuteError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Payout(e) => e.status_code(),
            Self::Provider(e) => e.status_code(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Payout(e) => e.error_code(),
            Self::Provider(e) => e.error_code(),
        }
    }
}

/// Input for creating a payout.
#[derive(Debug, Clone)]
pub struct CreatePayoutInput {
    /// Organizer requesting the payout.
    pub organizer_id: OrganizerId,
    /// Event whose earnings fund the payout.
    pub event_id: EventId,
    /// Requested amount in minor units; `None` withdraws the full
    /// available balance.
    pub amount_minor: Option<i64>,
}

/// Payout repository with guarded state transitions.
#[derive(Debug, Clone)]
pub struct PayoutRepository {
    db: DatabaseConnection,
    earnings: EarningsRepository,
    profiles: PayoutProfileRepository,
}

impl PayoutRepository {
    /// Creates a new payout repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let earnings = EarningsRepository::new(db.clone());
        let profiles = PayoutProfileRepository::new(db.clone());
        Self {
            db,
            earnings,
            profiles,
        }
    }

    /// Creates a payout in `pending` for withdrawable earnings.
    ///
    /// The amount is fixed here and never altered by later earnings
    /// recomputes. Amounts already claimed by other non-terminal payouts
    /// of the same event are excluded from the balance, so concurrent
    /// requests cannot double-claim.
    ///
    /// # Errors
    ///
    /// Returns an error if the settlement hold is still running, the
    /// amount is below the platform minimum or above the available
    /// balance, or the event does not exist.
    pub async fn create(
        &self,
        input: CreatePayoutInput,
        settings: &PlatformSettings,
        now: DateTime<Utc>,
    ) -> Result<payouts::Model, PayoutError> {
        // Fresh recompute, never the stored projection, decides what is
        // withdrawable.
        let earnings = self
            .earnings
            .refresh_event(input.event_id, settings, now)
            .await
            .map_err(|e| match e {
                EarningsError::EventNotFound(id) => {
                    PayoutError::Validation(format!("event {id} not found"))
                }
                other => PayoutError::Database(other.to_string()),
            })?;

        if earnings.organizer_id != input.organizer_id {
            return Err(PayoutError::Validation(format!(
                "event {} does not belong to organizer {}",
                input.event_id, input.organizer_id
            )));
        }

        if now < earnings.settlement_ready_at {
            return Err(PayoutError::NotYetSettled {
                ready_at: earnings.settlement_ready_at,
            });
        }

        let reserved = self.reserved_total(input.event_id).await?;
        let claimable = (earnings.available_to_withdraw.minor - reserved).max(0);
        let amount_minor = input.amount_minor.unwrap_or(claimable);
        let amount = Money::new(amount_minor, earnings.currency);
        let claimable = Money::new(claimable, earnings.currency);

        if amount.minor <= 0 || amount.minor > claimable.minor {
            return Err(PayoutError::ExceedsAvailable {
                amount,
                available: claimable,
            });
        }

        // The minimum is a single-currency baseline; it only constrains
        // payouts in that currency.
        if amount.currency == settings.minimum_payout.currency
            && amount.minor < settings.minimum_payout.minor
        {
            return Err(PayoutError::BelowMinimum {
                amount,
                minimum: settings.minimum_payout,
            });
        }

        let method = match Jurisdiction::resolve(&self.event_country(input.event_id).await?) {
            Jurisdiction::Haiti => tikera_core::disbursement::ProviderKind::MobileMoney,
            Jurisdiction::UsCanada => tikera_core::disbursement::ProviderKind::ConnectedAccount,
        };

        let payout_id = PayoutId::new();
        let active = payouts::ActiveModel {
            id: Set(payout_id.into_inner()),
            organizer_id: Set(input.organizer_id.into_inner()),
            event_id: Set(input.event_id.into_inner()),
            amount_minor: Set(amount.minor),
            currency: Set(amount.currency.as_str().to_string()),
            method: Set(provider_kind_to_db(method)),
            status: Set(sea_orm_active_enums::PayoutStatus::Pending),
            scheduled_date: Set(tikera_core::payout::next_payout_window(now)),
            // The payout id doubles as the provider idempotency key and
            // stays stable across retries of this logical transfer.
            reference: Set(payout_id.to_string()),
            provider_transaction_id: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            completed_at: Set(None),
            failure_reason: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        active
            .insert(&self.db)
            .await
            .map_err(|e| PayoutError::Database(e.to_string()))
    }

    /// Fetches a payout by id.
    pub async fn get(&self, payout_id: PayoutId) -> Result<payouts::Model, PayoutError> {
        payouts::Entity::find_by_id(payout_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| PayoutError::Database(e.to_string()))?
            .ok_or(PayoutError::NotFound(payout_id))
    }

    /// Lists an organizer's payouts, newest first.
    pub async fn list_for_organizer(
        &self,
        organizer_id: OrganizerId,
        page: &PageRequest,
    ) -> Result<PageResponse<payouts::Model>, PayoutError> {
        let query = payouts::Entity::find()
            .filter(payouts::Column::OrganizerId.eq(organizer_id.into_inner()));

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| PayoutError::Database(e.to_string()))?;

        let items = query
            .order_by_desc(payouts::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(|e| PayoutError::Database(e.to_string()))?;

        Ok(PageResponse::new(items, page.page, page.per_page, total))
    }

    /// Approves a pending payout (admin-only, at-most-once).
    ///
    /// # Errors
    ///
    /// Returns `IdempotencyViolation` when the payout is observed in any
    /// status other than `pending`, including the loser of a concurrent
    /// double-approve.
    pub async fn approve(
        &self,
        payout_id: PayoutId,
        approved_by: AdminId,
    ) -> Result<payouts::Model, PayoutError> {
        let payout = self.get(payout_id).await?;
        let current = payout_status_to_core(&payout.status);
        let action = PayoutLifecycle::approve(payout_id, current, approved_by)?;

        let PayoutAction::Approve {
            approved_by,
            approved_at,
            ..
        } = action
        else {
            unreachable!("approve yields an Approve action");
        };

        let result = payouts::Entity::update_many()
            .col_expr(
                payouts::Column::Status,
                Expr::value(sea_orm_active_enums::PayoutStatus::Approved),
            )
            .col_expr(
                payouts::Column::ApprovedBy,
                Expr::value(Some(approved_by.into_inner())),
            )
            .col_expr(payouts::Column::ApprovedAt, Expr::value(Some(approved_at)))
            .col_expr(payouts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(payouts::Column::Id.eq(payout_id.into_inner()))
            .filter(payouts::Column::Status.eq(sea_orm_active_enums::PayoutStatus::Pending))
            .exec(&self.db)
            .await
            .map_err(|e| PayoutError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            // Lost the race (or the status changed since the read): report
            // what is actually there now.
            let actual = payout_status_to_core(&self.get(payout_id).await?.status);
            return Err(PayoutError::IdempotencyViolation { payout_id, actual });
        }

        self.get(payout_id).await
    }

    /// Retries a failed payout: back to `pending` with a fresh window
    /// and a cleared failure reason.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` when the payout is not `failed`
    /// (including the loser of two concurrent retries).
    pub async fn retry(
        &self,
        payout_id: PayoutId,
        now: DateTime<Utc>,
    ) -> Result<payouts::Model, PayoutError> {
        let payout = self.get(payout_id).await?;
        let current = payout_status_to_core(&payout.status);
        let action = PayoutLifecycle::retry(current, now)?;

        let PayoutAction::Retry { scheduled_date, .. } = action else {
            unreachable!("retry yields a Retry action");
        };

        let result = payouts::Entity::update_many()
            .col_expr(
                payouts::Column::Status,
                Expr::value(sea_orm_active_enums::PayoutStatus::Pending),
            )
            .col_expr(payouts::Column::ScheduledDate, Expr::value(scheduled_date))
            .col_expr(
                payouts::Column::FailureReason,
                Expr::value(Option::<String>::None),
            )
            .col_expr(payouts::Column::UpdatedAt, Expr::value(now))
            .filter(payouts::Column::Id.eq(payout_id.into_inner()))
            .filter(payouts::Column::Status.eq(sea_orm_active_enums::PayoutStatus::Failed))
            .exec(&self.db)
            .await
            .map_err(|e| PayoutError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            let actual = payout_status_to_core(&self.get(payout_id).await?.status);
            // Re-validating against the observed status yields the
            // canonical InvalidTransition for the race loser.
            PayoutLifecycle::retry(actual, now)?;
            return Err(PayoutError::IdempotencyViolation { payout_id, actual });
        }

        self.get(payout_id).await
    }

    /// Cancels a payout from any non-terminal state.
    pub async fn cancel(&self, payout_id: PayoutId) -> Result<payouts::Model, PayoutError> {
        let payout = self.get(payout_id).await?;
        let current = payout_status_to_core(&payout.status);
        PayoutLifecycle::cancel(current)?;

        let result = payouts::Entity::update_many()
            .col_expr(
                payouts::Column::Status,
                Expr::value(sea_orm_active_enums::PayoutStatus::Cancelled),
            )
            .col_expr(payouts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(payouts::Column::Id.eq(payout_id.into_inner()))
            .filter(payouts::Column::Status.eq(payout_status_to_db(current)))
            .exec(&self.db)
            .await
            .map_err(|e| PayoutError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            let actual = payout_status_to_core(&self.get(payout_id).await?.status);
            PayoutLifecycle::cancel(actual)?;
            return Err(PayoutError::IdempotencyViolation { payout_id, actual });
        }

        self.get(payout_id).await
    }

    /// Executes an approved payout through the disbursement router.
    ///
    /// Outcomes: a completed transfer moves the payout to `paid` and
    /// refreshes the earnings projection; a provider-reported failure or
    /// invalid destination moves it to `failed` with a reason; a timeout
    /// or outage leaves it `approved` for a later status poll — success
    /// is never guessed from a timeout.
    pub async fn execute(
        &self,
        payout_id: PayoutId,
        router: &DisbursementRouter,
        settings: &PlatformSettings,
        now: DateTime<Utc>,
    ) -> Result<payouts::Model, ExecuteError> {
        let payout = self.get(payout_id).await?;
        let current = payout_status_to_core(&payout.status);
        if current != PayoutStatus::Approved {
            return Err(PayoutError::InvalidTransition {
                from: current,
                to: PayoutStatus::Paid,
            }
            .into());
        }

        let jurisdiction =
            Jurisdiction::resolve(&self.event_country(EventId::from_uuid(payout.event_id)).await?);
        let method = provider_kind_to_core(&payout.method);

        let profile = self
            .profiles
            .get(OrganizerId::from_uuid(payout.organizer_id), method)
            .await
            .map_err(|e| PayoutError::Database(e.to_string()))?;

        let Some(profile) = profile else {
            let reason = "no payout profile on file for this provider";
            self.mark_failed_guarded(payout_id, reason, now).await?;
            return Err(ProviderError::DestinationInvalid(reason.to_string()).into());
        };

        let amount = Money::new(
            payout.amount_minor,
            parse_currency(&payout.currency).map_err(PayoutError::Database)?,
        );

        match router
            .execute(jurisdiction, &profile, amount, &payout.reference)
            .await
        {
            Ok(receipt) => match receipt.status {
                ProviderStatus::Completed => {
                    self.mark_paid_guarded(payout_id, Some(receipt.transaction_id), now)
                        .await?;
                    self.refresh_after_payment(EventId::from_uuid(payout.event_id), settings, now)
                        .await;
                    Ok(self.get(payout_id).await?)
                }
                ProviderStatus::Processing => {
                    self.record_provider_transaction(payout_id, &receipt.transaction_id, now)
                        .await?;
                    Ok(self.get(payout_id).await?)
                }
                ProviderStatus::Failed => {
                    self.mark_failed_guarded(payout_id, "provider reported transfer failure", now)
                        .await?;
                    Ok(self.get(payout_id).await?)
                }
            },
            Err(e) => {
                if let ProviderError::DestinationInvalid(reason) = &e {
                    self.mark_failed_guarded(payout_id, reason, now).await?;
                }
                // Unavailable/Timeout: the payout stays approved; the
                // transfer may still land and must be resolved by a poll.
                Err(e.into())
            }
        }
    }

    /// Resolves an approved payout whose transfer outcome is unknown by
    /// polling the provider with the payout's reference.
    pub async fn resolve(
        &self,
        payout_id: PayoutId,
        router: &DisbursementRouter,
        settings: &PlatformSettings,
        now: DateTime<Utc>,
    ) -> Result<payouts::Model, ExecuteError> {
        let payout = self.get(payout_id).await?;
        let current = payout_status_to_core(&payout.status);
        if current != PayoutStatus::Approved {
            return Err(PayoutError::InvalidTransition {
                from: current,
                to: PayoutStatus::Paid,
            }
            .into());
        }

        let jurisdiction =
            Jurisdiction::resolve(&self.event_country(EventId::from_uuid(payout.event_id)).await?);
        let method = provider_kind_to_core(&payout.method);

        let profile = self
            .profiles
            .get(OrganizerId::from_uuid(payout.organizer_id), method)
            .await
            .map_err(|e| PayoutError::Database(e.to_string()))?
            .ok_or_else(|| {
                ProviderError::DestinationInvalid(
                    "no payout profile on file for this provider".to_string(),
                )
            })?;

        match router
            .poll_status(jurisdiction, &profile, &payout.reference)
            .await?
        {
            ProviderStatus::Completed => {
                self.mark_paid_guarded(payout_id, None, now).await?;
                self.refresh_after_payment(EventId::from_uuid(payout.event_id), settings, now)
                    .await;
            }
            ProviderStatus::Failed => {
                self.mark_failed_guarded(payout_id, "provider reported transfer failure", now)
                    .await?;
            }
            ProviderStatus::Processing => {}
        }

        Ok(self.get(payout_id).await?)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Sum of amounts already claimed by non-terminal payouts of an event.
    async fn reserved_total(&self, event_id: EventId) -> Result<i64, PayoutError> {
        let open = payouts::Entity::find()
            .filter(payouts::Column::EventId.eq(event_id.into_inner()))
            .filter(payouts::Column::Status.is_in([
                sea_orm_active_enums::PayoutStatus::Pending,
                sea_orm_active_enums::PayoutStatus::Approved,
                sea_orm_active_enums::PayoutStatus::Failed,
            ]))
            .all(&self.db)
            .await
            .map_err(|e| PayoutError::Database(e.to_string()))?;

        Ok(open.iter().map(|p| p.amount_minor).sum())
    }

    async fn event_country(&self, event_id: EventId) -> Result<String, PayoutError> {
        let event = events::Entity::find_by_id(event_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| PayoutError::Database(e.to_string()))?
            .ok_or_else(|| PayoutError::Database(format!("event {event_id} missing")))?;
        Ok(event.country_code)
    }

    /// Guarded `approved -> paid`. Losing the race to another resolver
    /// is not an error: the money moved exactly once either way.
    async fn mark_paid_guarded(
        &self,
        payout_id: PayoutId,
        provider_transaction_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), PayoutError> {
        PayoutLifecycle::mark_paid(PayoutStatus::Approved, now)?;

        let mut update = payouts::Entity::update_many()
            .col_expr(
                payouts::Column::Status,
                Expr::value(sea_orm_active_enums::PayoutStatus::Paid),
            )
            .col_expr(payouts::Column::CompletedAt, Expr::value(Some(now)))
            .col_expr(payouts::Column::UpdatedAt, Expr::value(now));
        if let Some(txid) = provider_transaction_id {
            update = update.col_expr(
                payouts::Column::ProviderTransactionId,
                Expr::value(Some(txid)),
            );
        }

        update
            .filter(payouts::Column::Id.eq(payout_id.into_inner()))
            .filter(payouts::Column::Status.eq(sea_orm_active_enums::PayoutStatus::Approved))
            .exec(&self.db)
            .await
            .map_err(|e| PayoutError::Database(e.to_string()))?;

        Ok(())
    }

    /// Guarded `approved -> failed` with a human-readable reason.
    async fn mark_failed_guarded(
        &self,
        payout_id: PayoutId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PayoutError> {
        PayoutLifecycle::mark_failed(PayoutStatus::Approved, reason.to_string())?;

        payouts::Entity::update_many()
            .col_expr(
                payouts::Column::Status,
                Expr::value(sea_orm_active_enums::PayoutStatus::Failed),
            )
            .col_expr(
                payouts::Column::FailureReason,
                Expr::value(Some(reason.to_string())),
            )
            .col_expr(payouts::Column::UpdatedAt, Expr::value(now))
            .filter(payouts::Column::Id.eq(payout_id.into_inner()))
            .filter(payouts::Column::Status.eq(sea_orm_active_enums::PayoutStatus::Approved))
            .exec(&self.db)
            .await
            .map_err(|e| PayoutError::Database(e.to_string()))?;

        Ok(())
    }

    async fn record_provider_transaction(
        &self,
        payout_id: PayoutId,
        transaction_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PayoutError> {
        payouts::Entity::update_many()
            .col_expr(
                payouts::Column::ProviderTransactionId,
                Expr::value(Some(transaction_id.to_string())),
            )
            .col_expr(payouts::Column::UpdatedAt, Expr::value(now))
            .filter(payouts::Column::Id.eq(payout_id.into_inner()))
            .filter(payouts::Column::Status.eq(sea_orm_active_enums::PayoutStatus::Approved))
            .exec(&self.db)
            .await
            .map_err(|e| PayoutError::Database(e.to_string()))?;
        Ok(())
    }

    /// Refreshes the earnings projection after money moved. The payout
    /// itself is already final; a failed refresh is only a stale
    /// projection, recomputable on the next read.
    async fn refresh_after_payment(
        &self,
        event_id: EventId,
        settings: &PlatformSettings,
        now: DateTime<Utc>,
    ) {
        if let Err(e) = self.earnings.refresh_event(event_id, settings, now).await {
            warn!(%event_id, error = %e, "earnings refresh failed after payment");
        }
    }
}
