//! Initial database migration.
//!
//! Creates the enums, tables, and indexes for the settlement and payout
//! engine, and seeds the default platform settings row.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: SALES LEDGER REPLICA (read-only here)
        // ============================================================
        db.execute_unprepared(EVENTS_SQL).await?;
        db.execute_unprepared(TICKET_SALES_SQL).await?;

        // ============================================================
        // PART 3: SETTLEMENT PROJECTION
        // ============================================================
        db.execute_unprepared(EVENT_EARNINGS_SQL).await?;

        // ============================================================
        // PART 4: PAYOUTS & PROFILES
        // ============================================================
        db.execute_unprepared(PAYOUTS_SQL).await?;
        db.execute_unprepared(PAYOUT_PROFILES_SQL).await?;

        // ============================================================
        // PART 5: PLATFORM SETTINGS
        // ============================================================
        db.execute_unprepared(PLATFORM_SETTINGS_SQL).await?;
        db.execute_unprepared(SEED_SETTINGS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Settlement status of an event's earnings
CREATE TYPE settlement_status AS ENUM (
    'pending',
    'ready',
    'withdrawn'
);

-- Payout lifecycle status
CREATE TYPE payout_status AS ENUM (
    'pending',
    'approved',
    'paid',
    'failed',
    'cancelled'
);

-- Money-movement provider kind
CREATE TYPE provider_kind AS ENUM (
    'mobile_money',
    'connected_account',
    'prefunded'
);

-- Verification status of a payout profile
CREATE TYPE profile_status AS ENUM (
    'not_started',
    'pending',
    'verified',
    'rejected',
    'requires_more_info'
);
";

const EVENTS_SQL: &str = r"
-- Events (replica of the catalog; the engine never writes business fields)
CREATE TABLE events (
    id UUID PRIMARY KEY,
    organizer_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    country_code VARCHAR(8) NOT NULL,
    currency VARCHAR(3) NOT NULL,
    end_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_events_organizer ON events(organizer_id);
CREATE INDEX idx_events_end_at ON events(end_at DESC);
";

const TICKET_SALES_SQL: &str = r"
-- Confirmed ticket sales (the upstream ledger slice)
CREATE TABLE ticket_sales (
    id UUID PRIMARY KEY,
    event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    amount_minor BIGINT NOT NULL CHECK (amount_minor > 0),
    currency VARCHAR(3) NOT NULL,
    sold_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_ticket_sales_event ON ticket_sales(event_id);
";

const EVENT_EARNINGS_SQL: &str = r"
-- Earnings projection, one row per event, recomputable from the ledger
CREATE TABLE event_earnings (
    event_id UUID PRIMARY KEY REFERENCES events(id) ON DELETE CASCADE,
    organizer_id UUID NOT NULL,
    currency VARCHAR(3) NOT NULL,
    gross_sales_minor BIGINT NOT NULL DEFAULT 0,
    platform_fee_minor BIGINT NOT NULL DEFAULT 0,
    processing_fee_minor BIGINT NOT NULL DEFAULT 0,
    net_amount_minor BIGINT NOT NULL DEFAULT 0,
    withdrawn_minor BIGINT NOT NULL DEFAULT 0,
    available_minor BIGINT NOT NULL DEFAULT 0 CHECK (available_minor >= 0),
    settlement_status settlement_status NOT NULL DEFAULT 'pending',
    settlement_ready_at TIMESTAMPTZ NOT NULL,
    computed_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_event_earnings_organizer ON event_earnings(organizer_id);
CREATE INDEX idx_event_earnings_status ON event_earnings(settlement_status);
";

const PAYOUTS_SQL: &str = r"
-- Payout attempts; status moves only through guarded transitions
CREATE TABLE payouts (
    id UUID PRIMARY KEY,
    organizer_id UUID NOT NULL,
    event_id UUID NOT NULL REFERENCES events(id),
    amount_minor BIGINT NOT NULL CHECK (amount_minor > 0),
    currency VARCHAR(3) NOT NULL,
    method provider_kind NOT NULL,
    status payout_status NOT NULL DEFAULT 'pending',
    scheduled_date DATE NOT NULL,
    reference VARCHAR(64) NOT NULL UNIQUE,
    provider_transaction_id VARCHAR(128),
    approved_by UUID,
    approved_at TIMESTAMPTZ,
    completed_at TIMESTAMPTZ,
    failure_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Operational listing: an organizer's payouts by state
CREATE INDEX idx_payouts_organizer_status ON payouts(organizer_id, status);
CREATE INDEX idx_payouts_event ON payouts(event_id);
CREATE INDEX idx_payouts_scheduled ON payouts(scheduled_date) WHERE status = 'pending';
";

const PAYOUT_PROFILES_SQL: &str = r"
-- Destination details per organizer per provider (verification-owned)
CREATE TABLE payout_profiles (
    id UUID PRIMARY KEY,
    organizer_id UUID NOT NULL,
    provider provider_kind NOT NULL,
    destination VARCHAR(255) NOT NULL,
    status profile_status NOT NULL DEFAULT 'not_started',
    instant_transfer_allowed BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_payout_profiles_organizer_provider UNIQUE (organizer_id, provider)
);
";

const PLATFORM_SETTINGS_SQL: &str = r"
-- Platform settings singleton with full update history
CREATE TABLE platform_settings (
    id SMALLINT PRIMARY KEY DEFAULT 1 CHECK (id = 1),
    haiti_fee_rate NUMERIC(5, 4) NOT NULL CHECK (haiti_fee_rate >= 0 AND haiti_fee_rate <= 1),
    haiti_hold_days INT NOT NULL CHECK (haiti_hold_days >= 0),
    us_canada_fee_rate NUMERIC(5, 4) NOT NULL CHECK (us_canada_fee_rate >= 0 AND us_canada_fee_rate <= 1),
    us_canada_hold_days INT NOT NULL CHECK (us_canada_hold_days >= 0),
    minimum_payout_minor BIGINT NOT NULL CHECK (minimum_payout_minor >= 0),
    minimum_payout_currency VARCHAR(3) NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID
);

CREATE TABLE platform_settings_history (
    id UUID PRIMARY KEY,
    haiti_fee_rate NUMERIC(5, 4) NOT NULL,
    haiti_hold_days INT NOT NULL,
    us_canada_fee_rate NUMERIC(5, 4) NOT NULL,
    us_canada_hold_days INT NOT NULL,
    minimum_payout_minor BIGINT NOT NULL,
    minimum_payout_currency VARCHAR(3) NOT NULL,
    changed_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    changed_by UUID
);

CREATE INDEX idx_settings_history_changed_at ON platform_settings_history(changed_at DESC);
";

const SEED_SETTINGS_SQL: &str = r"
-- Default fee policy: 7% / no hold for Haiti, 10% / 7-day hold for US-CA
INSERT INTO platform_settings (
    id, haiti_fee_rate, haiti_hold_days,
    us_canada_fee_rate, us_canada_hold_days,
    minimum_payout_minor, minimum_payout_currency
) VALUES (1, 0.07, 0, 0.10, 7, 2000, 'USD');
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS platform_settings_history CASCADE;
DROP TABLE IF EXISTS platform_settings CASCADE;
DROP TABLE IF EXISTS payout_profiles CASCADE;
DROP TABLE IF EXISTS payouts CASCADE;
DROP TABLE IF EXISTS event_earnings CASCADE;
DROP TABLE IF EXISTS ticket_sales CASCADE;
DROP TABLE IF EXISTS events CASCADE;
DROP TYPE IF EXISTS profile_status;
DROP TYPE IF EXISTS provider_kind;
DROP TYPE IF EXISTS payout_status;
DROP TYPE IF EXISTS settlement_status;
";
