//! Database seeder for Tikera development and testing.
//!
//! Seeds a Haiti organizer with an ended event and confirmed sales, plus
//! a verified mobile-money payout profile, so the payout flow can be
//! exercised end to end locally.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use tikera_core::disbursement::{PayoutProfile, ProfileStatus, ProviderKind};
use tikera_db::entities::{events, ticket_sales};
use tikera_db::repositories::profile::PayoutProfileRepository;
use tikera_shared::types::OrganizerId;

/// Test organizer ID (consistent for all seeds)
const TEST_ORGANIZER_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Test event ID (consistent for all seeds)
const TEST_EVENT_ID: &str = "00000000-0000-0000-0000-000000000002";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = tikera_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding test event...");
    seed_test_event(&db).await;

    println!("Seeding ticket sales...");
    seed_ticket_sales(&db).await;

    println!("Seeding payout profile...");
    seed_payout_profile(&db).await;

    println!("Seeding complete!");
}

fn test_organizer_id() -> Uuid {
    Uuid::parse_str(TEST_ORGANIZER_ID).unwrap()
}

fn test_event_id() -> Uuid {
    Uuid::parse_str(TEST_EVENT_ID).unwrap()
}

async fn seed_test_event(db: &DatabaseConnection) {
    let existing = events::Entity::find_by_id(test_event_id())
        .one(db)
        .await
        .expect("Failed to query events");
    if existing.is_some() {
        println!("  Test event already exists, skipping");
        return;
    }

    let now = Utc::now();
    events::ActiveModel {
        id: Set(test_event_id()),
        organizer_id: Set(test_organizer_id()),
        name: Set("Festival Mizik Port-au-Prince".to_string()),
        country_code: Set("HT".to_string()),
        currency: Set("HTG".to_string()),
        end_at: Set((now - Duration::days(2)).into()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("Failed to insert test event");
}

async fn seed_ticket_sales(db: &DatabaseConnection) {
    let now = Utc::now();
    let sold_at = now - Duration::days(3);

    // 40 tickets at 2500.00 HTG
    for i in 0..40 {
        let sale = ticket_sales::ActiveModel {
            id: Set(Uuid::now_v7()),
            event_id: Set(test_event_id()),
            amount_minor: Set(250_000),
            currency: Set("HTG".to_string()),
            sold_at: Set((sold_at + Duration::minutes(i)).into()),
            created_at: Set(now.into()),
        };
        if sale.insert(db).await.is_err() {
            println!("  Sales already seeded, skipping");
            return;
        }
    }
}

async fn seed_payout_profile(db: &DatabaseConnection) {
    let repo = PayoutProfileRepository::new(db.clone());
    repo.upsert(&PayoutProfile {
        organizer_id: OrganizerId::from_uuid(test_organizer_id()),
        provider: ProviderKind::MobileMoney,
        destination: "509-3701-0001".to_string(),
        status: ProfileStatus::Verified,
        instant_transfer_allowed: true,
    })
    .await
    .expect("Failed to upsert payout profile");
}
