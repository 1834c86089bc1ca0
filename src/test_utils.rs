//! Shared test utilities for `TollTag`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    auth,
    config::recharge::RechargePolicy,
    core::{transaction, vehicle},
    entities,
    entities::transaction::{PaymentMethod, TransactionStatus},
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The default recharge policy with the gateway delay zeroed out so tests
/// never sleep.
pub fn test_policy() -> RechargePolicy {
    RechargePolicy {
        gateway_delay_ms: 0,
        ..RechargePolicy::default()
    }
}

/// Registers a test account with sensible defaults.
///
/// # Defaults
/// * email: `"driver@example.com"`
/// * password: `"password123"`
pub async fn create_test_user(db: &DatabaseConnection) -> Result<entities::user::Model> {
    auth::register_user(db, "driver@example.com", "password123").await
}

/// Registers a test vehicle for the given owner.
///
/// # Defaults
/// * `vehicle_type`: Car
/// * `fastag_balance`: 0
pub async fn create_test_vehicle(
    db: &DatabaseConnection,
    owner: &str,
    number: &str,
) -> Result<entities::vehicle::Model> {
    vehicle::register_vehicle(db, owner, number, entities::vehicle::VehicleType::Car).await
}

/// Appends a Success ledger entry with sensible defaults.
///
/// # Defaults
/// * status: Success
/// * `payment_method`: UPI
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    owner: &str,
    vehicle_id: i64,
    amount: f64,
) -> Result<entities::transaction::Model> {
    transaction::insert_transaction(
        db,
        owner,
        vehicle_id,
        amount,
        TransactionStatus::Success,
        PaymentMethod::Upi,
    )
    .await
}

/// Sets up a complete test environment with a user and one vehicle.
/// Returns (db, user, vehicle) for common test scenarios.
pub async fn setup_with_vehicle() -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::vehicle::Model,
)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db).await?;
    let vehicle = create_test_vehicle(&db, &user.id, "KA01AB1234").await?;
    Ok((db, user, vehicle))
}
