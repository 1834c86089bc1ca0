//! Vehicle business logic - Handles all vehicle-related operations.
//!
//! Provides functions for registering vehicles, looking them up by owner or
//! id, and atomically incrementing the prepaid FASTag balance. All functions
//! are async and return Result types for error handling.

use crate::{
    entities::{Vehicle, vehicle},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves all vehicles owned by the given user, ordered by vehicle number.
///
/// This backs the vehicle list shown at workflow entry and after every
/// successful recharge.
pub async fn get_vehicles_for_owner(
    db: &DatabaseConnection,
    owner: &str,
) -> Result<Vec<vehicle::Model>> {
    Vehicle::find()
        .filter(vehicle::Column::UserId.eq(owner))
        .order_by_asc(vehicle::Column::VehicleNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a vehicle by its unique ID, returning None if it does not exist.
pub async fn get_vehicle_by_id(
    db: &DatabaseConnection,
    vehicle_id: i64,
) -> Result<Option<vehicle::Model>> {
    Vehicle::find_by_id(vehicle_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Registers a new vehicle for a user with a zero starting balance.
///
/// The vehicle number is trimmed and uppercased before storage, and must be
/// unique among the owner's vehicles.
pub async fn register_vehicle(
    db: &DatabaseConnection,
    owner: &str,
    vehicle_number: &str,
    vehicle_type: vehicle::VehicleType,
) -> Result<vehicle::Model> {
    let number = vehicle_number.trim().to_uppercase();
    if number.is_empty() {
        return Err(Error::Config {
            message: "Vehicle number cannot be empty".to_string(),
        });
    }

    let existing = Vehicle::find()
        .filter(vehicle::Column::UserId.eq(owner))
        .filter(vehicle::Column::VehicleNumber.eq(&number))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateVehicle { number });
    }

    let vehicle = vehicle::ActiveModel {
        user_id: Set(owner.to_string()),
        vehicle_number: Set(number),
        vehicle_type: Set(vehicle_type),
        fastag_balance: Set(0.0),
        ..Default::default()
    };

    let result = vehicle.insert(db).await?;
    Ok(result)
}

/// Atomically adds an amount to a vehicle's balance, conditioned on ownership.
///
/// Instead of reading the current balance, modifying it, and writing it back
/// (which can lose updates in concurrent scenarios), this issues a single SQL
/// UPDATE statement:
/// `UPDATE vehicles SET fastag_balance = fastag_balance + delta WHERE id = ? AND user_id = ?`
///
/// The `user_id` condition makes the store itself reject cross-owner writes.
///
/// # Returns
/// The number of rows affected: 1 when the increment was applied, 0 when no
/// vehicle matched the id/owner pair.
pub async fn update_vehicle_balance_atomic<C>(
    db: &C,
    owner: &str,
    vehicle_id: i64,
    amount_delta: f64,
) -> Result<u64>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    let result = Vehicle::update_many()
        .col_expr(
            vehicle::Column::FastagBalance,
            Expr::col(vehicle::Column::FastagBalance).add(amount_delta),
        )
        .filter(vehicle::Column::Id.eq(vehicle_id))
        .filter(vehicle::Column::UserId.eq(owner))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
