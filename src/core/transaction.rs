//! Ledger business logic - append and query recharge transactions.
//!
//! The ledger is append-only: this module can insert and read entries but
//! never updates or deletes them. Balance mutation is deliberately NOT done
//! here - the pairing of a balance write with a ledger insert is owned by
//! [`crate::core::recharge`], which defines the ordering and failure
//! semantics.

use crate::{
    entities::{Transaction, transaction},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Appends a ledger entry for a recharge.
///
/// The amount must be a positive, finite number; the ledger never records
/// zero or negative recharges.
pub async fn insert_transaction<C>(
    db: &C,
    owner: &str,
    vehicle_id: i64,
    amount: f64,
    status: transaction::TransactionStatus,
    payment_method: transaction::PaymentMethod,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let entry = transaction::ActiveModel {
        user_id: Set(owner.to_string()),
        vehicle_id: Set(vehicle_id),
        amount: Set(amount),
        status: Set(status),
        payment_method: Set(payment_method),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = entry.insert(db).await?;
    Ok(result)
}

/// Retrieves all ledger entries for a vehicle, newest first.
pub async fn get_transactions_for_vehicle(
    db: &DatabaseConnection,
    vehicle_id: i64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::VehicleId.eq(vehicle_id))
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all ledger entries for a user across their vehicles, newest first.
///
/// Backs the transaction history view on the dashboard.
pub async fn get_transactions_for_owner(
    db: &DatabaseConnection,
    owner: &str,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::UserId.eq(owner))
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
