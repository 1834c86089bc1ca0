//! Balance update protocol - applies a recharge to the ledger store.
//!
//! A recharge is two single-row writes with a fixed ordering: the atomic
//! balance increment first, the ledger insert second. The store offers no
//! multi-statement transaction across the two, so the failure semantics are
//! explicit:
//!
//! * A step-1 failure (`BalanceWriteFailed`) guarantees no balance mutation
//!   occurred; the whole protocol is safe to retry.
//! * A step-2 failure (`LedgerWriteFailed`) leaves the balance updated with
//!   no matching ledger entry. It must never be retried automatically -
//!   re-running the protocol would apply the increment twice. It is logged
//!   distinctly so [`find_ledger_discrepancies`] can surface it for manual
//!   reconciliation.

use crate::{
    core::{transaction, vehicle},
    entities::{
        Transaction, Vehicle,
        transaction::{PaymentMethod, TransactionStatus},
        transaction as transaction_entity,
    },
    errors::Result,
};
use sea_orm::{DatabaseConnection, prelude::*};
use thiserror::Error;
use tracing::{error, info, warn};

/// Why a recharge could not be applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// The balance increment was rejected; nothing was written and the
    /// protocol may be retried as a whole
    #[error("balance update rejected: {reason}")]
    BalanceWriteFailed {
        /// Underlying reason for the rejection
        reason: String,
    },
    /// The ledger insert failed after the balance was already incremented;
    /// must not be retried, needs manual reconciliation
    #[error("ledger insert failed after balance update: {reason}")]
    LedgerWriteFailed {
        /// Underlying reason for the failure
        reason: String,
    },
}

/// The completed recharge as shown on the Confirmation step
#[derive(Debug, Clone, PartialEq)]
pub struct RechargeReceipt {
    /// Recharged vehicle's id
    pub vehicle_id: i64,
    /// Recharged vehicle's plate number
    pub vehicle_number: String,
    /// Amount credited
    pub amount: f64,
    /// Payment method used
    pub method: PaymentMethod,
    /// Balance after the recharge, computed as the pre-recharge balance plus
    /// the amount rather than re-read from the store
    pub new_balance: f64,
    /// Id of the appended ledger entry
    pub transaction_id: i64,
}

/// Applies a recharge: atomic balance increment, then ledger insert.
///
/// The caller's ownership of the vehicle is verified twice - against the
/// point-read here and again by the owner condition on the UPDATE itself -
/// so cross-owner writes are rejected at the store. The full requested
/// amount is applied or nothing is; amounts are never split or batched.
pub async fn apply_recharge(
    db: &DatabaseConnection,
    owner: &str,
    vehicle_id: i64,
    amount: f64,
    method: PaymentMethod,
) -> std::result::Result<RechargeReceipt, UpdateError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(UpdateError::BalanceWriteFailed {
            reason: format!("invalid recharge amount {amount}"),
        });
    }

    let vehicle = vehicle::get_vehicle_by_id(db, vehicle_id)
        .await
        .map_err(|e| UpdateError::BalanceWriteFailed {
            reason: e.to_string(),
        })?
        .ok_or_else(|| UpdateError::BalanceWriteFailed {
            reason: format!("vehicle {vehicle_id} not found"),
        })?;

    if vehicle.user_id != owner {
        return Err(UpdateError::BalanceWriteFailed {
            reason: format!("vehicle {vehicle_id} does not belong to the paying user"),
        });
    }

    // Step 1: atomic, owner-conditioned balance increment
    let rows = vehicle::update_vehicle_balance_atomic(db, owner, vehicle_id, amount)
        .await
        .map_err(|e| UpdateError::BalanceWriteFailed {
            reason: e.to_string(),
        })?;
    if rows == 0 {
        return Err(UpdateError::BalanceWriteFailed {
            reason: format!("balance update for vehicle {vehicle_id} affected no rows"),
        });
    }

    let new_balance = vehicle.fastag_balance + amount;

    // Step 2: append the ledger entry. Failure here leaves the balance
    // incremented without a matching entry; escalate, never retry.
    let entry = transaction::insert_transaction(
        db,
        owner,
        vehicle_id,
        amount,
        TransactionStatus::Success,
        method.clone(),
    )
    .await
    .map_err(|e| {
        error!(
            vehicle_id,
            amount,
            "ledger insert failed after balance write; balance is ahead of the ledger \
             and needs manual reconciliation: {e}"
        );
        UpdateError::LedgerWriteFailed {
            reason: e.to_string(),
        }
    })?;

    info!(
        vehicle_id,
        amount,
        new_balance,
        transaction_id = entry.id,
        "recharge applied"
    );

    Ok(RechargeReceipt {
        vehicle_id,
        vehicle_number: vehicle.vehicle_number,
        amount,
        method,
        new_balance,
        transaction_id: entry.id,
    })
}

/// A vehicle whose balance does not match the sum of its Success ledger entries
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerDiscrepancy {
    /// Vehicle id
    pub vehicle_id: i64,
    /// Vehicle plate number
    pub vehicle_number: String,
    /// Balance currently stored on the vehicle
    pub balance: f64,
    /// Sum of Success ledger amounts for the vehicle
    pub ledger_total: f64,
}

/// Scans every vehicle for balance/ledger mismatches.
///
/// A recharge that failed between step 1 and step 2 leaves the balance ahead
/// of the ledger; this sweep reports such vehicles for manual reconciliation.
/// It only reports - it never writes corrective entries itself.
pub async fn find_ledger_discrepancies(db: &DatabaseConnection) -> Result<Vec<LedgerDiscrepancy>> {
    let vehicles = Vehicle::find().all(db).await?;
    let mut discrepancies = Vec::new();

    for v in vehicles {
        let ledger_total: f64 = Transaction::find()
            .filter(transaction_entity::Column::VehicleId.eq(v.id))
            .filter(transaction_entity::Column::Status.eq(TransactionStatus::Success))
            .all(db)
            .await?
            .iter()
            .map(|t| t.amount)
            .sum();

        if (v.fastag_balance - ledger_total).abs() > f64::EPSILON {
            warn!(
                vehicle_id = v.id,
                balance = v.fastag_balance,
                ledger_total,
                "vehicle balance does not match its ledger"
            );
            discrepancies.push(LedgerDiscrepancy {
                vehicle_id: v.id,
                vehicle_number: v.vehicle_number,
                balance: v.fastag_balance,
                ledger_total,
            });
        }
    }

    Ok(discrepancies)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::vehicle::{get_vehicle_by_id, update_vehicle_balance_atomic};
    use crate::entities::vehicle::VehicleType;
    use crate::test_utils::{create_test_vehicle, setup_with_vehicle};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr};

    fn sample_vehicle(id: i64, owner: &str, balance: f64) -> crate::entities::vehicle::Model {
        crate::entities::vehicle::Model {
            id,
            user_id: owner.to_string(),
            vehicle_number: "KA01AB1234".to_string(),
            vehicle_type: VehicleType::Car,
            fastag_balance: balance,
        }
    }

    #[tokio::test]
    async fn test_recharge_credits_balance_and_appends_ledger() -> Result<()> {
        let (db, user, vehicle) = setup_with_vehicle().await?;

        // Scenario: balance 50, recharge 100 via UPI
        update_vehicle_balance_atomic(&db, &user.id, vehicle.id, 50.0).await?;

        let receipt = apply_recharge(&db, &user.id, vehicle.id, 100.0, PaymentMethod::Upi)
            .await
            .unwrap();

        assert_eq!(receipt.new_balance, 150.0);
        assert_eq!(receipt.amount, 100.0);
        assert_eq!(receipt.method, PaymentMethod::Upi);
        assert_eq!(receipt.vehicle_number, vehicle.vehicle_number);

        let stored = get_vehicle_by_id(&db, vehicle.id).await?.unwrap();
        assert_eq!(stored.fastag_balance, 150.0);

        let entries = crate::core::transaction::get_transactions_for_vehicle(&db, vehicle.id).await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, 100.0);
        assert_eq!(entries[0].status, TransactionStatus::Success);
        assert_eq!(entries[0].payment_method, PaymentMethod::Upi);

        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_sum_matches_balance_after_many_recharges() -> Result<()> {
        let (db, user, vehicle) = setup_with_vehicle().await?;

        for (amount, method) in [
            (10.0, PaymentMethod::Upi),
            (250.0, PaymentMethod::Cards),
            (40.0, PaymentMethod::Netbanking),
        ] {
            apply_recharge(&db, &user.id, vehicle.id, amount, method)
                .await
                .unwrap();
        }

        let stored = get_vehicle_by_id(&db, vehicle.id).await?.unwrap();
        let ledger_total: f64 =
            crate::core::transaction::get_transactions_for_vehicle(&db, vehicle.id)
                .await?
                .iter()
                .map(|t| t.amount)
                .sum();

        assert_eq!(stored.fastag_balance, 300.0);
        assert_eq!(ledger_total, stored.fastag_balance);

        Ok(())
    }

    #[tokio::test]
    async fn test_recharge_rejects_unknown_vehicle() -> Result<()> {
        let (db, user, _vehicle) = setup_with_vehicle().await?;

        let result = apply_recharge(&db, &user.id, 999, 100.0, PaymentMethod::Upi).await;
        assert!(matches!(
            result.unwrap_err(),
            UpdateError::BalanceWriteFailed { reason: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_recharge_rejects_cross_owner_payment() -> Result<()> {
        let (db, _user, vehicle) = setup_with_vehicle().await?;

        let result = apply_recharge(&db, "intruder", vehicle.id, 100.0, PaymentMethod::Upi).await;
        assert!(matches!(
            result.unwrap_err(),
            UpdateError::BalanceWriteFailed { reason: _ }
        ));

        // Nothing was written
        let stored = get_vehicle_by_id(&db, vehicle.id).await?.unwrap();
        assert_eq!(stored.fastag_balance, 0.0);
        assert!(
            crate::core::transaction::get_transactions_for_vehicle(&db, vehicle.id)
                .await?
                .is_empty()
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_recharge_rejects_non_positive_amount() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        for bad in [0.0, -5.0, f64::NAN] {
            let result = apply_recharge(&db, "user1", 1, bad, PaymentMethod::Upi).await;
            assert!(matches!(
                result.unwrap_err(),
                UpdateError::BalanceWriteFailed { reason: _ }
            ));
        }
    }

    #[tokio::test]
    async fn test_balance_write_failure_is_step_one() {
        // Vehicle read succeeds, the UPDATE itself errors out
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![sample_vehicle(1, "user1", 50.0)]])
            .append_exec_errors([DbErr::Exec(RuntimeErr::Internal(
                "store unavailable".to_string(),
            ))])
            .into_connection();

        let result = apply_recharge(&db, "user1", 1, 100.0, PaymentMethod::Upi).await;
        assert!(matches!(
            result.unwrap_err(),
            UpdateError::BalanceWriteFailed { reason: _ }
        ));
    }

    #[tokio::test]
    async fn test_ledger_write_failure_after_balance_write() {
        // Vehicle read ok, balance UPDATE ok, ledger INSERT fails
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![sample_vehicle(1, "user1", 50.0)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_exec_errors([DbErr::Exec(RuntimeErr::Internal(
                "ledger store unavailable".to_string(),
            ))])
            .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                "ledger store unavailable".to_string(),
            ))])
            .into_connection();

        let result = apply_recharge(&db, "user1", 1, 100.0, PaymentMethod::Upi).await;
        assert!(matches!(
            result.unwrap_err(),
            UpdateError::LedgerWriteFailed { reason: _ }
        ));
    }

    #[tokio::test]
    async fn test_concurrent_recharges_do_not_lose_updates() -> Result<()> {
        // Two recharges of 50 on a zero-balance vehicle must end at exactly
        // 100: the increment happens in the store, not read-then-write.
        let (db, user, vehicle) = setup_with_vehicle().await?;

        let (a, b) = tokio::join!(
            apply_recharge(&db, &user.id, vehicle.id, 50.0, PaymentMethod::Upi),
            apply_recharge(&db, &user.id, vehicle.id, 50.0, PaymentMethod::Cards),
        );
        a.unwrap();
        b.unwrap();

        let stored = get_vehicle_by_id(&db, vehicle.id).await?.unwrap();
        assert_eq!(stored.fastag_balance, 100.0);

        let entries = crate::core::transaction::get_transactions_for_vehicle(&db, vehicle.id).await?;
        assert_eq!(entries.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_reconciliation_sweep_flags_unledgered_balance() -> Result<()> {
        let (db, user, vehicle) = setup_with_vehicle().await?;
        let other = create_test_vehicle(&db, &user.id, "MH12XY9999").await?;

        // A clean recharge leaves no discrepancy
        apply_recharge(&db, &user.id, vehicle.id, 100.0, PaymentMethod::Upi)
            .await
            .unwrap();
        assert!(find_ledger_discrepancies(&db).await?.is_empty());

        // Simulate a step-2 failure: balance moves, ledger does not
        update_vehicle_balance_atomic(&db, &user.id, other.id, 70.0).await?;

        let discrepancies = find_ledger_discrepancies(&db).await?;
        assert_eq!(discrepancies.len(), 1);
        assert_eq!(discrepancies[0].vehicle_id, other.id);
        assert_eq!(discrepancies[0].balance, 70.0);
        assert_eq!(discrepancies[0].ledger_total, 0.0);

        Ok(())
    }
}
