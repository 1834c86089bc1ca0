//! Vehicle selection and amount validation for the recharge workflow.
//!
//! A pure function of its inputs: no database access, no side effects. The
//! workflow calls this on every Details submit, and the balance update
//! protocol assumes its checks have passed.

use crate::config::recharge::RechargePolicy;
use crate::entities::vehicle;
use thiserror::Error;

/// Why a Details submission was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No vehicle chosen, or the chosen id is not in the user's list
    #[error("Please select a vehicle.")]
    NoVehicleSelected,
    /// Amount missing, non-numeric, non-positive, below the minimum, or not
    /// a whole multiple of the configured step
    #[error("Please enter a valid recharge amount.")]
    InvalidAmount,
}

/// A vehicle/amount pair that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSelection {
    /// The selected vehicle
    pub vehicle: vehicle::Model,
    /// The validated recharge amount
    pub amount: f64,
}

/// Validates a vehicle selection and recharge amount against the policy.
///
/// The selected id must reference a vehicle in `vehicles` (the caller's own
/// list), and the amount must be a finite positive number that is at least
/// `policy.min_amount` and a whole multiple of `policy.amount_step`.
pub fn validate_selection(
    vehicles: &[vehicle::Model],
    selected_id: Option<i64>,
    amount: Option<f64>,
    policy: &RechargePolicy,
) -> Result<ValidSelection, ValidationError> {
    let id = selected_id.ok_or(ValidationError::NoVehicleSelected)?;
    let vehicle = vehicles
        .iter()
        .find(|v| v.id == id)
        .ok_or(ValidationError::NoVehicleSelected)?;

    let amount = amount.ok_or(ValidationError::InvalidAmount)?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::InvalidAmount);
    }
    if amount < policy.min_amount {
        return Err(ValidationError::InvalidAmount);
    }
    if policy.amount_step > 0.0 && amount % policy.amount_step != 0.0 {
        return Err(ValidationError::InvalidAmount);
    }

    Ok(ValidSelection {
        vehicle: vehicle.clone(),
        amount,
    })
}
