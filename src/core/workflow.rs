//! Recharge workflow state machine.
//!
//! An explicit three-step finite-state value, independent of any rendering
//! layer: `Details -> Payment -> Confirmation`, with a backward transition
//! from Payment to Details. One workflow instance models one user
//! interaction (one browser tab); dropping it discards the transient
//! session. The acting user is an explicit parameter, never ambient state.

use crate::{
    config::recharge::RechargePolicy,
    core::{
        recharge::{self, RechargeReceipt, UpdateError},
        validation::{self, ValidationError},
        vehicle as vehicle_ops,
    },
    entities::{transaction::PaymentMethod, vehicle},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use thiserror::Error;
use tokio::time::{Duration, sleep};
use tracing::warn;

/// The step the workflow is currently on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Collecting the vehicle and amount
    Details,
    /// Collecting the payment method; "Pay Now" fires the protocol
    Payment,
    /// Terminal; shows the receipt until the session is discarded
    Confirmation,
}

/// Why a workflow operation was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Details submission failed; the user corrects input and retries
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The balance update protocol failed
    #[error(transparent)]
    Update(#[from] UpdateError),
    /// A payment for this session is already suspended at the gateway or store
    #[error("A payment is already in progress.")]
    PaymentInFlight,
    /// The operation is not available at the current step
    #[error("This action is not available at the current step.")]
    WrongStep,
}

/// Non-binding summary shown on the Payment step
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSummary {
    /// Plate number of the selected vehicle
    pub vehicle_number: String,
    /// Amount about to be charged
    pub amount: f64,
    /// Currently selected payment method
    pub method: PaymentMethod,
}

/// One user's in-progress recharge session
#[derive(Debug)]
pub struct RechargeWorkflow {
    user_id: String,
    policy: RechargePolicy,
    vehicles: Vec<vehicle::Model>,
    selected_vehicle_id: Option<i64>,
    amount: Option<f64>,
    method: PaymentMethod,
    step: Step,
    message: Option<String>,
    in_flight: bool,
    receipt: Option<RechargeReceipt>,
}

impl RechargeWorkflow {
    /// Starts a workflow for a user, loading their vehicles from the store.
    ///
    /// An optional vehicle-id hint (e.g., carried in a URL query parameter)
    /// pre-selects that vehicle when it is actually owned by the user;
    /// otherwise, if the user owns exactly one vehicle, it is auto-selected.
    pub async fn start(
        db: &DatabaseConnection,
        user_id: impl Into<String>,
        policy: RechargePolicy,
        vehicle_hint: Option<i64>,
    ) -> Result<Self> {
        let user_id = user_id.into();
        let vehicles = vehicle_ops::get_vehicles_for_owner(db, &user_id).await?;

        let selected_vehicle_id = vehicle_hint
            .filter(|id| vehicles.iter().any(|v| v.id == *id))
            .or_else(|| (vehicles.len() == 1).then(|| vehicles[0].id));

        Ok(Self {
            user_id,
            policy,
            vehicles,
            selected_vehicle_id,
            amount: None,
            method: PaymentMethod::default(),
            step: Step::Details,
            message: None,
            in_flight: false,
            receipt: None,
        })
    }

    /// The current step
    pub const fn step(&self) -> Step {
        self.step
    }

    /// The user's vehicles as of workflow entry or the last refresh
    pub fn vehicles(&self) -> &[vehicle::Model] {
        &self.vehicles
    }

    /// The currently selected vehicle, if any
    pub fn selected_vehicle(&self) -> Option<&vehicle::Model> {
        self.selected_vehicle_id
            .and_then(|id| self.vehicles.iter().find(|v| v.id == id))
    }

    /// The amount entered so far, preserved across the Payment -> Details
    /// backward transition
    pub const fn amount(&self) -> Option<f64> {
        self.amount
    }

    /// The last user-visible status or error message, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The receipt, once the workflow has reached Confirmation
    pub fn confirmation(&self) -> Option<&RechargeReceipt> {
        match self.step {
            Step::Confirmation => self.receipt.as_ref(),
            _ => None,
        }
    }

    /// Submits the Details form: validates the selection and, on success,
    /// advances to Payment.
    ///
    /// On failure the workflow stays in Details with the error surfaced via
    /// [`Self::message`]; the entered inputs are preserved either way, and
    /// the message is cleared on the next attempt.
    pub fn submit_details(
        &mut self,
        selected_id: Option<i64>,
        amount: Option<f64>,
    ) -> std::result::Result<(), WorkflowError> {
        if self.step != Step::Details {
            return Err(WorkflowError::WrongStep);
        }

        self.message = None;
        self.selected_vehicle_id = selected_id;
        self.amount = amount;

        match validation::validate_selection(&self.vehicles, selected_id, amount, &self.policy) {
            Ok(_) => {
                self.step = Step::Payment;
                Ok(())
            }
            Err(e) => {
                self.message = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Selects the payment method (default UPI).
    pub fn select_method(&mut self, method: PaymentMethod) {
        self.method = method;
    }

    /// The non-binding summary shown on the Payment step.
    pub fn payment_summary(&self) -> Option<PaymentSummary> {
        if self.step != Step::Payment {
            return None;
        }
        let vehicle = self.selected_vehicle()?;
        Some(PaymentSummary {
            vehicle_number: vehicle.vehicle_number.clone(),
            amount: self.amount?,
            method: self.method.clone(),
        })
    }

    /// Returns from Payment to Details, preserving the entered vehicle and
    /// amount.
    pub fn back(&mut self) -> std::result::Result<(), WorkflowError> {
        if self.step != Step::Payment {
            return Err(WorkflowError::WrongStep);
        }
        self.step = Step::Details;
        self.message = None;
        Ok(())
    }

    /// "Pay Now": simulates the gateway round trip, then applies the recharge.
    ///
    /// Single-flight per session: while a payment is suspended at the gateway
    /// or the store, further submissions are rejected with
    /// [`WorkflowError::PaymentInFlight`]. On success the workflow advances to
    /// Confirmation, stores the receipt (whose balance is computed, not
    /// re-read), and refreshes the vehicle list best-effort. On protocol
    /// failure it stays in Payment with a `Payment failed` message; a step-2
    /// ledger failure is never retried here - only an explicit new user
    /// action re-enters this method.
    pub async fn pay_now(
        &mut self,
        db: &DatabaseConnection,
    ) -> std::result::Result<&RechargeReceipt, WorkflowError> {
        if self.step != Step::Payment {
            return Err(WorkflowError::WrongStep);
        }
        if self.in_flight {
            return Err(WorkflowError::PaymentInFlight);
        }
        let (Some(vehicle_id), Some(amount)) = (self.selected_vehicle_id, self.amount) else {
            // Payment is only reachable through validation, so these are set
            return Err(WorkflowError::Validation(ValidationError::NoVehicleSelected));
        };

        self.in_flight = true;
        self.message = None;

        // Simulated payment-gateway round trip; suspends without blocking
        // other workflow instances
        sleep(Duration::from_millis(self.policy.gateway_delay_ms)).await;

        let result =
            recharge::apply_recharge(db, &self.user_id, vehicle_id, amount, self.method.clone())
                .await;
        self.in_flight = false;

        match result {
            Ok(receipt) => {
                self.step = Step::Confirmation;
                self.message =
                    Some("Recharge successful! Your FASTag balance has been updated.".to_string());

                match vehicle_ops::get_vehicles_for_owner(db, &self.user_id).await {
                    Ok(vehicles) => self.vehicles = vehicles,
                    Err(e) => {
                        warn!("failed to refresh vehicle list after recharge: {e}");
                    }
                }

                Ok(&*self.receipt.insert(receipt))
            }
            Err(e) => {
                self.message = Some(format!("Payment failed: {e}"));
                Err(e.into())
            }
        }
    }

    /// Marks a payment as suspended, for exercising the single-flight guard.
    #[cfg(test)]
    pub(crate) fn set_in_flight_for_test(&mut self) {
        self.in_flight = true;
    }
}
