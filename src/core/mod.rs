//! Core business logic - framework-agnostic operations over the ledger store.
//!
//! Nothing in this module knows about rendering or request handling; every
//! function takes the database connection and the acting user explicitly.

/// Balance update protocol and ledger reconciliation
pub mod recharge;
/// Ledger (transaction) operations
pub mod transaction;
/// Pure vehicle-selection and amount validation
pub mod validation;
/// Vehicle operations, including the atomic balance increment
pub mod vehicle;
/// The three-step recharge workflow state machine
pub mod workflow;
