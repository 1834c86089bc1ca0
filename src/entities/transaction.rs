//! Transaction entity - The append-only recharge ledger.
//!
//! Each row records a single recharge event: `user_id`, `vehicle_id`, the
//! positive `amount`, a `status`, the `payment_method` used, and `created_at`.
//! Rows are immutable once created - this crate never updates or deletes them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the ledger entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Uuid of the user who paid
    pub user_id: String,
    /// ID of the vehicle that was recharged
    pub vehicle_id: i64,
    /// Recharge amount in rupees; always positive
    pub amount: f64,
    /// Outcome recorded for this ledger entry
    pub status: TransactionStatus,
    /// Payment method chosen in the workflow
    pub payment_method: PaymentMethod,
    /// When the ledger entry was created
    pub created_at: DateTimeUtc,
}

/// Outcome of a recorded recharge
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum TransactionStatus {
    /// The balance increment was applied
    #[sea_orm(string_value = "Success")]
    Success,
    /// The payment did not go through; no balance mutation
    #[sea_orm(string_value = "Failed")]
    Failed,
}

/// Closed set of supported payment methods
#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PaymentMethod {
    /// UPI (Google Pay, PhonePe, Paytm)
    #[default]
    #[sea_orm(string_value = "UPI")]
    Upi,
    /// Netbanking
    #[sea_orm(string_value = "Netbanking")]
    Netbanking,
    /// Credit/debit cards
    #[sea_orm(string_value = "Cards")]
    Cards,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Upi => "UPI",
            Self::Netbanking => "Netbanking",
            Self::Cards => "Cards",
        })
    }
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each ledger entry belongs to one vehicle
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id"
    )]
    Vehicle,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
