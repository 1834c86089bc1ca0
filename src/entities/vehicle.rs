//! Vehicle entity - Represents a registered vehicle and its FASTag balance.
//!
//! Each vehicle belongs to exactly one user, carries an uppercased vehicle
//! number that is unique per owner, and holds the prepaid `fastag_balance`
//! that the recharge workflow tops up. The balance is the single source of
//! truth for spendable credit and is only mutated through
//! [`crate::core::vehicle::update_vehicle_balance_atomic`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vehicle database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    /// Unique identifier for the vehicle
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Uuid of the owning user
    pub user_id: String,
    /// Registration plate number, stored uppercased (e.g., "KA01AB1234")
    pub vehicle_number: String,
    /// Category of the vehicle
    pub vehicle_type: VehicleType,
    /// Current prepaid balance in rupees; never negative
    pub fastag_balance: f64,
}

/// Closed set of vehicle categories.
/// Stored as strings but modelled as tagged variants so invalid values can
/// never reach persisted state.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum VehicleType {
    /// Passenger car
    #[sea_orm(string_value = "Car")]
    Car,
    /// Goods truck
    #[sea_orm(string_value = "Truck")]
    Truck,
    /// Bus
    #[sea_orm(string_value = "Bus")]
    Bus,
    /// Motorcycle or scooter
    #[sea_orm(string_value = "Two-Wheeler")]
    TwoWheeler,
    /// Anything else
    #[sea_orm(string_value = "Other")]
    Other,
}

/// Defines relationships between Vehicle and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One vehicle has many ledger entries
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
