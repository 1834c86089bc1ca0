//! User entity - Represents a registered account.
//!
//! Users are identified by an opaque uuid string and sign in with an email
//! and a bcrypt password hash. Every vehicle and transaction row carries a
//! `user_id` referencing this table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Opaque uuid identifier for the user
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Sign-in email address, lowercased and unique
    #[sea_orm(unique)]
    pub email: String,
    /// Bcrypt hash of the user's password
    pub password_hash: String,
    /// When the account was registered
    pub created_at: DateTimeUtc,
}

/// Users are referenced from vehicles and transactions by their opaque id
/// only; the stores treat the auth service as external and carry no foreign
/// key back to this table.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
