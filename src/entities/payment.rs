//! Payment entity - A direct transfer of money between two persons.
//!
//! Payments are independent of purchases; they exist to pay down balances.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Person handing over the money
    pub from_person_id: i64,
    /// Person receiving the money
    pub to_person_id: i64,
    /// Amount in cents, always positive
    pub amount_cents: i64,
    /// Date of the payment
    pub date: Date,
    /// Free-text notes
    pub notes: String,
    /// When the payment was first recorded
    pub created_at: DateTimeUtc,
    /// When the payment was last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Payment and Person
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Sender
    #[sea_orm(
        belongs_to = "super::person::Entity",
        from = "Column::FromPersonId",
        to = "super::person::Column::Id"
    )]
    FromPerson,
    /// Receiver
    #[sea_orm(
        belongs_to = "super::person::Entity",
        from = "Column::ToPersonId",
        to = "super::person::Column::Id"
    )]
    ToPerson,
}

impl ActiveModelBehavior for ActiveModel {}
