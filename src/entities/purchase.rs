//! Purchase entity - Something one person paid for on behalf of the group.
//!
//! The purchase row holds the header (name, store, date, payer). Its cost lives in
//! `purchase_items`, and who owes what lives in `item_shares`. `total_amount_cents` is derived
//! and recomputed on every write. `version` is bumped on every update for optimistic locking.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    /// Unique identifier for the purchase
    #[sea_orm(primary_key)]
    pub id: i64,
    /// What was bought (e.g., "Weekly groceries")
    pub name: String,
    /// Where it was bought
    pub store: String,
    /// Date of the purchase
    pub date: Date,
    /// Person who paid
    pub paid_by: i64,
    /// Sum of all line totals in cents
    pub total_amount_cents: i64,
    /// Incremented on every update
    pub version: i32,
    /// When the purchase was first recorded
    pub created_at: DateTimeUtc,
    /// When the purchase was last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Purchase and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each purchase is paid by one person
    #[sea_orm(
        belongs_to = "super::person::Entity",
        from = "Column::PaidBy",
        to = "super::person::Column::Id"
    )]
    Payer,
    /// One purchase has many line items
    #[sea_orm(has_many = "super::purchase_item::Entity")]
    Items,
}

impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payer.def()
    }
}

impl Related<super::purchase_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
