//! Purchase item entity - One line of a purchase.
//!
//! `total_price_cents` is derived (`quantity * price * (1 + tax_rate / 100)`) and written by
//! the purchase pipeline; it is never taken from the caller.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase line item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Purchase this line belongs to
    pub purchase_id: i64,
    /// Item description
    pub item_name: String,
    /// Number of units (may be fractional, e.g. weight)
    pub quantity: f64,
    /// Unit price in cents
    pub price_cents: i64,
    /// Tax rate in percent
    pub tax_rate: f64,
    /// Line total in cents
    pub total_price_cents: i64,
}

/// Defines relationships between PurchaseItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line item belongs to one purchase
    #[sea_orm(
        belongs_to = "super::purchase::Entity",
        from = "Column::PurchaseId",
        to = "super::purchase::Column::Id"
    )]
    Purchase,
    /// One line item has many shares
    #[sea_orm(has_many = "super::item_share::Entity")]
    Shares,
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchase.def()
    }
}

impl Related<super::item_share::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
