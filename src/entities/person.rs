//! Person entity - A member of the group sharing expenses.
//!
//! Persons are created up front (seeded from config.toml or added by an editor). The ledger
//! only ever changes their `balance_cents`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Person database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "persons")]
pub struct Model {
    /// Unique identifier for the person
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, unique within the group
    #[sea_orm(unique)]
    pub name: String,
    /// Net balance in cents: positive when the group owes this person
    pub balance_cents: i64,
    /// When the person was added
    pub created_at: DateTimeUtc,
    /// When the balance last changed
    pub updated_at: DateTimeUtc,
}

/// Persons are referenced by purchases, shares and payments
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Purchases this person paid for
    #[sea_orm(has_many = "super::purchase::Entity")]
    Purchases,
    /// Line item shares charged to this person
    #[sea_orm(has_many = "super::item_share::Entity")]
    ItemShares,
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl Related<super::item_share::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemShares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
