//! Item share entity - The fraction of a line item charged to one person.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item share database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_shares")]
pub struct Model {
    /// Unique identifier for the share
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Line item being shared
    pub purchase_item_id: i64,
    /// Person charged
    pub person_id: i64,
    /// Fraction of the line total in (0, 1]
    pub share_rate: f64,
}

/// Defines relationships between ItemShare and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each share belongs to one line item
    #[sea_orm(
        belongs_to = "super::purchase_item::Entity",
        from = "Column::PurchaseItemId",
        to = "super::purchase_item::Column::Id"
    )]
    PurchaseItem,
    /// Each share is charged to one person
    #[sea_orm(
        belongs_to = "super::person::Entity",
        from = "Column::PersonId",
        to = "super::person::Column::Id"
    )]
    Person,
}

impl Related<super::purchase_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseItem.def()
    }
}

impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Person.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
