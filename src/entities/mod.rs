//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod item_share;
pub mod payment;
pub mod person;
pub mod purchase;
pub mod purchase_item;

// Re-export specific types to avoid conflicts
pub use item_share::{Column as ItemShareColumn, Entity as ItemShare, Model as ItemShareModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use person::{Column as PersonColumn, Entity as Person, Model as PersonModel};
pub use purchase::{Column as PurchaseColumn, Entity as Purchase, Model as PurchaseModel};
pub use purchase_item::{
    Column as PurchaseItemColumn, Entity as PurchaseItem, Model as PurchaseItemModel,
};
