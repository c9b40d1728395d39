//! Person business logic - Creating, looking up and seeding the members of the group.
//!
//! Balances are never written here except for the zero starting balance; all later changes
//! go through the purchase and payment pipelines.

use crate::{
    config::persons::PersonConfig,
    entities::{Person, person},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Creates a new person with a zero balance.
///
/// The name is trimmed and must not be empty or collide (case-insensitively) with an existing
/// person.
pub async fn create_person<C>(db: &C, name: &str) -> Result<person::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Person name must not be empty"));
    }
    if get_person_by_name(db, name).await?.is_some() {
        return Err(Error::validation(format!("Person '{name}' already exists")));
    }

    let now = chrono::Utc::now();
    let person = person::ActiveModel {
        name: Set(name.to_string()),
        balance_cents: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = person.insert(db).await?;
    info!(person_id = result.id, name = %result.name, "Created person");
    Ok(result)
}

/// Retrieves every person ordered by name.
pub async fn get_all_persons<C>(db: &C) -> Result<Vec<person::Model>>
where
    C: ConnectionTrait,
{
    Person::find()
        .order_by_asc(person::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a person by id.
pub async fn get_person_by_id<C>(db: &C, person_id: i64) -> Result<Option<person::Model>>
where
    C: ConnectionTrait,
{
    Person::find_by_id(person_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a person by name, ignoring case and surrounding whitespace.
pub async fn get_person_by_name<C>(db: &C, name: &str) -> Result<Option<person::Model>>
where
    C: ConnectionTrait,
{
    let wanted = name.trim().to_lowercase();
    Ok(get_all_persons(db)
        .await?
        .into_iter()
        .find(|person| person.name.to_lowercase() == wanted))
}

/// Like [`get_person_by_name`] but fails with [`Error::PersonNotFound`] when nobody matches.
pub async fn require_person_by_name<C>(db: &C, name: &str) -> Result<person::Model>
where
    C: ConnectionTrait,
{
    get_person_by_name(db, name)
        .await?
        .ok_or_else(|| Error::PersonNotFound {
            reference: name.trim().to_string(),
        })
}

/// Creates every configured person that does not exist yet. Returns how many were created.
pub async fn seed_persons<C>(db: &C, persons: &[PersonConfig]) -> Result<usize>
where
    C: ConnectionTrait,
{
    let mut created = 0;
    for config in persons {
        if get_person_by_name(db, &config.name).await?.is_some() {
            continue;
        }
        create_person(db, &config.name).await?;
        created += 1;
    }
    info!(
        configured = persons.len(),
        created, "Seeded persons from configuration"
    );
    Ok(created)
}
