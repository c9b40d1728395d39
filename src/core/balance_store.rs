//! Balance store adapter.
//!
//! The only place running balances are read from or written to the `persons` table. Every
//! function is generic over [`ConnectionTrait`] so the pipelines can pass their open
//! transaction and have balance writes commit or roll back together with the record write.

use crate::{
    core::{money::Money, records::PersonBalance},
    entities::{Person, person},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*, sea_query::Expr};
use tracing::debug;

impl From<person::Model> for PersonBalance {
    fn from(model: person::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            balance: Money::from_cents(model.balance_cents),
        }
    }
}

/// Loads every person with their current balance, ordered by name.
pub async fn load_all_balances<C>(db: &C) -> Result<Vec<PersonBalance>>
where
    C: ConnectionTrait,
{
    let persons = Person::find()
        .order_by_asc(person::Column::Name)
        .all(db)
        .await?;
    Ok(persons.into_iter().map(PersonBalance::from).collect())
}

/// Loads one person's balance.
///
/// # Errors
/// [`Error::PersonNotFound`] if no person has this id.
pub async fn load_person_balance<C>(db: &C, person_id: i64) -> Result<Money>
where
    C: ConnectionTrait,
{
    Person::find_by_id(person_id)
        .one(db)
        .await?
        .map(|person| Money::from_cents(person.balance_cents))
        .ok_or_else(|| Error::PersonNotFound {
            reference: person_id.to_string(),
        })
}

/// Overwrites the stored balance of every person in `balances`.
///
/// Persons not listed are left untouched.
///
/// # Errors
/// [`Error::PersonNotFound`] if a listed person has no row. Earlier writes are only undone
/// when `db` is a transaction that the caller then drops.
pub async fn commit_balances<C>(db: &C, balances: &[PersonBalance]) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();
    for entry in balances {
        let result = Person::update_many()
            .col_expr(
                person::Column::BalanceCents,
                Expr::value(entry.balance.cents()),
            )
            .col_expr(person::Column::UpdatedAt, Expr::value(now))
            .filter(person::Column::Id.eq(entry.id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::PersonNotFound {
                reference: entry.id.to_string(),
            });
        }
    }
    debug!(count = balances.len(), "Committed balances");
    Ok(())
}

/// Entries of `after` whose balance differs from the same person in `before`.
///
/// Lets the pipelines write only the rows a mutation touched.
#[must_use]
pub fn changed_balances(before: &[PersonBalance], after: Vec<PersonBalance>) -> Vec<PersonBalance> {
    after
        .into_iter()
        .filter(|updated| {
            before
                .iter()
                .find(|previous| previous.id == updated.id)
                .is_none_or(|previous| previous.balance != updated.balance)
        })
        .collect()
}
