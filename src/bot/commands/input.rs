//! Parsing of raw slash command arguments into ledger types.

use crate::{
    core::{money::Money, shares::ShareSelection},
    entities::person,
    errors::{Error, Result},
};
use chrono::NaiveDate;

/// Keyword selecting every person as a participant.
pub const EVERYONE: &str = "all";

/// Most entries a listing command shows, keeping replies under Discord's message limit.
pub const MAX_PAGE_SIZE: u64 = 25;

/// Converts a user-entered amount in dollars to [`Money`].
///
/// # Errors
/// [`Error::Validation`] for non-finite amounts and amounts beyond [`Money::MAX_AMOUNT`].
pub fn parse_amount(value: f64) -> Result<Money> {
    if !value.is_finite() {
        return Err(Error::validation("Amount must be a valid number"));
    }
    Money::try_from_major(value).ok_or_else(|| {
        Error::validation(format!("Amount must not exceed {}", Money::MAX_AMOUNT))
    })
}

/// Number of entries to list: `limit` or `default`, clamped to `1..=MAX_PAGE_SIZE`.
#[must_use]
pub fn page_size(limit: Option<u64>, default: u64) -> u64 {
    limit.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
}

/// Parses an optional `YYYY-MM-DD` date, falling back to `today`.
///
/// # Errors
/// [`Error::Validation`] when the date does not parse.
pub fn parse_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(today),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            Error::validation(format!("Date '{raw}' must look like 2024-01-31"))
        }),
    }
}

/// Finds a person by name, ignoring case and surrounding whitespace.
///
/// # Errors
/// [`Error::PersonNotFound`] when nobody has that name.
pub fn find_person<'a>(persons: &'a [person::Model], name: &str) -> Result<&'a person::Model> {
    let wanted = name.trim().to_lowercase();
    persons
        .iter()
        .find(|person| person.name.to_lowercase() == wanted)
        .ok_or_else(|| Error::PersonNotFound {
            reference: name.trim().to_string(),
        })
}

/// Parses a participant list: `all`, or comma-separated person names.
///
/// # Errors
/// [`Error::PersonNotFound`] for an unknown name, [`Error::Validation`] for an empty list.
pub fn parse_participants(raw: &str, persons: &[person::Model]) -> Result<ShareSelection> {
    if raw.trim().eq_ignore_ascii_case(EVERYONE) {
        return Ok(ShareSelection::Communal);
    }

    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| find_person(persons, name).map(|person| person.id))
        .collect::<Result<Vec<_>>>()?;

    if ids.is_empty() {
        return Err(Error::validation("At least one person must buy this item"));
    }
    Ok(ShareSelection::Selected(ids))
}
