//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggests person names for payer/sender/receiver arguments and completes the last entry
//! of comma-separated participant lists.

use crate::{
    bot::{BotData, commands::input::EVERYONE},
    core::person,
    entities,
    errors::Error,
};

/// Discord shows at most this many suggestions.
const MAX_SUGGESTIONS: usize = 25;

/// Provides autocomplete suggestions for a single person name.
pub async fn autocomplete_person_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(persons) = person::get_all_persons(&ctx.data().database).await else {
        return Vec::new();
    };
    match_person_names(&persons, partial)
}

/// Provides autocomplete suggestions for a participant list such as `Alice, Bo`.
///
/// Completes the entry after the last comma and offers `all` on an empty list.
pub async fn autocomplete_participants(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(persons) = person::get_all_persons(&ctx.data().database).await else {
        return Vec::new();
    };
    complete_participants(&persons, partial)
}

fn match_person_names(persons: &[entities::PersonModel], partial: &str) -> Vec<String> {
    let partial_lower = partial.trim().to_lowercase();
    // Already ordered by name
    persons
        .iter()
        .filter(|person| person.name.to_lowercase().contains(&partial_lower))
        .map(|person| person.name.clone())
        .take(MAX_SUGGESTIONS)
        .collect()
}

fn complete_participants(persons: &[entities::PersonModel], partial: &str) -> Vec<String> {
    let (head, current) = partial.rsplit_once(',').unwrap_or(("", partial));
    let chosen: Vec<String> = head
        .split(',')
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let mut suggestions = Vec::new();
    if chosen.is_empty() && EVERYONE.starts_with(&current.trim().to_lowercase()) {
        suggestions.push(EVERYONE.to_string());
    }

    let prefix = if chosen.is_empty() {
        String::new()
    } else {
        format!("{}, ", head.trim())
    };
    suggestions.extend(
        match_person_names(persons, current)
            .into_iter()
            .filter(|name| !chosen.contains(&name.to_lowercase()))
            .map(|name| format!("{prefix}{name}")),
    );
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}
