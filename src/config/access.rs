//! Ledger edit permissions loaded from environment variables.
//!
//! `LEDGER_EDITOR_IDS` holds a comma-separated list of Discord user IDs allowed to change the
//! ledger. When it is unset or empty, anyone in the server may edit.

use crate::errors::{Error, Result};
use std::collections::HashSet;

/// Set of Discord user IDs allowed to mutate the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorAccess {
    editors: HashSet<String>,
}

impl EditorAccess {
    /// Parses a comma-separated ID list, ignoring blanks and surrounding whitespace.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let editors = raw
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToString::to_string)
            .collect();
        Self { editors }
    }

    /// Reads `LEDGER_EDITOR_IDS` from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("LEDGER_EDITOR_IDS")
            .map(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }

    /// Whether every user may edit.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.editors.is_empty()
    }

    /// Whether `user_id` may edit.
    #[must_use]
    pub fn is_allowed(&self, user_id: &str) -> bool {
        self.is_open() || self.editors.contains(user_id)
    }

    /// Fails with [`Error::Unauthorized`] unless `user_id` may edit.
    pub fn ensure_allowed(&self, user_id: &str) -> Result<()> {
        if self.is_allowed(user_id) {
            Ok(())
        } else {
            Err(Error::Unauthorized {
                user_id: user_id.to_string(),
            })
        }
    }
}
