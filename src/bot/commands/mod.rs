//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// General utility commands
pub mod general;

/// Parsing of raw slash command arguments
pub mod input;

/// Balance, settlement and person commands
pub mod ledger;

/// Payment commands
pub mod payment;

/// Purchase commands
pub mod purchase;

// Export commands
pub use general::*;
pub use ledger::*;
pub use payment::*;
pub use purchase::*;
