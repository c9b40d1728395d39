//! Core layer - Framework-agnostic ledger logic
//!
//! The pure engine (money, shares, delta, settlement) never touches storage. The pipelines
//! (person, purchase, payment, ledger) wrap it with database transactions through the
//! balance store adapter.

/// Balance persistence adapter over the persons table
pub mod balance_store;
/// Per-person balance deltas for purchase and payment mutations
pub mod delta;
/// Whole-ledger maintenance: rebuild, settlement, conservation checks
pub mod ledger;
/// Fixed-point money in cents
pub mod money;
/// Payment pipeline
pub mod payment;
/// Person management and seeding
pub mod person;
/// Purchase pipeline
pub mod purchase;
/// Storage-agnostic records consumed by the engine
pub mod records;
/// Line totals and share normalization
pub mod shares;
/// Greedy settlement planner
pub mod settlement;
