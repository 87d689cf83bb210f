//! Foundational types for the expense ledger.

pub mod category;
pub mod expense;
pub mod ledger;
pub mod participant;
