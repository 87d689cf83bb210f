//! # fairsplit-engine
//!
//! Shared-expense settlement engine.
//!
//! People log expenses under categories within a session (a shareable group
//! ledger). The engine folds those expenses into per-person spending totals,
//! computes each person's net balance against an equal split, and produces a
//! minimal set of reimbursing transactions that settles all balances.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: participants, categories, expenses, the spending ledger
//! - **settlement** — Balance sheets and the greedy minimal-transaction settlement engine
//! - **session** — Group ledger sessions: capability-token authorization, roster and
//!   expense management, cached settlement plans
//! - **simulation** — Random scenario generation for stress testing

pub mod core;
pub mod session;
pub mod settlement;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::category::{CategoryAssignment, CategoryName};
    pub use crate::core::expense::{ExpenseLog, ExpenseRecord};
    pub use crate::core::ledger::SpendingLedger;
    pub use crate::core::participant::ParticipantId;
    pub use crate::session::auth::{AccessLevel, OwnerSecret, SessionGrant};
    pub use crate::session::{Session, SessionError};
    pub use crate::settlement::balance::BalanceSheet;
    pub use crate::settlement::engine::{SettlementEngine, SettlementResult, Transaction};
}
