//! Group ledger sessions.
//!
//! A session scopes a roster, categories, expenses, and a cached
//! settlement plan behind capability-token authorization: the creator
//! holds an owner secret, editors unlock with the session password, and
//! anyone with the link can view.

pub mod auth;
pub mod session;

pub use self::session::{Session, SessionError};
