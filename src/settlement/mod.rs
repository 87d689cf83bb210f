//! Balance computation and the minimal-transaction settlement engine.

pub mod balance;
pub mod engine;

use rust_decimal::Decimal;

/// Residual balances at or below this magnitude are treated as settled.
///
/// Fair-share division can leave sub-unit residue (e.g. 100 split three
/// ways); no transaction is ever emitted for a remainder this small.
pub const EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 6);
