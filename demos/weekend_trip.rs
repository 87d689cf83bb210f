//! Full session walkthrough: a weekend trip ledger.
//!
//! Shows the capability-token flow — owner secret, editor password,
//! viewer — and a settlement recomputation after the expenses change.

use fairsplit_engine::core::category::CategoryName;
use fairsplit_engine::session::Session;
use rust_decimal_macros::dec;
use std::collections::HashMap;

fn main() {
    println!("╔═══════════════════════════════════════════╗");
    println!("║  fairsplit-engine: Weekend Trip Example   ║");
    println!("╚═══════════════════════════════════════════╝\n");

    let (mut session, secret) = Session::create("Cabin Weekend", "lakehouse").unwrap();
    let owner = session.grant_owner(&secret).unwrap();

    let alice = session.add_participant(&owner, "alice").unwrap();
    let bob = session.add_participant(&owner, "bob").unwrap();
    let carol = session.add_participant(&owner, "carol").unwrap();

    // Bob joins with the shared password and logs his own expenses.
    let editor = session.grant_editor("lakehouse").unwrap();
    session
        .record_expense(&editor, &alice, "Lodging", dec!(240))
        .unwrap();
    session
        .record_expense(&editor, &bob, "Food", dec!(90))
        .unwrap();
    session
        .record_expense(&editor, &carol, "Fuel", dec!(45))
        .unwrap();

    // Everyone splits everything.
    let all: Vec<CategoryName> = session.categories().iter().cloned().collect();
    let assignment: HashMap<_, _> = session
        .roster()
        .iter()
        .map(|p| (p.clone(), all.clone()))
        .collect();
    session.apply_assignment(&editor, &assignment).unwrap();

    let result = session.recompute_settlement(&editor).unwrap();
    println!("{}", result);

    // A late expense comes in; the plan is recomputed wholesale.
    println!("━━━ After a late grocery run ━━━\n");
    session
        .record_expense(&editor, &carol, "Food", dec!(75))
        .unwrap();
    let result = session.recompute_settlement(&editor).unwrap();
    println!("{}", result);

    println!("Cached plan ({} transactions):", session.transactions().len());
    for t in session.transactions() {
        println!("  {}", t);
    }
}
