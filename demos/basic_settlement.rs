//! Basic aggregation and settlement example.
//!
//! Demonstrates how the engine folds raw expenses into filtered totals
//! and matches debtors to creditors.

use fairsplit_engine::core::category::{CategoryAssignment, CategoryName};
use fairsplit_engine::core::expense::ExpenseLog;
use fairsplit_engine::core::ledger::SpendingLedger;
use fairsplit_engine::core::participant::ParticipantId;
use fairsplit_engine::settlement::engine::SettlementEngine;
use rust_decimal_macros::dec;

fn main() {
    println!("╔═══════════════════════════════════════════════╗");
    println!("║  fairsplit-engine: Basic Settlement Example   ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    // --- Scenario 1: One payer covers everything ---
    println!("━━━ Scenario 1: One Payer ━━━\n");

    let alice = ParticipantId::new("Alice");
    let bob = ParticipantId::new("Bob");
    let carol = ParticipantId::new("Carol");
    let roster = vec![alice.clone(), bob.clone(), carol.clone()];

    let food = CategoryName::new("Food");

    let mut log = ExpenseLog::new();
    log.log(alice.clone(), food.clone(), dec!(100));
    log.log(bob.clone(), food.clone(), dec!(50));

    let assignment = CategoryAssignment::full(roster.iter().cloned(), [food.clone()]);
    let ledger = SpendingLedger::aggregate(&log, &assignment);
    let result = SettlementEngine::settle(&roster, &ledger);

    println!("{}", result);

    // --- Scenario 2: Category filtering ---
    println!("━━━ Scenario 2: Category Filtering ━━━\n");

    let dave = ParticipantId::new("Dave");
    let travel = CategoryName::new("Travel");

    let mut log = ExpenseLog::new();
    log.log(dave.clone(), travel.clone(), dec!(300));
    log.log(dave.clone(), food.clone(), dec!(40));

    // Dave is only charged for Food, so the Travel spending never
    // reaches settlement.
    let mut assignment = CategoryAssignment::new();
    assignment.assign(dave.clone(), [food.clone()]);

    let ledger = SpendingLedger::aggregate(&log, &assignment);
    println!("Dave logged:       {}", log.gross_total());
    println!("Dave counted:      {}", ledger.total_for(&dave));
    println!("Travel (dropped):  {}", ledger.category_total(&dave, &travel));
}
