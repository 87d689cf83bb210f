//! Random expense scenario generation.
//!
//! Produces rosters and expense logs of configurable size to exercise
//! aggregation and settlement under load.

use crate::core::category::{CategoryAssignment, CategoryName};
use crate::core::expense::ExpenseLog;
use crate::core::participant::ParticipantId;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Configuration for generating a random expense scenario.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Number of participants on the roster.
    pub participant_count: usize,
    /// Category pool to draw from.
    pub categories: Vec<CategoryName>,
    /// Average number of expenses logged per participant.
    pub expenses_per_participant: usize,
    /// Minimum expense amount.
    pub min_amount: Decimal,
    /// Maximum expense amount.
    pub max_amount: Decimal,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            participant_count: 10,
            categories: vec![
                CategoryName::new("Food"),
                CategoryName::new("Travel"),
                CategoryName::new("Lodging"),
            ],
            expenses_per_participant: 3,
            min_amount: Decimal::from(5),
            max_amount: Decimal::from(500),
        }
    }
}

/// A generated scenario: roster, full category assignment, expense log.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub roster: Vec<ParticipantId>,
    pub assignment: CategoryAssignment,
    pub log: ExpenseLog,
}

/// Generate a random scenario for testing.
///
/// Every participant is assigned every category, so all generated spending
/// counts toward settlement. Amounts land on cents between the configured
/// bounds.
pub fn generate_random_scenario(config: &ScenarioConfig) -> Scenario {
    let mut rng = rand::thread_rng();

    let roster: Vec<ParticipantId> = (0..config.participant_count)
        .map(|i| ParticipantId::new(format!("Guest-{:03}", i)))
        .collect();

    let assignment = CategoryAssignment::full(roster.iter().cloned(), config.categories.clone());

    let min_cents = (config.min_amount * Decimal::ONE_HUNDRED)
        .trunc()
        .to_i64()
        .unwrap_or(1)
        .max(1);
    let max_cents = (config.max_amount * Decimal::ONE_HUNDRED)
        .trunc()
        .to_i64()
        .unwrap_or(min_cents)
        .max(min_cents);

    let total_expenses = config.participant_count * config.expenses_per_participant;
    let mut log = ExpenseLog::new();
    for _ in 0..total_expenses {
        let participant = roster[rng.gen_range(0..roster.len())].clone();
        let category = config.categories[rng.gen_range(0..config.categories.len())].clone();
        let cents = rng.gen_range(min_cents..=max_cents);
        log.push(crate::core::expense::ExpenseRecord::new(
            participant,
            category,
            Decimal::new(cents, 2),
        ));
    }

    Scenario {
        roster,
        assignment,
        log,
    }
}
