use crate::core::category::{CategoryAssignment, CategoryName};
use crate::core::expense::ExpenseLog;
use crate::core::participant::ParticipantId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-participant, per-category spending totals.
///
/// The ledger is the output of aggregation: a fold of the expense log,
/// filtered by each participant's category assignment, into running sums.
/// It is the input the settlement engine balances against the fair share.
///
/// A record only lands in the ledger when its category is in the spender's
/// assigned set; everything else is effectively unassigned spending and is
/// left out of settlement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpendingLedger {
    /// (ParticipantId, CategoryName) -> summed amount
    #[serde(with = "totals_serde")]
    totals: HashMap<(ParticipantId, CategoryName), Decimal>,
}

mod totals_serde {
    use super::*;
    use serde::de::{self, MapAccess, Visitor};
    use serde::ser::SerializeMap;

    pub fn serialize<S: serde::Serializer>(
        totals: &HashMap<(ParticipantId, CategoryName), Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(totals.len()))?;
        for ((participant, category), amount) in totals {
            map.serialize_entry(&format!("{}:{}", participant, category), amount)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<(ParticipantId, CategoryName), Decimal>, D::Error> {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = HashMap<(ParticipantId, CategoryName), Decimal>;
            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map with \"participant:category\" keys")
            }
            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
                let mut map = HashMap::new();
                while let Some((key, value)) = access.next_entry::<String, Decimal>()? {
                    let (participant, category) = key
                        .split_once(':')
                        .ok_or_else(|| de::Error::custom(format!("invalid key: {key}")))?;
                    map.insert(
                        (ParticipantId::new(participant), CategoryName::new(category)),
                        value,
                    );
                }
                Ok(map)
            }
        }
        deserializer.deserialize_map(V)
    }
}

impl SpendingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an expense log into per-participant, per-category totals,
    /// keeping only records whose category is assigned to the spender.
    ///
    /// Pure and order-independent: summation order does not affect the
    /// result. Participants matching no inclusion rule are absent from the
    /// ledger, not present with an empty breakdown.
    pub fn aggregate(log: &ExpenseLog, assignment: &CategoryAssignment) -> Self {
        let mut ledger = Self::new();
        for record in log.records() {
            if assignment.allows(record.participant(), record.category()) {
                ledger.add(
                    record.participant().clone(),
                    record.category().clone(),
                    record.amount(),
                );
            }
        }
        ledger
    }

    /// Add an amount to a participant's total for a category.
    pub fn add(&mut self, participant: ParticipantId, category: CategoryName, amount: Decimal) {
        *self
            .totals
            .entry((participant, category))
            .or_insert(Decimal::ZERO) += amount;
    }

    /// A participant's total for one category.
    pub fn category_total(&self, participant: &ParticipantId, category: &CategoryName) -> Decimal {
        self.totals
            .get(&(participant.clone(), category.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// A participant's total across all of their categories.
    pub fn total_for(&self, participant: &ParticipantId) -> Decimal {
        self.totals
            .iter()
            .filter(|((p, _), _)| p == participant)
            .map(|(_, &v)| v)
            .sum()
    }

    /// Per-category breakdown for a participant.
    pub fn breakdown_for(&self, participant: &ParticipantId) -> HashMap<CategoryName, Decimal> {
        self.totals
            .iter()
            .filter(|((p, _), _)| p == participant)
            .map(|((_, c), &v)| (c.clone(), v))
            .collect()
    }

    /// Whether the participant has any filtered spending at all.
    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.totals.keys().any(|(p, _)| p == participant)
    }

    /// All entries in the ledger.
    pub fn all_totals(&self) -> &HashMap<(ParticipantId, CategoryName), Decimal> {
        &self.totals
    }

    /// Total filtered spending across all participants.
    pub fn grand_total(&self) -> Decimal {
        self.totals.values().sum()
    }
}
