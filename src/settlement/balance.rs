use crate::core::ledger::SpendingLedger;
use crate::core::participant::ParticipantId;
use crate::settlement::EPSILON;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Each participant's net position against the equal-split fair share.
///
/// A positive balance means the participant overpaid (net creditor).
/// A negative balance means the participant underpaid (net debtor).
///
/// Balances always sum to zero up to division residue, since the fair
/// share is the simple mean of filtered spending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// (participant, balance) pairs in roster order.
    entries: Vec<(ParticipantId, Decimal)>,
    fair_share: Decimal,
    total_spent: Decimal,
}

impl BalanceSheet {
    /// Compute balances for a roster against a filtered spending ledger.
    ///
    /// Participants absent from the ledger count as having spent zero.
    /// An empty roster yields an empty sheet (no division takes place).
    pub fn compute(participants: &[ParticipantId], ledger: &SpendingLedger) -> Self {
        if participants.is_empty() {
            return Self::default();
        }

        let spent: Vec<Decimal> = participants.iter().map(|p| ledger.total_for(p)).collect();
        let total_spent: Decimal = spent.iter().copied().sum();
        let fair_share = total_spent / Decimal::from(participants.len());

        let entries = participants
            .iter()
            .cloned()
            .zip(spent.into_iter().map(|s| s - fair_share))
            .collect();

        Self {
            entries,
            fair_share,
            total_spent,
        }
    }

    /// The equal-split share each participant is expected to cover.
    pub fn fair_share(&self) -> Decimal {
        self.fair_share
    }

    /// Total filtered spending across the roster.
    pub fn total_spent(&self) -> Decimal {
        self.total_spent
    }

    /// Number of participants on the sheet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A participant's net balance, zero if not on the sheet.
    pub fn balance_of(&self, participant: &ParticipantId) -> Decimal {
        self.entries
            .iter()
            .find(|(p, _)| p == participant)
            .map(|(_, b)| *b)
            .unwrap_or(Decimal::ZERO)
    }

    /// All (participant, balance) pairs in roster order.
    pub fn entries(&self) -> &[(ParticipantId, Decimal)] {
        &self.entries
    }

    /// Participants who underpaid, most negative first.
    ///
    /// The sort is stable: ties keep roster order, which makes the
    /// settlement plan deterministic for identical input ordering.
    pub fn debtors(&self) -> Vec<(ParticipantId, Decimal)> {
        let mut debtors: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, b)| *b < -EPSILON)
            .cloned()
            .collect();
        debtors.sort_by(|a, b| a.1.cmp(&b.1));
        debtors
    }

    /// Participants who overpaid, largest first. Stable like [`Self::debtors`].
    pub fn creditors(&self) -> Vec<(ParticipantId, Decimal)> {
        let mut creditors: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, b)| *b > EPSILON)
            .cloned()
            .collect();
        creditors.sort_by(|a, b| b.1.cmp(&a.1));
        creditors
    }

    /// Verify that balances sum to zero within the settlement epsilon.
    pub fn is_conserved(&self) -> bool {
        let sum: Decimal = self.entries.iter().map(|(_, b)| *b).sum();
        sum.abs() <= EPSILON
    }
}
