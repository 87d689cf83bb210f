use crate::core::ledger::SpendingLedger;
use crate::core::participant::ParticipantId;
use crate::settlement::balance::BalanceSheet;
use crate::settlement::EPSILON;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single reimbursement: `debtor` pays `creditor` `amount`.
///
/// Transactions are never mutated once produced. When the underlying
/// expenses change, the caller recomputes the full plan and replaces the
/// old one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub debtor: ParticipantId,
    pub creditor: ParticipantId,
    pub amount: Decimal,
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} pays {} {}", self.debtor, self.creditor, self.amount)
    }
}

/// Result of one settlement computation.
///
/// Carries the reimbursement plan in emission order plus the balance sheet
/// it was derived from, so callers can display per-participant positions
/// alongside the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementResult {
    transactions: Vec<Transaction>,
    sheet: BalanceSheet,
}

impl SettlementResult {
    /// The reimbursement plan, in emission order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// The equal-split share each participant was expected to cover.
    pub fn fair_share(&self) -> Decimal {
        self.sheet.fair_share()
    }

    /// Total filtered spending across the roster.
    pub fn total_spent(&self) -> Decimal {
        self.sheet.total_spent()
    }

    /// A participant's net balance before settlement.
    pub fn balance_of(&self, participant: &ParticipantId) -> Decimal {
        self.sheet.balance_of(participant)
    }

    /// The balance sheet the plan was derived from.
    pub fn balance_sheet(&self) -> &BalanceSheet {
        &self.sheet
    }

    /// Verify the plan: replaying every transaction against the initial
    /// balances must bring every participant to zero within epsilon.
    pub fn is_settled(&self) -> bool {
        let mut remaining: HashMap<&ParticipantId, Decimal> = self
            .sheet
            .entries()
            .iter()
            .map(|(p, b)| (p, *b))
            .collect();

        for t in &self.transactions {
            *remaining.entry(&t.debtor).or_insert(Decimal::ZERO) += t.amount;
            *remaining.entry(&t.creditor).or_insert(Decimal::ZERO) -= t.amount;
        }

        remaining.values().all(|v| v.abs() <= EPSILON)
    }
}

impl std::fmt::Display for SettlementResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Settlement Result ===")?;
        writeln!(f, "Total Spent:    {}", self.total_spent())?;
        writeln!(f, "Fair Share:     {}", self.fair_share())?;
        writeln!(f, "Transactions:   {}", self.transactions.len())?;
        writeln!(f, "Settled:        {}", self.is_settled())?;

        if !self.transactions.is_empty() {
            writeln!(f, "\n--- Plan ---")?;
            for t in &self.transactions {
                writeln!(f, "  {}", t)?;
            }
        }
        Ok(())
    }
}

/// The core settlement engine.
///
/// Computes each participant's net balance against the equal-split fair
/// share and matches debtors to creditors greedily, largest first, to
/// produce a small reimbursement plan.
pub struct SettlementEngine;

impl SettlementEngine {
    /// Settle a roster against a filtered spending ledger.
    ///
    /// # Algorithm
    ///
    /// 1. Compute each participant's balance: spent − fair share.
    /// 2. Split into debtors (ascending, most negative first) and
    ///    creditors (descending, largest first); even participants drop out.
    /// 3. Two-pointer greedy match: the current debtor pays the current
    ///    creditor `min(credit remaining, debt remaining)`; a side whose
    ///    remainder falls within epsilon advances its pointer. Both sides
    ///    may advance in the same step when the payment zeroes both, which
    ///    is what keeps the plan small.
    /// 4. Residue below epsilon is treated as settled and never emitted.
    ///
    /// O(n log n) in the roster size; sorting dominates. Deterministic for
    /// identical input ordering since both sorts are stable.
    pub fn settle(participants: &[ParticipantId], ledger: &SpendingLedger) -> SettlementResult {
        let sheet = BalanceSheet::compute(participants, ledger);
        let mut creditors = sheet.creditors();
        let mut debtors = sheet.debtors();

        debug!(
            "settling {} participants: total {}, fair share {}, {} creditors / {} debtors",
            participants.len(),
            sheet.total_spent(),
            sheet.fair_share(),
            creditors.len(),
            debtors.len()
        );

        let mut transactions = Vec::new();
        let mut i = 0;
        let mut j = 0;
        while i < creditors.len() && j < debtors.len() {
            let pay = creditors[i].1.min(-debtors[j].1);

            if pay > EPSILON {
                transactions.push(Transaction {
                    debtor: debtors[j].0.clone(),
                    creditor: creditors[i].0.clone(),
                    amount: pay,
                });
            }

            creditors[i].1 -= pay;
            debtors[j].1 += pay;

            if creditors[i].1 <= EPSILON {
                i += 1;
            }
            if debtors[j].1 >= -EPSILON {
                j += 1;
            }
        }

        SettlementResult {
            transactions,
            sheet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::category::{CategoryAssignment, CategoryName};
    use crate::core::expense::ExpenseLog;
    use rust_decimal_macros::dec;

    fn roster(names: &[&str]) -> Vec<ParticipantId> {
        names.iter().map(|n| ParticipantId::new(*n)).collect()
    }

    fn ledger_from(entries: &[(&str, Decimal)]) -> SpendingLedger {
        let mut log = ExpenseLog::new();
        for (p, amt) in entries {
            log.log(ParticipantId::new(*p), CategoryName::new("General"), *amt);
        }
        let assignment = CategoryAssignment::full(log.participants(), log.categories());
        SpendingLedger::aggregate(&log, &assignment)
    }

    #[test]
    fn test_single_transaction() {
        let people = roster(&["Alice", "Bob", "Carol"]);
        let ledger = ledger_from(&[("Alice", dec!(100)), ("Bob", dec!(50))]);

        let result = SettlementEngine::settle(&people, &ledger);
        assert_eq!(result.fair_share(), dec!(50));
        assert_eq!(
            result.transactions(),
            &[Transaction {
                debtor: ParticipantId::new("Carol"),
                creditor: ParticipantId::new("Alice"),
                amount: dec!(50),
            }]
        );
        assert!(result.is_settled());
    }

    #[test]
    fn test_all_even_yields_no_transactions() {
        let people = roster(&["A", "B", "C", "D"]);
        let ledger = ledger_from(&[
            ("A", dec!(40)),
            ("B", dec!(40)),
            ("C", dec!(40)),
            ("D", dec!(40)),
        ]);

        let result = SettlementEngine::settle(&people, &ledger);
        assert!(result.transactions().is_empty());
        assert!(result.is_settled());
    }

    #[test]
    fn test_one_creditor_two_debtors_largest_first() {
        let people = roster(&["A", "B", "C"]);
        let ledger = ledger_from(&[("A", dec!(90)), ("B", dec!(30))]);

        let result = SettlementEngine::settle(&people, &ledger);
        // Fair share 40: A +50, B -10, C -40. C settles first.
        assert_eq!(
            result.transactions(),
            &[
                Transaction {
                    debtor: ParticipantId::new("C"),
                    creditor: ParticipantId::new("A"),
                    amount: dec!(40),
                },
                Transaction {
                    debtor: ParticipantId::new("B"),
                    creditor: ParticipantId::new("A"),
                    amount: dec!(10),
                },
            ]
        );
        assert!(result.is_settled());
    }

    #[test]
    fn test_exact_pair_advances_both_pointers() {
        let people = roster(&["A", "B", "C", "D"]);
        let ledger = ledger_from(&[("A", dec!(100)), ("B", dec!(100))]);

        // A +50, B +50, C -50, D -50: two exact pairs, two transactions.
        let result = SettlementEngine::settle(&people, &ledger);
        assert_eq!(result.transaction_count(), 2);
        for t in result.transactions() {
            assert_eq!(t.amount, dec!(50));
        }
        assert!(result.is_settled());
    }

    #[test]
    fn test_empty_roster() {
        let result = SettlementEngine::settle(&[], &SpendingLedger::new());
        assert!(result.transactions().is_empty());
        assert_eq!(result.total_spent(), Decimal::ZERO);
        assert!(result.is_settled());
    }

    #[test]
    fn test_uneven_split_residue_is_settled() {
        let people = roster(&["A", "B", "C"]);
        let ledger = ledger_from(&[("A", dec!(100))]);

        // Fair share is a repeating decimal; leftover residue must be
        // swallowed, not emitted as a transaction.
        let result = SettlementEngine::settle(&people, &ledger);
        assert_eq!(result.transaction_count(), 2);
        assert!(result.is_settled());
        for t in result.transactions() {
            assert!(t.amount > EPSILON);
        }
    }

    #[test]
    fn test_no_self_payment() {
        let people = roster(&["A", "B", "C", "D", "E"]);
        let ledger = ledger_from(&[
            ("A", dec!(10)),
            ("B", dec!(75)),
            ("C", dec!(120)),
            ("D", dec!(5)),
        ]);

        let result = SettlementEngine::settle(&people, &ledger);
        for t in result.transactions() {
            assert_ne!(t.debtor, t.creditor);
            assert!(t.amount > Decimal::ZERO);
        }
        assert!(result.is_settled());
    }

    #[test]
    fn test_deterministic() {
        let people = roster(&["A", "B", "C", "D"]);
        let ledger = ledger_from(&[("A", dec!(33)), ("B", dec!(91)), ("C", dec!(14))]);

        let first = SettlementEngine::settle(&people, &ledger);
        let second = SettlementEngine::settle(&people, &ledger);
        assert_eq!(first.transactions(), second.transactions());
    }

    #[test]
    fn test_zero_spender_is_never_a_creditor() {
        let people = roster(&["A", "B", "C"]);
        let ledger = ledger_from(&[("A", dec!(60)), ("B", dec!(30))]);

        let result = SettlementEngine::settle(&people, &ledger);
        for t in result.transactions() {
            assert_ne!(t.creditor.as_str(), "C");
        }
    }
}
