use crate::core::category::CategoryName;
use crate::core::participant::ParticipantId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single logged expense: `participant` spent `amount` under `category`.
///
/// This is the atomic unit of the ledger. Records are immutable once handed
/// to the aggregation core; the session layer edits them only through
/// [`ExpenseLog`] before aggregation.
///
/// # Examples
///
/// ```
/// use fairsplit_engine::core::expense::ExpenseRecord;
/// use fairsplit_engine::core::participant::ParticipantId;
/// use fairsplit_engine::core::category::CategoryName;
/// use rust_decimal_macros::dec;
///
/// let record = ExpenseRecord::new(
///     ParticipantId::new("Alice"),
///     CategoryName::new("Food"),
///     dec!(42.50),
/// );
/// assert_eq!(record.amount(), dec!(42.50));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Unique identifier for this record.
    id: Uuid,
    /// Who spent the money.
    participant: ParticipantId,
    /// The category the expense was logged under.
    category: CategoryName,
    /// The amount spent. Must be positive.
    amount: Decimal,
    /// When this record was created.
    recorded_at: DateTime<Utc>,
    /// Optional free-form note.
    note: Option<String>,
}

impl ExpenseRecord {
    /// Create a new expense record.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is not positive.
    pub fn new(participant: ParticipantId, category: CategoryName, amount: Decimal) -> Self {
        assert!(
            amount > Decimal::ZERO,
            "Expense amount must be positive, got {}",
            amount
        );
        Self {
            id: Uuid::new_v4(),
            participant,
            category,
            amount,
            recorded_at: Utc::now(),
            note: None,
        }
    }

    /// Create a record with a specific ID (useful for testing / determinism).
    pub fn with_id(
        id: Uuid,
        participant: ParticipantId,
        category: CategoryName,
        amount: Decimal,
    ) -> Self {
        assert!(amount > Decimal::ZERO);
        Self {
            id,
            participant,
            category,
            amount,
            recorded_at: Utc::now(),
            note: None,
        }
    }

    /// Attach a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    pub fn category(&self) -> &CategoryName {
        &self.category
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// An ordered collection of expense records for one session.
///
/// Supports the merge-on-insert behavior of the expense form: logging a
/// second amount for the same (participant, category) pair folds into the
/// existing record instead of creating a new one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseLog {
    records: Vec<ExpenseRecord>,
}

impl ExpenseLog {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record as-is, without merging.
    pub fn push(&mut self, record: ExpenseRecord) {
        self.records.push(record);
    }

    /// Log an amount, merging into an existing (participant, category)
    /// record when one exists. Returns the id of the affected record.
    pub fn log(
        &mut self,
        participant: ParticipantId,
        category: CategoryName,
        amount: Decimal,
    ) -> Uuid {
        if let Some(existing) = self
            .records
            .iter_mut()
            .find(|r| r.participant == participant && r.category == category)
        {
            existing.amount += amount;
            return existing.id;
        }
        let record = ExpenseRecord::new(participant, category, amount);
        let id = record.id;
        self.records.push(record);
        id
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn get(&self, id: Uuid) -> Option<&ExpenseRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total value of all records, unfiltered.
    pub fn gross_total(&self) -> Decimal {
        self.records.iter().map(|r| r.amount()).sum()
    }

    /// All unique participants that logged at least one record.
    pub fn participants(&self) -> Vec<ParticipantId> {
        let mut participants: Vec<ParticipantId> = self
            .records
            .iter()
            .map(|r| r.participant().clone())
            .collect();
        participants.sort();
        participants.dedup();
        participants
    }

    /// All unique categories referenced in this log.
    pub fn categories(&self) -> Vec<CategoryName> {
        let mut categories: Vec<CategoryName> = self
            .records
            .iter()
            .map(|r| r.category().clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Overwrite the amount of a record. Returns false if the id is unknown.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is not positive.
    pub fn set_amount(&mut self, id: Uuid, amount: Decimal) -> bool {
        assert!(amount > Decimal::ZERO);
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.amount = amount;
                true
            }
            None => false,
        }
    }

    /// Move a record to a different category. Returns false if the id is unknown.
    pub fn set_category(&mut self, id: Uuid, category: CategoryName) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.category = category;
                true
            }
            None => false,
        }
    }

    /// Remove a record. Returns false if the id is unknown.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    /// Re-attribute every record of `old` to `new`.
    pub fn rename_participant(&mut self, old: &ParticipantId, new: &ParticipantId) {
        for record in self.records.iter_mut().filter(|r| &r.participant == old) {
            record.participant = new.clone();
        }
    }

    /// Drop every record logged by `participant`.
    pub fn remove_participant(&mut self, participant: &ParticipantId) {
        self.records.retain(|r| &r.participant != participant);
    }

    /// Re-label every record in `old` to `new`.
    pub fn rename_category(&mut self, old: &CategoryName, new: &CategoryName) {
        for record in self.records.iter_mut().filter(|r| &r.category == old) {
            record.category = new.clone();
        }
    }

    /// Drop every record logged under `category`.
    pub fn remove_category(&mut self, category: &CategoryName) {
        self.records.retain(|r| &r.category != category);
    }
}

impl FromIterator<ExpenseRecord> for ExpenseLog {
    fn from_iter<T: IntoIterator<Item = ExpenseRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_record() -> ExpenseRecord {
        ExpenseRecord::new(
            ParticipantId::new("Alice"),
            CategoryName::new("Food"),
            dec!(30),
        )
    }

    #[test]
    fn test_record_creation() {
        let record = sample_record();
        assert_eq!(record.participant().as_str(), "Alice");
        assert_eq!(record.category().as_str(), "Food");
        assert_eq!(record.amount(), dec!(30));
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_record_zero_amount() {
        ExpenseRecord::new(
            ParticipantId::new("Alice"),
            CategoryName::new("Food"),
            Decimal::ZERO,
        );
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_record_negative_amount() {
        ExpenseRecord::new(
            ParticipantId::new("Alice"),
            CategoryName::new("Food"),
            dec!(-5),
        );
    }

    #[test]
    fn test_log_merges_same_pair() {
        let mut log = ExpenseLog::new();
        let first = log.log(
            ParticipantId::new("Alice"),
            CategoryName::new("Food"),
            dec!(30),
        );
        let second = log.log(
            ParticipantId::new("Alice"),
            CategoryName::new("Food"),
            dec!(12.50),
        );

        assert_eq!(first, second);
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].amount(), dec!(42.50));
    }

    #[test]
    fn test_log_keeps_distinct_pairs() {
        let mut log = ExpenseLog::new();
        log.log(
            ParticipantId::new("Alice"),
            CategoryName::new("Food"),
            dec!(30),
        );
        log.log(
            ParticipantId::new("Alice"),
            CategoryName::new("Travel"),
            dec!(80),
        );
        log.log(
            ParticipantId::new("Bob"),
            CategoryName::new("Food"),
            dec!(15),
        );

        assert_eq!(log.len(), 3);
        assert_eq!(log.gross_total(), dec!(125));
        assert_eq!(log.participants().len(), 2);
        assert_eq!(log.categories().len(), 2);
    }

    #[test]
    fn test_edit_and_remove_by_id() {
        let mut log = ExpenseLog::new();
        let id = log.log(
            ParticipantId::new("Bob"),
            CategoryName::new("Food"),
            dec!(20),
        );

        assert!(log.set_amount(id, dec!(25)));
        assert_eq!(log.get(id).unwrap().amount(), dec!(25));

        assert!(log.set_category(id, CategoryName::new("Groceries")));
        assert_eq!(log.get(id).unwrap().category().as_str(), "Groceries");

        assert!(log.remove(id));
        assert!(log.is_empty());
        assert!(!log.remove(id));
    }

    #[test]
    fn test_participant_cascades() {
        let mut log = ExpenseLog::new();
        log.log(
            ParticipantId::new("Bob"),
            CategoryName::new("Food"),
            dec!(20),
        );
        log.log(
            ParticipantId::new("Bob"),
            CategoryName::new("Travel"),
            dec!(50),
        );

        log.rename_participant(&ParticipantId::new("Bob"), &ParticipantId::new("Robert"));
        assert!(log
            .records()
            .iter()
            .all(|r| r.participant().as_str() == "Robert"));

        log.remove_participant(&ParticipantId::new("Robert"));
        assert!(log.is_empty());
    }
}
