use crate::core::category::{CategoryAssignment, CategoryName};
use crate::core::expense::ExpenseLog;
use crate::core::ledger::SpendingLedger;
use crate::core::participant::ParticipantId;
use crate::session::auth::{AccessLevel, OwnerSecret, SessionGrant};
use crate::settlement::engine::{SettlementEngine, SettlementResult, Transaction};
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use uuid::Uuid;

/// Errors from session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("category name cannot be empty")]
    EmptyCategory,
    #[error("session password cannot be empty")]
    EmptyPassword,
    #[error("participant '{0}' already exists")]
    DuplicateParticipant(ParticipantId),
    #[error("participant '{0}' not found")]
    UnknownParticipant(ParticipantId),
    #[error("category '{0}' already exists")]
    DuplicateCategory(CategoryName),
    #[error("category '{0}' not found")]
    UnknownCategory(CategoryName),
    #[error("expense {0} not found")]
    UnknownExpense(Uuid),
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("{0} access required")]
    Forbidden(AccessLevel),
    #[error("grant does not belong to this session")]
    WrongSession,
    #[error("this session has no password set")]
    PasswordNotSet,
    #[error("incorrect password")]
    BadPassword,
    #[error("incorrect owner secret")]
    BadSecret,
}

/// A named group ledger.
///
/// Owns the roster, the category set, the per-participant category
/// assignment, the expense log, and the cached settlement plan. All state
/// is normalized owned data; the session serializes with serde for
/// whatever store the embedder chooses.
///
/// Mutating operations take a [`SessionGrant`] minted by one of the
/// `grant_*` methods and reject insufficient access with
/// [`SessionError::Forbidden`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    name: String,
    owner_secret: OwnerSecret,
    password: Option<String>,
    roster: Vec<ParticipantId>,
    categories: BTreeSet<CategoryName>,
    assignment: CategoryAssignment,
    expenses: ExpenseLog,
    /// Cached plan from the last recomputation. Replaced wholesale.
    transactions: Vec<Transaction>,
}

impl Session {
    /// Create a session and mint its owner secret.
    ///
    /// Both the display name and the editor password are required, as in
    /// the session creation form.
    pub fn create(
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<(Self, OwnerSecret), SessionError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        let password = password.into().trim().to_string();
        if password.is_empty() {
            return Err(SessionError::EmptyPassword);
        }

        let secret = OwnerSecret::generate();
        let session = Self {
            id: Uuid::new_v4(),
            name,
            owner_secret: secret.clone(),
            password: Some(password),
            roster: Vec::new(),
            categories: BTreeSet::new(),
            assignment: CategoryAssignment::new(),
            expenses: ExpenseLog::new(),
            transactions: Vec::new(),
        };
        info!("created session {} ('{}')", session.id, session.name);
        Ok((session, secret))
    }

    // --- Grants ---

    /// Anyone with the link can view.
    pub fn grant_viewer(&self) -> SessionGrant {
        SessionGrant::new(self.id, AccessLevel::View)
    }

    /// Exchange the session password for an edit grant.
    pub fn grant_editor(&self, password: &str) -> Result<SessionGrant, SessionError> {
        match &self.password {
            None => Err(SessionError::PasswordNotSet),
            Some(expected) if expected == password.trim() => {
                Ok(SessionGrant::new(self.id, AccessLevel::Edit))
            }
            Some(_) => Err(SessionError::BadPassword),
        }
    }

    /// Exchange the owner secret for an owner grant.
    pub fn grant_owner(&self, secret: &OwnerSecret) -> Result<SessionGrant, SessionError> {
        if &self.owner_secret == secret {
            Ok(SessionGrant::new(self.id, AccessLevel::Owner))
        } else {
            Err(SessionError::BadSecret)
        }
    }

    fn check(&self, grant: &SessionGrant, required: AccessLevel) -> Result<(), SessionError> {
        if grant.session_id() != self.id {
            return Err(SessionError::WrongSession);
        }
        if grant.permits(required) {
            Ok(())
        } else {
            Err(SessionError::Forbidden(required))
        }
    }

    // --- Roster ---

    /// Add a participant. Names are trimmed and get a leading capital.
    pub fn add_participant(
        &mut self,
        grant: &SessionGrant,
        name: &str,
    ) -> Result<ParticipantId, SessionError> {
        self.check(grant, AccessLevel::Edit)?;
        let id = ParticipantId::new(normalize_person_name(name)?);
        if self.roster.contains(&id) {
            return Err(SessionError::DuplicateParticipant(id));
        }
        self.roster.push(id.clone());
        // Every roster member carries an assignment entry, empty to start.
        self.assignment.assign(id.clone(), []);
        Ok(id)
    }

    /// Rename a participant, cascading to assignment and expenses.
    pub fn rename_participant(
        &mut self,
        grant: &SessionGrant,
        old: &ParticipantId,
        new_name: &str,
    ) -> Result<ParticipantId, SessionError> {
        self.check(grant, AccessLevel::Owner)?;
        let new = ParticipantId::new(normalize_person_name(new_name)?);
        if !self.roster.contains(old) {
            return Err(SessionError::UnknownParticipant(old.clone()));
        }
        if new != *old && self.roster.contains(&new) {
            return Err(SessionError::DuplicateParticipant(new));
        }
        for slot in self.roster.iter_mut().filter(|p| *p == old) {
            *slot = new.clone();
        }
        self.assignment.rename_participant(old, new.clone());
        self.expenses.rename_participant(old, &new);
        Ok(new)
    }

    /// Remove a participant along with their expenses and assignment entry.
    pub fn remove_participant(
        &mut self,
        grant: &SessionGrant,
        participant: &ParticipantId,
    ) -> Result<(), SessionError> {
        self.check(grant, AccessLevel::Owner)?;
        if !self.roster.contains(participant) {
            return Err(SessionError::UnknownParticipant(participant.clone()));
        }
        self.roster.retain(|p| p != participant);
        self.assignment.remove_participant(participant);
        self.expenses.remove_participant(participant);
        Ok(())
    }

    // --- Categories ---

    /// Add a category. Labels normalize to First-upper, rest-lower, and
    /// duplicates are checked case-insensitively.
    pub fn add_category(
        &mut self,
        grant: &SessionGrant,
        name: &str,
    ) -> Result<CategoryName, SessionError> {
        self.check(grant, AccessLevel::Owner)?;
        let category = CategoryName::new(normalize_category_name(name)?);
        if let Some(existing) = self.find_category_ci(category.as_str()) {
            return Err(SessionError::DuplicateCategory(existing));
        }
        self.categories.insert(category.clone());
        Ok(category)
    }

    /// Rename a category, cascading to expenses and assignments.
    pub fn rename_category(
        &mut self,
        grant: &SessionGrant,
        old: &CategoryName,
        new_name: &str,
    ) -> Result<CategoryName, SessionError> {
        self.check(grant, AccessLevel::Owner)?;
        if !self.categories.contains(old) {
            return Err(SessionError::UnknownCategory(old.clone()));
        }
        let new = CategoryName::new(normalize_category_name(new_name)?);
        if new != *old {
            if let Some(existing) = self.find_category_ci(new.as_str()) {
                return Err(SessionError::DuplicateCategory(existing));
            }
        }
        self.categories.remove(old);
        self.categories.insert(new.clone());
        self.assignment.rename_category(old, &new);
        self.expenses.rename_category(old, &new);
        Ok(new)
    }

    /// Remove a category along with its expenses and assignment references.
    pub fn remove_category(
        &mut self,
        grant: &SessionGrant,
        category: &CategoryName,
    ) -> Result<(), SessionError> {
        self.check(grant, AccessLevel::Owner)?;
        if !self.categories.remove(category) {
            return Err(SessionError::UnknownCategory(category.clone()));
        }
        self.assignment.remove_category(category);
        self.expenses.remove_category(category);
        Ok(())
    }

    // --- Expenses ---

    /// Log an expense. The category is normalized and created on the fly
    /// if unseen; a second expense for the same (participant, category)
    /// pair folds into the existing record.
    pub fn record_expense(
        &mut self,
        grant: &SessionGrant,
        participant: &ParticipantId,
        category: &str,
        amount: Decimal,
    ) -> Result<Uuid, SessionError> {
        self.check(grant, AccessLevel::Edit)?;
        if !self.roster.contains(participant) {
            return Err(SessionError::UnknownParticipant(participant.clone()));
        }
        if amount <= Decimal::ZERO {
            return Err(SessionError::NonPositiveAmount(amount));
        }
        let category = self.intern_category(category)?;
        Ok(self.expenses.log(participant.clone(), category, amount))
    }

    /// Overwrite an expense's amount.
    pub fn set_expense_amount(
        &mut self,
        grant: &SessionGrant,
        id: Uuid,
        amount: Decimal,
    ) -> Result<(), SessionError> {
        self.check(grant, AccessLevel::Owner)?;
        if amount <= Decimal::ZERO {
            return Err(SessionError::NonPositiveAmount(amount));
        }
        if self.expenses.set_amount(id, amount) {
            Ok(())
        } else {
            Err(SessionError::UnknownExpense(id))
        }
    }

    /// Move an expense to another category, creating it if unseen.
    pub fn set_expense_category(
        &mut self,
        grant: &SessionGrant,
        id: Uuid,
        category: &str,
    ) -> Result<(), SessionError> {
        self.check(grant, AccessLevel::Owner)?;
        let category = self.intern_category(category)?;
        if self.expenses.set_category(id, category) {
            Ok(())
        } else {
            Err(SessionError::UnknownExpense(id))
        }
    }

    /// Delete an expense.
    pub fn remove_expense(&mut self, grant: &SessionGrant, id: Uuid) -> Result<(), SessionError> {
        self.check(grant, AccessLevel::Owner)?;
        if self.expenses.remove(id) {
            Ok(())
        } else {
            Err(SessionError::UnknownExpense(id))
        }
    }

    // --- Assignment ---

    /// Replace the participant→categories mapping wholesale.
    ///
    /// Roster members missing from `assignments` end up with an empty set
    /// (charged for nothing). Unknown participants or categories are
    /// rejected before anything is applied.
    pub fn apply_assignment(
        &mut self,
        grant: &SessionGrant,
        assignments: &HashMap<ParticipantId, Vec<CategoryName>>,
    ) -> Result<(), SessionError> {
        self.check(grant, AccessLevel::Edit)?;
        for (participant, categories) in assignments {
            if !self.roster.contains(participant) {
                return Err(SessionError::UnknownParticipant(participant.clone()));
            }
            for category in categories {
                if !self.categories.contains(category) {
                    return Err(SessionError::UnknownCategory(category.clone()));
                }
            }
        }

        let mut replacement = CategoryAssignment::new();
        for participant in &self.roster {
            let categories = assignments
                .get(participant)
                .cloned()
                .unwrap_or_default();
            replacement.assign(participant.clone(), categories);
        }
        self.assignment = replacement;
        Ok(())
    }

    // --- Settlement ---

    /// Aggregate, settle, and replace the cached plan wholesale.
    pub fn recompute_settlement(
        &mut self,
        grant: &SessionGrant,
    ) -> Result<SettlementResult, SessionError> {
        self.check(grant, AccessLevel::Edit)?;
        let ledger = SpendingLedger::aggregate(&self.expenses, &self.assignment);
        let result = SettlementEngine::settle(&self.roster, &ledger);
        self.transactions = result.transactions().to_vec();
        info!(
            "session {}: recomputed settlement, {} transactions",
            self.id,
            self.transactions.len()
        );
        Ok(result)
    }

    // --- Password ---

    /// Set or clear the editor password. Clearing revokes future edit
    /// grants; already-minted grants are unaffected.
    pub fn set_password(
        &mut self,
        grant: &SessionGrant,
        password: Option<&str>,
    ) -> Result<(), SessionError> {
        self.check(grant, AccessLevel::Owner)?;
        self.password = password
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        Ok(())
    }

    // --- Read accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    pub fn roster(&self) -> &[ParticipantId] {
        &self.roster
    }

    /// All categories, sorted by name.
    pub fn categories(&self) -> &BTreeSet<CategoryName> {
        &self.categories
    }

    pub fn assignment(&self) -> &CategoryAssignment {
        &self.assignment
    }

    pub fn expenses(&self) -> &ExpenseLog {
        &self.expenses
    }

    /// The cached plan from the last recomputation.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Unfiltered per-participant, per-category totals for display.
    ///
    /// Unlike the settlement ledger this ignores assignments; it is the
    /// audit view of everything that was logged.
    pub fn spending_breakdown(&self) -> HashMap<ParticipantId, HashMap<CategoryName, Decimal>> {
        let mut breakdown: HashMap<ParticipantId, HashMap<CategoryName, Decimal>> = HashMap::new();
        for record in self.expenses.records() {
            *breakdown
                .entry(record.participant().clone())
                .or_default()
                .entry(record.category().clone())
                .or_insert(Decimal::ZERO) += record.amount();
        }
        breakdown
    }

    /// Unfiltered totals per category.
    pub fn category_totals(&self) -> HashMap<CategoryName, Decimal> {
        let mut totals: HashMap<CategoryName, Decimal> = HashMap::new();
        for record in self.expenses.records() {
            *totals
                .entry(record.category().clone())
                .or_insert(Decimal::ZERO) += record.amount();
        }
        totals
    }

    // --- Internal helpers ---

    /// Case-insensitive category lookup, returning the stored spelling.
    fn find_category_ci(&self, name: &str) -> Option<CategoryName> {
        self.categories
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Normalize a raw label and resolve it to the stored category,
    /// creating it when unseen.
    fn intern_category(&mut self, raw: &str) -> Result<CategoryName, SessionError> {
        let normalized = normalize_category_name(raw)?;
        if let Some(existing) = self.find_category_ci(&normalized) {
            return Ok(existing);
        }
        let category = CategoryName::new(normalized);
        self.categories.insert(category.clone());
        Ok(category)
    }
}

/// Trim and give the name a leading capital, leaving the rest untouched.
fn normalize_person_name(raw: &str) -> Result<String, SessionError> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        None => Err(SessionError::EmptyName),
        Some(first) => Ok(first.to_uppercase().chain(chars).collect()),
    }
}

/// Trim and normalize a category label to First-upper, rest-lower.
fn normalize_category_name(raw: &str) -> Result<String, SessionError> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        None => Err(SessionError::EmptyCategory),
        Some(first) => Ok(first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn owned_session() -> (Session, SessionGrant) {
        let (session, secret) = Session::create("Trip", "hunter2").unwrap();
        let grant = session.grant_owner(&secret).unwrap();
        (session, grant)
    }

    #[test]
    fn test_create_requires_name_and_password() {
        assert_eq!(
            Session::create("  ", "pw").unwrap_err(),
            SessionError::EmptyName
        );
        assert_eq!(
            Session::create("Trip", "  ").unwrap_err(),
            SessionError::EmptyPassword
        );
    }

    #[test]
    fn test_grants() {
        let (session, secret) = Session::create("Trip", "hunter2").unwrap();

        assert_eq!(session.grant_viewer().level(), AccessLevel::View);
        assert_eq!(
            session.grant_editor("hunter2").unwrap().level(),
            AccessLevel::Edit
        );
        assert_eq!(
            session.grant_editor("wrong").unwrap_err(),
            SessionError::BadPassword
        );
        assert_eq!(
            session.grant_owner(&secret).unwrap().level(),
            AccessLevel::Owner
        );
        assert_eq!(
            session.grant_owner(&OwnerSecret::generate()).unwrap_err(),
            SessionError::BadSecret
        );
    }

    #[test]
    fn test_viewer_cannot_mutate() {
        let (mut session, _) = owned_session();
        let viewer = session.grant_viewer();
        assert_eq!(
            session.add_participant(&viewer, "Alice").unwrap_err(),
            SessionError::Forbidden(AccessLevel::Edit)
        );
    }

    #[test]
    fn test_editor_cannot_restructure() {
        let (mut session, owner) = owned_session();
        let editor = session.grant_editor("hunter2").unwrap();

        let alice = session.add_participant(&editor, "Alice").unwrap();
        assert_eq!(
            session
                .rename_participant(&editor, &alice, "Alicia")
                .unwrap_err(),
            SessionError::Forbidden(AccessLevel::Owner)
        );
        session.rename_participant(&owner, &alice, "Alicia").unwrap();
    }

    #[test]
    fn test_grant_is_session_bound() {
        let (mut session, _) = owned_session();
        let (other, other_secret) = Session::create("Other", "pw").unwrap();
        let foreign = other.grant_owner(&other_secret).unwrap();
        assert_eq!(
            session.add_participant(&foreign, "Alice").unwrap_err(),
            SessionError::WrongSession
        );
    }

    #[test]
    fn test_participant_names_are_capitalized() {
        let (mut session, grant) = owned_session();
        let id = session.add_participant(&grant, "  alice ").unwrap();
        assert_eq!(id.as_str(), "Alice");
        assert_eq!(
            session.add_participant(&grant, "alice").unwrap_err(),
            SessionError::DuplicateParticipant(ParticipantId::new("Alice"))
        );
    }

    #[test]
    fn test_category_normalization_and_ci_duplicates() {
        let (mut session, grant) = owned_session();
        let cat = session.add_category(&grant, "fOOd").unwrap();
        assert_eq!(cat.as_str(), "Food");
        assert_eq!(
            session.add_category(&grant, "FOOD").unwrap_err(),
            SessionError::DuplicateCategory(CategoryName::new("Food"))
        );
    }

    #[test]
    fn test_record_expense_merges_and_creates_category() {
        let (mut session, grant) = owned_session();
        let alice = session.add_participant(&grant, "Alice").unwrap();

        let first = session
            .record_expense(&grant, &alice, "food", dec!(30))
            .unwrap();
        let second = session
            .record_expense(&grant, &alice, "Food", dec!(12))
            .unwrap();

        assert_eq!(first, second);
        assert!(session.categories().contains(&CategoryName::new("Food")));
        assert_eq!(session.expenses().gross_total(), dec!(42));
    }

    #[test]
    fn test_record_expense_rejects_bad_input() {
        let (mut session, grant) = owned_session();
        let ghost = ParticipantId::new("Ghost");
        assert_eq!(
            session
                .record_expense(&grant, &ghost, "Food", dec!(10))
                .unwrap_err(),
            SessionError::UnknownParticipant(ghost)
        );

        let alice = session.add_participant(&grant, "Alice").unwrap();
        assert_eq!(
            session
                .record_expense(&grant, &alice, "Food", dec!(0))
                .unwrap_err(),
            SessionError::NonPositiveAmount(Decimal::ZERO)
        );
    }

    #[test]
    fn test_category_rename_cascades() {
        let (mut session, grant) = owned_session();
        let alice = session.add_participant(&grant, "Alice").unwrap();
        session
            .record_expense(&grant, &alice, "Food", dec!(30))
            .unwrap();
        session
            .apply_assignment(
                &grant,
                &HashMap::from([(alice.clone(), vec![CategoryName::new("Food")])]),
            )
            .unwrap();

        session
            .rename_category(&grant, &CategoryName::new("Food"), "Groceries")
            .unwrap();

        let groceries = CategoryName::new("Groceries");
        assert!(session.categories().contains(&groceries));
        assert!(session.assignment().allows(&alice, &groceries));
        assert_eq!(
            session.expenses().records()[0].category().as_str(),
            "Groceries"
        );
    }

    #[test]
    fn test_category_removal_deletes_expenses() {
        let (mut session, grant) = owned_session();
        let alice = session.add_participant(&grant, "Alice").unwrap();
        session
            .record_expense(&grant, &alice, "Food", dec!(30))
            .unwrap();
        session
            .record_expense(&grant, &alice, "Travel", dec!(80))
            .unwrap();

        session
            .remove_category(&grant, &CategoryName::new("Food"))
            .unwrap();
        assert_eq!(session.expenses().len(), 1);
        assert_eq!(session.expenses().gross_total(), dec!(80));
    }

    #[test]
    fn test_remove_participant_cascades() {
        let (mut session, grant) = owned_session();
        let alice = session.add_participant(&grant, "Alice").unwrap();
        let bob = session.add_participant(&grant, "Bob").unwrap();
        session
            .record_expense(&grant, &bob, "Food", dec!(20))
            .unwrap();

        session.remove_participant(&grant, &bob).unwrap();
        assert_eq!(session.roster(), &[alice]);
        assert!(session.expenses().is_empty());
    }

    #[test]
    fn test_apply_assignment_rejects_unknowns() {
        let (mut session, grant) = owned_session();
        let alice = session.add_participant(&grant, "Alice").unwrap();
        session.add_category(&grant, "Food").unwrap();

        let bad = HashMap::from([(
            ParticipantId::new("Ghost"),
            vec![CategoryName::new("Food")],
        )]);
        assert!(matches!(
            session.apply_assignment(&grant, &bad).unwrap_err(),
            SessionError::UnknownParticipant(_)
        ));

        let bad = HashMap::from([(alice.clone(), vec![CategoryName::new("Nope")])]);
        assert!(matches!(
            session.apply_assignment(&grant, &bad).unwrap_err(),
            SessionError::UnknownCategory(_)
        ));
    }

    #[test]
    fn test_recompute_settlement_replaces_cache() {
        let (mut session, grant) = owned_session();
        let alice = session.add_participant(&grant, "Alice").unwrap();
        let bob = session.add_participant(&grant, "Bob").unwrap();
        session
            .record_expense(&grant, &alice, "Food", dec!(100))
            .unwrap();
        session
            .apply_assignment(
                &grant,
                &HashMap::from([(alice.clone(), vec![CategoryName::new("Food")])]),
            )
            .unwrap();

        let result = session.recompute_settlement(&grant).unwrap();
        assert_eq!(result.transaction_count(), 1);
        assert_eq!(session.transactions()[0].debtor, bob);
        assert_eq!(session.transactions()[0].amount, dec!(50));

        // Dropping the assignment empties the plan on the next recompute.
        session
            .apply_assignment(&grant, &HashMap::new())
            .unwrap();
        let result = session.recompute_settlement(&grant).unwrap();
        assert!(result.transactions().is_empty());
        assert!(session.transactions().is_empty());
    }

    #[test]
    fn test_clearing_password_revokes_editor_grants() {
        let (mut session, grant) = owned_session();
        session.set_password(&grant, None).unwrap();
        assert!(!session.has_password());
        assert_eq!(
            session.grant_editor("hunter2").unwrap_err(),
            SessionError::PasswordNotSet
        );
    }
}
