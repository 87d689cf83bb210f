use crate::core::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A free-form expense category label.
///
/// Categories scope expenses ("Food", "Travel", "Lodging") and drive the
/// inclusion filter: only expenses in a participant's assigned categories
/// count toward their settlement total.
///
/// # Examples
///
/// ```
/// use fairsplit_engine::core::category::CategoryName;
///
/// let food = CategoryName::new("Food");
/// let travel = CategoryName::new("Travel");
/// assert_ne!(food, travel);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CategoryName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Mapping from participant to the set of categories they are charged for.
///
/// The assignment governs inclusion filtering, not attribution: a
/// participant's expenses in a category outside their set are silently
/// dropped from settlement. The set need not be limited to categories the
/// participant actually spent in.
///
/// Participants with no entry contribute nothing to the filtered ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAssignment {
    assignments: HashMap<ParticipantId, BTreeSet<CategoryName>>,
}

impl CategoryAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a participant's assigned category set.
    pub fn assign(
        &mut self,
        participant: ParticipantId,
        categories: impl IntoIterator<Item = CategoryName>,
    ) {
        self.assignments
            .insert(participant, categories.into_iter().collect());
    }

    /// Add a single category to a participant's set.
    pub fn allow(&mut self, participant: ParticipantId, category: CategoryName) {
        self.assignments.entry(participant).or_default().insert(category);
    }

    /// Whether `category` counts toward `participant`'s spending total.
    pub fn allows(&self, participant: &ParticipantId, category: &CategoryName) -> bool {
        self.assignments
            .get(participant)
            .map(|set| set.contains(category))
            .unwrap_or(false)
    }

    /// The category set assigned to a participant, if any.
    pub fn categories_for(&self, participant: &ParticipantId) -> Option<&BTreeSet<CategoryName>> {
        self.assignments.get(participant)
    }

    /// All participants with an assignment entry (possibly empty sets).
    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.assignments.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Carry an assignment entry over to a renamed participant.
    pub fn rename_participant(&mut self, old: &ParticipantId, new: ParticipantId) {
        if let Some(set) = self.assignments.remove(old) {
            self.assignments.insert(new, set);
        }
    }

    /// Drop a participant's assignment entry entirely.
    pub fn remove_participant(&mut self, participant: &ParticipantId) {
        self.assignments.remove(participant);
    }

    /// Rename a category across every participant's set.
    pub fn rename_category(&mut self, old: &CategoryName, new: &CategoryName) {
        for set in self.assignments.values_mut() {
            if set.remove(old) {
                set.insert(new.clone());
            }
        }
    }

    /// Remove a category from every participant's set.
    pub fn remove_category(&mut self, category: &CategoryName) {
        for set in self.assignments.values_mut() {
            set.remove(category);
        }
    }

    /// Grant every listed participant every listed category.
    ///
    /// Convenience for the common "split everything evenly" setup and for
    /// scenario generation.
    pub fn full(
        participants: impl IntoIterator<Item = ParticipantId>,
        categories: impl IntoIterator<Item = CategoryName>,
    ) -> Self {
        let cats: BTreeSet<CategoryName> = categories.into_iter().collect();
        let mut assignment = Self::new();
        for p in participants {
            assignment.assignments.insert(p, cats.clone());
        }
        assignment
    }
}
