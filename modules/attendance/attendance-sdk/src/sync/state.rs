use std::collections::{BTreeMap, BTreeSet};

use time::Date;

/// Checkbox edits keyed by student id, `true` meaning present.
pub type Changes = BTreeMap<String, bool>;

/// Working and last-saved attendance for one date.
///
/// A student missing from the working map counts as not present. A student
/// missing from the saved map has no stored record yet, so any status given
/// for them still has to be written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceState {
    date: Option<Date>,
    attendance: BTreeMap<String, bool>,
    saved: BTreeMap<String, bool>,
}

impl AttendanceState {
    #[must_use]
    pub fn date(&self) -> Option<Date> {
        self.date
    }

    #[must_use]
    pub fn attendance(&self) -> &BTreeMap<String, bool> {
        &self.attendance
    }

    #[must_use]
    pub fn saved(&self) -> &BTreeMap<String, bool> {
        &self.saved
    }

    /// Forget everything and start over for `date`.
    pub fn reset(&mut self, date: Date) {
        self.date = Some(date);
        self.attendance.clear();
        self.saved.clear();
    }

    /// Record a value read from the store; it is both shown and saved.
    pub fn merge_loaded(&mut self, student_id: &str, is_present: bool) {
        self.attendance.insert(student_id.to_owned(), is_present);
        self.saved.insert(student_id.to_owned(), is_present);
    }

    pub fn set(&mut self, student_id: &str, is_present: bool) {
        self.attendance.insert(student_id.to_owned(), is_present);
    }

    pub fn apply(&mut self, changes: &Changes) {
        for (student_id, is_present) in changes {
            self.set(student_id, *is_present);
        }
    }

    /// Status the student would be saved with: explicit change, else the
    /// working value, else not present.
    #[must_use]
    pub fn effective(&self, changes: &Changes, student_id: &str) -> bool {
        changes
            .get(student_id)
            .or_else(|| self.attendance.get(student_id))
            .copied()
            .unwrap_or(false)
    }

    /// Students whose effective status differs from the saved one, including
    /// students with no saved record at all.
    #[must_use]
    pub fn deltas(&self, changes: &Changes) -> Changes {
        let students: BTreeSet<&String> = changes
            .keys()
            .chain(self.attendance.keys())
            .chain(self.saved.keys())
            .collect();

        students
            .into_iter()
            .filter_map(|student_id| {
                let effective = self.effective(changes, student_id);
                (self.saved.get(student_id) != Some(&effective))
                    .then(|| (student_id.clone(), effective))
            })
            .collect()
    }

    /// Tie a state that was never loaded to `date`.
    ///
    /// # Errors
    /// Returns the tracked date when the state already belongs to another day.
    pub fn claim_date(&mut self, date: Date) -> Result<(), Date> {
        match self.date {
            None => {
                self.date = Some(date);
                Ok(())
            }
            Some(current) if current == date => Ok(()),
            Some(current) => Err(current),
        }
    }

    /// Advance the saved view by values persisted for `date`.
    ///
    /// Returns `false` and leaves the state alone when it has since moved to
    /// another date.
    pub fn mark_saved(&mut self, date: Date, persisted: &Changes) -> bool {
        if self.date != Some(date) {
            return false;
        }
        for (student_id, is_present) in persisted {
            self.saved.insert(student_id.clone(), *is_present);
        }
        true
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        !self.deltas(&Changes::new()).is_empty()
    }
}
