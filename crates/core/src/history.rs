//! Undo history for measurement additions and deletions
//!
//! Strict LIFO with unbounded depth and no redo. Undoing a delete re-adds a
//! snapshot under a fresh identity; callers must not expect the original id.

use crate::measurement::{Measurement, MeasurementId};

/// One recorded user mutation of the store
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    /// A measurement was committed; only the id is kept
    Add { id: MeasurementId },
    /// A measurement was deleted; the full snapshot is kept for restoring
    Delete { measurement: Box<Measurement> },
}

/// What the host must do to the store to reverse an entry
#[derive(Debug, Clone, PartialEq)]
pub enum ReversalInstruction {
    /// Remove this id from the store
    Remove(MeasurementId),
    /// Re-add this snapshot; the store assigns a new identity
    Restore(Measurement),
}

#[derive(Debug, Clone, Default)]
pub struct ActionHistory {
    entries: Vec<HistoryEntry>,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn record_add(&mut self, id: MeasurementId) {
        self.record(HistoryEntry::Add { id });
    }

    pub fn record_delete(&mut self, measurement: Measurement) {
        self.record(HistoryEntry::Delete {
            measurement: Box::new(measurement),
        });
    }

    /// Pop the most recent entry and turn it into a reversal instruction
    ///
    /// Returns `None` when the history is empty; that is not an error.
    pub fn undo_last(&mut self) -> Option<ReversalInstruction> {
        let instruction = match self.entries.pop()? {
            HistoryEntry::Add { id } => ReversalInstruction::Remove(id),
            HistoryEntry::Delete { measurement } => {
                ReversalInstruction::Restore(measurement.without_identity())
            }
        };
        Some(instruction)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::measurement::{Geometry, MeasurementFields};
    use crate::store::MeasurementStore;

    fn note() -> Measurement {
        Measurement::new(0, Geometry::Point(Point::new(1.0, 2.0)), "m", MeasurementFields::Note)
            .unwrap()
            .with_notes("tie-in")
    }

    #[test]
    fn test_empty_undo() {
        let mut history = ActionHistory::new();
        assert_eq!(history.undo_last(), None);
        assert!(history.is_empty());
    }

    #[test]
    fn test_undo_add() {
        let mut history = ActionHistory::new();
        let id = MeasurementId::new_v4();
        history.record_add(id);
        assert_eq!(history.undo_last(), Some(ReversalInstruction::Remove(id)));
        assert_eq!(history.undo_last(), None);
    }

    #[test]
    fn test_undo_delete_strips_identity() {
        let mut store = MeasurementStore::new();
        let id = store.add(note());
        let snapshot = store.remove(id).unwrap();

        let mut history = ActionHistory::new();
        history.record_delete(snapshot.clone());

        let Some(ReversalInstruction::Restore(restored)) = history.undo_last() else {
            panic!("expected restore instruction");
        };
        assert!(!restored.has_identity());
        assert_eq!(restored.notes(), snapshot.notes());
        assert_eq!(restored.geometry(), snapshot.geometry());
    }

    #[test]
    fn test_lifo_order() {
        let mut history = ActionHistory::new();
        let first = MeasurementId::new_v4();
        let second = MeasurementId::new_v4();
        history.record_add(first);
        history.record_add(second);
        assert_eq!(history.len(), 2);
        assert_eq!(history.undo_last(), Some(ReversalInstruction::Remove(second)));
        assert_eq!(history.undo_last(), Some(ReversalInstruction::Remove(first)));
        assert!(!history.can_undo());
    }
}
