//! Ordered collection of committed measurements
//!
//! The store is the sole owner of measurement identity. Insertion order is
//! preserved and drives the per-type sequence numbers used in labels.

use crate::error::{TakeoffError, TakeoffResult};
use crate::geometry::Point;
use crate::measurement::{Measurement, MeasurementId, MeasurementPatch};
use crate::tool::ToolType;

#[derive(Debug, Clone, Default)]
pub struct MeasurementStore {
    measurements: Vec<Measurement>,
}

impl MeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a measurement, assigning a fresh identity when it has none
    ///
    /// An identity that is already present in the store is also replaced.
    pub fn add(&mut self, mut measurement: Measurement) -> MeasurementId {
        if !measurement.has_identity() || self.contains(measurement.id()) {
            let mut id = MeasurementId::new_v4();
            while self.contains(id) {
                id = MeasurementId::new_v4();
            }
            measurement.assign_id(id);
        }
        let id = measurement.id();
        tracing::debug!(%id, tool = %measurement.tool_type(), "measurement added");
        self.measurements.push(measurement);
        id
    }

    /// Remove a measurement, returning it
    pub fn remove(&mut self, id: MeasurementId) -> TakeoffResult<Measurement> {
        let index = self.index_of(id).ok_or(TakeoffError::NotFound(id))?;
        tracing::debug!(%id, "measurement removed");
        Ok(self.measurements.remove(index))
    }

    /// Apply an edit patch
    pub fn update(
        &mut self,
        id: MeasurementId,
        patch: MeasurementPatch,
    ) -> TakeoffResult<&Measurement> {
        let index = self.index_of(id).ok_or(TakeoffError::NotFound(id))?;
        let measurement = &mut self.measurements[index];
        measurement.apply(patch);
        Ok(measurement)
    }

    /// Drop every measurement; all outstanding identities become unknown
    pub fn clear(&mut self) {
        tracing::debug!(count = self.measurements.len(), "store cleared");
        self.measurements.clear();
    }

    /// Measurements in insertion order
    pub fn list(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn get(&self, id: MeasurementId) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.id() == id)
    }

    pub fn contains(&self, id: MeasurementId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Measurements on a page, in insertion order
    pub fn for_page(&self, page_index: u16) -> impl Iterator<Item = &Measurement> {
        self.measurements
            .iter()
            .filter(move |m| m.page_index() == page_index)
    }

    /// Measurements of one type, in insertion order
    pub fn of_type(&self, tool: ToolType) -> impl Iterator<Item = &Measurement> {
        self.measurements
            .iter()
            .filter(move |m| m.tool_type() == tool)
    }

    /// 1-based position among measurements of the same type
    pub fn sequence_number(&self, id: MeasurementId) -> Option<usize> {
        let tool = self.get(id)?.tool_type();
        self.of_type(tool)
            .position(|m| m.id() == id)
            .map(|index| index + 1)
    }

    /// Display label such as "Trench 2"
    pub fn label(&self, id: MeasurementId) -> Option<String> {
        let measurement = self.get(id)?;
        let number = self.sequence_number(id)?;
        Some(format!("{} {}", measurement.tool_type().display_name(), number))
    }

    /// Find a measurement by its label
    pub fn find_by_label(&self, label: &str) -> Option<&Measurement> {
        self.measurements
            .iter()
            .find(|m| self.label(m.id()).as_deref() == Some(label))
    }

    /// Topmost (most recently added) measurement under a pixel point
    pub fn hit_test(&self, page_index: u16, point: &Point, tolerance: f64) -> Option<MeasurementId> {
        self.measurements
            .iter()
            .rev()
            .filter(|m| m.page_index() == page_index)
            .find(|m| m.hit_test(point, tolerance))
            .map(|m| m.id())
    }

    fn index_of(&self, id: MeasurementId) -> Option<usize> {
        self.measurements.iter().position(|m| m.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::{ConduitRunFields, Geometry, MeasurementFields};

    fn note(x: f64) -> Measurement {
        Measurement::new(0, Geometry::Point(Point::new(x, 0.0)), "m", MeasurementFields::Note)
            .unwrap()
    }

    fn bore(page: u16) -> Measurement {
        Measurement::new(
            page,
            Geometry::LineString(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]),
            "m",
            MeasurementFields::BoreShot(ConduitRunFields::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_add_assigns_identity() {
        let mut store = MeasurementStore::new();
        let a = store.add(note(1.0));
        let b = store.add(note(2.0));
        assert!(!a.is_nil());
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].id(), a);
    }

    #[test]
    fn test_add_replaces_duplicate_identity() {
        let mut store = MeasurementStore::new();
        let id = store.add(note(1.0));
        let copy = store.get(id).unwrap().clone();
        let second = store.add(copy);
        assert_ne!(id, second);
    }

    #[test]
    fn test_remove_and_not_found() {
        let mut store = MeasurementStore::new();
        let id = store.add(note(1.0));
        let removed = store.remove(id).unwrap();
        assert_eq!(removed.id(), id);
        assert!(store.is_empty());
        assert_eq!(store.remove(id), Err(TakeoffError::NotFound(id)));
    }

    #[test]
    fn test_update_notes() {
        let mut store = MeasurementStore::new();
        let id = store.add(note(1.0));
        let updated = store.update(id, MeasurementPatch::notes("check depth")).unwrap();
        assert_eq!(updated.notes(), Some("check depth"));

        let missing = MeasurementId::new_v4();
        assert_eq!(
            store.update(missing, MeasurementPatch::clear_notes()).err(),
            Some(TakeoffError::NotFound(missing))
        );
    }

    #[test]
    fn test_clear_invalidates_ids() {
        let mut store = MeasurementStore::new();
        let id = store.add(note(1.0));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.remove(id), Err(TakeoffError::NotFound(id)));
        assert!(store.update(id, MeasurementPatch::notes("x")).is_err());
    }

    #[test]
    fn test_labels_follow_insertion_order_per_type() {
        let mut store = MeasurementStore::new();
        let n1 = store.add(note(1.0));
        let b1 = store.add(bore(0));
        let n2 = store.add(note(2.0));
        let b2 = store.add(bore(1));

        assert_eq!(store.label(n1).as_deref(), Some("Note 1"));
        assert_eq!(store.label(n2).as_deref(), Some("Note 2"));
        assert_eq!(store.label(b1).as_deref(), Some("Bore Shot 1"));
        assert_eq!(store.label(b2).as_deref(), Some("Bore Shot 2"));

        store.remove(n1).unwrap();
        assert_eq!(store.label(n2).as_deref(), Some("Note 1"));
        assert_eq!(store.find_by_label("Bore Shot 2").map(|m| m.id()), Some(b2));
    }

    #[test]
    fn test_page_filter_and_hit_test() {
        let mut store = MeasurementStore::new();
        let lower = store.add(bore(0));
        let upper = store.add(bore(0));
        store.add(bore(1));

        assert_eq!(store.for_page(0).count(), 2);
        assert_eq!(store.hit_test(0, &Point::new(5.0, 1.0), 2.0), Some(upper));
        store.remove(upper).unwrap();
        assert_eq!(store.hit_test(0, &Point::new(5.0, 1.0), 2.0), Some(lower));
        assert_eq!(store.hit_test(2, &Point::new(5.0, 1.0), 2.0), None);
    }
}
