//! Takeoff session context
//!
//! Owns every piece of mutable engine state for one drawing: calibration,
//! tool registry, in-progress gesture, committed measurements and undo
//! history. Hosts create one session per open drawing and route all pointer
//! and command events through it. Access is single-threaded; a host sharing
//! a session across threads must wrap it in a mutex.

use crate::calibration::{CalibrationState, ScaleCalibrator};
use crate::config::EngineConfig;
use crate::derivation;
use crate::drawing::{DrawingSession, GestureOutcome};
use crate::error::{TakeoffError, TakeoffResult};
use crate::geometry::Point;
use crate::history::{ActionHistory, ReversalInstruction};
use crate::measurement::{Measurement, MeasurementId, MeasurementPatch};
use crate::store::MeasurementStore;
use crate::tool::ToolType;
use crate::tool_config::{ToolConfigRegistry, ToolConfiguration};

/// Result of a gesture-ending pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// A measurement was derived and committed
    Committed(MeasurementId),
    /// The gesture ended without a measurement
    Discarded,
    /// No gesture was in progress
    Ignored,
}

/// Result of applying one undo step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// An added measurement was removed
    Removed(MeasurementId),
    /// A deleted measurement was re-added under this new id
    Restored(MeasurementId),
    /// The entry referred to a measurement that no longer exists
    Stale(MeasurementId),
    /// Nothing to undo
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct TakeoffSession {
    calibrator: ScaleCalibrator,
    registry: ToolConfigRegistry,
    drawing: DrawingSession,
    store: MeasurementStore,
    history: ActionHistory,
    page_index: u16,
}

impl TakeoffSession {
    /// Create a session from host configuration
    pub fn new(config: &EngineConfig) -> Self {
        let mut calibrator = ScaleCalibrator::new();
        if let Some(scale) = config.fallback_scale {
            calibrator = calibrator.with_fallback(scale, config.fallback_unit.clone());
        }
        Self {
            calibrator,
            page_index: config.page_index,
            ..Self::default()
        }
    }

    pub fn calibrate(
        &mut self,
        reference_length: f64,
        measured_pixel_length: f64,
        unit: impl Into<String>,
    ) -> TakeoffResult<CalibrationState> {
        self.calibrator
            .calibrate(reference_length, measured_pixel_length, unit)
    }

    pub fn calibrator(&self) -> &ScaleCalibrator {
        &self.calibrator
    }

    pub fn select_tool(&mut self, tool: ToolType) {
        self.registry.select_tool(tool);
    }

    pub fn clear_tool(&mut self) {
        self.registry.clear_tool();
    }

    pub fn active_tool(&self) -> Option<ToolType> {
        self.registry.active_tool()
    }

    /// Attach a tool configuration; later gestures use it
    pub fn set_tool_config(&mut self, config: ToolConfiguration) {
        tracing::debug!(slot = ?config.slot(), "tool configuration attached");
        self.registry.set_config(config);
    }

    pub fn registry(&self) -> &ToolConfigRegistry {
        &self.registry
    }

    pub fn set_page(&mut self, page_index: u16) {
        self.page_index = page_index;
    }

    pub fn page_index(&self) -> u16 {
        self.page_index
    }

    /// Begin a gesture under the active tool
    ///
    /// Refused when no tool is active or when the tool needs a configuration
    /// that has not been attached. Returns false if a gesture is already
    /// running.
    pub fn pointer_down(&mut self, at: Point) -> TakeoffResult<bool> {
        let tool = self.registry.active_tool().ok_or(TakeoffError::NoActiveTool)?;
        if !self.registry.is_ready(tool) {
            return Err(TakeoffError::MissingConfiguration(tool));
        }
        Ok(self.drawing.pointer_down(tool, at))
    }

    pub fn pointer_move(&mut self, at: Point) -> bool {
        self.drawing.pointer_move(at)
    }

    /// Finish the gesture, deriving and committing a measurement if possible
    ///
    /// On a derivation error the gesture is dropped and nothing is stored.
    pub fn pointer_up(&mut self) -> TakeoffResult<PointerOutcome> {
        let gesture = match self.drawing.pointer_up() {
            GestureOutcome::Completed(gesture) => gesture,
            GestureOutcome::Discarded { .. } => return Ok(PointerOutcome::Discarded),
            GestureOutcome::Ignored => return Ok(PointerOutcome::Ignored),
        };

        let measurement = derivation::derive(
            gesture.tool,
            &gesture.points,
            &self.calibrator,
            self.registry.config_for(gesture.tool),
            self.page_index,
        )
        .inspect_err(|error| {
            tracing::warn!(tool = %gesture.tool, %error, "gesture produced no measurement");
        })?;

        let id = self.store.add(measurement);
        self.history.record_add(id);
        Ok(PointerOutcome::Committed(id))
    }

    pub fn pointer_leave(&mut self) -> PointerOutcome {
        match self.drawing.pointer_leave() {
            GestureOutcome::Ignored => PointerOutcome::Ignored,
            _ => PointerOutcome::Discarded,
        }
    }

    /// In-progress points for preview rendering
    pub fn preview_points(&self) -> &[Point] {
        self.drawing.points()
    }

    /// Delete a measurement, recording it for undo
    pub fn delete(&mut self, id: MeasurementId) -> TakeoffResult<Measurement> {
        let removed = self.store.remove(id).inspect_err(|_| {
            tracing::warn!(%id, "delete of unknown measurement");
        })?;
        self.history.record_delete(removed.clone());
        Ok(removed)
    }

    /// Replace (or clear) the notes of a measurement
    pub fn update_notes(
        &mut self,
        id: MeasurementId,
        notes: Option<String>,
    ) -> TakeoffResult<&Measurement> {
        self.store.update(id, MeasurementPatch { notes: Some(notes) })
    }

    /// Reverse the most recent add or delete
    pub fn undo(&mut self) -> UndoOutcome {
        let Some(instruction) = self.history.undo_last() else {
            return UndoOutcome::Empty;
        };

        match instruction {
            ReversalInstruction::Remove(id) => match self.store.remove(id) {
                Ok(_) => {
                    tracing::debug!(%id, "undo: removed added measurement");
                    UndoOutcome::Removed(id)
                }
                Err(_) => {
                    tracing::warn!(%id, "undo: added measurement no longer exists");
                    UndoOutcome::Stale(id)
                }
            },
            ReversalInstruction::Restore(snapshot) => {
                let id = self.store.add(snapshot);
                tracing::debug!(%id, "undo: restored deleted measurement");
                UndoOutcome::Restored(id)
            }
        }
    }

    /// Drop all measurements and history (the drawing was unloaded)
    pub fn clear_all(&mut self) {
        self.drawing.pointer_leave();
        self.store.clear();
        self.history.clear();
    }

    pub fn store(&self) -> &MeasurementStore {
        &self.store
    }

    pub fn measurements(&self) -> &[Measurement] {
        self.store.list()
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    pub fn drawing(&self) -> &DrawingSession {
        &self.drawing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::MeasurementFields;
    use crate::tool_config::{AreaConfig, TrenchConfig};

    fn calibrated_session() -> TakeoffSession {
        let mut session = TakeoffSession::default();
        session.calibrate(10.0, 200.0, "m").unwrap();
        session
    }

    fn draw(session: &mut TakeoffSession, points: &[(f64, f64)]) -> TakeoffResult<PointerOutcome> {
        let (first, rest) = points.split_first().expect("at least one point");
        session.pointer_down(Point::new(first.0, first.1))?;
        for (x, y) in rest {
            session.pointer_move(Point::new(*x, *y));
        }
        session.pointer_up()
    }

    fn committed(outcome: PointerOutcome) -> MeasurementId {
        match outcome {
            PointerOutcome::Committed(id) => id,
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn test_trench_scenario() {
        let mut session = calibrated_session();
        session.select_tool(ToolType::Trench);
        session.set_tool_config(ToolConfiguration::Trench(TrenchConfig::new(2.0, 3.0)));

        let id = committed(draw(&mut session, &[(0.0, 0.0), (200.0, 0.0), (400.0, 0.0)]).unwrap());
        let m = session.store().get(id).unwrap();
        assert!((m.length().unwrap() - 20.0).abs() < 1e-9);
        let MeasurementFields::Trench(fields) = m.fields() else {
            panic!("expected trench");
        };
        assert!((fields.spoil_volume - 4.444).abs() < 1e-3);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_pointer_down_gates() {
        let mut session = calibrated_session();
        assert_eq!(
            session.pointer_down(Point::new(0.0, 0.0)),
            Err(TakeoffError::NoActiveTool)
        );

        session.select_tool(ToolType::Trench);
        assert_eq!(
            session.pointer_down(Point::new(0.0, 0.0)),
            Err(TakeoffError::MissingConfiguration(ToolType::Trench))
        );
        assert!(!session.drawing().is_capturing());
    }

    #[test]
    fn test_single_point_discard_and_commit() {
        let mut session = calibrated_session();
        session.select_tool(ToolType::Area);
        assert_eq!(draw(&mut session, &[(5.0, 5.0)]).unwrap(), PointerOutcome::Discarded);
        assert!(session.store().is_empty());
        assert!(session.history().is_empty());

        session.select_tool(ToolType::Note);
        let id = committed(draw(&mut session, &[(5.0, 5.0)]).unwrap());
        assert_eq!(session.store().get(id).unwrap().tool_type(), ToolType::Note);
    }

    #[test]
    fn test_failed_derivation_commits_nothing() {
        let mut session = TakeoffSession::default();
        session.select_tool(ToolType::BoreShot);
        assert_eq!(
            draw(&mut session, &[(0.0, 0.0), (10.0, 0.0)]),
            Err(TakeoffError::NotCalibrated)
        );
        assert!(session.store().is_empty());
        assert!(session.history().is_empty());
        assert!(!session.drawing().is_capturing());
    }

    #[test]
    fn test_fallback_scale_from_config() {
        let config = EngineConfig::default().with_fallback(0.5, "ft").with_page(1);
        let mut session = TakeoffSession::new(&config);
        session.select_tool(ToolType::Conduit);
        let id = committed(draw(&mut session, &[(0.0, 0.0), (10.0, 0.0)]).unwrap());
        let m = session.store().get(id).unwrap();
        assert_eq!(m.length(), Some(5.0));
        assert_eq!(m.unit(), "ft");
        assert_eq!(m.page_index(), 1);
    }

    #[test]
    fn test_undo_add_restores_prior_size() {
        let mut session = calibrated_session();
        session.select_tool(ToolType::BoreShot);
        committed(draw(&mut session, &[(0.0, 0.0), (10.0, 0.0)]).unwrap());
        let before = session.store().len();

        let id = committed(draw(&mut session, &[(0.0, 5.0), (10.0, 5.0)]).unwrap());
        assert_eq!(session.undo(), UndoOutcome::Removed(id));
        assert_eq!(session.store().len(), before);
        assert!(!session.store().contains(id));
    }

    #[test]
    fn test_undo_delete_restores_with_new_id() {
        let mut session = calibrated_session();
        session.select_tool(ToolType::Area);
        session.set_tool_config(ToolConfiguration::Area(AreaConfig {
            height: Some(2.0),
            material: None,
        }));
        let id = committed(
            draw(&mut session, &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]).unwrap(),
        );
        session.update_notes(id, Some("parking lot".to_string())).unwrap();
        let original = session.store().get(id).unwrap().clone();
        let size = session.store().len();

        session.delete(id).unwrap();
        assert_eq!(session.store().len(), size - 1);

        let UndoOutcome::Restored(new_id) = session.undo() else {
            panic!("expected restore");
        };
        assert_eq!(session.store().len(), size);
        let restored = session.store().get(new_id).unwrap();
        assert_eq!(restored.fields(), original.fields());
        assert_eq!(restored.geometry(), original.geometry());
        assert_eq!(restored.area(), original.area());
        assert_eq!(restored.unit(), original.unit());
        assert_eq!(restored.notes(), Some("parking lot"));
    }

    #[test]
    fn test_undo_empty_is_noop() {
        let mut session = calibrated_session();
        assert_eq!(session.undo(), UndoOutcome::Empty);
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_calibration_change_keeps_committed_values() {
        let mut session = calibrated_session();
        session.select_tool(ToolType::BoreShot);
        let id = committed(draw(&mut session, &[(0.0, 0.0), (200.0, 0.0)]).unwrap());

        session.calibrate(1.0, 1.0, "ft").unwrap();
        let m = session.store().get(id).unwrap();
        assert!((m.length().unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(m.unit(), "m");
    }

    #[test]
    fn test_clear_all() {
        let mut session = calibrated_session();
        session.select_tool(ToolType::Note);
        let id = committed(draw(&mut session, &[(1.0, 1.0)]).unwrap());
        session.pointer_down(Point::new(2.0, 2.0)).unwrap();

        session.clear_all();
        assert!(session.store().is_empty());
        assert!(!session.history().can_undo());
        assert!(!session.drawing().is_capturing());
        assert_eq!(session.delete(id), Err(TakeoffError::NotFound(id)));
        assert!(session.update_notes(id, None).is_err());
    }

    #[test]
    fn test_undo_after_manual_delete_of_added_is_stale_safe() {
        let mut session = calibrated_session();
        session.select_tool(ToolType::Note);
        let id = committed(draw(&mut session, &[(1.0, 1.0)]).unwrap());
        session.delete(id).unwrap();

        let UndoOutcome::Restored(restored) = session.undo() else {
            panic!("expected restore");
        };
        assert_ne!(restored, id);
        // The add entry still names the original id, which is gone.
        assert_eq!(session.undo(), UndoOutcome::Stale(id));
        assert_eq!(session.store().len(), 1);
    }
}
