//! Drawing gesture state machine
//!
//! Turns pointer events into a captured point sequence:
//!
//! ```text
//! Idle --down--> Capturing --move--> Capturing
//! Capturing --up (enough points)--> Committed --> Idle
//! Capturing --up (too few) / leave--> Discarded --> Idle
//! ```
//!
//! The session knows nothing about quantity formulas; a completed gesture is
//! handed back to the caller together with the tool it was drawn with.

use crate::geometry::Point;
use crate::tool::ToolType;

/// Current state of the gesture
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrawingState {
    #[default]
    Idle,
    Capturing {
        tool: ToolType,
        points: Vec<Point>,
    },
}

/// A gesture that captured enough points to be committed
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedGesture {
    pub tool: ToolType,
    pub points: Vec<Point>,
}

/// Result of a gesture-ending event
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Enough points were captured; derive and commit
    Completed(CompletedGesture),
    /// The buffer was dropped without producing a measurement
    Discarded { tool: ToolType, points: usize },
    /// No gesture was in progress
    Ignored,
}

/// Per-gesture capture buffer
#[derive(Debug, Clone, Default)]
pub struct DrawingSession {
    state: DrawingState,
}

impl DrawingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, DrawingState::Capturing { .. })
    }

    /// In-progress points for preview rendering (empty when idle)
    pub fn points(&self) -> &[Point] {
        match &self.state {
            DrawingState::Capturing { points, .. } => points,
            DrawingState::Idle => &[],
        }
    }

    /// Tool of the gesture in progress
    pub fn tool(&self) -> Option<ToolType> {
        match &self.state {
            DrawingState::Capturing { tool, .. } => Some(*tool),
            DrawingState::Idle => None,
        }
    }

    /// Start capturing under `tool`
    ///
    /// Returns false (and changes nothing) if a gesture is already running.
    pub fn pointer_down(&mut self, tool: ToolType, at: Point) -> bool {
        if self.is_capturing() {
            return false;
        }
        tracing::debug!(tool = %tool, x = at.x, y = at.y, "gesture started");
        self.state = DrawingState::Capturing {
            tool,
            points: vec![at],
        };
        true
    }

    /// Append a point while capturing; no deduplication is done
    pub fn pointer_move(&mut self, at: Point) -> bool {
        match &mut self.state {
            DrawingState::Capturing { points, .. } => {
                tracing::trace!(x = at.x, y = at.y, "point captured");
                points.push(at);
                true
            }
            DrawingState::Idle => false,
        }
    }

    /// Finish the gesture
    pub fn pointer_up(&mut self) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            DrawingState::Idle => GestureOutcome::Ignored,
            DrawingState::Capturing { tool, points } => {
                if points.len() < tool.shape_class().min_points() {
                    tracing::debug!(tool = %tool, points = points.len(), "gesture discarded");
                    GestureOutcome::Discarded {
                        tool,
                        points: points.len(),
                    }
                } else {
                    tracing::debug!(tool = %tool, points = points.len(), "gesture completed");
                    GestureOutcome::Completed(CompletedGesture { tool, points })
                }
            }
        }
    }

    /// Pointer left the drawing surface without a release; never commits
    pub fn pointer_leave(&mut self) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            DrawingState::Idle => GestureOutcome::Ignored,
            DrawingState::Capturing { tool, points } => {
                tracing::debug!(tool = %tool, points = points.len(), "gesture cancelled");
                GestureOutcome::Discarded {
                    tool,
                    points: points.len(),
                }
            }
        }
    }
}
