//! Replay scripts: a JSON array of host events applied to a session in order.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use takeoff_core::{Point, PointerOutcome, TakeoffSession, ToolConfiguration, ToolType, UndoOutcome};

/// One host event
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Calibrate { reference: f64, pixels: f64, unit: String },
    SelectTool { tool: String },
    ClearTool,
    Configure { configuration: ToolConfiguration },
    Page { index: u16 },
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
    Leave,
    /// Shorthand for down, moves and up over a list of [x, y] pairs
    Stroke { points: Vec<[f64; 2]> },
    Delete { label: String },
    Notes { label: String, notes: Option<String> },
    Undo,
    Clear,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Calibrate { .. } => "calibrate",
            Step::SelectTool { .. } => "select_tool",
            Step::ClearTool => "clear_tool",
            Step::Configure { .. } => "configure",
            Step::Page { .. } => "page",
            Step::Down { .. } => "down",
            Step::Move { .. } => "move",
            Step::Up => "up",
            Step::Leave => "leave",
            Step::Stroke { .. } => "stroke",
            Step::Delete { .. } => "delete",
            Step::Notes { .. } => "notes",
            Step::Undo => "undo",
            Step::Clear => "clear",
        }
    }
}

pub fn load(path: &Path) -> Result<Vec<Step>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("invalid script {}", path.display()))
}

/// Apply every step, stopping at the first failure
pub fn replay(session: &mut TakeoffSession, steps: &[Step]) -> Result<()> {
    for (index, step) in steps.iter().enumerate() {
        apply(session, step).with_context(|| format!("step {} ({}) failed", index + 1, step.name()))?;
    }
    Ok(())
}

fn apply(session: &mut TakeoffSession, step: &Step) -> Result<()> {
    match step {
        Step::Calibrate { reference, pixels, unit } => {
            session.calibrate(*reference, *pixels, unit.clone())?;
        }
        Step::SelectTool { tool } => {
            let tool: ToolType = tool.parse()?;
            session.select_tool(tool);
        }
        Step::ClearTool => session.clear_tool(),
        Step::Configure { configuration } => session.set_tool_config(configuration.clone()),
        Step::Page { index } => session.set_page(*index),
        Step::Down { x, y } => {
            session.pointer_down(Point::new(*x, *y))?;
        }
        Step::Move { x, y } => {
            session.pointer_move(Point::new(*x, *y));
        }
        Step::Up => log_pointer(session.pointer_up()?),
        Step::Leave => log_pointer(session.pointer_leave()),
        Step::Stroke { points } => {
            let Some(([x, y], rest)) = points.split_first() else {
                anyhow::bail!("stroke needs at least one point");
            };
            session.pointer_down(Point::new(*x, *y))?;
            for [x, y] in rest {
                session.pointer_move(Point::new(*x, *y));
            }
            log_pointer(session.pointer_up()?);
        }
        Step::Delete { label } => {
            let id = find(session, label)?;
            session.delete(id)?;
        }
        Step::Notes { label, notes } => {
            let id = find(session, label)?;
            session.update_notes(id, notes.clone())?;
        }
        Step::Undo => match session.undo() {
            UndoOutcome::Empty => tracing::info!("nothing to undo"),
            outcome => tracing::info!(?outcome, "undo applied"),
        },
        Step::Clear => session.clear_all(),
    }
    Ok(())
}

fn find(session: &TakeoffSession, label: &str) -> Result<takeoff_core::MeasurementId> {
    session
        .store()
        .find_by_label(label)
        .map(|m| m.id())
        .with_context(|| format!("no measurement labelled {label:?}"))
}

fn log_pointer(outcome: PointerOutcome) {
    match outcome {
        PointerOutcome::Committed(id) => tracing::info!(%id, "measurement committed"),
        PointerOutcome::Discarded => tracing::info!("gesture discarded"),
        PointerOutcome::Ignored => {}
    }
}
