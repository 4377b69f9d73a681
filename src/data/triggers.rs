use egui::{pos2, Color32, Rect};

use crate::data::axis::AxisMapper;
use crate::data::color::{ColorState, ColorStrategy};
use crate::data::scope::{DiagramId, ScopeData};
use crate::error::Result;
use crate::render::DrawSurface;

/// Vertical marker at a fixed time, drawn across one diagram.
///
/// The cursor only remembers the id of its diagram; the diagram's current
/// axis range is read at draw time and never modified.
#[derive(Debug, Clone)]
pub struct TriggerCursor {
    color: Color32,
    pub time: f64,
    pub enabled: bool,
    diagram: DiagramId,
}

impl TriggerCursor {
    pub fn new(color: Color32, time: f64, diagram: DiagramId) -> Self {
        Self {
            color,
            time,
            enabled: true,
            diagram,
        }
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn diagram(&self) -> DiagramId {
        self.diagram
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Draw the cursor into `rect`, the area its diagram was laid out to.
    /// A missing diagram or a time outside the visible X range draws nothing.
    pub fn draw(&self, scope: &ScopeData, rect: Rect, surface: &mut dyn DrawSurface) -> Result<()> {
        let Some(diagram) = scope.diagram(self.diagram) else {
            log::debug!("trigger cursor refers to removed diagram {:?}", self.diagram);
            return Ok(());
        };
        let x_range = scope.x_axis.display_range();
        if !x_range.contains(self.time) {
            return Ok(());
        }
        let y_range = diagram.y1.display_range();
        let x = AxisMapper::horizontal(x_range, rect).to_screen(self.time)?;
        let y = AxisMapper::vertical(y_range, rect);
        let (y_lo, y_hi) = (y.to_screen(y_range.lo())?, y.to_screen(y_range.hi())?);

        surface.set_color(ColorState::resolve(false, self.enabled).apply(self.color));
        surface.line(pos2(x, y_lo), pos2(x, y_hi));
        Ok(())
    }
}
