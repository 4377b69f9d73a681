//! A curve binds one signal to a diagram's axes and a drawing style.

use egui::{pos2, Pos2, Rect};
use serde::{Deserialize, Serialize};

use crate::data::axis::AxisMapper;
use crate::data::codes::PersistedCode;
use crate::data::color::{ColorState, ColorStrategy, PaletteColor};
use crate::data::signals::{SignalRef, SignalStore};
use crate::error::{Result, ScopeError};
use crate::render::DrawSurface;

/// Axis a curve is plotted against. `None` hides the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisAssignment {
    X,
    Y,
    Y2,
    Signal,
    #[default]
    None,
}

impl PersistedCode for AxisAssignment {
    const KIND: &'static str = "axis connection";
    const TABLE: &'static [(Self, i64)] = &[
        (AxisAssignment::None, 0),
        (AxisAssignment::Y, 1),
        (AxisAssignment::Y2, 2),
        (AxisAssignment::X, 3),
        (AxisAssignment::Signal, 4),
    ];
}

impl AxisAssignment {
    /// Next assignment in the click cycle: `None -> Y -> Y2 -> None` for
    /// value curves, `Signal <-> None` for signal curves.
    pub fn advance(self, is_signal_curve: bool) -> Result<Self> {
        match (is_signal_curve, self) {
            (true, AxisAssignment::Signal) => Ok(AxisAssignment::None),
            (true, AxisAssignment::None) => Ok(AxisAssignment::Signal),
            (false, AxisAssignment::None) => Ok(AxisAssignment::Y),
            (false, AxisAssignment::Y) => Ok(AxisAssignment::Y2),
            (false, AxisAssignment::Y2) => Ok(AxisAssignment::None),
            (signal, other) => Err(ScopeError::invariant(format!(
                "{other:?} cannot advance on a {} curve",
                if signal { "signal" } else { "value" }
            ))),
        }
    }

    /// True when the curve is drawn against one of the diagram's value axes.
    pub fn is_active(self) -> bool {
        !matches!(self, AxisAssignment::None | AxisAssignment::X)
    }
}

/// How samples are joined. Codes are persisted; do not renumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineType {
    #[default]
    ConnectNeighbours,
    BarToAxis,
}

impl PersistedCode for LineType {
    const KIND: &'static str = "line type";
    const TABLE: &'static [(Self, i64)] = &[(LineType::ConnectNeighbours, 0), (LineType::BarToAxis, 1)];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurveKind {
    /// Analog values on Y or Y2.
    #[default]
    Regular,
    /// Boolean/digital signal drawn sample-and-hold.
    Signal,
}

/// Turns mapped sample points into primitives.
pub trait CurvePainter {
    fn paint(&self, points: &[Pos2], baseline: f32, line_type: LineType, surface: &mut dyn DrawSurface);
}

impl CurvePainter for CurveKind {
    fn paint(&self, points: &[Pos2], baseline: f32, line_type: LineType, surface: &mut dyn DrawSurface) {
        match (self, line_type) {
            (CurveKind::Regular, LineType::ConnectNeighbours) => surface.polyline(points),
            (CurveKind::Regular, LineType::BarToAxis) => {
                for p in points {
                    surface.line(*p, pos2(p.x, baseline));
                }
            }
            (CurveKind::Signal, LineType::ConnectNeighbours) => {
                surface.polyline(&step_points(points));
            }
            (CurveKind::Signal, LineType::BarToAxis) => {
                for pair in points.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    surface.fill_rect(Rect::from_two_pos(a, pos2(b.x, baseline)));
                }
            }
        }
    }
}

fn step_points(points: &[Pos2]) -> Vec<Pos2> {
    let mut out: Vec<Pos2> = Vec::with_capacity(points.len() * 2);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(pos2(p.x, out[out.len() - 1].y));
        }
        out.push(*p);
    }
    out
}

/// Persisted per-curve settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveSettings {
    pub axis: AxisAssignment,
    pub line_type: LineType,
    pub color: PaletteColor,
}

impl Default for CurveSettings {
    fn default() -> Self {
        Self {
            axis: AxisAssignment::None,
            line_type: LineType::ConnectNeighbours,
            color: PaletteColor::alloc(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Curve {
    pub signal: SignalRef,
    pub kind: CurveKind,
    pub settings: CurveSettings,
    selected: bool,
    enabled: bool,
    label_offset: Option<f32>,
}

impl Curve {
    /// New curve for `signal`, colored by its position in the diagram.
    pub fn new(signal: SignalRef, kind: CurveKind, index: usize) -> Self {
        Self {
            signal,
            kind,
            settings: CurveSettings {
                color: PaletteColor::alloc(index),
                ..CurveSettings::default()
            },
            selected: false,
            enabled: true,
            label_offset: None,
        }
    }

    pub fn name(&self) -> &str {
        self.signal.as_str()
    }

    pub fn axis(&self) -> AxisAssignment {
        self.settings.axis
    }

    /// Set the axis directly. Signal curves only accept `Signal`/`None`,
    /// value curves `Y`, `Y2` or `None`.
    pub fn set_axis(&mut self, axis: AxisAssignment) -> Result<()> {
        let allowed = match self.kind {
            CurveKind::Signal => matches!(axis, AxisAssignment::Signal | AxisAssignment::None),
            CurveKind::Regular => !matches!(axis, AxisAssignment::Signal | AxisAssignment::X),
        };
        if !allowed {
            return Err(ScopeError::invariant(format!(
                "{:?} curve '{}' cannot use axis {axis:?}",
                self.kind,
                self.name()
            )));
        }
        self.settings.axis = axis;
        Ok(())
    }

    pub fn advance_axis(&mut self) -> Result<AxisAssignment> {
        let next = self.settings.axis.advance(self.kind == CurveKind::Signal)?;
        self.settings.axis = next;
        Ok(next)
    }

    pub fn line_type(&self) -> LineType {
        self.settings.line_type
    }

    pub fn set_line_type(&mut self, line_type: LineType) {
        self.settings.line_type = line_type;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, value: bool) {
        self.selected = value;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, value: bool) {
        self.enabled = value;
    }

    pub fn color_state(&self) -> ColorState {
        ColorState::resolve(self.selected, self.enabled)
    }

    /// Vertical label offset assigned by the last label layout, `None` when
    /// the curve has no label.
    pub fn label_offset(&self) -> Option<f32> {
        self.label_offset
    }

    pub(crate) fn set_label_offset(&mut self, offset: Option<f32>) {
        self.label_offset = offset;
    }

    pub fn label_text(&self) -> String {
        match self.settings.axis {
            AxisAssignment::Y2 => format!("{} (Y2)", self.name()),
            _ => self.name().to_string(),
        }
    }

    /// Draw the samples visible on `x` against `y`. Samples that cannot be
    /// mapped (non-positive values on a log axis) split the line.
    pub fn draw(
        &self,
        store: &SignalStore,
        x: &AxisMapper,
        y: &AxisMapper,
        surface: &mut dyn DrawSurface,
    ) -> Result<()> {
        if !self.settings.axis.is_active() {
            return Ok(());
        }
        let series = store.series(&self.signal)?;
        if series.is_empty() {
            return Ok(());
        }
        let (start, stop) = series.index_window(x.range.lo(), x.range.hi())?;

        let mut segments: Vec<Vec<Pos2>> = Vec::new();
        let mut current = Vec::new();
        for i in start..=stop {
            let mapped = x
                .to_screen(series.time_at(i))
                .and_then(|px| Ok(pos2(px, y.to_screen(series.value_at(i))?)));
            match mapped {
                Ok(p) => current.push(p),
                Err(_) if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                Err(_) => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }

        let baseline = y.to_screen(y.range.baseline())?;
        surface.set_color(self.color_state().apply(self.settings.color.color32()));
        for segment in &segments {
            self.kind.paint(segment, baseline, self.settings.line_type, surface);
        }
        Ok(())
    }

    /// Draw the label at `origin` shifted by the assigned label offset.
    pub fn draw_label(&self, origin: Pos2, surface: &mut dyn DrawSurface) {
        let Some(offset) = self.label_offset else {
            return;
        };
        surface.set_color(self.color_state().apply(self.settings.color.color32()));
        surface.text(pos2(origin.x, origin.y + offset), &self.label_text());
    }
}
