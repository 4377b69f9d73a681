//! A diagram is one slot of the stacked scope view. Its curves share the
//! scope's X axis and the diagram's own Y and Y2 axes.

use egui::{pos2, Color32, Rect};
use serde::{Deserialize, Serialize};

use crate::data::axis::{AxisMapper, AxisRange};
use crate::data::axis_limits::AxisLimits;
use crate::data::curve::{AxisAssignment, Curve, CurveKind};
use crate::data::hilo::HiLo;
use crate::data::signals::{SignalRef, SignalStore};
use crate::data::time_series::TimeSeries;
use crate::error::{Result, ScopeError};
use crate::render::DrawSurface;

pub const DEFAULT_WEIGHT: f64 = 0.2;

/// Gap between the plot border and the first curve label.
const LABEL_INSET: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiagramKind {
    #[default]
    Regular,
    Signal,
}

impl DiagramKind {
    pub fn type_string(self) -> &'static str {
        match self {
            DiagramKind::Regular => "DIAGRAM_CURVE",
            DiagramKind::Signal => "DIAGRAM_SIGNAL",
        }
    }

    pub fn from_type_string(s: &str) -> Option<Self> {
        match s {
            "DIAGRAM_CURVE" => Some(DiagramKind::Regular),
            "DIAGRAM_SIGNAL" => Some(DiagramKind::Signal),
            _ => None,
        }
    }

    fn curve_kind(self) -> CurveKind {
        match self {
            DiagramKind::Regular => CurveKind::Regular,
            DiagramKind::Signal => CurveKind::Signal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagramSettings {
    name: String,
    weight: f64,
}

impl Default for DiagramSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            weight: DEFAULT_WEIGHT,
        }
    }
}

impl DiagramSettings {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Relative height of the diagram, in `[0, 1]`.
    pub fn set_weight(&mut self, weight: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(ScopeError::invariant(format!(
                "diagram weight {weight} outside [0, 1]"
            )));
        }
        self.weight = weight;
        Ok(())
    }

    /// Automatic names ("GRF1", ...) and empty names are not drawn.
    pub fn shows_title(&self) -> bool {
        !self.name.is_empty() && !self.name.starts_with("GRF")
    }
}

/// Split `total` pixels between slots proportionally to `weights`, in order.
/// The last slot takes the rounding remainder so the heights always add up
/// to `total`. All-zero weights share the height equally.
pub fn weighted_heights(weights: &[f64], total: u32) -> Result<Vec<u32>> {
    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(ScopeError::invariant(format!("invalid diagram weight {bad}")));
    }
    let Some(last) = weights.len().checked_sub(1) else {
        return Ok(Vec::new());
    };
    let sum: f64 = weights.iter().sum();
    let share = |w: f64| if sum > 0.0 { w / sum } else { 1.0 / weights.len() as f64 };

    let mut heights = Vec::with_capacity(weights.len());
    let mut used = 0u32;
    for w in &weights[..last] {
        // small epsilon keeps 0.3 * 100 from flooring to 29
        let h = ((share(*w) * total as f64) + 1e-9).floor() as u32;
        let h = h.min(total - used);
        used += h;
        heights.push(h);
    }
    heights.push(total - used);
    Ok(heights)
}

#[derive(Debug, Clone)]
pub struct Diagram {
    pub kind: DiagramKind,
    pub settings: DiagramSettings,
    pub y1: AxisLimits,
    pub y2: AxisLimits,
    curves: Vec<Curve>,
}

impl Diagram {
    pub fn new(kind: DiagramKind) -> Self {
        let mut y1 = AxisLimits::default();
        let mut y2 = AxisLimits::default();
        y1.set_nice_scale(true);
        y2.set_nice_scale(true);
        Self {
            kind,
            settings: DiagramSettings::default(),
            y1,
            y2,
            curves: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.settings.set_name(name);
        self
    }

    pub fn name(&self) -> &str {
        self.settings.name()
    }

    pub fn weight(&self) -> f64 {
        self.settings.weight()
    }

    pub fn set_weight(&mut self, weight: f64) -> Result<()> {
        self.settings.set_weight(weight)
    }

    /// Attach `signal` as a new hidden curve and return its index.
    pub fn add_curve(&mut self, signal: impl Into<SignalRef>) -> usize {
        let index = self.curves.len();
        self.curves
            .push(Curve::new(signal.into(), self.kind.curve_kind(), index));
        index
    }

    /// Attach `signal` and assign it to `axis` in one go.
    pub fn add_curve_on(&mut self, signal: impl Into<SignalRef>, axis: AxisAssignment) -> Result<usize> {
        let index = self.add_curve(signal);
        if let Err(e) = self.curves[index].set_axis(axis) {
            self.curves.pop();
            return Err(e);
        }
        Ok(index)
    }

    pub fn remove_curve(&mut self, signal: &SignalRef) -> Option<Curve> {
        let pos = self.curves.iter().position(|c| &c.signal == signal)?;
        Some(self.curves.remove(pos))
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    pub fn curve(&self, index: usize) -> Option<&Curve> {
        self.curves.get(index)
    }

    pub fn curve_mut(&mut self, index: usize) -> Option<&mut Curve> {
        self.curves.get_mut(index)
    }

    pub fn curve_by_signal(&self, signal: &SignalRef) -> Option<&Curve> {
        self.curves.iter().find(|c| &c.signal == signal)
    }

    /// Cycle the axis assignment of curve `index`.
    pub fn advance_curve_axis(&mut self, index: usize) -> Result<AxisAssignment> {
        let maximum = self.curves.len().checked_sub(1);
        self.curves
            .get_mut(index)
            .ok_or(ScopeError::OutOfRange { index, maximum })?
            .advance_axis()
    }

    /// Mark curve `index` as the selected one, clearing all others.
    pub fn select_curve(&mut self, index: Option<usize>) {
        for (i, curve) in self.curves.iter_mut().enumerate() {
            curve.set_selected(Some(i) == index);
        }
    }

    pub fn has_y2(&self) -> bool {
        self.curves.iter().any(|c| c.axis() == AxisAssignment::Y2)
    }

    /// Assignment of the curves scaled on `y1`.
    fn primary_axis(&self) -> AxisAssignment {
        match self.kind {
            DiagramKind::Regular => AxisAssignment::Y,
            DiagramKind::Signal => AxisAssignment::Signal,
        }
    }

    fn merged_range<F>(&self, store: &SignalStore, axis: AxisAssignment, range_of: F) -> Option<HiLo>
    where
        F: Fn(&dyn TimeSeries) -> Option<HiLo>,
    {
        self.curves
            .iter()
            .filter(|c| c.axis() == axis)
            .filter_map(|c| store.series(&c.signal).ok())
            .filter_map(range_of)
            .reduce(HiLo::merge)
    }

    /// Autoscale Y and Y2 to the full data of their curves. Returns true when
    /// the displayed limits changed.
    pub fn fit_y_ranges(&mut self, store: &SignalStore) -> Result<bool> {
        let before = (self.y1.limits(), self.y2.limits());
        if let Some(hilo) = self.merged_range(store, self.primary_axis(), |s| s.value_range()) {
            self.y1.set_global_autoscale(hilo.widened())?;
        }
        if let Some(hilo) = self.merged_range(store, AxisAssignment::Y2, |s| s.value_range()) {
            self.y2.set_global_autoscale(hilo.widened())?;
        }
        self.y1.global_fit();
        self.y2.global_fit();
        Ok(before != (self.y1.limits(), self.y2.limits()))
    }

    /// Autoscale Y and Y2 to the data visible in `x_range` only.
    pub fn fit_y_ranges_local(&mut self, store: &SignalStore, x_range: &AxisRange) {
        let (lo, hi) = (x_range.lo(), x_range.hi());
        if let Some(hilo) = self.merged_range(store, self.primary_axis(), |s| s.value_range_between(lo, hi)) {
            self.y1.set_local_autoscale(hilo.widened());
            self.y1.local_fit();
        }
        if let Some(hilo) = self.merged_range(store, AxisAssignment::Y2, |s| s.value_range_between(lo, hi)) {
            self.y2.set_local_autoscale(hilo.widened());
            self.y2.local_fit();
        }
    }

    /// Stack labels of visible curves top to bottom in insertion order.
    pub fn layout_labels(&mut self, line_height: f32) {
        let mut slot = 0usize;
        for curve in &mut self.curves {
            if curve.axis().is_active() {
                curve.set_label_offset(Some(slot as f32 * line_height));
                slot += 1;
            } else {
                curve.set_label_offset(None);
            }
        }
    }

    fn mapper_for(&self, axis: AxisAssignment, rect: Rect) -> AxisMapper {
        let limits = match axis {
            AxisAssignment::Y2 => &self.y2,
            _ => &self.y1,
        };
        AxisMapper::vertical(limits.display_range(), rect)
    }

    /// Draw border, title, curves (in insertion order) and labels into `rect`.
    /// Curves whose signal is no longer in `store` are skipped.
    pub fn draw(
        &self,
        store: &SignalStore,
        x_range: AxisRange,
        rect: Rect,
        surface: &mut dyn DrawSurface,
    ) -> Result<()> {
        surface.set_color(Color32::LIGHT_GRAY);
        surface.polyline(&[
            rect.left_top(),
            rect.right_top(),
            rect.right_bottom(),
            rect.left_bottom(),
            rect.left_top(),
        ]);
        if self.settings.shows_title() {
            surface.set_color(Color32::DARK_GRAY);
            surface.text(
                pos2(rect.center().x, rect.top() - surface.line_height()),
                self.name(),
            );
        }

        let x = AxisMapper::horizontal(x_range, rect);
        for curve in self.curves.iter().filter(|c| c.axis().is_active()) {
            if !store.contains(&curve.signal) {
                log::debug!("diagram '{}': signal '{}' not in store", self.name(), curve.signal);
                continue;
            }
            let y = self.mapper_for(curve.axis(), rect);
            curve.draw(store, &x, &y, surface)?;
        }

        let origin = pos2(rect.left() + LABEL_INSET, rect.top() + LABEL_INSET);
        for curve in &self.curves {
            curve.draw_label(origin, surface);
        }
        Ok(())
    }
}
