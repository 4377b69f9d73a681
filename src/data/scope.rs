use egui::{pos2, Color32, Rect};

use crate::data::axis::AxisRange;
use crate::data::axis_limits::AxisLimits;
use crate::data::diagram::{weighted_heights, Diagram};
use crate::data::hilo::HiLo;
use crate::data::signals::SignalStore;
use crate::data::triggers::TriggerCursor;
use crate::error::{Result, ScopeError};
use crate::render::DrawSurface;

/// Stable handle of a diagram inside a [`ScopeData`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagramId(pub u64);

/// Result of a layout pass: the rect each diagram occupies, top to bottom.
pub type DiagramLayout = Vec<(DiagramId, Rect)>;

/// The stacked diagrams of one scope window plus the shared X axis.
#[derive(Debug, Clone)]
pub struct ScopeData {
    pub x_axis: AxisLimits,
    pub x_label: String,
    diagrams: Vec<(DiagramId, Diagram)>,
    next_id: u64,
    pub triggers: Vec<TriggerCursor>,
}

impl Default for ScopeData {
    fn default() -> Self {
        Self {
            x_axis: AxisLimits::default(),
            x_label: "t".to_string(),
            diagrams: Vec::new(),
            next_id: 0,
            triggers: Vec::new(),
        }
    }
}

impl ScopeData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_diagram(&mut self, diagram: Diagram) -> DiagramId {
        let id = DiagramId(self.next_id);
        self.next_id += 1;
        self.diagrams.push((id, diagram));
        id
    }

    /// Remove a diagram. Trigger cursors pointing at it stay but draw nothing.
    pub fn remove_diagram(&mut self, id: DiagramId) -> Option<Diagram> {
        let pos = self.diagrams.iter().position(|(d, _)| *d == id)?;
        Some(self.diagrams.remove(pos).1)
    }

    pub fn diagram(&self, id: DiagramId) -> Option<&Diagram> {
        self.diagrams.iter().find(|(d, _)| *d == id).map(|(_, d)| d)
    }

    pub fn diagram_mut(&mut self, id: DiagramId) -> Option<&mut Diagram> {
        self.diagrams
            .iter_mut()
            .find(|(d, _)| *d == id)
            .map(|(_, d)| d)
    }

    pub fn diagrams(&self) -> impl Iterator<Item = (DiagramId, &Diagram)> + '_ {
        self.diagrams.iter().map(|(id, d)| (*id, d))
    }

    pub fn diagrams_mut(&mut self) -> impl Iterator<Item = (DiagramId, &mut Diagram)> + '_ {
        self.diagrams.iter_mut().map(|(id, d)| (*id, d))
    }

    pub fn diagram_count(&self) -> usize {
        self.diagrams.len()
    }

    /// Place a trigger cursor on an existing diagram and return its index.
    pub fn add_trigger(&mut self, color: Color32, time: f64, diagram: DiagramId) -> Result<usize> {
        if self.diagram(diagram).is_none() {
            return Err(ScopeError::invariant(format!(
                "trigger cursor on unknown diagram {diagram:?}"
            )));
        }
        self.triggers.push(TriggerCursor::new(color, time, diagram));
        Ok(self.triggers.len() - 1)
    }

    /// Pixel heights of the diagrams, top to bottom, summing to `total_height`.
    pub fn layout_heights(&self, total_height: u32) -> Result<Vec<u32>> {
        let weights: Vec<f64> = self.diagrams.iter().map(|(_, d)| d.weight()).collect();
        weighted_heights(&weights, total_height)
    }

    /// Split `rect` into stacked diagram rects and lay out the curve labels.
    /// The returned layout is what [`ScopeData::draw`] consumes.
    pub fn layout(&mut self, rect: Rect, line_height: f32) -> Result<DiagramLayout> {
        let total = rect.height().max(0.0).round() as u32;
        let heights = self.layout_heights(total)?;
        let mut top = rect.top();
        let mut out = Vec::with_capacity(heights.len());
        for ((id, diagram), h) in self.diagrams.iter_mut().zip(heights) {
            let bottom = top + h as f32;
            out.push((*id, Rect::from_min_max(pos2(rect.left(), top), pos2(rect.right(), bottom))));
            diagram.layout_labels(line_height);
            top = bottom;
        }
        Ok(out)
    }

    /// Autoscale the shared X axis to the time span of all visible curves.
    pub fn fit_x_range(&mut self, store: &SignalStore) -> Result<bool> {
        let before = self.x_axis.limits();
        let span = self
            .diagrams
            .iter()
            .flat_map(|(_, d)| d.curves())
            .filter(|c| c.axis().is_active())
            .filter_map(|c| store.series(&c.signal).ok())
            .filter_map(|s| s.time_range())
            .reduce(HiLo::merge);
        if let Some(hilo) = span {
            self.x_axis.set_global_autoscale(hilo.widened())?;
        }
        self.x_axis.global_fit();
        Ok(before != self.x_axis.limits())
    }

    /// Autoscale X and then every diagram's Y axes.
    pub fn fit_all(&mut self, store: &SignalStore) -> Result<bool> {
        let mut changed = self.fit_x_range(store)?;
        for (_, diagram) in &mut self.diagrams {
            changed |= diagram.fit_y_ranges(store)?;
        }
        Ok(changed)
    }

    /// Zoom the X axis and rescale every diagram to the data inside the zoom.
    pub fn zoom_x(&mut self, store: &SignalStore, hilo: HiLo) -> Result<()> {
        self.x_axis.set_zoom(hilo)?;
        let x_range = self.x_axis.range()?;
        for (_, diagram) in &mut self.diagrams {
            diagram.fit_y_ranges_local(store, &x_range);
        }
        Ok(())
    }

    pub fn x_range(&self) -> Result<AxisRange> {
        self.x_axis.range()
    }

    /// Draw every laid-out diagram, then the trigger cursors on top.
    ///
    /// Ranges are read once per diagram, so a draw sees one consistent set
    /// of limits even if the caller mutates the scope between frames.
    pub fn draw(&self, store: &SignalStore, layout: &[(DiagramId, Rect)], surface: &mut dyn DrawSurface) -> Result<()> {
        let x_range = self.x_axis.display_range();
        for (id, rect) in layout {
            if let Some(diagram) = self.diagram(*id) {
                diagram.draw(store, x_range, *rect, surface)?;
            }
        }
        for trigger in &self.triggers {
            match layout.iter().find(|(id, _)| *id == trigger.diagram()) {
                Some((_, rect)) => trigger.draw(self, *rect, surface)?,
                None => log::debug!("trigger cursor diagram {:?} not laid out", trigger.diagram()),
            }
        }
        Ok(())
    }
}
