//! Drawing surface abstraction. The scope core only emits primitives; the
//! paint loop and the widget that owns the surface live elsewhere.

use egui::{Align2, Color32, FontId, Pos2, Rect, Shape, Stroke};

pub trait DrawSurface {
    fn set_color(&mut self, color: Color32);
    fn line(&mut self, from: Pos2, to: Pos2);
    fn polyline(&mut self, points: &[Pos2]) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1]);
        }
    }
    fn fill_rect(&mut self, rect: Rect);
    /// Draw `text` with its top-left corner at `pos`.
    fn text(&mut self, pos: Pos2, text: &str);
    /// Height of one text line in the current font.
    fn line_height(&self) -> f32;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetColor(Color32),
    Line(Pos2, Pos2),
    Polyline(Vec<Pos2>),
    FillRect(Rect),
    Text(Pos2, String),
}

/// Surface that records every primitive, for headless rendering and tests.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
    line_height: f32,
}

impl RecordingSurface {
    pub fn new(line_height: f32) -> Self {
        Self {
            commands: Vec::new(),
            line_height,
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = (Pos2, Pos2)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line(a, b) => Some((*a, *b)),
            _ => None,
        })
    }

    pub fn polylines(&self) -> impl Iterator<Item = &[Pos2]> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Polyline(points) => Some(points.as_slice()),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = (Pos2, &str)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text(pos, text) => Some((*pos, text.as_str())),
            _ => None,
        })
    }

    pub fn colors(&self) -> impl Iterator<Item = Color32> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::SetColor(color) => Some(*color),
            _ => None,
        })
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new(14.0)
    }
}

impl DrawSurface for RecordingSurface {
    fn set_color(&mut self, color: Color32) {
        self.commands.push(DrawCommand::SetColor(color));
    }

    fn line(&mut self, from: Pos2, to: Pos2) {
        self.commands.push(DrawCommand::Line(from, to));
    }

    fn polyline(&mut self, points: &[Pos2]) {
        self.commands.push(DrawCommand::Polyline(points.to_vec()));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::FillRect(rect));
    }

    fn text(&mut self, pos: Pos2, text: &str) {
        self.commands.push(DrawCommand::Text(pos, text.to_string()));
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}

/// Adapter drawing onto an `egui::Painter`.
pub struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    color: Color32,
    stroke_width: f32,
    font: FontId,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a egui::Painter, font: FontId) -> Self {
        Self {
            painter,
            color: Color32::GRAY,
            stroke_width: 1.5,
            font,
        }
    }

    pub fn with_stroke_width(mut self, width: f32) -> Self {
        self.stroke_width = width;
        self
    }

    fn stroke(&self) -> Stroke {
        Stroke::new(self.stroke_width, self.color)
    }
}

impl DrawSurface for PainterSurface<'_> {
    fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    fn line(&mut self, from: Pos2, to: Pos2) {
        self.painter.line_segment([from, to], self.stroke());
    }

    fn polyline(&mut self, points: &[Pos2]) {
        if points.len() < 2 {
            return;
        }
        self.painter.add(Shape::line(points.to_vec(), self.stroke()));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.painter.rect_filled(rect, 0.0, self.color);
    }

    fn text(&mut self, pos: Pos2, text: &str) {
        self.painter
            .text(pos, Align2::LEFT_TOP, text, self.font.clone(), self.color);
    }

    fn line_height(&self) -> f32 {
        self.painter
            .layout_no_wrap("Ag".to_owned(), self.font.clone(), self.color)
            .size()
            .y
    }
}
