//! Curve colors: the persisted palette and the state-dependent render color.

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::data::codes::PersistedCode;

/// Named colors that can be stored in settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaletteColor {
    Black,
    Red,
    Green,
    Blue,
    White,
    DarkGray,
    Gray,
    LightGray,
    Magenta,
    Cyan,
    Orange,
    Yellow,
    DarkGreen,
}

impl PersistedCode for PaletteColor {
    const KIND: &'static str = "color";
    const TABLE: &'static [(Self, i64)] = &[
        (PaletteColor::Black, 0),
        (PaletteColor::Red, 1),
        (PaletteColor::Green, 2),
        (PaletteColor::Blue, 3),
        (PaletteColor::White, 4),
        (PaletteColor::DarkGray, 5),
        (PaletteColor::Gray, 6),
        (PaletteColor::LightGray, 7),
        (PaletteColor::Magenta, 8),
        (PaletteColor::Cyan, 9),
        (PaletteColor::Orange, 10),
        (PaletteColor::Yellow, 11),
        (PaletteColor::DarkGreen, 12),
    ];
}

impl PaletteColor {
    pub const ALL: [PaletteColor; 13] = [
        PaletteColor::Black,
        PaletteColor::Red,
        PaletteColor::Green,
        PaletteColor::Blue,
        PaletteColor::White,
        PaletteColor::DarkGray,
        PaletteColor::Gray,
        PaletteColor::LightGray,
        PaletteColor::Magenta,
        PaletteColor::Cyan,
        PaletteColor::Orange,
        PaletteColor::Yellow,
        PaletteColor::DarkGreen,
    ];

    /// Colors handed out to new curves, in order.
    const CURVE_CYCLE: [PaletteColor; 8] = [
        PaletteColor::Red,
        PaletteColor::Blue,
        PaletteColor::DarkGreen,
        PaletteColor::Magenta,
        PaletteColor::Orange,
        PaletteColor::Cyan,
        PaletteColor::Black,
        PaletteColor::Gray,
    ];

    pub fn color32(self) -> Color32 {
        match self {
            PaletteColor::Black => Color32::from_rgb(0, 0, 0),
            PaletteColor::Red => Color32::from_rgb(255, 0, 0),
            PaletteColor::Green => Color32::from_rgb(0, 255, 0),
            PaletteColor::Blue => Color32::from_rgb(0, 0, 255),
            PaletteColor::White => Color32::from_rgb(255, 255, 255),
            PaletteColor::DarkGray => Color32::from_rgb(64, 64, 64),
            PaletteColor::Gray => Color32::from_rgb(128, 128, 128),
            PaletteColor::LightGray => Color32::from_rgb(192, 192, 192),
            PaletteColor::Magenta => Color32::from_rgb(255, 0, 255),
            PaletteColor::Cyan => Color32::from_rgb(0, 255, 255),
            PaletteColor::Orange => Color32::from_rgb(255, 200, 0),
            PaletteColor::Yellow => Color32::from_rgb(255, 255, 0),
            PaletteColor::DarkGreen => Color32::from_rgb(0, 100, 0),
        }
    }

    /// Allocate a distinct color for the curve at `index`.
    pub fn alloc(index: usize) -> PaletteColor {
        Self::CURVE_CYCLE[index % Self::CURVE_CYCLE.len()]
    }
}

/// Maps a base color to the color actually drawn.
pub trait ColorStrategy {
    fn apply(&self, base: Color32) -> Color32;
}

/// Display state of a curve or overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorState {
    #[default]
    Normal,
    /// Greyscale: every channel becomes the channel average.
    Selected,
    /// Washed out towards white.
    Disabled,
}

impl ColorState {
    /// Selection wins over disabled, disabled over normal.
    pub fn resolve(selected: bool, enabled: bool) -> Self {
        if selected {
            ColorState::Selected
        } else if !enabled {
            ColorState::Disabled
        } else {
            ColorState::Normal
        }
    }
}

fn clamp_channel(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

impl ColorStrategy for ColorState {
    fn apply(&self, base: Color32) -> Color32 {
        let [r, g, b, a] = base.to_srgba_unmultiplied();
        match self {
            ColorState::Normal => base,
            ColorState::Selected => {
                let grey = clamp_channel((r as i32 + g as i32 + b as i32) / 3);
                Color32::from_rgba_unmultiplied(grey, grey, grey, a)
            }
            ColorState::Disabled => {
                let wash = |c: u8| clamp_channel(255 - (255 - c as i32) / 5 - 15);
                Color32::from_rgba_unmultiplied(wash(r), wash(g), wash(b), a)
            }
        }
    }
}
