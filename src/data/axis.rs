//! Axis ranges and value <-> pixel mapping.
//!
//! Screen coordinates use a top-left origin. Horizontal axes grow to the
//! right from the left edge of their rect, vertical axes grow upwards from
//! the bottom edge, so `lo` always sits at the axis origin.

use egui::Rect;
use serde::{Deserialize, Serialize};

use crate::data::codes::PersistedCode;
use crate::data::hilo::HiLo;
use crate::error::{Result, ScopeError};

/// Lower bound of a clamped logarithmic range, relative to its upper bound.
const LOG_CLAMP_RATIO: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisScale {
    #[default]
    Lin,
    Log,
}

impl PersistedCode for AxisScale {
    const KIND: &'static str = "axis scale";
    const TABLE: &'static [(Self, i64)] = &[(AxisScale::Lin, 0), (AxisScale::Log, 1)];
}

impl AxisScale {
    fn forward(self, v: f64) -> Result<f64> {
        match self {
            AxisScale::Lin => Ok(v),
            AxisScale::Log if v > 0.0 => Ok(v.log10()),
            AxisScale::Log => Err(ScopeError::domain(format!(
                "value {v} cannot be shown on a logarithmic axis"
            ))),
        }
    }

    fn backward(self, x: f64) -> f64 {
        match self {
            AxisScale::Lin => x,
            AxisScale::Log => 10f64.powf(x),
        }
    }
}

/// Visible physical bounds of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    lo: f64,
    hi: f64,
    scale: AxisScale,
}

impl Default for AxisRange {
    fn default() -> Self {
        Self {
            lo: 0.0,
            hi: 1.0,
            scale: AxisScale::Lin,
        }
    }
}

impl AxisRange {
    pub fn new(lo: f64, hi: f64, scale: AxisScale) -> Result<Self> {
        if !lo.is_finite() || !hi.is_finite() || hi < lo {
            return Err(ScopeError::domain(format!("invalid axis range [{lo}, {hi}]")));
        }
        if scale == AxisScale::Log && lo <= 0.0 {
            return Err(ScopeError::domain(format!(
                "logarithmic axis needs a positive lower bound, got {lo}"
            )));
        }
        Ok(Self { lo, hi, scale })
    }

    pub fn linear(lo: f64, hi: f64) -> Result<Self> {
        Self::new(lo, hi, AxisScale::Lin)
    }

    /// Range shown when the data gives none: `[0, 1]` linear, `[1, 10]`
    /// logarithmic.
    pub fn unit(scale: AxisScale) -> Self {
        match scale {
            AxisScale::Lin => Self::default(),
            AxisScale::Log => Self { lo: 1.0, hi: 10.0, scale },
        }
    }

    /// Build a range from autoscale data. Logarithmic ranges drop the
    /// non-positive part of the interval.
    pub fn from_hilo(hilo: HiLo, scale: AxisScale) -> Result<Self> {
        match scale {
            AxisScale::Lin => Self::new(hilo.lo, hilo.hi, scale),
            AxisScale::Log => {
                if !(hilo.hi > 0.0) {
                    return Err(ScopeError::domain(format!(
                        "no positive values for logarithmic range [{}, {}]",
                        hilo.lo, hilo.hi
                    )));
                }
                let lo = if hilo.lo > 0.0 { hilo.lo } else { hilo.hi * LOG_CLAMP_RATIO };
                Self::new(lo, hilo.hi, scale)
            }
        }
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn scale(&self) -> AxisScale {
        self.scale
    }

    pub fn hilo(&self) -> HiLo {
        HiLo::new(self.lo, self.hi)
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.lo && v <= self.hi
    }

    /// Value at which bars start: zero if visible, otherwise the nearest bound.
    pub fn baseline(&self) -> f64 {
        match self.scale {
            AxisScale::Lin => 0f64.clamp(self.lo, self.hi),
            AxisScale::Log => self.lo,
        }
    }

    fn transformed(&self) -> Result<(f64, f64)> {
        let lo = self.scale.forward(self.lo)?;
        let hi = self.scale.forward(self.hi)?;
        if !(hi > lo) {
            return Err(ScopeError::domain(format!(
                "axis range [{}, {}] has zero width",
                self.lo, self.hi
            )));
        }
        Ok((lo, hi))
    }
}

/// Offset of `v` from the low end of an axis `extent` pixels long.
pub fn value_to_pixel(v: f64, range: &AxisRange, extent: f64) -> Result<f64> {
    let (lo, hi) = range.transformed()?;
    let x = range.scale.forward(v)?;
    Ok((x - lo) / (hi - lo) * extent)
}

/// Inverse of [`value_to_pixel`].
pub fn pixel_to_value(pixel: f64, range: &AxisRange, extent: f64) -> Result<f64> {
    if !(extent > 0.0) {
        return Err(ScopeError::domain(format!("axis extent {extent} is not positive")));
    }
    let (lo, hi) = range.transformed()?;
    Ok(range.scale.backward(lo + pixel / extent * (hi - lo)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisDirection {
    Horizontal,
    Vertical,
}

/// An axis range laid onto a screen rect.
#[derive(Debug, Clone, Copy)]
pub struct AxisMapper {
    pub range: AxisRange,
    pub direction: AxisDirection,
    origin: f32,
    length: f32,
}

impl AxisMapper {
    pub fn horizontal(range: AxisRange, rect: Rect) -> Self {
        Self {
            range,
            direction: AxisDirection::Horizontal,
            origin: rect.left(),
            length: rect.width(),
        }
    }

    pub fn vertical(range: AxisRange, rect: Rect) -> Self {
        Self {
            range,
            direction: AxisDirection::Vertical,
            origin: rect.bottom(),
            length: rect.height(),
        }
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    /// Screen coordinate of `v` along this axis.
    pub fn to_screen(&self, v: f64) -> Result<f32> {
        let offset = value_to_pixel(v, &self.range, self.length as f64)? as f32;
        Ok(match self.direction {
            AxisDirection::Horizontal => self.origin + offset,
            AxisDirection::Vertical => self.origin - offset,
        })
    }

    pub fn from_screen(&self, px: f32) -> Result<f64> {
        let offset = match self.direction {
            AxisDirection::Horizontal => px - self.origin,
            AxisDirection::Vertical => self.origin - px,
        };
        pixel_to_value(offset as f64, &self.range, self.length as f64)
    }

    /// Screen coordinates of the `lo` and `hi` bounds.
    pub fn bounds_on_screen(&self) -> (f32, f32) {
        match self.direction {
            AxisDirection::Horizontal => (self.origin, self.origin + self.length),
            AxisDirection::Vertical => (self.origin, self.origin - self.length),
        }
    }
}
