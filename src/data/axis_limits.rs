//! Axis limit bookkeeping: autoscale, zoom with undo history, saved and
//! user-defined limits.

use serde::{Deserialize, Serialize};

use crate::data::axis::{AxisRange, AxisScale};
use crate::data::hilo::HiLo;
use crate::error::{Result, ScopeError};

const DEFAULT_MAX_TICKS: usize = 10;

/// Which source of limits is currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Clipping {
    #[default]
    GlobalAuto,
    LocalAuto,
    Zoomed,
}

/// "Nice" axis limits with round tick spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NiceScale {
    pub lo: f64,
    pub hi: f64,
    pub tick_spacing: f64,
}

impl NiceScale {
    pub fn new(range: HiLo, max_ticks: usize) -> Self {
        let range = range.widened();
        let span = nice_num(range.span(), false);
        let tick_spacing = nice_num(span / (max_ticks.max(2) - 1) as f64, true);
        Self {
            lo: (range.lo / tick_spacing).floor() * tick_spacing,
            hi: (range.hi / tick_spacing).ceil() * tick_spacing,
            tick_spacing,
        }
    }

    pub fn limits(&self) -> HiLo {
        HiLo::new(self.lo, self.hi)
    }

    /// Major tick positions from `lo` to `hi`.
    pub fn ticks(&self) -> Vec<f64> {
        let count = ((self.hi - self.lo) / self.tick_spacing).round() as usize;
        (0..=count)
            .map(|i| self.lo + i as f64 * self.tick_spacing)
            .collect()
    }
}

fn nice_num(x: f64, round: bool) -> f64 {
    let exponent = x.log10().floor();
    let fraction = x / 10f64.powf(exponent);
    let nice = if round {
        match fraction {
            f if f < 1.5 => 1.0,
            f if f < 3.0 => 2.0,
            f if f < 7.0 => 5.0,
            _ => 10.0,
        }
    } else {
        match fraction {
            f if f <= 1.0 => 1.0,
            f if f <= 2.0 => 2.0,
            f if f <= 5.0 => 5.0,
            _ => 10.0,
        }
    };
    nice * 10f64.powf(exponent)
}

#[derive(Debug, Clone)]
pub struct AxisLimits {
    pub(crate) scale: AxisScale,
    auto_global: HiLo,
    auto_local: Option<HiLo>,
    clipping: Clipping,
    saved: Option<HiLo>,
    zoomed: HiLo,
    pub(crate) value_scale_local: HiLo,
    pub(crate) user_scale: Option<HiLo>,
    pub(crate) auto_enabled: bool,
    nice_scale: bool,
    pub(crate) common_zero: bool,
    history: Vec<HiLo>,
}

impl Default for AxisLimits {
    fn default() -> Self {
        Self {
            scale: AxisScale::Lin,
            auto_global: HiLo::new(0.0, 1.0),
            auto_local: None,
            clipping: Clipping::GlobalAuto,
            saved: None,
            zoomed: HiLo::new(0.0, 1.0),
            value_scale_local: HiLo::new(0.0, 1.0),
            user_scale: None,
            auto_enabled: true,
            nice_scale: false,
            common_zero: false,
            history: Vec::new(),
        }
    }
}

impl AxisLimits {
    pub fn scale(&self) -> AxisScale {
        self.scale
    }

    pub fn set_scale(&mut self, scale: AxisScale) {
        self.scale = scale;
    }

    pub fn clipping(&self) -> Clipping {
        self.clipping
    }

    pub fn is_auto_enabled(&self) -> bool {
        self.auto_enabled
    }

    /// Switching autoscale off freezes the user scale, or the current view
    /// when no user scale was set.
    pub fn set_auto_enabled(&mut self, value: bool) {
        if !value {
            self.value_scale_local = self.user_scale.unwrap_or_else(|| self.limits());
        }
        self.auto_enabled = value;
    }

    pub fn is_nice_scale(&self) -> bool {
        self.nice_scale
    }

    pub fn set_nice_scale(&mut self, value: bool) {
        self.nice_scale = value;
    }

    pub fn is_common_zero(&self) -> bool {
        self.common_zero
    }

    pub fn set_common_zero(&mut self, value: bool) {
        self.common_zero = value;
    }

    fn nice(&self, hilo: HiLo) -> HiLo {
        if self.nice_scale && self.scale == AxisScale::Lin {
            NiceScale::new(hilo, DEFAULT_MAX_TICKS).limits()
        } else {
            hilo
        }
    }

    /// Limits currently on display.
    pub fn limits(&self) -> HiLo {
        if !self.auto_enabled {
            return self.value_scale_local;
        }
        match self.clipping {
            Clipping::GlobalAuto => self.nice(self.auto_global),
            Clipping::LocalAuto => self.nice(self.auto_local.unwrap_or(self.auto_global)),
            Clipping::Zoomed => self.zoomed,
        }
    }

    /// Displayed limits as a mappable range (zero-width limits are widened).
    pub fn range(&self) -> Result<AxisRange> {
        AxisRange::from_hilo(self.limits().widened(), self.scale)
    }

    /// Range used for drawing. Limits that cannot be mapped, such as a
    /// logarithmic axis without positive data, fall back to [`AxisRange::unit`].
    pub fn display_range(&self) -> AxisRange {
        self.range().unwrap_or_else(|e| {
            log::debug!("axis limits not drawable ({e}), using unit range");
            AxisRange::unit(self.scale)
        })
    }

    pub fn auto_scale_global(&self) -> HiLo {
        self.auto_global
    }

    /// Store new autoscale limits without switching the view to them.
    pub fn set_global_autoscale(&mut self, hilo: HiLo) -> Result<()> {
        if !hilo.is_valid() {
            return Err(ScopeError::domain(format!(
                "autoscale limits [{}, {}] are not valid",
                hilo.lo, hilo.hi
            )));
        }
        self.auto_global = if self.common_zero { hilo.symmetric() } else { hilo };
        Ok(())
    }

    pub fn set_local_autoscale(&mut self, hilo: HiLo) {
        self.auto_local = Some(hilo);
    }

    pub fn global_fit(&mut self) {
        self.value_scale_local = self.auto_global;
        self.clipping = Clipping::GlobalAuto;
    }

    pub fn local_fit(&mut self) {
        self.clipping = Clipping::LocalAuto;
    }

    fn push_history(&mut self) {
        let current = self.limits();
        if self.history.last() != Some(&current) {
            self.history.push(current);
        }
    }

    pub fn set_zoom(&mut self, hilo: HiLo) -> Result<()> {
        if !hilo.is_valid() || !(hilo.span() > 0.0) {
            return Err(ScopeError::domain(format!(
                "cannot zoom to [{}, {}]",
                hilo.lo, hilo.hi
            )));
        }
        self.push_history();
        self.zoomed = self.nice(hilo);
        self.value_scale_local = self.zoomed;
        self.clipping = Clipping::Zoomed;
        Ok(())
    }

    /// Restore the limits shown before the last zoom. Returns false when
    /// there is nothing to undo.
    pub fn zoom_back(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.zoomed = previous;
                self.value_scale_local = previous;
                self.clipping = Clipping::Zoomed;
                true
            }
            None => false,
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn save_values(&mut self) {
        self.saved = Some(self.limits());
    }

    pub fn load_saved(&mut self) -> bool {
        let Some(saved) = self.saved else {
            return false;
        };
        self.push_history();
        self.zoomed = saved;
        self.value_scale_local = saved;
        self.clipping = Clipping::Zoomed;
        true
    }

    /// Manual limits used while autoscale is disabled. `lo` must be below `hi`.
    pub fn set_user_scale(&mut self, hilo: HiLo) -> Result<()> {
        if !hilo.is_valid() || !(hilo.span() > 0.0) {
            return Err(ScopeError::domain(format!(
                "user scale [{}, {}] is not valid",
                hilo.lo, hilo.hi
            )));
        }
        self.value_scale_local = hilo;
        self.user_scale = Some(hilo);
        Ok(())
    }

    pub fn user_scale(&self) -> Option<HiLo> {
        self.user_scale
    }
}
