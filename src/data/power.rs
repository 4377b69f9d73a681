//! Active power of up to three voltage/current channel pairs.

use crate::data::characteristics::{time_average, window_points};
use crate::data::signals::{SignalRef, SignalStore};
use crate::error::{Result, ScopeError};

pub const POWER_CHANNELS: usize = 3;

/// Signal indices (1-based, in store order) of each voltage/current pair.
/// `0` marks an unused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PowerAnalysisSettings {
    pub voltage_indices: [usize; POWER_CHANNELS],
    pub current_indices: [usize; POWER_CHANNELS],
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerResult {
    pub channel: usize,
    pub voltage: SignalRef,
    pub current: SignalRef,
    /// Mean of `u * i` over the interval.
    pub active_power: f64,
}

impl PowerAnalysisSettings {
    pub fn set_pair(&mut self, channel: usize, voltage: usize, current: usize) -> Result<()> {
        if channel >= POWER_CHANNELS {
            return Err(ScopeError::OutOfRange {
                index: channel,
                maximum: Some(POWER_CHANNELS - 1),
            });
        }
        self.voltage_indices[channel] = voltage;
        self.current_indices[channel] = current;
        Ok(())
    }

    pub fn active_channels(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..POWER_CHANNELS)
            .map(|c| (c, self.voltage_indices[c], self.current_indices[c]))
            .filter(|(_, u, i)| *u > 0 && *i > 0)
    }
}

fn resolve(store: &SignalStore, index: usize) -> Result<SignalRef> {
    store
        .order()
        .get(index - 1)
        .cloned()
        .ok_or(ScopeError::OutOfRange {
            index,
            maximum: Some(store.len()),
        })
}

/// Mean active power of every configured pair over `[t1, t2]`.
///
/// The product is evaluated on the voltage's sample grid with the current
/// interpolated onto it.
pub fn power_analysis(
    settings: &PowerAnalysisSettings,
    store: &SignalStore,
    t1: f64,
    t2: f64,
) -> Result<Vec<PowerResult>> {
    let mut out = Vec::new();
    for (channel, u_index, i_index) in settings.active_channels() {
        let voltage = resolve(store, u_index)?;
        let current = resolve(store, i_index)?;
        let u = store.series(&voltage)?;
        let i = store.series(&current)?;
        let mut points = window_points(u, t1, t2)?;
        for p in &mut points {
            p[1] *= i.interpolate(p[0])?;
        }
        out.push(PowerResult {
            channel,
            voltage,
            current,
            active_power: time_average(&points, |v| v),
        });
    }
    Ok(out)
}
