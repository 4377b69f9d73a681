//! Time series storage and time-to-index lookup.
//!
//! A series is an ordered run of `(time, value)` samples with indices
//! `0..=maximum_index`. Times never decrease, but spacing may be irregular
//! or zero. Writers only append (or rewrite existing samples), and a sample
//! is fully stored before the series length grows, so a reader holding a
//! shared borrow never sees an index without its value.

use crate::data::hilo::HiLo;
use crate::error::{Result, ScopeError};

/// Half-width of the window scanned around the estimated index before the
/// lookup falls back to a binary search.
pub const FIND_OVER_STEP: usize = 8;

pub trait TimeSeries: Send + Sync {
    /// Number of valid samples.
    fn len(&self) -> usize;

    /// Time of sample `index`. `index` must be below `len()`.
    fn time_at(&self, index: usize) -> f64;

    /// Value of sample `index`. `index` must be below `len()`.
    fn value_at(&self, index: usize) -> f64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest index holding valid data, `None` while the series is empty.
    fn maximum_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(ScopeError::OutOfRange {
                index,
                maximum: self.maximum_index(),
            })
        }
    }

    fn time(&self, index: usize) -> Result<f64> {
        self.check_index(index)?;
        Ok(self.time_at(index))
    }

    fn value(&self, index: usize) -> Result<f64> {
        self.check_index(index)?;
        Ok(self.value_at(index))
    }

    fn sample(&self, index: usize) -> Result<[f64; 2]> {
        self.check_index(index)?;
        Ok([self.time_at(index), self.value_at(index)])
    }

    /// `time[max] - time[max - 1]`, the spacing used to estimate indices.
    fn last_time_interval(&self) -> Option<f64> {
        let max = self.maximum_index()?;
        if max == 0 {
            return None;
        }
        Some(self.time_at(max) - self.time_at(max - 1))
    }

    /// Index `i` with `time[i] <= time < time[i + 1]`.
    ///
    /// Times before the first sample give `0`, times at or after the last
    /// sample give `maximum_index`. The index is first estimated from the
    /// last sample interval, corrected within a window of
    /// [`FIND_OVER_STEP`] samples, and only then searched by bisection.
    fn find_time_index(&self, time: f64) -> Result<usize> {
        let max = self.maximum_index().ok_or(ScopeError::EmptySeries)?;
        if time.is_nan() {
            return Err(ScopeError::domain("cannot look up a NaN time"));
        }
        let first = self.time_at(0);
        if time < first {
            return Ok(0);
        }
        if time >= self.time_at(max) {
            return Ok(max);
        }

        let brackets = |i: usize| self.time_at(i) <= time && time < self.time_at(i + 1);

        if let Some(dt) = self
            .last_time_interval()
            .filter(|dt| *dt > 0.0 && dt.is_finite())
        {
            let estimate = ((time - first) / dt).floor();
            // saturating float->int cast keeps huge estimates at usize::MAX
            let estimate = (estimate.max(0.0) as usize).min(max - 1);
            let lo = estimate.saturating_sub(FIND_OVER_STEP);
            let hi = estimate.saturating_add(FIND_OVER_STEP).min(max - 1);
            if let Some(found) = (lo..=hi).find(|&i| brackets(i)) {
                return Ok(found);
            }
        }

        // invariant: time[lo] <= time < time[hi]
        let (mut lo, mut hi) = (0usize, max);
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.time_at(mid) <= time {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }

    /// Exhaustive scan with the same contract as [`TimeSeries::find_time_index`].
    fn find_time_index_linear(&self, time: f64) -> Result<usize> {
        if self.is_empty() {
            return Err(ScopeError::EmptySeries);
        }
        if time.is_nan() {
            return Err(ScopeError::domain("cannot look up a NaN time"));
        }
        let count = (0..self.len())
            .take_while(|&i| self.time_at(i) <= time)
            .count();
        Ok(count.saturating_sub(1))
    }

    /// Linearly interpolated value at `time`, held constant outside the
    /// series' time span.
    fn interpolate(&self, time: f64) -> Result<f64> {
        let i = self.find_time_index(time)?;
        let max = self.len() - 1;
        if i == max || time <= self.time_at(i) {
            return Ok(self.value_at(i));
        }
        let (t0, t1) = (self.time_at(i), self.time_at(i + 1));
        let (v0, v1) = (self.value_at(i), self.value_at(i + 1));
        if t1 > t0 {
            Ok(v0 + (v1 - v0) * (time - t0) / (t1 - t0))
        } else {
            Ok(v1)
        }
    }

    /// Inclusive index window covering `[t_lo, t_hi]`, extended by one sample
    /// on the right so that lines leave the visible area cleanly.
    fn index_window(&self, t_lo: f64, t_hi: f64) -> Result<(usize, usize)> {
        let max = self.maximum_index().ok_or(ScopeError::EmptySeries)?;
        let start = self.find_time_index(t_lo)?;
        let stop = (self.find_time_index(t_hi)? + 1).min(max);
        Ok((start, stop.max(start)))
    }

    /// Value range over all samples.
    fn value_range(&self) -> Option<HiLo> {
        HiLo::from_values((0..self.len()).map(|i| self.value_at(i)))
    }

    /// Value range over the samples whose time lies in `[t_lo, t_hi]`.
    fn value_range_between(&self, t_lo: f64, t_hi: f64) -> Option<HiLo> {
        HiLo::from_values(
            (0..self.len())
                .filter(|&i| {
                    let t = self.time_at(i);
                    t >= t_lo && t <= t_hi
                })
                .map(|i| self.value_at(i)),
        )
    }

    /// Time range covered by the series.
    fn time_range(&self) -> Option<HiLo> {
        let max = self.maximum_index()?;
        Some(HiLo::new(self.time_at(0), self.time_at(max)))
    }
}

/// Iterate `[time, value]` pairs of `series` in `range`.
pub fn samples(
    series: &dyn TimeSeries,
    range: std::ops::Range<usize>,
) -> impl Iterator<Item = [f64; 2]> + '_ {
    let end = range.end.min(series.len());
    (range.start..end).map(move |i| [series.time_at(i), series.value_at(i)])
}

/// Growable series with explicit (possibly irregular) sample times.
#[derive(Debug, Clone, Default)]
pub struct SampleBuffer {
    points: Vec<[f64; 2]>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn from_points(points: Vec<[f64; 2]>) -> Result<Self> {
        let mut buffer = Self::with_capacity(points.len());
        for [t, v] in points {
            buffer.push(t, v)?;
        }
        Ok(buffer)
    }

    pub fn from_columns(times: &[f64], values: &[f64]) -> Result<Self> {
        if times.len() != values.len() {
            return Err(ScopeError::LengthMismatch {
                expected: times.len(),
                actual: values.len(),
            });
        }
        Self::from_points(times.iter().zip(values).map(|(t, v)| [*t, *v]).collect())
    }

    /// Append a sample and return its index.
    pub fn push(&mut self, time: f64, value: f64) -> Result<usize> {
        let index = self.points.len();
        self.check_time(index, time)?;
        self.points.push([time, value]);
        Ok(index)
    }

    /// Write sample `index`. `index == len()` appends; smaller indices are
    /// rewritten in place; anything beyond the next slot is a gap.
    pub fn set_value(&mut self, index: usize, time: f64, value: f64) -> Result<()> {
        let next = self.points.len();
        if index > next {
            return Err(ScopeError::SequenceGap { index, next });
        }
        if index == next {
            return self.push(time, value).map(|_| ());
        }
        self.check_time(index, time)?;
        if let Some(after) = self.points.get(index + 1) {
            if time > after[0] {
                return Err(ScopeError::NonMonotonicTime {
                    index: index + 1,
                    time: after[0],
                    previous: time,
                });
            }
        }
        self.points[index] = [time, value];
        Ok(())
    }

    fn check_time(&self, index: usize, time: f64) -> Result<()> {
        if !time.is_finite() {
            return Err(ScopeError::domain(format!("non-finite sample time {time}")));
        }
        if let Some(prev) = index.checked_sub(1).and_then(|i| self.points.get(i)) {
            if time < prev[0] {
                return Err(ScopeError::NonMonotonicTime {
                    index,
                    time,
                    previous: prev[0],
                });
            }
        }
        Ok(())
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl TimeSeries for SampleBuffer {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn time_at(&self, index: usize) -> f64 {
        self.points[index][0]
    }

    fn value_at(&self, index: usize) -> f64 {
        self.points[index][1]
    }
}

/// Fixed-step series: `time[i] = start + i * dt`.
#[derive(Debug, Clone)]
pub struct FixedStepSeries {
    start: f64,
    dt: f64,
    values: Vec<f64>,
}

impl FixedStepSeries {
    pub fn new(start: f64, dt: f64) -> Result<Self> {
        if !start.is_finite() || !dt.is_finite() || dt < 0.0 {
            return Err(ScopeError::domain(format!(
                "invalid fixed step series start={start} dt={dt}"
            )));
        }
        Ok(Self {
            start,
            dt,
            values: Vec::new(),
        })
    }

    pub fn from_values(start: f64, dt: f64, values: Vec<f64>) -> Result<Self> {
        let mut series = Self::new(start, dt)?;
        series.values = values;
        Ok(series)
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn push(&mut self, value: f64) -> usize {
        self.values.push(value);
        self.values.len() - 1
    }

    pub fn set_value(&mut self, index: usize, value: f64) -> Result<()> {
        let next = self.values.len();
        match index {
            i if i < next => self.values[i] = value,
            i if i == next => self.values.push(value),
            _ => return Err(ScopeError::SequenceGap { index, next }),
        }
        Ok(())
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl TimeSeries for FixedStepSeries {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn time_at(&self, index: usize) -> f64 {
        self.start + self.dt * index as f64
    }

    fn value_at(&self, index: usize) -> f64 {
        self.values[index]
    }

    fn last_time_interval(&self) -> Option<f64> {
        (self.values.len() > 1).then_some(self.dt)
    }
}
