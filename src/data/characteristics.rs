//! Summary values of a signal over a time interval.
//!
//! All averages are time-weighted with the trapezoid rule, so irregular
//! sampling (adaptive solver steps) does not bias the result.

use crate::data::time_series::TimeSeries;
use crate::error::{Result, ScopeError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Characteristics {
    pub average: f64,
    pub rms: f64,
    pub min: f64,
    pub max: f64,
    pub peak_to_peak: f64,
    /// RMS of the alternating part over the (signed) average; `None` for
    /// zero mean.
    pub ripple: Option<f64>,
    /// RMS relative to the rectified mean; `None` for an all-zero signal.
    pub shape_factor: Option<f64>,
    /// Total harmonic distortion: RMS of the harmonics above the
    /// fundamental over the fundamental's RMS. The fundamental has the
    /// period `t2 - t1`. `None` without a fundamental.
    pub thd: Option<f64>,
    /// Distortion factor: RMS of the harmonics over the total RMS.
    pub klirr: Option<f64>,
}

/// Samples of `series` inside `[t1, t2]`, with interpolated end points.
pub(crate) fn window_points(series: &dyn TimeSeries, t1: f64, t2: f64) -> Result<Vec<[f64; 2]>> {
    if !(t1.is_finite() && t2.is_finite()) || t2 <= t1 {
        return Err(ScopeError::domain(format!("empty time interval [{t1}, {t2}]")));
    }
    if series.is_empty() {
        return Err(ScopeError::EmptySeries);
    }
    let mut points = vec![[t1, series.interpolate(t1)?]];
    let first = series.find_time_index(t1)?;
    for i in first..series.len() {
        let t = series.time_at(i);
        if t >= t2 {
            break;
        }
        if t > t1 {
            points.push([t, series.value_at(i)]);
        }
    }
    points.push([t2, series.interpolate(t2)?]);
    Ok(points)
}

/// Time average of `f(value)` over the points, trapezoid rule.
pub(crate) fn time_average(points: &[[f64; 2]], f: impl Fn(f64) -> f64) -> f64 {
    time_average_at(points, |_, v| f(v))
}

/// Like [`time_average`], for integrands that also depend on the time.
fn time_average_at(points: &[[f64; 2]], f: impl Fn(f64, f64) -> f64) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    let duration = last[0] - first[0];
    if duration <= 0.0 {
        return f(first[0], first[1]);
    }
    let area: f64 = points
        .windows(2)
        .map(|w| (w[1][0] - w[0][0]) * (f(w[0][0], w[0][1]) + f(w[1][0], w[1][1])) * 0.5)
        .sum();
    area / duration
}

/// Mean square of the fundamental, `(a1^2 + b1^2) / 2`, for the base
/// period spanned by the points.
fn fundamental_mean_square(points: &[[f64; 2]]) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    let t0 = first[0];
    let omega = 2.0 * std::f64::consts::PI / (last[0] - t0);
    let a1 = 2.0 * time_average_at(points, |t, v| v * (omega * (t - t0)).cos());
    let b1 = 2.0 * time_average_at(points, |t, v| v * (omega * (t - t0)).sin());
    (a1 * a1 + b1 * b1) / 2.0
}

pub fn characteristics(series: &dyn TimeSeries, t1: f64, t2: f64) -> Result<Characteristics> {
    let points = window_points(series, t1, t2)?;
    let average = time_average(&points, |v| v);
    let rms = time_average(&points, |v| v * v).sqrt();
    let rectified = time_average(&points, f64::abs);
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p[1]), hi.max(p[1])));
    let peak_to_peak = max - min;

    let mean_square = rms * rms;
    let alternating = (mean_square - average * average).max(0.0).sqrt();
    let fundamental = fundamental_mean_square(&points);
    // rounding can push the remainder slightly below zero
    let harmonics = (mean_square - fundamental - average * average).max(0.0).sqrt();
    Ok(Characteristics {
        average,
        rms,
        min,
        max,
        peak_to_peak,
        ripple: (average != 0.0).then(|| alternating / average),
        shape_factor: (rectified > 0.0).then(|| rms / rectified),
        thd: (fundamental > 0.0).then(|| harmonics / fundamental.sqrt()),
        klirr: (rms > 0.0).then(|| harmonics / rms),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::time_series::{FixedStepSeries, SampleBuffer};

    #[test]
    fn constant_signal() {
        let s = FixedStepSeries::from_values(0.0, 1.0, vec![2.0; 11]).unwrap();
        let c = characteristics(&s, 0.0, 10.0).unwrap();
        assert!((c.average - 2.0).abs() < 1e-12);
        assert!((c.rms - 2.0).abs() < 1e-12);
        assert_eq!(c.peak_to_peak, 0.0);
        assert_eq!(c.ripple, Some(0.0));
        assert!((c.shape_factor.unwrap() - 1.0).abs() < 1e-12);
        assert!(c.thd.is_none() || c.thd.unwrap().abs() < 1e-6);
        assert!(c.klirr.unwrap().abs() < 1e-6);
    }

    #[test]
    fn ripple_is_alternating_rms_over_mean() {
        let s = FixedStepSeries::from_values(0.0, 1.0, vec![1.0, 3.0, 1.0, 3.0, 1.0]).unwrap();
        let c = characteristics(&s, 0.0, 4.0).unwrap();
        assert!((c.average - 2.0).abs() < 1e-12);
        assert!((c.ripple.unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(c.peak_to_peak, 2.0);

        // the sign follows the average
        let s = FixedStepSeries::from_values(0.0, 1.0, vec![-1.0, -3.0, -1.0, -3.0, -1.0]).unwrap();
        let c = characteristics(&s, 0.0, 4.0).unwrap();
        assert!((c.ripple.unwrap() + 0.5).abs() < 1e-12);
    }

    #[test]
    fn third_harmonic_distortion() {
        use std::f64::consts::PI;
        let n = 1000;
        let values = (0..=n)
            .map(|i| {
                let wt = 2.0 * PI * i as f64 / n as f64;
                wt.sin() + 0.1 * (3.0 * wt).sin()
            })
            .collect();
        let s = FixedStepSeries::from_values(0.0, 1.0 / n as f64, values).unwrap();
        let c = characteristics(&s, 0.0, 1.0).unwrap();
        assert!((c.thd.unwrap() - 0.1).abs() < 1e-6);
        let expected_klirr = 0.1 / (1.0f64 + 0.01).sqrt();
        assert!((c.klirr.unwrap() - expected_klirr).abs() < 1e-6);
    }

    #[test]
    fn pure_sine_has_no_distortion() {
        let n = 1000;
        let values = (0..=n)
            .map(|i| 3.0 * (2.0 * std::f64::consts::PI * i as f64 / n as f64).cos())
            .collect();
        let s = FixedStepSeries::from_values(0.0, 1.0 / n as f64, values).unwrap();
        let c = characteristics(&s, 0.0, 1.0).unwrap();
        assert!(c.thd.unwrap() < 1e-4);
        assert!(c.klirr.unwrap() < 1e-4);
    }

    #[test]
    fn sine_rms() {
        let n = 2000;
        let values = (0..=n)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / n as f64).sin())
            .collect();
        let s = FixedStepSeries::from_values(0.0, 1.0 / n as f64, values).unwrap();
        let c = characteristics(&s, 0.0, 1.0).unwrap();
        assert!(c.average.abs() < 1e-9);
        assert!((c.rms - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-3);
        assert_eq!(c.ripple.is_some(), c.average != 0.0);
    }

    #[test]
    fn irregular_steps_are_time_weighted() {
        // 0 for one second, then 1 for nine seconds (with a 0.001 s edge)
        let s = SampleBuffer::from_columns(&[0.0, 1.0, 1.001, 10.0], &[0.0, 0.0, 1.0, 1.0]).unwrap();
        let c = characteristics(&s, 0.0, 10.0).unwrap();
        assert!((c.average - 0.89995).abs() < 1e-6);
    }

    #[test]
    fn interpolated_window_edges() {
        let s = SampleBuffer::from_columns(&[0.0, 10.0], &[0.0, 10.0]).unwrap();
        let c = characteristics(&s, 2.0, 4.0).unwrap();
        assert!((c.min - 2.0).abs() < 1e-12);
        assert!((c.max - 4.0).abs() < 1e-12);
        assert!((c.average - 3.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_empty_interval() {
        let s = SampleBuffer::from_columns(&[0.0, 1.0], &[0.0, 1.0]).unwrap();
        assert!(characteristics(&s, 1.0, 1.0).is_err());
    }
}
