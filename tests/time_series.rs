use wavescope::data::time_series::FIND_OVER_STEP;
use wavescope::{FixedStepSeries, SampleBuffer, ScopeError, TimeSeries};

fn irregular() -> SampleBuffer {
    // growing steps, a plateau of equal times and a final short step
    let times = [0.0, 0.1, 0.3, 0.6, 1.0, 1.0, 1.0, 2.5, 4.0, 4.01];
    let values: Vec<f64> = (0..times.len()).map(|i| i as f64).collect();
    SampleBuffer::from_columns(&times, &values).unwrap()
}

fn query_times() -> Vec<f64> {
    let mut t: Vec<f64> = (-20..=450).map(|i| i as f64 * 0.01).collect();
    t.extend([0.1, 0.3, 1.0, 2.5, 4.0, 4.01, 1e9, -1e9, f64::INFINITY, f64::NEG_INFINITY]);
    t
}

#[test]
fn hybrid_search_matches_linear_scan_on_fixed_step() {
    let values: Vec<f64> = (0..100).map(|i| (i as f64).sin()).collect();
    let series = FixedStepSeries::from_values(0.0, 0.05, values).unwrap();
    for t in query_times() {
        assert_eq!(
            series.find_time_index(t).unwrap(),
            series.find_time_index_linear(t).unwrap(),
            "t = {t}"
        );
    }
}

#[test]
fn hybrid_search_matches_linear_scan_on_irregular_steps() {
    let series = irregular();
    for t in query_times() {
        assert_eq!(
            series.find_time_index(t).unwrap(),
            series.find_time_index_linear(t).unwrap(),
            "t = {t}"
        );
    }
}

#[test]
fn estimate_far_off_falls_back_to_bisection() {
    // last step is tiny, so the estimate overshoots by far more than the window
    let mut times: Vec<f64> = (0..200).map(|i| i as f64).collect();
    times.push(199.001);
    let values = vec![0.0; times.len()];
    let series = SampleBuffer::from_columns(&times, &values).unwrap();
    assert!(series.len() > 2 * FIND_OVER_STEP);
    assert_eq!(series.find_time_index(42.5).unwrap(), 42);
    assert_eq!(series.find_time_index(199.0005).unwrap(), 199);
}

#[test]
fn boundaries_and_errors() {
    let series = irregular();
    assert_eq!(series.find_time_index(-1.0).unwrap(), 0);
    assert_eq!(series.find_time_index(4.01).unwrap(), 9);
    assert_eq!(series.find_time_index(100.0).unwrap(), 9);
    assert!(matches!(series.find_time_index(f64::NAN), Err(ScopeError::Domain(_))));

    let empty = SampleBuffer::new();
    assert!(matches!(empty.find_time_index(0.0), Err(ScopeError::EmptySeries)));
    assert!(matches!(empty.time(0), Err(ScopeError::OutOfRange { index: 0, maximum: None })));
}

#[test]
fn single_sample_series() {
    let series = SampleBuffer::from_columns(&[3.0], &[7.0]).unwrap();
    assert_eq!(series.last_time_interval(), None);
    assert_eq!(series.find_time_index(0.0).unwrap(), 0);
    assert_eq!(series.find_time_index(5.0).unwrap(), 0);
    assert_eq!(series.interpolate(5.0).unwrap(), 7.0);
}

#[test]
fn sine_lookup_at_half_step() {
    let values: Vec<f64> = (0..10).map(|i| (i as f64).sin()).collect();
    let series = FixedStepSeries::from_values(0.0, 1.0, values).unwrap();
    assert_eq!(series.find_time_index(4.5).unwrap(), 4);
    let expected = 0.5 * (4f64.sin() + 5f64.sin());
    assert!((series.interpolate(4.5).unwrap() - expected).abs() < 1e-12);
}

#[test]
fn strict_append_rejects_gaps() {
    let mut series = SampleBuffer::new();
    series.set_value(0, 0.0, 1.0).unwrap();
    series.set_value(1, 0.5, 2.0).unwrap();
    assert!(matches!(
        series.set_value(3, 1.0, 3.0),
        Err(ScopeError::SequenceGap { index: 3, next: 2 })
    ));
    // overwrite keeps ordering
    series.set_value(1, 0.25, 4.0).unwrap();
    assert_eq!(series.sample(1).unwrap(), [0.25, 4.0]);
    assert!(matches!(
        series.push(0.1, 0.0),
        Err(ScopeError::NonMonotonicTime { .. })
    ));
    assert_eq!(series.maximum_index(), Some(1));
}

#[test]
fn index_window_extends_one_sample_right() {
    let series = FixedStepSeries::from_values(0.0, 1.0, vec![0.0; 10]).unwrap();
    assert_eq!(series.index_window(2.5, 5.5).unwrap(), (2, 6));
    assert_eq!(series.index_window(-5.0, 50.0).unwrap(), (0, 9));
}
