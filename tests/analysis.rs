use wavescope::data::characteristics::characteristics;
use wavescope::data::export::save_csv;
use wavescope::data::power::{power_analysis, PowerAnalysisSettings};
use wavescope::{FixedStepSeries, SampleBuffer, SignalStore};

fn sine_store() -> SignalStore {
    let n = 1000;
    let w = 2.0 * std::f64::consts::PI;
    let u: Vec<f64> = (0..=n).map(|i| 10.0 * (w * i as f64 / n as f64).sin()).collect();
    // current lags by 60 degrees
    let i: Vec<f64> = (0..=n)
        .map(|k| 2.0 * (w * k as f64 / n as f64 - std::f64::consts::FRAC_PI_3).sin())
        .collect();
    let mut store = SignalStore::new();
    store.insert("u", FixedStepSeries::from_values(0.0, 1.0 / n as f64, u).unwrap());
    store.insert("i", FixedStepSeries::from_values(0.0, 1.0 / n as f64, i).unwrap());
    store
}

#[test]
fn active_power_of_phase_shifted_sine() {
    let store = sine_store();
    let mut settings = PowerAnalysisSettings::default();
    settings.set_pair(0, 1, 2).unwrap();
    let p = power_analysis(&settings, &store, 0.0, 1.0).unwrap();
    // U * I / 2 * cos(60 deg)
    assert!((p[0].active_power - 5.0).abs() < 1e-3, "{}", p[0].active_power);
}

#[test]
fn characteristics_of_stored_signal() {
    let store = sine_store();
    let c = characteristics(store.series(&"u".into()).unwrap(), 0.0, 1.0).unwrap();
    assert!((c.rms - 10.0 / 2f64.sqrt()).abs() < 1e-2);
    assert!((c.peak_to_peak - 20.0).abs() < 1e-3);
    assert!((c.shape_factor.unwrap() - 1.1107).abs() < 1e-3);
}

#[test]
fn csv_export_writes_snapshot() {
    let mut store = SignalStore::new();
    store.insert("a", SampleBuffer::from_columns(&[0.0, 1.0], &[1.0, 2.0]).unwrap());
    store.take_snapshot().unwrap();
    assert!(store.has_snapshot());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signals.csv");
    save_csv(&path, &store).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, "signal,time,value\na,0.000000000,1\na,1.000000000,2\n");
}
