use egui::{pos2, Color32, Rect};
use wavescope::data::codes::PersistedCode;
use wavescope::render::DrawCommand;
use wavescope::{
    AxisAssignment, AxisMapper, AxisRange, ColorState, ColorStrategy, Curve, CurveKind, LineType,
    PaletteColor, RecordingSurface, SampleBuffer, ScopeError, SignalRef, SignalStore,
};

fn plot_rect() -> Rect {
    Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0))
}

fn store() -> SignalStore {
    let mut store = SignalStore::new();
    store.insert(
        "v",
        SampleBuffer::from_columns(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 10.0, 5.0, 10.0, 0.0]).unwrap(),
    );
    store
}

fn mappers(y_lo: f64, y_hi: f64) -> (AxisMapper, AxisMapper) {
    (
        AxisMapper::horizontal(AxisRange::linear(0.0, 4.0).unwrap(), plot_rect()),
        AxisMapper::vertical(AxisRange::linear(y_lo, y_hi).unwrap(), plot_rect()),
    )
}

#[test]
fn value_curve_axis_cycle() {
    let mut a = AxisAssignment::None;
    let mut seen = Vec::new();
    for _ in 0..4 {
        a = a.advance(false).unwrap();
        seen.push(a);
    }
    assert_eq!(
        seen,
        [AxisAssignment::Y, AxisAssignment::Y2, AxisAssignment::None, AxisAssignment::Y]
    );
}

#[test]
fn signal_curve_axis_cycle() {
    assert_eq!(AxisAssignment::None.advance(true).unwrap(), AxisAssignment::Signal);
    assert_eq!(AxisAssignment::Signal.advance(true).unwrap(), AxisAssignment::None);
}

#[test]
fn illegal_transitions_are_invariant_violations() {
    let err = AxisAssignment::Y.advance(true).unwrap_err();
    assert!(matches!(err, ScopeError::InvariantViolation(_)));
    assert!(err.is_programming_error());
    assert!(AxisAssignment::Signal.advance(false).is_err());
    assert!(AxisAssignment::X.advance(false).is_err());

    let mut curve = Curve::new(SignalRef::new("d"), CurveKind::Signal, 0);
    assert!(curve.set_axis(AxisAssignment::Y).is_err());
    assert_eq!(curve.axis(), AxisAssignment::None);
}

#[test]
fn persisted_codes_are_stable() {
    assert_eq!(AxisAssignment::None.code(), 0);
    assert_eq!(AxisAssignment::Signal.code(), 4);
    assert_eq!(LineType::BarToAxis.code(), 1);
    assert_eq!(PaletteColor::DarkGreen.code(), 12);
    assert_eq!(PaletteColor::from_code(3).unwrap(), PaletteColor::Blue);
    assert!(PaletteColor::from_code(13).is_err());
}

#[test]
fn color_states_clamp_to_valid_channels() {
    let white = Color32::WHITE;
    let black = Color32::BLACK;
    assert_eq!(ColorState::Disabled.apply(white), Color32::from_rgb(240, 240, 240));
    assert_eq!(ColorState::Disabled.apply(black), Color32::from_rgb(189, 189, 189));
    assert_eq!(ColorState::Selected.apply(white), white);
    assert_eq!(ColorState::Selected.apply(Color32::from_rgb(255, 0, 0)), Color32::from_rgb(85, 85, 85));
    assert_eq!(ColorState::Normal.apply(Color32::from_rgb(1, 2, 3)), Color32::from_rgb(1, 2, 3));
    // selection wins over disabled
    assert_eq!(ColorState::resolve(true, false), ColorState::Selected);
    assert_eq!(ColorState::resolve(false, false), ColorState::Disabled);
}

#[test]
fn connected_curve_draws_one_polyline() {
    let mut curve = Curve::new(SignalRef::new("v"), CurveKind::Regular, 0);
    curve.set_axis(AxisAssignment::Y).unwrap();
    let (x, y) = mappers(0.0, 10.0);
    let mut surface = RecordingSurface::default();
    curve.draw(&store(), &x, &y, &mut surface).unwrap();

    let lines: Vec<&[egui::Pos2]> = surface.polylines().collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(
        lines[0],
        &[pos2(0.0, 100.0), pos2(25.0, 0.0), pos2(50.0, 50.0), pos2(75.0, 0.0), pos2(100.0, 100.0)]
    );
    assert_eq!(surface.colors().next(), Some(PaletteColor::alloc(0).color32()));
}

#[test]
fn bar_curve_draws_to_baseline() {
    let mut curve = Curve::new(SignalRef::new("v"), CurveKind::Regular, 1);
    curve.set_axis(AxisAssignment::Y).unwrap();
    curve.set_line_type(LineType::BarToAxis);
    let (x, y) = mappers(-10.0, 10.0);
    let mut surface = RecordingSurface::default();
    curve.draw(&store(), &x, &y, &mut surface).unwrap();

    let bars: Vec<_> = surface.lines().collect();
    assert_eq!(bars.len(), 5);
    assert!(bars.iter().all(|(_, to)| to.y == 50.0));
    assert_eq!(bars[1].0, pos2(25.0, 0.0));
}

#[test]
fn hidden_curve_draws_nothing() {
    let curve = Curve::new(SignalRef::new("v"), CurveKind::Regular, 0);
    let (x, y) = mappers(0.0, 10.0);
    let mut surface = RecordingSurface::default();
    curve.draw(&store(), &x, &y, &mut surface).unwrap();
    assert!(surface.commands.is_empty());
}

#[test]
fn signal_curve_draws_steps() {
    let mut store = SignalStore::new();
    store.insert("d", SampleBuffer::from_columns(&[0.0, 2.0, 4.0], &[0.0, 1.0, 0.0]).unwrap());
    let mut curve = Curve::new(SignalRef::new("d"), CurveKind::Signal, 0);
    curve.advance_axis().unwrap();
    assert_eq!(curve.axis(), AxisAssignment::Signal);
    let (x, y) = mappers(0.0, 1.0);
    let mut surface = RecordingSurface::default();
    curve.draw(&store, &x, &y, &mut surface).unwrap();

    let steps: Vec<&[egui::Pos2]> = surface.polylines().collect();
    assert_eq!(
        steps[0],
        &[pos2(0.0, 100.0), pos2(50.0, 100.0), pos2(50.0, 0.0), pos2(100.0, 0.0), pos2(100.0, 100.0)]
    );
}

#[test]
fn disabled_selected_curve_renders_grey() {
    let mut curve = Curve::new(SignalRef::new("v"), CurveKind::Regular, 0);
    curve.set_axis(AxisAssignment::Y2).unwrap();
    curve.set_enabled(false);
    curve.set_selected(true);
    let (x, y) = mappers(0.0, 10.0);
    let mut surface = RecordingSurface::default();
    curve.draw(&store(), &x, &y, &mut surface).unwrap();
    // red (255, 0, 0) averaged
    assert_eq!(surface.colors().next(), Some(Color32::from_rgb(85, 85, 85)));
    assert_eq!(curve.label_text(), "v (Y2)");
}

#[test]
fn unknown_signal_is_reported() {
    let mut curve = Curve::new(SignalRef::new("missing"), CurveKind::Regular, 0);
    curve.set_axis(AxisAssignment::Y).unwrap();
    let (x, y) = mappers(0.0, 10.0);
    let mut surface = RecordingSurface::default();
    assert!(curve.draw(&store(), &x, &y, &mut surface).is_err());
    assert!(!surface.commands.iter().any(|c| matches!(c, DrawCommand::Polyline(_))));
}

#[test]
fn value_curve_rejects_x_axis() {
    let mut curve = Curve::new(SignalRef::new("v"), CurveKind::Regular, 0);
    let err = curve.set_axis(AxisAssignment::X).unwrap_err();
    assert!(matches!(err, ScopeError::InvariantViolation(_)));
    assert_eq!(curve.axis(), AxisAssignment::None);

    // a settings value restored as X is neither drawn nor labelled
    curve.settings.axis = AxisAssignment::X;
    assert!(!curve.axis().is_active());
    let (x, y) = mappers(0.0, 10.0);
    let mut surface = RecordingSurface::default();
    curve.draw(&store(), &x, &y, &mut surface).unwrap();
    assert!(surface.commands.is_empty());
}
