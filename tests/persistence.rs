use egui::Color32;
use wavescope::data::axis_limits::AxisLimits;
use wavescope::data::curve::CurveSettings;
use wavescope::persistence::{
    load_state_from_path, save_state_to_path, state_from_json, ScopeStateSerde, TextSettings, TokenMap,
};
use wavescope::{AxisAssignment, AxisScale, Diagram, DiagramKind, HiLo, LineType, PaletteColor, ScopeData};

fn sample_scope() -> ScopeData {
    let mut scope = ScopeData::new();
    scope.x_label = "time".to_string();
    let mut d = Diagram::new(DiagramKind::Regular).with_name("Currents");
    d.set_weight(0.4).unwrap();
    d.add_curve_on("i1", AxisAssignment::Y).unwrap();
    let i2 = d.add_curve_on("i2", AxisAssignment::Y2).unwrap();
    d.curve_mut(i2).unwrap().set_line_type(LineType::BarToAxis);
    d.curve_mut(i2).unwrap().set_enabled(false);
    d.y2.set_scale(AxisScale::Log);
    d.y2.set_user_scale(HiLo::new(0.1, 100.0)).unwrap();
    d.y2.set_auto_enabled(false);
    let first = scope.add_diagram(d);

    let mut s = Diagram::new(DiagramKind::Signal);
    s.add_curve_on("gate", AxisAssignment::Signal).unwrap();
    scope.add_diagram(s);
    scope.add_trigger(Color32::from_rgb(0, 128, 255), 0.25, first).unwrap();
    scope
}

#[test]
fn json_round_trip_through_file() {
    let scope = sample_scope();
    let state = ScopeStateSerde::from(&scope);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scope.json");
    save_state_to_path(&state, &path).unwrap();

    let loaded = load_state_from_path(&path).unwrap();
    assert_eq!(loaded, state);

    let restored = loaded.into_scope().unwrap();
    assert_eq!(restored.x_label, "time");
    assert_eq!(restored.diagram_count(), 2);
    let (id, d) = restored.diagrams().next().unwrap();
    assert_eq!(d.name(), "Currents");
    assert_eq!(d.weight(), 0.4);
    assert_eq!(d.curves()[1].line_type(), LineType::BarToAxis);
    assert!(!d.curves()[1].is_enabled());
    assert_eq!(d.y2.scale(), AxisScale::Log);
    assert!(!d.y2.is_auto_enabled());
    assert_eq!(d.y2.limits(), HiLo::new(0.1, 100.0));

    assert_eq!(restored.triggers.len(), 1);
    assert_eq!(restored.triggers[0].diagram(), id);
    assert_eq!(restored.triggers[0].color(), Color32::from_rgb(0, 128, 255));
    assert_eq!(restored.triggers[0].time, 0.25);
}

#[test]
fn json_with_bad_weight_fails_to_rebuild() {
    let mut state = ScopeStateSerde::from(&sample_scope());
    state.diagrams[0].weight = 2.0;
    assert!(state.into_scope().is_err());
}

#[test]
fn json_with_inverted_user_scale_fails_to_rebuild() {
    let mut state = ScopeStateSerde::from(&sample_scope());
    state.diagrams[0].y2.user_scale = Some([100.0, 0.1]);
    assert!(state.into_scope().is_err());

    let mut state = ScopeStateSerde::from(&sample_scope());
    state.diagrams[0].y2.limits = [f64::NAN, 1.0];
    assert!(state.into_scope().is_err());
}

#[test]
fn malformed_json_is_an_error() {
    assert!(state_from_json("{ not json").is_err());
}

#[test]
fn curve_settings_text_round_trip() {
    let settings = CurveSettings {
        axis: AxisAssignment::Y2,
        line_type: LineType::BarToAxis,
        color: PaletteColor::Orange,
    };
    let text = settings.to_text();
    assert!(text.contains("\naxisConnection 2"));
    assert!(text.contains("\ncurveColor 10"));

    let mut restored = CurveSettings::default();
    restored.import_text(&TokenMap::parse(&text));
    assert_eq!(restored, settings);
}

#[test]
fn axis_limits_text_round_trip() {
    let mut axis = AxisLimits::default();
    axis.set_scale(AxisScale::Log);
    axis.set_common_zero(true);
    axis.set_user_scale(HiLo::new(1.0, 1000.0)).unwrap();
    axis.set_auto_enabled(false);

    let mut restored = AxisLimits::default();
    restored.import_text(&TokenMap::parse(&axis.to_text()));
    assert_eq!(restored.scale(), AxisScale::Log);
    assert!(restored.is_common_zero());
    assert!(!restored.is_auto_enabled());
    assert_eq!(restored.user_scale(), Some(HiLo::new(1.0, 1000.0)));
    assert_eq!(restored.limits(), HiLo::new(1.0, 1000.0));
}

#[test]
fn partial_text_keeps_current_values() {
    let mut settings = CurveSettings {
        axis: AxisAssignment::Y,
        line_type: LineType::ConnectNeighbours,
        color: PaletteColor::Blue,
    };
    settings.import_text(&TokenMap::parse("curveColor 99\nlineType 1"));
    assert_eq!(settings.axis, AxisAssignment::Y);
    assert_eq!(settings.line_type, LineType::BarToAxis);
    assert_eq!(settings.color, PaletteColor::Blue);
}

#[test]
fn inverted_value_scale_keeps_drawable_limits() {
    let mut axis = AxisLimits::default();
    let before = axis.limits();
    axis.import_text(&TokenMap::parse("\nisAutoEnabled false\nvalueScale 5 1"));
    assert!(!axis.is_auto_enabled());
    assert_eq!(axis.user_scale(), None);
    assert_eq!(axis.limits(), before);
    assert!(axis.range().is_ok());
}
