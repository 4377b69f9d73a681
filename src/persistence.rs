//! Settings persistence.
//!
//! Two formats are supported:
//! - the line based text protocol of the circuit file (`<key> <values...>`
//!   per line), read through [`TokenMap`] and written by [`TextSettings`];
//! - JSON snapshots of a whole scope layout through serializable mirror
//!   types, for state that does not derive serde itself.
//!
//! Text import is tolerant: a missing or malformed key logs a warning and
//! keeps the current value.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::axis::AxisScale;
use crate::data::axis_limits::AxisLimits;
use crate::data::codes::PersistedCode;
use crate::data::curve::{AxisAssignment, CurveSettings, LineType};
use crate::data::color::PaletteColor;
use crate::data::diagram::{Diagram, DiagramKind, DiagramSettings};
use crate::data::hilo::HiLo;
use crate::data::power::{PowerAnalysisSettings, POWER_CHANNELS};
use crate::data::scope::ScopeData;
use crate::error::{Result, ScopeError};

/// Written in place of an empty string.
pub const NIX: &str = "NIX_NIX_NIX";

// ---------- Text protocol ----------

/// Key lookup over a block of `<key> <values...>` lines.
#[derive(Debug, Clone, Default)]
pub struct TokenMap {
    lines: HashMap<String, String>,
}

impl TokenMap {
    /// Later duplicates of a key win.
    pub fn parse(text: &str) -> Self {
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| match l.split_once(' ') {
                Some((key, rest)) => (key.to_string(), rest.trim().to_string()),
                None => (l.to_string(), String::new()),
            })
            .collect();
        Self { lines }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lines.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn raw(&self, key: &str) -> Option<&str> {
        let raw = self.lines.get(key).map(String::as_str);
        if raw.is_none() {
            log::warn!("settings key '{key}' missing, keeping current value");
        }
        raw
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.raw(key) else {
            return default;
        };
        match raw.split_whitespace().next().map(str::parse::<T>) {
            Some(Ok(v)) => v,
            _ => {
                log::warn!("settings key '{key}' has malformed value '{raw}'");
                default
            }
        }
    }

    pub fn read_f64(&self, key: &str, default: f64) -> f64 {
        self.parsed(key, default)
    }

    pub fn read_i64(&self, key: &str, default: i64) -> i64 {
        self.parsed(key, default)
    }

    pub fn read_bool(&self, key: &str, default: bool) -> bool {
        self.parsed(key, default)
    }

    /// The rest of the line after the key; the [`NIX`] sentinel reads as "".
    pub fn read_string(&self, key: &str, default: &str) -> String {
        match self.raw(key) {
            Some(NIX) => String::new(),
            Some(raw) => raw.to_string(),
            None => default.to_string(),
        }
    }

    /// Two finite floats, `lo hi`, with `lo <= hi`.
    pub fn read_hilo(&self, key: &str, default: HiLo) -> HiLo {
        let Some(raw) = self.raw(key) else {
            return default;
        };
        let values: Vec<f64> = raw.split_whitespace().filter_map(|t| t.parse().ok()).collect();
        match values.as_slice() {
            [lo, hi] if HiLo::new(*lo, *hi).is_valid() => HiLo::new(*lo, *hi),
            _ => {
                log::warn!("settings key '{key}' is not an ordered lo/hi pair: '{raw}'");
                default
            }
        }
    }

    pub fn read_i64_array(&self, key: &str, default: &[i64]) -> Vec<i64> {
        let Some(raw) = self.raw(key) else {
            return default.to_vec();
        };
        let parsed: std::result::Result<Vec<i64>, _> = raw.split_whitespace().map(str::parse).collect();
        parsed.unwrap_or_else(|_| {
            log::warn!("settings key '{key}' has malformed array '{raw}'");
            default.to_vec()
        })
    }

    /// An enum stored by its persisted code. Unknown codes keep `default`.
    pub fn read_code<T: PersistedCode>(&self, key: &str, default: T) -> T {
        let code = self.read_i64(key, default.code());
        T::from_code(code).unwrap_or_else(|e| {
            log::warn!("settings key '{key}': {e}");
            default
        })
    }
}

fn write_value(out: &mut String, key: &str, value: impl std::fmt::Display) {
    let _ = write!(out, "\n{key} {value}");
}

fn write_string(out: &mut String, key: &str, value: &str) {
    write_value(out, key, if value.is_empty() { NIX } else { value });
}

fn write_hilo(out: &mut String, key: &str, value: HiLo) {
    let _ = write!(out, "\n{key} {} {}", value.lo, value.hi);
}

fn write_array(out: &mut String, key: &str, values: &[usize]) {
    let _ = write!(out, "\n{key}");
    for v in values {
        let _ = write!(out, " {v}");
    }
}

/// An entity that reads and writes its own keys of the text protocol.
pub trait TextSettings {
    fn export_text(&self, out: &mut String);
    fn import_text(&mut self, tokens: &TokenMap);

    fn to_text(&self) -> String {
        let mut out = String::new();
        self.export_text(&mut out);
        out
    }
}

impl TextSettings for DiagramSettings {
    fn export_text(&self, out: &mut String) {
        write_string(out, "nameDiagram", self.name());
        write_value(out, "weightDiagram", self.weight());
    }

    fn import_text(&mut self, tokens: &TokenMap) {
        let name = tokens.read_string("nameDiagram", self.name());
        self.set_name(name);
        let weight = tokens.read_f64("weightDiagram", self.weight());
        if let Err(e) = self.set_weight(weight) {
            log::warn!("settings key 'weightDiagram': {e}");
        }
    }
}

impl TextSettings for CurveSettings {
    fn export_text(&self, out: &mut String) {
        write_value(out, "axisConnection", self.axis.code());
        write_value(out, "lineType", self.line_type.code());
        write_value(out, "curveColor", self.color.code());
    }

    fn import_text(&mut self, tokens: &TokenMap) {
        self.axis = tokens.read_code::<AxisAssignment>("axisConnection", self.axis);
        self.line_type = tokens.read_code::<LineType>("lineType", self.line_type);
        self.color = tokens.read_code::<PaletteColor>("curveColor", self.color);
    }
}

impl TextSettings for AxisLimits {
    fn export_text(&self, out: &mut String) {
        write_value(out, "isAutoEnabled", self.is_auto_enabled());
        write_value(out, "isUserScale", self.user_scale().is_some());
        write_value(out, "isSymmetricZero", self.is_common_zero());
        write_hilo(out, "valueScale", self.user_scale().unwrap_or_else(|| self.limits()));
        write_value(out, "axisType", self.scale().code());
    }

    fn import_text(&mut self, tokens: &TokenMap) {
        let scale = tokens.read_code::<AxisScale>("axisType", self.scale());
        self.set_scale(scale);
        self.set_common_zero(tokens.read_bool("isSymmetricZero", self.is_common_zero()));
        let value_scale = tokens.read_hilo("valueScale", self.limits());
        if tokens.read_bool("isUserScale", self.user_scale().is_some()) {
            if let Err(e) = self.set_user_scale(value_scale) {
                log::warn!("settings key 'valueScale': {e}");
            }
        }
        if !tokens.read_bool("isAutoEnabled", self.is_auto_enabled()) {
            self.value_scale_local = value_scale;
            self.auto_enabled = false;
        } else {
            self.set_auto_enabled(true);
        }
    }
}

impl TextSettings for PowerAnalysisSettings {
    fn export_text(&self, out: &mut String) {
        write_array(out, "powerAnalVoltageIndices[]", &self.voltage_indices);
        write_array(out, "powerAnalCurrentIndices[]", &self.current_indices);
    }

    fn import_text(&mut self, tokens: &TokenMap) {
        fn to_slots(key: &str, values: Vec<i64>, current: [usize; POWER_CHANNELS]) -> [usize; POWER_CHANNELS] {
            let mut slots = current;
            if values.len() != POWER_CHANNELS || values.iter().any(|v| *v < 0) {
                log::warn!("settings key '{key}' needs {POWER_CHANNELS} non-negative indices");
                return slots;
            }
            for (slot, v) in slots.iter_mut().zip(values) {
                *slot = v as usize;
            }
            slots
        }
        let as_i64 = |v: [usize; POWER_CHANNELS]| v.map(|x| x as i64);

        let key = "powerAnalVoltageIndices[]";
        let values = tokens.read_i64_array(key, &as_i64(self.voltage_indices));
        self.voltage_indices = to_slots(key, values, self.voltage_indices);
        let key = "powerAnalCurrentIndices[]";
        let values = tokens.read_i64_array(key, &as_i64(self.current_indices));
        self.current_indices = to_slots(key, values, self.current_indices);
    }
}

// ---------- Serializable mirror types ----------

/// Serializable version of AxisLimits (persistent part only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSerde {
    pub scale: AxisScale,
    pub auto_enabled: bool,
    pub common_zero: bool,
    pub nice_scale: bool,
    pub user_scale: Option<[f64; 2]>,
    pub limits: [f64; 2],
}

impl From<&AxisLimits> for AxisSerde {
    fn from(a: &AxisLimits) -> Self {
        let limits = a.limits();
        Self {
            scale: a.scale(),
            auto_enabled: a.is_auto_enabled(),
            common_zero: a.is_common_zero(),
            nice_scale: a.is_nice_scale(),
            user_scale: a.user_scale().map(|h| [h.lo, h.hi]),
            limits: [limits.lo, limits.hi],
        }
    }
}

impl AxisSerde {
    /// Apply stored settings to an AxisLimits instance. Unordered or
    /// non-finite limits are rejected.
    pub fn apply_to(self, a: &mut AxisLimits) -> Result<()> {
        a.set_scale(self.scale);
        a.set_common_zero(self.common_zero);
        a.set_nice_scale(self.nice_scale);
        if let Some([lo, hi]) = self.user_scale {
            a.set_user_scale(HiLo::new(lo, hi))?;
        }
        if self.auto_enabled {
            a.set_auto_enabled(true);
        } else {
            let limits = HiLo::new(self.limits[0], self.limits[1]);
            if !limits.is_valid() {
                return Err(ScopeError::domain(format!(
                    "stored axis limits [{}, {}] are not valid",
                    limits.lo, limits.hi
                )));
            }
            a.value_scale_local = limits;
            a.auto_enabled = false;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSerde {
    pub signal: String,
    pub settings: CurveSettings,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSerde {
    pub name: String,
    pub weight: f64,
    pub kind: DiagramKind,
    pub y1: AxisSerde,
    pub y2: AxisSerde,
    pub curves: Vec<CurveSerde>,
}

impl From<&Diagram> for DiagramSerde {
    fn from(d: &Diagram) -> Self {
        Self {
            name: d.name().to_string(),
            weight: d.weight(),
            kind: d.kind,
            y1: AxisSerde::from(&d.y1),
            y2: AxisSerde::from(&d.y2),
            curves: d
                .curves()
                .iter()
                .map(|c| CurveSerde {
                    signal: c.signal.0.clone(),
                    settings: c.settings,
                    enabled: c.is_enabled(),
                })
                .collect(),
        }
    }
}

impl DiagramSerde {
    pub fn into_diagram(self) -> Result<Diagram> {
        let mut diagram = Diagram::new(self.kind).with_name(self.name);
        diagram.set_weight(self.weight)?;
        self.y1.apply_to(&mut diagram.y1)?;
        self.y2.apply_to(&mut diagram.y2)?;
        for c in self.curves {
            let index = diagram.add_curve_on(c.signal, c.settings.axis)?;
            if let Some(curve) = diagram.curve_mut(index) {
                curve.set_line_type(c.settings.line_type);
                curve.settings.color = c.settings.color;
                curve.set_enabled(c.enabled);
            }
        }
        Ok(diagram)
    }
}

/// Trigger cursors refer to their diagram by position in `diagrams`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerSerde {
    pub color_rgba: [u8; 4],
    pub time: f64,
    pub enabled: bool,
    pub diagram: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeStateSerde {
    pub x_label: String,
    pub x_axis: AxisSerde,
    pub diagrams: Vec<DiagramSerde>,
    pub triggers: Vec<TriggerSerde>,
}

impl From<&ScopeData> for ScopeStateSerde {
    fn from(s: &ScopeData) -> Self {
        let ids: Vec<_> = s.diagrams().map(|(id, _)| id).collect();
        Self {
            x_label: s.x_label.clone(),
            x_axis: AxisSerde::from(&s.x_axis),
            diagrams: s.diagrams().map(|(_, d)| DiagramSerde::from(d)).collect(),
            triggers: s
                .triggers
                .iter()
                .filter_map(|t| {
                    let diagram = ids.iter().position(|id| *id == t.diagram())?;
                    Some(TriggerSerde {
                        color_rgba: t.color().to_srgba_unmultiplied(),
                        time: t.time,
                        enabled: t.enabled,
                        diagram,
                    })
                })
                .collect(),
        }
    }
}

impl ScopeStateSerde {
    /// Rebuild a scope. Fails on weights, axis limits or axis assignments
    /// that the diagram model rejects, and on triggers pointing past the
    /// diagrams.
    pub fn into_scope(self) -> Result<ScopeData> {
        let mut scope = ScopeData::new();
        scope.x_label = self.x_label;
        self.x_axis.apply_to(&mut scope.x_axis)?;
        let mut ids = Vec::with_capacity(self.diagrams.len());
        for d in self.diagrams {
            ids.push(scope.add_diagram(d.into_diagram()?));
        }
        for t in self.triggers {
            let id = *ids.get(t.diagram).ok_or(ScopeError::OutOfRange {
                index: t.diagram,
                maximum: ids.len().checked_sub(1),
            })?;
            let [r, g, b, a] = t.color_rgba;
            let index = scope.add_trigger(egui::Color32::from_rgba_unmultiplied(r, g, b, a), t.time, id)?;
            scope.triggers[index].enabled = t.enabled;
        }
        Ok(scope)
    }
}

// ---------- Public API ----------

/// Serialize the scope state as pretty JSON.
pub fn state_to_json(state: &ScopeStateSerde) -> Result<String> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Deserialize scope state from JSON.
pub fn state_from_json(json: &str) -> Result<ScopeStateSerde> {
    Ok(serde_json::from_str(json)?)
}

/// Save the scope state to a JSON file at the given path.
pub fn save_state_to_path(state: &ScopeStateSerde, path: &Path) -> Result<()> {
    std::fs::write(path, state_to_json(state)?)?;
    Ok(())
}

/// Load the scope state from a JSON file at the given path.
pub fn load_state_from_path(path: &Path) -> Result<ScopeStateSerde> {
    let txt = std::fs::read_to_string(path)?;
    state_from_json(&txt)
}
