//! Defaults shared by every scope window, persisted as YAML.

use std::fs;
use std::path::Path;

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::data::diagram::{Diagram, DiagramKind, DEFAULT_WEIGHT};
use crate::data::fft::FftWindow;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Weight given to newly created diagrams.
    pub default_weight: f64,
    /// Label line height used when no font metrics are available.
    pub label_line_height: f32,
    pub fft_window: FftWindow,
    /// Number of trailing samples fed to the magnitude spectrum.
    pub fft_size: usize,
    pub trigger_color: [u8; 4],
    /// Round autoscaled limits to nice numbers.
    pub nice_scale: bool,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            default_weight: DEFAULT_WEIGHT,
            label_line_height: 14.0,
            fft_window: FftWindow::Hann,
            fft_size: 1024,
            trigger_color: [255, 0, 0, 255],
            nice_scale: true,
        }
    }
}

impl ScopeConfig {
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    pub fn save_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    pub fn trigger_color32(&self) -> Color32 {
        let [r, g, b, a] = self.trigger_color;
        Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    /// A new diagram carrying the configured weight and scaling.
    pub fn new_diagram(&self, kind: DiagramKind, name: impl Into<String>) -> Result<Diagram> {
        let mut diagram = Diagram::new(kind).with_name(name);
        diagram.set_weight(self.default_weight)?;
        diagram.y1.set_nice_scale(self.nice_scale);
        diagram.y2.set_nice_scale(self.nice_scale);
        Ok(diagram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scope.yaml");
        let config = ScopeConfig {
            fft_size: 256,
            fft_window: FftWindow::Blackman,
            ..ScopeConfig::default()
        };
        config.save_yaml(&path).unwrap();
        assert_eq!(ScopeConfig::load_yaml(&path).unwrap(), config);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: ScopeConfig = serde_yaml::from_str("fft_size: 64\n").unwrap();
        assert_eq!(config.fft_size, 64);
        assert_eq!(config.default_weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn invalid_weight_is_rejected() {
        let config = ScopeConfig {
            default_weight: 1.5,
            ..ScopeConfig::default()
        };
        assert!(config.new_diagram(DiagramKind::Regular, "v").is_err());
    }
}
