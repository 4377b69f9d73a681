//! WaveScope crate root: re-exports and module wiring.
//!
//! The waveform core of a circuit-simulation scope:
//! - `data::time_series`: sampled signals with fast time -> index lookup
//! - `data::axis`: linear/logarithmic value <-> pixel mapping
//! - `data::diagram` / `data::scope`: stacked, weighted diagrams of curves
//! - `data::fft`: packed real spectral transform and spectrum analysis
//! - `render`: the drawing surface the scope paints onto
//! - `persistence`, `config`: settings files

pub mod config;
pub mod data;
pub mod error;
pub mod persistence;
pub mod render;

// Public re-exports for a compact external API
pub use config::ScopeConfig;
pub use data::axis::{pixel_to_value, value_to_pixel, AxisMapper, AxisRange, AxisScale};
pub use data::color::{ColorState, ColorStrategy, PaletteColor};
pub use data::curve::{AxisAssignment, Curve, CurveKind, LineType};
pub use data::diagram::{Diagram, DiagramKind};
pub use data::fft::{FftBackend, FftWindow, SpectralTransform};
pub use data::hilo::HiLo;
pub use data::scope::{DiagramId, ScopeData};
pub use data::signals::{SignalRef, SignalStore};
pub use data::time_series::{FixedStepSeries, SampleBuffer, TimeSeries};
pub use data::triggers::TriggerCursor;
pub use error::{Result, ScopeError};
pub use render::{DrawCommand, DrawSurface, RecordingSurface};
