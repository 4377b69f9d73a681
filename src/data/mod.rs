pub mod axis;
pub mod axis_limits;
pub mod characteristics;
pub mod codes;
pub mod color;
pub mod curve;
pub mod diagram;
pub mod export;
pub mod fft;
pub mod hilo;
pub mod power;
pub mod scope;
pub mod signals;
pub mod time_series;
pub mod triggers;
