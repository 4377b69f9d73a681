//! Forward/inverse real DFT with a packed half-complex layout, plus the
//! windowed magnitude spectrum and harmonic analysis built on it.
//!
//! Packed layout for `n` real samples (`n` values out):
//! `[Re0, Re1, Im1, Re2, Im2, ..., Re(n/2)]`, where the trailing `Re(n/2)`
//! only exists for even `n`. Any length is accepted; nothing is zero padded.

use std::f64::consts::PI;

#[cfg(feature = "fft")]
use rustfft::{num_complex::Complex, FftDirection, FftPlanner};

use crate::data::time_series::TimeSeries;
use crate::error::{Result, ScopeError};

/// Complex DFT engine used by [`SpectralTransform`].
pub trait FftBackend {
    /// Unnormalised in-place DFT of `[re, im]` pairs. `inverse` selects the
    /// positive exponent.
    fn process(&mut self, buffer: &mut [[f64; 2]], inverse: bool);
}

/// Textbook O(n^2) DFT. Twiddle angles are reduced modulo `n` to keep
/// round-off independent of the product `j * k`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectDft;

impl FftBackend for DirectDft {
    fn process(&mut self, buffer: &mut [[f64; 2]], inverse: bool) {
        let n = buffer.len();
        if n <= 1 {
            return;
        }
        let sign = if inverse { 1.0 } else { -1.0 };
        let input = buffer.to_vec();
        for (k, out) in buffer.iter_mut().enumerate() {
            let (mut re, mut im) = (0.0, 0.0);
            for (j, [xr, xi]) in input.iter().enumerate() {
                let angle = sign * 2.0 * PI * ((j * k) % n) as f64 / n as f64;
                let (s, c) = angle.sin_cos();
                re += xr * c - xi * s;
                im += xr * s + xi * c;
            }
            *out = [re, im];
        }
    }
}

/// Mixed-radix / Bluestein transforms planned by `rustfft` for any length.
#[cfg(feature = "fft")]
pub struct RustFft {
    planner: FftPlanner<f64>,
}

#[cfg(feature = "fft")]
impl Default for RustFft {
    fn default() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }
}

#[cfg(feature = "fft")]
impl FftBackend for RustFft {
    fn process(&mut self, buffer: &mut [[f64; 2]], inverse: bool) {
        let direction = if inverse {
            FftDirection::Inverse
        } else {
            FftDirection::Forward
        };
        log::trace!("planning {:?} fft of length {}", direction, buffer.len());
        let fft = self.planner.plan_fft(buffer.len(), direction);
        let mut data: Vec<Complex<f64>> = buffer
            .iter()
            .map(|[re, im]| Complex { re: *re, im: *im })
            .collect();
        fft.process(&mut data);
        for (slot, c) in buffer.iter_mut().zip(data) {
            *slot = [c.re, c.im];
        }
    }
}

#[cfg(feature = "fft")]
pub type DefaultBackend = RustFft;
#[cfg(not(feature = "fft"))]
pub type DefaultBackend = DirectDft;

/// Real-input DFT pair over a pluggable backend.
pub struct SpectralTransform<B: FftBackend = DefaultBackend> {
    backend: B,
}

impl Default for SpectralTransform<DefaultBackend> {
    fn default() -> Self {
        Self {
            backend: DefaultBackend::default(),
        }
    }
}

impl SpectralTransform<DefaultBackend> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: FftBackend> SpectralTransform<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn forward(&mut self, samples: &[f64]) -> Result<Vec<f64>> {
        let mut out = vec![0.0; samples.len()];
        self.forward_into(samples, &mut out)?;
        Ok(out)
    }

    pub fn inverse(&mut self, spectrum: &[f64]) -> Result<Vec<f64>> {
        let mut out = vec![0.0; spectrum.len()];
        self.inverse_into(spectrum, &mut out)?;
        Ok(out)
    }

    /// Packed spectrum of `samples` written to `out` (same length).
    pub fn forward_into(&mut self, samples: &[f64], out: &mut [f64]) -> Result<()> {
        let n = check_lengths(samples.len(), out.len())?;
        let mut buffer: Vec<[f64; 2]> = samples.iter().map(|x| [*x, 0.0]).collect();
        self.backend.process(&mut buffer, false);

        out[0] = buffer[0][0];
        for k in 1..=(n - 1) / 2 {
            out[2 * k - 1] = buffer[k][0];
            out[2 * k] = buffer[k][1];
        }
        if n % 2 == 0 {
            out[n - 1] = buffer[n / 2][0];
        }
        Ok(())
    }

    /// Real samples reconstructed from a packed spectrum.
    pub fn inverse_into(&mut self, spectrum: &[f64], out: &mut [f64]) -> Result<()> {
        let n = check_lengths(spectrum.len(), out.len())?;
        let mut buffer = vec![[0.0, 0.0]; n];
        buffer[0] = [spectrum[0], 0.0];
        for k in 1..=(n - 1) / 2 {
            let (re, im) = (spectrum[2 * k - 1], spectrum[2 * k]);
            buffer[k] = [re, im];
            buffer[n - k] = [re, -im];
        }
        if n % 2 == 0 {
            buffer[n / 2] = [spectrum[n - 1], 0.0];
        }
        self.backend.process(&mut buffer, true);

        let scale = 1.0 / n as f64;
        for (o, [re, _]) in out.iter_mut().zip(buffer) {
            *o = re * scale;
        }
        Ok(())
    }
}

fn check_lengths(input: usize, output: usize) -> Result<usize> {
    if input == 0 {
        return Err(ScopeError::domain("spectral transform of an empty buffer"));
    }
    if input != output {
        return Err(ScopeError::LengthMismatch {
            expected: input,
            actual: output,
        });
    }
    Ok(input)
}

/// Bin `k` of a packed spectrum of length `n` as `(re, im)`.
pub fn packed_bin(spectrum: &[f64], k: usize) -> Option<(f64, f64)> {
    let n = spectrum.len();
    match k {
        0 if n > 0 => Some((spectrum[0], 0.0)),
        k if n % 2 == 0 && k == n / 2 => Some((spectrum[n - 1], 0.0)),
        k if k >= 1 && k <= (n.max(1) - 1) / 2 => Some((spectrum[2 * k - 1], spectrum[2 * k])),
        _ => None,
    }
}

/// Supported FFT window functions for spectral analysis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum FftWindow {
    /// Rectangular (no windowing)
    Rect,
    /// Hann window
    #[default]
    Hann,
    /// Hamming window
    Hamming,
    /// Blackman window
    Blackman,
}

impl FftWindow {
    pub const ALL: &'static [FftWindow] = &[
        FftWindow::Rect,
        FftWindow::Hann,
        FftWindow::Hamming,
        FftWindow::Blackman,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FftWindow::Rect => "Rect",
            FftWindow::Hann => "Hann",
            FftWindow::Hamming => "Hamming",
            FftWindow::Blackman => "Blackman",
        }
    }

    /// Window weight for sample `n` of `len` (periodic form).
    pub fn weight(&self, n: usize, len: usize) -> f64 {
        let phase = 2.0 * PI * n as f64 / len as f64;
        match self {
            FftWindow::Rect => 1.0,
            FftWindow::Hann => 0.5 - 0.5 * phase.cos(),
            FftWindow::Hamming => 0.54 - 0.46 * phase.cos(),
            FftWindow::Blackman => 0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos(),
        }
    }
}

impl<B: FftBackend> SpectralTransform<B> {
    /// One-sided amplitude spectrum `[frequency, magnitude]` of the last
    /// `fft_size` samples of `series`. The sample rate is estimated from the
    /// time axis. `None` when there is not enough data or time does not
    /// advance across the window.
    pub fn magnitude_spectrum(
        &mut self,
        series: &dyn TimeSeries,
        fft_size: usize,
        window: FftWindow,
    ) -> Option<Vec<[f64; 2]>> {
        let len = series.len();
        if fft_size < 2 || len < fft_size {
            return None;
        }
        let first = len - fft_size;
        let (t0, t1) = (series.time_at(first), series.time_at(len - 1));
        if !(t1 > t0) {
            return None;
        }
        let sample_rate = (fft_size as f64 - 1.0) / (t1 - t0);

        let windowed: Vec<f64> = (0..fft_size)
            .map(|i| series.value_at(first + i) * window.weight(i, fft_size))
            .collect();
        let packed = self.forward(&windowed).ok()?;

        let half = fft_size / 2;
        let scale = 2.0 / fft_size as f64;
        let out = (0..half)
            .filter_map(|k| {
                let (re, im) = packed_bin(&packed, k)?;
                let freq = k as f64 * sample_rate / fft_size as f64;
                Some([freq, (re * re + im * im).sqrt() * scale])
            })
            .collect();
        Some(out)
    }

    /// Amplitude and phase of harmonics `0..=max_harmonic` of `base_frequency`
    /// over one period starting at `start`. The period is resampled to
    /// `points` equidistant values by linear interpolation.
    pub fn harmonics(
        &mut self,
        series: &dyn TimeSeries,
        base_frequency: f64,
        start: f64,
        max_harmonic: usize,
        points: usize,
    ) -> Result<Vec<Harmonic>> {
        if !(base_frequency > 0.0) || !base_frequency.is_finite() {
            return Err(ScopeError::domain(format!(
                "base frequency {base_frequency} must be positive"
            )));
        }
        if points < 2 * max_harmonic + 1 {
            return Err(ScopeError::domain(format!(
                "{points} points cannot resolve harmonic {max_harmonic}"
            )));
        }
        let period = 1.0 / base_frequency;
        let resampled = (0..points)
            .map(|i| series.interpolate(start + period * i as f64 / points as f64))
            .collect::<Result<Vec<f64>>>()?;
        let packed = self.forward(&resampled)?;

        let scale = 1.0 / points as f64;
        (0..=max_harmonic)
            .map(|n| {
                let (re, im) = packed_bin(&packed, n).ok_or_else(|| {
                    ScopeError::domain(format!("harmonic {n} outside resolved band"))
                })?;
                let factor = if n == 0 { scale } else { 2.0 * scale };
                Ok(Harmonic {
                    order: n,
                    frequency: n as f64 * base_frequency,
                    amplitude: (re * re + im * im).sqrt() * factor,
                    phase: im.atan2(re),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Harmonic {
    pub order: usize,
    pub frequency: f64,
    pub amplitude: f64,
    /// Phase in radians of the cosine component.
    pub phase: f64,
}
