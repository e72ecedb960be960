//! Synthetic mirror jitter
//!
//! Trace-free runs synthesise pointing jitter instead of replaying a
//! recording: zero-mean Gaussian angle samples are projected onto the
//! receiver plane and shaped by a second-order Butterworth low-pass, since a
//! physical steering mirror cannot follow white noise above its mechanical
//! bandwidth.

use rand::Rng;

use crate::channel::gaussian;
use crate::error::{FsoError, Result};
use crate::trace::DisplacementTrace;

/// Second-order Butterworth low-pass biquad (bilinear transform, Q = 1/√2).
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    a1: f64,
    a2: f64,
    b0: f64,
    b1: f64,
    b2: f64,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl LowPassFilter {
    pub fn new(cutoff_hz: f64, sample_rate_hz: f64) -> Result<Self> {
        if cutoff_hz <= 0.0 || cutoff_hz >= sample_rate_hz / 2.0 {
            return Err(FsoError::config(
                "jitter_filter",
                format!(
                    "cutoff {cutoff_hz} Hz must lie below the Nyquist rate of {} Hz",
                    sample_rate_hz / 2.0
                ),
            ));
        }

        let omega = 2.0 * std::f64::consts::PI * cutoff_hz / sample_rate_hz;
        let cos_omega = omega.cos();
        let sin_omega = omega.sin();
        // Q = 1/sqrt(2) for a Butterworth response
        let alpha = sin_omega / (2.0 * std::f64::consts::FRAC_1_SQRT_2);

        let a0 = 1.0 + alpha;
        Ok(Self {
            a1: (-2.0 * cos_omega) / a0,
            a2: (1.0 - alpha) / a0,
            b0: ((1.0 - cos_omega) / 2.0) / a0,
            b1: (1.0 - cos_omega) / a0,
            b2: ((1.0 - cos_omega) / 2.0) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        })
    }

    /// Filter a whole series, carrying state across samples.
    pub fn process(&mut self, input: &[f64]) -> Vec<f64> {
        input
            .iter()
            .map(|&x0| {
                let y0 = self.b0 * x0 + self.b1 * self.x1 + self.b2 * self.x2
                    - self.a1 * self.y1
                    - self.a2 * self.y2;
                self.x2 = self.x1;
                self.x1 = x0;
                self.y2 = self.y1;
                self.y1 = y0;
                y0
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// Synthetic jitter source.
#[derive(Debug, Clone)]
pub struct SyntheticJitter {
    /// Angular jitter standard deviation [rad].
    pub sigma_rad: f64,
    /// Path length projecting angles onto the receiver plane [m].
    pub path_length_m: f64,
    /// Sample clock [Hz].
    pub sample_rate_hz: f64,
    /// Butterworth cutoff [Hz].
    pub cutoff_hz: f64,
}

impl SyntheticJitter {
    /// Generate `n_samples` of filtered displacement.
    pub fn generate<R: Rng>(&self, n_samples: usize, rng: &mut R) -> Result<DisplacementTrace> {
        if n_samples == 0 {
            return Err(FsoError::input("jitter generation requires n_samples >= 1"));
        }
        if self.sigma_rad < 0.0 || self.path_length_m <= 0.0 {
            return Err(FsoError::config(
                "jitter",
                "sigma_rad must be >= 0 and path_length_m positive",
            ));
        }

        let mut draw_axis = || -> Vec<f64> {
            (0..n_samples)
                .map(|_| (self.sigma_rad * gaussian(rng)).tan() * self.path_length_m)
                .collect()
        };
        let x_raw = draw_axis();
        let y_raw = draw_axis();

        let mut filter = LowPassFilter::new(self.cutoff_hz, self.sample_rate_hz)?;
        let x_m = filter.process(&x_raw);
        filter.reset();
        let y_m = filter.process(&y_raw);

        let time_s = (0..n_samples)
            .map(|i| i as f64 / self.sample_rate_hz)
            .collect();
        DisplacementTrace::from_samples(time_s, x_m, y_m)
    }
}
