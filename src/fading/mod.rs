//! Pointing-induced fading from beam/aperture overlap
//!
//! For every displaced beam centroid the model integrates the Gaussian
//! irradiance profile over the circular receiver aperture and normalises by
//! the beam's total power, yielding the fraction of transmitted power the
//! detector captures at that instant.

use ndarray::Array2;
use tracing::debug;

use crate::error::{FsoError, Result};
use crate::trace::DisplacementTrace;

/// Fractional power capture per sample of the signal clock, each in (0, 1].
pub type AttenuationSeries = Vec<f64>;

/// Beam waist at the detector focus, `λ / (θ_div · π · n)` [m].
pub fn beam_waist_at_focus(wavelength_m: f64, divergence_rad: f64, refractive_index: f64) -> f64 {
    wavelength_m / (divergence_rad * std::f64::consts::PI * refractive_index)
}

/// Aperture-overlap fading model.
///
/// The integration grid spans the receiver aperture and is centred on the
/// aperture; the wandering beam is evaluated at shifted coordinates. Grid
/// geometry (coordinates, circular mask, cell area) is built once and reused
/// for every sample.
#[derive(Debug, Clone)]
pub struct PointingFadingModel {
    beam_waist_m: f64,
    aperture_radius_m: f64,
    grid_x: Array2<f64>,
    grid_y: Array2<f64>,
    mask: Array2<bool>,
    cell_area: f64,
}

impl PointingFadingModel {
    /// Build the model. `grid_resolution` is the accuracy/performance knob:
    /// the overlap integral is O(resolution²) per sample.
    pub fn new(
        beam_waist_m: f64,
        aperture_diameter_m: f64,
        grid_resolution: usize,
    ) -> Result<Self> {
        if beam_waist_m <= 0.0 || aperture_diameter_m <= 0.0 {
            return Err(FsoError::config(
                "fading",
                "beam waist and aperture diameter must be positive",
            ));
        }
        if grid_resolution < 2 {
            return Err(FsoError::config(
                "fading",
                "grid_resolution must be at least 2",
            ));
        }

        let radius = aperture_diameter_m / 2.0;
        let step = 2.0 * radius / (grid_resolution - 1) as f64;
        let coord = |index: usize| -radius + index as f64 * step;

        let grid_x = Array2::from_shape_fn((grid_resolution, grid_resolution), |(_, j)| coord(j));
        let grid_y = Array2::from_shape_fn((grid_resolution, grid_resolution), |(i, _)| coord(i));
        let mask = Array2::from_shape_fn((grid_resolution, grid_resolution), |(i, j)| {
            let x = coord(j);
            let y = coord(i);
            x * x + y * y <= radius * radius
        });

        Ok(Self {
            beam_waist_m,
            aperture_radius_m: radius,
            grid_x,
            grid_y,
            mask,
            cell_area: step * step,
        })
    }

    /// Convenience constructor deriving the waist from link geometry.
    pub fn from_link(
        wavelength_m: f64,
        divergence_rad: f64,
        refractive_index: f64,
        aperture_diameter_m: f64,
        grid_resolution: usize,
    ) -> Result<Self> {
        Self::new(
            beam_waist_at_focus(wavelength_m, divergence_rad, refractive_index),
            aperture_diameter_m,
            grid_resolution,
        )
    }

    pub fn beam_waist_m(&self) -> f64 {
        self.beam_waist_m
    }

    pub fn aperture_radius_m(&self) -> f64 {
        self.aperture_radius_m
    }

    /// Captured-power fraction for one beam-centroid position.
    ///
    /// Riemann sum of `exp(-2r²/w0²)` over masked grid cells, divided by the
    /// analytical total beam power `π·w0²/2`.
    pub fn capture_fraction(&self, x_m: f64, y_m: f64) -> f64 {
        let w0_sq = self.beam_waist_m * self.beam_waist_m;

        let mut captured = 0.0;
        ndarray::Zip::from(&self.grid_x)
            .and(&self.grid_y)
            .and(&self.mask)
            .for_each(|&gx, &gy, &inside| {
                if inside {
                    let dx = gx - x_m;
                    let dy = gy - y_m;
                    captured += (-2.0 * (dx * dx + dy * dy) / w0_sq).exp();
                }
            });
        captured *= self.cell_area;

        let total = std::f64::consts::PI * w0_sq / 2.0;
        (captured / total).clamp(f64::MIN_POSITIVE, 1.0)
    }

    /// Capture fraction with the beam exactly on axis; the maximum the
    /// geometry can attain.
    pub fn on_axis_capture(&self) -> f64 {
        self.capture_fraction(0.0, 0.0)
    }

    /// Evaluate the whole displacement trace. One value per trace sample;
    /// the degenerate perfectly-still trace flows through the same path and
    /// simply yields a constant series.
    pub fn fading_series(&self, trace: &DisplacementTrace) -> Result<AttenuationSeries> {
        if trace.is_empty() {
            return Err(FsoError::input("displacement trace contains no samples"));
        }
        let series: AttenuationSeries = trace
            .x_m
            .iter()
            .zip(&trace.y_m)
            .map(|(&x, &y)| self.capture_fraction(x, y))
            .collect();
        debug!(
            samples = series.len(),
            on_axis = self.on_axis_capture(),
            "fading series computed"
        );
        Ok(series)
    }
}
