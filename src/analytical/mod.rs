//! Closed-form BER from the irradiance statistics of a jittered beam
//!
//! Independent of the time-domain simulation: the probability density of
//! normalised irradiance under combined boresight offset and Gaussian jitter
//! is derived in closed form, then integrated against the Gaussian-channel
//! error function to give BER as a function of SNR. Serves as the analytical
//! cross-check for the Monte-Carlo pipeline.

pub mod special;

use tracing::debug;

use crate::error::{FsoError, Result};
use special::{bessel_i0, erfc, simpson};

/// Sampled probability density of normalised irradiance h' over (0, 1].
///
/// The density is normalised so its integral over the sampled domain is 1,
/// for both zero and nonzero boresight offset; see DESIGN.md for the
/// normalisation decision.
#[derive(Debug, Clone, PartialEq)]
pub struct IrradiancePdf {
    /// Normalised irradiance grid, uniform over [`PDF_H_MIN`, 1].
    pub h: Vec<f64>,
    /// Density values, one per grid point.
    pub density: Vec<f64>,
}

/// Lower edge of the sampled h' domain; keeps the h'^(γ²-1) factor away
/// from the h' → 0 singularity at small γ.
pub const PDF_H_MIN: f64 = 0.1;

/// Default grid sizes matching the bench tooling.
pub const DEFAULT_PDF_POINTS: usize = 1001;
pub const DEFAULT_SNR_POINTS: usize = 1000;
pub const DEFAULT_SNR_MAX: f64 = 100.0;

impl IrradiancePdf {
    /// Grid spacing.
    pub fn step(&self) -> f64 {
        if self.h.len() > 1 {
            (self.h[self.h.len() - 1] - self.h[0]) / (self.h.len() - 1) as f64
        } else {
            0.0
        }
    }

    /// Numerical integral of the density over the sampled domain.
    pub fn integral(&self) -> f64 {
        simpson(&self.density, self.step())
    }

    /// Probability that h' falls inside [a, b].
    pub fn probability_in(&self, a: f64, b: f64) -> Result<f64> {
        if a >= b || a < self.h[0] || b > self.h[self.h.len() - 1] {
            return Err(FsoError::input(format!(
                "probability range [{a}, {b}] outside the sampled domain"
            )));
        }
        let masked: Vec<f64> = self
            .h
            .iter()
            .zip(&self.density)
            .map(|(&h, &d)| if (a..=b).contains(&h) { d } else { 0.0 })
            .collect();
        Ok(simpson(&masked, self.step()))
    }
}

/// BER as a function of SNR, on a linear SNR grid.
#[derive(Debug, Clone, PartialEq)]
pub struct BerCurve {
    pub snr: Vec<f64>,
    pub ber: Vec<f64>,
}

/// Closed-form density of normalised irradiance for a Gaussian beam under
/// pointing jitter `sigma_pj` and static boresight offset `mu`.
///
/// With `γ = w0 / (2σ)`:
///
/// `p(h') = γ² · h'^(γ²-1) · exp(-μ²/2σ²) · I₀((μ/σ²)·√(-w0²·ln h'/2))`
///
/// normalised numerically over the sampled domain.
pub fn irradiance_pdf(
    beam_waist_m: f64,
    sigma_pj: f64,
    mu: f64,
    n_points: usize,
) -> Result<IrradiancePdf> {
    if beam_waist_m <= 0.0 {
        return Err(FsoError::config("analytical", "beam waist must be positive"));
    }
    if sigma_pj <= 0.0 {
        return Err(FsoError::config(
            "analytical",
            "sigma_pj must be positive; a jitter-free link has no irradiance spread",
        ));
    }
    if mu < 0.0 {
        return Err(FsoError::config("analytical", "mu must be >= 0"));
    }
    if n_points < 3 {
        return Err(FsoError::config("analytical", "n_points must be >= 3"));
    }

    let gamma_sq = (beam_waist_m / (2.0 * sigma_pj)).powi(2);
    let sigma_sq = sigma_pj * sigma_pj;
    let boresight_factor = (-mu * mu / (2.0 * sigma_sq)).exp();

    let step = (1.0 - PDF_H_MIN) / (n_points - 1) as f64;
    let h: Vec<f64> = (0..n_points).map(|i| PDF_H_MIN + i as f64 * step).collect();

    let mut density: Vec<f64> = h
        .iter()
        .map(|&hp| {
            // ln(hp) <= 0 on the domain, so the sqrt operand is nonnegative
            let z = mu / sigma_sq * (-beam_waist_m * beam_waist_m * hp.ln() / 2.0).sqrt();
            gamma_sq * hp.powf(gamma_sq - 1.0) * boresight_factor * bessel_i0(z)
        })
        .collect();

    let raw_integral = simpson(&density, step);
    if !raw_integral.is_finite() || raw_integral <= 0.0 {
        return Err(FsoError::NumericDegeneracy {
            operation: "irradiance_pdf".to_string(),
            reason: format!("density integral is {raw_integral}"),
        });
    }
    for d in &mut density {
        *d /= raw_integral;
    }
    debug!(gamma_sq, mu, raw_integral, "irradiance PDF normalised");

    Ok(IrradiancePdf { h, density })
}

/// Outage-averaged OOK BER over a swept SNR range:
///
/// `BER(SNR) = 0.5 · ∫ p(h')·erfc(SNR·h'/(2√2)) dh'`
///
/// evaluated as a Riemann sum on the PDF's own h' grid.
pub fn ber_vs_snr(pdf: &IrradiancePdf, snr_grid: &[f64]) -> Result<BerCurve> {
    if pdf.h.len() < 2 {
        return Err(FsoError::input("PDF grid too short for integration"));
    }
    if snr_grid.is_empty() {
        return Err(FsoError::input("SNR grid must be non-empty"));
    }
    let du = pdf.step();
    let two_sqrt2 = 2.0 * std::f64::consts::SQRT_2;

    let ber = snr_grid
        .iter()
        .map(|&snr| {
            let integral: f64 = pdf
                .h
                .iter()
                .zip(&pdf.density)
                .map(|(&hp, &d)| d * erfc(snr * hp / two_sqrt2))
                .sum();
            0.5 * integral * du
        })
        .collect();

    Ok(BerCurve {
        snr: snr_grid.to_vec(),
        ber,
    })
}

/// The bench tooling's linear SNR grid, 0 to 100 in 1000 points.
pub fn default_snr_grid() -> Vec<f64> {
    let step = DEFAULT_SNR_MAX / (DEFAULT_SNR_POINTS - 1) as f64;
    (0..DEFAULT_SNR_POINTS).map(|i| i as f64 * step).collect()
}
