//! Typed configuration for the link, loss selection, and signal generation
//!
//! A run is parameterised by three named groups in one TOML document:
//! `[inputs_design]` (physical link constants), `[losses_design]` (which loss
//! terms the budget sums), and `[inputs_signal]` (bitstream, clocking, and
//! noise settings). The groups are parsed once into immutable structs and
//! shared read-only by every component.

pub mod loader;

pub use loader::SimulationConfig;

use serde::{Deserialize, Serialize};

use crate::error::{FsoError, Result};

/// Link direction; selects between the beam-spread (uplink) and
/// wavefront-error (downlink) turbulence terms in the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    Up,
    Down,
}

/// Immutable physical constants of the optical link.
///
/// Created once from the `[inputs_design]` group and never mutated. All
/// lengths are metres, powers watts, and angles radians unless the field name
/// says otherwise.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkParameters {
    /// Transmit laser power [W].
    #[serde(default = "defaults::tx_power_w")]
    pub tx_power_w: f64,

    /// Beam divergence half-angle [rad].
    #[serde(default = "defaults::divergence_rad")]
    pub divergence_rad: f64,

    /// Pointing-jitter standard deviation. The budget's Tikhonov term reads
    /// this against the divergence angle; the fading and PDF paths read it as
    /// a receiver-plane displacement against the beam waist.
    #[serde(default = "defaults::sigma_pj")]
    pub sigma_pj: f64,

    /// Per-element optics throughput; the product is the Tx/Rx
    /// transmission loss.
    #[serde(default = "defaults::optics_transmission")]
    pub optics_transmission: Vec<f64>,

    /// Receiver aperture diameter [m].
    #[serde(default = "defaults::aperture_diameter_m")]
    pub aperture_diameter_m: f64,

    /// Beam radius at the receiver plane [m]; scales the mirror-code
    /// displacement mapping together with the aperture.
    #[serde(default = "defaults::beam_radius_rx_m")]
    pub beam_radius_rx_m: f64,

    /// Carrier wavelength [m].
    #[serde(default = "defaults::wavelength_m")]
    pub wavelength_m: f64,

    /// Meteorological visibility [km].
    #[serde(default = "defaults::visibility_km")]
    pub visibility_km: f64,

    /// Path length [m].
    #[serde(default = "defaults::path_length_m")]
    pub path_length_m: f64,

    /// Ambient temperature [°C]; carried for detector-noise bookkeeping.
    #[serde(default = "defaults::temperature_c")]
    pub temperature_c: f64,

    /// Static boresight offset at the receiver plane [m].
    #[serde(default = "defaults::boresight_offset_m")]
    pub boresight_offset_m: f64,

    /// Outage probability p_out used by the jitter and scintillation terms.
    #[serde(default = "defaults::outage_probability")]
    pub outage_probability: f64,

    /// Scintillation index σ_I of the refractive turbulence.
    #[serde(default = "defaults::scintillation_index")]
    pub scintillation_index: f64,

    /// Fried parameter r0 [m].
    #[serde(default = "defaults::fried_parameter_m")]
    pub fried_parameter_m: f64,

    /// Receiver optical efficiency η in (0, 1].
    #[serde(default = "defaults::rx_efficiency")]
    pub rx_efficiency: f64,

    /// Receiver sensitivity threshold [W].
    #[serde(default = "defaults::rx_threshold_w")]
    pub rx_threshold_w: f64,

    /// Normalisation factor: full-scale detector voltage per transmitted
    /// watt, also scaling the turbulence-spread terms.
    #[serde(default = "defaults::norm_factor")]
    pub norm_factor: f64,

    /// Fixed attenuator contribution [dB] (negative = loss).
    #[serde(default = "defaults::attenuator_db")]
    pub attenuator_db: f64,

    /// Link direction.
    #[serde(default = "defaults::direction")]
    pub direction: LinkDirection,
}

impl LinkParameters {
    /// Beam footprint diameter at the receiver, `L · θ_div` [m].
    pub fn spot_diameter_m(&self) -> f64 {
        self.path_length_m * self.divergence_rad
    }

    /// Beam waist at the detector focus, `λ / (θ_div · π · n)` [m].
    pub fn beam_waist_m(&self, refractive_index: f64) -> f64 {
        self.wavelength_m / (self.divergence_rad * std::f64::consts::PI * refractive_index)
    }

    /// Reject physically meaningless parameters before any computation runs.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("tx_power_w", self.tx_power_w),
            ("divergence_rad", self.divergence_rad),
            ("aperture_diameter_m", self.aperture_diameter_m),
            ("wavelength_m", self.wavelength_m),
            ("visibility_km", self.visibility_km),
            ("path_length_m", self.path_length_m),
            ("rx_threshold_w", self.rx_threshold_w),
            ("fried_parameter_m", self.fried_parameter_m),
        ];
        for (name, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(FsoError::config(
                    "inputs_design",
                    format!("{name} must be positive and finite, got {value}"),
                ));
            }
        }
        if self.sigma_pj < 0.0 {
            return Err(FsoError::config("inputs_design", "sigma_pj must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.rx_efficiency) || self.rx_efficiency == 0.0 {
            return Err(FsoError::config(
                "inputs_design",
                "rx_efficiency must be in (0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.outage_probability) {
            return Err(FsoError::config(
                "inputs_design",
                "outage_probability must be in [0, 1]",
            ));
        }
        Ok(())
    }
}

impl Default for LinkParameters {
    fn default() -> Self {
        Self {
            tx_power_w: defaults::tx_power_w(),
            divergence_rad: defaults::divergence_rad(),
            sigma_pj: defaults::sigma_pj(),
            optics_transmission: defaults::optics_transmission(),
            aperture_diameter_m: defaults::aperture_diameter_m(),
            beam_radius_rx_m: defaults::beam_radius_rx_m(),
            wavelength_m: defaults::wavelength_m(),
            visibility_km: defaults::visibility_km(),
            path_length_m: defaults::path_length_m(),
            temperature_c: defaults::temperature_c(),
            boresight_offset_m: defaults::boresight_offset_m(),
            outage_probability: defaults::outage_probability(),
            scintillation_index: defaults::scintillation_index(),
            fried_parameter_m: defaults::fried_parameter_m(),
            rx_efficiency: defaults::rx_efficiency(),
            rx_threshold_w: defaults::rx_threshold_w(),
            norm_factor: defaults::norm_factor(),
            attenuator_db: defaults::attenuator_db(),
            direction: defaults::direction(),
        }
    }
}

/// Per-term enable flags for the link budget. Antenna gains are always
/// included and have no flag.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LossSelectors {
    #[serde(default = "defaults::enabled")]
    pub optics_loss: bool,
    #[serde(default = "defaults::enabled")]
    pub free_space_loss: bool,
    #[serde(default = "defaults::enabled")]
    pub atmospheric_loss: bool,
    #[serde(default = "defaults::enabled")]
    pub static_pointing_loss: bool,
    #[serde(default = "defaults::enabled")]
    pub jitter_loss: bool,
    #[serde(default = "defaults::enabled")]
    pub scintillation_loss: bool,
    #[serde(default = "defaults::enabled")]
    pub beam_spread_loss: bool,
    #[serde(default = "defaults::enabled")]
    pub wavefront_error_loss: bool,
    #[serde(default = "defaults::enabled")]
    pub attenuator_loss: bool,
}

impl LossSelectors {
    /// All optional terms enabled.
    pub fn all_enabled() -> Self {
        Self {
            optics_loss: true,
            free_space_loss: true,
            atmospheric_loss: true,
            static_pointing_loss: true,
            jitter_loss: true,
            scintillation_loss: true,
            beam_spread_loss: true,
            wavefront_error_loss: true,
            attenuator_loss: true,
        }
    }

    /// All optional terms disabled; the budget reduces to the antenna gains.
    pub fn none_enabled() -> Self {
        Self {
            optics_loss: false,
            free_space_loss: false,
            atmospheric_loss: false,
            static_pointing_loss: false,
            jitter_loss: false,
            scintillation_loss: false,
            beam_spread_loss: false,
            wavefront_error_loss: false,
            attenuator_loss: false,
        }
    }
}

impl Default for LossSelectors {
    fn default() -> Self {
        Self::all_enabled()
    }
}

/// Additive receiver-noise specification. The two modes are distinct and
/// explicitly selected; they are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NoiseSpec {
    /// Zero-mean Gaussian noise sized from the attenuated signal's own
    /// mean-square power and a target SNR.
    TargetSnr { snr_db: f64 },
    /// Fixed detector-noise statistics in the waveform's power unit,
    /// independent of the instantaneous signal.
    Empirical { mean_w: f64, std_w: f64 },
}

/// Transmit-sequence variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModulationPattern {
    /// Alternating 1/0 square wave.
    Periodic,
    /// LFSR pseudo-random binary sequence.
    Prbs,
}

/// Signal-chain settings from the `[inputs_signal]` group.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignalConfig {
    /// When false, the run seeds its generator from `seed` and is fully
    /// reproducible; when true a fresh seed is drawn from entropy.
    #[serde(default)]
    pub random: bool,

    /// Base seed for the injected generator (PRBS register, AWGN draws,
    /// synthetic jitter).
    #[serde(default)]
    pub seed: u64,

    /// Samples per bit; each bit is held for this many high-rate samples.
    #[serde(default = "defaults::r_f")]
    pub r_f: usize,

    /// Bit rate [bit/s].
    #[serde(default = "defaults::bitrate")]
    pub bitrate: u32,

    /// High-rate sample clock [Hz] for synthetic jitter generation.
    #[serde(default = "defaults::sample_rate_hz")]
    pub sample_rate_hz: f64,

    /// Butterworth cutoff [Hz] shaping synthetic jitter.
    #[serde(default = "defaults::filter_cutoff_hz")]
    pub filter_cutoff_hz: f64,

    /// Refractive index n entering the beam-waist relation.
    #[serde(default = "defaults::refractive_index")]
    pub refractive_index: f64,

    /// Mean boresight offset μ [m] for the analytical irradiance PDF.
    #[serde(default)]
    pub mu: f64,

    /// Transmit-sequence variant.
    #[serde(default = "defaults::modulation")]
    pub modulation: ModulationPattern,

    /// Receiver-noise mode.
    #[serde(default = "defaults::noise")]
    pub noise: NoiseSpec,
}

impl SignalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.r_f == 0 {
            return Err(FsoError::config("inputs_signal", "r_f must be >= 1"));
        }
        if self.bitrate == 0 {
            return Err(FsoError::config("inputs_signal", "bitrate must be >= 1"));
        }
        if self.sample_rate_hz <= 0.0 || self.filter_cutoff_hz <= 0.0 {
            return Err(FsoError::config(
                "inputs_signal",
                "sample_rate_hz and filter_cutoff_hz must be positive",
            ));
        }
        if self.filter_cutoff_hz >= self.sample_rate_hz / 2.0 {
            return Err(FsoError::config(
                "inputs_signal",
                "filter_cutoff_hz must be below the Nyquist rate",
            ));
        }
        if let NoiseSpec::Empirical { std_w, .. } = self.noise {
            if std_w < 0.0 {
                return Err(FsoError::config("inputs_signal", "noise std_w must be >= 0"));
            }
        }
        Ok(())
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            random: false,
            seed: 0,
            r_f: defaults::r_f(),
            bitrate: defaults::bitrate(),
            sample_rate_hz: defaults::sample_rate_hz(),
            filter_cutoff_hz: defaults::filter_cutoff_hz(),
            refractive_index: defaults::refractive_index(),
            mu: 0.0,
            modulation: defaults::modulation(),
            noise: defaults::noise(),
        }
    }
}

/// Default value providers, teacher-style: one function per field so the
/// serde attributes and programmatic defaults cannot drift apart.
mod defaults {
    use super::{LinkDirection, ModulationPattern, NoiseSpec};

    pub fn tx_power_w() -> f64 { 2.5e-3 }
    pub fn divergence_rad() -> f64 { 0.5e-3 }
    pub fn sigma_pj() -> f64 { 2.0e-3 }
    pub fn optics_transmission() -> Vec<f64> { vec![0.99, 0.95, 0.9] }
    pub fn aperture_diameter_m() -> f64 { 1.0e-3 }
    pub fn beam_radius_rx_m() -> f64 { 1.0e-3 }
    pub fn wavelength_m() -> f64 { 1.55e-6 }
    pub fn visibility_km() -> f64 { 10.0 }
    pub fn path_length_m() -> f64 { 50.0 }
    pub fn temperature_c() -> f64 { 20.0 }
    pub fn boresight_offset_m() -> f64 { 0.1e-3 }
    pub fn outage_probability() -> f64 { 0.01 }
    pub fn scintillation_index() -> f64 { 0.1 }
    pub fn fried_parameter_m() -> f64 { 0.05 }
    pub fn rx_efficiency() -> f64 { 0.8 }
    pub fn rx_threshold_w() -> f64 { 1.0e-6 }
    pub fn norm_factor() -> f64 { 3.8 }
    pub fn attenuator_db() -> f64 { -3.0 }
    pub fn direction() -> LinkDirection { LinkDirection::Down }

    pub fn enabled() -> bool { true }

    pub fn r_f() -> usize { 20 }
    pub fn bitrate() -> u32 { 1000 }
    pub fn sample_rate_hz() -> f64 { 1.0e7 }
    pub fn filter_cutoff_hz() -> f64 { 1.0e5 }
    pub fn refractive_index() -> f64 { 1.0 }
    pub fn modulation() -> ModulationPattern { ModulationPattern::Periodic }
    pub fn noise() -> NoiseSpec { NoiseSpec::TargetSnr { snr_db: 20.0 } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let link = LinkParameters::default();
        link.validate().unwrap();
        let signal = SignalConfig::default();
        signal.validate().unwrap();
    }

    #[test]
    fn test_beam_waist_matches_divergence_relation() {
        let link = LinkParameters::default();
        let w0 = link.beam_waist_m(1.0);
        let expected =
            link.wavelength_m / (link.divergence_rad * std::f64::consts::PI);
        assert!((w0 - expected).abs() < 1e-15);
    }

    #[test]
    fn test_validate_rejects_nonpositive_wavelength() {
        let link = LinkParameters {
            wavelength_m: 0.0,
            ..LinkParameters::default()
        };
        assert!(link.validate().is_err());
    }

    #[test]
    fn test_noise_spec_toml_round_trip() {
        let snr: NoiseSpec = toml::from_str("mode = \"target_snr\"\nsnr_db = 15.0").unwrap();
        assert_eq!(snr, NoiseSpec::TargetSnr { snr_db: 15.0 });

        let emp: NoiseSpec =
            toml::from_str("mode = \"empirical\"\nmean_w = -0.00014\nstd_w = 0.00036").unwrap();
        assert!(matches!(emp, NoiseSpec::Empirical { .. }));
    }

    #[test]
    fn test_selectors_none_enabled() {
        let sel = LossSelectors::none_enabled();
        assert!(!sel.optics_loss && !sel.free_space_loss && !sel.attenuator_loss);
    }
}
