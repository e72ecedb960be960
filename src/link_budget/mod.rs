//! Deterministic dB-domain link-budget accountant
//!
//! Pure computation over an immutable [`LinkParameters`]/[`LossSelectors`]
//! pair: each enabled loss term comes from a closed-form physical formula,
//! antenna gains are always included, and the result is an ordered report of
//! named dB quantities plus the derived link margin.

use std::fmt;

use crate::config::{LinkDirection, LinkParameters, LossSelectors};
use crate::units::{db10, db_to_linear, watts_to_dbm, TRANSMISSION_FLOOR};

/// Report labels. Downstream consumers extract scalars by these names.
pub const LABEL_TX_POWER: &str = "Transmit laser power [dBm]";
pub const LABEL_TX_GAIN: &str = "Tx Antenna gain [dB]";
pub const LABEL_OPTICS: &str = "Tx/Rx transmission loss [dB]";
pub const LABEL_FREE_SPACE: &str = "Free space loss [dB]";
pub const LABEL_ATMOSPHERIC: &str = "Atmospheric loss [dB]";
pub const LABEL_STATIC_POINTING: &str = "Systematic pointing loss [dB]";
pub const LABEL_JITTER: &str = "Pointing jitter loss [dB]";
pub const LABEL_SCINTILLATION: &str = "Scintillation loss [dB]";
pub const LABEL_BEAM_SPREAD: &str = "Beam spread loss [dB]";
pub const LABEL_WAVEFRONT: &str = "Wavefront error loss [dB]";
pub const LABEL_RX_GAIN: &str = "Rx Antenna gain [dB]";
pub const LABEL_ATTENUATOR: &str = "Attenuator loss [dB]";
pub const LABEL_TOTAL: &str = "Total losses [dB]";
pub const LABEL_TOTAL_CONST: &str = "Total constant loss [dB]";
pub const LABEL_RX_POWER: &str = "Received power [dBm]";
pub const LABEL_MARGIN: &str = "Link margin [dB]";
pub const LABEL_RX_THRESHOLD: &str = "Rx threshold [dBm]";

/// Ordered mapping of named dB quantities. Produced once per
/// parameters/selectors pair; immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkBudgetReport {
    entries: Vec<(String, f64)>,
}

impl LinkBudgetReport {
    /// Scalar lookup by report label.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| *value)
    }

    /// All rows in report order.
    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    /// Total losses including antenna gains [dB].
    pub fn total_losses_db(&self) -> f64 {
        self.get(LABEL_TOTAL).unwrap_or(0.0)
    }

    /// Sum of the enabled loss terms without antenna gains [dB]; the scalar
    /// the time-domain simulator applies as its constant attenuation.
    pub fn constant_loss_db(&self) -> f64 {
        self.get(LABEL_TOTAL_CONST).unwrap_or(0.0)
    }

    /// Constant loss as a linear power factor.
    pub fn constant_loss_linear(&self) -> f64 {
        db_to_linear(self.constant_loss_db())
    }

    /// Link margin [dB].
    pub fn link_margin_db(&self) -> f64 {
        self.get(LABEL_MARGIN).unwrap_or(0.0)
    }
}

impl fmt::Display for LinkBudgetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .entries
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0);
        writeln!(f, "{:-^1$}", " Link budget ", width + 12)?;
        for (name, value) in &self.entries {
            writeln!(f, "{name:width$}  {value:>9.3}")?;
        }
        Ok(())
    }
}

/// Transmitter antenna gain, `8/θ²` [dB].
pub fn tx_gain_db(params: &LinkParameters) -> f64 {
    db10(8.0 / params.divergence_rad.powi(2))
}

/// Receiver antenna gain, `η·(πD/λ)²` [dB].
pub fn rx_gain_db(params: &LinkParameters) -> f64 {
    let g = params.rx_efficiency
        * (std::f64::consts::PI * params.aperture_diameter_m / params.wavelength_m).powi(2);
    db10(g)
}

/// Friis free-space loss, `(4πL/λ)⁻²` [dB].
pub fn free_space_loss_db(params: &LinkParameters) -> f64 {
    let l_fs =
        (4.0 * std::f64::consts::PI * params.path_length_m / params.wavelength_m).powi(-2);
    -db10(l_fs).abs()
}

/// Combined optics transmission loss from the per-element throughput
/// product [dB].
pub fn optics_loss_db(params: &LinkParameters) -> f64 {
    let product: f64 = params.optics_transmission.iter().product();
    -db10(product).abs()
}

/// Static pointing loss from the boresight offset, Gaussian
/// approximation [dB].
pub fn static_pointing_loss_db(params: &LinkParameters) -> f64 {
    let theta_pe = params.boresight_offset_m / params.path_length_m;
    let t_pe = (-2.0 * theta_pe.powi(2) / params.divergence_rad.powi(2)).exp();
    // deep offsets would otherwise drive the log to -inf
    let t_pe = t_pe.max(TRANSMISSION_FLOOR);
    -db10(t_pe).abs()
}

/// Average jitter-induced loss, Tikhonov-style closed form [dB].
pub fn jitter_loss_db(params: &LinkParameters) -> f64 {
    let theta2 = params.divergence_rad.powi(2);
    let sigma2 = params.sigma_pj.powi(2);
    let p_out = params.outage_probability.max(TRANSMISSION_FLOOR);
    let factor = theta2 / (theta2 + 4.0 * sigma2) * p_out.powf(4.0 * sigma2 / theta2);
    -db10(factor).abs()
}

/// Scintillation loss, Andrews/Phillips empirical fit [dB].
pub fn scintillation_loss_db(params: &LinkParameters) -> f64 {
    let p_out = params.outage_probability.max(TRANSMISSION_FLOOR);
    let fit = (3.3 - 5.77 * (-p_out.ln()).sqrt()) * params.scintillation_index.powf(0.8);
    -fit.abs()
}

/// Turbulence spreading factor shared by the beam-spread and wavefront
/// terms, `(1+(D_spot/r0)^{5/3})^{-5/6}` scaled by the normalisation
/// factor [dB].
fn turbulence_spread_db(params: &LinkParameters) -> f64 {
    let ratio = params.spot_diameter_m() / params.fried_parameter_m;
    let spread = (1.0 + ratio.powf(5.0 / 3.0)).powf(-5.0 / 6.0);
    -(db10(spread) * params.norm_factor).abs()
}

/// Beam-spread loss; applies on the uplink [dB].
pub fn beam_spread_loss_db(params: &LinkParameters) -> f64 {
    turbulence_spread_db(params)
}

/// Wavefront-error loss; applies on the downlink [dB].
pub fn wavefront_loss_db(params: &LinkParameters) -> f64 {
    turbulence_spread_db(params)
}

/// Atmospheric extinction from meteorological visibility [dB].
pub fn atmospheric_loss_db(params: &LinkParameters) -> f64 {
    let sigma = 3.91 / params.visibility_km * (params.wavelength_m / 550e-9).powf(-1.6);
    let t_atmos = (-sigma * (params.path_length_m / 1000.0)).exp();
    -db10(t_atmos).abs()
}

/// Compute the full link budget.
///
/// Disabled terms contribute 0 dB. The beam-spread term only applies on the
/// uplink and the wavefront term on the downlink, mirroring which turbulence
/// effect dominates at each end.
pub fn compute_link_budget(
    params: &LinkParameters,
    selectors: &LossSelectors,
) -> LinkBudgetReport {
    let gated = |enabled: bool, value: f64| if enabled { value } else { 0.0 };

    let g_tx = tx_gain_db(params);
    let g_rx = rx_gain_db(params);

    let optics = gated(selectors.optics_loss, optics_loss_db(params));
    let free_space = gated(selectors.free_space_loss, free_space_loss_db(params));
    let atmospheric = gated(selectors.atmospheric_loss, atmospheric_loss_db(params));
    let static_pointing = gated(
        selectors.static_pointing_loss,
        static_pointing_loss_db(params),
    );
    let jitter = gated(selectors.jitter_loss, jitter_loss_db(params));
    let scintillation = gated(selectors.scintillation_loss, scintillation_loss_db(params));
    let beam_spread = gated(
        selectors.beam_spread_loss && params.direction == LinkDirection::Up,
        beam_spread_loss_db(params),
    );
    let wavefront = gated(
        selectors.wavefront_error_loss && params.direction == LinkDirection::Down,
        wavefront_loss_db(params),
    );
    let attenuator = gated(selectors.attenuator_loss, params.attenuator_db);

    let total_const = optics
        + free_space
        + atmospheric
        + static_pointing
        + jitter
        + scintillation
        + beam_spread
        + wavefront
        + attenuator;
    let total = total_const + g_tx + g_rx;

    let p_tx_dbm = watts_to_dbm(params.tx_power_w);
    let rx_threshold_dbm = watts_to_dbm(params.rx_threshold_w);
    let p_rx_dbm = p_tx_dbm + total;
    let link_margin = total + p_tx_dbm - rx_threshold_dbm;

    let entries = vec![
        (LABEL_TX_POWER.to_string(), p_tx_dbm),
        (LABEL_TX_GAIN.to_string(), g_tx),
        (LABEL_OPTICS.to_string(), optics),
        (LABEL_FREE_SPACE.to_string(), free_space),
        (LABEL_ATMOSPHERIC.to_string(), atmospheric),
        (LABEL_STATIC_POINTING.to_string(), static_pointing),
        (LABEL_JITTER.to_string(), jitter),
        (LABEL_SCINTILLATION.to_string(), scintillation),
        (LABEL_BEAM_SPREAD.to_string(), beam_spread),
        (LABEL_WAVEFRONT.to_string(), wavefront),
        (LABEL_RX_GAIN.to_string(), g_rx),
        (LABEL_ATTENUATOR.to_string(), attenuator),
        (LABEL_TOTAL.to_string(), total),
        (LABEL_TOTAL_CONST.to_string(), total_const),
        (LABEL_RX_POWER.to_string(), p_rx_dbm),
        (LABEL_MARGIN.to_string(), link_margin),
        (LABEL_RX_THRESHOLD.to_string(), rx_threshold_dbm),
    ];

    LinkBudgetReport { entries }
}
