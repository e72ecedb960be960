//! End-to-end time-domain link simulation
//!
//! Wires the stages in strict dependency order: mirror trace → displacement →
//! pointing fading → channel synthesis → receiver decision. Each stage
//! consumes a fully materialised series; nothing is streamed.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::bitstream::Bitstream;
use crate::channel;
use crate::config::{LinkParameters, ModulationPattern, SignalConfig};
use crate::error::{FsoError, Result};
use crate::fading::PointingFadingModel;
use crate::receiver::{self, ThresholdSweepResult};
use crate::trace::{AxisCalibration, DisplacementTrace, MirrorTrace};

/// Default integration grid for the fading overlap integral.
pub const DEFAULT_GRID_RESOLUTION: usize = 100;

/// Outcome of a PRBS run with the self-calibrating threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrbsOutcome {
    /// The mean-of-samples decision threshold that was applied [W].
    pub threshold_w: f64,
    /// Measured bit-error rate.
    pub ber: f64,
}

/// One configured simulation pipeline.
///
/// Holds the immutable link/signal parameters, the constant link-budget loss
/// factor, and the prebuilt fading model; each `run_*` call is an independent
/// realisation driven by the caller's generator.
#[derive(Debug, Clone)]
pub struct LinkSimulation {
    link: LinkParameters,
    signal: SignalConfig,
    constant_loss_linear: f64,
    fading: PointingFadingModel,
    cal_x: AxisCalibration,
    cal_y: AxisCalibration,
}

impl LinkSimulation {
    pub fn new(
        link: LinkParameters,
        signal: SignalConfig,
        constant_loss_linear: f64,
        grid_resolution: usize,
    ) -> Result<Self> {
        link.validate()?;
        signal.validate()?;
        let fading = PointingFadingModel::from_link(
            link.wavelength_m,
            link.divergence_rad,
            signal.refractive_index,
            link.aperture_diameter_m,
            grid_resolution,
        )?;
        Ok(Self {
            link,
            signal,
            constant_loss_linear,
            fading,
            cal_x: AxisCalibration::X_DEFAULT,
            cal_y: AxisCalibration::Y_DEFAULT,
        })
    }

    /// Override the bench DAC calibrations.
    pub fn with_calibration(mut self, cal_x: AxisCalibration, cal_y: AxisCalibration) -> Self {
        self.cal_x = cal_x;
        self.cal_y = cal_y;
        self
    }

    pub fn fading_model(&self) -> &PointingFadingModel {
        &self.fading
    }

    pub fn link(&self) -> &LinkParameters {
        &self.link
    }

    pub fn signal(&self) -> &SignalConfig {
        &self.signal
    }

    /// Generator honouring the reproducibility flag: fixed seed unless the
    /// configuration asks for a fresh entropy draw.
    pub fn make_rng(&self) -> StdRng {
        if self.signal.random {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(self.signal.seed)
        }
    }

    /// Full-swing mirror deflection at the receiver plane [m].
    fn displacement_scale_m(&self) -> f64 {
        (self.link.aperture_diameter_m + self.link.beam_radius_rx_m) / 2.0
    }

    /// Bit count covered by a recording: `bitrate × ⌊t_end⌋`.
    fn bit_count_for(&self, trace: &MirrorTrace) -> Result<usize> {
        let n_bits = self.signal.bitrate as usize * trace.end_time_s() as usize;
        if n_bits == 0 {
            return Err(FsoError::input(
                "trace too short for a single bit at the configured bitrate",
            ));
        }
        Ok(n_bits)
    }

    /// Map a recorded trace onto the upsampled signal clock.
    pub fn displacement_for(&self, trace: &MirrorTrace) -> Result<DisplacementTrace> {
        let n_samples = self.bit_count_for(trace)? * self.signal.r_f;
        trace.to_displacement(
            &self.cal_x,
            &self.cal_y,
            self.displacement_scale_m(),
            n_samples,
        )
    }

    /// Square-wave characterisation run over a threshold sweep.
    pub fn run_square(
        &self,
        trace: &MirrorTrace,
        thresholds_w: &[f64],
        rng: &mut StdRng,
    ) -> Result<ThresholdSweepResult> {
        let displacement = self.displacement_for(trace)?;
        self.run_square_on(&displacement, thresholds_w, rng)
    }

    /// Square-wave run on an already-sampled displacement (synthetic jitter
    /// path). The displacement length must be a whole number of bit periods.
    pub fn run_square_on(
        &self,
        displacement: &DisplacementTrace,
        thresholds_w: &[f64],
        rng: &mut StdRng,
    ) -> Result<ThresholdSweepResult> {
        let bits = Bitstream::periodic(self.bits_in(displacement)?)?;
        let waveform = self.synthesise(&bits, displacement, rng)?;
        let sweep = receiver::threshold_sweep(&waveform, self.signal.r_f, &bits, thresholds_w)?;
        info!(
            bits = bits.len(),
            thresholds = thresholds_w.len(),
            "square-wave sweep complete"
        );
        Ok(sweep)
    }

    /// PRBS run with the mean-of-samples threshold.
    pub fn run_prbs(&self, trace: &MirrorTrace, rng: &mut StdRng) -> Result<PrbsOutcome> {
        let displacement = self.displacement_for(trace)?;
        self.run_prbs_on(&displacement, rng)
    }

    /// PRBS run on an already-sampled displacement.
    pub fn run_prbs_on(
        &self,
        displacement: &DisplacementTrace,
        rng: &mut StdRng,
    ) -> Result<PrbsOutcome> {
        let bits = Bitstream::prbs(self.bits_in(displacement)?, rng)?;
        let waveform = self.synthesise(&bits, displacement, rng)?;
        let threshold_w = receiver::adaptive_threshold(&waveform, self.signal.r_f)?;
        let ber = receiver::decide(&waveform, self.signal.r_f, &bits, threshold_w)?;
        info!(bits = bits.len(), threshold_w, ber, "PRBS run complete");
        Ok(PrbsOutcome { threshold_w, ber })
    }

    /// Bit budget of a displacement series already on the signal clock.
    fn bits_in(&self, displacement: &DisplacementTrace) -> Result<usize> {
        let r_f = self.signal.r_f;
        if displacement.is_empty() || displacement.len() % r_f != 0 {
            return Err(FsoError::input(format!(
                "displacement length {} is not a whole number of {r_f}-sample bit periods",
                displacement.len()
            )));
        }
        Ok(displacement.len() / r_f)
    }

    /// Shared channel stage: fading series, constant loss, noise.
    fn synthesise(
        &self,
        bits: &Bitstream,
        displacement: &DisplacementTrace,
        rng: &mut StdRng,
    ) -> Result<Vec<f64>> {
        let attenuation = self.fading.fading_series(displacement)?;
        channel::simulate(
            bits,
            &attenuation,
            self.constant_loss_linear,
            self.link.tx_power_w,
            self.signal.r_f,
            &self.signal.noise,
            rng,
        )
    }

    /// The configured modulation, for callers that dispatch on it.
    pub fn modulation(&self) -> ModulationPattern {
        self.signal.modulation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NoiseSpec;
    use std::io::Cursor;

    fn quiet_signal() -> SignalConfig {
        SignalConfig {
            r_f: 4,
            bitrate: 10,
            noise: NoiseSpec::Empirical { mean_w: 0.0, std_w: 0.0 },
            ..SignalConfig::default()
        }
    }

    fn still_trace() -> MirrorTrace {
        // mirror parked at boresight for 2 s
        MirrorTrace::from_reader(Cursor::new(
            "0.0,36400,33200\n1.0,36400,33200\n2.0,36400,33200\n",
        ))
        .unwrap()
    }

    #[test]
    fn test_bit_count_follows_duration() {
        let sim = LinkSimulation::new(
            LinkParameters::default(),
            quiet_signal(),
            1.0,
            50,
        )
        .unwrap();
        let displacement = sim.displacement_for(&still_trace()).unwrap();
        // 10 bit/s × 2 s × 4 samples/bit
        assert_eq!(displacement.len(), 80);
    }

    #[test]
    fn test_too_short_trace_rejected() {
        let sim = LinkSimulation::new(
            LinkParameters::default(),
            quiet_signal(),
            1.0,
            50,
        )
        .unwrap();
        let trace =
            MirrorTrace::from_reader(Cursor::new("0.0,36400,33200\n0.5,36400,33200\n")).unwrap();
        assert!(sim.run_prbs(&trace, &mut sim.make_rng()).is_err());
    }

    #[test]
    fn test_noiseless_still_square_run_is_error_free() {
        let sim = LinkSimulation::new(
            LinkParameters::default(),
            quiet_signal(),
            1.0,
            50,
        )
        .unwrap();
        // threshold at half the noiseless high level
        let high = sim.link.tx_power_w * sim.fading_model().on_axis_capture();
        let sweep = sim
            .run_square(&still_trace(), &[high / 2.0], &mut sim.make_rng())
            .unwrap();
        assert_eq!(sweep[0].ber, 0.0);
    }

    #[test]
    fn test_fixed_seed_reproduces_prbs_outcome() {
        let signal = SignalConfig {
            seed: 17,
            noise: NoiseSpec::TargetSnr { snr_db: 10.0 },
            ..quiet_signal()
        };
        let sim =
            LinkSimulation::new(LinkParameters::default(), signal, 1.0, 50).unwrap();
        let a = sim.run_prbs(&still_trace(), &mut sim.make_rng()).unwrap();
        let b = sim.run_prbs(&still_trace(), &mut sim.make_rng()).unwrap();
        assert_eq!(a, b);
    }
}
