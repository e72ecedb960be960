//! Receiver-waveform synthesis
//!
//! Combines the upsampled bitstream, the constant link-budget loss, the
//! time-varying pointing attenuation, and additive Gaussian noise into the
//! optical power series the receiver sees. Stateless: every invocation is a
//! pure transform of its inputs plus a fresh draw from the caller's
//! generator.

use rand::Rng;
use tracing::debug;

use crate::bitstream::Bitstream;
use crate::config::NoiseSpec;
use crate::error::{FsoError, Result};
use crate::fading::AttenuationSeries;
use crate::units::db_to_linear;

/// Received optical power samples [W].
pub type ReceivedWaveform = Vec<f64>;

/// One zero-mean unit-variance Gaussian draw (Box–Muller).
pub fn gaussian<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Synthesize the received waveform.
///
/// The attenuation series must already be on the upsampled signal clock:
/// exactly `bits.len() × r_f` samples. The SNR noise mode sizes the noise
/// from the attenuated signal's own mean-square power; the empirical mode
/// applies fixed detector statistics regardless of the signal.
pub fn simulate<R: Rng>(
    bits: &Bitstream,
    attenuation: &AttenuationSeries,
    constant_loss_linear: f64,
    tx_power_w: f64,
    r_f: usize,
    noise: &NoiseSpec,
    rng: &mut R,
) -> Result<ReceivedWaveform> {
    if bits.is_empty() {
        return Err(FsoError::input("bitstream must contain at least one bit"));
    }
    if r_f == 0 {
        return Err(FsoError::input("r_f must be >= 1"));
    }
    let n_samples = bits.len() * r_f;
    if attenuation.len() != n_samples {
        return Err(FsoError::input(format!(
            "attenuation series has {} samples, expected {} (bits × r_f)",
            attenuation.len(),
            n_samples
        )));
    }
    if !(0.0..=1.0).contains(&constant_loss_linear) || constant_loss_linear == 0.0 {
        return Err(FsoError::input(format!(
            "constant loss factor must be in (0, 1], got {constant_loss_linear}"
        )));
    }

    // ideal transmitted waveform, then element-wise channel attenuation
    let mut waveform: Vec<f64> = bits
        .upsample_hold(r_f)
        .into_iter()
        .zip(attenuation)
        .map(|(sample, &fade)| sample * tx_power_w * constant_loss_linear * fade)
        .collect();

    match *noise {
        NoiseSpec::TargetSnr { snr_db } => {
            let signal_power =
                waveform.iter().map(|s| s * s).sum::<f64>() / waveform.len() as f64;
            let noise_power = signal_power / db_to_linear(snr_db);
            let noise_std = noise_power.sqrt();
            for sample in &mut waveform {
                *sample += noise_std * gaussian(rng);
            }
            debug!(snr_db, noise_std, "applied SNR-derived noise");
        }
        NoiseSpec::Empirical { mean_w, std_w } => {
            for sample in &mut waveform {
                *sample += mean_w + std_w * gaussian(rng);
            }
            debug!(mean_w, std_w, "applied empirical detector noise");
        }
    }

    Ok(waveform)
}
