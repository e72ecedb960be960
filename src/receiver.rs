//! On-off-keying decision and BER counting
//!
//! The receiver samples the waveform once per bit period (the bit-start
//! sample), binarises against a threshold, and counts mismatches against the
//! transmitted bits.

use crate::bitstream::Bitstream;
use crate::channel::ReceivedWaveform;
use crate::error::{FsoError, Result};

/// One row of a threshold sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdBer {
    /// Decision threshold in the waveform's power unit [W].
    pub threshold_w: f64,
    /// Bit-error rate at that threshold.
    pub ber: f64,
}

/// Ordered (threshold, BER) pairs for one trace/noise realisation.
pub type ThresholdSweepResult = Vec<ThresholdBer>;

/// Sample the waveform at the start of every bit period.
fn bit_samples(waveform: &ReceivedWaveform, r_f: usize) -> Vec<f64> {
    waveform.iter().step_by(r_f).copied().collect()
}

fn check_lengths(waveform: &ReceivedWaveform, r_f: usize, sent: &Bitstream) -> Result<()> {
    if sent.is_empty() {
        return Err(FsoError::input("BER is undefined for an empty bitstream"));
    }
    if r_f == 0 {
        return Err(FsoError::input("r_f must be >= 1"));
    }
    if waveform.len() != sent.len() * r_f {
        return Err(FsoError::input(format!(
            "waveform has {} samples, expected {} (bits × r_f)",
            waveform.len(),
            sent.len() * r_f
        )));
    }
    Ok(())
}

/// BER for a single decision threshold.
pub fn decide(
    waveform: &ReceivedWaveform,
    r_f: usize,
    sent: &Bitstream,
    threshold_w: f64,
) -> Result<f64> {
    check_lengths(waveform, r_f, sent)?;
    let errors = bit_samples(waveform, r_f)
        .iter()
        .zip(sent.bits())
        .filter(|(&sample, &bit)| (sample > threshold_w) as u8 != bit)
        .count();
    Ok(errors as f64 / sent.len() as f64)
}

/// BER across a caller-supplied threshold sweep, one decision pass per
/// threshold over the same realisation.
pub fn threshold_sweep(
    waveform: &ReceivedWaveform,
    r_f: usize,
    sent: &Bitstream,
    thresholds_w: &[f64],
) -> Result<ThresholdSweepResult> {
    check_lengths(waveform, r_f, sent)?;
    let samples = bit_samples(waveform, r_f);
    let result = thresholds_w
        .iter()
        .map(|&threshold_w| {
            let errors = samples
                .iter()
                .zip(sent.bits())
                .filter(|(&sample, &bit)| (sample > threshold_w) as u8 != bit)
                .count();
            ThresholdBer {
                threshold_w,
                ber: errors as f64 / sent.len() as f64,
            }
        })
        .collect();
    Ok(result)
}

/// Threshold at the mean of the sampled points; the self-calibrating
/// decision the PRBS run uses.
pub fn adaptive_threshold(waveform: &ReceivedWaveform, r_f: usize) -> Result<f64> {
    if waveform.is_empty() || r_f == 0 {
        return Err(FsoError::input("adaptive threshold needs a non-empty waveform"));
    }
    let samples = bit_samples(waveform, r_f);
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// The default sweep of the bench tooling: 0.05 V to 0.80 V in 0.05 V steps,
/// converted to watts through the full-scale normalisation.
pub fn default_threshold_sweep_w(norm_factor: f64, tx_power_w: f64) -> Vec<f64> {
    (1..=16)
        .map(|i| crate::units::volts_to_power(0.05 * i as f64, norm_factor, tx_power_w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_waveform(bits: &Bitstream, r_f: usize, amplitude: f64) -> ReceivedWaveform {
        bits.upsample_hold(r_f).iter().map(|s| s * amplitude).collect()
    }

    #[test]
    fn test_clean_signal_decodes_exactly() {
        let bits = Bitstream::periodic(100).unwrap();
        let wave = clean_waveform(&bits, 4, 1.0e-3);
        let ber = decide(&wave, 4, &bits, 0.5e-3).unwrap();
        assert_eq!(ber, 0.0);
    }

    #[test]
    fn test_threshold_above_high_state_misses_all_ones() {
        let bits = Bitstream::periodic(100).unwrap();
        let wave = clean_waveform(&bits, 4, 1.0e-3);
        // every 1 bit is misread as 0; half the bits are 1
        let ber = decide(&wave, 4, &bits, 2.0e-3).unwrap();
        assert_eq!(ber, 0.5);
    }

    #[test]
    fn test_empty_bitstream_is_invalid() {
        let bits = Bitstream::periodic(1).unwrap();
        let err = decide(&Vec::new(), 4, &bits, 0.5).unwrap_err();
        assert!(matches!(err, FsoError::InvalidInput(_)));
    }

    #[test]
    fn test_sweep_covers_all_thresholds() {
        let bits = Bitstream::periodic(10).unwrap();
        let wave = clean_waveform(&bits, 2, 1.0);
        let sweep = threshold_sweep(&wave, 2, &bits, &[0.25, 0.5, 1.5]).unwrap();
        assert_eq!(sweep.len(), 3);
        assert_eq!(sweep[0].ber, 0.0);
        assert_eq!(sweep[2].ber, 0.5);
    }

    #[test]
    fn test_adaptive_threshold_separates_balanced_signal() {
        let bits = Bitstream::periodic(100).unwrap();
        let wave = clean_waveform(&bits, 4, 2.0e-3);
        let threshold = adaptive_threshold(&wave, 4).unwrap();
        assert!((threshold - 1.0e-3).abs() < 1e-12);
        let ber = decide(&wave, 4, &bits, threshold).unwrap();
        assert_eq!(ber, 0.0);
    }

    #[test]
    fn test_default_sweep_shape() {
        let sweep = default_threshold_sweep_w(3.8, 2.5e-3);
        assert_eq!(sweep.len(), 16);
        assert!(sweep.windows(2).all(|w| w[1] > w[0]));
        // first entry is 0.05 V mapped through the 3.8 V full scale
        assert!((sweep[0] - 0.05 / 3.8 * 2.5e-3).abs() < 1e-18);
    }
}
