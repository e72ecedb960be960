//! dB/linear and power-unit conversions shared across the crate

/// Floor applied to transmission factors and probabilities before `log10`;
/// keeps deep fades from collapsing to `-inf` dB.
pub const TRANSMISSION_FLOOR: f64 = 1e-6;

/// `10·log10(x)` with the operand clamped to the smallest positive double,
/// so a non-positive operand can never produce NaN or -inf.
pub fn db10(x: f64) -> f64 {
    10.0 * x.max(f64::MIN_POSITIVE).log10()
}

/// dB to linear power ratio.
pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

/// Linear power ratio to dB (guarded like [`db10`]).
pub fn linear_to_db(linear: f64) -> f64 {
    db10(linear)
}

/// Watts to dBm.
pub fn watts_to_dbm(watts: f64) -> f64 {
    db10(watts * 1000.0)
}

/// Detector voltage to equivalent optical power, using the full-scale
/// normalisation factor (volts at `tx_power_w`).
pub fn volts_to_power(volts: f64, norm_factor: f64, tx_power_w: f64) -> f64 {
    volts / norm_factor * tx_power_w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db10_guards_nonpositive() {
        assert!(db10(0.0).is_finite());
        assert!(db10(-4.0).is_finite());
        assert!((db10(100.0) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_db_round_trip() {
        let x = 0.0375;
        assert!((db_to_linear(linear_to_db(x)) - x).abs() < 1e-12);
    }

    #[test]
    fn test_watts_to_dbm() {
        assert!((watts_to_dbm(1.0e-3) - 0.0).abs() < 1e-12);
        assert!((watts_to_dbm(1.0) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_volts_to_power_full_scale() {
        // full-scale voltage maps back to the transmit power
        let p = volts_to_power(3.8, 3.8, 2.5e-3);
        assert!((p - 2.5e-3).abs() < 1e-15);
    }
}
