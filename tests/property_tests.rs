//! Property-based checks for the random and numeric primitives

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use fso_core::bitstream::Bitstream;
use fso_core::fading::PointingFadingModel;
use fso_core::trace::{AxisCalibration, DisplacementTrace};

proptest! {
    #[test]
    fn prbs_is_reproducible_for_any_seed(seed: u64, n_bits in 1usize..512) {
        let a = Bitstream::prbs(n_bits, &mut StdRng::seed_from_u64(seed)).unwrap();
        let b = Bitstream::prbs(n_bits, &mut StdRng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prbs_bits_are_binary(seed: u64) {
        let stream = Bitstream::prbs(256, &mut StdRng::seed_from_u64(seed)).unwrap();
        prop_assert!(stream.bits().iter().all(|&b| b <= 1));
    }

    #[test]
    fn fading_values_stay_in_unit_interval(
        displacements in prop::collection::vec((-5.0e-3..5.0e-3f64, -5.0e-3..5.0e-3f64), 1..64)
    ) {
        let model = PointingFadingModel::new(1.0e-3, 2.0e-3, 21).unwrap();
        let n = displacements.len();
        let (x, y): (Vec<f64>, Vec<f64>) = displacements.into_iter().unzip();
        let time = (0..n).map(|i| i as f64).collect();
        let trace = DisplacementTrace::from_samples(time, x, y).unwrap();

        let series = model.fading_series(&trace).unwrap();
        let on_axis = model.on_axis_capture();
        for &value in &series {
            prop_assert!(value > 0.0 && value <= 1.0, "value {} out of (0, 1]", value);
            prop_assert!(value <= on_axis, "value {} exceeds on-axis {}", value, on_axis);
        }
    }

    #[test]
    fn calibration_normalisation_is_bounded_and_monotone(
        code in 22850.0..45750.0f64, delta in 1.0..500.0f64
    ) {
        let cal = AxisCalibration::X_DEFAULT;
        let scale = 1.0e-3;
        let a = normalise_via_trace(&cal, code, scale);
        prop_assert!((-scale..=scale).contains(&a));
        if code + delta <= cal.high {
            let b = normalise_via_trace(&cal, code + delta, scale);
            prop_assert!(b >= a, "mapping must be monotone: {} then {}", a, b);
        }
    }
}

/// Push a single code through the public displacement path.
fn normalise_via_trace(cal: &AxisCalibration, code: f64, scale: f64) -> f64 {
    let trace = fso_core::trace::MirrorTrace {
        time_s: vec![0.0, 1.0],
        raw_x: vec![code, code],
        raw_y: vec![cal.mid, cal.mid],
    };
    let displacement = trace
        .to_displacement(cal, &AxisCalibration::Y_DEFAULT, scale, 2)
        .unwrap();
    displacement.x_m[0]
}
