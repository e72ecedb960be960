//! Sweep BER across jitter settings with synthetic mirror traces and print
//! the flat (sigma, mu, threshold, BER) table, then the analytical curve for
//! comparison.
//!
//! Run with `cargo run --release --example ber_sweep`.

use rand::rngs::StdRng;
use rand::SeedableRng;

use fso_core::analytical::{ber_vs_snr, irradiance_pdf, DEFAULT_PDF_POINTS};
use fso_core::config::{NoiseSpec, SignalConfig};
use fso_core::jitter::SyntheticJitter;
use fso_core::link_budget::compute_link_budget;
use fso_core::simulation::LinkSimulation;
use fso_core::sweep::{run_sweep, to_table, SweepCase};
use fso_core::{LinkParameters, LossSelectors};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let params = LinkParameters::default();

    // bench path: only the tabletop losses apply, not the long-range terms
    let mut selectors = LossSelectors::none_enabled();
    selectors.optics_loss = true;
    selectors.attenuator_loss = true;
    let report = compute_link_budget(&params, &selectors);

    let signal = SignalConfig {
        bitrate: 500,
        r_f: 20,
        seed: 7,
        noise: NoiseSpec::TargetSnr { snr_db: 14.0 },
        ..SignalConfig::default()
    };
    let n_samples = 500 * signal.r_f;
    let path_length_m = params.path_length_m;
    let sim = LinkSimulation::new(params, signal, report.constant_loss_linear(), 100)?;

    // one synthetic recording per commanded sigma
    let mut cases = Vec::new();
    for (index, sigma_urad) in [2.0, 5.0, 10.0].into_iter().enumerate() {
        let jitter = SyntheticJitter {
            sigma_rad: sigma_urad * 1e-6,
            path_length_m,
            sample_rate_hz: 10_000.0,
            cutoff_hz: 500.0,
        };
        let trace = jitter.generate(n_samples, &mut StdRng::seed_from_u64(index as u64))?;
        cases.push(SweepCase {
            sigma: sigma_urad,
            mu: 0.0,
            trace,
        });
    }

    let thresholds_v: Vec<f64> = (1..=16).map(|i| 0.05 * i as f64).collect();
    let records = run_sweep(&sim, &cases, &thresholds_v, 42)?;
    print!("{}", to_table(&records));

    // analytical reference at the same beam geometry
    let w0 = sim.fading_model().beam_waist_m();
    let pdf = irradiance_pdf(w0, sim.link().sigma_pj, 0.0, DEFAULT_PDF_POINTS)?;
    let curve = ber_vs_snr(&pdf, &[5.0, 10.0, 20.0, 40.0])?;
    println!();
    for (snr, ber) in curve.snr.iter().zip(&curve.ber) {
        println!("analytical: SNR {snr:>5.1} -> BER {ber:.3e}");
    }
    Ok(())
}
