//! FSO-Core: free-space optical link simulation under pointing jitter
//!
//! This library models an on-off-keyed free-space optical link disturbed by
//! steering-mirror pointing jitter and estimates its bit-error rate two
//! independent ways:
//!
//! - A deterministic dB-domain link budget over the static link constants
//! - A time-domain Monte-Carlo pipeline: recorded (or synthetic) mirror
//!   deflection → beam/aperture overlap fading → noisy receiver waveform →
//!   threshold decision
//! - A closed-form model integrating the irradiance density of the jittered
//!   beam against the Gaussian-channel error function
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fso_core::config::SimulationConfig;
//! use fso_core::link_budget::compute_link_budget;
//! use fso_core::simulation::{LinkSimulation, DEFAULT_GRID_RESOLUTION};
//! use fso_core::trace::MirrorTrace;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SimulationConfig::from_path("fso.toml")?;
//!     let report = compute_link_budget(&config.link, &config.losses);
//!     println!("{report}");
//!
//!     let trace = MirrorTrace::from_csv_path("fsm-std(0.1)-mean(0).csv")?;
//!     let sim = LinkSimulation::new(
//!         config.link,
//!         config.signal,
//!         report.constant_loss_linear(),
//!         DEFAULT_GRID_RESOLUTION,
//!     )?;
//!     let outcome = sim.run_prbs(&trace, &mut sim.make_rng())?;
//!     println!("BER = {}", outcome.ber);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analytical;
pub mod bitstream;
pub mod channel;
pub mod config;
pub mod error;
pub mod fading;
pub mod jitter;
pub mod link_budget;
pub mod receiver;
pub mod simulation;
pub mod sweep;
pub mod trace;
pub mod units;

// Re-export the types most callers touch
pub use bitstream::Bitstream;
pub use config::{
    LinkDirection, LinkParameters, LossSelectors, ModulationPattern, NoiseSpec, SignalConfig,
    SimulationConfig,
};
pub use error::{FsoError, Result};
pub use fading::{AttenuationSeries, PointingFadingModel};
pub use link_budget::{compute_link_budget, LinkBudgetReport};
pub use receiver::{ThresholdBer, ThresholdSweepResult};
pub use simulation::{LinkSimulation, PrbsOutcome};
pub use trace::{AxisCalibration, DisplacementTrace, MirrorTrace};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
