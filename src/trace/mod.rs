//! Mirror-trace ingestion and displacement mapping
//!
//! A recorded steering-mirror trace arrives as a 3-column table of
//! (time, x-code, y-code) DAC samples. Codes are mapped to receiver-plane
//! metres through per-axis calibration bounds, then linearly interpolated
//! onto the simulation's uniform sample clock.

use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{FsoError, Result};

/// Per-axis DAC calibration: the code values at full negative deflection,
/// boresight, and full positive deflection.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct AxisCalibration {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

impl AxisCalibration {
    /// Bench calibration of the x axis.
    pub const X_DEFAULT: AxisCalibration = AxisCalibration {
        low: 22850.0,
        mid: 36400.0,
        high: 45750.0,
    };

    /// Bench calibration of the y axis.
    pub const Y_DEFAULT: AxisCalibration = AxisCalibration {
        low: 22100.0,
        mid: 33200.0,
        high: 44000.0,
    };

    fn validate(&self) -> Result<()> {
        if !(self.low < self.mid && self.mid < self.high) {
            return Err(FsoError::config(
                "calibration",
                format!(
                    "bounds must satisfy low < mid < high, got {}/{}/{}",
                    self.low, self.mid, self.high
                ),
            ));
        }
        Ok(())
    }

    /// Map a raw code into [-1, 1], piecewise-linear around the mid code.
    fn normalise(&self, code: f64) -> f64 {
        if code < self.mid {
            (code - self.mid) / (self.mid - self.low)
        } else if code > self.mid {
            (code - self.mid) / (self.high - self.mid)
        } else {
            0.0
        }
    }
}

/// Raw recorded mirror trace: time plus x/y DAC codes.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorTrace {
    pub time_s: Vec<f64>,
    pub raw_x: Vec<f64>,
    pub raw_y: Vec<f64>,
}

impl MirrorTrace {
    /// Read a trace from a CSV file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a trace from any buffered reader.
    ///
    /// The first row is skipped when it does not parse as numbers (header
    /// leniency); malformed cells in later rows coerce to 0.0 rather than
    /// aborting the file, matching the acquisition tooling upstream.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut time_s = Vec::new();
        let mut raw_x = Vec::new();
        let mut raw_y = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut cells = trimmed.split(',').map(str::trim);
            let parsed: Vec<Option<f64>> = [cells.next(), cells.next(), cells.next()]
                .into_iter()
                .map(|cell| cell.and_then(|c| c.parse::<f64>().ok()))
                .collect();

            if index == 0 && parsed.iter().any(Option::is_none) {
                continue; // header row
            }
            if parsed.iter().any(Option::is_none) {
                warn!(row = index, "coercing malformed trace cells to 0");
            }
            time_s.push(parsed[0].unwrap_or(0.0));
            raw_x.push(parsed[1].unwrap_or(0.0));
            raw_y.push(parsed[2].unwrap_or(0.0));
        }

        let trace = Self { time_s, raw_x, raw_y };
        trace.validate()?;
        Ok(trace)
    }

    fn validate(&self) -> Result<()> {
        if self.time_s.is_empty() {
            return Err(FsoError::input("mirror trace contains no samples"));
        }
        if self.time_s.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FsoError::input(
                "mirror trace time axis must be strictly increasing",
            ));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_s.is_empty()
    }

    /// End of the recording [s]; the simulation clock spans [0, end].
    pub fn end_time_s(&self) -> f64 {
        *self.time_s.last().unwrap_or(&0.0)
    }

    /// Convert codes to metres and resample onto `n_samples` uniform points
    /// spanning [0, end]. `scale_m` is the deflection at full code swing,
    /// `(D_aperture + w_beam) / 2` in the bench setup.
    pub fn to_displacement(
        &self,
        cal_x: &AxisCalibration,
        cal_y: &AxisCalibration,
        scale_m: f64,
        n_samples: usize,
    ) -> Result<DisplacementTrace> {
        cal_x.validate()?;
        cal_y.validate()?;
        if n_samples == 0 {
            return Err(FsoError::input("resampling requires n_samples >= 1"));
        }

        let x_raw: Vec<f64> = self
            .raw_x
            .iter()
            .map(|&c| cal_x.normalise(c) * scale_m)
            .collect();
        let y_raw: Vec<f64> = self
            .raw_y
            .iter()
            .map(|&c| cal_y.normalise(c) * scale_m)
            .collect();

        let end = self.end_time_s();
        let step = if n_samples > 1 {
            end / (n_samples - 1) as f64
        } else {
            0.0
        };
        let time: Vec<f64> = (0..n_samples).map(|i| i as f64 * step).collect();
        let x_m = time.iter().map(|&t| interp(t, &self.time_s, &x_raw)).collect();
        let y_m = time.iter().map(|&t| interp(t, &self.time_s, &y_raw)).collect();

        Ok(DisplacementTrace { time_s: time, x_m, y_m })
    }
}

/// Beam-centroid displacement at the receiver plane, on the simulation's
/// uniform sample clock.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementTrace {
    pub time_s: Vec<f64>,
    pub x_m: Vec<f64>,
    pub y_m: Vec<f64>,
}

impl DisplacementTrace {
    /// Build a trace from already-uniform samples (synthetic jitter path).
    pub fn from_samples(time_s: Vec<f64>, x_m: Vec<f64>, y_m: Vec<f64>) -> Result<Self> {
        if time_s.len() != x_m.len() || time_s.len() != y_m.len() {
            return Err(FsoError::input(
                "displacement axes must have identical lengths",
            ));
        }
        if time_s.is_empty() {
            return Err(FsoError::input("displacement trace contains no samples"));
        }
        Ok(Self { time_s, x_m, y_m })
    }

    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_s.is_empty()
    }
}

/// Piecewise-linear interpolation with end clamping.
fn interp(xq: f64, xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    if xq <= xs[0] {
        return ys[0];
    }
    if xq >= xs[xs.len() - 1] {
        return ys[ys.len() - 1];
    }
    let hi = xs.partition_point(|&x| x < xq);
    let lo = hi - 1;
    let t = (xq - xs[lo]) / (xs[hi] - xs[lo]);
    ys[lo] + t * (ys[hi] - ys[lo])
}
