//! One-shot TOML configuration loading
//!
//! The document is parsed once per run; components receive the already-parsed
//! groups. There is no hot reload: a batch run either completes with the
//! configuration it started with or fails outright.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::config::{LinkParameters, LossSelectors, SignalConfig};
use crate::error::{FsoError, Result};

/// Group names recognised in the configuration document.
pub const GROUP_LINK: &str = "inputs_design";
pub const GROUP_LOSSES: &str = "losses_design";
pub const GROUP_SIGNAL: &str = "inputs_signal";

/// The three parsed configuration groups of a run.
#[derive(Debug, Clone, Default)]
pub struct SimulationConfig {
    pub link: LinkParameters,
    pub losses: LossSelectors,
    pub signal: SignalConfig,
}

impl SimulationConfig {
    /// Load and validate a configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.as_ref().display(), "configuration loaded");
        Ok(config)
    }

    /// Parse a configuration document from a string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let doc: toml::Value = toml::from_str(content)?;

        let link: LinkParameters = extract_group(&doc, GROUP_LINK)?;
        let losses: LossSelectors = extract_group(&doc, GROUP_LOSSES)?;
        let signal: SignalConfig = extract_group(&doc, GROUP_SIGNAL)?;

        link.validate()?;
        signal.validate()?;

        Ok(Self { link, losses, signal })
    }
}

/// Deserialise one named group from a parsed document. A missing group
/// deserialises from an empty table, so a group consisting entirely of
/// defaulted fields may be omitted.
pub fn extract_group<T: DeserializeOwned>(doc: &toml::Value, group: &str) -> Result<T> {
    let table = match doc.get(group) {
        Some(value) if value.is_table() => value.clone(),
        Some(_) => {
            return Err(FsoError::config(group, "group must be a TOML table"));
        }
        None => toml::Value::Table(toml::map::Map::new()),
    };
    table
        .try_into()
        .map_err(|e: toml::de::Error| FsoError::config(group, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModulationPattern, NoiseSpec};
    use std::io::Write;

    const SAMPLE: &str = r#"
[inputs_design]
tx_power_w = 2.5e-3
divergence_rad = 0.5e-3
sigma_pj = 2.0e-3
aperture_diameter_m = 1.0e-3
wavelength_m = 1.55e-6
path_length_m = 50.0
direction = "down"

[losses_design]
beam_spread_loss = false

[inputs_signal]
r_f = 20
bitrate = 1000
modulation = "prbs"
noise = { mode = "target_snr", snr_db = 12.0 }
"#;

    #[test]
    fn test_parse_sample_document() {
        let config = SimulationConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.link.tx_power_w, 2.5e-3);
        assert!(!config.losses.beam_spread_loss);
        assert!(config.losses.free_space_loss); // defaulted
        assert_eq!(config.signal.modulation, ModulationPattern::Prbs);
        assert_eq!(config.signal.noise, NoiseSpec::TargetSnr { snr_db: 12.0 });
    }

    #[test]
    fn test_missing_groups_fall_back_to_defaults() {
        let config = SimulationConfig::from_toml_str("").unwrap();
        assert_eq!(config.link.wavelength_m, 1.55e-6);
        assert_eq!(config.signal.r_f, 20);
        assert!(config.losses.jitter_loss);
    }

    #[test]
    fn test_invalid_parameter_rejected() {
        let doc = "[inputs_design]\nwavelength_m = -1.0\n";
        let err = SimulationConfig::from_toml_str(doc).unwrap_err();
        assert!(matches!(err, FsoError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_group_must_be_table() {
        let doc = "inputs_design = 4\n";
        assert!(SimulationConfig::from_toml_str(doc).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = SimulationConfig::from_path(file.path()).unwrap();
        assert_eq!(config.signal.bitrate, 1000);
    }
}
