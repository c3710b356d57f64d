//! Per-input overrides of the knitting calculator's bounds.
//!
//! ```toml
//! [gauge_cm]
//! max = 30.0
//! step = 0.25
//!
//! [desired_width]
//! default = 60.0
//! unit = "in"
//! ```
//!
//! Each table is optional and every key within it is optional; anything left
//! out keeps its built-in value. Unknown tables or keys are rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::input::InputSpec;
use crate::knitting::{default_inputs, names};
use crate::value::CellName;

/// Overrides for one input; `None` keeps the built-in value
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputOverride {
    /// Lower bound
    pub min: Option<f64>,
    /// Upper bound
    pub max: Option<f64>,
    /// UI increment
    pub step: Option<f64>,
    /// Initial value
    pub default: Option<f64>,
    /// Display unit
    pub unit: Option<String>,
}

impl InputOverride {
    /// Apply the overrides on top of `base`
    pub fn apply(&self, base: &InputSpec) -> InputSpec {
        InputSpec {
            min: self.min.unwrap_or(base.min),
            max: self.max.unwrap_or(base.max),
            step: self.step.unwrap_or(base.step),
            default: self.default.unwrap_or(base.default),
            unit: self.unit.clone().or_else(|| base.unit.clone()),
        }
    }
}

/// Configuration of the four calculator inputs
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GaugeConfig {
    /// Overrides for the desired width
    pub desired_width: InputOverride,
    /// Overrides for the desired stitch count
    pub desired_stitches: InputOverride,
    /// Overrides for the swatch stitch count
    pub gauge_stitches: InputOverride,
    /// Overrides for the swatch width
    pub gauge_cm: InputOverride,
}

impl GaugeConfig {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Overrides for the input called `name`
    pub fn override_for(&self, name: &str) -> Option<&InputOverride> {
        match name {
            names::DESIRED_WIDTH => Some(&self.desired_width),
            names::DESIRED_STITCHES => Some(&self.desired_stitches),
            names::GAUGE_STITCHES => Some(&self.gauge_stitches),
            names::GAUGE_CM => Some(&self.gauge_cm),
            _ => None,
        }
    }

    /// Final spec of every input, validated
    pub fn resolve(&self) -> Result<Vec<(CellName, InputSpec)>, ConfigError> {
        default_inputs()
            .into_iter()
            .map(|(name, base)| {
                let name = CellName::new(name);
                let spec = match self.override_for(name.as_str()) {
                    Some(overrides) => overrides.apply(&base),
                    None => base,
                };
                spec.validate(&name)?;
                Ok((name, spec))
            })
            .collect()
    }
}
