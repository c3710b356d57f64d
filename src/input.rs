use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RangeError};
use crate::value::CellName;

/// Declared bounds, step and default of an input cell
///
/// `step` is the UI increment. It plays no part in computation and values
/// off the step grid are accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Lower bound, inclusive
    pub min: f64,
    /// Upper bound, inclusive
    pub max: f64,
    /// UI increment
    pub step: f64,
    /// Initial value
    pub default: f64,
    /// Display unit, carried for hosts and ignored by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl InputSpec {
    /// Create a spec without a display unit
    pub fn new(min: f64, max: f64, step: f64, default: f64) -> Self {
        Self {
            min,
            max,
            step,
            default,
            unit: None,
        }
    }

    /// Attach a display unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Whether `value` lies within `[min, max]`
    ///
    /// NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Check that the spec describes a usable input
    pub fn validate(&self, name: &CellName) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(ConfigError::InvalidBounds {
                name: name.clone(),
                min: self.min,
                max: self.max,
            });
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(ConfigError::InvalidStep {
                name: name.clone(),
                step: self.step,
            });
        }
        if !self.contains(self.default) {
            return Err(ConfigError::DefaultOutOfRange {
                name: name.clone(),
                default: self.default,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// A user-settable numeric parameter
///
/// Starts at its default and only changes through [`InputCell::set`], which
/// rejects (never clamps) values outside the declared bounds.
#[derive(Clone, Debug)]
pub struct InputCell {
    name: CellName,
    spec: InputSpec,
    value: f64,
}

impl InputCell {
    /// Create the cell holding its default
    pub fn new(name: impl Into<CellName>, spec: InputSpec) -> Self {
        let value = spec.default;
        Self {
            name: name.into(),
            spec,
            value,
        }
    }

    /// Name of the cell
    pub fn name(&self) -> &CellName {
        &self.name
    }

    /// Bounds, step and default
    pub fn spec(&self) -> &InputSpec {
        &self.spec
    }

    /// Current value
    pub fn get(&self) -> f64 {
        self.value
    }

    /// Store `value` if it lies within the bounds
    ///
    /// On success the caller is responsible for notifying dependents; on
    /// failure the current value is left untouched.
    pub fn set(&mut self, value: f64) -> Result<(), RangeError> {
        if !self.spec.contains(value) {
            return Err(RangeError {
                name: self.name.clone(),
                value,
                min: self.spec.min,
                max: self.spec.max,
            });
        }
        self.value = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn gauge_cm() -> InputCell {
        InputCell::new("number.gauge_cm", InputSpec::new(1.0, 20.0, 0.5, 10.0))
    }

    #[test]
    fn starts_at_default() {
        assert_eq!(gauge_cm().get(), 10.0);
    }

    #[rstest]
    #[case(1.0)]
    #[case(20.0)]
    #[case(12.25)]
    fn accepts_values_within_bounds(#[case] value: f64) {
        let mut cell = gauge_cm();

        cell.set(value).unwrap();

        assert_eq!(cell.get(), value);
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.999)]
    #[case(20.5)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn rejects_out_of_range_and_keeps_value(#[case] value: f64) {
        let mut cell = gauge_cm();
        cell.set(15.0).unwrap();

        let err = cell.set(value).unwrap_err();

        assert_eq!(err.name, "number.gauge_cm");
        assert_eq!((err.min, err.max), (1.0, 20.0));
        assert_eq!(cell.get(), 15.0);
    }

    #[rstest]
    #[case(InputSpec::new(5.0, 1.0, 1.0, 3.0))]
    #[case(InputSpec::new(f64::NEG_INFINITY, 1.0, 1.0, 0.0))]
    fn validate_rejects_bad_bounds(#[case] spec: InputSpec) {
        let err = spec.validate(&"x".into()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBounds { .. }));
    }

    #[test]
    fn validate_rejects_bad_step_and_default() {
        let name = CellName::new("x");

        assert!(matches!(
            InputSpec::new(0.0, 1.0, 0.0, 0.5).validate(&name),
            Err(ConfigError::InvalidStep { .. })
        ));
        assert!(matches!(
            InputSpec::new(0.0, 1.0, 0.1, 2.0).validate(&name),
            Err(ConfigError::DefaultOutOfRange { .. })
        ));
        assert!(InputSpec::new(0.0, 1.0, 0.1, 1.0).validate(&name).is_ok());
    }
}
