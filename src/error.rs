use std::path::PathBuf;

use thiserror::Error;

use crate::value::CellName;

/// An input was set outside its declared bounds
///
/// The input keeps its previous value.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("value {value} for '{name}' is outside [{min}, {max}]")]
pub struct RangeError {
    /// The input that rejected the value
    pub name: CellName,
    /// The rejected value
    pub value: f64,
    /// Lower bound of the input
    pub min: f64,
    /// Upper bound of the input
    pub max: f64,
}

/// A raw host state could not be interpreted as a number
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("state '{raw}' is not a finite number")]
pub struct ParseError {
    /// The offending state text
    pub raw: String,
}

impl ParseError {
    pub(crate) fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

/// Programmer errors detected while wiring cells at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// A cell with this name already exists
    #[error("cell '{0}' is already registered")]
    DuplicateName(CellName),
    /// An output was declared without any dependency
    #[error("output '{0}' declares no dependencies")]
    EmptyDependencies(CellName),
    /// An output lists the same input more than once
    #[error("output '{output}' lists '{input}' more than once")]
    RepeatedDependency {
        /// The output being registered
        output: CellName,
        /// The repeated input
        input: CellName,
    },
    /// An output would depend on another output
    #[error("output '{output}' cannot depend on output '{dependency}'")]
    DependsOnOutput {
        /// The dependent output
        output: CellName,
        /// The output it would read
        dependency: CellName,
    },
    /// The dependency count does not match what the derivation reads
    #[error("output '{output}' declares {declared} dependencies but its derivation takes {arity}")]
    ArityMismatch {
        /// The output being registered
        output: CellName,
        /// Number of declared dependencies
        declared: usize,
        /// Number of values the derivation reads
        arity: usize,
    },
}

/// Failure to set an input through the registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// No input with this name was registered
    #[error("no input named '{0}'")]
    Unknown(CellName),
    /// The value is outside the input's bounds
    #[error(transparent)]
    Range(#[from] RangeError),
}

/// Invalid or unreadable gauge configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid TOML for this schema
    #[error("invalid gauge config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Bounds are not finite or `min > max`
    #[error("input '{name}' has invalid bounds [{min}, {max}]")]
    InvalidBounds {
        /// The configured input
        name: CellName,
        /// Configured lower bound
        min: f64,
        /// Configured upper bound
        max: f64,
    },
    /// Step is not a positive finite number
    #[error("input '{name}' has invalid step {step}")]
    InvalidStep {
        /// The configured input
        name: CellName,
        /// Configured step
        step: f64,
    },
    /// Default lies outside the bounds
    #[error("input '{name}' default {default} is outside [{min}, {max}]")]
    DefaultOutOfRange {
        /// The configured input
        name: CellName,
        /// Configured default
        default: f64,
        /// Configured lower bound
        min: f64,
        /// Configured upper bound
        max: f64,
    },
}

/// Any error produced by this crate
#[derive(Error, Debug)]
pub enum Error {
    /// See [`RangeError`]
    #[error(transparent)]
    Range(#[from] RangeError),
    /// See [`ParseError`]
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// See [`RegistrationError`]
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    /// See [`InputError`]
    #[error(transparent)]
    Input(#[from] InputError),
    /// See [`ConfigError`]
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias defaulting to the crate [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;
