//! Cell names, computed values and raw host state.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Interned name of an input or output cell
///
/// Cloning is a reference count bump, so names can be shared freely between
/// the engine, the dependency index and host subscriptions. Lookups by `&str`
/// work through [`Borrow`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellName(Arc<str>);

impl CellName {
    /// Create a name from anything string-like
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CellName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CellName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CellName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CellName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&CellName> for CellName {
    fn from(name: &CellName) -> Self {
        name.clone()
    }
}

impl PartialEq<str> for CellName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for CellName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for CellName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CellName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Value of an output cell as seen by the host
///
/// `Unavailable` is distinct from zero: it means the value cannot currently
/// be computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// No value can be computed right now
    #[default]
    Unavailable,
    /// A computed, already rounded value
    Available(f64),
}

impl CellValue {
    /// The number, if available
    pub fn value(self) -> Option<f64> {
        match self {
            CellValue::Available(v) => Some(v),
            CellValue::Unavailable => None,
        }
    }

    /// Whether a value is present
    pub fn is_available(self) -> bool {
        matches!(self, CellValue::Available(_))
    }
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(CellValue::Unavailable, CellValue::Available)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Available(v) => write!(f, "{v}"),
            CellValue::Unavailable => f.write_str(RawState::UNAVAILABLE),
        }
    }
}

/// Raw state of a named cell in the host's value store
#[derive(Clone, Debug, PartialEq)]
pub enum RawState {
    /// The cell is absent, not yet initialised, or reported unavailable
    Unavailable,
    /// A numeric state
    Number(f64),
    /// A textual state that still has to be interpreted as a number
    Text(String),
}

impl RawState {
    /// Text the host uses for a cell without a known state
    pub const UNKNOWN: &'static str = "unknown";
    /// Text the host uses for a cell that is currently unavailable
    pub const UNAVAILABLE: &'static str = "unavailable";

    /// Interpret the state as a number
    ///
    /// Returns `Ok(None)` for an unavailable cell, including the host's
    /// `unknown`/`unavailable` markers. Non-numeric or non-finite states are a
    /// [`ParseError`].
    pub fn parse(&self) -> Result<Option<f64>, ParseError> {
        let value = match self {
            RawState::Unavailable => return Ok(None),
            RawState::Number(v) => *v,
            RawState::Text(text) => {
                let text = text.trim();
                if text == Self::UNKNOWN || text == Self::UNAVAILABLE {
                    return Ok(None);
                }
                text.parse::<f64>().map_err(|_| ParseError::new(text))?
            }
        };

        if value.is_finite() {
            Ok(Some(value))
        } else {
            Err(ParseError::new(value.to_string()))
        }
    }
}

impl From<f64> for RawState {
    fn from(value: f64) -> Self {
        RawState::Number(value)
    }
}

impl From<CellValue> for RawState {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Available(v) => RawState::Number(v),
            CellValue::Unavailable => RawState::Unavailable,
        }
    }
}

impl From<&str> for RawState {
    fn from(text: &str) -> Self {
        RawState::Text(text.to_owned())
    }
}
