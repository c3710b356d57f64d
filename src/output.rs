use tracing::{debug, error, warn};

use crate::derive::Derivation;
use crate::host::StateReader;
use crate::value::{CellName, CellValue};

/// Where an output stands after its last recompute
///
/// There is no terminal state: an output moves between these for as long as
/// its inputs keep changing.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Some dependency is unavailable or not numeric
    #[default]
    Unready = 0,
    /// Every dependency is numeric and the guard holds
    Ready = 1,
    /// Every dependency is numeric but the guard fails or the result is not finite
    Invalid = 2,
}

/// A value derived from a fixed, ordered list of input cells
///
/// The cell caches the result of its last recompute for readers between
/// notifications. Publishing that result is up to the engine.
#[derive(Debug)]
pub struct OutputCell {
    name: CellName,
    dependencies: Vec<CellName>,
    derivation: Derivation,
    current: CellValue,
    state: CellState,
}

impl OutputCell {
    /// Create an output that is unready until first recomputed
    pub fn new(name: CellName, dependencies: Vec<CellName>, derivation: Derivation) -> Self {
        Self {
            name,
            dependencies,
            derivation,
            current: CellValue::Unavailable,
            state: CellState::Unready,
        }
    }

    /// Name of the output
    pub fn name(&self) -> &CellName {
        &self.name
    }

    /// Inputs read, in the order the derivation receives them
    pub fn dependencies(&self) -> &[CellName] {
        &self.dependencies
    }

    /// Whether `input` is one of the dependencies
    pub fn depends_on(&self, input: &str) -> bool {
        self.dependencies.iter().any(|dep| dep == input)
    }

    /// Value from the last recompute
    pub fn current(&self) -> CellValue {
        self.current
    }

    /// State from the last recompute
    pub fn state(&self) -> CellState {
        self.state
    }

    /// The derivation and guard of this output
    pub fn derivation(&self) -> &Derivation {
        &self.derivation
    }

    /// Read every dependency through `reader` and derive a fresh value
    pub fn recompute<R>(&mut self, reader: &R) -> CellValue
    where
        R: StateReader + ?Sized,
    {
        let (state, value) = self.evaluate(reader);
        self.state = state;
        self.current = value;
        value
    }

    fn evaluate<R>(&self, reader: &R) -> (CellState, CellValue)
    where
        R: StateReader + ?Sized,
    {
        let mut values = Vec::with_capacity(self.dependencies.len());
        for dependency in &self.dependencies {
            match reader.get_value(dependency.as_str()).parse() {
                Ok(Some(value)) => values.push(value),
                Ok(None) => {
                    debug!(
                        output = %self.name,
                        input = %dependency,
                        "input not ready, output unavailable"
                    );
                    return (CellState::Unready, CellValue::Unavailable);
                }
                Err(err) => {
                    error!(
                        output = %self.name,
                        input = %dependency,
                        raw = %err.raw,
                        "invalid input for calculation, output unavailable"
                    );
                    return (CellState::Unready, CellValue::Unavailable);
                }
            }
        }

        match self.derivation.evaluate(&values) {
            Some(value) => {
                debug!(output = %self.name, ?values, value, "output computed");
                (CellState::Ready, CellValue::Available(value))
            }
            None => {
                warn!(
                    output = %self.name,
                    ?values,
                    "guard failed or result not finite, output unavailable"
                );
                (CellState::Invalid, CellValue::Unavailable)
            }
        }
    }
}
