use tracing::debug;

use crate::error::{InputError, RegistrationError};
use crate::hash::FastIndexMap;
use crate::host::StateWriter;
use crate::input::{InputCell, InputSpec};
use crate::value::{CellName, RawState};

/// Owner of the input cells
///
/// Every accepted write is forwarded to the host as new state, which is what
/// makes the host notify the engine. A rejected write never reaches the
/// host, so it triggers no recompute.
#[derive(Default)]
pub struct InputRegistry {
    cells: FastIndexMap<CellName, InputCell>,
}

impl InputRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input holding its default
    pub fn register(
        &mut self,
        name: impl Into<CellName>,
        spec: InputSpec,
    ) -> Result<&InputCell, RegistrationError> {
        let name = name.into();
        if self.cells.contains_key(&name) {
            return Err(RegistrationError::DuplicateName(name));
        }
        debug!(input = %name, ?spec, "registering input");
        let entry = self
            .cells
            .entry(name.clone())
            .or_insert_with(|| InputCell::new(name, spec));
        Ok(entry)
    }

    /// Write every input's current value to the host
    pub fn publish_all<W>(&self, writer: &W)
    where
        W: StateWriter + ?Sized,
    {
        for cell in self.cells.values() {
            writer.write_state(cell.name(), RawState::Number(cell.get()));
        }
    }

    /// Set an input and notify the host
    pub fn set<W>(&mut self, name: &str, value: f64, writer: &W) -> Result<(), InputError>
    where
        W: StateWriter + ?Sized,
    {
        let cell = self
            .cells
            .get_mut(name)
            .ok_or_else(|| InputError::Unknown(CellName::new(name)))?;
        cell.set(value)?;
        debug!(input = %cell.name(), value, "input set");
        writer.write_state(cell.name(), RawState::Number(value));
        Ok(())
    }

    /// Look up an input
    pub fn get(&self, name: &str) -> Option<&InputCell> {
        self.cells.get(name)
    }

    /// Current value of an input
    pub fn value(&self, name: &str) -> Option<f64> {
        self.get(name).map(InputCell::get)
    }

    /// Every input, in registration order
    pub fn iter(&self) -> impl Iterator<Item = &InputCell> {
        self.cells.values()
    }

    /// Number of registered inputs
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no input is registered
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
