//! The reactive engine: output registration, the dependency index and
//! change propagation.
//!
//! The graph is two levels deep and fixed once startup is over. A change to
//! an input recomputes exactly the outputs that read it and publishes every
//! result, changed or not.

use tracing::{debug, trace};

use crate::arena::{DependencyIndex, OutputArena, OutputId};
use crate::derive::Derivation;
use crate::error::RegistrationError;
use crate::hash::{FastIndexMap, FastIndexSet};
use crate::host::{StateReader, StateSink};
use crate::output::{CellState, OutputCell};
use crate::value::{CellName, CellValue};

/// Owner of the output cells and of the map from inputs to their dependents
///
/// The engine never stores input values. Every recompute reads them fresh
/// from the host through a [`StateReader`] and writes results through a
/// [`StateSink`].
///
/// # Example
/// ```ignore
/// let mut engine = Engine::new();
/// engine.register_output(
///     "sensor.calculated_stitches",
///     ["number.desired_width", "number.gauge_stitches", "number.gauge_cm"],
///     knitting::stitches_from_width(),
/// )?;
///
/// engine.initial_sync(&*host, &*host);
/// host.set_state("number.gauge_cm", 12.0);
/// engine.on_input_changed("number.gauge_cm", &*host, &*host);
/// ```
#[derive(Default)]
pub struct Engine {
    outputs: OutputArena,
    names: FastIndexMap<CellName, OutputId>,
    index: DependencyIndex,
}

impl Engine {
    /// Create an engine without outputs
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output cell reading `dependencies` in order
    ///
    /// Fails if the name is taken, the dependency list is empty, repeats an
    /// input or does not match the derivation's arity, or if the
    /// registration would make an output depend on another output.
    pub fn register_output<N, I>(
        &mut self,
        name: impl Into<CellName>,
        dependencies: I,
        derivation: Derivation,
    ) -> Result<OutputId, RegistrationError>
    where
        I: IntoIterator<Item = N>,
        N: Into<CellName>,
    {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(RegistrationError::DuplicateName(name));
        }

        let mut seen = FastIndexSet::default();
        for dependency in dependencies {
            let dependency = dependency.into();
            if seen.contains(&dependency) {
                return Err(RegistrationError::RepeatedDependency {
                    output: name,
                    input: dependency,
                });
            }
            if self.names.contains_key(&dependency) || dependency == name {
                return Err(RegistrationError::DependsOnOutput {
                    output: name,
                    dependency,
                });
            }
            seen.insert(dependency);
        }

        if seen.is_empty() {
            return Err(RegistrationError::EmptyDependencies(name));
        }
        if seen.len() != derivation.arity() {
            return Err(RegistrationError::ArityMismatch {
                output: name,
                declared: seen.len(),
                arity: derivation.arity(),
            });
        }
        // Some existing output already reads this name as an input.
        let existing_reader = self
            .dependents(name.as_str())
            .next()
            .map(|cell| cell.name().clone());
        if let Some(output) = existing_reader {
            return Err(RegistrationError::DependsOnOutput {
                output,
                dependency: name,
            });
        }

        let dependencies: Vec<CellName> = seen.into_iter().collect();
        debug!(output = %name, ?dependencies, "registering output");

        let id = self.outputs.insert(OutputCell::new(
            name.clone(),
            dependencies.clone(),
            derivation,
        ));
        self.index.add(id, &dependencies);
        self.names.insert(name, id);
        Ok(id)
    }

    /// Recompute and publish every output that reads `input`
    ///
    /// Returns the number of outputs recomputed; zero if nothing reads
    /// `input`.
    pub fn on_input_changed<R, S>(&mut self, input: &str, reader: &R, sink: &S) -> usize
    where
        R: StateReader + ?Sized,
        S: StateSink + ?Sized,
    {
        let affected: Vec<OutputId> = self.index.dependents(input).collect();
        trace!(input, outputs = affected.len(), "input changed");

        for &id in &affected {
            self.recompute_and_publish(id, reader, sink);
        }
        affected.len()
    }

    /// Populate every output once at startup
    ///
    /// Each output is recomputed and published exactly once, however many
    /// dependencies it has.
    pub fn initial_sync<R, S>(&mut self, reader: &R, sink: &S) -> usize
    where
        R: StateReader + ?Sized,
        S: StateSink + ?Sized,
    {
        let ids = self.outputs.ids();
        for &id in &ids {
            self.recompute_and_publish(id, reader, sink);
        }
        debug!(outputs = ids.len(), "initial sync complete");
        ids.len()
    }

    /// Recompute and publish a single output by name
    ///
    /// Returns `None` if no such output is registered.
    pub fn refresh<R, S>(&mut self, output: &str, reader: &R, sink: &S) -> Option<CellValue>
    where
        R: StateReader + ?Sized,
        S: StateSink + ?Sized,
    {
        let id = *self.names.get(output)?;
        Some(self.recompute_and_publish(id, reader, sink))
    }

    fn recompute_and_publish<R, S>(&mut self, id: OutputId, reader: &R, sink: &S) -> CellValue
    where
        R: StateReader + ?Sized,
        S: StateSink + ?Sized,
    {
        let Some(cell) = self.outputs.get_mut(id) else {
            return CellValue::Unavailable;
        };
        let value = cell.recompute(reader);
        sink.publish(cell.name(), value);
        value
    }

    /// Cached value of an output
    pub fn value(&self, output: &str) -> Option<CellValue> {
        self.output(output).map(OutputCell::current)
    }

    /// State of an output after its last recompute
    pub fn state(&self, output: &str) -> Option<CellState> {
        self.output(output).map(OutputCell::state)
    }

    /// Look up an output by name
    pub fn output(&self, output: &str) -> Option<&OutputCell> {
        let id = *self.names.get(output)?;
        self.outputs.get(id)
    }

    /// Look up an output by id
    pub fn output_by_id(&self, id: OutputId) -> Option<&OutputCell> {
        self.outputs.get(id)
    }

    /// Every output, in registration order
    pub fn outputs(&self) -> impl Iterator<Item = &OutputCell> {
        self.outputs.iter().map(|(_, cell)| cell)
    }

    /// Outputs that read `input`
    pub fn dependents(&self, input: &str) -> impl Iterator<Item = &OutputCell> {
        self.index
            .dependents(input)
            .filter_map(move |id| self.outputs.get(id))
    }

    /// Every input read by at least one output
    ///
    /// This is the set of names the notification bridge subscribes to.
    pub fn watched_inputs(&self) -> impl Iterator<Item = &CellName> {
        self.index.inputs()
    }

    /// Number of registered outputs
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Whether no output is registered
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}
