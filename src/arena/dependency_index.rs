// Dependency index - input name -> dependent outputs
//
// This is the explicit mapping the engine iterates on a change. The graph is
// two levels deep, so the dependents of an input are exactly the outputs to
// recompute; no transitive walk or topological order is needed.

use crate::arena::OutputId;
use crate::hash::{FastIndexMap, FastIndexSet};
use crate::value::CellName;

/// Which outputs read which inputs
#[derive(Default, Debug)]
pub struct DependencyIndex {
    by_input: FastIndexMap<CellName, FastIndexSet<OutputId>>,
}

impl DependencyIndex {
    /// Record that `output` reads every name in `inputs`
    ///
    /// Uses IndexSet to deduplicate and keep registration order.
    pub fn add<'a>(&mut self, output: OutputId, inputs: impl IntoIterator<Item = &'a CellName>) {
        for input in inputs {
            self.by_input
                .entry(input.clone())
                .or_default()
                .insert(output);
        }
    }

    /// Outputs reading `input`, in registration order
    pub fn dependents(&self, input: &str) -> impl Iterator<Item = OutputId> + '_ {
        self.by_input
            .get(input)
            .into_iter()
            .flat_map(|outputs| outputs.iter().copied())
    }

    /// Every input read by at least one output
    pub fn inputs(&self) -> impl Iterator<Item = &CellName> {
        self.by_input.keys()
    }
}
