// Output arena - storage for output cells
//
// Cells are inserted once during registration and never removed, so an
// OutputId handed out by insert() stays valid for the engine's lifetime.

use slab::Slab;

use crate::output::OutputCell;

/// Identifier of an output cell within one engine
///
/// A zero-cost wrapper around a slab index.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct OutputId(u32);

impl OutputId {
    /// Create an OutputId from a raw index
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Convert to usize for slab indexing
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Owning storage of every registered output cell
#[derive(Default)]
pub struct OutputArena {
    cells: Slab<OutputCell>,
}

impl OutputArena {
    pub fn insert(&mut self, cell: OutputCell) -> OutputId {
        let index = self.cells.insert(cell);
        // Registration is bounded by the program's own cell table.
        OutputId(index as u32)
    }

    pub fn get(&self, id: OutputId) -> Option<&OutputCell> {
        self.cells.get(id.index())
    }

    pub fn get_mut(&mut self, id: OutputId) -> Option<&mut OutputCell> {
        self.cells.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in registration order
    pub fn iter(&self) -> impl Iterator<Item = (OutputId, &OutputCell)> {
        self.cells
            .iter()
            .map(|(index, cell)| (OutputId(index as u32), cell))
    }

    pub fn ids(&self) -> Vec<OutputId> {
        self.iter().map(|(id, _)| id).collect()
    }
}
