// Slab-backed storage for the engine's output cells
//
// Two pieces live here:
// - Output arena: OutputCell slots addressed by OutputId
// - Dependency index: input name -> ids of the outputs that read it
//
// The engine owns both. OutputId is a lightweight newtype over the slab
// index; because the graph is fixed at startup, ids are never invalidated.

pub mod dependency_index;
pub mod output_arena;

pub use dependency_index::DependencyIndex;
pub use output_arena::{OutputArena, OutputId};
