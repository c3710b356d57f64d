#![deny(missing_docs)]

//! Reactive input and output cells for knitting gauge calculations.
//!
//! A handful of bounded numeric inputs live in a host's state store. Output
//! cells declare which inputs they read and a pure derivation over them. When
//! an input changes, the engine recomputes exactly the outputs that read it
//! and publishes every result back to the host, available or not.
//!
//! # Quick Start
//!
//! ```ignore
//! use gauge_cells::{CellValue, GaugeCalculator, names};
//!
//! let mut calculator = GaugeCalculator::new()?;
//!
//! // 16 stitches over 10 cm, 120 cm wanted
//! assert_eq!(calculator.stitches(), CellValue::Available(192.0));
//!
//! assert!(calculator.set(names::GAUGE_CM, 0.5).is_err());   // below min, rejected
//! calculator.set(names::DESIRED_STITCHES, 80.0)?;
//! assert_eq!(calculator.width(), CellValue::Available(50.0));
//! ```
//!
//! # Core Types
//!
//! - [`InputCell`] - Named value with `[min, max]` bounds. Rejects out-of-range writes.
//! - [`Derivation`] - Pure function plus guard, rounded half-to-even to a fixed precision.
//! - [`OutputCell`] - Cached result of a derivation over an ordered list of inputs.
//! - [`Engine`] - Owns outputs and the input -> dependents index, recomputes on change.
//! - [`NotificationBridge`] - Feeds host change notifications into an engine.
//!
//! # Engine
//!
//! ```ignore
//! let mut engine = Engine::new();
//! engine.register_output("sensor.area", ["number.w", "number.h"], area)?;
//!
//! engine.initial_sync(&*host, &*host);                  // one publish per output
//! engine.on_input_changed("number.w", &*host, &*host);  // recompute dependents
//! ```
//!
//! # Host boundary
//!
//! The engine reads through [`StateReader`], publishes through [`StateSink`]
//! and is driven by a [`ChangeFeed`]. [`MemoryHost`] implements all of them
//! in process.
//!
//! ```ignore
//! let host = MemoryHost::new();
//! let bridge = NotificationBridge::attach(Arc::new(Mutex::new(engine)), host.clone());
//!
//! host.set_state("number.w", 3.0);   // engine recomputes before this returns
//! bridge.detach();                   // no callbacks after this
//! ```

// Internal modules
pub(crate) mod arena;
mod bridge;
mod config;
mod derive;
mod engine;
mod error;
mod hash;
mod host;
mod input;
mod knitting;
mod output;
mod registry;
mod value;

// Cells and their values
pub use input::{InputCell, InputSpec};
pub use output::{CellState, OutputCell};
pub use value::{CellName, CellValue, RawState};

// Derivations
pub use derive::{Derivation, DeriveFn, GuardFn, round_half_even};

// Engine and wiring
pub use arena::OutputId;
pub use bridge::NotificationBridge;
pub use engine::Engine;
pub use registry::InputRegistry;

// Host boundary
pub use host::{
    ChangeFeed, ChangeHandler, MemoryHost, Publication, StateReader, StateSink, StateWriter,
    Subscription, SubscriptionSlot,
};

// Knitting calculator
pub use config::{GaugeConfig, InputOverride};
pub use knitting::{
    GaugeCalculator, default_inputs, names, register_outputs, stitches_from_width,
    width_from_stitches,
};

// Errors
pub use error::{ConfigError, Error, InputError, ParseError, RangeError, RegistrationError, Result};

#[cfg(test)]
mod tests;
