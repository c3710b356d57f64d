//! Knitting gauge cells: four inputs, two derived outputs.
//!
//! A gauge swatch of `gauge_stitches` stitches measuring `gauge_cm`
//! centimetres fixes the stitch density. From it the calculator derives how
//! many stitches a desired width needs, and how wide a desired stitch count
//! comes out.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::bridge::NotificationBridge;
use crate::config::GaugeConfig;
use crate::derive::Derivation;
use crate::engine::Engine;
use crate::error::{InputError, Result};
use crate::host::MemoryHost;
use crate::input::InputSpec;
use crate::registry::InputRegistry;
use crate::value::{CellName, CellValue};

/// Cell names used by the knitting calculator
pub mod names {
    /// Width to knit, in cm
    pub const DESIRED_WIDTH: &str = "number.desired_width";
    /// Stitch count to knit
    pub const DESIRED_STITCHES: &str = "number.desired_stitches";
    /// Stitches across the gauge swatch
    pub const GAUGE_STITCHES: &str = "number.gauge_stitches";
    /// Width of the gauge swatch, in cm
    pub const GAUGE_CM: &str = "number.gauge_cm";
    /// Stitches needed for the desired width
    pub const CALCULATED_STITCHES: &str = "sensor.calculated_stitches";
    /// Width of the desired stitch count, in cm
    pub const CALCULATED_WIDTH: &str = "sensor.calculated_width";
}

/// `round((gauge_stitches / gauge_cm) * desired_width)`
///
/// Reads `(desired_width, gauge_stitches, gauge_cm)`; undefined when
/// `gauge_cm <= 0`.
pub fn stitches_from_width() -> Derivation {
    Derivation::new(3, |v| (v[1] / v[2]) * v[0], |v| v[2] > 0.0)
}

/// `round((gauge_cm / gauge_stitches) * desired_stitches, 1)`
///
/// Reads `(desired_stitches, gauge_stitches, gauge_cm)`; undefined when
/// `gauge_stitches <= 0`.
pub fn width_from_stitches() -> Derivation {
    Derivation::new(3, |v| (v[2] / v[1]) * v[0], |v| v[1] > 0.0).with_precision(1)
}

/// Built-in bounds, step and default of the four inputs
pub fn default_inputs() -> [(&'static str, InputSpec); 4] {
    [
        (
            names::DESIRED_WIDTH,
            InputSpec::new(0.0, 500.0, 1.0, 120.0).with_unit("cm"),
        ),
        (
            names::DESIRED_STITCHES,
            InputSpec::new(0.0, 500.0, 1.0, 80.0).with_unit("stitches"),
        ),
        (
            names::GAUGE_STITCHES,
            InputSpec::new(1.0, 50.0, 1.0, 16.0).with_unit("stitches"),
        ),
        (
            names::GAUGE_CM,
            InputSpec::new(1.0, 20.0, 0.5, 10.0).with_unit("cm"),
        ),
    ]
}

/// Register both knitting outputs on `engine`
pub fn register_outputs(engine: &mut Engine) -> Result<()> {
    engine.register_output(
        names::CALCULATED_STITCHES,
        [names::DESIRED_WIDTH, names::GAUGE_STITCHES, names::GAUGE_CM],
        stitches_from_width(),
    )?;
    engine.register_output(
        names::CALCULATED_WIDTH,
        [names::DESIRED_STITCHES, names::GAUGE_STITCHES, names::GAUGE_CM],
        width_from_stitches(),
    )?;
    Ok(())
}

/// The knitting calculator wired up on an in-memory host
///
/// Setup writes every input default to the host, registers the outputs,
/// attaches a direct bridge and runs the initial sync. After that, every
/// accepted [`GaugeCalculator::set`] has updated the outputs by the time it
/// returns.
///
/// # Example
/// ```ignore
/// let mut calculator = GaugeCalculator::new()?;
/// assert_eq!(calculator.stitches(), CellValue::Available(192.0));
///
/// calculator.set(names::DESIRED_STITCHES, 80.0)?;
/// assert_eq!(calculator.width(), CellValue::Available(50.0));
/// ```
pub struct GaugeCalculator {
    inputs: InputRegistry,
    engine: Arc<Mutex<Engine>>,
    host: Arc<MemoryHost>,
    bridge: NotificationBridge,
}

impl GaugeCalculator {
    /// Build with the built-in input bounds
    pub fn new() -> Result<Self> {
        Self::with_config(&GaugeConfig::default())
    }

    /// Build with input bounds overridden by `config`
    pub fn with_config(config: &GaugeConfig) -> Result<Self> {
        let host = MemoryHost::new();

        let mut inputs = InputRegistry::new();
        for (name, spec) in config.resolve()? {
            inputs.register(name, spec)?;
        }
        inputs.publish_all(&*host);

        let mut engine = Engine::new();
        register_outputs(&mut engine)?;
        let engine = Arc::new(Mutex::new(engine));

        let bridge = NotificationBridge::attach(engine.clone(), host.clone());
        engine.lock().initial_sync(&*host, &*host);
        debug!(
            inputs = inputs.len(),
            outputs = engine.lock().len(),
            "gauge calculator ready"
        );

        Ok(Self {
            inputs,
            engine,
            host,
            bridge,
        })
    }

    /// Set an input; out-of-range values are rejected and change nothing
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), InputError> {
        self.inputs.set(name, value, &*self.host)
    }

    /// Current value of an input
    pub fn input(&self, name: &str) -> Option<f64> {
        self.inputs.value(name)
    }

    /// Current value of an output, unavailable for unknown names
    pub fn output(&self, name: &str) -> CellValue {
        self.engine.lock().value(name).unwrap_or_default()
    }

    /// Stitches needed for the desired width
    pub fn stitches(&self) -> CellValue {
        self.output(names::CALCULATED_STITCHES)
    }

    /// Width of the desired stitch count, in cm
    pub fn width(&self) -> CellValue {
        self.output(names::CALCULATED_WIDTH)
    }

    /// The input cells
    pub fn inputs(&self) -> &InputRegistry {
        &self.inputs
    }

    /// The shared engine
    ///
    /// The bridge locks this engine inside every host notification, and the
    /// mutex is not reentrant. Do not hold the guard while writing input
    /// state to [`GaugeCalculator::host`] or calling
    /// [`GaugeCalculator::set`]: the notification would deadlock on it.
    pub fn engine(&self) -> &Arc<Mutex<Engine>> {
        &self.engine
    }

    /// The host holding every cell's state
    pub fn host(&self) -> &Arc<MemoryHost> {
        &self.host
    }

    /// Inputs the bridge is subscribed to
    pub fn watched(&self) -> &[CellName] {
        self.bridge.watched()
    }
}
