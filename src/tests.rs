// End-to-end scenarios over the knitting calculator and a hand-wired engine
use crate::{
    CellState, CellValue, Engine, GaugeCalculator, GaugeConfig, InputError, MemoryHost,
    NotificationBridge, RawState, names, register_outputs,
};
use parking_lot::Mutex;
use std::sync::Arc;

fn stitches_engine_on(host: &Arc<MemoryHost>) -> (Arc<Mutex<Engine>>, NotificationBridge) {
    let mut engine = Engine::new();
    register_outputs(&mut engine).unwrap();
    let engine = Arc::new(Mutex::new(engine));
    let bridge = NotificationBridge::attach(engine.clone(), host.clone());
    (engine, bridge)
}

#[test]
fn defaults_give_192_stitches() {
    let calculator = GaugeCalculator::new().unwrap();

    // 16 stitches over 10 cm, 120 cm wide
    assert_eq!(calculator.stitches(), CellValue::Available(192.0));
}

#[test]
fn eighty_stitches_measure_fifty_cm() {
    let mut calculator = GaugeCalculator::new().unwrap();

    calculator.set(names::DESIRED_STITCHES, 80.0).unwrap();

    assert_eq!(calculator.width(), CellValue::Available(50.0));
}

#[test]
fn zero_gauge_cm_makes_stitches_unavailable() {
    // The calculator's own bounds forbid gauge_cm = 0, so drive the engine
    // directly through host state.
    let host = MemoryHost::new();
    let (engine, _bridge) = stitches_engine_on(&host);
    host.set_state(names::DESIRED_WIDTH, 100.0);
    host.set_state(names::GAUGE_STITCHES, 16.0);
    host.set_state(names::GAUGE_CM, 0.0);

    let engine = engine.lock();
    assert_eq!(
        engine.value(names::CALCULATED_STITCHES),
        Some(CellValue::Unavailable)
    );
    assert_eq!(
        engine.state(names::CALCULATED_STITCHES),
        Some(CellState::Invalid)
    );
}

#[test]
fn zero_gauge_stitches_makes_width_unavailable() {
    let host = MemoryHost::new();
    let (engine, _bridge) = stitches_engine_on(&host);
    host.set_state(names::DESIRED_STITCHES, 80.0);
    host.set_state(names::GAUGE_CM, 10.0);
    host.set_state(names::GAUGE_STITCHES, 0.0);

    assert_eq!(
        engine.lock().state(names::CALCULATED_WIDTH),
        Some(CellState::Invalid)
    );

    host.set_state(names::GAUGE_STITCHES, 16.0);
    assert_eq!(
        engine.lock().value(names::CALCULATED_WIDTH),
        Some(CellValue::Available(50.0))
    );
}

#[test]
fn out_of_range_set_changes_nothing() {
    let mut calculator = GaugeCalculator::new().unwrap();
    let published_before = calculator.host().publications().len();

    let err = calculator.set(names::GAUGE_CM, 25.0).unwrap_err();

    assert!(matches!(err, InputError::Range(ref range) if range.max == 20.0));
    assert_eq!(calculator.input(names::GAUGE_CM), Some(10.0));
    assert_eq!(calculator.host().publications().len(), published_before);
    assert_eq!(calculator.stitches(), CellValue::Available(192.0));
}

#[test]
fn absent_input_is_unavailable_until_supplied() {
    let host = MemoryHost::new();
    host.set_state(names::DESIRED_WIDTH, 120.0);
    host.set_state(names::GAUGE_STITCHES, 16.0);
    let (engine, _bridge) = stitches_engine_on(&host);

    engine.lock().initial_sync(&*host, &*host);
    assert_eq!(
        engine.lock().value(names::CALCULATED_STITCHES),
        Some(CellValue::Unavailable)
    );
    assert_eq!(
        engine.lock().state(names::CALCULATED_STITCHES),
        Some(CellState::Unready)
    );

    host.set_state(names::GAUGE_CM, 10.0);

    assert_eq!(
        engine.lock().value(names::CALCULATED_STITCHES),
        Some(CellValue::Available(192.0))
    );
}

#[test]
fn setup_publishes_each_output_once() {
    let calculator = GaugeCalculator::new().unwrap();

    let published = calculator.host().publications();
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].name, names::CALCULATED_STITCHES);
    assert_eq!(published[1].name, names::CALCULATED_WIDTH);
    assert_eq!(published[1].value, CellValue::Available(50.0));
}

#[test]
fn shared_input_republishes_both_outputs() {
    let mut calculator = GaugeCalculator::new().unwrap();
    calculator.host().take_publications();

    calculator.set(names::GAUGE_STITCHES, 20.0).unwrap();

    let published = calculator.host().take_publications();
    assert_eq!(published.len(), 2);
    assert_eq!(calculator.stitches(), CellValue::Available(240.0));
    assert_eq!(calculator.width(), CellValue::Available(40.0));
}

#[test]
fn setting_same_value_still_publishes() {
    let mut calculator = GaugeCalculator::new().unwrap();
    calculator.host().take_publications();

    calculator.set(names::DESIRED_WIDTH, 120.0).unwrap();
    calculator.set(names::DESIRED_WIDTH, 120.0).unwrap();

    let published = calculator.host().take_publications();
    assert_eq!(published.len(), 2);
    assert_eq!(published[0], published[1]);
}

#[test]
fn unavailable_input_wins_over_other_values() {
    let calculator = GaugeCalculator::new().unwrap();

    calculator.host().remove_state(names::GAUGE_STITCHES);

    assert_eq!(calculator.stitches(), CellValue::Unavailable);
    assert_eq!(calculator.width(), CellValue::Unavailable);
    assert_eq!(
        calculator.host().state(names::CALCULATED_WIDTH),
        RawState::Unavailable
    );
}

#[test]
fn text_state_is_parsed_and_bad_text_degrades() {
    let calculator = GaugeCalculator::new().unwrap();
    let host = calculator.host();

    host.set_state(names::DESIRED_WIDTH, "60");
    assert_eq!(calculator.stitches(), CellValue::Available(96.0));

    host.set_state(names::DESIRED_WIDTH, "sixty");
    assert_eq!(calculator.stitches(), CellValue::Unavailable);
    // The width output does not read desired_width.
    assert_eq!(calculator.width(), CellValue::Available(50.0));

    host.set_state(names::DESIRED_WIDTH, RawState::UNKNOWN);
    assert_eq!(
        calculator.engine().lock().state(names::CALCULATED_STITCHES),
        Some(CellState::Unready)
    );
}

#[test]
fn config_overrides_bounds_and_defaults() {
    let config = GaugeConfig::from_toml_str(
        r#"
        [gauge_cm]
        max = 40.0

        [desired_width]
        default = 60.0
        "#,
    )
    .unwrap();
    let mut calculator = GaugeCalculator::with_config(&config).unwrap();

    assert_eq!(calculator.stitches(), CellValue::Available(96.0));

    calculator.set(names::GAUGE_CM, 30.0).unwrap();
    assert_eq!(calculator.stitches(), CellValue::Available(32.0));
}

#[test]
fn unknown_input_is_reported() {
    let mut calculator = GaugeCalculator::new().unwrap();

    assert_eq!(
        calculator.set("number.row_gauge", 1.0),
        Err(InputError::Unknown("number.row_gauge".into()))
    );
    assert_eq!(calculator.output("sensor.nothing"), CellValue::Unavailable);
}

#[test]
fn bridge_watches_the_four_inputs() {
    let calculator = GaugeCalculator::new().unwrap();

    let mut watched: Vec<&str> = calculator.watched().iter().map(|n| n.as_str()).collect();
    watched.sort_unstable();

    assert_eq!(
        watched,
        [
            names::DESIRED_STITCHES,
            names::DESIRED_WIDTH,
            names::GAUGE_CM,
            names::GAUGE_STITCHES,
        ]
    );
}

#[test]
fn width_rounds_the_stored_value_to_one_decimal() {
    let mut calculator = GaugeCalculator::new().unwrap();
    calculator.set(names::DESIRED_STITCHES, 1.0).unwrap();
    calculator.set(names::GAUGE_STITCHES, 10.0).unwrap();

    let widths: Vec<CellValue> = [1.5, 4.5, 10.5]
        .into_iter()
        .map(|gauge_cm| {
            calculator.set(names::GAUGE_CM, gauge_cm).unwrap();
            calculator.width()
        })
        .collect();

    assert_eq!(
        widths,
        [
            CellValue::Available(0.1),
            CellValue::Available(0.5),
            CellValue::Available(1.1),
        ]
    );
}

#[test]
fn overflowing_stitches_are_unavailable() {
    let calculator = GaugeCalculator::new().unwrap();

    // Host state bypasses the input bounds.
    calculator.host().set_state(names::GAUGE_CM, 1e-320);

    assert_eq!(calculator.stitches(), CellValue::Unavailable);
    assert_eq!(
        calculator.engine().lock().state(names::CALCULATED_STITCHES),
        Some(CellState::Invalid)
    );
    assert_eq!(
        calculator.host().state(names::CALCULATED_STITCHES),
        RawState::Unavailable
    );
}
