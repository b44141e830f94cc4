//! Shared helpers for probe-console integration tests.

#![allow(dead_code)]

#[allow(clippy::duplicate_mod)]
#[path = "fixtures/mod.rs"]
pub mod fixtures;

use fixtures::{MockBus, MockIdStore, MockIo};
use probe_console::{DefaultConfig, MenuController, SensorRegistry, MAX_SENSORS};

/// Console type used by every integration test.
pub type TestConsole = MenuController<MockBus, MockIdStore, MockIo, DefaultConfig>;

// ============================================================================
// Construction
// ============================================================================

/// Console over `count` connected sensors with blank storage (all IDs fall
/// back to their slot defaults 1..=count).
pub fn console_with_sensors(count: usize) -> TestConsole {
    let registry = SensorRegistry::new(MockBus::with_count(count), MockIdStore::new());
    MenuController::new(registry, MockIo::new())
}

/// Console with explicit stored ID bytes.
pub fn console_with_storage(count: usize, bytes: [u8; MAX_SENSORS]) -> TestConsole {
    let registry = SensorRegistry::new(MockBus::with_count(count), MockIdStore::with_bytes(bytes));
    MenuController::new(registry, MockIo::new())
}

// ============================================================================
// Driving input
// ============================================================================

/// Type one line (terminator appended) and run ticks until the transport
/// drains. Returns everything the console wrote in response.
pub fn feed_line(console: &mut TestConsole, line: &str) -> String {
    console.io_mut().clear_output();
    console.io_mut().push_input(line);
    console.io_mut().push_input("\r");

    while !console.io_mut().input_empty() {
        console.on_tick().unwrap();
    }
    // one more tick is harmless and mirrors an idle poll slice
    console.on_tick().unwrap();
    console.io_mut().output()
}

/// Feed several lines, returning only the last response.
pub fn feed_lines(console: &mut TestConsole, lines: &[&str]) -> String {
    let mut last = String::new();
    for line in lines {
        last = feed_line(console, line);
    }
    last
}

/// Walk from `Normal` into the select-sensor step of the single (`"1"`) or
/// multi (`"2"`) workflow.
pub fn enter_select(console: &mut TestConsole, mode: &str) -> String {
    feed_lines(console, &["menu", "1", mode])
}

// ============================================================================
// Assertions
// ============================================================================

/// Assert that output contains all expected fragments.
pub fn assert_contains_all(output: &str, expected: &[&str]) {
    for exp in expected {
        assert!(
            output.contains(exp),
            "Expected '{}' in output, got: {}",
            exp,
            output
        );
    }
}

/// Assert that output contains none of the fragments.
pub fn assert_contains_none(output: &str, forbidden: &[&str]) {
    for forbid in forbidden {
        assert!(
            !output.contains(forbid),
            "Did not expect '{}' in output, got: {}",
            forbid,
            output
        );
    }
}
