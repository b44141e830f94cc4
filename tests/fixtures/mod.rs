//! Test fixtures for probe-console integration tests.
//!
//! Provides:
//! - `MockIo`: in-memory `CharIo` with input queue and output capture
//! - `MockBus`: scriptable sensor bus (devices can appear and vanish)
//! - `MockIdStore`: in-memory ID storage with stuck-write fault injection

#![allow(dead_code)]

use probe_console::{CharIo, IdStore, SensorAddress, SensorBus, DISCONNECTED_C, MAX_SENSORS};
use std::collections::VecDeque;

// ============================================================================
// MockIo - console transport
// ============================================================================

/// In-memory character transport: queued input, captured output.
#[derive(Debug, Default)]
pub struct MockIo {
    input: VecDeque<char>,
    output: Vec<char>,
}

impl MockIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue input as if the operator typed it.
    pub fn push_input(&mut self, s: &str) {
        for c in s.chars() {
            self.input.push_back(c);
        }
    }

    /// Captured output so far.
    pub fn output(&self) -> String {
        self.output.iter().collect()
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    pub fn input_empty(&self) -> bool {
        self.input.is_empty()
    }
}

impl CharIo for MockIo {
    type Error = ();

    fn get_char(&mut self) -> Result<Option<char>, ()> {
        Ok(self.input.pop_front())
    }

    fn put_char(&mut self, c: char) -> Result<(), ()> {
        self.output.push(c);
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<(), ()> {
        self.output.extend(s.chars());
        Ok(())
    }
}

// ============================================================================
// MockBus - sensor bus driver
// ============================================================================

/// One simulated probe on the bus.
#[derive(Debug, Copy, Clone)]
pub struct MockDevice {
    pub address: SensorAddress,
    pub temperature_c: f32,
}

/// Scriptable bus: `devices` is the scan result, in scan order.
#[derive(Debug, Default)]
pub struct MockBus {
    pub devices: Vec<MockDevice>,
}

impl MockBus {
    pub fn with_devices(devices: &[MockDevice]) -> Self {
        Self {
            devices: devices.to_vec(),
        }
    }

    /// `count` devices with ascending addresses and distinct temperatures.
    pub fn with_count(count: usize) -> Self {
        let devices: Vec<MockDevice> = (0..count)
            .map(|i| MockDevice {
                address: addr(i as u8 + 1),
                temperature_c: 21.0 + i as f32,
            })
            .collect();
        Self { devices }
    }
}

impl SensorBus for MockBus {
    fn rescan(&mut self) -> usize {
        self.devices.len()
    }

    fn address(&mut self, physical_index: usize) -> Option<SensorAddress> {
        self.devices.get(physical_index).map(|d| d.address)
    }

    fn temperature_c(&mut self, physical_index: usize) -> f32 {
        self.devices
            .get(physical_index)
            .map(|d| d.temperature_c)
            .unwrap_or(DISCONNECTED_C)
    }
}

/// DS18B20-style address with a distinguishing tail byte.
pub fn addr(tail: u8) -> SensorAddress {
    [0x28, 0xff, 0x64, 0x02, 0x64, 0x01, 0x3c, tail]
}

// ============================================================================
// MockIdStore - non-volatile ID storage
// ============================================================================

/// In-memory ID storage. Set `writes_stick = false` to simulate storage that
/// accepts writes but never persists them (verify-mismatch path).
#[derive(Debug)]
pub struct MockIdStore {
    pub bytes: [u8; MAX_SENSORS],
    pub writes_stick: bool,
    pub commits: usize,
}

impl MockIdStore {
    pub fn new() -> Self {
        Self::with_bytes([0; MAX_SENSORS])
    }

    pub fn with_bytes(bytes: [u8; MAX_SENSORS]) -> Self {
        Self {
            bytes,
            writes_stick: true,
            commits: 0,
        }
    }
}

impl Default for MockIdStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdStore for MockIdStore {
    fn read_byte(&mut self, slot: usize) -> u8 {
        self.bytes[slot]
    }

    fn write_byte(&mut self, slot: usize, value: u8) {
        if self.writes_stick {
            self.bytes[slot] = value;
        }
    }

    fn commit(&mut self) {
        self.commits += 1;
    }
}
