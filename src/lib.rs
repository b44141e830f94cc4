//! # probe-console
//!
//! Serial menu console for DS18B20 temperature probe identity management.
//!
//! The library polls a one-wire temperature bus through an injected driver,
//! maps physical bus positions to operator-assigned logical IDs persisted in
//! non-volatile storage, evaluates high/low alarm thresholds, and drives a
//! line-oriented terminal menu for inspecting and re-assigning sensor IDs.
//!
//! **Key properties:**
//! - **Static allocation** - bounded `heapless` buffers, zero heap usage
//! - **Cooperative polling** - one `on_tick()` call processes a bounded
//!   amount of input and never blocks
//! - **Flexible I/O** - platform-agnostic character I/O trait
//! - **Injected drivers** - sensor bus and ID storage behind narrow traits,
//!   substitutable with in-memory fakes for testing
//!
//! This library is `no_std` compatible.

#![no_std]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

extern crate heapless;

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
pub mod error;
pub mod io;

// Sensor domain: registry and presentation
pub mod sensor;

// Interactive session state machine
pub mod menu;

// ============================================================================
// Re-exports - Public API
// ============================================================================

// Core I/O
pub use io::CharIo;

// Configuration
pub use config::{ConsoleConfig, DefaultConfig, MinimalConfig};

// Error types
pub use error::{SelectionError, VerifyError};

// Sensor domain
pub use sensor::registry::SensorRegistry;
pub use sensor::{IdStore, SensorAddress, SensorBus, SensorRecord, DISCONNECTED_C, MAX_SENSORS};

// Menu state machine
pub use menu::{AppState, MenuController};

// ============================================================================
// Library Metadata
// ============================================================================

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
