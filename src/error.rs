//! Error types for registry and selection faults.
//!
//! Operator mistakes that only need a corrective message and a re-prompt are
//! not represented here; the menu writes those directly. These types cover
//! the two faults that carry structure the caller must report: a rejected
//! sensor selection (which display rows were bad) and a persisted-write
//! verification mismatch (which slot, what was written, what read back).

use crate::sensor::MAX_SENSORS;
use core::fmt;

/// A sensor selection that cannot be acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The input contained no sensor number at all.
    Empty,

    /// One or more selected display rows have no responding device.
    NotConnected(heapless::Vec<u8, MAX_SENSORS>),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::Empty => write!(f, "no sensor number in input"),
            SelectionError::NotConnected(rows) => {
                write!(f, "not connected:")?;
                for row in rows.iter() {
                    write!(f, " {}", row)?;
                }
                Ok(())
            }
        }
    }
}

/// Read-back verification failure after a persisted ID write.
///
/// Non-fatal: the in-memory ID stays authoritative for the session. The
/// caller logs this as a diagnostic and continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyError {
    /// Physical slot whose storage byte was written.
    pub slot: usize,
    /// Value written.
    pub expected: u8,
    /// Value read back after commit.
    pub actual: u8,
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id write verify failed (slot {}: wrote {}, read {})",
            self.slot, self.expected, self.actual
        )
    }
}
