//! Line collector for the console input stream.
//!
//! Pure state machine: raw characters in, line events out. No I/O, no
//! session knowledge. Whitespace never reaches the buffer (the menu grammar
//! is single tokens; `"1 2 3"` and `"123"` must arrive identically), a CR or
//! LF completes the pending line, and a line exceeding the configured limit
//! is discarded through to its terminator so a flood cannot smuggle a
//! truncated command into the state machine.

/// Result of feeding one character to the collector.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Still accumulating (or character ignored).
    None,

    /// A terminator arrived with a non-empty buffer; take the line.
    Completed,

    /// The pending line exceeded the length limit. Buffer cleared, the rest
    /// of the flooded line will be silently dropped. Emitted once per
    /// overrun so the caller warns exactly once.
    Overflow,
}

/// Bounded line assembly with overflow discard.
///
/// `N` is the compile-time buffer capacity; `limit` tightens it at runtime
/// from `ConsoleConfig::MAX_INPUT`.
#[derive(Debug)]
pub struct LineCollector<const N: usize> {
    buffer: heapless::String<N>,
    limit: usize,
    discarding: bool,
}

impl<const N: usize> LineCollector<N> {
    /// Create a collector accepting at most `min(limit, N)` characters per
    /// line.
    pub fn new(limit: usize) -> Self {
        Self {
            buffer: heapless::String::new(),
            limit: limit.min(N),
            discarding: false,
        }
    }

    /// Feed one character.
    pub fn push_char(&mut self, c: char) -> LineEvent {
        if c == '\r' || c == '\n' {
            if self.discarding {
                self.discarding = false;
                return LineEvent::None;
            }
            return if self.buffer.is_empty() {
                LineEvent::None
            } else {
                LineEvent::Completed
            };
        }

        if self.discarding || c.is_whitespace() || c.is_control() {
            return LineEvent::None;
        }

        if self.buffer.len() >= self.limit || self.buffer.push(c).is_err() {
            self.buffer.clear();
            self.discarding = true;
            return LineEvent::Overflow;
        }
        LineEvent::None
    }

    /// Take the completed line, leaving the collector empty.
    pub fn take(&mut self) -> heapless::String<N> {
        let line = self.buffer.clone();
        self.buffer.clear();
        line
    }

    /// Current buffered length in characters.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop any partial input and leave discard mode.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }
}
