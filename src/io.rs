//! Character I/O abstraction for the console transport.
//!
//! The `CharIo` trait decouples the menu controller from the concrete serial
//! transport (UART, USB CDC, stdio, ...). Reads are non-blocking so the
//! cooperative poll loop is never starved; writes are fire-and-forget text.

/// Platform-agnostic character I/O trait.
///
/// Implementations must buffer output internally and must not block
/// indefinitely in `put_char()` / `write_str()`. `get_char()` returns
/// immediately whether or not a character is pending.
pub trait CharIo {
    /// Platform-specific error type
    type Error;

    /// Non-blocking character read.
    ///
    /// Returns:
    /// - `Ok(Some(char))` if a character is available
    /// - `Ok(None)` if no character is available
    /// - `Err(Self::Error)` on transport error
    fn get_char(&mut self) -> Result<Option<char>, Self::Error>;

    /// Write a character to the output buffer.
    fn put_char(&mut self, c: char) -> Result<(), Self::Error>;

    /// Write a string to the output buffer.
    ///
    /// Default implementation uses `put_char()` repeatedly. Override for
    /// more efficient bulk writes if the transport supports them.
    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for c in s.chars() {
            self.put_char(c)?;
        }
        Ok(())
    }

    /// Write a string followed by CRLF.
    ///
    /// The console is line-oriented; nearly every prompt, table row, and
    /// diagnostic goes through this.
    fn write_line(&mut self, s: &str) -> Result<(), Self::Error> {
        self.write_str(s)?;
        self.write_str("\r\n")
    }
}
