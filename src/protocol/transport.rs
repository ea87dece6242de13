//! The serial link as the protocol sees it: a non-blocking byte stream.
//!
//! [`crate::adapters::serial::StdioTransport`] is the board's console
//! UART (stdio on the host); tests plug in in-memory links.

/// Byte-oriented, non-blocking channel to the host.
pub trait Transport {
    type Error: core::fmt::Debug;

    /// Copy up to `buf.len()` received bytes into `buf`.  `Ok(0)` means
    /// nothing is waiting; never blocks.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Queue every byte of `data` for sending.
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Push queued output onto the wire.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Send one already-terminated record and flush it, so a record is
    /// never left half-sent between loop iterations.
    fn send_line(&mut self, line: &[u8]) -> Result<(), Self::Error> {
        self.write_all(line)?;
        self.flush()
    }
}

/// Link with no peer: reads nothing, accepts and drops every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = core::convert::Infallible;

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }

    fn write_all(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
