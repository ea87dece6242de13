//! Serial console transport.
//!
//! On the board, stdin/stdout are the console UART through the ESP-IDF
//! VFS; on the host they are the terminal.  Reading stdin blocks, so a
//! reader thread forwards chunks over a channel and [`Transport::read`]
//! only polls that channel.  The control loop never waits on the link.
//!
//! ```text
//!   stdin ──▶ reader thread ──▶ mpsc ──▶ StdioTransport::read (try_recv)
//!   StdioTransport::write_all ──▶ stdout
//! ```

use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use log::{info, warn};

use crate::protocol::Transport;

const READ_CHUNK: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError {
    Io(io::ErrorKind),
}

impl core::fmt::Display for SerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(kind) => write!(f, "serial I/O error: {kind}"),
        }
    }
}

impl From<io::Error> for SerialError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.kind())
    }
}

pub struct StdioTransport {
    rx: Receiver<Vec<u8>>,
    /// Tail of a chunk the caller had no room for.
    pending: Vec<u8>,
    closed: bool,
}

impl StdioTransport {
    /// Start the reader thread.  `baud` is applied to the console UART on
    /// the board and ignored on the host.
    pub fn spawn(baud: u32) -> io::Result<Self> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: reconfigures the already-installed console UART.
            let ret = unsafe {
                esp_idf_svc::sys::uart_set_baudrate(
                    esp_idf_svc::sys::CONFIG_ESP_CONSOLE_UART_NUM as i32,
                    baud,
                )
            };
            if ret != esp_idf_svc::sys::ESP_OK {
                warn!("serial: baud change to {} failed ({})", baud, ret);
            }
        }

        let (tx, rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("serial-rx".into())
            .stack_size(4096)
            .spawn(move || {
                let mut stdin = io::stdin().lock();
                let mut buf = [0u8; READ_CHUNK];
                loop {
                    match stdin.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            if tx.send(buf[..n].to_vec()).is_err() {
                                break;
                            }
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                        Err(e) => {
                            warn!("serial: stdin read failed: {e}");
                            break;
                        }
                    }
                }
            })?;

        info!("serial: console link up at {} baud", baud);
        Ok(Self {
            rx,
            pending: Vec::new(),
            closed: false,
        })
    }

    /// `true` once the input side has reached end-of-file.
    pub fn is_closed(&self) -> bool {
        self.closed && self.pending.is_empty()
    }
}

impl Transport for StdioTransport {
    type Error = SerialError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        if self.pending.is_empty() && !self.closed {
            match self.rx.try_recv() {
                Ok(chunk) => self.pending = chunk,
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    info!("serial: input closed");
                    self.closed = true;
                }
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError> {
        io::stdout().lock().write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        io::stdout().lock().flush()?;
        Ok(())
    }
}
