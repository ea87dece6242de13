//! Newline framing.
//!
//! Wire format: one UTF-8 JSON object per line, `\n` terminated; a `\r`
//! before the `\n` is tolerated.
//!
//! The buffer accumulates incoming bytes and yields complete lines.  This
//! handles partial reads: one `Transport::read` may return part of a line
//! or several lines at once.  A line that outgrows the buffer is dropped
//! up to its newline and reported once.

use heapless::Vec;

use crate::error::ProtocolError;

/// Hard upper bound on a buffered line.  The configured limit
/// (`SystemConfig::max_line_len`) may only lower it.
pub const LINE_CAP: usize = 512;

/// Line storage: the longest line plus a `\r` that precedes its `\n`.
const LINE_BUF_CAP: usize = LINE_CAP + 1;

enum FramerState {
    /// Collecting bytes of the current line.
    Collecting,
    /// Current line overflowed; skipping until the next newline.
    Discarding,
}

/// Streaming line framer.
pub struct LineBuffer {
    state: FramerState,
    buf: Vec<u8, LINE_BUF_CAP>,
    /// Last completed line, valid until the next `next_line` call.
    line: Vec<u8, LINE_BUF_CAP>,
    /// Bytes past the end of the last yielded line, not yet scanned.
    pending: Vec<u8, LINE_CAP>,
    max_len: usize,
}

impl LineBuffer {
    pub fn new(max_len: usize) -> Self {
        Self {
            state: FramerState::Collecting,
            buf: Vec::new(),
            line: Vec::new(),
            pending: Vec::new(),
            max_len: max_len.clamp(1, LINE_CAP),
        }
    }

    /// Room left for [`Self::feed`] to accept without losing bytes.
    pub fn free(&self) -> usize {
        LINE_CAP - self.pending.len()
    }

    /// Queue raw transport bytes.  Returns how many were accepted; the
    /// caller keeps the rest for a later call.
    pub fn feed(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.free());
        // Cannot fail: `n` fits by construction.
        let _ = self.pending.extend_from_slice(&data[..n]);
        n
    }

    /// Whether a newline is already buffered.
    pub fn has_line(&self) -> bool {
        self.pending.contains(&b'\n')
    }

    /// Pop the next complete line.
    ///
    /// `None` means no complete line is buffered yet.  `Some(Err(_))`
    /// reports a line that was dropped (too long, or not UTF-8).
    pub fn next_line(&mut self) -> Option<Result<&str, ProtocolError>> {
        let mut consumed = 0;
        let mut found = None;

        for (i, &byte) in self.pending.iter().enumerate() {
            consumed = i + 1;
            if byte == b'\n' {
                found = Some(match self.state {
                    FramerState::Collecting => Ok(()),
                    FramerState::Discarding => Err(ProtocolError::malformed("line too long")),
                });
                self.state = FramerState::Collecting;
                break;
            }
            match self.state {
                // One byte of slack for a `\r` that the terminator strips.
                FramerState::Collecting if self.buf.len() <= self.max_len => {
                    // Cannot fail: max_len + 1 <= LINE_BUF_CAP.
                    let _ = self.buf.push(byte);
                }
                FramerState::Collecting => {
                    self.buf.clear();
                    self.state = FramerState::Discarding;
                }
                FramerState::Discarding => {}
            }
        }

        self.drain_pending(consumed);

        match found? {
            Err(e) => {
                self.buf.clear();
                Some(Err(e))
            }
            Ok(()) => {
                core::mem::swap(&mut self.line, &mut self.buf);
                self.buf.clear();
                if self.line.last() == Some(&b'\r') {
                    self.line.pop();
                }
                if self.line.len() > self.max_len {
                    self.line.clear();
                    return Some(Err(ProtocolError::malformed("line too long")));
                }
                Some(
                    core::str::from_utf8(&self.line)
                        .map_err(|_| ProtocolError::malformed("invalid utf-8")),
                )
            }
        }
    }

    /// Reset framing state (e.g. after the link reconnects).
    pub fn reset(&mut self) {
        self.state = FramerState::Collecting;
        self.buf.clear();
        self.line.clear();
        self.pending.clear();
    }

    fn drain_pending(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let rest = self.pending.len() - n;
        self.pending.copy_within(n.., 0);
        self.pending.truncate(rest);
    }
}
