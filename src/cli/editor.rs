//! Line editor: turns a byte stream into submitted command lines.
//!
//! Echo goes straight back to the link. The buffer never holds anything
//! but printable ASCII, and a full buffer is treated as if the operator
//! pressed return, so a runaway sender can never wedge the parser.

use heapless::String;

use super::term::{BELL, BS, CLEAR_EOS, INTR, PROMPT, PROMPT_REPAINT};
use crate::app::ports::SerialPort;

/// Bytes the input line can hold.
pub const INPUT_CAPACITY: usize = 32;

/// A submitted line, copied out of the editor.
pub type Line = String<INPUT_CAPACITY>;

// ---------------------------------------------------------------------------
// Input buffer
// ---------------------------------------------------------------------------

/// Fixed-capacity line of printable ASCII.
pub struct InputBuffer {
    bytes: [u8; INPUT_CAPACITY],
    len: usize,
}

impl InputBuffer {
    pub const fn new() -> Self {
        Self {
            bytes: [0u8; INPUT_CAPACITY],
            len: 0,
        }
    }

    /// Append one byte. Returns `false` when full.
    pub fn push(&mut self, b: u8) -> bool {
        if self.len < INPUT_CAPACITY {
            self.bytes[self.len] = b;
            self.len += 1;
            true
        } else {
            false
        }
    }

    /// Remove the last byte. Returns `false` when already empty.
    pub fn pop(&mut self) -> bool {
        if self.len > 0 {
            self.len -= 1;
            self.bytes[self.len] = 0;
            true
        } else {
            false
        }
    }

    /// Empty the buffer and zero its storage.
    pub fn clear(&mut self) {
        self.bytes = [0u8; INPUT_CAPACITY];
        self.len = 0;
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..self.len]).unwrap_or("")
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == INPUT_CAPACITY
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Line editor
// ---------------------------------------------------------------------------

/// Outcome of feeding one byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEvent {
    /// Byte consumed, line still open.
    Pending,
    /// A non-empty line was terminated. The buffer has been cleared.
    Submit(Line),
    /// Return on an empty line.
    Empty,
    /// Ctrl-C. The buffer has been cleared.
    Interrupt,
}

pub struct LineEditor {
    buf: InputBuffer,
}

impl LineEditor {
    pub const fn new() -> Self {
        Self {
            buf: InputBuffer::new(),
        }
    }

    /// The line as typed so far.
    pub fn buffer(&self) -> &InputBuffer {
        &self.buf
    }

    /// Print a fresh prompt and discard the line.
    pub fn prompt<L: SerialPort + ?Sized>(&mut self, link: &mut L) {
        link.print(PROMPT);
        self.buf.clear();
    }

    /// Discard the line without printing anything.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Consume exactly one byte.
    pub fn feed<L: SerialPort + ?Sized>(&mut self, byte: u8, link: &mut L) -> EditEvent {
        let byte = if self.buf.is_full() { b'\n' } else { byte };

        match byte {
            b'\r' | b'\n' => {
                if self.buf.is_empty() {
                    return EditEvent::Empty;
                }
                link.print("\r\n");
                link.print(CLEAR_EOS);
                let mut line = Line::new();
                // Printable ASCII only, so this cannot overflow or split a char.
                let _ = line.push_str(self.buf.as_str());
                self.buf.clear();
                EditEvent::Submit(line)
            }
            INTR => {
                self.buf.clear();
                EditEvent::Interrupt
            }
            BS => {
                if self.buf.pop() {
                    link.print(PROMPT_REPAINT);
                    link.print(self.buf.as_str());
                    link.write(b' ');
                    link.print(PROMPT_REPAINT);
                    link.print(self.buf.as_str());
                }
                EditEvent::Pending
            }
            0x20..=0x7E => {
                self.buf.push(byte);
                link.write(byte);
                EditEvent::Pending
            }
            _ => {
                link.write(BELL);
                EditEvent::Pending
            }
        }
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}
