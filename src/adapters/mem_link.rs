//! In-memory serial link.
//!
//! Input is queued with [`MemLink::push_input`]; everything the
//! interpreter writes accumulates until [`MemLink::take_output`].

use std::collections::VecDeque;

use crate::app::ports::SerialPort;

#[derive(Debug, Default)]
pub struct MemLink {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    flushes: usize,
}

impl MemLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes as if they had arrived on the wire.
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Bytes received but not yet read.
    pub fn pending_input(&self) -> usize {
        self.rx.len()
    }

    /// Drop any unread input.
    pub fn discard_input(&mut self) {
        self.rx.clear();
    }

    /// Everything written since the last call, as text.
    pub fn take_output(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.tx).into_owned();
        self.tx.clear();
        out
    }

    /// Raw bytes written since the last `take_output`.
    pub fn output(&self) -> &[u8] {
        &self.tx
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl SerialPort for MemLink {
    fn available(&mut self) -> usize {
        self.rx.len()
    }

    fn read(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write(&mut self, byte: u8) {
        self.tx.push(byte);
    }

    fn print(&mut self, s: &str) {
        self.tx.extend_from_slice(s.as_bytes());
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}
