//! Serial link over the process's stdin and stdout.
//!
//! A helper thread blocks on stdin and forwards bytes over a channel, so
//! [`SerialPort::available`] never blocks the super-loop.

use std::collections::VecDeque;
use std::io::{self, BufWriter, Read, Stdout, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{debug, warn};

use crate::app::ports::SerialPort;

pub struct StdioLink {
    rx: Receiver<u8>,
    pending: VecDeque<u8>,
    out: BufWriter<Stdout>,
    eof: bool,
    write_failed: bool,
}

impl StdioLink {
    /// Start the stdin reader thread.
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || {
                for byte in io::stdin().lock().bytes() {
                    match byte {
                        Ok(b) => {
                            if tx.send(b).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("stdin read failed: {e}");
                            break;
                        }
                    }
                }
                debug!("stdin closed");
            })?;

        Ok(Self {
            rx,
            pending: VecDeque::new(),
            out: BufWriter::new(io::stdout()),
            eof: false,
            write_failed: false,
        })
    }

    /// `true` once stdin has closed and every byte has been consumed.
    pub fn is_closed(&mut self) -> bool {
        self.pump();
        self.eof && self.pending.is_empty()
    }

    /// Drop everything received so far.
    pub fn discard_input(&mut self) {
        self.pump();
        self.pending.clear();
    }

    fn pump(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(b) => self.pending.push_back(b),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.eof = true;
                    break;
                }
            }
        }
    }

    fn report(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            if !self.write_failed {
                warn!("stdout write failed: {e}");
                self.write_failed = true;
            }
        }
    }
}

impl SerialPort for StdioLink {
    fn available(&mut self) -> usize {
        self.pump();
        self.pending.len()
    }

    fn read(&mut self) -> Option<u8> {
        if self.pending.is_empty() {
            self.pump();
        }
        self.pending.pop_front()
    }

    fn write(&mut self, byte: u8) {
        let r = self.out.write_all(&[byte]);
        self.report(r);
    }

    fn print(&mut self, s: &str) {
        let r = self.out.write_all(s.as_bytes());
        self.report(r);
    }

    fn flush(&mut self) {
        let r = self.out.flush();
        self.report(r);
    }
}
