//! Periodic status repaint state.

/// Telemetry rate, kept as a period in milliseconds (0 = off).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Telemetry {
    period_ms: u16,
    /// Tick of the last emitted frame, so a tick that spans several polls
    /// still produces a single frame.
    last_frame: Option<u32>,
}

impl Telemetry {
    pub const fn new() -> Self {
        Self {
            period_ms: 0,
            last_frame: None,
        }
    }

    /// Set the rate in Hz. 0 disables. Callers bound `hz` to 0..=100.
    pub fn set_rate(&mut self, hz: u16) {
        self.period_ms = if hz == 0 { 0 } else { 1000 / hz };
        self.last_frame = None;
    }

    pub fn disable(&mut self) {
        self.set_rate(0);
    }

    pub fn is_enabled(&self) -> bool {
        self.period_ms > 0
    }

    pub fn period_ms(&self) -> u16 {
        self.period_ms
    }

    /// Frame rate as shown in the frame header.
    pub fn hz(&self) -> u16 {
        if self.period_ms == 0 { 0 } else { 1000 / self.period_ms }
    }

    /// `true` when a frame should be painted at tick `now_ms`.
    pub fn is_due(&mut self, now_ms: u32) -> bool {
        if self.period_ms == 0 || now_ms % u32::from(self.period_ms) != 0 {
            return false;
        }
        if self.last_frame == Some(now_ms) {
            return false;
        }
        self.last_frame = Some(now_ms);
        true
    }
}
