//! Error types for the command interpreter.
//!
//! Every rejection a handler can produce is a [`CommandError`]. The
//! dispatcher renders it onto the serial link: [`CommandError::Usage`] as
//! the descriptor's `usage:` line, everything else through `Display`
//! followed by CRLF. Nothing here allocates.

use core::fmt;

use heapless::String;

use crate::cli::editor::INPUT_CAPACITY;

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

/// Why a command was not executed (or only partly executed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Wrong argument count or type; printed as the descriptor's usage line.
    Usage,
    /// Requires `state <= Stopped`.
    MustBeStopped,
    /// Requires a running (or, for `stop`, commutating) motor.
    NotRunning,
    /// `start` from `Disarmed`.
    NotArmed,
    /// `arm` when already armed.
    AlreadyArmed,
    /// `start` when past `Stopped`.
    AlreadyRunning,
    /// `bootloader` while armed.
    StillArmed,
    /// `pos` outside servo mode.
    ServoOnly,
    /// `rpm` before the feed-forward term has been calibrated.
    CalibrationRequired,
    /// A numeric argument outside its allowed range.
    OutOfRange(Range),
    /// `set` with an unknown parameter name.
    NoSuchParam(String<INPUT_CAPACITY>),
    /// `config WRITE` could not persist the parameters.
    FlashWriteFailed,
}

impl CommandError {
    /// Build [`CommandError::NoSuchParam`], truncating names that cannot
    /// have come from a single input line.
    pub fn no_such_param(name: &str) -> Self {
        let mut s = String::new();
        for c in name.chars() {
            if s.push(c).is_err() {
                break;
            }
        }
        Self::NoSuchParam(s)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage => write!(f, "usage"),
            Self::MustBeStopped => write!(f, "ESC must be stopped first"),
            Self::NotRunning => write!(f, "ESC not running"),
            Self::NotArmed => write!(f, "ESC disarmed, arm first"),
            Self::AlreadyArmed => write!(f, "ESC already armed"),
            Self::AlreadyRunning => write!(f, "ESC already running"),
            Self::StillArmed => write!(f, "ESC armed, disarm first"),
            Self::ServoOnly => write!(f, "Command only valid in servo mode"),
            Self::CalibrationRequired => write!(f, "Calibration parameters required"),
            Self::OutOfRange(r) => write!(f, "{r}"),
            Self::NoSuchParam(name) => write!(f, "SET: no such parameter '{name}'"),
            Self::FlashWriteFailed => write!(f, "CONFIG: write flash failed!"),
        }
    }
}

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// Argument ranges, rendered as `<what> out of range: <lo> => <hi>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    /// `beep` frequency, 10..=5000 Hz.
    Frequency,
    /// `beep` duration, 1..=1000 ms.
    Duration,
    /// `duty` percent, 0..=100.
    Duty,
    /// `pwm` microseconds, bounded by the board's calibration.
    Pwm { lo: u16, hi: u16 },
    /// `rpm` target, 100..=10000.
    Rpm,
    /// `telemetry` rate, 0..=100 Hz.
    TelemetryRate,
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frequency => write!(f, "frequency out of range: 10 => 5000"),
            Self::Duration => write!(f, "duration out of range: 1 => 1000"),
            Self::Duty => write!(f, "duty out of range: 0 => 100"),
            Self::Pwm { lo, hi } => write!(f, "PWM out of range: {lo} => {hi}"),
            Self::Rpm => write!(f, "RPM out of range: 100 => 10000"),
            Self::TelemetryRate => write!(f, "Frequency out of range: 0 => 100"),
        }
    }
}

impl From<Range> for CommandError {
    fn from(r: Range) -> Self {
        Self::OutOfRange(r)
    }
}
