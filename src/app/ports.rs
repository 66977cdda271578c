//! Port traits: the boundary between the command interpreter and the
//! rest of the firmware.
//!
//! ```text
//!   Cli ──▶ Environment ──▶ serial driver / run state machine /
//!                           FET driver / parameter store / platform
//! ```
//!
//! The interpreter never touches a global: everything it reads or asks
//! for flows through these traits, which the firmware (or the host
//! simulator, or a test mock) implements.  All traits are object safe so
//! command handlers can take `&mut dyn Environment`.
//!
//! State reads are expected to be cheap word-sized loads.  Collaborators
//! may change state between two calls; handlers read once at entry and
//! issue at most one state-changing call.

use core::fmt;

use crate::esc::{CommandMode, DisarmReason, EscState, EscTelemetry, InputMode, RunMode};

// ───────────────────────────────────────────────────────────────
// Serial port (byte link to the operator's terminal)
// ───────────────────────────────────────────────────────────────

/// Non-blocking byte input, buffered byte output.
pub trait SerialPort {
    /// Number of received bytes ready to be read without waiting.
    fn available(&mut self) -> usize;

    /// Pop one received byte, `None` when nothing is pending.
    fn read(&mut self) -> Option<u8>;

    /// Queue one byte for transmission.
    fn write(&mut self, byte: u8);

    /// Queue a string for transmission.
    fn print(&mut self, s: &str) {
        for b in s.bytes() {
            self.write(b);
        }
    }

    /// Format straight onto the link, without an intermediate buffer.
    fn print_fmt(&mut self, args: fmt::Arguments<'_>) {
        struct Sink<'a, S: ?Sized>(&'a mut S);

        impl<S: SerialPort + ?Sized> fmt::Write for Sink<'_, S> {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                self.0.print(s);
                Ok(())
            }
        }

        let _ = fmt::write(&mut Sink(self), args);
    }

    /// Push buffered output to the wire.
    fn flush(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Run state machine
// ───────────────────────────────────────────────────────────────

/// Queries and requests against the motor run state machine.
pub trait EscPort {
    fn state(&self) -> EscState;

    fn input_mode(&self) -> InputMode;
    fn set_input_mode(&mut self, mode: InputMode);

    fn run_mode(&self) -> RunMode;
    fn set_run_mode(&mut self, mode: RunMode);

    fn command_mode(&self) -> CommandMode;
    fn set_command_mode(&mut self, mode: CommandMode);

    /// Enable the power stage.
    fn arm(&mut self);

    /// Disable the power stage, recording `reason`.
    fn disarm(&mut self, reason: DisarmReason);

    /// Begin the motor start sequence.
    fn start(&mut self);

    /// Begin stopping the motor.
    fn stop(&mut self);

    /// Set open-loop duty in percent. Returns `false` if out of range.
    fn set_duty(&mut self, percent: f32) -> bool;

    /// Feed a new PWM-style setpoint in microseconds.
    fn new_input(&mut self, pwm_us: u16);

    /// Clear the closed-loop RPM controller's accumulated state.
    fn reset_rpm_pid(&mut self);

    fn set_target_rpm(&mut self, rpm: f32);
}

// ───────────────────────────────────────────────────────────────
// FET driver / telemetry sources
// ───────────────────────────────────────────────────────────────

/// Direct actuator operations and the telemetry variables the power stage
/// maintains.
pub trait FetPort {
    /// Sound the motor windings at `freq_hz` for `duration_ms`.
    fn beep(&mut self, freq_hz: u16, duration_ms: u16);

    /// Servo mode target angle.
    fn set_angle(&mut self, degrees: f32);

    fn telemetry(&self) -> EscTelemetry;
}

// ───────────────────────────────────────────────────────────────
// Parameter store
// ───────────────────────────────────────────────────────────────

/// How a parameter value is rendered by `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamFormat {
    /// Fixed point with the given number of decimals (`%.Nf`).
    Fixed(u8),
    /// Scientific notation with the given number of decimals (`%.Ne`).
    Sci(u8),
}

impl ParamFormat {
    /// Wrap `value` so it renders with this format.
    pub fn display(self, value: f32) -> FormattedParam {
        FormattedParam { format: self, value }
    }
}

/// A parameter value bound to its display format.
#[derive(Debug, Clone, Copy)]
pub struct FormattedParam {
    format: ParamFormat,
    value: f32,
}

impl fmt::Display for FormattedParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            ParamFormat::Fixed(p) => write!(f, "{:.*}", p as usize, self.value),
            ParamFormat::Sci(p) => write!(f, "{:.*e}", p as usize, self.value),
        }
    }
}

/// Static description of one stored parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: &'static str,
    pub format: ParamFormat,
}

/// Configuration parameter vector and its flash persistence.
pub trait ParamPort {
    /// Number of parameter slots, including slot 0 (layout version).
    fn param_count(&self) -> usize;

    /// Resolve a parameter name to its id.
    fn param_id(&self, name: &str) -> Option<usize>;

    fn param_info(&self, id: usize) -> Option<ParamInfo>;

    /// Current value; 0.0 for an unknown id.
    fn param(&self, id: usize) -> f32;

    fn set_param(&mut self, id: usize, value: f32);

    /// Reload every parameter from flash.
    fn read_flash(&mut self);

    /// Persist every parameter to flash.
    fn write_flash(&mut self) -> Result<(), FlashError>;

    /// Reset every parameter to its compiled-in default.
    fn load_defaults(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Platform services
// ───────────────────────────────────────────────────────────────

/// Time, reset and board calibration.
pub trait PlatformPort {
    /// Monotonic millisecond counter (wraps at `u32::MAX`).
    fn millis(&self) -> u32;

    /// Busy-wait for `ticks` timer ticks.
    fn timer_delay(&mut self, ticks: u16);

    /// Hard processor reset. On hardware this does not return.
    fn reset(&mut self);

    /// Calibrated PWM input range `(low, high)` in microseconds.
    fn pwm_limits(&self) -> (u16, u16);

    fn build_number(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Environment
// ───────────────────────────────────────────────────────────────

/// Everything the interpreter needs, as one object.
pub trait Environment: SerialPort + EscPort + FetPort + ParamPort + PlatformPort {}

impl<T> Environment for T where T: SerialPort + EscPort + FetPort + ParamPort + PlatformPort {}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ParamPort::write_flash`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    /// Erasing the parameter page failed.
    Erase,
    /// Programming or verifying the parameter page failed.
    Program,
    /// The parameter image does not fit the flash page.
    Overflow,
}

impl fmt::Display for FlashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Erase => write!(f, "flash erase failed"),
            Self::Program => write!(f, "flash program failed"),
            Self::Overflow => write!(f, "parameter image too large"),
        }
    }
}
