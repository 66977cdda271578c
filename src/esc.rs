//! Domain types shared between the command interpreter and the motor
//! control subsystem.
//!
//! The CLI only ever *reads* these values (through [`EscPort`]) and asks
//! the collaborators to change them; the enums here are the vocabulary of
//! that conversation.
//!
//! [`EscPort`]: crate::app::ports::EscPort

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

/// Motor run state.
///
/// The declaration order is semantic: gates are written as `state > Stopped`
/// or `state < Running`, so the derived `Ord` must follow the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EscState {
    Disarmed = 0,
    Stopped = 1,
    /// Waiting for commutation to be established (reported as `PRE-START`).
    PreStart = 2,
    Starting = 3,
    Running = 4,
}

impl EscState {
    /// Total number of states, used to size state tables.
    pub const COUNT: usize = 5;

    /// First state in which commutation has been requested. `stop` is only
    /// meaningful from here on.
    pub const NOCOMM: Self = Self::PreStart;

    /// Convert a table index back to `EscState`. Out-of-range indices map to
    /// `Disarmed`, the safe fallback.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            1 => Self::Stopped,
            2 => Self::PreStart,
            3 => Self::Starting,
            4 => Self::Running,
            _ => Self::Disarmed,
        }
    }

    /// Name printed in the status table.
    pub fn label(self) -> &'static str {
        match self {
            Self::Disarmed => "DISARMED",
            Self::Stopped => "STOPPED",
            Self::PreStart => "PRE-START",
            Self::Starting => "STARTING",
            Self::Running => "RUNNING",
        }
    }
}

// ---------------------------------------------------------------------------
// Input mode
// ---------------------------------------------------------------------------

/// Source of the throttle setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InputMode {
    Pwm = 0,
    Uart = 1,
    I2c = 2,
    Can = 3,
    /// One-wire. Reported by the status table, never selectable by name.
    OneWire = 4,
}

impl InputMode {
    /// Modes the `input` command accepts, in table order.
    pub const SELECTABLE: [Self; 4] = [Self::Pwm, Self::Uart, Self::I2c, Self::Can];

    pub fn label(self) -> &'static str {
        match self {
            Self::Pwm => "PWM",
            Self::Uart => "UART",
            Self::I2c => "I2C",
            Self::Can => "CAN",
            Self::OneWire => "OW",
        }
    }
}

// ---------------------------------------------------------------------------
// Run mode
// ---------------------------------------------------------------------------

/// Control law applied to the setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RunMode {
    OpenLoop = 0,
    ClosedLoopRpm = 1,
    Thrust = 2,
    Servo = 3,
}

impl RunMode {
    pub const ALL: [Self; 4] = [Self::OpenLoop, Self::ClosedLoopRpm, Self::Thrust, Self::Servo];

    /// Name used both by the `mode` command grammar and the status table.
    pub fn label(self) -> &'static str {
        match self {
            Self::OpenLoop => "OPEN_LOOP",
            Self::ClosedLoopRpm => "RPM",
            Self::Thrust => "THRUST",
            Self::Servo => "SERVO",
        }
    }
}

// ---------------------------------------------------------------------------
// Command mode
// ---------------------------------------------------------------------------

/// Which protocol currently owns the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandMode {
    #[default]
    Cli,
    Binary,
}

// ---------------------------------------------------------------------------
// Disarm reason
// ---------------------------------------------------------------------------

/// Why the power stage was last disarmed. Printed numerically in debug
/// status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DisarmReason {
    #[default]
    Startup = 0,
    BadDetects = 1,
    CrossingTimeout = 2,
    PwmTimeout = 3,
    LowVoltage = 4,
    Cli = 5,
    Binary = 6,
    I2cTimeout = 7,
    CanTimeout = 8,
}

// ---------------------------------------------------------------------------
// Telemetry snapshot
// ---------------------------------------------------------------------------

/// A point-in-time copy of the motor-control telemetry variables.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EscTelemetry {
    /// Commanded FET duty, in timer counts.
    pub fet_duty_cycle: u32,
    /// Duty actually applied after slew limiting, in timer counts.
    pub fet_actual_duty_cycle: u32,
    /// PWM period, in timer counts. Full duty equals this value.
    pub fet_period: u32,
    pub total_bad_detects: u32,
    /// Raw commutation period, in timer ticks.
    pub crossing_period: u32,
    pub idle_percent: f32,
    pub rpm: f32,
    pub avg_amps: f32,
    pub max_amps: f32,
    pub avg_volts: f32,
    pub disarm_reason: DisarmReason,
}

impl EscTelemetry {
    /// Commanded duty as a 0.0–1.0 ratio (0 while the period is unknown).
    pub fn commanded_duty(&self) -> f32 {
        ratio(self.fet_duty_cycle, self.fet_period)
    }

    /// Applied duty as a 0.0–1.0 ratio (0 while the period is unknown).
    pub fn actual_duty(&self) -> f32 {
        ratio(self.fet_actual_duty_cycle, self.fet_period)
    }
}

fn ratio(counts: u32, period: u32) -> f32 {
    if period == 0 {
        0.0
    } else {
        counts as f32 / period as f32
    }
}
