//! Shared mutable context threaded through every run-state handler.
//!
//! The simulator writes the rotor snapshot before each tick and applies
//! the drive command after it. State handlers only ever see this struct.

use crate::control::pid::{PidController, PidGains};
use crate::esc::RunMode;

// ---------------------------------------------------------------------------
// Rotor snapshot (written by the motor model)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct RotorSnapshot {
    pub rpm: f32,
    /// Supply voltage under load.
    pub volts: f32,
}

// ---------------------------------------------------------------------------
// Drive command (written by state handlers)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveCommand {
    /// Commanded duty, 0.0..=1.0.
    pub duty: f32,
    /// Phases are being commutated; otherwise the rotor is free or held.
    pub commutating: bool,
}

impl DriveCommand {
    pub const OFF: Self = Self {
        duty: 0.0,
        commutating: false,
    };
}

// ---------------------------------------------------------------------------
// Operator setpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Setpoint {
    pub run_mode: RunMode,
    /// Open-loop duty, 0.0..=1.0.
    pub open_loop_duty: f32,
    pub target_rpm: f32,
    /// Servo target in degrees.
    pub angle: f32,
}

impl Default for Setpoint {
    fn default() -> Self {
        Self {
            run_mode: RunMode::OpenLoop,
            open_loop_duty: 0.0,
            target_rpm: 0.0,
            angle: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Start-up and closed-loop tuning (copied from the parameter store)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Tuning {
    /// Rotor alignment time before commutation starts.
    pub align_ms: f32,
    pub align_duty: f32,
    /// Duty used to spin up, and kept afterwards until the operator asks
    /// for something else.
    pub start_duty: f32,
    /// Rotor speed at which commutation counts as established.
    pub running_rpm: f32,
    /// Feed-forward: duty = ff1 * rpm^2 + ff2 * rpm.
    pub ff1: f32,
    pub ff2: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            align_ms: 600.0,
            align_duty: 0.07,
            start_duty: 0.1,
            running_rpm: 400.0,
            ff1: 0.0,
            ff2: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// MotorContext
// ---------------------------------------------------------------------------

pub struct MotorContext {
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    pub total_ticks: u64,
    pub tick_period_ms: f32,

    pub rotor: RotorSnapshot,
    pub drive: DriveCommand,
    pub setpoint: Setpoint,
    pub tuning: Tuning,
    pub rpm_pid: PidController,
}

impl MotorContext {
    pub fn new(tick_period_ms: f32) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            tick_period_ms,
            rotor: RotorSnapshot::default(),
            drive: DriveCommand::OFF,
            setpoint: Setpoint::default(),
            tuning: Tuning::default(),
            rpm_pid: PidController::new(PidGains::default()),
        }
    }

    /// Milliseconds elapsed since the current state was entered.
    pub fn ms_in_state(&self) -> f32 {
        self.ticks_in_state as f32 * self.tick_period_ms
    }

    /// Feed-forward plus PID duty for the current RPM target.
    pub fn closed_loop_duty(&mut self) -> f32 {
        let target = self.setpoint.target_rpm;
        let ff = self.tuning.ff1 * target * target + self.tuning.ff2 * target;
        self.rpm_pid.set_target(target);
        let correction = self.rpm_pid.compute(self.rotor.rpm, self.tick_period_ms / 1000.0);
        (ff + correction).clamp(0.0, 1.0)
    }
}
