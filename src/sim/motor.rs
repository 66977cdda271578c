//! First-order brushless motor and supply model.

use crate::config::MotorModel;

/// Largest duty change the power stage applies per millisecond.
const DUTY_SLEW_PER_MS: f32 = 0.01;

/// Source resistance of the battery and wiring, in ohms.
const SUPPLY_RESISTANCE: f32 = 0.02;

/// Weight of each new current sample in the running average.
const AMPS_FILTER: f32 = 0.05;

pub struct Motor {
    model: MotorModel,
    rpm: f32,
    actual_duty: f32,
    avg_amps: f32,
    max_amps: f32,
    volts: f32,
}

impl Motor {
    pub fn new(model: MotorModel) -> Self {
        let volts = model.battery_volts;
        Self {
            model,
            rpm: 0.0,
            actual_duty: 0.0,
            avg_amps: 0.0,
            max_amps: 0.0,
            volts,
        }
    }

    /// Advance the model by `dt_ms` with the given drive.
    pub fn step(&mut self, duty: f32, commutating: bool, dt_ms: f32) {
        let max_step = DUTY_SLEW_PER_MS * dt_ms;
        self.actual_duty += (duty - self.actual_duty).clamp(-max_step, max_step);
        self.actual_duty = self.actual_duty.clamp(0.0, 1.0);

        let no_load_rpm = self.model.kv * self.model.battery_volts;
        let target = if commutating {
            self.model.kv * self.volts * self.actual_duty
        } else {
            0.0
        };
        let alpha = (dt_ms / self.model.time_constant_ms.max(dt_ms)).min(1.0);
        self.rpm += (target - self.rpm) * alpha;
        if !commutating && self.rpm < 1.0 {
            self.rpm = 0.0;
        }

        let amps = if self.actual_duty > 0.0 {
            let back_emf = if no_load_rpm > 0.0 { self.rpm / no_load_rpm } else { 0.0 };
            let idle = if self.rpm > 0.0 { self.model.idle_amps } else { 0.0 };
            idle + self.model.stall_amps * self.actual_duty * (1.0 - back_emf).max(0.0)
        } else {
            0.0
        };
        self.avg_amps += (amps - self.avg_amps) * AMPS_FILTER;
        self.max_amps = self.max_amps.max(self.avg_amps);
        self.volts = self.model.battery_volts - self.avg_amps * SUPPLY_RESISTANCE;
    }

    pub fn rpm(&self) -> f32 {
        self.rpm
    }

    /// Duty after slew limiting, 0.0..=1.0.
    pub fn actual_duty(&self) -> f32 {
        self.actual_duty
    }

    pub fn avg_amps(&self) -> f32 {
        self.avg_amps
    }

    pub fn max_amps(&self) -> f32 {
        self.max_amps
    }

    pub fn volts(&self) -> f32 {
        self.volts
    }

    pub fn battery_volts(&self) -> f32 {
        self.model.battery_volts
    }

    /// Time between zero crossings in microseconds, 0 when stopped.
    pub fn crossing_period_us(&self, poles: f32) -> f32 {
        // Six commutation steps per electrical revolution.
        let crossings_per_sec = self.rpm / 60.0 * (poles / 2.0) * 6.0;
        if crossings_per_sec < 1.0 {
            0.0
        } else {
            1.0e6 / crossings_per_sec
        }
    }
}
