//! PID controller for closed-loop RPM.
//!
//! Output is a duty correction added on top of the feed-forward duty, so
//! the limits are symmetric by default. The derivative acts on the
//! measurement, not the error, so a new target does not kick the output.

/// Proportional, integral and derivative gains.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

/// PID controller with integral clamping.
#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    setpoint: f32,
    integral: f32,
    prev_measurement: Option<f32>,
    output_min: f32,
    output_max: f32,
}

impl PidController {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            setpoint: 0.0,
            integral: 0.0,
            prev_measurement: None,
            output_min: -1.0,
            output_max: 1.0,
        }
    }

    /// Set output limits
    pub fn set_limits(&mut self, min: f32, max: f32) {
        self.output_min = min;
        self.output_max = max;
    }

    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
    }

    pub fn set_target(&mut self, setpoint: f32) {
        self.setpoint = setpoint;
    }

    pub fn target(&self) -> f32 {
        self.setpoint
    }

    /// One controller step. `dt` is in seconds.
    pub fn compute(&mut self, measurement: f32, dt: f32) -> f32 {
        let error = self.setpoint - measurement;
        let p = self.gains.kp * error;

        let d = match self.prev_measurement {
            Some(prev) if dt > 0.0 => -self.gains.kd * (measurement - prev) / dt,
            _ => 0.0,
        };
        self.prev_measurement = Some(measurement);

        let candidate = self.integral + error * dt;
        let unclamped = p + self.gains.ki * candidate + d;
        let output = unclamped.clamp(self.output_min, self.output_max);

        // Integrate only while unsaturated, or while the error pulls back out.
        let saturated_high = unclamped > self.output_max && error > 0.0;
        let saturated_low = unclamped < self.output_min && error < 0.0;
        if !saturated_high && !saturated_low {
            self.integral = candidate;
        }

        output
    }

    /// Clear accumulated state; gains, limits and target are kept.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_measurement = None;
    }
}
