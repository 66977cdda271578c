//! Host-side ESC simulator.
//!
//! `SimEsc` stands in for the firmware around the command interpreter:
//! it owns the serial link, runs the run-state machine against a motor
//! model, keeps the parameter table and its flash image, and implements
//! every port the interpreter consumes.
//!
//! ```text
//!   advance(ms) ── per ms: motor.step ── fsm.tick ── drive command
//!   Cli::poll ──▶ ports ──▶ force_transition / setpoints / params
//! ```

pub mod motor;
pub mod params;

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::app::ports::{
    EscPort, FetPort, FlashError, ParamInfo, ParamPort, PlatformPort, SerialPort,
};
use crate::config::SimConfig;
use crate::control::pid::PidGains;
use crate::esc::{CommandMode, DisarmReason, EscState, EscTelemetry, InputMode, RunMode};
use crate::fsm::context::{MotorContext, Tuning};
use crate::fsm::{states, Fsm};
use motor::Motor;
use params::{id, ParamStore};

/// FET PWM period in timer counts.
pub const FET_PERIOD: u32 = 1800;

/// Rotor speed at which commutation counts as established.
const RUNNING_RPM: f32 = 400.0;

/// Scale from the PTERM/ITERM parameters to duty per rpm.
const PTERM_SCALE: f32 = 1.0e-4;
const ITERM_SCALE: f32 = 1.0e-1;

pub struct SimEsc<L, D> {
    link: L,
    delay: D,
    fsm: Fsm,
    ctx: MotorContext,
    motor: Motor,
    params: ParamStore,
    input_mode: InputMode,
    command_mode: CommandMode,
    disarm_reason: DisarmReason,
    millis: u32,
    timer_mult: u32,
    last_beep: Option<(u16, u16)>,
    reset_requested: bool,
}

impl<L: SerialPort, D: DelayNs> SimEsc<L, D> {
    /// Power-on state: disarmed, PWM input, open loop, parameters read
    /// from (erased) flash.
    pub fn new(link: L, delay: D, config: &SimConfig) -> Self {
        let mut fsm = Fsm::new(states::build_state_table(), EscState::Disarmed);
        let mut ctx = MotorContext::new(1.0);
        fsm.start(&mut ctx);

        let mut sim = Self {
            link,
            delay,
            fsm,
            ctx,
            motor: Motor::new(config.motor.clone()),
            params: ParamStore::new(),
            input_mode: InputMode::Pwm,
            command_mode: CommandMode::Cli,
            disarm_reason: DisarmReason::Startup,
            millis: 0,
            timer_mult: config.cli.timer_mult.max(1),
            last_beep: None,
            reset_requested: false,
        };
        sim.refresh_tuning();
        sim
    }

    /// Like [`SimEsc::new`], booting with `image` in the parameter flash.
    pub fn with_flash_image(link: L, delay: D, config: &SimConfig, image: &[u8]) -> Self {
        let mut sim = Self::new(link, delay, config);
        if sim.params.load_flash_image(image) {
            sim.params.read_flash();
            sim.refresh_tuning();
        } else {
            warn!("stored parameter image rejected, using defaults");
        }
        sim
    }

    /// Move simulated time forward one millisecond at a time.
    pub fn advance(&mut self, ms: u32) {
        for _ in 0..ms {
            self.millis = self.millis.wrapping_add(1);
            self.motor
                .step(self.ctx.drive.duty, self.ctx.drive.commutating, self.ctx.tick_period_ms);
            self.ctx.rotor.rpm = self.motor.rpm();
            self.ctx.rotor.volts = self.motor.volts();
            self.fsm.tick(&mut self.ctx);
        }
    }

    /// `true` once after the interpreter asked for a processor reset.
    pub fn take_reset(&mut self) -> bool {
        core::mem::take(&mut self.reset_requested)
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Give the serial link back, e.g. to carry it across a reset.
    pub fn into_link(self) -> L {
        self.link
    }

    pub fn flash_image(&self) -> &[u8] {
        self.params.flash_image()
    }

    pub fn set_flash_write_protect(&mut self, on: bool) {
        self.params.set_write_protect(on);
    }

    /// Last `(frequency, duration)` sounded through the windings.
    pub fn last_beep(&self) -> Option<(u16, u16)> {
        self.last_beep
    }

    pub fn target_rpm(&self) -> f32 {
        self.ctx.setpoint.target_rpm
    }

    pub fn angle(&self) -> f32 {
        self.ctx.setpoint.angle
    }

    pub fn disarm_reason(&self) -> DisarmReason {
        self.disarm_reason
    }

    /// Copy start-up and control tuning out of the parameter table.
    fn refresh_tuning(&mut self) {
        let battery = self.motor.battery_volts().max(1.0);
        self.ctx.tuning = Tuning {
            align_ms: self.params.get(id::START_ALIGN_TIME).max(0.0),
            align_duty: (self.params.get(id::START_ALIGN_VOLTAGE) / battery).clamp(0.0, 1.0),
            start_duty: (self.params.get(id::START_VOLTAGE) / battery).clamp(0.0, 1.0),
            running_rpm: RUNNING_RPM,
            ff1: self.params.get(id::FF1TERM),
            ff2: self.params.get(id::FF2TERM),
        };
        self.ctx.rpm_pid.set_gains(PidGains {
            kp: self.params.get(id::PTERM) * PTERM_SCALE,
            ki: self.params.get(id::ITERM) * ITERM_SCALE,
            kd: 0.0,
        });
    }

    /// Position of `pwm_us` within the calibrated range, 0.0..=1.0.
    fn pwm_fraction(&self, pwm_us: u16) -> f32 {
        let (lo, hi) = self.pwm_limits();
        if hi <= lo {
            return 0.0;
        }
        ((f32::from(pwm_us) - f32::from(lo)) / f32::from(hi - lo)).clamp(0.0, 1.0)
    }
}

// ── Serial link ───────────────────────────────────────────────

impl<L: SerialPort, D: DelayNs> SerialPort for SimEsc<L, D> {
    fn available(&mut self) -> usize {
        self.link.available()
    }

    fn read(&mut self) -> Option<u8> {
        self.link.read()
    }

    fn write(&mut self, byte: u8) {
        self.link.write(byte);
    }

    fn print(&mut self, s: &str) {
        self.link.print(s);
    }

    fn flush(&mut self) {
        self.link.flush();
    }
}

// ── Run state machine ─────────────────────────────────────────

impl<L: SerialPort, D: DelayNs> EscPort for SimEsc<L, D> {
    fn state(&self) -> EscState {
        self.fsm.current_state()
    }

    fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    fn set_input_mode(&mut self, mode: InputMode) {
        self.input_mode = mode;
    }

    fn run_mode(&self) -> RunMode {
        self.ctx.setpoint.run_mode
    }

    fn set_run_mode(&mut self, mode: RunMode) {
        self.ctx.setpoint.run_mode = mode;
    }

    fn command_mode(&self) -> CommandMode {
        self.command_mode
    }

    fn set_command_mode(&mut self, mode: CommandMode) {
        if mode != self.command_mode {
            info!("command mode {:?} -> {:?}", self.command_mode, mode);
        }
        self.command_mode = mode;
    }

    fn arm(&mut self) {
        if self.fsm.current_state() == EscState::Disarmed {
            self.fsm.force_transition(EscState::Stopped, &mut self.ctx);
        }
    }

    fn disarm(&mut self, reason: DisarmReason) {
        self.disarm_reason = reason;
        self.fsm.force_transition(EscState::Disarmed, &mut self.ctx);
    }

    fn start(&mut self) {
        if self.fsm.current_state() == EscState::Stopped {
            self.refresh_tuning();
            self.ctx.rpm_pid.reset();
            self.fsm.force_transition(EscState::PreStart, &mut self.ctx);
        }
    }

    fn stop(&mut self) {
        if self.fsm.current_state() >= EscState::NOCOMM {
            self.fsm.force_transition(EscState::Stopped, &mut self.ctx);
        }
    }

    fn set_duty(&mut self, percent: f32) -> bool {
        if !(0.0..=100.0).contains(&percent) {
            return false;
        }
        let duty = percent / 100.0;
        self.ctx.setpoint.run_mode = RunMode::OpenLoop;
        self.ctx.setpoint.open_loop_duty = duty;
        if self.fsm.current_state() == EscState::Running {
            self.ctx.drive.duty = duty;
        }
        true
    }

    fn new_input(&mut self, pwm_us: u16) {
        let frac = self.pwm_fraction(pwm_us);
        match self.ctx.setpoint.run_mode {
            RunMode::OpenLoop | RunMode::Thrust => {
                self.ctx.setpoint.open_loop_duty = frac;
                if self.fsm.current_state() == EscState::Running {
                    self.ctx.drive.duty = frac;
                }
            }
            RunMode::ClosedLoopRpm => {
                self.ctx.setpoint.target_rpm = frac * self.params.get(id::PWM_RPM_SCALE);
            }
            RunMode::Servo => {
                self.ctx.setpoint.angle = frac * self.params.get(id::SERVO_SCALE);
            }
        }
        debug!("new input {pwm_us} us ({:.3})", frac);
    }

    fn reset_rpm_pid(&mut self) {
        self.refresh_tuning();
        self.ctx.rpm_pid.reset();
    }

    fn set_target_rpm(&mut self, rpm: f32) {
        self.ctx.setpoint.target_rpm = rpm;
    }
}

// ── FET driver ────────────────────────────────────────────────

impl<L: SerialPort, D: DelayNs> FetPort for SimEsc<L, D> {
    fn beep(&mut self, freq_hz: u16, duration_ms: u16) {
        self.last_beep = Some((freq_hz, duration_ms));
        info!("beep {freq_hz} Hz for {duration_ms} ms");
    }

    fn set_angle(&mut self, degrees: f32) {
        self.ctx.setpoint.angle = degrees;
    }

    fn telemetry(&self) -> EscTelemetry {
        let poles = self.params.get(id::MOTOR_POLES);
        let crossing_us = self.motor.crossing_period_us(poles);
        let actual = self.motor.actual_duty();
        let idle_percent = if self.ctx.drive.commutating {
            92.0 - 40.0 * actual
        } else {
            97.0
        };

        EscTelemetry {
            fet_duty_cycle: (self.ctx.drive.duty * FET_PERIOD as f32) as u32,
            fet_actual_duty_cycle: (actual * FET_PERIOD as f32) as u32,
            fet_period: FET_PERIOD,
            total_bad_detects: 0,
            crossing_period: (crossing_us * self.timer_mult as f32) as u32,
            idle_percent,
            rpm: self.motor.rpm(),
            avg_amps: self.motor.avg_amps(),
            max_amps: self.motor.max_amps(),
            avg_volts: self.motor.volts(),
            disarm_reason: self.disarm_reason,
        }
    }
}

// ── Parameter store ───────────────────────────────────────────

impl<L: SerialPort, D: DelayNs> ParamPort for SimEsc<L, D> {
    fn param_count(&self) -> usize {
        self.params.count()
    }

    fn param_id(&self, name: &str) -> Option<usize> {
        self.params.id(name)
    }

    fn param_info(&self, id: usize) -> Option<ParamInfo> {
        self.params.info(id)
    }

    fn param(&self, id: usize) -> f32 {
        self.params.get(id)
    }

    fn set_param(&mut self, id: usize, value: f32) {
        self.params.set(id, value);
    }

    fn read_flash(&mut self) {
        self.params.read_flash();
    }

    fn write_flash(&mut self) -> Result<(), FlashError> {
        self.params.write_flash()
    }

    fn load_defaults(&mut self) {
        self.params.load_defaults();
    }
}

// ── Platform ──────────────────────────────────────────────────

impl<L: SerialPort, D: DelayNs> PlatformPort for SimEsc<L, D> {
    fn millis(&self) -> u32 {
        self.millis
    }

    fn timer_delay(&mut self, ticks: u16) {
        self.delay.delay_us(u32::from(ticks) / self.timer_mult);
    }

    fn reset(&mut self) {
        info!("processor reset requested");
        self.reset_requested = true;
    }

    fn pwm_limits(&self) -> (u16, u16) {
        let lo = self.params.get(id::PWM_LO_VALUE).clamp(0.0, f32::from(u16::MAX)) as u16;
        let hi = self.params.get(id::PWM_HI_VALUE).clamp(0.0, f32::from(u16::MAX)) as u16;
        (lo, hi)
    }

    fn build_number(&self) -> u32 {
        env!("ESC32_BUILD_NUMBER").parse().unwrap_or(0)
    }
}
