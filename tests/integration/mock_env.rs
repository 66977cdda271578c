//! Recording environment for integration tests.
//!
//! State is whatever the test sets; every request the interpreter makes
//! is appended to `calls` and otherwise ignored, so tests can assert on
//! gating without a motor model in the way.

use esc32_cli::adapters::MemLink;
use esc32_cli::app::ports::{
    EscPort, FetPort, FlashError, ParamFormat, ParamInfo, ParamPort, PlatformPort, SerialPort,
};
use esc32_cli::esc::{CommandMode, DisarmReason, EscState, EscTelemetry, InputMode, RunMode};
use esc32_cli::Cli;

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Arm,
    Disarm(DisarmReason),
    Start,
    Stop,
    SetDuty(f32),
    NewInput(u16),
    ResetRpmPid,
    SetTargetRpm(f32),
    Beep(u16, u16),
    SetAngle(f32),
    SetParam(usize, f32),
    ReadFlash,
    WriteFlash,
    LoadDefaults,
    TimerDelay(u16),
    Reset,
}

// ── MockEnv ───────────────────────────────────────────────────

pub struct MockEnv {
    pub link: MemLink,
    pub state: EscState,
    pub input_mode: InputMode,
    pub run_mode: RunMode,
    pub command_mode: CommandMode,
    pub telemetry: EscTelemetry,
    pub params: Vec<(&'static str, f32, ParamFormat)>,
    pub millis: u32,
    pub pwm_limits: (u16, u16),
    pub build_number: u32,
    pub flash_fails: bool,
    pub calls: Vec<Call>,
}

#[allow(dead_code)]
impl MockEnv {
    pub fn new() -> Self {
        Self {
            link: MemLink::new(),
            state: EscState::Disarmed,
            input_mode: InputMode::Pwm,
            run_mode: RunMode::OpenLoop,
            command_mode: CommandMode::Cli,
            telemetry: EscTelemetry {
                fet_period: 1000,
                ..EscTelemetry::default()
            },
            params: vec![
                ("CONFIG_VERSION", 2.0, ParamFormat::Fixed(0)),
                ("PTERM", 0.5, ParamFormat::Fixed(3)),
                ("FF1TERM", 0.0, ParamFormat::Sci(3)),
                ("MAX_CURRENT", 20.0, ParamFormat::Fixed(1)),
            ],
            millis: 1,
            pwm_limits: (1100, 1900),
            build_number: 42,
            flash_fails: false,
            calls: Vec::new(),
        }
    }

    /// Same as `new`, in the given run state.
    pub fn in_state(state: EscState) -> Self {
        Self {
            state,
            ..Self::new()
        }
    }

    /// Boot a CLI against this environment and drop the banner.
    pub fn boot(&mut self) -> Cli {
        let mut cli = Cli::default();
        cli.init(self);
        self.link.take_output();
        cli
    }

    /// Type `line` plus return, poll once, and return everything printed.
    pub fn send(&mut self, cli: &mut Cli, line: &str) -> String {
        self.link.push_input(line.as_bytes());
        self.link.push_input(b"\r");
        cli.poll(self);
        self.link.take_output()
    }

    /// Poll once with no new input.
    pub fn poll(&mut self, cli: &mut Cli) -> String {
        cli.poll(self);
        self.link.take_output()
    }

    /// Text printed in response to `line`, without the echo and prompt.
    pub fn reply(&mut self, cli: &mut Cli, line: &str) -> String {
        let out = self.send(cli, line);
        let body = out
            .split_once("\r\n\x1b[J")
            .map_or(out.as_str(), |(_, rest)| rest);
        body.strip_suffix("\r\n> ").unwrap_or(body).to_string()
    }

    pub fn set_value(&mut self, name: &str, value: f32) {
        if let Some(p) = self.params.iter_mut().find(|p| p.0 == name) {
            p.1 = value;
        }
    }
}

// ── Ports ─────────────────────────────────────────────────────

impl SerialPort for MockEnv {
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

impl EscPort for MockEnv {
    fn state(&self) -> EscState {
        self.state
    }

    fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    fn set_input_mode(&mut self, mode: InputMode) {
        self.input_mode = mode;
    }

    fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    fn set_run_mode(&mut self, mode: RunMode) {
        self.run_mode = mode;
    }

    fn command_mode(&self) -> CommandMode {
        self.command_mode
    }

    fn set_command_mode(&mut self, mode: CommandMode) {
        self.command_mode = mode;
    }

    fn arm(&mut self) {
        self.calls.push(Call::Arm);
    }

    fn disarm(&mut self, reason: DisarmReason) {
        self.calls.push(Call::Disarm(reason));
    }

    fn start(&mut self) {
        self.calls.push(Call::Start);
    }

    fn stop(&mut self) {
        self.calls.push(Call::Stop);
    }

    fn set_duty(&mut self, percent: f32) -> bool {
        self.calls.push(Call::SetDuty(percent));
        if (0.0..=100.0).contains(&percent) {
            self.telemetry.fet_duty_cycle =
                (percent / 100.0 * self.telemetry.fet_period as f32) as u32;
            true
        } else {
            false
        }
    }

    fn new_input(&mut self, pwm_us: u16) {
        self.calls.push(Call::NewInput(pwm_us));
    }

    fn reset_rpm_pid(&mut self) {
        self.calls.push(Call::ResetRpmPid);
    }

    fn set_target_rpm(&mut self, rpm: f32) {
        self.calls.push(Call::SetTargetRpm(rpm));
    }
}

impl FetPort for MockEnv {
    fn beep(&mut self, freq_hz: u16, duration_ms: u16) {
        self.calls.push(Call::Beep(freq_hz, duration_ms));
    }

    fn set_angle(&mut self, degrees: f32) {
        self.calls.push(Call::SetAngle(degrees));
    }

    fn telemetry(&self) -> EscTelemetry {
        self.telemetry
    }
}

impl ParamPort for MockEnv {
    fn param_count(&self) -> usize {
        self.params.len()
    }

    fn param_id(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.0.eq_ignore_ascii_case(name))
    }

    fn param_info(&self, id: usize) -> Option<ParamInfo> {
        self.params.get(id).map(|p| ParamInfo {
            name: p.0,
            format: p.2,
        })
    }

    fn param(&self, id: usize) -> f32 {
        self.params.get(id).map_or(0.0, |p| p.1)
    }

    fn set_param(&mut self, id: usize, value: f32) {
        self.calls.push(Call::SetParam(id, value));
        if let Some(p) = self.params.get_mut(id) {
            p.1 = value;
        }
    }

    fn read_flash(&mut self) {
        self.calls.push(Call::ReadFlash);
    }

    fn write_flash(&mut self) -> Result<(), FlashError> {
        self.calls.push(Call::WriteFlash);
        if self.flash_fails {
            Err(FlashError::Program)
        } else {
            Ok(())
        }
    }

    fn load_defaults(&mut self) {
        self.calls.push(Call::LoadDefaults);
    }
}

impl PlatformPort for MockEnv {
    fn millis(&self) -> u32 {
        self.millis
    }

    fn timer_delay(&mut self, ticks: u16) {
        self.calls.push(Call::TimerDelay(ticks));
    }

    fn reset(&mut self) {
        self.calls.push(Call::Reset);
    }

    fn pwm_limits(&self) -> (u16, u16) {
        self.pwm_limits
    }

    fn build_number(&self) -> u32 {
        self.build_number
    }
}
