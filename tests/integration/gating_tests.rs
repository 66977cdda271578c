//! State gates, argument ranges and idempotence of individual commands.

use esc32_cli::esc::{DisarmReason, EscState, InputMode, RunMode};

use crate::mock_env::{Call, MockEnv};

fn booted(state: EscState) -> (MockEnv, esc32_cli::Cli) {
    let mut env = MockEnv::in_state(state);
    let cli = env.boot();
    (env, cli)
}

// ── arm / disarm / start / stop ───────────────────────────────

#[test]
fn arm_twice_is_rejected() {
    let (mut env, mut cli) = booted(EscState::Stopped);
    assert_eq!(env.reply(&mut cli, "arm"), "ESC already armed\r\n");
    assert!(env.calls.is_empty());
}

#[test]
fn disarm_is_unconditional() {
    for state in [EscState::Disarmed, EscState::Running] {
        let (mut env, mut cli) = booted(state);
        env.input_mode = InputMode::Uart;
        assert_eq!(env.reply(&mut cli, "disarm"), "ESC disarmed\r\n");
        assert_eq!(env.calls, vec![Call::Disarm(DisarmReason::Cli)]);
    }
}

#[test]
fn start_requires_armed_and_stopped() {
    let (mut env, mut cli) = booted(EscState::Disarmed);
    assert_eq!(env.reply(&mut cli, "start"), "ESC disarmed, arm first\r\n");

    for state in [EscState::PreStart, EscState::Starting, EscState::Running] {
        env.state = state;
        assert_eq!(env.reply(&mut cli, "start"), "ESC already running\r\n");
    }
    assert!(env.calls.is_empty());
}

#[test]
fn stop_requires_commutation() {
    for state in [EscState::Disarmed, EscState::Stopped] {
        let (mut env, mut cli) = booted(state);
        assert_eq!(env.reply(&mut cli, "stop"), "ESC not running\r\n");
        assert!(env.calls.is_empty());
    }

    let (mut env, mut cli) = booted(EscState::PreStart);
    let reply = env.reply(&mut cli, "stop");
    assert_eq!(reply, "Input mode set to UART\r\nESC stopping\r\n");
    assert_eq!(env.calls, vec![Call::Stop]);
}

// ── input / mode ──────────────────────────────────────────────

#[test]
fn input_matches_three_letters_and_disarms() {
    let (mut env, mut cli) = booted(EscState::Stopped);
    env.input_mode = InputMode::Uart;

    let reply = env.reply(&mut cli, "input i2cxyz");
    assert_eq!(reply, "ESC disarmed\r\nInput mode set to I2C\r\n");
    assert_eq!(env.input_mode, InputMode::I2c);
    assert_eq!(env.calls, vec![Call::Disarm(DisarmReason::Cli)]);
}

#[test]
fn input_uart_twice_announces_once() {
    let (mut env, mut cli) = booted(EscState::Disarmed);

    let first = env.reply(&mut cli, "input uart");
    assert_eq!(first.matches("Input mode set to").count(), 1);
    let second = env.reply(&mut cli, "input UART");
    assert!(!second.contains("Input mode set to"));
    assert_eq!(second, "ESC disarmed\r\n");
}

#[test]
fn input_rejects_unknown_and_one_wire() {
    let (mut env, mut cli) = booted(EscState::Disarmed);
    for line in ["input", "input ow", "input pw"] {
        assert_eq!(
            env.reply(&mut cli, line),
            "usage: input [PWM | UART | I2C | CAN]\r\n"
        );
    }
    assert!(env.calls.is_empty());
}

#[test]
fn mode_needs_the_full_label() {
    let (mut env, mut cli) = booted(EscState::Disarmed);

    assert_eq!(
        env.reply(&mut cli, "mode open"),
        "usage: mode [OPEN_LOOP | RPM | THRUST | SERVO]\r\n"
    );
    let reply = env.reply(&mut cli, "mode servo");
    assert!(reply.ends_with("Run mode set to SERVO\r\n"));
    assert_eq!(env.run_mode, RunMode::Servo);
}

// ── duty / pos / pwm / rpm ────────────────────────────────────

#[test]
fn setpoints_require_running() {
    for line in ["duty 10", "pos 10", "pwm 1500", "rpm 1000"] {
        let (mut env, mut cli) = booted(EscState::Starting);
        assert_eq!(env.reply(&mut cli, line), "ESC not running\r\n", "{line}");
        assert!(env.calls.is_empty());
    }
}

#[test]
fn duty_out_of_range_is_reported() {
    let (mut env, mut cli) = booted(EscState::Running);
    assert_eq!(env.reply(&mut cli, "duty 101"), "duty out of range: 0 => 100\r\n");
    assert_eq!(env.reply(&mut cli, "duty"), "usage: duty <percent>\r\n");
}

#[test]
fn pos_is_servo_only() {
    let (mut env, mut cli) = booted(EscState::Running);
    assert_eq!(env.reply(&mut cli, "pos 45"), "Command only valid in servo mode\r\n");

    env.run_mode = RunMode::Servo;
    assert_eq!(env.reply(&mut cli, "pos 45"), "Position set to 45.0\r\n");
    assert_eq!(env.calls, vec![Call::SetAngle(45.0)]);
}

#[test]
fn pwm_checks_calibrated_limits() {
    let (mut env, mut cli) = booted(EscState::Running);
    env.run_mode = RunMode::ClosedLoopRpm;

    assert_eq!(env.reply(&mut cli, "pwm 1099"), "PWM out of range: 1100 => 1900\r\n");
    assert_eq!(env.reply(&mut cli, "pwm 1901"), "PWM out of range: 1100 => 1900\r\n");
    assert_eq!(env.run_mode, RunMode::ClosedLoopRpm);

    assert_eq!(env.reply(&mut cli, "pwm 1100"), "PWM set to 1100\r\n");
    assert_eq!(env.run_mode, RunMode::OpenLoop);
    assert_eq!(env.calls, vec![Call::NewInput(1100)]);
}

#[test]
fn pwm_keeps_servo_mode() {
    let (mut env, mut cli) = booted(EscState::Running);
    env.run_mode = RunMode::Servo;
    env.reply(&mut cli, "pwm 1500");
    assert_eq!(env.run_mode, RunMode::Servo);
}

#[test]
fn rpm_needs_calibration() {
    let (mut env, mut cli) = booted(EscState::Running);
    assert_eq!(env.reply(&mut cli, "rpm 1000"), "Calibration parameters required\r\n");
    assert!(env.calls.is_empty());
}

#[test]
fn rpm_range_boundaries() {
    let (mut env, mut cli) = booted(EscState::Running);
    env.set_value("FF1TERM", 2.0e-4);

    assert_eq!(env.reply(&mut cli, "rpm 99"), "RPM out of range: 100 => 10000\r\n");
    assert_eq!(env.reply(&mut cli, "rpm 10001"), "RPM out of range: 100 => 10000\r\n");
    assert!(env.calls.is_empty());

    assert_eq!(env.reply(&mut cli, "rpm 100"), "RPM set to    100\r\n");
    assert_eq!(env.run_mode, RunMode::ClosedLoopRpm);
    assert_eq!(env.calls, vec![Call::ResetRpmPid, Call::SetTargetRpm(100.0)]);

    // Already closed loop: no second PID reset.
    env.calls.clear();
    env.reply(&mut cli, "rpm 10000");
    assert_eq!(env.calls, vec![Call::SetTargetRpm(10_000.0)]);
}

// ── beep ──────────────────────────────────────────────────────

#[test]
fn beep_frequency_boundaries() {
    let (mut env, mut cli) = booted(EscState::Stopped);

    assert_eq!(env.reply(&mut cli, "beep 9 10"), "frequency out of range: 10 => 5000\r\n");
    assert_eq!(env.reply(&mut cli, "beep 10 10"), "");
    assert_eq!(env.reply(&mut cli, "beep 5000 1000"), "");
    assert_eq!(env.reply(&mut cli, "beep 5001 1000"), "frequency out of range: 10 => 5000\r\n");

    assert_eq!(env.calls, vec![Call::Beep(10, 10), Call::Beep(5000, 1000)]);
}

#[test]
fn beep_duration_and_usage() {
    let (mut env, mut cli) = booted(EscState::Disarmed);

    assert_eq!(env.reply(&mut cli, "beep 440 0"), "duration out of range: 1 => 1000\r\n");
    assert_eq!(env.reply(&mut cli, "beep 440 1001"), "duration out of range: 1 => 1000\r\n");
    assert_eq!(env.reply(&mut cli, "beep 440"), "usage: beep <frequency> <duration>\r\n");
    assert!(env.calls.is_empty());
}

#[test]
fn beep_refused_while_spinning() {
    let (mut env, mut cli) = booted(EscState::PreStart);
    assert_eq!(env.reply(&mut cli, "beep 440 100"), "ESC must be stopped first\r\n");
}

// ── config / set ──────────────────────────────────────────────

#[test]
fn config_actions() {
    let (mut env, mut cli) = booted(EscState::Stopped);

    assert_eq!(env.reply(&mut cli, "config read"), "CONFIG: read flash\r\n");
    assert_eq!(env.reply(&mut cli, "config WRITE"), "CONFIG: wrote flash\r\n");
    assert_eq!(env.reply(&mut cli, "config default"), "CONFIG: defaults loaded\r\n");
    assert_eq!(
        env.reply(&mut cli, "config erase"),
        "usage: config [READ | WRITE | DEFAULT]\r\n"
    );
    assert_eq!(env.calls, vec![Call::ReadFlash, Call::WriteFlash, Call::LoadDefaults]);
}

#[test]
fn config_write_failure_is_reported() {
    let (mut env, mut cli) = booted(EscState::Disarmed);
    env.flash_fails = true;
    assert_eq!(env.reply(&mut cli, "config write"), "CONFIG: write flash failed!\r\n");
}

#[test]
fn config_refused_while_running() {
    let (mut env, mut cli) = booted(EscState::Running);
    assert_eq!(env.reply(&mut cli, "config read"), "ESC must be stopped first\r\n");
    assert!(env.calls.is_empty());
}

#[test]
fn set_then_get_shows_formatted_value() {
    let (mut env, mut cli) = booted(EscState::Disarmed);

    let reply = env.reply(&mut cli, "set max_current 1.5");
    assert_eq!(reply, format!("{:<20} = 1.5\r\n", "MAX_CURRENT"));
    assert_eq!(env.reply(&mut cli, "set MAX_CURRENT"), reply);
    assert_eq!(env.calls, vec![Call::SetParam(3, 1.5)]);
}

#[test]
fn set_uses_scientific_format_where_declared() {
    let (mut env, mut cli) = booted(EscState::Disarmed);
    let reply = env.reply(&mut cli, "set ff1term 0.00025");
    assert_eq!(reply, format!("{:<20} = 2.500e-4\r\n", "FF1TERM"));
}

#[test]
fn set_list_skips_layout_version() {
    let (mut env, mut cli) = booted(EscState::Running);
    let reply = env.reply(&mut cli, "set list");

    let lines: Vec<&str> = reply.split_terminator("\r\n").collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("PTERM"));
    assert!(!reply.contains("CONFIG_VERSION"));
}

#[test]
fn set_unknown_name_is_reported_before_state() {
    let (mut env, mut cli) = booted(EscState::Running);
    assert_eq!(
        env.reply(&mut cli, "set FOO 1.5"),
        "SET: no such parameter 'FOO'\r\n"
    );
}

#[test]
fn set_value_requires_stopped_but_read_does_not() {
    let (mut env, mut cli) = booted(EscState::Running);
    assert_eq!(env.reply(&mut cli, "set PTERM 1"), "ESC must be stopped first\r\n");
    assert_eq!(env.reply(&mut cli, "set PTERM"), format!("{:<20} = 0.500\r\n", "PTERM"));
    assert!(env.calls.is_empty());
}

#[test]
fn set_without_name_prints_usage() {
    let (mut env, mut cli) = booted(EscState::Disarmed);
    assert_eq!(
        env.reply(&mut cli, "set"),
        "usage: set LIST | [<PARAMETER> <value>]\r\n"
    );
}

// ── status / bootloader ───────────────────────────────────────

#[test]
fn status_table_rows() {
    let (mut env, mut cli) = booted(EscState::Running);
    env.telemetry.fet_actual_duty_cycle = 500;
    env.telemetry.crossing_period = 400;
    env.telemetry.rpm = 4321.0;
    env.telemetry.avg_volts = 12.0;

    let reply = env.reply(&mut cli, "status");
    let rows: Vec<&str> = reply.split_terminator("\r\n").collect();
    assert!(rows.len() >= 12);
    assert_eq!(rows[0], format!("{:<12}{:>10}", "INPUT MODE", "PWM"));
    assert_eq!(rows[1], format!("{:<12}{:>10}", "RUN MODE", "OPEN_LOOP"));
    assert_eq!(rows[2], format!("{:<12}{:>10}", "ESC STATE", "RUNNING"));
    assert_eq!(rows[4], format!("{:<12}{:>10}", "COMM PERIOD", "200.00"));
    assert_eq!(rows[6], format!("{:<12}{:>10}", "FET DUTY", "50.00"));
    assert_eq!(rows[7], format!("{:<12}{:>10}", "RPM", "4321.00"));
    assert_eq!(rows[11], format!("{:<12}{:>10}", "MOTOR VOLTS", "6.00"));
}

#[test]
fn bootloader_requires_disarmed() {
    let (mut env, mut cli) = booted(EscState::Stopped);
    assert_eq!(env.reply(&mut cli, "bootloader"), "ESC armed, disarm first\r\n");
    assert!(env.calls.is_empty());
}

#[test]
fn bootloader_waits_then_resets() {
    let (mut env, mut cli) = booted(EscState::Disarmed);
    let out = env.send(&mut cli, "bootloader");

    assert!(out.ends_with("Rebooting in boot loader mode...\r\n\r\n> "));
    assert_eq!(env.calls, vec![Call::TimerDelay(0xFFFF), Call::Reset]);
}
