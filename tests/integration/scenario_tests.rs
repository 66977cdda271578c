//! Operator sessions from boot to reply.

use esc32_cli::cli::table::COMMANDS;
use esc32_cli::esc::{CommandMode, EscState, InputMode, RunMode};

use crate::mock_env::{Call, MockEnv};

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_clears_screen_and_prompts() {
    let mut env = MockEnv::new();
    let mut cli = esc32_cli::Cli::default();
    cli.init(&mut env);
    let out = env.link.take_output();

    assert!(out.starts_with("\x1b[H\x1b[2JESC32 ver "));
    assert!(out.contains(".42\r\n"), "build number missing: {out:?}");
    assert!(out.ends_with("\r\nCLI ready.\r\n\r\n> "));
    assert!(env.calls.is_empty());
}

#[test]
fn version_reports_banner_string() {
    let mut env = MockEnv::new();
    let mut cli = env.boot();
    let out = env.send(&mut cli, "version");

    assert!(out.starts_with("version\r\n\x1b[J"));
    assert!(out.contains(&format!("ESC32 ver {}\r\n", cli.version())));
    assert!(out.ends_with("\r\n> "));
}

// ── Help ──────────────────────────────────────────────────────

#[test]
fn help_lists_every_command_alphabetically() {
    let mut env = MockEnv::new();
    let mut cli = env.boot();
    let reply = env.reply(&mut cli, "help");

    let body = reply
        .strip_prefix("Available commands:\r\n\n")
        .expect("help header");
    let lines: Vec<&str> = body.split_terminator("\r\n").collect();
    assert_eq!(lines.len(), 19);

    let names: Vec<&str> = lines
        .iter()
        .map(|l| l.split(' ').next().unwrap_or(""))
        .collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);

    for (line, cmd) in lines.iter().zip(COMMANDS.iter()) {
        assert_eq!(*line, format!("{} {}", cmd.name, cmd.params));
    }
}

#[test]
fn commands_are_case_insensitive_and_prefix_matched() {
    let mut env = MockEnv::new();
    let mut cli = env.boot();

    assert!(env.reply(&mut cli, "HELP").starts_with("Available commands:"));
    // Trailing characters after a full name still select it.
    assert!(env.reply(&mut cli, "versionfoo").starts_with("ESC32 ver "));
}

// ── Arming ────────────────────────────────────────────────────

#[test]
fn arm_switches_to_uart_before_confirming() {
    let mut env = MockEnv::new();
    let mut cli = env.boot();

    let reply = env.reply(&mut cli, "arm");
    assert_eq!(reply, "Input mode set to UART\r\nESC armed\r\n");
    assert_eq!(env.input_mode, InputMode::Uart);
    assert_eq!(env.calls, vec![Call::Arm]);
}

#[test]
fn arm_in_servo_mode_keeps_input_source() {
    let mut env = MockEnv::new();
    env.run_mode = RunMode::Servo;
    let mut cli = env.boot();

    assert_eq!(env.reply(&mut cli, "arm"), "ESC armed\r\n");
    assert_eq!(env.input_mode, InputMode::Pwm);
}

#[test]
fn full_start_stop_cycle() {
    let mut env = MockEnv::new();
    let mut cli = env.boot();

    env.reply(&mut cli, "arm");
    env.state = EscState::Stopped;
    assert_eq!(env.reply(&mut cli, "start"), "ESC started\r\n");
    env.state = EscState::Running;
    assert_eq!(env.reply(&mut cli, "duty 25"), "Fet duty set to 25.00%\r\n");
    assert_eq!(env.reply(&mut cli, "stop"), "ESC stopping\r\n");
    env.state = EscState::Stopped;
    assert_eq!(env.reply(&mut cli, "disarm"), "ESC disarmed\r\n");

    assert_eq!(
        env.calls,
        vec![
            Call::Arm,
            Call::Start,
            Call::SetDuty(25.0),
            Call::Stop,
            Call::Disarm(esc32_cli::esc::DisarmReason::Cli),
        ]
    );
}

// ── Binary hand-off ───────────────────────────────────────────

#[test]
fn binary_hands_over_the_link() {
    let mut env = MockEnv::in_state(EscState::Stopped);
    let mut cli = env.boot();

    let out = env.send(&mut cli, "binary");
    assert!(out.ends_with("Entering binary command mode...\r\n"));
    assert_eq!(env.command_mode, CommandMode::Binary);

    env.link.push_input(b"help\r");
    let out = env.poll(&mut cli);
    assert!(out.is_empty());
    // Bytes belong to the binary protocol now; the interpreter leaves them.
    assert_eq!(env.link.pending_input(), 5);
}

#[test]
fn bytes_after_binary_in_same_burst_are_not_dispatched() {
    let mut env = MockEnv::new();
    let mut cli = env.boot();

    env.link.push_input(b"binary\rarm\r");
    cli.poll(&mut env);
    let out = env.link.take_output();

    assert!(!out.contains("ESC armed"));
    assert!(env.calls.is_empty());
    assert_eq!(env.link.pending_input(), 4);
}

// ── Unknown input ─────────────────────────────────────────────

#[test]
fn unknown_command_reprompts() {
    let mut env = MockEnv::new();
    let mut cli = env.boot();

    let out = env.send(&mut cli, "xyz");
    assert_eq!(out, "xyz\r\n\x1b[JCommand not found\r\n> ");
    assert!(env.calls.is_empty());
}

#[test]
fn abbreviation_shorter_than_any_name_is_unknown() {
    let mut env = MockEnv::new();
    let mut cli = env.boot();
    assert_eq!(env.reply(&mut cli, "st"), "Command not found");
}

#[test]
fn empty_return_only_reprompts() {
    let mut env = MockEnv::new();
    let mut cli = env.boot();
    assert_eq!(env.send(&mut cli, ""), "\r\n> ");
}

#[test]
fn ctrl_c_discards_partial_line() {
    let mut env = MockEnv::new();
    let mut cli = env.boot();

    env.link.push_input(b"arm\x03");
    let out = env.poll(&mut cli);
    assert_eq!(out, "arm\r\n> ");
    assert_eq!(cli.input(), "");

    env.link.push_input(b"\r");
    env.poll(&mut cli);
    assert!(env.calls.is_empty());
}

#[test]
fn overlong_line_is_submitted_when_full() {
    let mut env = MockEnv::new();
    let mut cli = env.boot();

    // "help" plus padding reaches 33 bytes; the 33rd submits the first 32.
    let mut line = b"help".to_vec();
    line.resize(33, b'x');
    env.link.push_input(&line);
    env.link.push_input(b"\r");
    let out = env.poll(&mut cli);

    assert_eq!(out.matches("Available commands:").count(), 1);
    assert!(out.ends_with("\r\n> "));
    assert_eq!(cli.input(), "");
}

#[test]
fn input_is_drained_across_several_lines() {
    let mut env = MockEnv::new();
    let mut cli = env.boot();

    env.link.push_input(b"version\rxyz\r");
    let out = env.poll(&mut cli);
    assert!(out.contains("ESC32 ver "));
    assert!(out.contains("Command not found"));
    assert_eq!(env.link.pending_input(), 0);
}
