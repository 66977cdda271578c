//! One handler per command.
//!
//! Every handler reads the run state once at entry, rejects with a
//! [`CommandError`] when the state or arguments are wrong, and otherwise
//! issues its request and prints the confirmation. The dispatcher prints
//! the rejections.

use log::{debug, info};

use super::scan::{fields, ncase_eq, parse_f32, parse_u16};
use super::table::COMMANDS;
use super::term::{CLEAR, HOME};
use super::{status, Ctx};
use crate::app::ports::Environment;
use crate::error::{CommandError, Range};
use crate::esc::{CommandMode, DisarmReason, EscState, InputMode, RunMode};

type CmdResult = Result<(), CommandError>;

/// Name of the feed-forward calibration parameter gating `rpm`.
const FF1TERM: &str = "FF1TERM";

/// Bytes of a mode word that `input` compares.
const INPUT_MATCH_LEN: usize = 3;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Switch the input source, announcing it only when it actually changes.
fn change_input(env: &mut dyn Environment, mode: InputMode) {
    if env.input_mode() != mode {
        env.set_input_mode(mode);
        env.print_fmt(format_args!("Input mode set to {}\r\n", mode.label()));
        info!("input mode -> {}", mode.label());
    }
}

fn print_param(env: &mut dyn Environment, id: usize) {
    let Some(info) = env.param_info(id) else {
        return;
    };
    let value = env.param(id);
    env.print_fmt(format_args!("{:<20} = {}\r\n", info.name, info.format.display(value)));
}

fn first_field(tail: &str) -> Result<&str, CommandError> {
    fields(tail).next().ok_or(CommandError::Usage)
}

// ---------------------------------------------------------------------------
// Arming
// ---------------------------------------------------------------------------

pub fn arm(ctx: &mut Ctx<'_>, _tail: &str) -> CmdResult {
    if ctx.env.state() > EscState::Disarmed {
        return Err(CommandError::AlreadyArmed);
    }
    if ctx.env.run_mode() != RunMode::Servo {
        change_input(ctx.env, InputMode::Uart);
    }
    ctx.env.arm();
    ctx.env.print("ESC armed\r\n");
    info!("armed from CLI");
    Ok(())
}

pub fn disarm(ctx: &mut Ctx<'_>, _tail: &str) -> CmdResult {
    ctx.env.disarm(DisarmReason::Cli);
    change_input(ctx.env, InputMode::Uart);
    ctx.env.print("ESC disarmed\r\n");
    info!("disarmed from CLI");
    Ok(())
}

pub fn start(ctx: &mut Ctx<'_>, _tail: &str) -> CmdResult {
    match ctx.env.state() {
        EscState::Disarmed => Err(CommandError::NotArmed),
        s if s > EscState::Stopped => Err(CommandError::AlreadyRunning),
        _ => {
            ctx.env.start();
            ctx.env.print("ESC started\r\n");
            info!("start requested");
            Ok(())
        }
    }
}

pub fn stop(ctx: &mut Ctx<'_>, _tail: &str) -> CmdResult {
    if ctx.env.state() < EscState::NOCOMM {
        return Err(CommandError::NotRunning);
    }
    ctx.env.stop();
    change_input(ctx.env, InputMode::Uart);
    ctx.env.print("ESC stopping\r\n");
    info!("stop requested");
    Ok(())
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

pub fn input(ctx: &mut Ctx<'_>, tail: &str) -> CmdResult {
    let word = first_field(tail)?;
    let mode = InputMode::SELECTABLE
        .into_iter()
        .find(|m| ncase_eq(m.label(), word, INPUT_MATCH_LEN))
        .ok_or(CommandError::Usage)?;

    disarm(ctx, tail)?;
    change_input(ctx.env, mode);
    Ok(())
}

pub fn mode(ctx: &mut Ctx<'_>, tail: &str) -> CmdResult {
    let word = first_field(tail)?;
    let mode = RunMode::ALL
        .into_iter()
        .find(|m| ncase_eq(m.label(), word, m.label().len()))
        .ok_or(CommandError::Usage)?;

    disarm(ctx, tail)?;
    ctx.env.set_run_mode(mode);
    ctx.env.print_fmt(format_args!("Run mode set to {}\r\n", mode.label()));
    info!("run mode -> {}", mode.label());
    Ok(())
}

pub fn binary(ctx: &mut Ctx<'_>, _tail: &str) -> CmdResult {
    if ctx.env.state() > EscState::Stopped {
        return Err(CommandError::MustBeStopped);
    }
    ctx.env.print("Entering binary command mode...\r\n");
    ctx.telemetry.disable();
    ctx.env.set_command_mode(CommandMode::Binary);
    info!("serial link handed to binary protocol");
    Ok(())
}

// ---------------------------------------------------------------------------
// Setpoints
// ---------------------------------------------------------------------------

pub fn duty(ctx: &mut Ctx<'_>, tail: &str) -> CmdResult {
    if ctx.env.state() < EscState::Running {
        return Err(CommandError::NotRunning);
    }
    let percent = parse_f32(first_field(tail)?).ok_or(CommandError::Usage)?;
    if !ctx.env.set_duty(percent) {
        return Err(Range::Duty.into());
    }
    let applied = ctx.env.telemetry().commanded_duty() * 100.0;
    ctx.env.print_fmt(format_args!("Fet duty set to {applied:.2}%\r\n"));
    Ok(())
}

pub fn pos(ctx: &mut Ctx<'_>, tail: &str) -> CmdResult {
    if ctx.env.state() < EscState::Running {
        return Err(CommandError::NotRunning);
    }
    if ctx.env.run_mode() != RunMode::Servo {
        return Err(CommandError::ServoOnly);
    }
    let angle = parse_f32(first_field(tail)?).ok_or(CommandError::Usage)?;
    ctx.env.set_angle(angle);
    ctx.env.print_fmt(format_args!("Position set to {angle:.1}\r\n"));
    Ok(())
}

pub fn pwm(ctx: &mut Ctx<'_>, tail: &str) -> CmdResult {
    if ctx.env.state() < EscState::Running {
        return Err(CommandError::NotRunning);
    }
    let us = parse_u16(first_field(tail)?).ok_or(CommandError::Usage)?;
    let (lo, hi) = ctx.env.pwm_limits();
    if us < lo || us > hi {
        return Err(Range::Pwm { lo, hi }.into());
    }
    if ctx.env.run_mode() != RunMode::Servo {
        ctx.env.set_run_mode(RunMode::OpenLoop);
    }
    ctx.env.new_input(us);
    ctx.env.print_fmt(format_args!("PWM set to {us}\r\n"));
    Ok(())
}

pub fn rpm(ctx: &mut Ctx<'_>, tail: &str) -> CmdResult {
    if ctx.env.state() < EscState::Running {
        return Err(CommandError::NotRunning);
    }
    let target = parse_f32(first_field(tail)?).ok_or(CommandError::Usage)?;
    let ff1 = ctx.env.param_id(FF1TERM).map_or(0.0, |id| ctx.env.param(id));
    if ff1 == 0.0 {
        return Err(CommandError::CalibrationRequired);
    }
    if !(100.0..=10_000.0).contains(&target) {
        return Err(Range::Rpm.into());
    }
    if ctx.env.run_mode() != RunMode::ClosedLoopRpm {
        ctx.env.reset_rpm_pid();
        ctx.env.set_run_mode(RunMode::ClosedLoopRpm);
        info!("run mode -> {}", RunMode::ClosedLoopRpm.label());
    }
    ctx.env.set_target_rpm(target);
    ctx.env.print_fmt(format_args!("RPM set to {target:6.0}\r\n"));
    Ok(())
}

// ---------------------------------------------------------------------------
// Actuator test
// ---------------------------------------------------------------------------

pub fn beep(ctx: &mut Ctx<'_>, tail: &str) -> CmdResult {
    if ctx.env.state() > EscState::Stopped {
        return Err(CommandError::MustBeStopped);
    }
    let mut f = fields(tail);
    let (Some(freq), Some(dur)) = (f.next().and_then(parse_u16), f.next().and_then(parse_u16)) else {
        return Err(CommandError::Usage);
    };
    if !(10..=5000).contains(&freq) {
        return Err(Range::Frequency.into());
    }
    if !(1..=1000).contains(&dur) {
        return Err(Range::Duration.into());
    }
    ctx.env.beep(freq, dur);
    debug!("beep {freq} Hz for {dur} ms");
    Ok(())
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

pub fn config(ctx: &mut Ctx<'_>, tail: &str) -> CmdResult {
    if ctx.env.state() > EscState::Stopped {
        return Err(CommandError::MustBeStopped);
    }
    let action = first_field(tail)?;
    if action.eq_ignore_ascii_case("default") {
        ctx.env.load_defaults();
        ctx.env.print("CONFIG: defaults loaded\r\n");
    } else if action.eq_ignore_ascii_case("read") {
        ctx.env.read_flash();
        ctx.env.print("CONFIG: read flash\r\n");
    } else if action.eq_ignore_ascii_case("write") {
        match ctx.env.write_flash() {
            Ok(()) => ctx.env.print("CONFIG: wrote flash\r\n"),
            Err(e) => {
                log::error!("parameter flash write failed: {e}");
                return Err(CommandError::FlashWriteFailed);
            }
        }
    } else {
        return Err(CommandError::Usage);
    }
    info!("config {action}");
    Ok(())
}

pub fn set(ctx: &mut Ctx<'_>, tail: &str) -> CmdResult {
    let mut f = fields(tail);
    let name = f.next().ok_or(CommandError::Usage)?;

    if name.eq_ignore_ascii_case("list") {
        // Slot 0 holds the layout version and is not a user parameter.
        for id in 1..ctx.env.param_count() {
            print_param(ctx.env, id);
        }
        return Ok(());
    }

    let id = ctx
        .env
        .param_id(name)
        .ok_or_else(|| CommandError::no_such_param(name))?;

    if let Some(value) = f.next().and_then(parse_f32) {
        if ctx.env.state() > EscState::Stopped {
            return Err(CommandError::MustBeStopped);
        }
        ctx.env.set_param(id, value);
        info!("param {name} = {value}");
    }
    print_param(ctx.env, id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Information
// ---------------------------------------------------------------------------

pub fn help(ctx: &mut Ctx<'_>, _tail: &str) -> CmdResult {
    ctx.env.print("Available commands:\r\n\n");
    for cmd in &COMMANDS {
        ctx.env.print_fmt(format_args!("{} {}\r\n", cmd.name, cmd.params));
    }
    Ok(())
}

pub fn status(ctx: &mut Ctx<'_>, _tail: &str) -> CmdResult {
    status::print(ctx.env, ctx.config);
    Ok(())
}

pub fn telemetry(ctx: &mut Ctx<'_>, tail: &str) -> CmdResult {
    let hz = parse_u16(first_field(tail)?).ok_or(CommandError::Usage)?;
    if hz > 100 {
        return Err(Range::TelemetryRate.into());
    }
    ctx.telemetry.set_rate(hz);
    if hz > 0 {
        ctx.env.print(HOME);
        ctx.env.print(CLEAR);
        ctx.env.write(b'\n');
    }
    info!("telemetry at {hz} Hz");
    Ok(())
}

pub fn version(ctx: &mut Ctx<'_>, _tail: &str) -> CmdResult {
    ctx.env.print_fmt(format_args!("ESC32 ver {}\r\n", ctx.version));
    Ok(())
}

// ---------------------------------------------------------------------------
// Bootloader
// ---------------------------------------------------------------------------

pub fn bootloader(ctx: &mut Ctx<'_>, _tail: &str) -> CmdResult {
    if ctx.env.state() != EscState::Disarmed {
        return Err(CommandError::StillArmed);
    }
    ctx.env.print("Rebooting in boot loader mode...\r\n");
    ctx.env.flush();
    ctx.env.timer_delay(ctx.config.bootloader_delay_ticks);
    info!("resetting into boot loader");
    ctx.env.reset();
    Ok(())
}
