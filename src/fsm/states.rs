//! Run-state handlers and table builder.
//!
//! ```text
//!  DISARMED ──arm──▶ STOPPED ──start──▶ PRE-START ──[aligned]──▶ STARTING
//!     ▲                 ▲                                           │
//!     │                 └───────────────stop───────────────┐  [rpm reached]
//!     │                                                    │        ▼
//!     └──────────────── disarm (any state) ────────────── RUNNING ◀─┘
//! ```

use log::info;

use super::context::{DriveCommand, MotorContext};
use super::StateDescriptor;
use crate::esc::{EscState, RunMode};

/// Build the state table, indexed by `EscState as usize`.
pub fn build_state_table() -> [StateDescriptor; EscState::COUNT] {
    [
        StateDescriptor {
            id: EscState::Disarmed,
            name: "DISARMED",
            on_enter: Some(drive_off),
            on_exit: None,
            on_update: hold,
        },
        StateDescriptor {
            id: EscState::Stopped,
            name: "STOPPED",
            on_enter: Some(drive_off),
            on_exit: None,
            on_update: hold,
        },
        StateDescriptor {
            id: EscState::PreStart,
            name: "PRE-START",
            on_enter: Some(pre_start_enter),
            on_exit: None,
            on_update: pre_start_update,
        },
        StateDescriptor {
            id: EscState::Starting,
            name: "STARTING",
            on_enter: Some(starting_enter),
            on_exit: None,
            on_update: starting_update,
        },
        StateDescriptor {
            id: EscState::Running,
            name: "RUNNING",
            on_enter: Some(running_enter),
            on_exit: Some(drive_off),
            on_update: running_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISARMED / STOPPED
// ═══════════════════════════════════════════════════════════════════════════

fn drive_off(ctx: &mut MotorContext) {
    ctx.drive = DriveCommand::OFF;
}

fn hold(_ctx: &mut MotorContext) -> Option<EscState> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  PRE-START: hold the rotor at a known position
// ═══════════════════════════════════════════════════════════════════════════

fn pre_start_enter(ctx: &mut MotorContext) {
    ctx.drive = DriveCommand {
        duty: ctx.tuning.align_duty,
        commutating: false,
    };
    info!("aligning rotor for {:.0} ms", ctx.tuning.align_ms);
}

fn pre_start_update(ctx: &mut MotorContext) -> Option<EscState> {
    (ctx.ms_in_state() >= ctx.tuning.align_ms).then_some(EscState::Starting)
}

// ═══════════════════════════════════════════════════════════════════════════
//  STARTING: open-loop spin-up
// ═══════════════════════════════════════════════════════════════════════════

fn starting_enter(ctx: &mut MotorContext) {
    ctx.drive = DriveCommand {
        duty: ctx.tuning.start_duty,
        commutating: true,
    };
    ctx.setpoint.open_loop_duty = ctx.tuning.start_duty;
}

fn starting_update(ctx: &mut MotorContext) -> Option<EscState> {
    (ctx.rotor.rpm >= ctx.tuning.running_rpm).then_some(EscState::Running)
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUNNING
// ═══════════════════════════════════════════════════════════════════════════

fn running_enter(ctx: &mut MotorContext) {
    ctx.drive.commutating = true;
    info!("commutation established at {:.0} rpm", ctx.rotor.rpm);
}

fn running_update(ctx: &mut MotorContext) -> Option<EscState> {
    ctx.drive.duty = match ctx.setpoint.run_mode {
        RunMode::ClosedLoopRpm => ctx.closed_loop_duty(),
        RunMode::OpenLoop | RunMode::Thrust | RunMode::Servo => ctx.setpoint.open_loop_duty,
    };
    None
}
