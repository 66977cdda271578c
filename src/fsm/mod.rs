//! Function-pointer state machine for the motor run states.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable (indexed by EscState)                        │
//! │  ┌───────────┬───────────┬──────────┬─────────────────┐  │
//! │  │ state     │ on_enter  │ on_exit  │ on_update       │  │
//! │  ├───────────┼───────────┼──────────┼─────────────────┤  │
//! │  │ Disarmed  │ fn(ctx)   │          │ fn(ctx)->Option │  │
//! │  │ Stopped   │ fn(ctx)   │          │ fn(ctx)->Option │  │
//! │  │ PreStart  │ fn(ctx)   │          │ fn(ctx)->Option │  │
//! │  │ Starting  │ fn(ctx)   │          │ fn(ctx)->Option │  │
//! │  │ Running   │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option │  │
//! │  └───────────┴───────────┴──────────┴─────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick calls `on_update` for the current state; `Some(next)` runs
//! `on_exit` for the current state and `on_enter` for the next. Operator
//! requests (arm, start, stop, disarm) take effect at once through
//! [`Fsm::force_transition`].

pub mod context;
pub mod states;

use context::MotorContext;
use log::info;

use crate::esc::EscState;

/// Runs exactly once on each transition.
pub type StateActionFn = fn(&mut MotorContext);

/// Per-tick handler. Returns `Some(next)` to transition.
pub type StateUpdateFn = fn(&mut MotorContext) -> Option<EscState>;

/// One row in the state table.
pub struct StateDescriptor {
    pub id: EscState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

pub struct Fsm {
    table: [StateDescriptor; EscState::COUNT],
    current: usize,
    tick_count: u64,
    state_entry_tick: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; EscState::COUNT], initial: EscState) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, d)| d.id as usize == i),
            "state table out of order"
        );
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run `on_enter` for the initial state. Call once before `tick`.
    pub fn start(&mut self, ctx: &mut MotorContext) {
        info!("run state machine starting in {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    pub fn tick(&mut self, ctx: &mut MotorContext) {
        self.tick_count += 1;
        ctx.ticks_in_state = self.tick_count - self.state_entry_tick;
        ctx.total_ticks = self.tick_count;

        if let Some(next) = (self.table[self.current].on_update)(ctx) {
            self.transition(next, ctx);
        }
    }

    /// Transition immediately, unless already in `next`.
    pub fn force_transition(&mut self, next: EscState, ctx: &mut MotorContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> EscState {
        EscState::from_index(self.current)
    }

    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    fn transition(&mut self, next: EscState, ctx: &mut MotorContext) {
        let next_idx = next as usize;
        info!(
            "run state: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        ctx.ticks_in_state = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
