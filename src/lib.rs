//! ESC32 serial command interpreter.
//!
//! The interpreter ([`cli::Cli`]) is pure logic over the port traits in
//! [`app::ports`]; the firmware, the host simulator ([`sim::SimEsc`]) and
//! the tests each supply their own implementation of those ports.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod control;
pub mod error;
pub mod esc;
pub mod fsm;
pub mod sim;

pub use cli::Cli;

/// Release tag; the build number is appended at init.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
