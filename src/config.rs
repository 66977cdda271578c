//! Interpreter and simulator configuration.
//!
//! `CliConfig` carries the few board constants the interpreter needs.
//! `SimConfig` wraps it with the knobs of the host simulator; the
//! `esc32-sim` binary loads it from an optional JSON file.

use serde::{Deserialize, Serialize};

/// Board constants consumed by the command interpreter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Commutation timer ticks per microsecond. COMM PERIOD divides by this.
    pub timer_mult: u32,
    /// Busy-wait before the bootloader reset, in timer ticks.
    pub bootloader_delay_ticks: u16,
    /// Emit the DISARM CODE row in the status table.
    pub show_disarm_code: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            timer_mult: 2,
            bootloader_delay_ticks: 0xFFFF,
            show_disarm_code: cfg!(feature = "esc-debug"),
        }
    }
}

/// First-order motor model driven by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorModel {
    /// Motor velocity constant, RPM per volt.
    pub kv: f32,
    pub battery_volts: f32,
    /// Mechanical time constant in milliseconds.
    pub time_constant_ms: f32,
    /// No-load current draw in amps.
    pub idle_amps: f32,
    /// Current at full duty and stalled rotor, in amps.
    pub stall_amps: f32,
}

impl Default for MotorModel {
    fn default() -> Self {
        Self {
            kv: 900.0,
            battery_volts: 12.6,
            time_constant_ms: 80.0,
            idle_amps: 0.4,
            stall_amps: 30.0,
        }
    }
}

/// Host simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub cli: CliConfig,
    /// Super-loop period; the simulated millisecond counter advances by the
    /// same amount each iteration.
    pub loop_period_ms: u32,
    /// File backing the parameter flash image. `None` keeps it in memory.
    pub flash_path: Option<std::string::String>,
    pub motor: MotorModel,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cli: CliConfig::default(),
            loop_period_ms: 1,
            flash_path: None,
            motor: MotorModel::default(),
        }
    }
}
