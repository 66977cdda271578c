//! The command table and name lookup.
//!
//! `COMMANDS` must stay sorted by name: lookup is a binary search whose
//! comparator only looks at as many bytes as the stored name has, so the
//! stored name matching the start of the typed line is a hit and the rest
//! of the line becomes the argument tail.

use core::cmp::Ordering;

use super::handlers;
use super::scan::ncase_cmp;
use super::Ctx;
use crate::error::CommandError;

/// Signature shared by every command handler. The `&str` is the line
/// tail following the matched name.
pub type CommandFn = fn(&mut Ctx<'_>, &str) -> Result<(), CommandError>;

/// One entry in the command table.
pub struct CommandDescriptor {
    /// Lowercase name as listed by `help`.
    pub name: &'static str,
    /// Argument synopsis for the `usage:` line.
    pub params: &'static str,
    pub handler: CommandFn,
}

impl core::fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// Sorted by name.
pub static COMMANDS: [CommandDescriptor; 19] = [
    CommandDescriptor { name: "arm", params: "", handler: handlers::arm },
    CommandDescriptor { name: "beep", params: "<frequency> <duration>", handler: handlers::beep },
    CommandDescriptor { name: "binary", params: "", handler: handlers::binary },
    CommandDescriptor { name: "bootloader", params: "", handler: handlers::bootloader },
    CommandDescriptor { name: "config", params: "[READ | WRITE | DEFAULT]", handler: handlers::config },
    CommandDescriptor { name: "disarm", params: "", handler: handlers::disarm },
    CommandDescriptor { name: "duty", params: "<percent>", handler: handlers::duty },
    CommandDescriptor { name: "help", params: "", handler: handlers::help },
    CommandDescriptor { name: "input", params: "[PWM | UART | I2C | CAN]", handler: handlers::input },
    CommandDescriptor { name: "mode", params: "[OPEN_LOOP | RPM | THRUST | SERVO]", handler: handlers::mode },
    CommandDescriptor { name: "pos", params: "<degrees>", handler: handlers::pos },
    CommandDescriptor { name: "pwm", params: "<microseconds>", handler: handlers::pwm },
    CommandDescriptor { name: "rpm", params: "<target>", handler: handlers::rpm },
    CommandDescriptor { name: "set", params: "LIST | [<PARAMETER> <value>]", handler: handlers::set },
    CommandDescriptor { name: "start", params: "", handler: handlers::start },
    CommandDescriptor { name: "status", params: "", handler: handlers::status },
    CommandDescriptor { name: "stop", params: "", handler: handlers::stop },
    CommandDescriptor { name: "telemetry", params: "<Hz>", handler: handlers::telemetry },
    CommandDescriptor { name: "version", params: "", handler: handlers::version },
];

/// Find the command whose name starts `line`, ignoring case.
pub fn lookup(line: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS
        .binary_search_by(|cand| ncase_cmp(line, cand.name, cand.name.len()).reverse())
        .ok()
        .map(|idx| &COMMANDS[idx])
}

/// `true` when `COMMANDS` is strictly ascending by lowercase name.
pub fn is_sorted() -> bool {
    COMMANDS.windows(2).all(|w| {
        let n = w[0].name.len().max(w[1].name.len());
        ncase_cmp(w[0].name, w[1].name, n) == Ordering::Less
    })
}
