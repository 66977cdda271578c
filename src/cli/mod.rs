//! Serial command interpreter.
//!
//! ```text
//!   poll ─┬─ telemetry due? ── repaint status above the prompt
//!         └─ drain link ── LineEditor ── Submit ── lookup ── handler
//! ```
//!
//! The firmware super-loop calls [`Cli::poll`] as often as it can. Each
//! call consumes only the bytes already waiting, so its duration is
//! bounded by the receive FIFO plus one status frame.

pub mod editor;
pub mod handlers;
pub mod scan;
pub mod status;
pub mod table;
pub mod telemetry;
pub mod term;

use core::fmt::Write as _;

use heapless::String;
use log::{debug, error, warn};

use crate::app::ports::Environment;
use crate::config::CliConfig;
use crate::error::CommandError;
use crate::esc::CommandMode;
use editor::{EditEvent, LineEditor};
use telemetry::Telemetry;
use term::{CLEAR, CLEAR_EOL, HOME};

/// Everything a handler may touch.
pub struct Ctx<'a> {
    pub env: &'a mut dyn Environment,
    pub telemetry: &'a mut Telemetry,
    pub version: &'a str,
    pub config: &'a CliConfig,
}

/// Interpreter state: the line being edited, the telemetry rate and the
/// version string assembled at init.
pub struct Cli {
    editor: LineEditor,
    telemetry: Telemetry,
    version: String<16>,
    config: CliConfig,
}

impl Cli {
    pub fn new(config: CliConfig) -> Self {
        Self {
            editor: LineEditor::new(),
            telemetry: Telemetry::new(),
            version: String::new(),
            config,
        }
    }

    /// Print the banner and the first prompt.
    pub fn init<E: Environment>(&mut self, env: &mut E) {
        if !table::is_sorted() {
            error!("command table is not sorted; lookups will miss");
            debug_assert!(false, "command table is not sorted");
        }

        self.version.clear();
        if write!(self.version, "{}.{}", crate::VERSION, env.build_number()).is_err() {
            warn!("version string truncated");
        }

        env.print(HOME);
        env.print(CLEAR);
        env.print_fmt(format_args!("ESC32 ver {}\r\n", self.version));
        env.print("\r\nCLI ready.\r\n");
        self.editor.prompt(env);
        env.flush();
    }

    /// Service the link once: repaint telemetry if due, then consume every
    /// byte already received.
    pub fn poll<E: Environment>(&mut self, env: &mut E) {
        if env.command_mode() != CommandMode::Cli {
            return;
        }

        if self.telemetry.is_due(env.millis()) {
            self.paint_telemetry(env);
        }

        while env.available() > 0 {
            let Some(byte) = env.read() else {
                break;
            };
            match self.editor.feed(byte, env) {
                EditEvent::Pending => {}
                EditEvent::Empty | EditEvent::Interrupt => self.editor.prompt(env),
                EditEvent::Submit(line) => {
                    self.dispatch(&line, env);
                    if env.command_mode() != CommandMode::Cli {
                        self.editor.reset();
                        break;
                    }
                    self.editor.prompt(env);
                }
            }
        }

        env.flush();
    }

    /// Telemetry rate currently in effect.
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The line as typed so far.
    pub fn input(&self) -> &str {
        self.editor.buffer().as_str()
    }

    fn paint_telemetry(&mut self, env: &mut dyn Environment) {
        env.print(HOME);
        env.print_fmt(format_args!("Telemetry @ {} Hz\r\n\n", self.telemetry.hz()));
        status::print(env, &self.config);
        env.print("\n> ");
        env.print(self.editor.buffer().as_str());
        env.print(CLEAR_EOL);
    }

    fn dispatch(&mut self, line: &str, env: &mut dyn Environment) {
        let Some(cmd) = table::lookup(line) else {
            warn!("unknown command {line:?}");
            env.print("Command not found");
            return;
        };

        let tail = &line[cmd.name.len()..];
        debug!("dispatch {} args {tail:?}", cmd.name);

        let mut ctx = Ctx {
            env,
            telemetry: &mut self.telemetry,
            version: &self.version,
            config: &self.config,
        };
        match (cmd.handler)(&mut ctx, tail) {
            Ok(()) => {}
            Err(CommandError::Usage) => {
                warn!("{}: bad arguments {tail:?}", cmd.name);
                ctx.env.print_fmt(format_args!("usage: {} {}\r\n", cmd.name, cmd.params));
            }
            Err(e) => {
                warn!("{} rejected: {e}", cmd.name);
                ctx.env.print_fmt(format_args!("{e}\r\n"));
            }
        }
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new(CliConfig::default())
    }
}
