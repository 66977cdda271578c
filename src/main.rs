//! ESC32 simulator: the serial command interpreter on a terminal.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  stdin ─▶ StdioLink ─┐                 ┌─▶ stdout        │
//! │                      ▼                 │                 │
//! │           SimEsc (ports) ◀──── Cli::poll                 │
//! │           FSM · motor model · params · flash image       │
//! │                                                          │
//! │  1 ms super-loop: advance ─▶ poll ─▶ reset? ─▶ EOF?      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `esc32-sim [config.json]`. Logs go to stderr (`RUST_LOG`).

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use esc32_cli::adapters::{StdDelay, StdioLink};
use esc32_cli::app::ports::EscPort;
use esc32_cli::config::SimConfig;
use esc32_cli::esc::CommandMode;
use esc32_cli::sim::SimEsc;
use esc32_cli::Cli;

type Esc = SimEsc<StdioLink, StdDelay>;

/// Why the super-loop ended.
enum Exit {
    Reset,
    InputClosed,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => SimConfig::default(),
    };
    info!("ESC32 simulator v{}", esc32_cli::VERSION);

    let mut flash = match &config.flash_path {
        Some(path) => load_flash(Path::new(path))?,
        None => Vec::new(),
    };

    let mut link = StdioLink::spawn().context("starting stdin reader")?;

    loop {
        let mut esc = if flash.is_empty() {
            SimEsc::new(link, StdDelay, &config)
        } else {
            SimEsc::with_flash_image(link, StdDelay, &config, &flash)
        };
        let mut cli = Cli::new(config.cli.clone());
        cli.init(&mut esc);

        let exit = run(&mut esc, &mut cli, &config);

        flash = esc.flash_image().to_vec();
        if let Some(path) = &config.flash_path {
            save_flash(Path::new(path), &flash)?;
        }
        link = esc.into_link();

        match exit {
            Exit::Reset => info!("rebooting"),
            Exit::InputClosed => break,
        }
    }

    info!("input closed, exiting");
    Ok(())
}

fn run(esc: &mut Esc, cli: &mut Cli, config: &SimConfig) -> Exit {
    let step = config.loop_period_ms.max(1);
    let period = Duration::from_millis(u64::from(step));

    loop {
        esc.advance(step);

        // The binary protocol is not simulated; its bytes go nowhere.
        if esc.command_mode() == CommandMode::Binary {
            esc.link_mut().discard_input();
        }
        cli.poll(esc);

        if esc.take_reset() {
            return Exit::Reset;
        }
        if esc.link_mut().is_closed() {
            return Exit::InputClosed;
        }
        std::thread::sleep(period);
    }
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!("config loaded from {}", path.display());
    Ok(config)
}

fn load_flash(path: &Path) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(image) => {
            info!("flash image loaded from {} ({} bytes)", path.display(), image.len());
            Ok(image)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("no flash image at {}, starting erased", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e).with_context(|| format!("reading flash image {}", path.display())),
    }
}

fn save_flash(path: &Path, image: &[u8]) -> Result<()> {
    if image.is_empty() {
        return Ok(());
    }
    std::fs::write(path, image)
        .with_context(|| format!("writing flash image {}", path.display()))
}
