//! Fuzz target: `Cli::poll`
//!
//! Streams arbitrary bytes at the interpreter running against the host
//! simulator, one chunk per simulated millisecond, and checks that the
//! line buffer never grows past capacity or holds unprintable bytes.
//!
//! cargo fuzz run fuzz_cli_input

#![no_main]

use esc32_cli::adapters::{MemLink, NoopDelay};
use esc32_cli::cli::editor::INPUT_CAPACITY;
use esc32_cli::config::SimConfig;
use esc32_cli::sim::SimEsc;
use esc32_cli::Cli;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let config = SimConfig::default();
    let mut esc = SimEsc::new(MemLink::new(), NoopDelay, &config);
    let mut cli = Cli::new(config.cli.clone());
    cli.init(&mut esc);

    for chunk in data.chunks(7) {
        esc.link_mut().push_input(chunk);
        cli.poll(&mut esc);
        esc.advance(1);
        esc.take_reset();
        esc.link_mut().take_output();

        let line = cli.input();
        assert!(line.len() <= INPUT_CAPACITY);
        assert!(line.bytes().all(|b| (0x20..=0x7E).contains(&b)));
    }
});
