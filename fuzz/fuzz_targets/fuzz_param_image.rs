//! Fuzz target: `ParamStore::load_flash_image`
//!
//! Arbitrary flash contents must either be rejected or decode into a
//! full parameter table; reading them back never panics.
//!
//! cargo fuzz run fuzz_param_image

#![no_main]

use esc32_cli::sim::params::{ParamStore, LAYOUT_VERSION};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut store = ParamStore::new();
    if store.load_flash_image(data) {
        store.read_flash();
        assert_eq!(store.get(0), LAYOUT_VERSION);
    }
});
