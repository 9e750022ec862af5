//! Fuzz target: `BoardConfig::from_json`
//!
//! Feeds arbitrary bytes to the JSON override parser and checks:
//! - No panics on malformed or oversized input
//! - Anything accepted also passes `validate()`
//! - An accepted config survives a serialise/parse cycle unchanged
//!
//! cargo fuzz run fuzz_board_config

#![no_main]

use korvo_bsp::config::BoardConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(cfg) = BoardConfig::from_json(text) else {
        return;
    };
    assert_eq!(cfg.validate(), Ok(()));

    let json = serde_json::to_string(&cfg).expect("accepted config serialises");
    assert_eq!(BoardConfig::from_json(&json), Ok(cfg));
});
