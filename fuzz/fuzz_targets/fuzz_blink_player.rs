//! Fuzz target: `BlinkPlayer`
//!
//! Drives arbitrary list switches and tick lengths through the player:
//! - No panics or hangs for any tick length
//! - On / Off lists settle at full / zero brightness on the first tick
//!
//! cargo fuzz run fuzz_blink_player

#![no_main]

use korvo_bsp::indicator::{BlinkList, BlinkPlayer};
use libfuzzer_sys::fuzz_target;

const LISTS: [BlinkList; 6] = [
    BlinkList::On,
    BlinkList::Off,
    BlinkList::BlinkFast,
    BlinkList::BlinkSlow,
    BlinkList::BreatheFast,
    BlinkList::BreatheSlow,
];

fuzz_target!(|data: &[u8]| {
    let mut player = BlinkPlayer::new(BlinkList::Off.steps());
    for chunk in data.chunks(3) {
        let [sel, hi, lo] = *chunk else {
            return;
        };
        let list = LISTS[sel as usize % LISTS.len()];
        if sel & 0x80 != 0 {
            player.start(list.steps());
            let level = player.tick(0);
            match list {
                BlinkList::On => assert_eq!(level, u8::MAX),
                BlinkList::Off => assert_eq!(level, 0),
                _ => {}
            }
        }
        player.tick(u32::from(u16::from_be_bytes([hi, lo])) * 16);
    }
});
