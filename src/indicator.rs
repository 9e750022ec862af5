//! RGB LED ring indicator.
//!
//! The twelve WS2812 LEDs are driven as one strip-mode `led_indicator`
//! bound to a fixed table of blink lists.  Lists are selected by
//! [`BlinkList`] index at runtime; nothing is registered dynamically.
//!
//! ## Blink lists
//!
//! | List         | Steps                                  |
//! |--------------|----------------------------------------|
//! | On           | hold on, stop                          |
//! | Off          | hold off, stop                         |
//! | BlinkFast    | 500 ms on, 500 ms off, loop            |
//! | BlinkSlow    | 1 s on, 1 s off, loop                  |
//! | BreatheFast  | 500 ms fade in, 500 ms fade out, loop  |
//! | BreatheSlow  | 2 s fade in, 2 s fade out, loop        |

use heapless::Vec;
use log::{info, warn};

use crate::error::{ArgError, BspError, DeviceError};
use crate::pins;
use crate::ports::{
    IndicatorConfig, IndicatorFactory, IndicatorHandle, LedModel, RmtConfig, StripConfig,
};

/// One step of a blink list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkStep {
    /// Jump to full on / off, then wait `hold_ms` (0 = no wait).
    Hold { on: bool, hold_ms: u32 },
    /// Fade linearly to on / off over `duration_ms`.
    Breathe { on: bool, duration_ms: u32 },
    /// Restart the list from the first step.
    Loop,
    /// Keep the current level forever.
    Stop,
}

/// Index into [`BLINK_LISTS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum BlinkList {
    On = 0,
    Off = 1,
    BlinkFast = 2,
    BlinkSlow = 3,
    BreatheFast = 4,
    BreatheSlow = 5,
}

pub const BLINK_LIST_COUNT: usize = 6;

impl BlinkList {
    pub const fn steps(self) -> &'static [BlinkStep] {
        BLINK_LISTS[self as usize]
    }
}

use BlinkStep::{Breathe, Hold, Loop, Stop};

pub const BLINK_LISTS: [&[BlinkStep]; BLINK_LIST_COUNT] = [
    &[Hold { on: true, hold_ms: 0 }, Stop],
    &[Hold { on: false, hold_ms: 0 }, Stop],
    &[Hold { on: true, hold_ms: 500 }, Hold { on: false, hold_ms: 500 }, Loop],
    &[Hold { on: true, hold_ms: 1000 }, Hold { on: false, hold_ms: 1000 }, Loop],
    &[Breathe { on: true, duration_ms: 500 }, Breathe { on: false, duration_ms: 500 }, Loop],
    &[Breathe { on: true, duration_ms: 2000 }, Breathe { on: false, duration_ms: 2000 }, Loop],
];

const fn lists_are_terminated(lists: &[&[BlinkStep]]) -> bool {
    let mut i = 0;
    while i < lists.len() {
        match lists[i].last() {
            Some(Loop | Stop) => {}
            _ => return false,
        }
        i += 1;
    }
    true
}

const _: () = assert!(
    lists_are_terminated(&BLINK_LISTS),
    "every blink list must end in Loop or Stop"
);

// ── Blink player ──────────────────────────────────────────────

/// Steps through a blink list and yields the brightness at each tick.
/// Mirrors what the `led_indicator` component does on the target; the
/// host simulation uses it to expose the LED level.
#[derive(Debug, Clone)]
pub struct BlinkPlayer {
    steps: &'static [BlinkStep],
    index: usize,
    elapsed_ms: u32,
    level: u8,
    fade_from: u8,
}

impl BlinkPlayer {
    pub fn new(steps: &'static [BlinkStep]) -> Self {
        Self {
            steps,
            index: 0,
            elapsed_ms: 0,
            level: 0,
            fade_from: 0,
        }
    }

    /// Switch to another list, keeping the current level as fade origin.
    pub fn start(&mut self, steps: &'static [BlinkStep]) {
        self.steps = steps;
        self.index = 0;
        self.elapsed_ms = 0;
        self.fade_from = self.level;
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Advance by `delta_ms` and return the brightness (0–255).
    pub fn tick(&mut self, delta_ms: u32) -> u8 {
        let mut budget = delta_ms;
        let mut budget_at_loop = None;
        loop {
            let Some(step) = self.steps.get(self.index).copied() else {
                return self.level;
            };
            match step {
                Hold { on, hold_ms } => {
                    self.level = if on { u8::MAX } else { 0 };
                    let remaining = hold_ms.saturating_sub(self.elapsed_ms);
                    if budget < remaining {
                        self.elapsed_ms += budget;
                        return self.level;
                    }
                    budget -= remaining;
                    self.advance();
                }
                Breathe { on, duration_ms } => {
                    let target = if on { u8::MAX } else { 0 };
                    let remaining = duration_ms.saturating_sub(self.elapsed_ms);
                    if budget < remaining {
                        self.elapsed_ms += budget;
                        self.level = Self::fade(self.fade_from, target, self.elapsed_ms, duration_ms);
                        return self.level;
                    }
                    budget -= remaining;
                    self.level = target;
                    self.advance();
                }
                Loop => {
                    // A pass that consumed no time would spin forever.
                    if budget_at_loop == Some(budget) {
                        return self.level;
                    }
                    budget_at_loop = Some(budget);
                    self.index = 0;
                    self.elapsed_ms = 0;
                    self.fade_from = self.level;
                }
                Stop => return self.level,
            }
        }
    }

    fn advance(&mut self) {
        self.index += 1;
        self.elapsed_ms = 0;
        self.fade_from = self.level;
    }

    fn fade(from: u8, to: u8, at_ms: u32, over_ms: u32) -> u8 {
        let from = from as i64;
        let to = to as i64;
        (from + (to - from) * at_ms as i64 / over_ms.max(1) as i64) as u8
    }
}

// ── Composer ──────────────────────────────────────────────────

/// Indicators on the board (the LED ring is one device).
pub const INDICATOR_COUNT: usize = 1;

/// Strip-mode configuration for the LED ring.
pub fn ring_config() -> IndicatorConfig {
    IndicatorConfig {
        strip: StripConfig {
            gpio: pins::LED_RGB_GPIO,
            max_leds: pins::LED_COUNT,
            model: LedModel::Ws2812,
            invert_out: false,
        },
        rmt: RmtConfig {
            resolution_hz: pins::LED_RMT_RESOLUTION_HZ,
            with_dma: false,
        },
        active_level_high: true,
        blink_lists: &BLINK_LISTS,
    }
}

/// Indicator handles created by [`create_indicator_array`].
#[derive(Debug)]
pub struct IndicatorArray {
    handles: Vec<IndicatorHandle, INDICATOR_COUNT>,
}

impl IndicatorArray {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn ring(&self) -> Option<&IndicatorHandle> {
        self.handles.first()
    }

    pub fn into_handles(self) -> Vec<IndicatorHandle, INDICATOR_COUNT> {
        self.handles
    }

    /// Delete every indicator. Delete failures are logged.
    pub fn release<F: IndicatorFactory>(self, factory: &mut F) {
        for handle in self.handles {
            if let Err(rc) = factory.delete(handle) {
                warn!("indicator: delete failed (rc={})", rc);
            }
        }
    }
}

/// Build the LED ring indicator.
pub fn compose_indicator<F: IndicatorFactory>(factory: &mut F) -> Result<IndicatorHandle, BspError> {
    let handle = factory.create(&ring_config()).ok_or_else(|| {
        warn!("indicator: led_indicator create failed");
        DeviceError::Indicator
    })?;
    info!("indicator: {} LED ring ready", pins::LED_COUNT);
    Ok(handle)
}

/// Create every indicator into an array of at least `capacity` slots.
pub fn create_indicator_array<F: IndicatorFactory>(
    capacity: usize,
    factory: &mut F,
) -> Result<IndicatorArray, BspError> {
    if capacity < INDICATOR_COUNT {
        return Err(ArgError::InsufficientCapacity {
            required: INDICATOR_COUNT,
            given: capacity,
        }
        .into());
    }

    let mut handles = Vec::new();
    let ring = compose_indicator(factory)?;
    if let Err(ring) = handles.push(ring) {
        if let Err(rc) = factory.delete(ring) {
            warn!("indicator: delete failed (rc={})", rc);
        }
        return Err(DeviceError::Indicator.into());
    }
    Ok(IndicatorArray { handles })
}
