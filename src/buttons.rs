//! Resistor-ladder buttons on a single ADC channel.
//!
//! Six buttons share ADC1 channel 7.  Each one pulls the ladder to a
//! distinct voltage, so the button identity is a pure function of the
//! sampled millivolts:
//!
//! | Button  | Window (mV)  | Nominal |
//! |---------|--------------|---------|
//! | REC     | 2310 – 2510  | 2410    |
//! | MODE    | 1880 – 2080  | 1980    |
//! | PLAY    | 1560 – 1760  | 1660    |
//! | SET     | 1010 – 1210  | 1100    |
//! | VOL-    |  720 –  920  |  820    |
//! | VOL+    |  280 –  480  |  380    |
//!
//! Windows are inclusive on both ends.  A sample in the gap between two
//! windows matches nothing rather than the nearest button.

use log::{info, warn};

use crate::bus::SharedBus;
use crate::error::{ArgError, BspError, DeviceError};
use crate::pins;
use crate::ports::{AdcButtonConfig, BusDriver, ButtonFactory, ButtonHandle};

/// Logical buttons, in ladder order (highest voltage first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ButtonId {
    Rec = 0,
    Mode = 1,
    Play = 2,
    Set = 3,
    VolDown = 4,
    VolUp = 5,
}

pub const BUTTON_COUNT: usize = 6;

impl ButtonId {
    pub const ALL: [Self; BUTTON_COUNT] = [
        Self::Rec,
        Self::Mode,
        Self::Play,
        Self::Set,
        Self::VolDown,
        Self::VolUp,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

// ── Classifier ────────────────────────────────────────────────

/// Inclusive voltage window that identifies one logical input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoltageRange<I> {
    pub id: I,
    pub min_mv: u16,
    pub max_mv: u16,
}

impl<I> VoltageRange<I> {
    pub const fn contains(&self, mv: u16) -> bool {
        self.min_mv <= mv && mv <= self.max_mv
    }

    pub const fn overlaps<J>(&self, other: &VoltageRange<J>) -> bool {
        !(other.min_mv > self.max_mv || self.min_mv > other.max_mv)
    }
}

/// True when every window is well-formed and no two windows overlap.
pub const fn ranges_are_disjoint<I>(ranges: &[VoltageRange<I>]) -> bool {
    let mut i = 0;
    while i < ranges.len() {
        if ranges[i].min_mv > ranges[i].max_mv {
            return false;
        }
        let mut j = i + 1;
        while j < ranges.len() {
            if ranges[i].overlaps(&ranges[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

/// Windows sharing one physical ADC channel.
///
/// Built with [`RangeTable::new`] in a `static`, so an overlapping table
/// fails to compile.
#[derive(Debug)]
pub struct RangeTable<I: 'static> {
    channel: u32,
    ranges: &'static [VoltageRange<I>],
}

impl<I: Copy> RangeTable<I> {
    pub const fn new(channel: u32, ranges: &'static [VoltageRange<I>]) -> Self {
        assert!(
            ranges_are_disjoint(ranges),
            "voltage windows on one channel must not overlap"
        );
        Self { channel, ranges }
    }

    /// Identity whose window contains `mv`, if any.
    pub fn classify(&self, mv: u16) -> Option<I> {
        self.ranges.iter().find(|r| r.contains(mv)).map(|r| r.id)
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    pub fn ranges(&self) -> &'static [VoltageRange<I>] {
        self.ranges
    }
}

/// The Korvo-1 button ladder.
pub static KORVO_BUTTONS: RangeTable<ButtonId> = RangeTable::new(
    pins::BUTTON_ADC_CHANNEL,
    &[
        VoltageRange { id: ButtonId::Rec, min_mv: 2310, max_mv: 2510 },
        VoltageRange { id: ButtonId::Mode, min_mv: 1880, max_mv: 2080 },
        VoltageRange { id: ButtonId::Play, min_mv: 1560, max_mv: 1760 },
        VoltageRange { id: ButtonId::Set, min_mv: 1010, max_mv: 1210 },
        VoltageRange { id: ButtonId::VolDown, min_mv: 720, max_mv: 920 },
        VoltageRange { id: ButtonId::VolUp, min_mv: 280, max_mv: 480 },
    ],
);

// ── Button array ──────────────────────────────────────────────

/// One driver handle per logical button, indexed by [`ButtonId`].
#[derive(Debug)]
pub struct ButtonArray {
    slots: [Option<ButtonHandle>; BUTTON_COUNT],
}

impl ButtonArray {
    /// Number of buttons still held by the array.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: ButtonId) -> Option<&ButtonHandle> {
        self.slots[id.index()].as_ref()
    }

    /// Remove one button so the caller can delete it on its own.
    pub fn take(&mut self, id: ButtonId) -> Option<ButtonHandle> {
        self.slots[id.index()].take()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ButtonId, &ButtonHandle)> {
        ButtonId::ALL
            .into_iter()
            .zip(self.slots.iter())
            .filter_map(|(id, slot)| slot.as_ref().map(|h| (id, h)))
    }

    /// Delete every remaining button. Delete failures are logged.
    pub fn release<F: ButtonFactory>(mut self, factory: &mut F) {
        for id in ButtonId::ALL {
            if let Some(handle) = self.take(id) {
                if let Err(rc) = factory.delete_button(handle) {
                    warn!("buttons: delete {:?} failed (rc={})", id, rc);
                }
            }
        }
    }
}

/// Create every ladder button.
///
/// `capacity` is the number of slots the caller is prepared to hold; it
/// is checked before any driver is touched.  The ADC unit is brought up
/// through `adc`.  If any button fails, the ones already created are
/// deleted again.
pub fn create_button_array<A, F>(
    capacity: usize,
    adc: &SharedBus<A>,
    factory: &mut F,
) -> Result<ButtonArray, BspError>
where
    A: BusDriver,
    F: ButtonFactory,
{
    if capacity < BUTTON_COUNT {
        return Err(ArgError::InsufficientCapacity {
            required: BUTTON_COUNT,
            given: capacity,
        }
        .into());
    }

    adc.acquire()?;
    let adc_unit = adc.handle();

    let mut array = ButtonArray {
        slots: Default::default(),
    };
    for (index, range) in KORVO_BUTTONS.ranges().iter().enumerate() {
        let cfg = AdcButtonConfig {
            adc_unit,
            channel: KORVO_BUTTONS.channel(),
            button_index: range.id as u8,
            min_mv: range.min_mv,
            max_mv: range.max_mv,
        };
        match factory.create_adc_button(&cfg) {
            Some(handle) => array.slots[range.id.index()] = Some(handle),
            None => {
                warn!(
                    "buttons: {:?} create failed, unwinding {} button(s)",
                    range.id,
                    array.len()
                );
                array.release(factory);
                return Err(DeviceError::Button(index).into());
            }
        }
    }

    info!("buttons: {} ADC buttons on channel {}", array.len(), KORVO_BUTTONS.channel());
    Ok(array)
}
