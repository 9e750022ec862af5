//! Board facade: the bring-up operations the rest of the firmware calls.
//!
//! ```text
//!                    ┌────────────────────────────────┐
//!   caller ────────▶ │ Board                          │
//!                    │  i2c  : SharedBus (control)    │
//!                    │  adc  : SharedBus (ADC1)       │
//!                    │  audio: StreamHub + codecs     │
//!                    │  buttons / indicators          │
//!                    │  spiffs / sdcard: MountManager │
//!                    └──────────────┬─────────────────┘
//!                                   ▼
//!                         Port traits (ports.rs)
//! ```
//!
//! Every operation takes `&self`; shared state sits behind mutexes so a
//! `Board` can be handed to several tasks.  Each subsystem fails on its
//! own: a button failure does not affect audio, and so on.

use std::sync::{Mutex, PoisonError};

use log::{info, warn};

use crate::audio::{AudioComposer, AudioEndpoint};
use crate::bus::SharedBus;
use crate::buttons::{self, ButtonArray, ButtonId, KORVO_BUTTONS};
use crate::config::BoardConfig;
use crate::error::{DeviceError, Result};
use crate::indicator::{self, IndicatorArray};
use crate::ports::{
    BusDriver, ButtonFactory, ButtonHandle, CodecFactory, Direction, IndicatorFactory, MountBackend,
    StreamProvider,
};
use crate::storage::MountManager;

/// The concrete collaborators a board is built from.
pub trait BoardPorts {
    type ControlBus: BusDriver;
    type Adc: BusDriver;
    type Streams: StreamProvider;
    type Codecs: CodecFactory;
    type Buttons: ButtonFactory;
    type Indicators: IndicatorFactory;
    type Flash: MountBackend;
    type Card: MountBackend;
}

/// Driver instances handed to [`Board::new`].
pub struct BoardParts<P: BoardPorts> {
    pub control_bus: P::ControlBus,
    pub adc: P::Adc,
    pub streams: P::Streams,
    pub codecs: P::Codecs,
    pub buttons: P::Buttons,
    pub indicators: P::Indicators,
    pub flash: P::Flash,
    pub card: P::Card,
}

pub struct Board<P: BoardPorts> {
    config: BoardConfig,
    control_bus: SharedBus<P::ControlBus>,
    adc: SharedBus<P::Adc>,
    audio: AudioComposer<P::Streams, P::Codecs>,
    buttons: Mutex<P::Buttons>,
    indicators: Mutex<P::Indicators>,
    spiffs: MountManager<P::Flash>,
    sdcard: MountManager<P::Card>,
}

impl<P: BoardPorts> Board<P> {
    /// Wrap `parts` in a board.  `config` is range-checked first; an
    /// invalid config never reaches a driver.
    pub fn new(config: BoardConfig, parts: BoardParts<P>) -> Result<Self> {
        config.validate().inspect_err(|e| warn!("board: {}", e))?;
        info!(
            "board: I2C {} Hz, spiffs at {}, sdcard at {}",
            config.i2c_clk_speed_hz, config.spiffs.mount_point, config.sdcard.mount_point
        );
        Ok(Self {
            config,
            control_bus: SharedBus::new("i2c", parts.control_bus),
            adc: SharedBus::new("adc1", parts.adc),
            audio: AudioComposer::new(parts.streams, parts.codecs),
            buttons: Mutex::new(parts.buttons),
            indicators: Mutex::new(parts.indicators),
            spiffs: MountManager::new(parts.flash),
            sdcard: MountManager::new(parts.card),
        })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    // ── Control bus ───────────────────────────────────────────

    pub fn init_control_bus(&self) -> Result<()> {
        Ok(self.control_bus.acquire()?)
    }

    pub fn deinit_control_bus(&self) -> Result<()> {
        Ok(self.control_bus.release()?)
    }

    pub fn control_bus(&self) -> &SharedBus<P::ControlBus> {
        &self.control_bus
    }

    pub fn adc(&self) -> &SharedBus<P::Adc> {
        &self.adc
    }

    // ── Audio ─────────────────────────────────────────────────

    pub fn compose_speaker_endpoint(&self) -> Result<AudioEndpoint> {
        self.audio.compose(Direction::Out, &self.control_bus)
    }

    pub fn compose_microphone_endpoint(&self) -> Result<AudioEndpoint> {
        self.audio.compose(Direction::In, &self.control_bus)
    }

    pub fn release_endpoint(&self, endpoint: AudioEndpoint) {
        self.audio.release(endpoint);
    }

    pub fn audio(&self) -> &AudioComposer<P::Streams, P::Codecs> {
        &self.audio
    }

    // ── Buttons ───────────────────────────────────────────────

    pub fn create_button_array(&self, capacity: usize) -> Result<ButtonArray> {
        let mut factory = self.buttons.lock().unwrap_or_else(PoisonError::into_inner);
        buttons::create_button_array(capacity, &self.adc, &mut *factory)
    }

    pub fn release_buttons(&self, array: ButtonArray) {
        let mut factory = self.buttons.lock().unwrap_or_else(PoisonError::into_inner);
        array.release(&mut *factory);
    }

    /// Delete one button taken out of its array.
    pub fn delete_button(&self, button: ButtonHandle) -> Result<()> {
        let mut factory = self.buttons.lock().unwrap_or_else(PoisonError::into_inner);
        factory.delete_button(button).map_err(|rc| {
            warn!("buttons: delete failed (rc={})", rc);
            DeviceError::ButtonDelete(rc).into()
        })
    }

    /// Which button a ladder sample (mV) belongs to.
    pub fn resolve_button(&self, mv: u16) -> Option<ButtonId> {
        KORVO_BUTTONS.classify(mv)
    }

    // ── Indicators ────────────────────────────────────────────

    pub fn create_indicator_array(&self, capacity: usize) -> Result<IndicatorArray> {
        let mut factory = self
            .indicators
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        indicator::create_indicator_array(capacity, &mut *factory)
    }

    pub fn release_indicators(&self, array: IndicatorArray) {
        let mut factory = self
            .indicators
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        array.release(&mut *factory);
    }

    // ── Storage ───────────────────────────────────────────────

    pub fn mount_embedded_partition(&self) -> Result<()> {
        Ok(self.spiffs.mount()?)
    }

    pub fn unmount_embedded_partition(&self) -> Result<()> {
        Ok(self.spiffs.unmount()?)
    }

    pub fn is_embedded_partition_mounted(&self) -> bool {
        self.spiffs.is_mounted()
    }

    pub fn mount_removable_card(&self) -> Result<()> {
        Ok(self.sdcard.mount()?)
    }

    pub fn unmount_removable_card(&self) -> Result<()> {
        Ok(self.sdcard.unmount()?)
    }

    pub fn is_removable_card_mounted(&self) -> bool {
        self.sdcard.is_mounted()
    }

    /// Take the collaborators back out, e.g. to inspect them in tests.
    pub fn into_parts(self) -> BoardParts<P> {
        let (streams, codecs) = self.audio.into_parts();
        BoardParts {
            control_bus: self.control_bus.into_driver(),
            adc: self.adc.into_driver(),
            streams,
            codecs,
            buttons: self
                .buttons
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
            indicators: self
                .indicators
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
            flash: self.spiffs.into_backend(),
            card: self.sdcard.into_backend(),
        }
    }
}
