//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter      | Implements        | Connects to                      |
//! |--------------|-------------------|----------------------------------|
//! | `i2c`        | BusDriver         | legacy I²C master driver         |
//! | `adc`        | BusDriver         | ADC1 one-shot unit               |
//! | `audio`      | StreamProvider    | I²S std channels + PA GPIO       |
//! |              | CodecFactory      | esp_codec_dev (ES8311, ES7210)   |
//! | `button`     | ButtonFactory     | iot_button (ADC type)            |
//! | `indicator`  | IndicatorFactory  | led_indicator (strips, RMT)      |
//! | `storage`    | MountBackend      | SPIFFS VFS, FAT on SDMMC         |
//!
//! ## Dual-target design
//!
//! On ESP-IDF every adapter calls the C components through
//! `esp_idf_svc::sys`.  On the host the same types keep in-memory state
//! and hand out simulated handles, so the whole board can be brought up
//! in tests.

pub mod adc;
pub mod audio;
pub mod button;
pub mod i2c;
pub mod indicator;
pub mod storage;

use crate::board::{Board, BoardParts, BoardPorts};
use crate::config::BoardConfig;
use crate::error::Result;

/// The Korvo-1 adapter set.
pub struct KorvoPorts;

impl BoardPorts for KorvoPorts {
    type ControlBus = i2c::I2cControlBus;
    type Adc = adc::AdcOneshotUnit;
    type Streams = audio::I2sStreams;
    type Codecs = audio::EspCodecFactory;
    type Buttons = button::IotButtonFactory;
    type Indicators = indicator::LedIndicatorFactory;
    type Flash = storage::SpiffsPartition;
    type Card = storage::SdCard;
}

pub type KorvoBoard = Board<KorvoPorts>;

/// Build the board with the stock adapters.  Fails with
/// `ConfigError::Invalid` if `config` does not validate.
pub fn korvo_board(config: BoardConfig) -> Result<KorvoBoard> {
    let parts = BoardParts::<KorvoPorts> {
        control_bus: i2c::I2cControlBus::new(config.i2c_clk_speed_hz),
        adc: adc::AdcOneshotUnit::new(),
        streams: audio::I2sStreams::new(),
        codecs: audio::EspCodecFactory::new(),
        buttons: button::IotButtonFactory::new(),
        indicators: indicator::LedIndicatorFactory::new(),
        flash: storage::SpiffsPartition::new(config.spiffs.clone()),
        card: storage::SdCard::new(config.sdcard.clone()),
    };
    Board::new(config, parts)
}

/// Simulated handle allocator for host builds.
#[cfg(not(target_os = "espidf"))]
pub(crate) mod sim {
    use core::num::NonZeroUsize;
    use core::sync::atomic::{AtomicUsize, Ordering};

    use crate::ports::RawHandle;

    static NEXT: AtomicUsize = AtomicUsize::new(0x1000);

    /// A fresh, never-null handle.
    pub fn handle() -> RawHandle {
        let raw = NEXT.fetch_add(0x10, Ordering::Relaxed);
        RawHandle::from_non_zero(NonZeroUsize::MIN.saturating_add(raw))
    }
}

#[cfg(target_os = "espidf")]
pub(crate) fn esp_result(rc: esp_idf_svc::sys::esp_err_t) -> Result<(), crate::error::EspCode> {
    if rc == esp_idf_svc::sys::ESP_OK as esp_idf_svc::sys::esp_err_t {
        Ok(())
    } else {
        Err(rc)
    }
}
