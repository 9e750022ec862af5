//! Port traits: the boundary between bring-up logic and the ESP-IDF drivers.
//!
//! ```text
//!   Composer ──▶ Port trait ──▶ Adapter (ESP-IDF component or simulation)
//! ```
//!
//! Driver objects cross this boundary as opaque, non-null handles.  A
//! factory that would return `NULL` in C returns `None` here, so a
//! composer can never hold an invalid handle.

use core::fmt;
use core::num::NonZeroUsize;

use bitflags::bitflags;

use crate::error::EspCode;

// ───────────────────────────────────────────────────────────────
// Opaque handles
// ───────────────────────────────────────────────────────────────

/// Address of a driver object owned by the C side (or a simulation id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(NonZeroUsize);

impl RawHandle {
    pub const fn new(raw: usize) -> Option<Self> {
        match NonZeroUsize::new(raw) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    pub const fn from_non_zero(raw: NonZeroUsize) -> Self {
        Self(raw)
    }

    pub fn from_ptr<T>(ptr: *const T) -> Option<Self> {
        Self::new(ptr as usize)
    }

    pub const fn get(self) -> usize {
        self.0.get()
    }

    pub fn as_ptr<T>(self) -> *mut T {
        self.0.get() as *mut T
    }
}

macro_rules! handle_type {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, PartialEq, Eq, Hash)]
            pub struct $name(pub RawHandle);
        )*
    };
}

handle_type!(
    /// Codec register-access interface (I²C).
    CtrlIf,
    /// Codec GPIO interface (PA pin control).
    GpioIf,
    /// Codec chip driver.
    CodecIf,
    /// Generic codec device used for playback or capture.
    CodecDevice,
    ButtonHandle,
    IndicatorHandle,
    /// Mounted SD card descriptor.
    CardHandle,
);

/// Streaming (I²S) data interface.  Shared by every endpoint of one
/// direction and owned by the stream provider, hence `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataIf(pub RawHandle);

// ───────────────────────────────────────────────────────────────
// Shared bus driver
// ───────────────────────────────────────────────────────────────

/// A bus or converter unit shared by several downstream devices.
pub trait BusDriver {
    /// Apply bus parameters (pins, pull-ups, clock).
    fn configure(&mut self) -> Result<(), EspCode>;

    /// Install the driver after `configure` succeeded.
    fn install(&mut self) -> Result<(), EspCode>;

    /// Delete the installed driver.
    fn delete(&mut self) -> Result<(), EspCode>;

    /// Unit handle once installed, for drivers that hand one out.
    fn handle(&self) -> Option<RawHandle> {
        None
    }
}

// ───────────────────────────────────────────────────────────────
// Audio
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Playback (speaker).
    Out,
    /// Capture (microphone).
    In,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Out => write!(f, "OUT"),
            Self::In => write!(f, "IN"),
        }
    }
}

/// Owner of the I²S channels and power amplifier.
pub trait StreamProvider {
    /// Data interface for `dir`, if the streaming subsystem is up.
    fn data_if(&self, dir: Direction) -> Option<DataIf>;

    /// Bring up I²S for both directions. Needs the control bus.
    fn init(&mut self) -> Result<(), EspCode>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cCtrlConfig {
    pub port: i32,
    pub addr: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecWorkMode {
    Adc,
    Dac,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HwGain {
    /// Power amplifier supply voltage.
    pub pa_voltage: f32,
    /// Codec DAC reference voltage.
    pub codec_dac_voltage: f32,
}

/// ES8311 (mono DAC) settings.
#[derive(Debug, PartialEq)]
pub struct Es8311Config<'a> {
    pub ctrl: &'a CtrlIf,
    pub gpio: &'a GpioIf,
    pub mode: CodecWorkMode,
    pub pa_pin: i32,
    pub pa_reverted: bool,
    pub master_mode: bool,
    pub use_mclk: bool,
    pub digital_mic: bool,
    pub invert_mclk: bool,
    pub invert_sclk: bool,
    pub hw_gain: HwGain,
}

bitflags! {
    /// ES7210 analog microphone inputs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MicSelect: u8 {
        const MIC1 = 0b0001;
        const MIC2 = 0b0010;
        const MIC3 = 0b0100;
        const MIC4 = 0b1000;
    }
}

/// ES7210 (microphone ADC) settings.
#[derive(Debug, PartialEq)]
pub struct Es7210Config<'a> {
    pub ctrl: &'a CtrlIf,
    pub mic_selected: MicSelect,
}

#[derive(Debug, PartialEq)]
pub struct CodecDeviceConfig<'a> {
    pub direction: Direction,
    pub codec: &'a CodecIf,
    pub data: DataIf,
}

/// esp_codec_dev constructors and destructors.
pub trait CodecFactory {
    fn new_i2c_ctrl(&mut self, cfg: &I2cCtrlConfig) -> Option<CtrlIf>;
    fn new_gpio(&mut self) -> Option<GpioIf>;
    fn new_es8311(&mut self, cfg: &Es8311Config<'_>) -> Option<CodecIf>;
    fn new_es7210(&mut self, cfg: &Es7210Config<'_>) -> Option<CodecIf>;
    fn new_device(&mut self, cfg: &CodecDeviceConfig<'_>) -> Option<CodecDevice>;

    fn delete_device(&mut self, dev: CodecDevice);
    fn delete_codec(&mut self, codec: CodecIf);
    fn delete_ctrl(&mut self, ctrl: CtrlIf);
    fn delete_gpio(&mut self, gpio: GpioIf);
}

// ───────────────────────────────────────────────────────────────
// Buttons
// ───────────────────────────────────────────────────────────────

/// One resistor-ladder button on a shared ADC channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcButtonConfig {
    /// ADC one-shot unit shared by every button on the ladder.
    pub adc_unit: Option<RawHandle>,
    pub channel: u32,
    pub button_index: u8,
    pub min_mv: u16,
    pub max_mv: u16,
}

pub trait ButtonFactory {
    fn create_adc_button(&mut self, cfg: &AdcButtonConfig) -> Option<ButtonHandle>;
    fn delete_button(&mut self, button: ButtonHandle) -> Result<(), EspCode>;
}

// ───────────────────────────────────────────────────────────────
// LED indicator
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedModel {
    Ws2812,
    Sk6812,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripConfig {
    pub gpio: i32,
    pub max_leds: u32,
    pub model: LedModel,
    pub invert_out: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RmtConfig {
    pub resolution_hz: u32,
    pub with_dma: bool,
}

/// Strip-mode indicator bound to a static table of blink lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorConfig {
    pub strip: StripConfig,
    pub rmt: RmtConfig,
    pub active_level_high: bool,
    pub blink_lists: &'static [&'static [crate::indicator::BlinkStep]],
}

pub trait IndicatorFactory {
    fn create(&mut self, cfg: &IndicatorConfig) -> Option<IndicatorHandle>;
    fn delete(&mut self, indicator: IndicatorHandle) -> Result<(), EspCode>;
}

// ───────────────────────────────────────────────────────────────
// Storage
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// SPIFFS partition in on-module flash.
    EmbeddedPartition,
    /// FAT on the uSD card.
    RemovableCard,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmbeddedPartition => write!(f, "SPIFFS partition"),
            Self::RemovableCard => write!(f, "SD card"),
        }
    }
}

/// Filesystem capacity in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub total: u64,
    pub used: u64,
}

/// A storage medium exposed through a VFS mount.
pub trait MountBackend {
    /// What the mount produces (the SD card descriptor, or nothing).
    type Handle;

    fn kind(&self) -> BackendKind;

    /// VFS path the backend mounts at.
    fn path(&self) -> &str;

    fn mount(&mut self) -> Result<Self::Handle, EspCode>;

    fn capacity(&mut self, handle: &Self::Handle) -> Result<Capacity, EspCode>;

    /// Unmount. On failure the handle is returned so the caller keeps it.
    fn unmount(&mut self, handle: Self::Handle) -> Result<(), (EspCode, Self::Handle)>;
}
