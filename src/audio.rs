//! Audio endpoint composition.
//!
//! An endpoint is built in layers, each depending on the one before:
//!
//! ```text
//!   I²S data interface (shared, per direction)
//!        │
//!   I²C control interface ──▶ codec driver (ES8311 / ES7210)
//!        │                          │
//!        └────────────▶ codec device (OUT / IN)
//! ```
//!
//! The data interface belongs to the stream provider and is shared by
//! every endpoint of the same direction.  Everything else is created per
//! endpoint and owned by the returned [`AudioEndpoint`].  If a layer
//! fails, the layers already built are deleted before the error returns.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{info, warn};

use crate::bus::SharedBus;
use crate::error::{BspError, ConfigError, DeviceError};
use crate::pins;
use crate::ports::{
    BusDriver, CodecDevice, CodecDeviceConfig, CodecFactory, CodecIf, CodecWorkMode, CtrlIf,
    DataIf, Direction, Es7210Config, Es8311Config, GpioIf, HwGain, I2cCtrlConfig, MicSelect,
    StreamProvider,
};

/// Speaker path gain: PA supply and codec DAC reference.
pub const SPEAKER_GAIN: HwGain = HwGain {
    pa_voltage: 5.0,
    codec_dac_voltage: 3.3,
};

/// Both on-board analog microphones.
pub const MICROPHONES: MicSelect = MicSelect::MIC1.union(MicSelect::MIC2);

/// Codec control address for a direction.
pub const fn codec_addr(dir: Direction) -> u8 {
    match dir {
        Direction::Out => pins::ES8311_ADDR,
        Direction::In => pins::ES7210_ADDR,
    }
}

// ── Shared streaming interface ────────────────────────────────

/// Lazily brings up the streaming subsystem, exactly once.
pub struct StreamHub<S> {
    provider: Mutex<S>,
}

impl<S: StreamProvider> StreamHub<S> {
    pub fn new(provider: S) -> Self {
        Self {
            provider: Mutex::new(provider),
        }
    }

    /// Data interface for `dir`, bringing up the control bus and I²S
    /// first if needed.
    ///
    /// # Panics
    ///
    /// If the streaming subsystem reports success but still has no
    /// interface for `dir`.  That is a board configuration error, not a
    /// runtime condition.
    pub fn get_or_init<B: BusDriver>(
        &self,
        dir: Direction,
        bus: &SharedBus<B>,
    ) -> Result<DataIf, ConfigError> {
        let mut provider = self.lock();
        if let Some(data) = provider.data_if(dir) {
            return Ok(data);
        }

        bus.acquire()?;
        provider.init().map_err(|rc| {
            warn!("audio: streaming init failed (rc={})", rc);
            ConfigError::StreamInitFailed(rc)
        })?;

        match provider.data_if(dir) {
            Some(data) => Ok(data),
            None => panic!("streaming subsystem is up but has no {dir} interface"),
        }
    }

    pub fn is_up(&self, dir: Direction) -> bool {
        self.lock().data_if(dir).is_some()
    }

    pub fn into_provider(self) -> S {
        self.provider
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, S> {
        self.provider.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Endpoint ──────────────────────────────────────────────────

/// A ready playback or capture device.
#[derive(Debug)]
pub struct AudioEndpoint {
    direction: Direction,
    device: CodecDevice,
    codec: CodecIf,
    ctrl: CtrlIf,
    gpio: Option<GpioIf>,
    data: DataIf,
}

impl AudioEndpoint {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn device(&self) -> &CodecDevice {
        &self.device
    }

    /// Shared streaming interface this endpoint plays or records through.
    pub fn data_if(&self) -> DataIf {
        self.data
    }

    /// Delete the device and its private layers, newest first.  The shared
    /// data interface is left alone.
    pub fn release<F: CodecFactory>(self, factory: &mut F) {
        factory.delete_device(self.device);
        Layers {
            ctrl: self.ctrl,
            gpio: self.gpio,
        }
        .unwind(Some(self.codec), factory);
        info!("audio: {} endpoint released", self.direction);
    }
}

/// Lower layers of an endpoint under construction.
struct Layers {
    ctrl: CtrlIf,
    gpio: Option<GpioIf>,
}

impl Layers {
    /// Delete `codec` (if built) and then the lower layers, newest first.
    fn unwind<F: CodecFactory>(self, codec: Option<CodecIf>, factory: &mut F) {
        if let Some(codec) = codec {
            factory.delete_codec(codec);
        }
        if let Some(gpio) = self.gpio {
            factory.delete_gpio(gpio);
        }
        factory.delete_ctrl(self.ctrl);
    }
}

fn new_codec<F: CodecFactory>(
    direction: Direction,
    layers: &Layers,
    factory: &mut F,
) -> Option<CodecIf> {
    match (direction, layers.gpio.as_ref()) {
        (Direction::Out, Some(gpio)) => factory.new_es8311(&Es8311Config {
            ctrl: &layers.ctrl,
            gpio,
            mode: CodecWorkMode::Dac,
            pa_pin: pins::POWER_AMP_GPIO,
            pa_reverted: false,
            master_mode: false,
            use_mclk: false,
            digital_mic: false,
            invert_mclk: false,
            invert_sclk: false,
            hw_gain: SPEAKER_GAIN,
        }),
        // The ES8311 needs the PA pin.
        (Direction::Out, None) => None,
        (Direction::In, _) => factory.new_es7210(&Es7210Config {
            ctrl: &layers.ctrl,
            mic_selected: MICROPHONES,
        }),
    }
}

/// Build the codec layers on top of an already available data interface.
/// On failure every layer built so far is deleted before the error returns.
pub fn build_endpoint<F: CodecFactory>(
    direction: Direction,
    data: DataIf,
    factory: &mut F,
) -> Result<AudioEndpoint, DeviceError> {
    let ctrl = factory
        .new_i2c_ctrl(&I2cCtrlConfig {
            port: pins::I2C_PORT,
            addr: codec_addr(direction),
        })
        .ok_or(DeviceError::ControlInterface)?;

    let gpio = match direction {
        Direction::Out => match factory.new_gpio() {
            Some(gpio) => Some(gpio),
            None => {
                factory.delete_ctrl(ctrl);
                return Err(DeviceError::GpioInterface);
            }
        },
        Direction::In => None,
    };
    let layers = Layers { ctrl, gpio };

    let Some(codec) = new_codec(direction, &layers, factory) else {
        layers.unwind(None, factory);
        return Err(DeviceError::Codec);
    };

    let Some(device) = factory.new_device(&CodecDeviceConfig {
        direction,
        codec: &codec,
        data,
    }) else {
        layers.unwind(Some(codec), factory);
        return Err(DeviceError::CodecDevice);
    };

    Ok(AudioEndpoint {
        direction,
        device,
        codec,
        ctrl: layers.ctrl,
        gpio: layers.gpio,
        data,
    })
}

// ── Composer ──────────────────────────────────────────────────

/// Owns the shared stream hub and the codec factory.
pub struct AudioComposer<S, F> {
    streams: StreamHub<S>,
    codecs: Mutex<F>,
}

impl<S: StreamProvider, F: CodecFactory> AudioComposer<S, F> {
    pub fn new(streams: S, codecs: F) -> Self {
        Self {
            streams: StreamHub::new(streams),
            codecs: Mutex::new(codecs),
        }
    }

    /// Compose a playback (`Out`) or capture (`In`) endpoint.
    pub fn compose<B: BusDriver>(
        &self,
        direction: Direction,
        bus: &SharedBus<B>,
    ) -> Result<AudioEndpoint, BspError> {
        let data = self.streams.get_or_init(direction, bus)?;
        let mut codecs = self.codecs.lock().unwrap_or_else(PoisonError::into_inner);
        let endpoint = build_endpoint(direction, data, &mut *codecs).inspect_err(|e| {
            warn!("audio: {} endpoint unavailable: {}", direction, e);
        })?;
        info!("audio: {} endpoint ready", direction);
        Ok(endpoint)
    }

    pub fn release(&self, endpoint: AudioEndpoint) {
        let mut codecs = self.codecs.lock().unwrap_or_else(PoisonError::into_inner);
        endpoint.release(&mut *codecs);
    }

    pub fn streams(&self) -> &StreamHub<S> {
        &self.streams
    }

    pub fn into_parts(self) -> (S, F) {
        (
            self.streams.into_provider(),
            self.codecs
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}
