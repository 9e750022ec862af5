//! I²S streams and esp_codec_dev codec construction.
//!
//! ## Streams
//!
//! Playback runs on I²S0 (TX only), capture on I²S1 (RX only).  `init`
//! opens both channels in standard (Philips) mode, enables the power
//! amplifier pin and wraps each channel in an esp_codec_dev data
//! interface.  Those interfaces live as long as the provider.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: real I²S channels and esp_codec_dev objects.
//! On host/test: simulated handles; the factory tracks which objects are
//! alive so leaks show up in tests.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::error::EspCode;
use crate::ports::{
    CodecDevice, CodecDeviceConfig, CodecFactory, CodecIf, CtrlIf, DataIf, Direction,
    Es7210Config, Es8311Config, GpioIf, I2cCtrlConfig, StreamProvider,
};

// ── Streams ───────────────────────────────────────────────────

pub struct I2sStreams {
    spk: Option<DataIf>,
    mic: Option<DataIf>,
    #[cfg(not(target_os = "espidf"))]
    inits: u32,
}

impl Default for I2sStreams {
    fn default() -> Self {
        Self::new()
    }
}

impl I2sStreams {
    pub fn new() -> Self {
        Self {
            spk: None,
            mic: None,
            #[cfg(not(target_os = "espidf"))]
            inits: 0,
        }
    }

    /// Simulation: number of times the streaming subsystem was brought up.
    #[cfg(not(target_os = "espidf"))]
    pub fn inits(&self) -> u32 {
        self.inits
    }
}

impl StreamProvider for I2sStreams {
    fn data_if(&self, dir: Direction) -> Option<DataIf> {
        match dir {
            Direction::Out => self.spk,
            Direction::In => self.mic,
        }
    }

    #[cfg(target_os = "espidf")]
    fn init(&mut self) -> Result<(), EspCode> {
        use crate::pins;

        enable_power_amp()?;

        let tx = open_channel(
            pins::I2S_SPK_PORT,
            Direction::Out,
            [
                pins::I2S_SPK_MCLK_GPIO,
                pins::I2S_SPK_BCLK_GPIO,
                pins::I2S_SPK_WS_GPIO,
                pins::I2S_SPK_DOUT_GPIO,
                -1,
            ],
        )?;
        let rx = match open_channel(
            pins::I2S_MIC_PORT,
            Direction::In,
            [
                pins::I2S_MIC_MCLK_GPIO,
                pins::I2S_MIC_BCLK_GPIO,
                pins::I2S_MIC_WS_GPIO,
                -1,
                pins::I2S_MIC_DIN_GPIO,
            ],
        ) {
            Ok(rx) => rx,
            Err(rc) => {
                close_channel(tx);
                return Err(rc);
            }
        };

        self.spk = new_data_if(pins::I2S_SPK_PORT, tx, core::ptr::null_mut());
        self.mic = new_data_if(pins::I2S_MIC_PORT, core::ptr::null_mut(), rx);
        log::info!("audio: I2S0 (spk) and I2S1 (mic) up");
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn init(&mut self) -> Result<(), EspCode> {
        self.inits += 1;
        self.spk = Some(DataIf(super::sim::handle()));
        self.mic = Some(DataIf(super::sim::handle()));
        log::info!("audio(sim): I2S streams up");
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
fn enable_power_amp() -> Result<(), EspCode> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << crate::pins::POWER_AMP_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        ..Default::default()
    };
    // SAFETY: plain output pin configuration from the bring-up path.
    super::esp_result(unsafe { gpio_config(&cfg) })?;
    super::esp_result(unsafe { gpio_set_level(crate::pins::POWER_AMP_GPIO, 1) })
}

/// Open one std-mode channel. `gpios` is `[mclk, bclk, ws, dout, din]`,
/// `-1` for unused lines.
#[cfg(target_os = "espidf")]
fn open_channel(port: u32, dir: Direction, gpios: [i32; 5]) -> Result<i2s_chan_handle_t, EspCode> {
    let chan_cfg = i2s_chan_config_t {
        id: port as i2s_port_t,
        role: i2s_role_t_I2S_ROLE_MASTER,
        dma_desc_num: 6,
        dma_frame_num: 240,
        auto_clear: true,
        ..Default::default()
    };
    let mut chan: i2s_chan_handle_t = core::ptr::null_mut();
    let (tx, rx): (*mut i2s_chan_handle_t, *mut i2s_chan_handle_t) = match dir {
        Direction::Out => (&mut chan, core::ptr::null_mut()),
        Direction::In => (core::ptr::null_mut(), &mut chan),
    };
    // SAFETY: exactly one of tx/rx points at `chan`, the other is null.
    super::esp_result(unsafe { i2s_new_channel(&chan_cfg, tx, rx) })?;

    let mut std_cfg = i2s_std_config_t::default();
    std_cfg.clk_cfg.sample_rate_hz = crate::pins::AUDIO_SAMPLE_RATE_HZ;
    std_cfg.clk_cfg.clk_src = soc_periph_i2s_clk_src_t_I2S_CLK_SRC_DEFAULT;
    std_cfg.clk_cfg.mclk_multiple = i2s_mclk_multiple_t_I2S_MCLK_MULTIPLE_256;
    std_cfg.slot_cfg.data_bit_width = i2s_data_bit_width_t_I2S_DATA_BIT_WIDTH_16BIT;
    std_cfg.slot_cfg.slot_bit_width = i2s_slot_bit_width_t_I2S_SLOT_BIT_WIDTH_AUTO;
    std_cfg.slot_cfg.slot_mode = i2s_slot_mode_t_I2S_SLOT_MODE_STEREO;
    std_cfg.slot_cfg.slot_mask = i2s_std_slot_mask_t_I2S_STD_SLOT_BOTH;
    std_cfg.slot_cfg.ws_width = 16;
    std_cfg.slot_cfg.bit_shift = true;
    let [mclk, bclk, ws, dout, din] = gpios;
    std_cfg.gpio_cfg.mclk = mclk;
    std_cfg.gpio_cfg.bclk = bclk;
    std_cfg.gpio_cfg.ws = ws;
    std_cfg.gpio_cfg.dout = dout;
    std_cfg.gpio_cfg.din = din;

    // SAFETY: `chan` is a freshly created, not yet enabled channel.
    let ret = super::esp_result(unsafe { i2s_channel_init_std_mode(chan, &std_cfg) })
        .and_then(|()| super::esp_result(unsafe { i2s_channel_enable(chan) }));
    if let Err(rc) = ret {
        unsafe { i2s_del_channel(chan) };
        return Err(rc);
    }
    Ok(chan)
}

#[cfg(target_os = "espidf")]
fn close_channel(chan: i2s_chan_handle_t) {
    // SAFETY: channel was enabled by open_channel and is not shared yet.
    unsafe {
        i2s_channel_disable(chan);
        i2s_del_channel(chan);
    }
}

#[cfg(target_os = "espidf")]
fn new_data_if(port: u32, tx: i2s_chan_handle_t, rx: i2s_chan_handle_t) -> Option<DataIf> {
    let cfg = audio_codec_i2s_cfg_t {
        port: port as _,
        rx_handle: rx as *mut core::ffi::c_void,
        tx_handle: tx as *mut core::ffi::c_void,
        ..Default::default()
    };
    // SAFETY: the channels stay alive for the provider's lifetime.
    crate::ports::RawHandle::from_ptr(unsafe { audio_codec_new_i2s_data(&cfg) }).map(DataIf)
}

// ── Codec factory ─────────────────────────────────────────────

pub struct EspCodecFactory {
    #[cfg(not(target_os = "espidf"))]
    live: std::collections::HashSet<usize>,
}

impl Default for EspCodecFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EspCodecFactory {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            live: std::collections::HashSet::new(),
        }
    }

    /// Simulation: codec objects created and not yet deleted.
    #[cfg(not(target_os = "espidf"))]
    pub fn live_objects(&self) -> usize {
        self.live.len()
    }
}

#[cfg(target_os = "espidf")]
impl CodecFactory for EspCodecFactory {
    fn new_i2c_ctrl(&mut self, cfg: &I2cCtrlConfig) -> Option<CtrlIf> {
        let c = audio_codec_i2c_cfg_t {
            port: cfg.port as _,
            addr: cfg.addr,
            ..Default::default()
        };
        // SAFETY: the driver copies the config; a null return means failure.
        crate::ports::RawHandle::from_ptr(unsafe { audio_codec_new_i2c_ctrl(&c) }).map(CtrlIf)
    }

    fn new_gpio(&mut self) -> Option<GpioIf> {
        // SAFETY: stateless constructor.
        crate::ports::RawHandle::from_ptr(unsafe { audio_codec_new_gpio() }).map(GpioIf)
    }

    fn new_es8311(&mut self, cfg: &Es8311Config<'_>) -> Option<CodecIf> {
        let c = es8311_codec_cfg_t {
            ctrl_if: cfg.ctrl.0.as_ptr(),
            gpio_if: cfg.gpio.0.as_ptr(),
            codec_mode: work_mode(cfg.mode),
            pa_pin: cfg.pa_pin as _,
            pa_reverted: cfg.pa_reverted,
            master_mode: cfg.master_mode,
            use_mclk: cfg.use_mclk,
            digital_mic: cfg.digital_mic,
            invert_mclk: cfg.invert_mclk,
            invert_sclk: cfg.invert_sclk,
            hw_gain: esp_codec_dev_hw_gain_t {
                pa_voltage: cfg.hw_gain.pa_voltage,
                codec_dac_voltage: cfg.hw_gain.codec_dac_voltage,
                ..Default::default()
            },
            ..Default::default()
        };
        // SAFETY: ctrl/gpio interfaces are alive for the codec's lifetime
        // (the endpoint owns all three).
        crate::ports::RawHandle::from_ptr(unsafe { es8311_codec_new(&c) }).map(CodecIf)
    }

    fn new_es7210(&mut self, cfg: &Es7210Config<'_>) -> Option<CodecIf> {
        let c = es7210_codec_cfg_t {
            ctrl_if: cfg.ctrl.0.as_ptr(),
            mic_selected: cfg.mic_selected.bits() as _,
            ..Default::default()
        };
        // SAFETY: see new_es8311.
        crate::ports::RawHandle::from_ptr(unsafe { es7210_codec_new(&c) }).map(CodecIf)
    }

    fn new_device(&mut self, cfg: &CodecDeviceConfig<'_>) -> Option<CodecDevice> {
        let c = esp_codec_dev_cfg_t {
            dev_type: match cfg.direction {
                Direction::Out => esp_codec_dev_type_t_ESP_CODEC_DEV_TYPE_OUT,
                Direction::In => esp_codec_dev_type_t_ESP_CODEC_DEV_TYPE_IN,
            },
            codec_if: cfg.codec.0.as_ptr(),
            data_if: cfg.data.0.as_ptr(),
        };
        // SAFETY: codec and data interfaces outlive the device.
        crate::ports::RawHandle::from_ptr(unsafe { esp_codec_dev_new(&c) }).map(CodecDevice)
    }

    fn delete_device(&mut self, dev: CodecDevice) {
        // SAFETY: ownership of the handle ends here.
        unsafe { esp_codec_dev_delete(dev.0.as_ptr()) };
    }

    fn delete_codec(&mut self, codec: CodecIf) {
        unsafe { audio_codec_delete_codec_if(codec.0.as_ptr()) };
    }

    fn delete_ctrl(&mut self, ctrl: CtrlIf) {
        unsafe { audio_codec_delete_ctrl_if(ctrl.0.as_ptr()) };
    }

    fn delete_gpio(&mut self, gpio: GpioIf) {
        unsafe { audio_codec_delete_gpio_if(gpio.0.as_ptr()) };
    }
}

#[cfg(target_os = "espidf")]
fn work_mode(mode: crate::ports::CodecWorkMode) -> esp_codec_dec_work_mode_t {
    use crate::ports::CodecWorkMode;
    match mode {
        CodecWorkMode::Adc => esp_codec_dec_work_mode_t_ESP_CODEC_DEV_WORK_MODE_ADC,
        CodecWorkMode::Dac => esp_codec_dec_work_mode_t_ESP_CODEC_DEV_WORK_MODE_DAC,
        CodecWorkMode::Both => esp_codec_dec_work_mode_t_ESP_CODEC_DEV_WORK_MODE_BOTH,
    }
}

#[cfg(not(target_os = "espidf"))]
impl EspCodecFactory {
    fn alloc(&mut self) -> crate::ports::RawHandle {
        let h = super::sim::handle();
        self.live.insert(h.get());
        h
    }

    fn free(&mut self, h: crate::ports::RawHandle) {
        if !self.live.remove(&h.get()) {
            log::warn!("audio(sim): double delete of {:#x}", h.get());
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl CodecFactory for EspCodecFactory {
    fn new_i2c_ctrl(&mut self, cfg: &I2cCtrlConfig) -> Option<CtrlIf> {
        log::info!("audio(sim): I2C ctrl port {} addr {:#04x}", cfg.port, cfg.addr);
        Some(CtrlIf(self.alloc()))
    }

    fn new_gpio(&mut self) -> Option<GpioIf> {
        Some(GpioIf(self.alloc()))
    }

    fn new_es8311(&mut self, cfg: &Es8311Config<'_>) -> Option<CodecIf> {
        log::info!("audio(sim): ES8311 {:?}, PA on GPIO{}", cfg.mode, cfg.pa_pin);
        Some(CodecIf(self.alloc()))
    }

    fn new_es7210(&mut self, cfg: &Es7210Config<'_>) -> Option<CodecIf> {
        log::info!("audio(sim): ES7210 mics {:?}", cfg.mic_selected);
        Some(CodecIf(self.alloc()))
    }

    fn new_device(&mut self, cfg: &CodecDeviceConfig<'_>) -> Option<CodecDevice> {
        log::info!("audio(sim): codec device {}", cfg.direction);
        Some(CodecDevice(self.alloc()))
    }

    fn delete_device(&mut self, dev: CodecDevice) {
        self.free(dev.0);
    }

    fn delete_codec(&mut self, codec: CodecIf) {
        self.free(codec.0);
    }

    fn delete_ctrl(&mut self, ctrl: CtrlIf) {
        self.free(ctrl.0);
    }

    fn delete_gpio(&mut self, gpio: GpioIf) {
        self.free(gpio.0);
    }
}
