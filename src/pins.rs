//! GPIO / peripheral assignments for the ESP32-S3-Korvo-1 board.
//!
//! Single source of truth: adapters and composers reference this module
//! rather than hard-coding pin numbers or bus addresses.

// ---------------------------------------------------------------------------
// I²C control bus (codec configuration)
// ---------------------------------------------------------------------------

pub const I2C_PORT: i32 = 0;
pub const I2C_SCL_GPIO: i32 = 2;
pub const I2C_SDA_GPIO: i32 = 1;

// ---------------------------------------------------------------------------
// Audio
// ---------------------------------------------------------------------------

/// Power amplifier enable (active HIGH).
pub const POWER_AMP_GPIO: i32 = 38;

/// I²S0 carries playback to the ES8311.
pub const I2S_SPK_PORT: u32 = 0;
pub const I2S_SPK_MCLK_GPIO: i32 = 42;
pub const I2S_SPK_BCLK_GPIO: i32 = 40;
pub const I2S_SPK_WS_GPIO: i32 = 41;
pub const I2S_SPK_DOUT_GPIO: i32 = 39;

/// I²S1 carries capture from the ES7210.
pub const I2S_MIC_PORT: u32 = 1;
pub const I2S_MIC_MCLK_GPIO: i32 = 20;
pub const I2S_MIC_BCLK_GPIO: i32 = 10;
pub const I2S_MIC_WS_GPIO: i32 = 9;
pub const I2S_MIC_DIN_GPIO: i32 = 11;

pub const AUDIO_SAMPLE_RATE_HZ: u32 = 16_000;

/// ES8311 DAC, 8-bit address form expected by esp_codec_dev.
pub const ES8311_ADDR: u8 = 0x30;
/// ES7210 four-channel ADC, 8-bit address form.
pub const ES7210_ADDR: u8 = 0x80;

// ---------------------------------------------------------------------------
// ADC buttons (resistor ladder on a single channel)
// ---------------------------------------------------------------------------

/// ADC1 channel 7 is GPIO8.
pub const BUTTON_ADC_CHANNEL: u32 = 7;

// ---------------------------------------------------------------------------
// RGB LED ring (WS2812 via RMT)
// ---------------------------------------------------------------------------

pub const LED_RGB_GPIO: i32 = 19;
pub const LED_COUNT: u32 = 12;
/// RMT counter clock, 10 MHz.
pub const LED_RMT_RESOLUTION_HZ: u32 = 10_000_000;

// ---------------------------------------------------------------------------
// uSD card (SDMMC, 1-bit)
// ---------------------------------------------------------------------------

pub const SD_CLK_GPIO: i32 = 18;
pub const SD_CMD_GPIO: i32 = 17;
pub const SD_D0_GPIO: i32 = 16;
