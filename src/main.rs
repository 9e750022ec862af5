//! Korvo-1 bring-up demo.
//!
//! Brings every subsystem up independently, logs what came up and idles.
//! A failing subsystem is reported and skipped; the rest still start.

use anyhow::Result;
use log::{error, info};

use korvo_bsp::buttons::BUTTON_COUNT;
use korvo_bsp::indicator::INDICATOR_COUNT;
use korvo_bsp::{korvo_board, BoardConfig, BspError};

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Korvo-1 BSP v{}", env!("CARGO_PKG_VERSION"));

    // Without a valid config there is nothing to bring up.
    let config = BoardConfig::build_time().map_err(BspError::from)?;
    let board = korvo_board(config)?;

    if let Err(e) = board.init_control_bus() {
        error!("I2C control bus: {}", e);
    }

    let speaker = board
        .compose_speaker_endpoint()
        .inspect_err(|e| error!("speaker: {}", e))
        .ok();
    let microphone = board
        .compose_microphone_endpoint()
        .inspect_err(|e| error!("microphone: {}", e))
        .ok();

    let buttons = board
        .create_button_array(BUTTON_COUNT)
        .inspect_err(|e| error!("buttons: {}", e))
        .ok();
    let indicators = board
        .create_indicator_array(INDICATOR_COUNT)
        .inspect_err(|e| error!("indicators: {}", e))
        .ok();

    if let Err(e) = board.mount_embedded_partition() {
        error!("SPIFFS: {}", e);
    }
    if let Err(e) = board.mount_removable_card() {
        error!("SD card: {}", e);
    }

    info!(
        "up: speaker={} mic={} buttons={} leds={} spiffs={} sdcard={}",
        speaker.is_some(),
        microphone.is_some(),
        buttons.as_ref().map_or(0, |b| b.len()),
        indicators.as_ref().map_or(0, |i| i.len()),
        board.is_embedded_partition_mounted(),
        board.is_removable_card_mounted(),
    );

    loop {
        // SAFETY: plain FreeRTOS delay from the main task.
        unsafe { esp_idf_svc::sys::vTaskDelay(1000) };
    }
}
