//! led_indicator strip-mode adapter for the RGB ring.
//!
//! The component keeps pointers to the blink lists it was created with,
//! so the converted `blink_step_t` tables are owned here until the
//! indicator is deleted.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::error::EspCode;
use crate::ports::{IndicatorConfig, IndicatorFactory, IndicatorHandle};

#[cfg(not(target_os = "espidf"))]
use crate::indicator::{BlinkList, BlinkPlayer};

// ── ESP-IDF ───────────────────────────────────────────────────

/// Converted blink lists plus the pointer table handed to the component.
#[cfg(target_os = "espidf")]
struct BlinkTable {
    _steps: Vec<Vec<blink_step_t>>,
    lists: Vec<*const blink_step_t>,
}

#[cfg(target_os = "espidf")]
impl BlinkTable {
    fn new(lists: &[&[crate::indicator::BlinkStep]]) -> Self {
        use crate::indicator::BlinkStep;

        let steps: Vec<Vec<blink_step_t>> = lists
            .iter()
            .map(|list| {
                list.iter()
                    .map(|step| {
                        let (type_, value, hold_time_ms) = match *step {
                            BlinkStep::Hold { on, hold_ms } => {
                                (blink_step_type_t_LED_BLINK_HOLD, on as u32, hold_ms)
                            }
                            BlinkStep::Breathe { on, duration_ms } => {
                                (blink_step_type_t_LED_BLINK_BREATHE, on as u32, duration_ms)
                            }
                            BlinkStep::Loop => (blink_step_type_t_LED_BLINK_LOOP, 0, 0),
                            BlinkStep::Stop => (blink_step_type_t_LED_BLINK_STOP, 0, 0),
                        };
                        blink_step_t {
                            type_,
                            value: value as _,
                            hold_time_ms,
                        }
                    })
                    .collect()
            })
            .collect();
        // Inner Vec buffers do not move when the outer Vec is moved.
        let lists = steps.iter().map(|s| s.as_ptr()).collect();
        Self {
            _steps: steps,
            lists,
        }
    }
}

pub struct LedIndicatorFactory {
    #[cfg(target_os = "espidf")]
    tables: Vec<(usize, BlinkTable)>,
    #[cfg(not(target_os = "espidf"))]
    players: Vec<(usize, BlinkPlayer)>,
}

impl Default for LedIndicatorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl LedIndicatorFactory {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            tables: Vec::new(),
            #[cfg(not(target_os = "espidf"))]
            players: Vec::new(),
        }
    }
}

#[cfg(target_os = "espidf")]
impl IndicatorFactory for LedIndicatorFactory {
    fn create(&mut self, cfg: &IndicatorConfig) -> Option<IndicatorHandle> {
        use crate::ports::LedModel;

        let mut table = BlinkTable::new(cfg.blink_lists);

        let mut strip_cfg = led_strip_config_t {
            strip_gpio_num: cfg.strip.gpio,
            max_leds: cfg.strip.max_leds,
            led_pixel_format: led_pixel_format_t_LED_PIXEL_FORMAT_GRB,
            led_model: match cfg.strip.model {
                LedModel::Ws2812 => led_model_t_LED_MODEL_WS2812,
                LedModel::Sk6812 => led_model_t_LED_MODEL_SK6812,
            },
            ..Default::default()
        };
        strip_cfg.flags.set_invert_out(cfg.strip.invert_out as u32);

        let mut rmt_cfg = led_strip_rmt_config_t {
            clk_src: soc_periph_rmt_clk_src_t_RMT_CLK_SRC_DEFAULT,
            resolution_hz: cfg.rmt.resolution_hz,
            ..Default::default()
        };
        rmt_cfg.flags.set_with_dma(cfg.rmt.with_dma as u32);

        let mut strips = led_indicator_strips_config_t {
            is_active_level_high: cfg.active_level_high,
            led_strip_cfg: strip_cfg,
            led_strip_driver: led_strip_driver_t_LED_STRIP_RMT,
            led_strip_rmt_cfg: rmt_cfg,
            ..Default::default()
        };

        let mut ind_cfg = led_indicator_config_t {
            mode: led_indicator_mode_t_LED_STRIPS_MODE,
            blink_lists: table.lists.as_mut_ptr(),
            blink_list_num: table.lists.len() as _,
            ..Default::default()
        };
        ind_cfg.__bindgen_anon_1.led_indicator_strips_config = &mut strips;

        // SAFETY: `table` is stored below for as long as the indicator lives.
        let handle = crate::ports::RawHandle::from_ptr(unsafe { led_indicator_create(&ind_cfg) })?;
        self.tables.push((handle.get(), table));
        Some(IndicatorHandle(handle))
    }

    fn delete(&mut self, indicator: IndicatorHandle) -> Result<(), EspCode> {
        let raw = indicator.0.get();
        // SAFETY: ownership of the handle ends here.
        super::esp_result(unsafe { led_indicator_delete(indicator.0.as_ptr()) })?;
        self.tables.retain(|(h, _)| *h != raw);
        Ok(())
    }
}

// ── Simulation ────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl LedIndicatorFactory {
    /// Indicators created and not yet deleted.
    pub fn live(&self) -> usize {
        self.players.len()
    }

    /// Run `list` on `indicator`, like `led_indicator_start`.
    pub fn start(&mut self, indicator: &IndicatorHandle, list: BlinkList) -> Result<(), EspCode> {
        let player = self.player(indicator)?;
        player.start(list.steps());
        Ok(())
    }

    /// Advance the simulated ring and return its brightness.
    pub fn tick(&mut self, indicator: &IndicatorHandle, delta_ms: u32) -> Result<u8, EspCode> {
        Ok(self.player(indicator)?.tick(delta_ms))
    }

    fn player(&mut self, indicator: &IndicatorHandle) -> Result<&mut BlinkPlayer, EspCode> {
        const ESP_ERR_INVALID_ARG: EspCode = 0x102;
        self.players
            .iter_mut()
            .find(|(h, _)| *h == indicator.0.get())
            .map(|(_, p)| p)
            .ok_or(ESP_ERR_INVALID_ARG)
    }
}

#[cfg(not(target_os = "espidf"))]
impl IndicatorFactory for LedIndicatorFactory {
    fn create(&mut self, cfg: &IndicatorConfig) -> Option<IndicatorHandle> {
        if cfg.blink_lists.is_empty() {
            return None;
        }
        let handle = super::sim::handle();
        log::info!(
            "indicator(sim): {} LEDs on GPIO{}, {} blink lists",
            cfg.strip.max_leds,
            cfg.strip.gpio,
            cfg.blink_lists.len()
        );
        self.players
            .push((handle.get(), BlinkPlayer::new(BlinkList::Off.steps())));
        Some(IndicatorHandle(handle))
    }

    fn delete(&mut self, indicator: IndicatorHandle) -> Result<(), EspCode> {
        self.players.retain(|(h, _)| *h != indicator.0.get());
        Ok(())
    }
}
