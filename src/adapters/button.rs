//! iot_button ADC buttons.
//!
//! Each ladder button is its own iot_button object reading the shared
//! ADC1 one-shot unit; the unit handle is passed in so the component does
//! not create a second one.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::error::EspCode;
use crate::ports::{AdcButtonConfig, ButtonFactory, ButtonHandle};

pub struct IotButtonFactory {
    #[cfg(not(target_os = "espidf"))]
    live: usize,
}

impl Default for IotButtonFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl IotButtonFactory {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            live: 0,
        }
    }

    /// Simulation: buttons created and not yet deleted.
    #[cfg(not(target_os = "espidf"))]
    pub fn live(&self) -> usize {
        self.live
    }
}

#[cfg(target_os = "espidf")]
impl ButtonFactory for IotButtonFactory {
    fn create_adc_button(&mut self, cfg: &AdcButtonConfig) -> Option<ButtonHandle> {
        let mut unit: adc_oneshot_unit_handle_t = match cfg.adc_unit {
            Some(h) => h.as_ptr(),
            None => core::ptr::null_mut(),
        };
        let mut btn_cfg = button_config_t {
            type_: button_type_t_BUTTON_TYPE_ADC,
            ..Default::default()
        };
        btn_cfg.__bindgen_anon_1.adc_button_config = button_adc_config_t {
            adc_channel: cfg.channel as _,
            button_index: cfg.button_index as _,
            min: cfg.min_mv,
            max: cfg.max_mv,
            adc_handle: if cfg.adc_unit.is_some() {
                &mut unit
            } else {
                core::ptr::null_mut()
            },
            ..Default::default()
        };
        // SAFETY: `unit` outlives the call; the component copies the handle.
        crate::ports::RawHandle::from_ptr(unsafe { iot_button_create(&btn_cfg) }).map(ButtonHandle)
    }

    fn delete_button(&mut self, button: ButtonHandle) -> Result<(), EspCode> {
        // SAFETY: ownership of the handle ends here.
        super::esp_result(unsafe { iot_button_delete(button.0.as_ptr()) })
    }
}

#[cfg(not(target_os = "espidf"))]
impl ButtonFactory for IotButtonFactory {
    fn create_adc_button(&mut self, cfg: &AdcButtonConfig) -> Option<ButtonHandle> {
        log::info!(
            "button(sim): #{} on ADC ch{} [{}, {}] mV",
            cfg.button_index,
            cfg.channel,
            cfg.min_mv,
            cfg.max_mv
        );
        self.live += 1;
        Some(ButtonHandle(super::sim::handle()))
    }

    fn delete_button(&mut self, _button: ButtonHandle) -> Result<(), EspCode> {
        self.live = self.live.saturating_sub(1);
        Ok(())
    }
}
