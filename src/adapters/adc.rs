//! ADC1 one-shot unit, shared by every ladder button.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::error::EspCode;
use crate::ports::{BusDriver, RawHandle};

pub struct AdcOneshotUnit {
    handle: Option<RawHandle>,
}

impl Default for AdcOneshotUnit {
    fn default() -> Self {
        Self::new()
    }
}

impl AdcOneshotUnit {
    pub fn new() -> Self {
        Self { handle: None }
    }
}

#[cfg(target_os = "espidf")]
impl BusDriver for AdcOneshotUnit {
    fn configure(&mut self) -> Result<(), EspCode> {
        // Channel attenuation is configured per button by iot_button.
        Ok(())
    }

    fn install(&mut self) -> Result<(), EspCode> {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut unit: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: `unit` is written by the driver on success only.
        super::esp_result(unsafe { adc_oneshot_new_unit(&init_cfg, &mut unit) })?;
        self.handle = RawHandle::from_ptr(unit);
        Ok(())
    }

    fn delete(&mut self) -> Result<(), EspCode> {
        let Some(handle) = self.handle else {
            return Ok(());
        };
        // SAFETY: handle came from adc_oneshot_new_unit and is deleted once.
        super::esp_result(unsafe { adc_oneshot_del_unit(handle.as_ptr()) })?;
        self.handle = None;
        Ok(())
    }

    fn handle(&self) -> Option<RawHandle> {
        self.handle
    }
}

#[cfg(not(target_os = "espidf"))]
impl BusDriver for AdcOneshotUnit {
    fn configure(&mut self) -> Result<(), EspCode> {
        Ok(())
    }

    fn install(&mut self) -> Result<(), EspCode> {
        log::info!("adc(sim): ADC1 one-shot unit");
        self.handle = Some(super::sim::handle());
        Ok(())
    }

    fn delete(&mut self) -> Result<(), EspCode> {
        self.handle = None;
        Ok(())
    }

    fn handle(&self) -> Option<RawHandle> {
        self.handle
    }
}
