//! I²C control bus driver (legacy master API).
//!
//! On ESP-IDF: `i2c_param_config` + `i2c_driver_install` on port 0 with
//! internal pull-ups.  On host/test: records installs in memory.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::error::EspCode;
use crate::pins;
use crate::ports::BusDriver;

pub struct I2cControlBus {
    port: i32,
    sda: i32,
    scl: i32,
    clk_speed_hz: u32,
    #[cfg(not(target_os = "espidf"))]
    installed: bool,
    #[cfg(not(target_os = "espidf"))]
    installs: u32,
}

impl I2cControlBus {
    pub fn new(clk_speed_hz: u32) -> Self {
        Self {
            port: pins::I2C_PORT,
            sda: pins::I2C_SDA_GPIO,
            scl: pins::I2C_SCL_GPIO,
            clk_speed_hz,
            #[cfg(not(target_os = "espidf"))]
            installed: false,
            #[cfg(not(target_os = "espidf"))]
            installs: 0,
        }
    }

    pub fn clk_speed_hz(&self) -> u32 {
        self.clk_speed_hz
    }

    /// Simulation: whether the driver is currently installed.
    #[cfg(not(target_os = "espidf"))]
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Simulation: how many times the driver was installed.
    #[cfg(not(target_os = "espidf"))]
    pub fn installs(&self) -> u32 {
        self.installs
    }
}

#[cfg(target_os = "espidf")]
impl BusDriver for I2cControlBus {
    fn configure(&mut self) -> Result<(), EspCode> {
        let mut conf = i2c_config_t {
            mode: i2c_mode_t_I2C_MODE_MASTER,
            sda_io_num: self.sda,
            sda_pullup_en: true,
            scl_io_num: self.scl,
            scl_pullup_en: true,
            ..Default::default()
        };
        conf.__bindgen_anon_1.master.clk_speed = self.clk_speed_hz;
        // SAFETY: `conf` outlives the call; the driver copies it.
        super::esp_result(unsafe { i2c_param_config(self.port, &conf) })
    }

    fn install(&mut self) -> Result<(), EspCode> {
        // SAFETY: master mode, no slave buffers, default interrupt flags.
        super::esp_result(unsafe {
            i2c_driver_install(self.port, i2c_mode_t_I2C_MODE_MASTER, 0, 0, 0)
        })
    }

    fn delete(&mut self) -> Result<(), EspCode> {
        // SAFETY: only reached while the driver is installed (SharedBus state).
        super::esp_result(unsafe { i2c_driver_delete(self.port) })
    }
}

#[cfg(not(target_os = "espidf"))]
impl BusDriver for I2cControlBus {
    fn configure(&mut self) -> Result<(), EspCode> {
        log::info!(
            "i2c(sim): port {} sda={} scl={} @ {} Hz",
            self.port,
            self.sda,
            self.scl,
            self.clk_speed_hz
        );
        Ok(())
    }

    fn install(&mut self) -> Result<(), EspCode> {
        self.installed = true;
        self.installs += 1;
        Ok(())
    }

    fn delete(&mut self) -> Result<(), EspCode> {
        self.installed = false;
        Ok(())
    }
}
