//! Board configuration parameters
//!
//! Tunables for bus clocks and filesystem mounts. Defaults match the
//! board's stock sdkconfig.  A JSON override can be supplied at build time
//! through the `KORVO_BSP_CONFIG` environment variable (see
//! [`BoardConfig::build_time`]).
//! Format-on-fail is a compile-time choice (cargo features), not a field.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Mount path / label capacity.
pub const PATH_CAP: usize = 16;

/// Longest mount point the VFS accepts (`ESP_VFS_PATH_MAX`).
pub const MOUNT_PATH_MAX: usize = 15;

/// JSON board config captured from the build environment, if any.
pub const BUILD_OVERRIDE: Option<&str> = option_env!("KORVO_BSP_CONFIG");

/// Core board configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// I²C control bus clock in Hz
    pub i2c_clk_speed_hz: u32,
    pub spiffs: SpiffsSettings,
    pub sdcard: SdCardSettings,
}

/// SPIFFS partition mount settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiffsSettings {
    pub mount_point: String<PATH_CAP>,
    pub partition_label: String<PATH_CAP>,
    /// Maximum simultaneously open files
    pub max_files: u8,
}

/// uSD card mount settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdCardSettings {
    pub mount_point: String<PATH_CAP>,
    pub max_files: u8,
    /// FAT allocation unit in bytes (power of two, sector multiple)
    pub allocation_unit_size: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            i2c_clk_speed_hz: 400_000,
            spiffs: SpiffsSettings::default(),
            sdcard: SdCardSettings::default(),
        }
    }
}

impl Default for SpiffsSettings {
    fn default() -> Self {
        Self {
            mount_point: fixed("/spiffs"),
            partition_label: fixed("storage"),
            max_files: 5,
        }
    }
}

impl Default for SdCardSettings {
    fn default() -> Self {
        Self {
            mount_point: fixed("/sdcard"),
            max_files: 5,
            allocation_unit_size: 16 * 1024,
        }
    }
}

impl SpiffsSettings {
    pub const fn format_if_mount_failed() -> bool {
        cfg!(feature = "spiffs-format-on-fail")
    }
}

impl SdCardSettings {
    pub const fn format_if_mount_failed() -> bool {
        cfg!(feature = "sd-format-on-fail")
    }
}

impl BoardConfig {
    /// The config this firmware was built with: the `KORVO_BSP_CONFIG`
    /// override when it was set at compile time, the defaults otherwise.
    pub fn build_time() -> Result<Self, ConfigError> {
        Self::from_override(BUILD_OVERRIDE)
    }

    /// Validated override, or the defaults when there is none.
    pub fn from_override(json: Option<&str>) -> Result<Self, ConfigError> {
        match json {
            Some(json) => Self::from_json(json),
            None => Ok(Self::default()),
        }
    }

    /// Parse a JSON override and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|_| ConfigError::Invalid("board config is not valid JSON"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(10_000..=1_000_000).contains(&self.i2c_clk_speed_hz) {
            return Err(ConfigError::Invalid("i2c_clk_speed_hz must be 10 kHz–1 MHz"));
        }
        if !is_mount_path(&self.spiffs.mount_point) {
            return Err(ConfigError::Invalid(
                "spiffs.mount_point must be '/' plus 1-14 characters",
            ));
        }
        if self.spiffs.partition_label.is_empty() {
            return Err(ConfigError::Invalid("spiffs.partition_label must not be empty"));
        }
        if self.spiffs.max_files == 0 {
            return Err(ConfigError::Invalid("spiffs.max_files must be at least 1"));
        }
        if !is_mount_path(&self.sdcard.mount_point) {
            return Err(ConfigError::Invalid(
                "sdcard.mount_point must be '/' plus 1-14 characters",
            ));
        }
        if self.sdcard.mount_point == self.spiffs.mount_point {
            return Err(ConfigError::Invalid("sdcard and spiffs mount points must differ"));
        }
        if self.sdcard.max_files == 0 {
            return Err(ConfigError::Invalid("sdcard.max_files must be at least 1"));
        }
        let unit = self.sdcard.allocation_unit_size;
        if !unit.is_power_of_two() || unit < 512 {
            return Err(ConfigError::Invalid(
                "sdcard.allocation_unit_size must be a power of two >= 512",
            ));
        }
        Ok(())
    }
}

fn is_mount_path(path: &str) -> bool {
    (2..=MOUNT_PATH_MAX).contains(&path.len()) && path.starts_with('/')
}

fn fixed(s: &str) -> String<PATH_CAP> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
