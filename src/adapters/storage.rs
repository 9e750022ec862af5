//! VFS mount backends: SPIFFS on the on-module flash, FAT on the uSD slot.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use std::ffi::CString;

use crate::config::{SdCardSettings, SpiffsSettings};
use crate::error::EspCode;
use crate::ports::{BackendKind, Capacity, CardHandle, MountBackend};

#[cfg(target_os = "espidf")]
fn c_string(s: &str) -> Result<CString, EspCode> {
    CString::new(s).map_err(|_| ESP_ERR_INVALID_ARG as EspCode)
}

// ── SPIFFS partition ──────────────────────────────────────────

pub struct SpiffsPartition {
    settings: SpiffsSettings,
    /// Label passed to the VFS, kept for info/unregister.
    #[cfg(target_os = "espidf")]
    label: Option<CString>,
    #[cfg(not(target_os = "espidf"))]
    mounted: bool,
}

impl SpiffsPartition {
    pub fn new(settings: SpiffsSettings) -> Self {
        Self {
            settings,
            #[cfg(target_os = "espidf")]
            label: None,
            #[cfg(not(target_os = "espidf"))]
            mounted: false,
        }
    }

    pub fn settings(&self) -> &SpiffsSettings {
        &self.settings
    }

    /// Simulation: whether the partition is registered with the VFS.
    #[cfg(not(target_os = "espidf"))]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

impl MountBackend for SpiffsPartition {
    type Handle = ();

    fn kind(&self) -> BackendKind {
        BackendKind::EmbeddedPartition
    }

    fn path(&self) -> &str {
        &self.settings.mount_point
    }

    #[cfg(target_os = "espidf")]
    fn mount(&mut self) -> Result<(), EspCode> {
        let base = c_string(&self.settings.mount_point)?;
        let label = c_string(&self.settings.partition_label)?;
        let conf = esp_vfs_spiffs_conf_t {
            base_path: base.as_ptr(),
            partition_label: label.as_ptr(),
            max_files: self.settings.max_files as _,
            format_if_mount_failed: SpiffsSettings::format_if_mount_failed(),
        };
        // SAFETY: the VFS copies base_path; the label is kept in `self`.
        super::esp_result(unsafe { esp_vfs_spiffs_register(&conf) })?;
        self.label = Some(label);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn capacity(&mut self, _handle: &()) -> Result<Capacity, EspCode> {
        let label = self.label.as_ref().ok_or(ESP_ERR_INVALID_STATE as EspCode)?;
        let mut total: usize = 0;
        let mut used: usize = 0;
        super::esp_result(unsafe { esp_spiffs_info(label.as_ptr(), &mut total, &mut used) })?;
        Ok(Capacity {
            total: total as u64,
            used: used as u64,
        })
    }

    #[cfg(target_os = "espidf")]
    fn unmount(&mut self, handle: ()) -> Result<(), (EspCode, ())> {
        let Some(label) = self.label.as_ref() else {
            return Err((ESP_ERR_INVALID_STATE as EspCode, handle));
        };
        super::esp_result(unsafe { esp_vfs_spiffs_unregister(label.as_ptr()) })
            .map_err(|rc| (rc, handle))?;
        self.label = None;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn mount(&mut self) -> Result<(), EspCode> {
        log::info!(
            "storage(sim): SPIFFS '{}' at {}",
            self.settings.partition_label,
            self.settings.mount_point
        );
        self.mounted = true;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn capacity(&mut self, _handle: &()) -> Result<Capacity, EspCode> {
        Ok(Capacity {
            total: 896 * 1024,
            used: 0,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn unmount(&mut self, _handle: ()) -> Result<(), (EspCode, ())> {
        self.mounted = false;
        Ok(())
    }
}

// ── SD card ───────────────────────────────────────────────────

pub struct SdCard {
    settings: SdCardSettings,
    #[cfg(target_os = "espidf")]
    base: Option<CString>,
}

impl SdCard {
    pub fn new(settings: SdCardSettings) -> Self {
        Self {
            settings,
            #[cfg(target_os = "espidf")]
            base: None,
        }
    }

    pub fn settings(&self) -> &SdCardSettings {
        &self.settings
    }
}

/// `SDMMC_HOST_DEFAULT()` for slot 1.
#[cfg(target_os = "espidf")]
fn sdmmc_host() -> sdmmc_host_t {
    let mut host = sdmmc_host_t {
        flags: SDMMC_HOST_FLAG_1BIT
            | SDMMC_HOST_FLAG_4BIT
            | SDMMC_HOST_FLAG_8BIT
            | SDMMC_HOST_FLAG_DDR,
        slot: SDMMC_HOST_SLOT_1 as _,
        max_freq_khz: SDMMC_FREQ_DEFAULT as _,
        io_voltage: 3.3,
        init: Some(sdmmc_host_init),
        set_bus_width: Some(sdmmc_host_set_bus_width),
        get_bus_width: Some(sdmmc_host_get_slot_width),
        set_bus_ddr_mode: Some(sdmmc_host_set_bus_ddr_mode),
        set_card_clk: Some(sdmmc_host_set_card_clk),
        set_cclk_always_on: Some(sdmmc_host_set_cclk_always_on),
        do_transaction: Some(sdmmc_host_do_transaction),
        io_int_enable: Some(sdmmc_host_io_int_enable),
        io_int_wait: Some(sdmmc_host_io_int_wait),
        ..Default::default()
    };
    host.__bindgen_anon_1.deinit = Some(sdmmc_host_deinit);
    host
}

/// 1-bit slot on the board's CLK/CMD/D0 lines, no card-detect or write-protect.
#[cfg(target_os = "espidf")]
fn sdmmc_slot() -> sdmmc_slot_config_t {
    use crate::pins;

    let mut slot = sdmmc_slot_config_t {
        width: 1,
        clk: pins::SD_CLK_GPIO,
        cmd: pins::SD_CMD_GPIO,
        d0: pins::SD_D0_GPIO,
        d1: -1,
        d2: -1,
        d3: -1,
        d4: -1,
        d5: -1,
        d6: -1,
        d7: -1,
        ..Default::default()
    };
    slot.__bindgen_anon_1.cd = -1;
    slot.__bindgen_anon_2.wp = -1;
    slot
}

impl MountBackend for SdCard {
    type Handle = CardHandle;

    fn kind(&self) -> BackendKind {
        BackendKind::RemovableCard
    }

    fn path(&self) -> &str {
        &self.settings.mount_point
    }

    #[cfg(target_os = "espidf")]
    fn mount(&mut self) -> Result<CardHandle, EspCode> {
        let base = c_string(&self.settings.mount_point)?;
        let mount_cfg = esp_vfs_fat_sdmmc_mount_config_t {
            format_if_mount_failed: SdCardSettings::format_if_mount_failed(),
            max_files: self.settings.max_files as _,
            allocation_unit_size: self.settings.allocation_unit_size as _,
            ..Default::default()
        };
        let host = sdmmc_host();
        let slot = sdmmc_slot();
        let mut card: *mut sdmmc_card_t = core::ptr::null_mut();
        // SAFETY: host/slot/config are read during the call; `card` is
        // written on success and freed by esp_vfs_fat_sdcard_unmount.
        super::esp_result(unsafe {
            esp_vfs_fat_sdmmc_mount(
                base.as_ptr(),
                &host,
                (&slot as *const sdmmc_slot_config_t).cast(),
                &mount_cfg,
                &mut card,
            )
        })?;
        let handle = crate::ports::RawHandle::from_ptr(card).ok_or(ESP_FAIL as EspCode)?;
        self.base = Some(base);
        Ok(CardHandle(handle))
    }

    #[cfg(target_os = "espidf")]
    fn capacity(&mut self, _card: &CardHandle) -> Result<Capacity, EspCode> {
        let base = self.base.as_ref().ok_or(ESP_ERR_INVALID_STATE as EspCode)?;
        let mut total: u64 = 0;
        let mut free: u64 = 0;
        super::esp_result(unsafe { esp_vfs_fat_info(base.as_ptr(), &mut total, &mut free) })?;
        Ok(Capacity {
            total,
            used: total.saturating_sub(free),
        })
    }

    #[cfg(target_os = "espidf")]
    fn unmount(&mut self, card: CardHandle) -> Result<(), (EspCode, CardHandle)> {
        let Some(base) = self.base.as_ref() else {
            return Err((ESP_ERR_INVALID_STATE as EspCode, card));
        };
        super::esp_result(unsafe { esp_vfs_fat_sdcard_unmount(base.as_ptr(), card.0.as_ptr()) })
            .map_err(|rc| (rc, card))?;
        self.base = None;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn mount(&mut self) -> Result<CardHandle, EspCode> {
        log::info!(
            "storage(sim): SD card at {} (AU {} B)",
            self.settings.mount_point,
            self.settings.allocation_unit_size
        );
        Ok(CardHandle(super::sim::handle()))
    }

    #[cfg(not(target_os = "espidf"))]
    fn capacity(&mut self, _card: &CardHandle) -> Result<Capacity, EspCode> {
        Ok(Capacity {
            total: 8 * 1024 * 1024 * 1024,
            used: 0,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn unmount(&mut self, _card: CardHandle) -> Result<(), (EspCode, CardHandle)> {
        Ok(())
    }
}
