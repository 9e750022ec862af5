//! Unified error types for board bring-up.
//!
//! A single `BspError` enum that every composer converts into, so the
//! caller of any bring-up operation handles one type.  All variants are
//! `Copy`; raw driver return codes are carried as `i32` (`esp_err_t`).

use core::fmt;

use crate::ports::BackendKind;

/// Raw `esp_err_t` value returned by an ESP-IDF driver call.
pub type EspCode = i32;

// ---------------------------------------------------------------------------
// Top-level bring-up error
// ---------------------------------------------------------------------------

/// Every fallible bring-up operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BspError {
    /// Bus or parameter setup failed. Not retryable.
    Config(ConfigError),
    /// The caller passed an argument that cannot work; no hardware touched.
    Arg(ArgError),
    /// A driver returned an invalid handle; composition was unwound.
    Device(DeviceError),
    /// A filesystem mount or unmount failed.
    Mount(MountError),
}

impl fmt::Display for BspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Arg(e) => write!(f, "argument: {e}"),
            Self::Device(e) => write!(f, "device: {e}"),
            Self::Mount(e) => write!(f, "mount: {e}"),
        }
    }
}

impl core::error::Error for BspError {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Applying bus parameters was rejected by the driver.
    ParamRejected(EspCode),
    /// Installing the bus driver failed.
    InstallFailed(EspCode),
    /// Deleting the bus driver failed; the bus is still initialized.
    TeardownFailed(EspCode),
    /// Teardown requested on a bus that was never brought up.
    NotInitialized,
    /// The streaming (I2S) subsystem could not be brought up.
    StreamInitFailed(EspCode),
    /// A board configuration field is out of range.
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParamRejected(rc) => write!(f, "bus parameters rejected (rc={rc})"),
            Self::InstallFailed(rc) => write!(f, "bus driver install failed (rc={rc})"),
            Self::TeardownFailed(rc) => write!(f, "bus driver delete failed (rc={rc})"),
            Self::NotInitialized => write!(f, "bus not initialized"),
            Self::StreamInitFailed(rc) => write!(f, "streaming init failed (rc={rc})"),
            Self::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl From<ConfigError> for BspError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Argument errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgError {
    /// The destination array cannot hold every logical device.
    InsufficientCapacity { required: usize, given: usize },
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientCapacity { required, given } => {
                write!(f, "capacity {given} is below the required {required}")
            }
        }
    }
}

impl From<ArgError> for BspError {
    fn from(e: ArgError) -> Self {
        Self::Arg(e)
    }
}

// ---------------------------------------------------------------------------
// Device construction errors
// ---------------------------------------------------------------------------

/// Names the construction stage that returned an invalid handle, or the
/// device whose teardown the driver refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    ControlInterface,
    GpioInterface,
    Codec,
    CodecDevice,
    /// Button at this table index could not be created.
    Button(usize),
    Indicator,
    /// `iot_button_delete` failed; the driver code is passed through.
    ButtonDelete(EspCode),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ControlInterface => write!(f, "codec control interface unavailable"),
            Self::GpioInterface => write!(f, "codec GPIO interface unavailable"),
            Self::Codec => write!(f, "codec driver unavailable"),
            Self::CodecDevice => write!(f, "codec device unavailable"),
            Self::Button(i) => write!(f, "button {i} could not be created"),
            Self::Indicator => write!(f, "LED indicator could not be created"),
            Self::ButtonDelete(rc) => write!(f, "button delete failed (rc={rc})"),
        }
    }
}

impl From<DeviceError> for BspError {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

// ---------------------------------------------------------------------------
// Mount errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountError {
    /// The backend refused to mount; the driver code is passed through.
    Mount { kind: BackendKind, code: EspCode },
    /// The backend refused to unmount; the filesystem stays mounted.
    Unmount { kind: BackendKind, code: EspCode },
    AlreadyMounted(BackendKind),
    NotMounted(BackendKind),
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mount { kind, code } => write!(f, "{kind} mount failed (rc={code})"),
            Self::Unmount { kind, code } => write!(f, "{kind} unmount failed (rc={code})"),
            Self::AlreadyMounted(kind) => write!(f, "{kind} already mounted"),
            Self::NotMounted(kind) => write!(f, "{kind} not mounted"),
        }
    }
}

impl From<MountError> for BspError {
    fn from(e: MountError) -> Self {
        Self::Mount(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, BspError>;
