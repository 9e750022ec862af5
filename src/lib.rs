//! ESP32-S3-Korvo-1 board support.
//!
//! Brings up the shared buses and composes the board's devices (codec
//! endpoints, ADC buttons, LED ring, filesystems) from the ESP-IDF driver
//! components.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` inside the adapters; on the host they
//! simulate the hardware so the composition logic can be tested.

#![deny(unused_must_use)]

pub mod adapters;
pub mod audio;
pub mod board;
pub mod buttons;
pub mod bus;
pub mod config;
pub mod error;
pub mod indicator;
pub mod pins;
pub mod ports;
pub mod storage;

pub use adapters::{korvo_board, KorvoBoard};
pub use board::{Board, BoardParts, BoardPorts};
pub use config::BoardConfig;
pub use error::{BspError, Result};
