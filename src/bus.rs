//! Shared bus manager.
//!
//! Tracks whether a shared bus (the I²C control bus, the ADC1 one-shot
//! unit) has been brought up, so every device that depends on it can call
//! [`SharedBus::acquire`] without double-installing the driver.
//!
//! The flag and the driver live behind one mutex: the check-then-act in
//! `acquire`/`release` is a single critical section.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{info, warn};

use crate::error::ConfigError;
use crate::ports::{BusDriver, RawHandle};

/// Initialization state of one physical bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusState {
    pub initialized: bool,
}

struct Inner<D> {
    driver: D,
    state: BusState,
}

pub struct SharedBus<D> {
    name: &'static str,
    inner: Mutex<Inner<D>>,
}

impl<D: BusDriver> SharedBus<D> {
    pub fn new(name: &'static str, driver: D) -> Self {
        Self {
            name,
            inner: Mutex::new(Inner {
                driver,
                state: BusState::default(),
            }),
        }
    }

    /// Bring the bus up unless it already is. Idempotent.
    pub fn acquire(&self) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        if inner.state.initialized {
            return Ok(());
        }

        inner.driver.configure().map_err(|rc| {
            warn!("{}: parameter config failed (rc={})", self.name, rc);
            ConfigError::ParamRejected(rc)
        })?;
        inner.driver.install().map_err(|rc| {
            warn!("{}: driver install failed (rc={})", self.name, rc);
            ConfigError::InstallFailed(rc)
        })?;

        inner.state.initialized = true;
        info!("{}: initialized", self.name);
        Ok(())
    }

    /// Tear the bus down.
    ///
    /// A bus that was never acquired yields [`ConfigError::NotInitialized`]
    /// and the driver is not touched.  If the driver refuses to delete, the
    /// bus stays initialized.
    pub fn release(&self) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        if !inner.state.initialized {
            return Err(ConfigError::NotInitialized);
        }

        inner.driver.delete().map_err(|rc| {
            warn!("{}: driver delete failed (rc={}), bus left up", self.name, rc);
            ConfigError::TeardownFailed(rc)
        })?;

        inner.state.initialized = false;
        info!("{}: released", self.name);
        Ok(())
    }

    pub fn state(&self) -> BusState {
        self.lock().state
    }

    pub fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    /// Driver unit handle, present only while the bus is up.
    pub fn handle(&self) -> Option<RawHandle> {
        let inner = self.lock();
        if inner.state.initialized {
            inner.driver.handle()
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Hand the driver back, e.g. to inspect a simulation after a test.
    pub fn into_driver(self) -> D {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .driver
    }

    // A panic inside a driver call leaves the state consistent: the flag is
    // only written after the call returns.
    fn lock(&self) -> MutexGuard<'_, Inner<D>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
