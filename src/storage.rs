//! Filesystem mount manager.
//!
//! Wraps one [`MountBackend`] (SPIFFS partition or SD card) behind a
//! checked mount/unmount contract:
//!
//! - a backend is mounted at most once (`AlreadyMounted` otherwise);
//! - unmount needs a successful mount first (`NotMounted` otherwise);
//! - the backend handle exists only while mounted.
//!
//! Capacity is queried and logged after every successful mount.  A failed
//! query is logged and otherwise ignored.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{error, info, warn};

use crate::config::PATH_CAP;
use crate::error::MountError;
use crate::ports::{BackendKind, MountBackend};

/// Where a backend is mounted and the handle it produced.
#[derive(Debug)]
pub struct MountPoint<H> {
    pub kind: BackendKind,
    pub path: heapless::String<PATH_CAP>,
    handle: Option<H>,
}

impl<H> MountPoint<H> {
    pub fn is_mounted(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }
}

struct Inner<B: MountBackend> {
    backend: B,
    point: MountPoint<B::Handle>,
}

pub struct MountManager<B: MountBackend> {
    inner: Mutex<Inner<B>>,
}

impl<B: MountBackend> MountManager<B> {
    pub fn new(backend: B) -> Self {
        let mut path = heapless::String::new();
        if path.push_str(backend.path()).is_err() {
            warn!("storage: mount path '{}' truncated", backend.path());
        }
        let point = MountPoint {
            kind: backend.kind(),
            path,
            handle: None,
        };
        Self {
            inner: Mutex::new(Inner { backend, point }),
        }
    }

    pub fn mount(&self) -> Result<(), MountError> {
        let mut guard = self.lock();
        let Inner { backend, point } = &mut *guard;
        if point.is_mounted() {
            return Err(MountError::AlreadyMounted(point.kind));
        }

        let handle = backend.mount().map_err(|code| {
            error!("storage: {} mount at {} failed (rc={})", point.kind, point.path, code);
            MountError::Mount {
                kind: point.kind,
                code,
            }
        })?;

        match backend.capacity(&handle) {
            Ok(cap) => info!(
                "storage: {} mounted at {}, total: {}, used: {}",
                point.kind, point.path, cap.total, cap.used
            ),
            Err(rc) => error!(
                "storage: {} mounted at {}, failed to get capacity (rc={})",
                point.kind, point.path, rc
            ),
        }

        point.handle = Some(handle);
        Ok(())
    }

    pub fn unmount(&self) -> Result<(), MountError> {
        let mut guard = self.lock();
        let Inner { backend, point } = &mut *guard;
        let Some(handle) = point.handle.take() else {
            return Err(MountError::NotMounted(point.kind));
        };

        match backend.unmount(handle) {
            Ok(()) => {
                info!("storage: {} unmounted from {}", point.kind, point.path);
                Ok(())
            }
            Err((code, handle)) => {
                point.handle = Some(handle);
                error!("storage: {} unmount failed (rc={})", point.kind, code);
                Err(MountError::Unmount {
                    kind: point.kind,
                    code,
                })
            }
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.lock().point.is_mounted()
    }

    pub fn kind(&self) -> BackendKind {
        self.lock().point.kind
    }

    pub fn into_backend(self) -> B {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .backend
    }

    fn lock(&self) -> MutexGuard<'_, Inner<B>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
