// SPDX-License-Identifier: GPL-3.0-only

//! Camera session manager
//!
//! The manager provides:
//! - Exclusive ownership of the one camera device the booth may hold
//! - Idempotent start/stop
//! - Guaranteed release when the last handle is dropped
//! - View queries that never wait on a device that is still opening

use super::types::*;
use super::{CameraBackend, select_preview_format, select_user_facing};
use crate::errors::CameraError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use tracing::{info, warn};

/// Internal manager state
struct SessionState {
    /// The backend that owns the device while a session is active
    backend: Box<dyn CameraBackend>,
    /// Device path to try before falling back to location ranking
    preferred_path: Option<String>,
}

impl Drop for SessionState {
    fn drop(&mut self) {
        if self.backend.is_initialized() {
            info!("Releasing camera on teardown");
            if let Err(e) = self.backend.shutdown() {
                warn!(error = %e, "Failed to release camera on teardown");
            }
        }
    }
}

/// Camera session manager
///
/// Cheap to clone; all clones share the same session. The device is
/// released by `stop()` or, at the latest, when the last clone is dropped.
#[derive(Clone)]
pub struct CameraSessionManager {
    state: Arc<Mutex<SessionState>>,
    /// Last observed activity, answered while the session lock is busy
    active: Arc<AtomicBool>,
}

impl CameraSessionManager {
    /// Create a new session manager around a backend
    pub fn new(backend: Box<dyn CameraBackend>) -> Self {
        info!(backend = %backend.backend_type(), "Creating camera session manager");

        Self {
            state: Arc::new(Mutex::new(SessionState {
                backend,
                preferred_path: None,
            })),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Prefer a specific device path when starting
    pub fn with_preferred_device(self, path: Option<String>) -> Self {
        self.lock().preferred_path = path;
        self
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a read-only query, or return `busy` while another caller holds
    /// the session (e.g. a slow device open)
    fn try_view<T>(&self, busy: T, query: impl FnOnce(&SessionState) -> T) -> T {
        match self.state.try_lock() {
            Ok(state) => query(&state),
            Err(TryLockError::Poisoned(poisoned)) => query(&poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => busy,
        }
    }

    /// Get the backend type
    pub fn backend_type(&self) -> CameraBackendType {
        self.lock().backend.backend_type()
    }

    /// Enumerate available cameras
    pub fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        self.lock().backend.enumerate_cameras()
    }

    /// Get supported formats for a camera
    pub fn get_formats(&self, device: &CameraDevice) -> Vec<CameraFormat> {
        self.lock().backend.get_formats(device)
    }

    /// Acquire the user-facing camera and start streaming
    ///
    /// Starting an already active session is a no-op that reports the
    /// current format, so at most one device handle is ever held.
    /// On failure the session stays inactive.
    pub fn start(&self) -> Result<CameraFormat, CameraError> {
        let mut state = self.lock();

        if state.backend.is_initialized()
            && let Some(format) = state.backend.current_format()
        {
            info!("Camera already active");
            return Ok(format.clone());
        }

        let cameras = state.backend.enumerate_cameras();
        let device = select_user_facing(&cameras, state.preferred_path.as_deref())
            .cloned()
            .ok_or(CameraError::NoCameraFound)?;

        let formats = state.backend.get_formats(&device);
        let format = select_preview_format(&formats).ok_or_else(|| {
            CameraError::InitializationFailed(format!(
                "No usable formats for camera: {}",
                device.name
            ))
        })?;

        info!(device = %device.name, format = %format, "Starting camera session");
        let started = state.backend.initialize(&device, &format);
        self.active.store(state.backend.is_initialized(), Ordering::SeqCst);
        started?;

        Ok(state
            .backend
            .current_format()
            .cloned()
            .unwrap_or(format))
    }

    /// Halt all streams and release the device
    ///
    /// Returns whether a device was actually released; calling this with
    /// no active session is a no-op.
    pub fn stop(&self) -> bool {
        let mut state = self.lock();
        if !state.backend.is_initialized() {
            return false;
        }

        info!("Stopping camera session");
        if let Err(e) = state.backend.shutdown() {
            warn!(error = %e, "Camera shutdown reported an error");
        }
        self.active.store(false, Ordering::SeqCst);
        true
    }

    /// Check if a session is active
    ///
    /// While the session is busy this reports the last known state.
    pub fn is_active(&self) -> bool {
        let last = self.active.load(Ordering::SeqCst);
        let active = self.try_view(last, |state| state.backend.is_initialized());
        self.active.store(active, Ordering::SeqCst);
        active
    }

    /// Grab the newest frame for still capture
    pub fn capture_frame(&self) -> Result<CameraFrame, CameraError> {
        let state = self.lock();
        if !state.backend.is_initialized() {
            return Err(CameraError::NotActive);
        }
        Ok(state.backend.capture_photo()?)
    }

    /// Newest frame for live preview (None while inactive or busy)
    pub fn preview_frame(&self) -> Option<CameraFrame> {
        self.try_view(None, |state| state.backend.preview_frame())
    }

    /// Get current device
    pub fn current_device(&self) -> Option<CameraDevice> {
        self.lock().backend.current_device().cloned()
    }

    /// Get current format
    pub fn current_format(&self) -> Option<CameraFormat> {
        self.lock().backend.current_format().cloned()
    }
}

impl std::fmt::Debug for CameraSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("CameraSessionManager")
            .field("backend_type", &state.backend.backend_type())
            .field("active", &state.backend.is_initialized())
            .finish()
    }
}
