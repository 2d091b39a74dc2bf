// SPDX-License-Identifier: GPL-3.0-only

//! Direct V4L2 webcam capture
//!
//! Uses the v4l crate to open `/dev/video*` nodes and stream memory-mapped
//! buffers on a dedicated thread. Only the newest frame is kept; the booth
//! never needs a history.

use super::types::*;
use super::CameraBackend;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{SyncSender, sync_channel};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use v4l::buffer::Type;
use v4l::framesize::FrameSizeEnum;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;

/// Most recent frame, shared between the capture thread and the backend
type LatestFrame = Arc<Mutex<Option<CameraFrame>>>;

/// Lets the capture thread report whether its stream came up
type StartSignal = SyncSender<Result<(), String>>;

/// Consecutive dequeue failures before the device is considered gone
const MAX_STREAM_ERRORS: u32 = 50;

/// Pause between dequeue attempts after a failure
const STREAM_RETRY_DELAY: Duration = Duration::from_millis(20);

/// V4L2 camera backend
pub struct V4l2Backend {
    device: Option<CameraDevice>,
    format: Option<CameraFormat>,
    latest: LatestFrame,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl V4l2Backend {
    pub fn new() -> Self {
        Self {
            device: None,
            format: None,
            latest: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }
}

impl Default for V4l2Backend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for V4l2Backend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        let mut cameras = Vec::new();

        for node in v4l::context::enum_devices() {
            let path = node.path().to_string_lossy().to_string();
            let dev = match Device::with_path(&path) {
                Ok(dev) => dev,
                Err(e) => {
                    debug!(path = %path, error = %e, "Skipping V4L2 node");
                    continue;
                }
            };
            let Ok(caps) = dev.query_caps() else {
                continue;
            };
            if !caps
                .capabilities
                .contains(v4l::capability::Flags::VIDEO_CAPTURE)
            {
                continue;
            }
            // Metadata nodes report capture capability but expose no formats
            if dev.enum_formats().map(|f| f.is_empty()).unwrap_or(true) {
                continue;
            }

            cameras.push(CameraDevice {
                name: node.name().unwrap_or_else(|| caps.card.clone()),
                path,
                location: sysfs_location(&path),
                driver: Some(caps.driver.clone()),
            });
        }

        info!(count = cameras.len(), "Enumerated V4L2 cameras");
        cameras
    }

    fn get_formats(&self, device: &CameraDevice) -> Vec<CameraFormat> {
        let Ok(dev) = Device::with_path(&device.path) else {
            return Vec::new();
        };

        let mut formats = Vec::new();
        for desc in dev.enum_formats().unwrap_or_default() {
            let Ok(code) = desc.fourcc.str() else {
                continue;
            };
            if PixelFormat::from_fourcc(code).is_none() {
                continue;
            }
            for size in dev.enum_framesizes(desc.fourcc).unwrap_or_default() {
                if let FrameSizeEnum::Discrete(discrete) = size.size {
                    formats.push(CameraFormat {
                        width: discrete.width,
                        height: discrete.height,
                        framerate: None,
                        pixel_format: code.to_string(),
                    });
                }
            }
        }

        debug!(device = %device.name, count = formats.len(), "Queried V4L2 formats");
        formats
    }

    fn initialize(&mut self, device: &CameraDevice, format: &CameraFormat) -> BackendResult<()> {
        if self.thread_handle.is_some() {
            self.shutdown()?;
        }

        let pixel_format = PixelFormat::from_fourcc(&format.pixel_format)
            .ok_or_else(|| BackendError::FormatNotSupported(format.pixel_format.clone()))?;

        info!(device = %device.path, format = %format, "Opening V4L2 device");

        // Open and configure synchronously so permission and format errors
        // reach the caller instead of dying on the capture thread
        let mut dev = Device::with_path(&device.path)?;
        let mut fmt = dev.format()?;
        fmt.width = format.width;
        fmt.height = format.height;
        fmt.fourcc = v4l::FourCC::new(
            pixel_format
                .fourcc()
                .as_bytes()
                .try_into()
                .map_err(|_| BackendError::FormatNotSupported(format.pixel_format.clone()))?,
        );
        let negotiated = dev.set_format(&fmt)?;

        let negotiated_format = negotiated
            .fourcc
            .str()
            .ok()
            .and_then(PixelFormat::from_fourcc)
            .ok_or_else(|| {
                BackendError::FormatNotSupported(format!("{:?}", negotiated.fourcc))
            })?;
        if negotiated_format != pixel_format {
            warn!(
                requested = ?pixel_format,
                got = ?negotiated_format,
                "Device picked a different pixel format"
            );
        }

        let stream_format = CaptureFormat {
            width: negotiated.width,
            height: negotiated.height,
            stride: negotiated.stride,
            pixel_format: negotiated_format,
        };

        let latest = Arc::clone(&self.latest);
        let device_path = device.path.clone();
        let handle = spawn_capture_thread(&self.running, move |ready, running| {
            if let Err(e) = capture_loop(dev, stream_format, latest, running, ready) {
                error!(device = %device_path, error = %e, "V4L2 capture loop failed");
            }
        })?;

        self.thread_handle = Some(handle);
        self.device = Some(device.clone());
        self.format = Some(CameraFormat {
            width: negotiated.width,
            height: negotiated.height,
            framerate: format.framerate,
            pixel_format: negotiated_format.fourcc().to_string(),
        });
        Ok(())
    }

    fn shutdown(&mut self) -> BackendResult<()> {
        if self.thread_handle.is_none() {
            return Ok(());
        }

        info!("Stopping V4L2 capture");
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.thread_handle.take() {
            match handle.join() {
                Ok(_) => info!("V4L2 capture thread stopped"),
                Err(_) => warn!("V4L2 capture thread panicked"),
            }
        }

        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.device = None;
        self.format = None;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.thread_handle.is_some() && self.running.load(Ordering::SeqCst)
    }

    fn capture_photo(&self) -> BackendResult<CameraFrame> {
        if !self.is_initialized() {
            return Err(BackendError::NotInitialized);
        }
        self.preview_frame().ok_or(BackendError::NoFrame)
    }

    fn preview_frame(&self) -> Option<CameraFrame> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::V4l2
    }

    fn current_device(&self) -> Option<&CameraDevice> {
        self.device.as_ref()
    }

    fn current_format(&self) -> Option<&CameraFormat> {
        self.format.as_ref()
    }
}

impl Drop for V4l2Backend {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "Failed to release V4L2 device on drop");
        }
    }
}

/// Negotiated stream layout handed to the capture thread
struct CaptureFormat {
    width: u32,
    height: u32,
    stride: u32,
    pixel_format: PixelFormat,
}

/// Guess where a capture node is mounted from its USB port
fn sysfs_location(path: &str) -> CameraLocation {
    let Some(node) = std::path::Path::new(path).file_name() else {
        return CameraLocation::External;
    };
    let removable = std::path::Path::new("/sys/class/video4linux")
        .join(node)
        .join("device/../removable");
    match std::fs::read_to_string(&removable) {
        Ok(value) => CameraLocation::from_usb_removable(&value),
        Err(_) => CameraLocation::External,
    }
}

/// Spawn the capture thread and wait until it reports a running stream
///
/// `running` is cleared when the thread body returns, so the backend stops
/// reporting itself initialized once capture ends for any reason.
fn spawn_capture_thread<F>(running: &Arc<AtomicBool>, body: F) -> BackendResult<JoinHandle<()>>
where
    F: FnOnce(StartSignal, Arc<AtomicBool>) + Send + 'static,
{
    let (ready_tx, ready_rx) = sync_channel(1);
    running.store(true, Ordering::SeqCst);
    let flag = Arc::clone(running);

    let handle = std::thread::Builder::new()
        .name("v4l2-capture".to_string())
        .spawn(move || {
            body(ready_tx, Arc::clone(&flag));
            flag.store(false, Ordering::SeqCst);
        })
        .map_err(|e| {
            running.store(false, Ordering::SeqCst);
            BackendError::InitializationFailed(e.to_string())
        })?;

    let started = ready_rx
        .recv()
        .unwrap_or_else(|_| Err("capture thread exited before streaming".to_string()));

    match started {
        Ok(()) => Ok(handle),
        Err(msg) => {
            running.store(false, Ordering::SeqCst);
            if handle.join().is_err() {
                warn!("V4L2 capture thread panicked during setup");
            }
            Err(BackendError::InitializationFailed(msg))
        }
    }
}

/// Run of consecutive dequeue failures
#[derive(Debug, Default)]
struct ErrorStreak {
    count: u32,
}

impl ErrorStreak {
    /// Record a failure; true once the streak reaches the limit
    fn fail(&mut self) -> bool {
        self.count += 1;
        self.count >= MAX_STREAM_ERRORS
    }

    /// Only the first failure of a streak is worth a warning
    fn is_first(&self) -> bool {
        self.count == 1
    }

    fn reset(&mut self) {
        if self.count > 0 {
            debug!(failures = self.count, "V4L2 stream recovered");
        }
        self.count = 0;
    }
}

/// Main capture loop running in a separate thread
fn capture_loop(
    dev: Device,
    format: CaptureFormat,
    latest: LatestFrame,
    running: Arc<AtomicBool>,
    ready: StartSignal,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

    let mut stream = match MmapStream::with_buffers(&dev, Type::VideoCapture, 4) {
        Ok(stream) => {
            let _ = ready.send(Ok(()));
            stream
        }
        Err(e) => {
            let _ = ready.send(Err(format!("Failed to create buffer stream: {}", e)));
            return Ok(());
        }
    };
    let mut errors = ErrorStreak::default();

    info!(
        width = format.width,
        height = format.height,
        format = ?format.pixel_format,
        "V4L2 capture stream started"
    );

    while running.load(Ordering::SeqCst) {
        match stream.next() {
            Ok((buf, meta)) => {
                errors.reset();
                let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);
                let used = (meta.bytesused as usize).min(buf.len());
                let used = if used == 0 { buf.len() } else { used };

                let frame = CameraFrame {
                    width: format.width,
                    height: format.height,
                    data: Arc::from(&buf[..used]),
                    format: format.pixel_format,
                    stride: if format.pixel_format == PixelFormat::MJPEG {
                        0
                    } else {
                        format.stride
                    },
                    captured_at: Instant::now(),
                };
                *latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);

                if frame_num % 120 == 0 {
                    debug!(frame = frame_num, sequence = meta.sequence, "V4L2 frame captured");
                }
            }
            Err(e) => {
                if errors.fail() {
                    return Err(format!(
                        "{} frame reads failed in a row, last: {}",
                        MAX_STREAM_ERRORS, e
                    )
                    .into());
                }
                if errors.is_first() {
                    warn!(error = %e, "Failed to capture V4L2 frame");
                }
                std::thread::sleep(STREAM_RETRY_DELAY);
            }
        }
    }

    info!("V4L2 capture loop ended");
    Ok(())
}
