//! Latest-wins detection pipeline.
//!
//! Frames arrive on the capture callback context at camera cadence; the
//! detector finishes whenever it finishes, on a dedicated worker thread.
//! `submit` therefore never blocks: while a detection is in flight, newly
//! delivered frames are dropped, not queued. Queueing would grow memory and
//! result staleness without bound whenever the detector runs slower than
//! the camera; sampling the freshest frame keeps the overlay honest.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use tracing::{debug, error, warn};

use overlay_geometry::{FrameGeometry, FrameGeometryTracker};

use crate::config::LensFacing;
use crate::detector::{DetectError, Region, RegionDetector};
use crate::frame::FrameLease;
use crate::overlay::{OverlayShape, SharedOverlay};

/// Unit of work handed to the detection worker. Carries the geometry
/// snapshot taken at submission so a result can never be interpreted
/// against a rotation or lens switch that happened while it was in flight.
struct DetectTask {
    lease: FrameLease,
    geometry: FrameGeometry,
    frame_number: u64,
}

/// Drives one detector over the analysis frame stream and publishes results
/// into the shared overlay model.
///
/// State machine: idle → detecting → idle, with stop terminal from any
/// state. After [`stop`](Self::stop) every `submit` is a silent no-op,
/// because the camera keeps delivering frames briefly after a stop request.
pub struct DetectionPipeline {
    task_tx: Option<Sender<DetectTask>>,
    in_flight: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
    tracker: FrameGeometryTracker,
    overlay: SharedOverlay,
    lens_facing: LensFacing,
    error_rx: Receiver<DetectError>,
    worker: Option<JoinHandle<()>>,
    frame_number: u64,
    dropped_frames: u64,
    smoothed_fps: f32,
    last_submit: Option<Instant>,
}

impl DetectionPipeline {
    /// Spawn the worker thread and return the submission handle.
    ///
    /// The worker takes ownership of the detector and closes it exactly
    /// once, after the final in-flight detection has completed.
    pub fn spawn(
        detector: Box<dyn RegionDetector>,
        overlay: SharedOverlay,
        lens_facing: LensFacing,
    ) -> Self {
        // Capacity 1 is enough by construction: the in-flight flag admits a
        // single task until the worker clears it.
        let (task_tx, task_rx) = bounded::<DetectTask>(1);
        let (error_tx, error_rx) = unbounded::<DetectError>();
        let in_flight = Arc::new(AtomicBool::new(false));
        let stopped = Arc::new(AtomicBool::new(false));

        let worker = spawn_detect_worker(
            detector,
            task_rx,
            error_tx,
            overlay.clone(),
            in_flight.clone(),
            stopped.clone(),
        );

        Self {
            task_tx: Some(task_tx),
            in_flight,
            stopped,
            tracker: FrameGeometryTracker::new(),
            overlay,
            lens_facing,
            error_rx,
            worker: Some(worker),
            frame_number: 0,
            dropped_frames: 0,
            smoothed_fps: 0.0,
            last_submit: None,
        }
    }

    /// Offer one camera frame for analysis. Returns immediately whether the
    /// frame was forwarded or dropped; the lease hands the buffer back to
    /// the capture subsystem on every path.
    pub fn submit(&mut self, lease: FrameLease) {
        if self.stopped.load(Ordering::Acquire) {
            return;
        }

        self.observe_submit_rate();

        let geometry = lease.frame().geometry(self.lens_facing);
        let (changed, info) = self.tracker.update_if_needed(geometry);
        if changed {
            debug!(
                width = info.width,
                height = info.height,
                mirrored = info.is_mirrored,
                "image source geometry changed"
            );
            self.overlay.set_image_source_info(info);
        }

        self.frame_number = self.frame_number.wrapping_add(1);

        if self.in_flight.swap(true, Ordering::AcqRel) {
            self.record_drop();
            return;
        }

        let Some(task_tx) = self.task_tx.clone() else {
            self.in_flight.store(false, Ordering::Release);
            return;
        };
        let task = DetectTask {
            lease,
            geometry,
            frame_number: self.frame_number,
        };
        match task_tx.try_send(task) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.in_flight.store(false, Ordering::Release);
                self.record_drop();
            }
            Err(TrySendError::Disconnected(_)) => {
                self.in_flight.store(false, Ordering::Release);
                error!("detection worker terminated unexpectedly");
            }
        }
    }

    /// Request shutdown. Terminal and idempotent; safe to call while a
    /// detection is in flight, whose late result will be discarded. The
    /// worker releases the detector once the channel drains.
    pub fn stop(&mut self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!(
            frames = self.frame_number,
            dropped = self.dropped_frames,
            "stopping detection pipeline"
        );
        self.task_tx = None;
    }

    /// Whether no detection is currently in flight.
    pub fn is_idle(&self) -> bool {
        !self.in_flight.load(Ordering::Acquire)
    }

    /// Receiver for per-frame detection failures. Failures never stop the
    /// pipeline; the overlay keeps the last good result.
    pub fn errors(&self) -> Receiver<DetectError> {
        self.error_rx.clone()
    }

    /// Frames dropped because a detection was already in flight.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Frames offered to the pipeline so far, including dropped ones.
    pub fn frames_submitted(&self) -> u64 {
        self.frame_number
    }

    fn observe_submit_rate(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_submit {
            let elapsed = now.duration_since(last).as_secs_f32();
            if elapsed > 0.0 {
                let instant = 1.0 / elapsed;
                self.smoothed_fps = if self.smoothed_fps == 0.0 {
                    instant
                } else {
                    0.9 * self.smoothed_fps + 0.1 * instant
                };
                metrics::gauge!("overlay_pipeline_fps").set(self.smoothed_fps as f64);
            }
        }
        self.last_submit = Some(now);
    }

    fn record_drop(&mut self) {
        self.dropped_frames = self.dropped_frames.wrapping_add(1);
        metrics::counter!("overlay_dropped_frames_total").increment(1);
        debug!(
            frame = self.frame_number,
            dropped_total = self.dropped_frames,
            "dropping frame, detection in flight"
        );
    }
}

impl Drop for DetectionPipeline {
    fn drop(&mut self) {
        self.stop();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn spawn_detect_worker(
    mut detector: Box<dyn RegionDetector>,
    task_rx: Receiver<DetectTask>,
    error_tx: Sender<DetectError>,
    overlay: SharedOverlay,
    in_flight: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("overlay-detect".into())
        .spawn(move || {
            while let Ok(task) = task_rx.recv() {
                let DetectTask {
                    lease,
                    geometry,
                    frame_number,
                } = task;
                let span = tracing::debug_span!("detect", frame = frame_number);
                let _guard = span.enter();

                let started = Instant::now();
                let result = detector.detect(lease.frame());
                // Hand the buffer back before publishing; the capture
                // subsystem can refill it while we update the overlay.
                drop(lease);

                match result {
                    Ok(regions) => {
                        metrics::histogram!("overlay_detect_latency_seconds")
                            .record(started.elapsed().as_secs_f64());
                        if stopped.load(Ordering::Acquire) {
                            debug!(frame = frame_number, "discarding detection result after stop");
                        } else {
                            overlay.replace_all(to_overlay_shapes(geometry, regions));
                        }
                    }
                    Err(err) => {
                        warn!(frame = frame_number, "detection failed: {err}");
                        metrics::counter!("overlay_detect_failures_total").increment(1);
                        let _ = error_tx.send(err);
                    }
                }

                in_flight.store(false, Ordering::Release);
            }

            detector.close();
            debug!("detector closed, pipeline worker exiting");
        })
        .expect("failed to spawn detection worker thread")
}

/// Orient detector-native regions into the overlay's coordinate space using
/// the geometry snapshot of the frame that produced them.
fn to_overlay_shapes(geometry: FrameGeometry, regions: Vec<Region>) -> Vec<OverlayShape> {
    regions
        .into_iter()
        .map(|region| OverlayShape {
            bounds: geometry.orient_rect(region.bounds),
            label: region.label,
            score: region.score,
            payload: region.payload,
        })
        .collect()
}
