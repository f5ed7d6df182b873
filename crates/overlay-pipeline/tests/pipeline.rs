//! End-to-end pipeline behavior against a gated stub detector: the gate
//! lets tests hold a detection in flight for as long as a scenario needs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};

use overlay_geometry::{RectF, Size};
use overlay_pipeline::{
    AnalysisFrame, DetectError, DetectionPipeline, FrameFormat, FrameLease, LensFacing,
    OverlayModel, Region, RegionDetector, SharedOverlay,
};

fn init_logs() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Detector whose `detect` blocks until the test feeds it an outcome.
struct GatedDetector {
    started: Sender<()>,
    gate: Receiver<Result<Vec<Region>, DetectError>>,
    closed: Arc<AtomicUsize>,
}

impl GatedDetector {
    fn new() -> (
        Box<Self>,
        Receiver<()>,
        Sender<Result<Vec<Region>, DetectError>>,
        Arc<AtomicUsize>,
    ) {
        let (started_tx, started_rx) = unbounded();
        let (gate_tx, gate_rx) = unbounded();
        let closed = Arc::new(AtomicUsize::new(0));
        let detector = Box::new(Self {
            started: started_tx,
            gate: gate_rx,
            closed: closed.clone(),
        });
        (detector, started_rx, gate_tx, closed)
    }
}

impl RegionDetector for GatedDetector {
    fn detect(&mut self, _frame: &AnalysisFrame) -> Result<Vec<Region>, DetectError> {
        let _ = self.started.send(());
        // A dropped gate means the test is done with this detector.
        self.gate.recv().unwrap_or_else(|_| Ok(Vec::new()))
    }

    fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

fn region(left: f32, top: f32, right: f32, bottom: f32) -> Region {
    Region {
        bounds: RectF::new(left, top, right, bottom),
        label: "QR_CODE".into(),
        score: 0.97,
        payload: Some("https://example.com".into()),
    }
}

fn leased_frame(released: &Arc<AtomicUsize>) -> FrameLease {
    let counter = released.clone();
    FrameLease::with_release(
        AnalysisFrame::new(vec![0u8; 64], 640, 480, 90, FrameFormat::Yuv420),
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        },
    )
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

fn overlay_len(overlay: &SharedOverlay) -> usize {
    overlay.shapes().len()
}

#[test]
fn busy_pipeline_drops_new_frames_but_applies_the_inflight_result() {
    init_logs();
    let (detector, started, gate, _closed) = GatedDetector::new();
    let overlay = OverlayModel::new();
    let mut pipeline = DetectionPipeline::spawn(detector, overlay.clone(), LensFacing::Back);
    let released = Arc::new(AtomicUsize::new(0));

    pipeline.submit(leased_frame(&released));
    assert!(started.recv_timeout(Duration::from_secs(2)).is_ok());

    // Frame B arrives while A is in flight: dropped, buffer handed back.
    pipeline.submit(leased_frame(&released));
    assert_eq!(pipeline.dropped_frames(), 1);
    assert_eq!(released.load(Ordering::SeqCst), 1);
    assert_eq!(overlay_len(&overlay), 0);

    // A's result still lands once the detector completes.
    gate.send(Ok(vec![region(10.0, 20.0, 110.0, 70.0)])).unwrap();
    assert!(wait_until(|| overlay_len(&overlay) == 1 && pipeline.is_idle()));
    assert_eq!(released.load(Ordering::SeqCst), 2);

    // Rotation 90 on a 640x480 buffer: regions arrive oriented.
    let shapes = overlay.shapes();
    assert_eq!(shapes[0].bounds, RectF::new(410.0, 10.0, 460.0, 110.0));
    assert_eq!(shapes[0].payload.as_deref(), Some("https://example.com"));
}

#[test]
fn detector_failure_keeps_the_last_good_overlay() {
    init_logs();
    let (detector, started, gate, _closed) = GatedDetector::new();
    let overlay = OverlayModel::new();
    let mut pipeline = DetectionPipeline::spawn(detector, overlay.clone(), LensFacing::Back);
    let released = Arc::new(AtomicUsize::new(0));
    let errors = pipeline.errors();

    pipeline.submit(leased_frame(&released));
    started.recv_timeout(Duration::from_secs(2)).unwrap();
    gate.send(Ok(vec![region(0.0, 0.0, 10.0, 10.0)])).unwrap();
    assert!(wait_until(|| overlay_len(&overlay) == 1 && pipeline.is_idle()));

    pipeline.submit(leased_frame(&released));
    started.recv_timeout(Duration::from_secs(2)).unwrap();
    gate.send(Err(DetectError::Backend("model crashed".into())))
        .unwrap();
    assert!(wait_until(|| pipeline.is_idle()));

    // The failure is reported, the overlay untouched, the pipeline alive.
    let err = errors.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(matches!(err, DetectError::Backend(_)));
    assert_eq!(overlay_len(&overlay), 1);

    pipeline.submit(leased_frame(&released));
    started.recv_timeout(Duration::from_secs(2)).unwrap();
    gate.send(Ok(Vec::new())).unwrap();
    assert!(wait_until(|| overlay_len(&overlay) == 0));
    assert_eq!(released.load(Ordering::SeqCst), 3);
}

#[test]
fn stop_discards_the_late_result_and_closes_the_detector_once() {
    init_logs();
    let (detector, started, gate, closed) = GatedDetector::new();
    let overlay = OverlayModel::new();
    let mut pipeline = DetectionPipeline::spawn(detector, overlay.clone(), LensFacing::Back);
    let released = Arc::new(AtomicUsize::new(0));

    pipeline.submit(leased_frame(&released));
    started.recv_timeout(Duration::from_secs(2)).unwrap();

    pipeline.stop();
    // Stop again: terminal states are idempotent.
    pipeline.stop();

    // The in-flight detection completes after the stop request.
    gate.send(Ok(vec![region(0.0, 0.0, 10.0, 10.0)])).unwrap();

    // Joining the worker proves the late result was processed and dropped.
    drop(pipeline);
    assert_eq!(overlay_len(&overlay), 0);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn submits_after_stop_are_silent_noops_that_release_the_buffer() {
    init_logs();
    let (detector, started, _gate, closed) = GatedDetector::new();
    let overlay = OverlayModel::new();
    let mut pipeline = DetectionPipeline::spawn(detector, overlay.clone(), LensFacing::Back);
    let released = Arc::new(AtomicUsize::new(0));

    pipeline.stop();
    pipeline.submit(leased_frame(&released));
    pipeline.submit(leased_frame(&released));

    assert_eq!(pipeline.frames_submitted(), 0);
    assert_eq!(released.load(Ordering::SeqCst), 2);
    assert!(started.try_recv().is_err(), "detector must never see a frame");

    drop(pipeline);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[test]
fn front_camera_geometry_reaches_the_overlay_transform() {
    init_logs();
    let (detector, started, gate, _closed) = GatedDetector::new();
    let overlay = OverlayModel::new();
    let mut pipeline = DetectionPipeline::spawn(detector, overlay.clone(), LensFacing::Front);
    let released = Arc::new(AtomicUsize::new(0));

    // Rotation 90 on 640x480 orients the stream to 480x640, mirrored.
    overlay.set_view_size(Size::new(480, 640));
    pipeline.submit(leased_frame(&released));
    started.recv_timeout(Duration::from_secs(2)).unwrap();
    gate.send(Ok(Vec::new())).unwrap();
    assert!(wait_until(|| pipeline.is_idle()));

    let transform = overlay.transform();
    assert_eq!(transform.map_x(10.0), 470.0);
    assert_eq!(transform.map_y(10.0), 10.0);
}
