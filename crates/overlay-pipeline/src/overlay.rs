//! Shared overlay state bridging detection cadence and render cadence.
//!
//! The pipeline replaces the shape list whenever a detection completes; the
//! rendering collaborator snapshots it whenever it redraws. Neither side
//! waits for the other.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use overlay_geometry::{ImageSourceInfo, OverlayTransform, RectF, Size};

/// One renderable detection, keyed to oriented image-source coordinates.
/// Projection into view coordinates happens at render time via
/// [`OverlayModel::transform`].
#[derive(Clone, Debug, Serialize)]
pub struct OverlayShape {
    pub bounds: RectF,
    pub label: String,
    pub score: f32,
    pub payload: Option<String>,
}

#[derive(Default)]
struct OverlayState {
    shapes: Vec<OverlayShape>,
    source: ImageSourceInfo,
    view: Size,
    // Rebuilt on demand after a source or view change.
    transform: Option<OverlayTransform>,
}

/// Current list of renderable shapes plus the lazy image→view transform.
///
/// `replace_all` is pure data replacement: each detection's output wholly
/// supersedes the previous one, so results from a slower-than-real-time
/// detector can never accumulate alongside fresher ones.
#[derive(Default)]
pub struct OverlayModel {
    state: Mutex<OverlayState>,
}

/// Handle shared between the pipeline (writer) and the renderer (reader).
pub type SharedOverlay = Arc<OverlayModel>;

impl OverlayModel {
    pub fn new() -> SharedOverlay {
        Arc::new(Self::default())
    }

    /// Replace the whole render list with one detection's output.
    pub fn replace_all(&self, shapes: Vec<OverlayShape>) {
        let mut state = self.state.lock().expect("overlay state poisoned");
        state.shapes = shapes;
    }

    /// Drop all shapes, e.g. when the binding is torn down.
    pub fn clear(&self) {
        self.replace_all(Vec::new());
    }

    /// Update the cached stream geometry; invalidates the transform.
    pub fn set_image_source_info(&self, source: ImageSourceInfo) {
        let mut state = self.state.lock().expect("overlay state poisoned");
        if state.source != source {
            state.source = source;
            state.transform = None;
        }
    }

    /// Update the rendering surface size; invalidates the transform.
    pub fn set_view_size(&self, view: Size) {
        let mut state = self.state.lock().expect("overlay state poisoned");
        if state.view != view {
            state.view = view;
            state.transform = None;
        }
    }

    /// Snapshot of the current shapes, decoupled from further updates.
    pub fn shapes(&self) -> Vec<OverlayShape> {
        let state = self.state.lock().expect("overlay state poisoned");
        state.shapes.clone()
    }

    /// The image→view transform for the current geometry, computed lazily
    /// and cached until the source info or view size changes.
    pub fn transform(&self) -> OverlayTransform {
        let mut state = self.state.lock().expect("overlay state poisoned");
        if let Some(transform) = state.transform {
            return transform;
        }
        let transform = OverlayTransform::between(state.source, state.view);
        state.transform = Some(transform);
        transform
    }

    /// Convenience for renderers: every shape with its bounds already
    /// projected into view coordinates.
    pub fn projected_shapes(&self) -> Vec<OverlayShape> {
        let transform = self.transform();
        self.shapes()
            .into_iter()
            .map(|shape| OverlayShape {
                bounds: transform.map_rect(shape.bounds),
                ..shape
            })
            .collect()
    }
}
