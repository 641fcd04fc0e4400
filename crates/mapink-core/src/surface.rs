//! Rendering surface abstraction.
//!
//! The surface is the host map widget: it draws tiles and previews, reports
//! which committed feature sits under the pointer, and animates the camera.
//! Implementations are driven from the single UI thread.

use crate::camera::CameraMove;
use crate::geo::LngLat;
use crate::layers::FeatureRef;
use crate::tools::CursorStyle;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Image asset registered with the surface for symbol layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageAsset {
    pub name: &'static str,
    pub path: &'static str,
}

/// Icons used by the pin and annotation layers.
pub const IMAGE_ASSETS: [ImageAsset; 2] = [
    ImageAsset { name: "pin", path: "/assets/pin.png" },
    ImageAsset { name: "annotation", path: "/assets/annotation.png" },
];

/// Per-feature render state toggled on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureState {
    /// Drawn at reduced opacity until the next refresh.
    pub marked_delete: bool,
}

/// Host map widget.
pub trait RenderSurface {
    /// Set the system cursor over the map.
    fn set_cursor(&mut self, cursor: CursorStyle);

    /// Enable or disable camera drag gestures.
    fn set_drag_pan(&mut self, enabled: bool);

    /// Replace a vector source's tile URLs. Returns `false` if the source
    /// is not present.
    fn set_tiles(&mut self, source_id: &str, tiles: &[String]) -> bool;

    /// Redraw the in-progress line. Empty clears it.
    fn set_active_drawing(&mut self, coordinates: &[LngLat]);

    /// Redraw the live annotation preview. `None` clears it.
    fn set_active_annotation(&mut self, preview: Option<(LngLat, &str)>);

    /// First committed feature under `point` among the given rendered layers.
    fn query_feature(&self, point: Point, layer_ids: &[&str]) -> Option<FeatureRef>;

    /// Update render state for one committed feature.
    fn set_feature_state(&mut self, feature: FeatureRef, state: FeatureState);

    /// Animate the camera.
    fn move_camera(&mut self, movement: CameraMove);

    /// Register an icon image.
    fn add_image(&mut self, asset: ImageAsset);
}
