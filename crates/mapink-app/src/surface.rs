//! Headless rendering surface that logs what a map widget would draw.

use kurbo::Point;
use mapink_core::{
    CameraMove, CursorStyle, FeatureRef, FeatureState, ImageAsset, LayerKind, LngLat, RenderSurface,
};

/// Counts surface activity for the replay summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub tile_refreshes: usize,
    pub camera_moves: usize,
    pub marked_features: usize,
}

#[derive(Debug, Default)]
pub struct LoggingSurface {
    /// Feature under the pointer for the next probe.
    hover: Option<FeatureRef>,
    stats: SurfaceStats,
}

impl LoggingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_hover(&mut self, feature: Option<FeatureRef>) {
        self.hover = feature;
    }

    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }
}

impl RenderSurface for LoggingSurface {
    fn set_cursor(&mut self, cursor: CursorStyle) {
        log::debug!("cursor: {}", cursor.name());
    }

    fn set_drag_pan(&mut self, enabled: bool) {
        log::debug!("drag pan: {}", enabled);
    }

    fn set_tiles(&mut self, source_id: &str, tiles: &[String]) -> bool {
        if LayerKind::from_source_id(source_id).is_none() {
            return false;
        }
        self.stats.tile_refreshes += 1;
        log::info!("tiles {} -> {}", source_id, tiles.join(" "));
        true
    }

    fn set_active_drawing(&mut self, coordinates: &[LngLat]) {
        log::trace!("active drawing: {} points", coordinates.len());
    }

    fn set_active_annotation(&mut self, preview: Option<(LngLat, &str)>) {
        match preview {
            Some((position, text)) => {
                log::debug!("annotation preview at {} {}: {:?}", position.lng, position.lat, text)
            }
            None => log::debug!("annotation preview cleared"),
        }
    }

    fn query_feature(&self, _point: Point, layer_ids: &[&str]) -> Option<FeatureRef> {
        self.hover
            .filter(|feature| layer_ids.contains(&feature.layer.render_layer_id()))
    }

    fn set_feature_state(&mut self, feature: FeatureRef, state: FeatureState) {
        if state.marked_delete {
            self.stats.marked_features += 1;
        }
        log::debug!("feature {} marked_delete={}", feature, state.marked_delete);
    }

    fn move_camera(&mut self, movement: CameraMove) {
        self.stats.camera_moves += 1;
        log::info!("camera: {:?}", movement);
    }

    fn add_image(&mut self, asset: ImageAsset) {
        log::debug!("image {} from {}", asset.name, asset.path);
    }
}
