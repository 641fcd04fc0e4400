//! Test helpers.

use crate::camera::CameraMove;
use crate::geo::LngLat;
use crate::layers::{FeatureRef, LayerKind};
use crate::surface::{FeatureState, ImageAsset, RenderSurface};
use crate::tools::CursorStyle;
use kurbo::Point;
use std::collections::BTreeMap;

/// Rendering surface that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub cursor: CursorStyle,
    pub drag_pan: bool,
    tile_updates: Vec<(String, Vec<String>)>,
    pub active_drawing: Vec<LngLat>,
    pub active_annotation: Option<(LngLat, String)>,
    pub feature_states: BTreeMap<FeatureRef, FeatureState>,
    pub camera_moves: Vec<CameraMove>,
    pub images: Vec<ImageAsset>,
    /// Feature reported by `query_feature`, if any.
    pub hover: Option<FeatureRef>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            drag_pan: true,
            ..Self::default()
        }
    }

    pub fn tile_updates(&self) -> Vec<(String, Vec<String>)> {
        self.tile_updates.clone()
    }

    /// Source ids refreshed so far, in order.
    pub fn refreshed_sources(&self) -> Vec<String> {
        self.tile_updates.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn clear_tile_updates(&mut self) {
        self.tile_updates.clear();
    }
}

impl RenderSurface for RecordingSurface {
    fn set_cursor(&mut self, cursor: CursorStyle) {
        self.cursor = cursor;
    }

    fn set_drag_pan(&mut self, enabled: bool) {
        self.drag_pan = enabled;
    }

    fn set_tiles(&mut self, source_id: &str, tiles: &[String]) -> bool {
        if LayerKind::from_source_id(source_id).is_none() {
            return false;
        }
        self.tile_updates.push((source_id.to_string(), tiles.to_vec()));
        true
    }

    fn set_active_drawing(&mut self, coordinates: &[LngLat]) {
        self.active_drawing = coordinates.to_vec();
    }

    fn set_active_annotation(&mut self, preview: Option<(LngLat, &str)>) {
        self.active_annotation = preview.map(|(position, text)| (position, text.to_string()));
    }

    fn query_feature(&self, _point: Point, layer_ids: &[&str]) -> Option<FeatureRef> {
        let feature = self.hover?;
        layer_ids
            .contains(&feature.layer.render_layer_id())
            .then_some(feature)
    }

    fn set_feature_state(&mut self, feature: FeatureRef, state: FeatureState) {
        self.feature_states.insert(feature, state);
    }

    fn move_camera(&mut self, movement: CameraMove) {
        self.camera_moves.push(movement);
    }

    fn add_image(&mut self, asset: ImageAsset) {
        self.images.push(asset);
    }
}
