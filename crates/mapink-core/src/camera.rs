//! Camera moves requested from the rendering surface.

use crate::config::MapConfig;
use crate::geo::{Bounds, LngLat};
use serde::{Deserialize, Serialize};

/// A center + zoom view of the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            longitude: 15.0,
            latitude: 50.0,
            zoom: 1.5,
        }
    }
}

impl ViewState {
    pub fn center(&self) -> LngLat {
        LngLat::new(self.longitude, self.latitude)
    }
}

/// An animated camera transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraMove {
    /// Fit a bounding box inside the viewport.
    FitBounds {
        south_west: LngLat,
        north_east: LngLat,
        padding: f64,
        duration_ms: u32,
    },
    /// Fly to a center and zoom.
    FlyTo {
        center: LngLat,
        zoom: f64,
        duration_ms: u32,
    },
}

/// Camera move for recentering on a project: fit its bounds when it declares
/// any, otherwise return to the configured default view.
pub fn recenter_move(bounds: Option<&Bounds>, config: &MapConfig) -> CameraMove {
    match bounds {
        Some(bounds) => CameraMove::FitBounds {
            south_west: bounds.south_west(),
            north_east: bounds.north_east(),
            padding: config.recenter_padding,
            duration_ms: config.recenter_duration_ms,
        },
        None => CameraMove::FlyTo {
            center: config.default_view.center(),
            zoom: config.default_view.zoom,
            duration_ms: config.fly_duration_ms,
        },
    }
}
