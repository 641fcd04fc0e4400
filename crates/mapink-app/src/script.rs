//! Recorded session scripts.
//!
//! A script is JSON:
//! ```json
//! {
//!   "project": { "id": 7, "uuid": "...", "profile_id": "owner" },
//!   "session": { "user_id": "user-1", "access_token": "..." },
//!   "events": [
//!     { "type": "key", "key": "2" },
//!     { "type": "down", "lng": 10, "lat": 20 },
//!     { "type": "move", "lng": 10, "lat": 21 },
//!     { "type": "up" }
//!   ]
//! }
//! ```

use anyhow::Context;
use kurbo::Point;
use mapink_core::{FeatureRef, KeyFocus, LngLat, MapProject, PointerInput, Session, ToolKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One recorded host callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Key press. `Enter` with text focus confirms the annotation.
    Key {
        key: String,
        #[serde(default)]
        focus: KeyFocus,
    },
    /// Toolbar selection.
    Tool { tool: ToolKind },
    Down { lng: f64, lat: f64 },
    /// Pointer move; `hit` is the feature the surface reports underneath.
    Move {
        lng: f64,
        lat: f64,
        #[serde(default)]
        hit: Option<FeatureRef>,
    },
    Up,
    Click { lng: f64, lat: f64 },
    /// New value of the annotation input.
    Text { text: String },
    Blur,
    DragStart,
    Drag,
    DragEnd,
    Recenter,
}

/// Build a pointer input for a map coordinate. Headless replays have no
/// projection, so the screen point mirrors the coordinate.
pub fn pointer(lng: f64, lat: f64) -> PointerInput {
    PointerInput::new(Point::new(lng, lat), LngLat::new(lng, lat))
}

/// A recorded session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub project: Option<MapProject>,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

impl Script {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid script {}", path.display()))
    }
}
