//! mapink Core Library
//!
//! Tool state machine, geometry capture, erase batching and tile resync for
//! collaborative map annotation. Rendering and persistence are reached
//! through the [`RenderSurface`] and [`RemoteStore`] traits.

pub mod camera;
pub mod commit;
pub mod config;
pub mod controller;
pub mod geo;
pub mod layers;
pub mod notice;
pub mod session;
pub mod store;
pub mod surface;
pub mod tiles;
pub mod tools;

#[cfg(test)]
mod testing;

pub use camera::{CameraMove, ViewState, recenter_move};
pub use commit::{CommitContext, CommitError, CommitOutcome, CommitPipeline, CommitRequest};
pub use config::{ConfigError, MapConfig};
pub use controller::{KeyFocus, KeyOutcome, MapController, PointerInput};
pub use geo::{Bounds, LngLat, Shape, ShapeParseError};
pub use layers::{FeatureRef, LayerKind};
pub use notice::{Notice, NoticeLevel};
pub use session::{MapProject, Session, SessionRef};
pub use store::{MemoryStore, NewRow, RemoteStore, Row, StoreError, StoreResult};
pub use surface::{FeatureState, IMAGE_ASSETS, ImageAsset, RenderSurface};
pub use tiles::{RequestParameters, ResourceKind, TileSourceConfig, TileSourceRegistry, transform_request};
pub use tools::{AnnotationDraft, AnnotationEditor, CursorStyle, EraseSet, GeometryBuffer, ToolKind};

#[cfg(not(target_arch = "wasm32"))]
pub use store::RestStore;
