//! The three server-backed feature layers and references into them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A committed-feature layer. Each one is backed by a remote table and
/// rendered from a vector tile source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Pins,
    Drawings,
    Annotations,
}

impl LayerKind {
    /// All layers, in refresh order.
    pub const ALL: [LayerKind; 3] = [LayerKind::Pins, LayerKind::Drawings, LayerKind::Annotations];

    /// Remote table name.
    pub fn table(self) -> &'static str {
        match self {
            LayerKind::Pins => "smb_pins",
            LayerKind::Drawings => "smb_drawings",
            LayerKind::Annotations => "smb_annotations",
        }
    }

    /// Vector tile source id (schema-qualified table).
    pub fn source_id(self) -> &'static str {
        match self {
            LayerKind::Pins => "public.smb_pins",
            LayerKind::Drawings => "public.smb_drawings",
            LayerKind::Annotations => "public.smb_annotations",
        }
    }

    /// Id of the rendered style layer drawing this source.
    pub fn render_layer_id(self) -> &'static str {
        match self {
            LayerKind::Pins => "pins-layer",
            LayerKind::Drawings => "drawings-layer",
            LayerKind::Annotations => "annotations-layer",
        }
    }

    /// Resolve a tile source id back to its layer.
    pub fn from_source_id(source_id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layer| layer.source_id() == source_id)
    }

    /// Resolve a remote table name back to its layer.
    pub fn from_table(table: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layer| layer.table() == table)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Identifies one rendered, already-committed feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureRef {
    pub layer: LayerKind,
    pub id: i64,
}

impl FeatureRef {
    pub fn new(layer: LayerKind, id: i64) -> Self {
        Self { layer, id }
    }
}

impl fmt::Display for FeatureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.layer.source_id(), self.id)
    }
}
