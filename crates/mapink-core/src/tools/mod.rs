//! Tool system for the map surface.

mod annotate;
mod draw;
mod erase;

pub use annotate::{AnnotationDraft, AnnotationEditor, ANNOTATION_PLACEHOLDER};
pub use draw::GeometryBuffer;
pub use erase::EraseSet;

use serde::{Deserialize, Serialize};

/// Available tools. Exactly one is active per map session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Pan,
    Draw,
    Pin,
    Annotate,
    Erase,
}

/// System cursor shown over the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CursorStyle {
    #[default]
    Default,
    Crosshair,
    Copy,
    /// System cursor hidden; only the overlay icon is visible.
    Hidden,
    Grab,
    Grabbing,
}

impl CursorStyle {
    /// CSS-style cursor name.
    pub fn name(self) -> &'static str {
        match self {
            CursorStyle::Default => "default",
            CursorStyle::Crosshair => "crosshair",
            CursorStyle::Copy => "copy",
            CursorStyle::Hidden => "none",
            CursorStyle::Grab => "grab",
            CursorStyle::Grabbing => "grabbing",
        }
    }
}

impl ToolKind {
    /// All tools in toolbar order.
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Pan,
        ToolKind::Draw,
        ToolKind::Pin,
        ToolKind::Annotate,
        ToolKind::Erase,
    ];

    /// Toolbar / cursor overlay glyph.
    pub fn icon(self) -> &'static str {
        match self {
            ToolKind::Pan => "🖐️",
            ToolKind::Draw => "✏️",
            ToolKind::Pin => "📍",
            ToolKind::Annotate => "💬",
            ToolKind::Erase => "🧽",
        }
    }

    /// Display name with its shortcut.
    pub fn display_name(self) -> &'static str {
        match self {
            ToolKind::Pan => "Pan (1)",
            ToolKind::Draw => "Draw (2)",
            ToolKind::Pin => "Pin (3)",
            ToolKind::Annotate => "Annotate (4)",
            ToolKind::Erase => "Erase (5)",
        }
    }

    /// Cursor presented while this tool is active.
    pub fn cursor(self) -> CursorStyle {
        match self {
            ToolKind::Pan => CursorStyle::Default,
            ToolKind::Draw | ToolKind::Pin => CursorStyle::Crosshair,
            ToolKind::Annotate => CursorStyle::Copy,
            ToolKind::Erase => CursorStyle::Hidden,
        }
    }

    /// Custom overlay icon following the pointer, if any.
    pub fn cursor_icon(self) -> Option<&'static str> {
        match self {
            ToolKind::Pan => None,
            tool => Some(tool.icon()),
        }
    }

    /// Whether camera drag gestures stay enabled. Drawing and erasing
    /// gestures would otherwise be read as pans.
    pub fn allows_drag_pan(self) -> bool {
        !matches!(self, ToolKind::Draw | ToolKind::Erase)
    }

    /// Tool bound to a numeric shortcut key.
    pub fn from_shortcut(key: &str) -> Option<Self> {
        match key {
            "1" => Some(ToolKind::Pan),
            "2" => Some(ToolKind::Draw),
            "3" => Some(ToolKind::Pin),
            "4" => Some(ToolKind::Annotate),
            "5" => Some(ToolKind::Erase),
            _ => None,
        }
    }
}
