//! Transient text-entry state for the annotate tool.

use crate::geo::LngLat;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Text pre-filled into a fresh draft, fully selected so typing replaces it.
pub const ANNOTATION_PLACEHOLDER: &str = "New annotation";

/// An annotation being composed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnotationDraft {
    pub text: String,
    pub position: LngLat,
    pub editing: bool,
}

/// Single-feature text-entry overlay anchored at a map coordinate.
#[derive(Debug, Clone, Default)]
pub struct AnnotationEditor {
    draft: AnnotationDraft,
    /// Selected character range in the input, if any.
    selection: Option<Range<usize>>,
}

impl AnnotationEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh draft at `position`, replacing any previous one.
    pub fn begin(&mut self, position: LngLat) {
        self.draft = AnnotationDraft {
            text: ANNOTATION_PLACEHOLDER.to_string(),
            position,
            editing: true,
        };
        self.selection = Some(0..ANNOTATION_PLACEHOLDER.chars().count());
    }

    /// Replace the draft text with the input's current value.
    /// Ignored when no draft is open.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if !self.draft.editing {
            return;
        }
        self.draft.text = text.into();
        self.selection = None;
    }

    pub fn draft(&self) -> &AnnotationDraft {
        &self.draft
    }

    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    pub fn is_editing(&self) -> bool {
        self.draft.editing
    }

    /// Live preview feature (position, text) while editing.
    pub fn preview(&self) -> Option<(LngLat, &str)> {
        self.draft
            .editing
            .then(|| (self.draft.position, self.draft.text.as_str()))
    }

    /// Close the draft and hand back its contents for commit.
    pub fn take(&mut self) -> Option<AnnotationDraft> {
        if !self.draft.editing {
            return None;
        }
        let draft = std::mem::take(&mut self.draft);
        self.selection = None;
        Some(draft)
    }

    /// Drop the draft without committing.
    pub fn reset(&mut self) {
        self.draft = AnnotationDraft::default();
        self.selection = None;
    }
}
