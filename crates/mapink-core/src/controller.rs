//! Map session coordinator.
//!
//! [`MapController`] owns the active tool and the per-tool accumulators and
//! turns pointer and keyboard callbacks into surface updates and commit
//! requests. Handlers are synchronous; a finished gesture yields a
//! [`CommitRequest`] that the host runs through a
//! [`CommitPipeline`](crate::commit::CommitPipeline) and hands back via
//! [`MapController::complete`].

use crate::camera::recenter_move;
use crate::commit::{CommitContext, CommitError, CommitOutcome, CommitRequest};
use crate::config::MapConfig;
use crate::geo::LngLat;
use crate::layers::LayerKind;
use crate::notice::Notice;
use crate::session::{MapProject, SessionRef};
use crate::surface::{FeatureState, IMAGE_ASSETS, RenderSurface};
use crate::tiles::{RequestParameters, ResourceKind, TileSourceRegistry, transform_request};
use crate::tools::{AnnotationEditor, CursorStyle, EraseSet, GeometryBuffer, ToolKind};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A pointer event as delivered by the surface: the screen position used for
/// feature probing and the unprojected map coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub point: Point,
    pub lng_lat: LngLat,
}

impl PointerInput {
    pub fn new(point: Point, lng_lat: LngLat) -> Self {
        Self { point, lng_lat }
    }
}

/// What holds keyboard focus when a key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyFocus {
    #[default]
    Map,
    /// A text input or editable element.
    TextInput,
}

/// Result of [`MapController::handle_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Handled,
    /// The focused text input should lose focus.
    Blur,
}

/// Pointer gesture in progress. At most one accumulator is live at a time.
#[derive(Debug, Default)]
enum Gesture {
    #[default]
    Idle,
    Drawing(GeometryBuffer),
    Erasing(EraseSet),
}

/// Coordinates the tool state machine, accumulators and tile layers for one
/// map session.
pub struct MapController<S: RenderSurface> {
    config: MapConfig,
    session: SessionRef,
    project: Option<MapProject>,
    tool: ToolKind,
    gesture: Gesture,
    annotation: AnnotationEditor,
    registry: TileSourceRegistry,
    surface: Option<S>,
    cursor: CursorStyle,
    /// Cursor to restore when a camera drag ends.
    drag_cursor: Option<CursorStyle>,
    loading_message: String,
    notices: Vec<Notice>,
    /// Whether the camera has been centered on a project yet.
    centered: bool,
}

impl<S: RenderSurface> MapController<S> {
    pub fn new(config: MapConfig, session: SessionRef) -> Self {
        let registry = TileSourceRegistry::new(config.clone());
        Self {
            config,
            session,
            project: None,
            tool: ToolKind::default(),
            gesture: Gesture::Idle,
            annotation: AnnotationEditor::new(),
            registry,
            surface: None,
            cursor: ToolKind::default().cursor(),
            drag_cursor: None,
            loading_message: String::new(),
            notices: Vec::new(),
            centered: false,
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionRef {
        &self.session
    }

    pub fn project(&self) -> Option<&MapProject> {
        self.project.as_ref()
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Tools respond only while a project is loaded.
    pub fn can_use_tools(&self) -> bool {
        self.project.is_some()
    }

    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    /// Overlay icon following the pointer. Hidden while a draft has text.
    pub fn cursor_icon(&self) -> Option<&'static str> {
        if !self.annotation.draft().text.is_empty() {
            return None;
        }
        self.tool.cursor_icon()
    }

    pub fn annotation(&self) -> &AnnotationEditor {
        &self.annotation
    }

    /// Line being drawn, if a draw gesture is in progress.
    pub fn drawing(&self) -> Option<&GeometryBuffer> {
        match &self.gesture {
            Gesture::Drawing(buffer) => Some(buffer),
            _ => None,
        }
    }

    /// Features collected by the current erase gesture.
    pub fn erase_set(&self) -> Option<&EraseSet> {
        match &self.gesture {
            Gesture::Erasing(set) => Some(set),
            _ => None,
        }
    }

    pub fn tile_sources(&self) -> &TileSourceRegistry {
        &self.registry
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn loading_message(&self) -> &str {
        &self.loading_message
    }

    pub fn set_loading_message(&mut self, message: impl Into<String>) {
        self.loading_message = message.into();
        log::debug!("Loading message: {:?}", self.loading_message);
    }

    /// Take all pending notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Request hook for the surface: attaches the session token to
    /// same-origin tile requests.
    pub fn transform_request(&self, url: &str, kind: ResourceKind) -> Option<RequestParameters> {
        let token = self.session.access_token();
        transform_request(url, kind, self.config.origin(), token.as_deref())
    }

    // --- Surface lifecycle ---

    /// Attach the map widget, replacing any previous one.
    pub fn attach_surface(&mut self, mut surface: S) -> Option<S> {
        surface.set_cursor(self.cursor);
        surface.set_drag_pan(self.tool.allows_drag_pan());
        for asset in IMAGE_ASSETS {
            surface.add_image(asset);
        }
        let previous = self.surface.replace(surface);
        if self.project.is_some() && !self.centered {
            self.recenter();
        }
        previous
    }

    pub fn detach_surface(&mut self) -> Option<S> {
        self.surface.take()
    }

    // --- Project ---

    /// Load or unload the active project. Loading refreshes every layer and
    /// centers the camera the first time.
    pub fn set_project(&mut self, project: Option<MapProject>) {
        match project {
            None => {
                self.cancel_gesture();
                self.project = None;
                self.registry.set_project(None);
                log::info!("Project unloaded; tools disabled");
            }
            Some(project) => {
                log::info!("Loaded project {:?} ({})", project.id, project.title);
                self.registry.set_project(project.id);
                self.project = Some(project);
                if !self.centered {
                    self.recenter();
                }
                self.refresh_layers(&LayerKind::ALL);
            }
        }
    }

    // --- Tool state machine ---

    /// Switch tools. Ignored without a project. Switching to a different
    /// tool discards an unfinished gesture; reselecting the active one does
    /// nothing.
    pub fn set_tool(&mut self, tool: ToolKind) -> bool {
        if !self.can_use_tools() {
            log::debug!("Ignoring tool change to {:?}: no project", tool);
            return false;
        }
        if tool == self.tool {
            return true;
        }
        self.cancel_gesture();
        self.tool = tool;
        self.cursor = tool.cursor();
        self.drag_cursor = None;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_cursor(self.cursor);
            surface.set_drag_pan(tool.allows_drag_pan());
        }
        log::debug!("Tool changed to {:?}", tool);
        true
    }

    /// Global keyboard shortcuts.
    pub fn handle_key(&mut self, key: &str, focus: KeyFocus) -> KeyOutcome {
        if !self.can_use_tools() {
            return KeyOutcome::Ignored;
        }
        if focus == KeyFocus::TextInput {
            if key == "Escape" {
                self.annotation_blur();
                return KeyOutcome::Blur;
            }
            return KeyOutcome::Ignored;
        }

        match key {
            "Escape" => {
                self.set_tool(ToolKind::Pan);
                KeyOutcome::Handled
            }
            " " | "Space" => {
                self.recenter();
                KeyOutcome::Handled
            }
            _ => match ToolKind::from_shortcut(key) {
                Some(tool) => {
                    self.set_tool(tool);
                    KeyOutcome::Handled
                }
                None => KeyOutcome::Ignored,
            },
        }
    }

    fn cancel_gesture(&mut self) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => {}
            Gesture::Drawing(_) => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.set_active_drawing(&[]);
                }
            }
            Gesture::Erasing(set) => {
                if let Some(surface) = self.surface.as_mut() {
                    for feature in set.iter() {
                        surface.set_feature_state(*feature, FeatureState::default());
                    }
                }
            }
        }
    }

    // --- Pointer gestures ---

    pub fn pointer_down(&mut self, input: PointerInput) {
        self.cancel_gesture();
        if !self.can_use_tools() {
            return;
        }
        match self.tool {
            ToolKind::Draw => {
                let buffer = GeometryBuffer::begin(input.lng_lat);
                if let Some(surface) = self.surface.as_mut() {
                    surface.set_active_drawing(buffer.points());
                }
                self.gesture = Gesture::Drawing(buffer);
            }
            ToolKind::Erase => self.gesture = Gesture::Erasing(EraseSet::new()),
            _ => {}
        }
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing(buffer) => {
                buffer.push(input.lng_lat);
                if let Some(surface) = self.surface.as_mut() {
                    surface.set_active_drawing(buffer.points());
                }
            }
            Gesture::Erasing(set) => {
                let Some(surface) = self.surface.as_mut() else {
                    return;
                };
                let layers = LayerKind::ALL.map(LayerKind::render_layer_id);
                if let Some(feature) = surface.query_feature(input.point, &layers) {
                    if set.insert(feature) {
                        surface.set_feature_state(feature, FeatureState { marked_delete: true });
                    }
                }
            }
        }
    }

    /// Finish the current gesture. Draw yields an insert and erase yields a
    /// delete batch; local state is cleared either way.
    pub fn pointer_up(&mut self) -> Option<CommitRequest> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => None,
            Gesture::Drawing(buffer) => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.set_active_drawing(&[]);
                }
                match self.commit_context() {
                    Ok(ctx) => Some(CommitRequest::drawing(buffer.into_shape(), &ctx)),
                    Err(error) => {
                        self.report(Some(LayerKind::Drawings), &error);
                        None
                    }
                }
            }
            Gesture::Erasing(mut set) => {
                let features = set.drain();
                if let Err(error) = self.commit_context() {
                    self.report(None, &error);
                    self.refresh_layers(&LayerKind::ALL);
                    return None;
                }
                Some(CommitRequest::Erase { features })
            }
        }
    }

    /// A click that was not a drag.
    pub fn click(&mut self, input: PointerInput) -> Option<CommitRequest> {
        match self.tool {
            ToolKind::Pin => {
                let request = self
                    .commit_context()
                    .and_then(|ctx| CommitRequest::pin(input.lng_lat, &ctx));
                match request {
                    Ok(request) => Some(request),
                    Err(error) => {
                        self.report(Some(LayerKind::Pins), &error);
                        None
                    }
                }
            }
            ToolKind::Annotate => {
                self.annotation.begin(input.lng_lat);
                self.sync_annotation_preview();
                None
            }
            _ => None,
        }
    }

    // --- Annotation editor ---

    /// The annotation input's value changed.
    pub fn annotation_input(&mut self, text: &str) {
        self.annotation.set_text(text);
        self.sync_annotation_preview();
    }

    /// The annotation input lost focus; the draft is dropped.
    pub fn annotation_blur(&mut self) {
        if !self.annotation.is_editing() {
            return;
        }
        self.annotation.reset();
        self.sync_annotation_preview();
    }

    /// Enter pressed in the annotation input.
    pub fn annotation_enter(&mut self) -> Option<CommitRequest> {
        let draft = self.annotation.take()?;
        self.sync_annotation_preview();
        match self.commit_context() {
            Ok(ctx) => Some(CommitRequest::annotation(draft.position, draft.text, &ctx)),
            Err(error) => {
                self.report(Some(LayerKind::Annotations), &error);
                None
            }
        }
    }

    fn sync_annotation_preview(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.set_active_annotation(self.annotation.preview());
        }
    }

    // --- Camera ---

    pub fn drag_start(&mut self) {
        self.drag_cursor = Some(self.cursor);
        self.show_cursor(CursorStyle::Grab);
    }

    pub fn drag(&mut self) {
        self.show_cursor(CursorStyle::Grabbing);
    }

    pub fn drag_end(&mut self) {
        if let Some(cursor) = self.drag_cursor.take() {
            self.show_cursor(cursor);
        }
    }

    fn show_cursor(&mut self, cursor: CursorStyle) {
        self.cursor = cursor;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_cursor(cursor);
        }
    }

    /// Fit the project's bounds, or fly to the default view.
    pub fn recenter(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let bounds = self.project.as_ref().and_then(|project| project.bounds.as_ref());
        surface.move_camera(recenter_move(bounds, &self.config));
        if self.project.is_some() {
            self.centered = true;
        }
    }

    // --- Commits ---

    fn commit_context(&self) -> Result<CommitContext, CommitError> {
        let profile_id = self.session.user_id().ok_or(CommitError::NoSession)?;
        let project_id = self
            .project
            .as_ref()
            .and_then(|project| project.id)
            .ok_or(CommitError::NoProject)?;
        Ok(CommitContext { project_id, profile_id })
    }

    fn report(&mut self, layer: Option<LayerKind>, error: &CommitError) {
        let message = error.notice_message(layer);
        if error.is_guard_failure() {
            log::warn!("{}: {}", message, error);
        }
        self.notices.push(Notice::error(message));
    }

    /// Apply a finished commit: surface each failure and refresh the layers
    /// it names. Outcomes may arrive in any order.
    pub fn complete(&mut self, outcome: CommitOutcome) {
        for error in &outcome.errors {
            self.report(outcome.layer, error);
        }
        self.refresh_layers(&outcome.refresh);
    }

    fn refresh_layers(&mut self, layers: &[LayerKind]) {
        for &layer in layers {
            let surface = self.surface.as_mut().map(|s| s as &mut dyn RenderSurface);
            self.registry.refresh(layer, surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraMove;
    use crate::commit::CommitPipeline;
    use crate::geo::Bounds;
    use crate::layers::FeatureRef;
    use crate::notice::NoticeLevel;
    use crate::session::Session;
    use crate::store::{MemoryStore, StoreRequest};
    use crate::testing::RecordingSurface;
    use crate::tools::ANNOTATION_PLACEHOLDER;
    use pollster::block_on;
    use std::sync::Arc;

    fn at(lng: f64, lat: f64) -> PointerInput {
        PointerInput::new(Point::new(lng * 10.0, lat * 10.0), LngLat::new(lng, lat))
    }

    fn session() -> SessionRef {
        SessionRef::new(Some(Session {
            user_id: "user-1".to_string(),
            access_token: "token".to_string(),
        }))
    }

    fn controller(session: SessionRef, project_id: Option<i64>) -> MapController<RecordingSurface> {
        let config = MapConfig::new("https://geo.example.com", "anon").unwrap();
        let mut controller = MapController::new(config, session);
        controller.attach_surface(RecordingSurface::new());
        if let Some(id) = project_id {
            controller.set_project(Some(MapProject::new(id, "owner")));
        }
        controller.surface_mut().unwrap().clear_tile_updates();
        controller
    }

    fn run(
        controller: &mut MapController<RecordingSurface>,
        store: &Arc<MemoryStore>,
        request: CommitRequest,
    ) {
        let pipeline = CommitPipeline::new(Arc::clone(store));
        let outcome = block_on(pipeline.run(request));
        controller.complete(outcome);
    }

    fn refreshed(controller: &MapController<RecordingSurface>) -> Vec<String> {
        controller.surface().unwrap().refreshed_sources()
    }

    #[test]
    fn test_tool_change_requires_project() {
        let mut controller = controller(session(), None);
        assert!(!controller.set_tool(ToolKind::Draw));
        assert_eq!(controller.tool(), ToolKind::Pan);
        assert_eq!(controller.handle_key("2", KeyFocus::Map), KeyOutcome::Ignored);
        assert_eq!(controller.tool(), ToolKind::Pan);

        controller.set_project(Some(MapProject::new(1, "owner")));
        for tool in ToolKind::ALL {
            assert!(controller.set_tool(tool));
            assert_eq!(controller.tool(), tool);
        }
    }

    #[test]
    fn test_tool_presentation() {
        let mut controller = controller(session(), Some(1));

        controller.set_tool(ToolKind::Draw);
        let surface = controller.surface().unwrap();
        assert_eq!(surface.cursor, CursorStyle::Crosshair);
        assert!(!surface.drag_pan);

        controller.set_tool(ToolKind::Annotate);
        let surface = controller.surface().unwrap();
        assert_eq!(surface.cursor, CursorStyle::Copy);
        assert!(surface.drag_pan);

        controller.set_tool(ToolKind::Erase);
        assert_eq!(controller.surface().unwrap().cursor, CursorStyle::Hidden);
        assert_eq!(controller.cursor_icon(), Some("🧽"));
        assert!(!controller.surface().unwrap().drag_pan);
    }

    #[test]
    fn test_keyboard_shortcuts() {
        let mut controller = controller(session(), Some(1));

        assert_eq!(controller.handle_key("3", KeyFocus::Map), KeyOutcome::Handled);
        assert_eq!(controller.tool(), ToolKind::Pin);

        // Typing into an input never switches tools.
        assert_eq!(controller.handle_key("2", KeyFocus::TextInput), KeyOutcome::Ignored);
        assert_eq!(controller.tool(), ToolKind::Pin);

        // Escape in an input blurs it and keeps the tool.
        assert_eq!(controller.handle_key("Escape", KeyFocus::TextInput), KeyOutcome::Blur);
        assert_eq!(controller.tool(), ToolKind::Pin);

        assert_eq!(controller.handle_key("Escape", KeyFocus::Map), KeyOutcome::Handled);
        assert_eq!(controller.tool(), ToolKind::Pan);
        assert_eq!(controller.handle_key("x", KeyFocus::Map), KeyOutcome::Ignored);
    }

    #[test]
    fn test_space_recenters() {
        let mut controller = controller(session(), Some(1));
        let before = controller.surface().unwrap().camera_moves.len();
        assert_eq!(controller.handle_key(" ", KeyFocus::Map), KeyOutcome::Handled);
        assert_eq!(controller.surface().unwrap().camera_moves.len(), before + 1);
    }

    #[test]
    fn test_draw_buffer_counts_moves() {
        let mut controller = controller(session(), Some(7));
        controller.set_tool(ToolKind::Draw);

        controller.pointer_down(at(0.0, 0.0));
        assert_eq!(controller.drawing().unwrap().len(), 1);
        for i in 1..=5 {
            controller.pointer_move(at(0.0, i as f64));
            assert_eq!(controller.drawing().unwrap().len(), i + 1);
            assert_eq!(controller.surface().unwrap().active_drawing.len(), i + 1);
        }
    }

    #[test]
    fn test_draw_commit_scenario() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(session(), Some(7));
        controller.set_tool(ToolKind::Draw);

        controller.pointer_down(at(10.0, 20.0));
        controller.pointer_move(at(10.0, 21.0));
        controller.pointer_move(at(10.0, 22.0));
        let request = controller.pointer_up().unwrap();

        assert!(controller.drawing().is_none());
        assert!(controller.surface().unwrap().active_drawing.is_empty());

        run(&mut controller, &store, request);
        let requests = store.requests();
        assert_eq!(requests.len(), 1);
        let StoreRequest::Insert { table, row } = &requests[0] else {
            panic!("expected insert");
        };
        assert_eq!(table, "smb_drawings");
        assert_eq!(row.shape, "LINESTRING(10 20,10 21,10 22)");
        assert_eq!(row.project_id, 7);
        assert_eq!(row.profile_id, "user-1");
        assert_eq!(refreshed(&controller), vec!["public.smb_drawings"]);
        assert!(controller.drain_notices().is_empty());
    }

    #[test]
    fn test_draw_without_movement_commits_single_point() {
        let mut controller = controller(session(), Some(7));
        controller.set_tool(ToolKind::Draw);
        controller.pointer_down(at(1.0, 2.0));

        let Some(CommitRequest::Insert { row, .. }) = controller.pointer_up() else {
            panic!("expected insert");
        };
        assert_eq!(row.shape, "LINESTRING(1 2)");
    }

    #[test]
    fn test_draw_without_session_clears_buffer() {
        let mut controller = controller(SessionRef::default(), Some(7));
        controller.set_tool(ToolKind::Draw);
        controller.pointer_down(at(1.0, 1.0));
        controller.pointer_move(at(2.0, 2.0));

        assert!(controller.pointer_up().is_none());
        assert!(controller.drawing().is_none());
        assert!(controller.surface().unwrap().active_drawing.is_empty());
        assert_eq!(
            controller.drain_notices(),
            vec![Notice::error("Failed to send drawing")]
        );
    }

    #[test]
    fn test_draw_insert_failure() {
        let store = Arc::new(MemoryStore::new());
        store.deny_table("smb_drawings");
        let mut controller = controller(session(), Some(7));
        controller.set_tool(ToolKind::Draw);
        controller.pointer_down(at(1.0, 1.0));
        let request = controller.pointer_up().unwrap();

        run(&mut controller, &store, request);
        assert!(refreshed(&controller).is_empty());
        let notices = controller.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, "Failed to send drawing");
    }

    #[test]
    fn test_pin_without_session() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(SessionRef::default(), Some(7));
        controller.set_tool(ToolKind::Pin);

        assert!(controller.click(at(5.0, 5.0)).is_none());
        assert!(store.requests().is_empty());
        assert_eq!(controller.tool(), ToolKind::Pin);
        assert_eq!(controller.drain_notices(), vec![Notice::error("Failed to insert pin")]);
    }

    #[test]
    fn test_pin_commit_refreshes_pins_only() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(session(), Some(7));
        controller.set_tool(ToolKind::Pin);

        let request = controller.click(at(5.0, 6.0)).unwrap();
        run(&mut controller, &store, request);

        let rows = store.rows("smb_pins");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].shape, "POINT(5 6)");
        assert_eq!(refreshed(&controller), vec!["public.smb_pins"]);
    }

    #[test]
    fn test_session_change_is_observed() {
        let session = SessionRef::default();
        let mut controller = controller(session.clone(), Some(7));
        controller.set_tool(ToolKind::Pin);
        assert!(controller.click(at(0.0, 0.0)).is_none());

        session.set(Some(Session {
            user_id: "late".to_string(),
            access_token: "t".to_string(),
        }));
        let Some(CommitRequest::Insert { row, .. }) = controller.click(at(0.0, 0.0)) else {
            panic!("expected insert");
        };
        assert_eq!(row.profile_id, "late");
    }

    #[test]
    fn test_erase_scenario() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(session(), Some(7));
        controller.set_tool(ToolKind::Erase);

        let pin = FeatureRef::new(LayerKind::Pins, 5);
        let drawing = FeatureRef::new(LayerKind::Drawings, 9);

        controller.pointer_down(at(0.0, 0.0));
        for feature in [pin, drawing, pin] {
            controller.surface_mut().unwrap().hover = Some(feature);
            controller.pointer_move(at(0.0, 0.0));
        }
        assert_eq!(controller.erase_set().unwrap().len(), 2);
        let marked = &controller.surface().unwrap().feature_states;
        assert!(marked[&pin].marked_delete);
        assert!(marked[&drawing].marked_delete);

        let request = controller.pointer_up().unwrap();
        assert!(controller.erase_set().is_none());
        run(&mut controller, &store, request);

        let deletes: Vec<_> = store
            .requests()
            .into_iter()
            .filter_map(|request| match request {
                StoreRequest::Delete { id, .. } => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(deletes, vec![5, 9]);
        assert_eq!(
            refreshed(&controller),
            vec!["public.smb_pins", "public.smb_drawings", "public.smb_annotations"]
        );
    }

    #[test]
    fn test_erase_partial_failure_reports_each() {
        let store = Arc::new(MemoryStore::new());
        store.deny_table("smb_pins");
        let mut controller = controller(session(), Some(7));
        controller.set_tool(ToolKind::Erase);

        controller.pointer_down(at(0.0, 0.0));
        for id in [1, 2] {
            controller.surface_mut().unwrap().hover = Some(FeatureRef::new(LayerKind::Pins, id));
            controller.pointer_move(at(0.0, 0.0));
        }
        controller.surface_mut().unwrap().hover = Some(FeatureRef::new(LayerKind::Annotations, 3));
        controller.pointer_move(at(0.0, 0.0));

        let request = controller.pointer_up().unwrap();
        run(&mut controller, &store, request);

        assert_eq!(store.requests().len(), 3);
        assert_eq!(
            controller.drain_notices(),
            vec![
                Notice::error("Failed to erase features"),
                Notice::error("Failed to erase features"),
            ]
        );
        assert_eq!(refreshed(&controller).len(), 3);
    }

    #[test]
    fn test_erase_without_session() {
        let mut controller = controller(SessionRef::default(), Some(7));
        controller.set_tool(ToolKind::Erase);
        controller.pointer_down(at(0.0, 0.0));
        controller.surface_mut().unwrap().hover = Some(FeatureRef::new(LayerKind::Pins, 1));
        controller.pointer_move(at(0.0, 0.0));

        assert!(controller.pointer_up().is_none());
        assert!(controller.erase_set().is_none());
        assert_eq!(controller.drain_notices(), vec![Notice::error("Failed to erase features")]);
        assert_eq!(refreshed(&controller).len(), 3);
    }

    #[test]
    fn test_erase_after_project_unload() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(session(), Some(7));
        controller.set_tool(ToolKind::Erase);
        controller.set_project(None);

        controller.pointer_down(at(0.0, 0.0));
        controller.surface_mut().unwrap().hover = Some(FeatureRef::new(LayerKind::Pins, 5));
        controller.pointer_move(at(0.0, 0.0));

        assert!(controller.erase_set().is_none());
        assert!(controller.pointer_up().is_none());
        assert!(store.requests().is_empty());
        assert!(controller.surface().unwrap().feature_states.is_empty());
    }

    #[test]
    fn test_erase_guard_requires_project() {
        let mut controller = controller(session(), Some(7));
        controller.set_tool(ToolKind::Erase);
        controller.pointer_down(at(0.0, 0.0));
        controller.surface_mut().unwrap().hover = Some(FeatureRef::new(LayerKind::Pins, 5));
        controller.pointer_move(at(0.0, 0.0));

        // A project without a stored id cannot scope a delete.
        controller.project = Some(MapProject {
            id: None,
            ..MapProject::new(7, "owner")
        });
        assert!(controller.pointer_up().is_none());
        assert_eq!(controller.drain_notices(), vec![Notice::error("Failed to erase features")]);
    }

    #[test]
    fn test_reselecting_tool_keeps_stroke() {
        let mut controller = controller(session(), Some(7));
        controller.set_tool(ToolKind::Draw);
        controller.pointer_down(at(1.0, 1.0));
        controller.pointer_move(at(1.0, 2.0));

        assert_eq!(controller.handle_key("2", KeyFocus::Map), KeyOutcome::Handled);
        assert_eq!(controller.drawing().unwrap().len(), 2);
        let Some(CommitRequest::Insert { row, .. }) = controller.pointer_up() else {
            panic!("expected insert");
        };
        assert_eq!(row.shape, "LINESTRING(1 1,1 2)");
    }

    #[test]
    fn test_tool_switch_discards_erase_marks() {
        let mut controller = controller(session(), Some(7));
        controller.set_tool(ToolKind::Erase);
        let pin = FeatureRef::new(LayerKind::Pins, 5);

        controller.pointer_down(at(0.0, 0.0));
        controller.surface_mut().unwrap().hover = Some(pin);
        controller.pointer_move(at(0.0, 0.0));
        controller.set_tool(ToolKind::Pan);

        assert!(controller.erase_set().is_none());
        assert!(!controller.surface().unwrap().feature_states[&pin].marked_delete);
        assert!(controller.pointer_up().is_none());
    }

    #[test]
    fn test_annotation_scenario() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(session(), Some(7));
        controller.set_tool(ToolKind::Annotate);

        assert!(controller.click(at(3.0, 4.0)).is_none());
        assert_eq!(controller.annotation().draft().text, ANNOTATION_PLACEHOLDER);
        assert_eq!(controller.annotation().selection(), Some(0..ANNOTATION_PLACEHOLDER.len()));
        assert_eq!(controller.cursor_icon(), None);

        controller.annotation_input("Hello");
        assert_eq!(
            controller.surface().unwrap().active_annotation,
            Some((LngLat::new(3.0, 4.0), "Hello".to_string()))
        );

        let request = controller.annotation_enter().unwrap();
        let draft = controller.annotation().draft();
        assert_eq!(draft.text, "");
        assert_eq!(draft.position, LngLat::ZERO);
        assert!(!draft.editing);
        assert!(controller.surface().unwrap().active_annotation.is_none());

        run(&mut controller, &store, request);
        let rows = store.rows("smb_annotations");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].shape, "POINT(3 4)");
        assert_eq!(rows[0].meta, "Hello");
        assert_eq!(refreshed(&controller), vec!["public.smb_annotations"]);
    }

    #[test]
    fn test_annotation_blur_discards() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(session(), Some(7));
        controller.set_tool(ToolKind::Annotate);

        controller.click(at(3.0, 4.0));
        controller.annotation_input("Draft");
        controller.annotation_blur();

        assert!(!controller.annotation().is_editing());
        assert!(controller.annotation_enter().is_none());
        assert!(store.requests().is_empty());
    }

    #[test]
    fn test_annotation_guard_failure() {
        let mut controller = controller(SessionRef::default(), Some(7));
        controller.set_tool(ToolKind::Annotate);
        controller.click(at(1.0, 1.0));

        assert!(controller.annotation_enter().is_none());
        assert_eq!(controller.annotation().draft().text, "");
        assert_eq!(
            controller.drain_notices(),
            vec![Notice::error("Failed to insert annotation. No session or project selected.")]
        );
    }

    #[test]
    fn test_drag_cursor_feedback() {
        let mut controller = controller(session(), Some(7));
        controller.set_tool(ToolKind::Pin);

        controller.drag_start();
        assert_eq!(controller.surface().unwrap().cursor, CursorStyle::Grab);
        controller.drag();
        assert_eq!(controller.surface().unwrap().cursor, CursorStyle::Grabbing);
        controller.drag_end();
        assert_eq!(controller.surface().unwrap().cursor, CursorStyle::Crosshair);
    }

    #[test]
    fn test_recenter_with_bounds() {
        let config = MapConfig::default();
        let mut controller: MapController<RecordingSurface> = MapController::new(config, session());
        controller.attach_surface(RecordingSurface::new());
        let bounds = Bounds { north: 10.0, east: 20.0, south: 0.0, west: 10.0 };
        controller.set_project(Some(MapProject::new(1, "owner").with_bounds(bounds)));

        // First load centers automatically.
        let moves = &controller.surface().unwrap().camera_moves;
        assert_eq!(moves.len(), 1);
        assert_eq!(
            moves[0],
            CameraMove::FitBounds {
                south_west: LngLat::new(10.0, 0.0),
                north_east: LngLat::new(20.0, 10.0),
                padding: 100.0,
                duration_ms: 1000,
            }
        );

        // Reloading the project does not recenter again.
        controller.set_project(Some(MapProject::new(1, "owner").with_bounds(bounds)));
        assert_eq!(controller.surface().unwrap().camera_moves.len(), 1);
    }

    #[test]
    fn test_recenter_without_bounds() {
        let mut controller = controller(session(), Some(1));
        controller.recenter();
        let moves = &controller.surface().unwrap().camera_moves;
        assert_eq!(
            moves.last(),
            Some(&CameraMove::FlyTo {
                center: LngLat::new(15.0, 50.0),
                zoom: 1.5,
                duration_ms: 1000,
            })
        );
    }

    #[test]
    fn test_set_project_refreshes_all_layers() {
        let mut controller = controller(session(), None);
        controller.set_project(Some(MapProject::new(12, "owner")));

        let updates = controller.surface().unwrap().tile_updates();
        assert_eq!(updates.len(), 3);
        assert!(updates.iter().all(|(_, tiles)| tiles[0].contains("project_id%3D12")));
    }

    #[test]
    fn test_attach_registers_assets() {
        let mut controller = controller(session(), Some(1));
        let surface = controller.detach_surface().unwrap();
        assert_eq!(surface.images, IMAGE_ASSETS.to_vec());

        // Refreshes are no-ops while detached.
        controller.set_project(Some(MapProject::new(2, "owner")));
        assert!(controller.surface().is_none());
    }

    #[test]
    fn test_unload_project_disables_tools() {
        let mut controller = controller(session(), Some(1));
        controller.set_tool(ToolKind::Draw);
        controller.pointer_down(at(0.0, 0.0));
        controller.set_project(None);

        assert!(controller.drawing().is_none());
        assert!(!controller.set_tool(ToolKind::Pin));
        assert_eq!(controller.tool(), ToolKind::Draw);
    }

    #[test]
    fn test_transform_request_uses_session() {
        let signed_in = controller(session(), Some(1));
        let url = "https://geo.example.com/tileserver/v1/public.smb_pins/1/2/3.pbf";
        let params = signed_in.transform_request(url, ResourceKind::Tile).unwrap();
        assert_eq!(params.headers[0].1, "Bearer token");

        let anonymous = controller(SessionRef::default(), Some(1));
        assert!(anonymous.transform_request(url, ResourceKind::Tile).is_none());
    }

    #[test]
    fn test_loading_message() {
        let mut controller = controller(session(), None);
        assert_eq!(controller.loading_message(), "");
        controller.set_loading_message("Loading map...");
        assert_eq!(controller.loading_message(), "Loading map...");
    }
}
