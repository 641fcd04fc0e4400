//! Drives a [`MapController`] from a recorded script.
//!
//! Each event is dispatched to the controller; any commit it yields is run
//! to completion before the next event, and the outcome is fed back so
//! notices and tile refreshes happen in order.

use crate::script::{Script, ScriptEvent, pointer};
use crate::surface::{LoggingSurface, SurfaceStats};
use mapink_core::{
    CommitPipeline, CommitRequest, KeyFocus, MapConfig, MapController, Notice, RemoteStore,
    SessionRef, ToolKind,
};
use std::sync::Arc;

/// What happened during a replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    pub events: usize,
    pub commits: usize,
    pub failed_commits: usize,
    pub notices: Vec<Notice>,
    pub surface: SurfaceStats,
    pub final_tool: ToolKind,
}

pub struct Replay<St: RemoteStore> {
    controller: MapController<LoggingSurface>,
    pipeline: CommitPipeline<St>,
    summary: ReplaySummary,
}

impl<St: RemoteStore> Replay<St> {
    /// Set up a controller for the script's session and project.
    pub fn new(config: MapConfig, session: SessionRef, store: Arc<St>) -> Self {
        let mut controller = MapController::new(config, session);
        controller.attach_surface(LoggingSurface::new());
        Self {
            controller,
            pipeline: CommitPipeline::new(store),
            summary: ReplaySummary::default(),
        }
    }

    /// Load the project and replay every event.
    pub fn run(mut self, script: Script) -> ReplaySummary {
        self.controller.set_loading_message("Loading map...");
        self.controller.set_project(script.project);
        self.controller.set_loading_message("");

        for event in script.events {
            self.dispatch(event);
        }

        self.collect_notices();
        self.summary.final_tool = self.controller.tool();
        if let Some(surface) = self.controller.surface() {
            self.summary.surface = surface.stats();
        }
        self.summary
    }

    /// Apply one event.
    pub fn dispatch(&mut self, event: ScriptEvent) {
        log::debug!("event: {:?}", event);
        self.summary.events += 1;

        let request = match event {
            ScriptEvent::Key { key, focus } if focus == KeyFocus::TextInput && key == "Enter" => {
                self.controller.annotation_enter()
            }
            ScriptEvent::Key { key, focus } => {
                let outcome = self.controller.handle_key(&key, focus);
                log::debug!("key {:?}: {:?}", key, outcome);
                None
            }
            ScriptEvent::Tool { tool } => {
                self.controller.set_tool(tool);
                None
            }
            ScriptEvent::Down { lng, lat } => {
                self.controller.pointer_down(pointer(lng, lat));
                None
            }
            ScriptEvent::Move { lng, lat, hit } => {
                if let Some(surface) = self.controller.surface_mut() {
                    surface.set_hover(hit);
                }
                self.controller.pointer_move(pointer(lng, lat));
                None
            }
            ScriptEvent::Up => self.controller.pointer_up(),
            ScriptEvent::Click { lng, lat } => self.controller.click(pointer(lng, lat)),
            ScriptEvent::Text { text } => {
                self.controller.annotation_input(&text);
                None
            }
            ScriptEvent::Blur => {
                self.controller.annotation_blur();
                None
            }
            ScriptEvent::DragStart => {
                self.controller.drag_start();
                None
            }
            ScriptEvent::Drag => {
                self.controller.drag();
                None
            }
            ScriptEvent::DragEnd => {
                self.controller.drag_end();
                None
            }
            ScriptEvent::Recenter => {
                self.controller.recenter();
                None
            }
        };

        if let Some(request) = request {
            self.commit(request);
        }
        self.collect_notices();
    }

    fn commit(&mut self, request: CommitRequest) {
        self.summary.commits += 1;
        let outcome = pollster::block_on(self.pipeline.run(request));
        if !outcome.is_success() {
            self.summary.failed_commits += 1;
        }
        self.controller.complete(outcome);
    }

    fn collect_notices(&mut self) {
        for notice in self.controller.drain_notices() {
            log::warn!("notice: {}", notice.message);
            self.summary.notices.push(notice);
        }
    }
}
