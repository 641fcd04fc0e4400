//! Persisting locally captured geometry to the remote store.
//!
//! The controller turns a finished gesture into a [`CommitRequest`]; the
//! pipeline executes it asynchronously and reports a [`CommitOutcome`] that
//! the controller applies (notices and layer refreshes). Requests are
//! independent, so several may be in flight at once and none is cancelled.

use crate::geo::{LngLat, Shape};
use crate::layers::{FeatureRef, LayerKind};
use crate::store::{NewRow, RemoteStore, Row, StoreError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Default pin color stored in pin metadata.
pub const DEFAULT_PIN_COLOR: &str = "red";

/// Commit failures. Guard failures abort before any request is sent;
/// store failures are final for that attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommitError {
    #[error("No authenticated session")]
    NoSession,
    #[error("No active project")]
    NoProject,
    #[error("Insert into {layer} failed: {source}")]
    Insert {
        layer: LayerKind,
        #[source]
        source: StoreError,
    },
    #[error("Delete of {feature} failed: {source}")]
    Delete {
        feature: FeatureRef,
        #[source]
        source: StoreError,
    },
    #[error("Could not encode metadata: {0}")]
    Metadata(String),
}

impl CommitError {
    /// Message shown to the user for this failure.
    pub fn notice_message(&self, layer: Option<LayerKind>) -> &'static str {
        match (self, layer) {
            (CommitError::Delete { .. }, _) => "Failed to erase features",
            (CommitError::NoSession | CommitError::NoProject, Some(LayerKind::Annotations)) => {
                "Failed to insert annotation. No session or project selected."
            }
            (_, Some(LayerKind::Drawings)) => "Failed to send drawing",
            (_, Some(LayerKind::Pins)) => "Failed to insert pin",
            (_, Some(LayerKind::Annotations)) => "Failed to insert annotation",
            (_, None) => "Failed to erase features",
        }
    }

    pub fn is_guard_failure(&self) -> bool {
        matches!(self, CommitError::NoSession | CommitError::NoProject)
    }
}

/// Metadata stored with every pin.
#[derive(Debug, Clone, Serialize)]
struct PinMeta<'a> {
    lng: f64,
    lat: f64,
    color: &'a str,
}

/// Who is committing, and into which project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitContext {
    pub project_id: i64,
    pub profile_id: String,
}

/// A mutation ready to be sent to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitRequest {
    /// Insert one row into a layer's table.
    Insert { layer: LayerKind, row: NewRow },
    /// Delete a batch of features; every layer is refreshed afterwards.
    Erase { features: Vec<FeatureRef> },
}

impl CommitRequest {
    /// A finished freehand line.
    pub fn drawing(line: Shape, ctx: &CommitContext) -> Self {
        CommitRequest::Insert {
            layer: LayerKind::Drawings,
            row: NewRow {
                shape: line.to_string(),
                meta: String::new(),
                project_id: ctx.project_id,
                profile_id: ctx.profile_id.clone(),
            },
        }
    }

    /// A pin at `position` with the default color.
    pub fn pin(position: LngLat, ctx: &CommitContext) -> Result<Self, CommitError> {
        let meta = serde_json::to_string(&PinMeta {
            lng: position.lng,
            lat: position.lat,
            color: DEFAULT_PIN_COLOR,
        })
        .map_err(|e| CommitError::Metadata(e.to_string()))?;
        Ok(CommitRequest::Insert {
            layer: LayerKind::Pins,
            row: NewRow {
                shape: Shape::Point(position).to_string(),
                meta,
                project_id: ctx.project_id,
                profile_id: ctx.profile_id.clone(),
            },
        })
    }

    /// A text annotation anchored at `position`.
    pub fn annotation(position: LngLat, text: String, ctx: &CommitContext) -> Self {
        CommitRequest::Insert {
            layer: LayerKind::Annotations,
            row: NewRow {
                shape: Shape::Point(position).to_string(),
                meta: text,
                project_id: ctx.project_id,
                profile_id: ctx.profile_id.clone(),
            },
        }
    }
}

/// Result of running one [`CommitRequest`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitOutcome {
    /// Layer an insert targeted; `None` for erase batches.
    pub layer: Option<LayerKind>,
    /// Layers whose tiles must be reissued.
    pub refresh: Vec<LayerKind>,
    /// Row created by a successful insert.
    pub inserted: Option<Row>,
    /// Features whose delete succeeded.
    pub deleted: Vec<FeatureRef>,
    /// One entry per failed request.
    pub errors: Vec<CommitError>,
}

impl CommitOutcome {
    /// Outcome for a guard failure detected before sending anything.
    pub fn aborted(layer: Option<LayerKind>, error: CommitError) -> Self {
        Self {
            layer,
            errors: vec![error],
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Executes commit requests against a remote store.
pub struct CommitPipeline<S: RemoteStore> {
    store: Arc<S>,
}

impl<S: RemoteStore> Clone for CommitPipeline<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RemoteStore> CommitPipeline<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Run a request to completion. Never retries.
    pub async fn run(&self, request: CommitRequest) -> CommitOutcome {
        match request {
            CommitRequest::Insert { layer, row } => self.insert(layer, row).await,
            CommitRequest::Erase { features } => self.erase(features).await,
        }
    }

    async fn insert(&self, layer: LayerKind, row: NewRow) -> CommitOutcome {
        match self.store.insert(layer.table(), &row).await {
            Ok(stored) => {
                log::info!("Inserted {} row {}", layer, stored.id);
                CommitOutcome {
                    layer: Some(layer),
                    refresh: vec![layer],
                    inserted: Some(stored),
                    ..CommitOutcome::default()
                }
            }
            Err(source) => {
                log::error!("Error inserting into {}: {}", layer, source);
                CommitOutcome::aborted(Some(layer), CommitError::Insert { layer, source })
            }
        }
    }

    /// Delete each feature in turn. A failure is recorded and the batch
    /// continues; all layers are refreshed once every attempt has finished.
    async fn erase(&self, features: Vec<FeatureRef>) -> CommitOutcome {
        let mut outcome = CommitOutcome::default();
        for feature in features {
            match self.store.delete(feature.layer.table(), feature.id).await {
                Ok(()) => outcome.deleted.push(feature),
                Err(source) => {
                    log::error!("Error deleting {} with id {}: {}", feature.layer, feature.id, source);
                    outcome.errors.push(CommitError::Delete { feature, source });
                }
            }
        }
        outcome.refresh = LayerKind::ALL.to_vec();
        outcome
    }
}
