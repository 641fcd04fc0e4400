//! Session and project collaborators.

use crate::geo::Bounds;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// An authenticated user session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
}

/// Shared handle to the current session.
///
/// Every clone observes the same slot, so a handle captured before a login or
/// logout still reads the latest value.
#[derive(Debug, Clone, Default)]
pub struct SessionRef {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionRef {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Option<Session> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the current session (login, refresh or logout).
    pub fn set(&self, session: Option<Session>) {
        match self.inner.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }

    pub fn user_id(&self) -> Option<String> {
        self.current().map(|session| session.user_id)
    }

    pub fn access_token(&self) -> Option<String> {
        self.current().map(|session| session.access_token)
    }
}

/// A map project record as loaded from the project collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapProject {
    #[serde(default)]
    pub id: Option<i64>,
    pub uuid: Uuid,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub bounds: Option<Bounds>,
    pub profile_id: String,
}

impl MapProject {
    /// Create an unpublished project with the given row id.
    pub fn new(id: i64, profile_id: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            uuid: Uuid::new_v4(),
            published: false,
            title: "Untitled map".to_string(),
            description: String::new(),
            bounds: None,
            profile_id: profile_id.into(),
        }
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }
}
