//! Vector tile sources for the committed-feature layers.
//!
//! Each layer's tiles are filtered server-side by project. Swapping a
//! source's tile URL makes the rendering surface drop and refetch the
//! visible tiles, which is how layers pick up fresh rows after a commit.

use crate::config::MapConfig;
use crate::layers::LayerKind;
use crate::surface::RenderSurface;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::{Url, form_urlencoded};

/// Filter value used when no project is active; matches no rows.
pub const NO_PROJECT_ID: i64 = -1;

/// Tile query for one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSourceConfig {
    pub layer: LayerKind,
    /// Tile source id.
    pub id: String,
    /// Filter expression, e.g. `project_id=7`.
    pub filter: String,
    /// Tile URL templates with `{z}/{x}/{y}` placeholders.
    pub tiles: Vec<String>,
}

impl TileSourceConfig {
    /// Derive the config for `layer` scoped to `project_id`.
    pub fn for_project(layer: LayerKind, project_id: Option<i64>, config: &MapConfig) -> Self {
        let filter = format!("project_id={}", project_id.unwrap_or(NO_PROJECT_ID));
        let tiles = vec![tile_url(config, layer.source_id(), &[("filter", filter.as_str())])];
        Self {
            layer,
            id: layer.source_id().to_string(),
            filter,
            tiles,
        }
    }
}

/// Build a tile URL template for `source_id`. The API key always comes first
/// in the query, followed by `params` in order.
pub fn tile_url(config: &MapConfig, source_id: &str, params: &[(&str, &str)]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("apikey", &config.anon_key);
    for (key, value) in params {
        query.append_pair(key, value);
    }
    format!(
        "{}/tileserver/v1/{}/{{z}}/{{x}}/{{y}}.pbf?{}",
        config.origin(),
        source_id,
        query.finish()
    )
}

/// Kind of resource the rendering surface is about to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Style,
    Source,
    Tile,
    Glyphs,
    SpriteImage,
    SpriteJson,
    Image,
    Unknown,
}

/// Replacement request parameters returned by [`transform_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParameters {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// Attach a bearer token to same-origin tile requests.
///
/// Returns `None` to leave the request untouched: non-tile resources,
/// foreign origins and anonymous sessions all fetch without credentials.
/// Origins are compared on scheme, host and port, so a look-alike host that
/// merely shares a prefix with `base_url` is foreign.
pub fn transform_request(
    url: &str,
    kind: ResourceKind,
    base_url: &str,
    token: Option<&str>,
) -> Option<RequestParameters> {
    let token = token?;
    if kind != ResourceKind::Tile {
        return None;
    }
    let (Ok(target), Ok(base)) = (Url::parse(url), Url::parse(base_url)) else {
        return None;
    };
    if target.origin() != base.origin() {
        return None;
    }
    Some(RequestParameters {
        url: url.to_string(),
        headers: vec![("Authorization".to_string(), format!("Bearer {token}"))],
    })
}

/// Owns the tile source configs for the three committed layers.
#[derive(Debug, Clone)]
pub struct TileSourceRegistry {
    config: MapConfig,
    project_id: Option<i64>,
    sources: BTreeMap<LayerKind, TileSourceConfig>,
}

impl TileSourceRegistry {
    /// Create a registry with no active project.
    pub fn new(config: MapConfig) -> Self {
        let mut registry = Self {
            config,
            project_id: None,
            sources: BTreeMap::new(),
        };
        registry.recompute();
        registry
    }

    fn recompute(&mut self) {
        self.sources = LayerKind::ALL
            .into_iter()
            .map(|layer| (layer, TileSourceConfig::for_project(layer, self.project_id, &self.config)))
            .collect();
    }

    /// Switch the active project; configs are rebuilt, not patched.
    pub fn set_project(&mut self, project_id: Option<i64>) {
        self.project_id = project_id;
        self.recompute();
    }

    pub fn project_id(&self) -> Option<i64> {
        self.project_id
    }

    pub fn source(&self, layer: LayerKind) -> &TileSourceConfig {
        // Every layer is populated by recompute().
        &self.sources[&layer]
    }

    pub fn sources(&self) -> impl Iterator<Item = &TileSourceConfig> {
        self.sources.values()
    }

    /// Reissue one layer's tile query on the surface.
    ///
    /// No-op without an attached surface or an active project. Returns
    /// whether tiles were actually replaced.
    pub fn refresh(&self, layer: LayerKind, surface: Option<&mut dyn RenderSurface>) -> bool {
        let Some(surface) = surface else {
            return false;
        };
        if self.project_id.is_none() {
            return false;
        }
        let source = self.source(layer);
        let replaced = surface.set_tiles(&source.id, &source.tiles);
        if replaced {
            log::debug!("Refreshed tiles for {} ({})", source.id, source.filter);
        } else {
            log::debug!("Tile source {} not present on surface", source.id);
        }
        replaced
    }
}
