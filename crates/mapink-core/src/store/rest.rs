//! REST store client for native platforms.
//!
//! Speaks the PostgREST dialect used by the hosted row store:
//! `POST /rest/v1/{table}`, `DELETE /rest/v1/{table}?id=eq.{id}` and
//! `GET /rest/v1/{table}?select=*&{column}=eq.{value}`.

use super::{BoxFuture, Filter, NewRow, RemoteStore, Row, StoreError, StoreResult};
use crate::config::MapConfig;
use crate::session::SessionRef;
use std::time::Duration;
use url::form_urlencoded;

/// Blocking HTTP client wrapped in the async store interface.
///
/// Each request runs to completion on the polling thread.
pub struct RestStore {
    config: MapConfig,
    session: SessionRef,
    agent: ureq::Agent,
}

impl RestStore {
    /// Create a client for `config.base_url`, authenticating as the current
    /// session user when there is one.
    pub fn new(config: MapConfig, session: SessionRef) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        Self { config, session, agent }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.origin(), table)
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        let token = self
            .session
            .access_token()
            .unwrap_or_else(|| self.config.anon_key.clone());
        request
            .set("apikey", &self.config.anon_key)
            .set("Authorization", &format!("Bearer {}", token))
    }
}

fn map_error(e: ureq::Error) -> StoreError {
    match e {
        ureq::Error::Status(status, response) => {
            let message = response
                .into_string()
                .unwrap_or_else(|_| "unreadable response body".to_string());
            StoreError::Rejected { status, message }
        }
        ureq::Error::Transport(transport) => StoreError::Transport(transport.to_string()),
    }
}

fn filter_query(filters: &[Filter]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("select", "*");
    for filter in filters {
        query.append_pair(&filter.column, &format!("eq.{}", filter.value));
    }
    query.finish()
}

impl RemoteStore for RestStore {
    fn insert(&self, table: &str, row: &NewRow) -> BoxFuture<'_, StoreResult<Row>> {
        let url = self.table_url(table);
        let row = row.clone();
        Box::pin(async move {
            let response = self
                .authorize(self.agent.post(&url))
                .set("Prefer", "return=representation")
                .send_json([&row])
                .map_err(map_error)?;
            let rows: Vec<Row> = response
                .into_json()
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            rows.into_iter()
                .next()
                .ok_or_else(|| StoreError::Other(format!("insert into {} returned no rows", url)))
        })
    }

    fn delete(&self, table: &str, id: i64) -> BoxFuture<'_, StoreResult<()>> {
        let url = format!("{}?id=eq.{}", self.table_url(table), id);
        Box::pin(async move {
            self.authorize(self.agent.delete(&url))
                .call()
                .map_err(map_error)?;
            Ok(())
        })
    }

    fn select(&self, table: &str, filters: &[Filter]) -> BoxFuture<'_, StoreResult<Vec<Row>>> {
        let url = format!("{}?{}", self.table_url(table), filter_query(filters));
        Box::pin(async move {
            let response = self
                .authorize(self.agent.get(&url))
                .call()
                .map_err(map_error)?;
            response
                .into_json()
                .map_err(|e| StoreError::Serialization(e.to_string()))
        })
    }
}
