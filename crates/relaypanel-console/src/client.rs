//! Typed REST client for the panel backend.

use std::collections::HashMap;

use tracing::debug;

use relaypanel_grants::wire::{
    AllMaxPortsResponse, BulkRequest, DashboardsResponse, GrantQuery, MaxPortResponse,
    OperationResponse, TokenListResponse,
};
use relaypanel_grants::{normalize, Grant, RejectKind, ServerInfo};

use crate::error::ClientError;

/// Bulk operation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOp {
    Remove,
    Enable,
    Disable,
}

impl BulkOp {
    fn path(self) -> &'static str {
        match self {
            BulkOp::Remove => "/remove",
            BulkOp::Enable => "/enable",
            BulkOp::Disable => "/disable",
        }
    }
}

/// HTTP client for the panel endpoints. Cheap to clone; no retries, no
/// caching — session-level state lives in [`crate::session::ConsoleSession`].
#[derive(Debug, Clone)]
pub struct PanelClient {
    http: reqwest::Client,
    base_url: String,
}

impl PanelClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// A 401 from any endpoint invalidates the whole session.
    fn check_session(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::SessionExpired);
        }
        Ok(response)
    }

    fn check_operation(result: OperationResponse) -> Result<(), ClientError> {
        if result.success {
            Ok(())
        } else {
            Err(ClientError::Rejected(RejectKind::from_code(result.code)))
        }
    }

    /// Fetch grants matching the table filters.
    pub async fn list_tokens(&self, query: &GrantQuery) -> Result<Vec<Grant>, ClientError> {
        let response = self
            .http
            .get(self.url("/tokens"))
            .query(query)
            .send()
            .await?;
        let response = Self::check_session(response)?;
        let body: TokenListResponse = response.json().await?;
        if body.code != 0 {
            return Err(ClientError::Rejected(RejectKind::from_code(body.code)));
        }
        debug!("fetched {} grants", body.data.len());
        Ok(body.data)
    }

    /// Create a grant.
    pub async fn add(&self, grant: &Grant) -> Result<(), ClientError> {
        let response = self.http.post(self.url("/add")).json(grant).send().await?;
        let response = Self::check_session(response)?;
        Self::check_operation(response.json().await?)
    }

    /// Update a grant. Port representation is coerced in both snapshots
    /// before transmission so a table edit and a reload serialize alike.
    pub async fn update(&self, before: Grant, after: Grant) -> Result<(), ClientError> {
        let update = normalize::prepare_update(before, after);
        let response = self
            .http
            .post(self.url("/update"))
            .json(&update)
            .send()
            .await?;
        let response = Self::check_session(response)?;
        Self::check_operation(response.json().await?)
    }

    /// Remove, enable or disable the given users in one request.
    pub async fn operate(&self, op: BulkOp, users: Vec<Grant>) -> Result<(), ClientError> {
        let request = BulkRequest { users };
        let response = self
            .http
            .post(self.url(op.path()))
            .json(&request)
            .send()
            .await?;
        let response = Self::check_session(response)?;
        Self::check_operation(response.json().await?)
    }

    /// High-water port mark for one server.
    pub async fn max_port(&self, server: &str) -> Result<u16, ClientError> {
        let response = self
            .http
            .get(self.url("/get_max_port"))
            .query(&[("server", server)])
            .send()
            .await?;
        let response = Self::check_session(response)?;
        if !response.status().is_success() {
            return Err(ClientError::Protocol(format!(
                "max port lookup failed with status {}",
                response.status()
            )));
        }
        let body: MaxPortResponse = response.json().await?;
        if !body.success {
            return Err(ClientError::Protocol("max port lookup refused".to_string()));
        }
        Ok(body.max_port)
    }

    /// High-water port marks for every server with grants.
    pub async fn all_max_ports(&self) -> Result<HashMap<String, u16>, ClientError> {
        let response = self.http.get(self.url("/get_all_max_ports")).send().await?;
        let response = Self::check_session(response)?;
        let body: AllMaxPortsResponse = response.json().await?;
        if !body.success {
            return Err(ClientError::Protocol("max port lookup refused".to_string()));
        }
        Ok(body.max_ports_map)
    }

    /// Known backend servers and the active one.
    pub async fn dashboards(&self) -> Result<(Vec<ServerInfo>, usize), ClientError> {
        let response = self.http.get(self.url("/dashboards")).send().await?;
        let response = Self::check_session(response)?;
        let body: DashboardsResponse = response.json().await?;
        if body.code != 0 {
            return Err(ClientError::Rejected(RejectKind::from_code(body.code)));
        }
        Ok((body.data, body.current_index))
    }
}
