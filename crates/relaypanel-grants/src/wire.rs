//! REST envelopes exchanged between the console and the panel backend.
//!
//! Field names follow the wire contract the console tables already consume
//! (`maxPort`, `maxPortsMap`, `current_index`), so both sides of this
//! workspace and any existing client agree on the JSON.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::OpCode;
use crate::grant::{Grant, ServerInfo};

/// `/tokens` response: a page of grants in table form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenListResponse {
    /// 0 on success
    pub code: u32,
    pub msg: String,
    /// Total matching grants before pagination
    pub count: usize,
    pub data: Vec<Grant>,
}

/// Result envelope for create/update/remove/enable/disable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OperationResponse {
    pub success: bool,
    pub code: u32,
    pub message: String,
}

impl OperationResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: OpCode::Success.code(),
            message: message.into(),
        }
    }

    pub fn failure(code: OpCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.code(),
            message: message.into(),
        }
    }
}

/// `/get_max_port` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MaxPortResponse {
    pub success: bool,
    #[serde(rename = "maxPort")]
    pub max_port: u16,
    pub message: String,
}

/// `/get_all_max_ports` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AllMaxPortsResponse {
    pub success: bool,
    #[serde(rename = "maxPortsMap")]
    pub max_ports_map: HashMap<String, u16>,
    pub message: String,
}

/// `/dashboards` response: the known backend servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DashboardsResponse {
    /// 0 on success
    pub code: u32,
    pub data: Vec<ServerInfo>,
    pub current_index: usize,
}

/// Query parameters accepted by `/tokens`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema, utoipa::IntoParams))]
pub struct GrantQuery {
    /// Substring filter on the user field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Substring filter on the token field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Substring filter on the comment field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Exact filter on the server field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// 1-based page number (default: 1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    /// Page size (default: all)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Body of the bulk remove/enable/disable operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BulkRequest {
    pub users: Vec<Grant>,
}
