use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub use relaypanel_grants::wire::{
    AllMaxPortsResponse, BulkRequest, DashboardsResponse, GrantQuery, MaxPortResponse,
    OperationResponse, TokenListResponse,
};
pub use relaypanel_grants::{Grant, GrantUpdate, ServerInfo};

/// Query parameters for the single-server max-port lookup
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct MaxPortQuery {
    /// Server name to scan
    pub server: String,
}
