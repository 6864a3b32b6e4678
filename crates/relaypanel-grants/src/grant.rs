use serde::{Deserialize, Serialize};

/// One element of a grant's allowed-port list.
///
/// The wire format is a mixed JSON array: bare integers for single ports and
/// strings for ranges (`"10000-10200"`). Numeric-looking strings are legal on
/// input and are coerced to `Num` before transmission, see
/// [`crate::normalize::coerce_ports`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum PortValue {
    /// Single port as a JSON number
    Num(u32),
    /// Range (`"start-end"`) or not-yet-coerced single port as a string
    Text(String),
}

impl PortValue {
    /// True if this is a string holding nothing but digits.
    pub fn is_numeric_text(&self) -> bool {
        match self {
            PortValue::Num(_) => false,
            PortValue::Text(s) => !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()),
        }
    }
}

impl std::fmt::Display for PortValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortValue::Num(n) => write!(f, "{}", n),
            PortValue::Text(s) => f.write_str(s),
        }
    }
}

/// Access record binding a proxy user to their credential and the ports,
/// domains and subdomains they may claim on one backend server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Grant {
    /// Proxy user identifier
    pub user: String,
    /// Secret credential presented by the proxy client
    pub token: String,
    /// Operator note, single line
    #[serde(default)]
    pub comment: String,
    /// Backend server this grant targets
    #[serde(default)]
    pub server: String,
    /// Allowed ports; empty means no restriction
    #[serde(default)]
    pub ports: Vec<PortValue>,
    /// Allowed fully-qualified domains; empty means no restriction
    #[serde(default)]
    pub domains: Vec<String>,
    /// Allowed subdomain labels; empty means no restriction
    #[serde(default)]
    pub subdomains: Vec<String>,
    /// Set by the backend at insert time, `YYYY-MM-DD HH:MM:SS`
    #[serde(default)]
    pub create_date: String,
    /// `YYYY-MM-DD HH:MM:SS`, empty means never expires
    #[serde(default)]
    pub expire_date: String,
    /// Status flag, toggled only by enable/disable operations
    #[serde(default)]
    pub enable: bool,
}

/// Update payload: full before/after snapshots so the backend can replace the
/// record atomically, rejecting the write if `before` no longer matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GrantUpdate {
    pub before: Grant,
    pub after: Grant,
}

/// Backend server record as served by `/dashboards`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ServerInfo {
    /// Server name, referenced by `Grant::server`
    pub name: String,
    /// Admin address of the backend server
    pub dashboard_addr: String,
    /// Admin port of the backend server
    pub dashboard_port: u16,
}
