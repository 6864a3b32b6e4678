//! Session state for one console run.
//!
//! The dashboard list, the editable config template and the allocation-time
//! max-port map are session state passed to the code that needs them, not
//! process globals. The max-port map is fetched once per allocation dialog
//! and reused while the operator fiddles with the count, which bounds request
//! volume; a response that arrives after its dialog was superseded is
//! discarded by epoch tag.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;

use relaypanel_grants::template::{self, RenderContext, RenderError};
use relaypanel_grants::{AllocError, Grant, PortAllocator, PortRange, ServerInfo};

/// Default config template, editable per session.
pub const DEFAULT_TEMPLATE: &str = r#"serverAddr = "{ServerIP}"
serverPort = {ServerPort}
user = "{User}"
metadatas.token = "{token}"

auth.method = "token"

[[proxies]]
type = "tcp"
name = "{ProxyName}"
localIP = "127.0.0.1"
localPort = 10000
remotePort = {Port}
transport.useEncryption = true
transport.useCompression = true"#;

/// Why no range was proposed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    /// The max-port map never arrived (fetch failed or still pending);
    /// proposing anything could collide with existing grants.
    #[error("max port lookup unavailable, enter ports manually")]
    MaxPortUnavailable,
    #[error(transparent)]
    Alloc(#[from] AllocError),
}

/// Handle for one allocation dialog. Installing a max-port map requires the
/// ticket it was fetched under; a stale ticket is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationTicket {
    epoch: u64,
}

/// Shared busy flag: acquired before each request is dispatched, released on
/// every exit path when the guard drops.
#[derive(Debug, Clone, Default)]
pub struct BusyIndicator(Arc<AtomicUsize>);

impl BusyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> BusyGuard {
        self.0.fetch_add(1, Ordering::SeqCst);
        BusyGuard(self.0.clone())
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst) > 0
    }
}

/// RAII release of the busy indicator.
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicUsize>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// State of one admin-console session.
#[derive(Debug)]
pub struct ConsoleSession {
    dashboards: Vec<ServerInfo>,
    current_index: usize,
    template: String,
    allocator: PortAllocator,
    alloc_epoch: u64,
    max_ports: Option<HashMap<String, u16>>,
    busy: BusyIndicator,
}

impl ConsoleSession {
    pub fn new(allocator: PortAllocator) -> Self {
        Self {
            dashboards: Vec::new(),
            current_index: 0,
            template: DEFAULT_TEMPLATE.to_string(),
            allocator,
            alloc_epoch: 0,
            max_ports: None,
            busy: BusyIndicator::new(),
        }
    }

    pub fn busy(&self) -> &BusyIndicator {
        &self.busy
    }

    pub fn dashboards(&self) -> &[ServerInfo] {
        &self.dashboards
    }

    pub fn current_dashboard(&self) -> Option<&ServerInfo> {
        self.dashboards.get(self.current_index)
    }

    pub fn set_dashboards(&mut self, dashboards: Vec<ServerInfo>, current_index: usize) {
        self.dashboards = dashboards;
        self.current_index = current_index;
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = template.into();
    }

    /// Start a new allocation dialog. Any max-port map still in flight for a
    /// previous dialog becomes stale.
    pub fn open_allocation(&mut self) -> AllocationTicket {
        self.alloc_epoch += 1;
        self.max_ports = None;
        AllocationTicket {
            epoch: self.alloc_epoch,
        }
    }

    /// Install a fetched max-port map. Returns false (and installs nothing)
    /// when the ticket belongs to a superseded dialog.
    pub fn install_max_ports(
        &mut self,
        ticket: AllocationTicket,
        map: HashMap<String, u16>,
    ) -> bool {
        if ticket.epoch != self.alloc_epoch {
            debug!("discarding stale max-port map for epoch {}", ticket.epoch);
            return false;
        }
        self.max_ports = Some(map);
        true
    }

    /// Propose a port range for `count` new proxies on `server`. Pure over
    /// the installed map: changing server or count just means calling again.
    pub fn propose(&self, server: &str, count: u16) -> Result<Option<PortRange>, AllocationError> {
        let map = self
            .max_ports
            .as_ref()
            .ok_or(AllocationError::MaxPortUnavailable)?;
        // absent or 0 means the server has no granted ports yet: the
        // configured floor applies
        let max_port = map.get(server).copied().filter(|&m| m > 0);
        Ok(self.allocator.propose(max_port, count)?)
    }

    /// Render the config export for the selected grants.
    pub fn export(
        &self,
        grants: &[Grant],
        fallback_host: &str,
        fallback_port: u16,
    ) -> Result<String, RenderError> {
        let ctx = RenderContext {
            servers: &self.dashboards,
            fallback_host,
            fallback_port,
        };
        template::render_all(&self.template, grants, &ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaypanel_grants::PortValue;

    fn session() -> ConsoleSession {
        let mut session = ConsoleSession::new(PortAllocator::new(10_000));
        session.set_dashboards(
            vec![ServerInfo {
                name: "eu-1".to_string(),
                dashboard_addr: "10.0.0.5".to_string(),
                dashboard_port: 7500,
            }],
            0,
        );
        session
    }

    #[test]
    fn proposal_requires_an_installed_map() {
        let mut session = session();
        assert_eq!(
            session.propose("eu-1", 5),
            Err(AllocationError::MaxPortUnavailable)
        );

        let ticket = session.open_allocation();
        assert!(session.install_max_ports(ticket, HashMap::from([("eu-1".to_string(), 7200)])));

        let range = session.propose("eu-1", 5).unwrap().unwrap();
        assert_eq!(range.to_string(), "7201-7206");
    }

    #[test]
    fn unknown_or_empty_server_starts_at_the_floor() {
        let mut session = session();
        let ticket = session.open_allocation();
        session.install_max_ports(
            ticket,
            HashMap::from([("eu-1".to_string(), 7200), ("ap-1".to_string(), 0)]),
        );

        assert_eq!(
            session.propose("ap-1", 3).unwrap().unwrap().to_string(),
            "10001-10004"
        );
        assert_eq!(
            session.propose("brand-new", 3).unwrap().unwrap().to_string(),
            "10001-10004"
        );
    }

    #[test]
    fn zero_count_means_manual_entry() {
        let mut session = session();
        let ticket = session.open_allocation();
        session.install_max_ports(ticket, HashMap::new());
        assert_eq!(session.propose("eu-1", 0).unwrap(), None);
    }

    #[test]
    fn stale_map_is_discarded() {
        let mut session = session();
        let old_ticket = session.open_allocation();
        let _new_ticket = session.open_allocation();

        assert!(!session.install_max_ports(old_ticket, HashMap::from([("eu-1".to_string(), 7200)])));
        // the superseded response left no map behind
        assert_eq!(
            session.propose("eu-1", 5),
            Err(AllocationError::MaxPortUnavailable)
        );
    }

    #[test]
    fn reopening_the_dialog_drops_the_old_map() {
        let mut session = session();
        let ticket = session.open_allocation();
        session.install_max_ports(ticket, HashMap::from([("eu-1".to_string(), 7200)]));

        session.open_allocation();
        assert_eq!(
            session.propose("eu-1", 5),
            Err(AllocationError::MaxPortUnavailable)
        );
    }

    #[test]
    fn busy_guard_releases_on_drop() {
        let busy = BusyIndicator::new();
        assert!(!busy.is_busy());
        {
            let _first = busy.acquire();
            let _second = busy.acquire();
            assert!(busy.is_busy());
        }
        assert!(!busy.is_busy());
    }

    #[test]
    fn export_uses_session_template_and_dashboards() {
        let mut session = session();
        session.set_template("{User}@{ServerIP}:{Port}");

        let grant = Grant {
            user: "alice".to_string(),
            token: "tok".to_string(),
            comment: String::new(),
            server: "eu-1".to_string(),
            ports: vec![PortValue::Num(8080)],
            domains: vec![],
            subdomains: vec![],
            create_date: String::new(),
            expire_date: String::new(),
            enable: true,
        };

        let out = session.export(&[grant], "panel.local", 8080).unwrap();
        assert_eq!(out, "### relayc_alice.ini ###\nalice@10.0.0.5:8080\n");
    }

    #[test]
    fn export_refuses_empty_selection() {
        let session = session();
        assert_eq!(
            session.export(&[], "panel.local", 8080),
            Err(RenderError::NothingSelected)
        );
    }
}
