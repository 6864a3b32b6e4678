//! Operator-initiated flows, with the busy indicator scoped around every
//! request. A failed request surfaces its error and changes nothing locally;
//! nothing is retried.

use tracing::info;

use relaypanel_grants::Grant;

use crate::client::{BulkOp, PanelClient};
use crate::error::ConsoleError;
use crate::form::GrantForm;
use crate::session::{BusyIndicator, ConsoleSession};

/// The console's operation layer: client plus the shared busy flag.
#[derive(Debug, Clone)]
pub struct PanelOps {
    client: PanelClient,
    busy: BusyIndicator,
}

impl PanelOps {
    pub fn new(client: PanelClient, busy: BusyIndicator) -> Self {
        Self { client, busy }
    }

    pub fn client(&self) -> &PanelClient {
        &self.client
    }

    /// Validate the form and create the grant. Validation failures block
    /// submission and never reach the network.
    pub async fn create(&self, form: &GrantForm) -> Result<(), ConsoleError> {
        let normalized = form.validate().map_err(ConsoleError::Invalid)?;
        let grant = normalized.to_grant();

        let _busy = self.busy.acquire();
        self.client.add(&grant).await?;
        info!("created grant for user [{}]", grant.user);
        Ok(())
    }

    /// Push an edit as before/after snapshots.
    pub async fn save_edit(&self, before: Grant, after: Grant) -> Result<(), ConsoleError> {
        let _busy = self.busy.acquire();
        self.client.update(before, after).await?;
        Ok(())
    }

    /// Remove/enable/disable the selected grants.
    pub async fn bulk(&self, op: BulkOp, users: Vec<Grant>) -> Result<(), ConsoleError> {
        if users.is_empty() {
            return Err(ConsoleError::NothingSelected);
        }
        let _busy = self.busy.acquire();
        self.client.operate(op, users).await?;
        Ok(())
    }

    /// Refresh the session's dashboard cache.
    pub async fn refresh_dashboards(&self, session: &mut ConsoleSession) -> Result<(), ConsoleError> {
        let _busy = self.busy.acquire();
        let (dashboards, current_index) = self.client.dashboards().await?;
        session.set_dashboards(dashboards, current_index);
        Ok(())
    }

    /// Open an allocation dialog: fetch the max-port map once and install it
    /// under the dialog's ticket. If the dialog was superseded while the
    /// fetch was in flight, the arriving map is dropped.
    pub async fn begin_allocation(&self, session: &mut ConsoleSession) -> Result<(), ConsoleError> {
        let ticket = session.open_allocation();
        let _busy = self.busy.acquire();
        let map = self.client.all_max_ports().await?;
        session.install_max_ports(ticket, map);
        Ok(())
    }
}
