//! Console-session logic for the relay panel.
//!
//! Everything the admin console does between the operator's keyboard and the
//! panel backend: a typed REST client, grant form validation with an explicit
//! normalized-value apply step, port allocation sessions over a cached
//! max-port map, and config export.

pub mod client;
pub mod error;
pub mod form;
pub mod ops;
pub mod session;

pub use client::{BulkOp, PanelClient};
pub use error::{ClientError, ConsoleError};
pub use form::{GrantForm, NormalizedForm};
pub use ops::PanelOps;
pub use session::{AllocationError, AllocationTicket, BusyGuard, BusyIndicator, ConsoleSession, DEFAULT_TEMPLATE};
