//! Access-Grant Core
//!
//! This crate defines the grant data model shared by the panel backend and
//! console, together with the pure logic the console is built around: field
//! validation, port-range allocation, form/wire normalization and config
//! template rendering.

pub mod allocator;
pub mod error;
pub mod grant;
pub mod normalize;
pub mod ports;
pub mod template;
pub mod validate;
pub mod wire;

pub use allocator::{AllocError, PortAllocator, PortRange};
pub use error::{OpCode, RejectKind, ValidationError};
pub use grant::{Grant, GrantUpdate, PortValue, ServerInfo};
pub use ports::PortSpec;
pub use template::{RenderContext, RenderError};
pub use validate::FieldCheck;

/// Lowest valid port number in a grant.
pub const PORT_MIN: u16 = 1;

/// Highest valid port number in a grant.
pub const PORT_MAX: u16 = 65535;
