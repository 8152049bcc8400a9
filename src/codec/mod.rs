//! Text safety and transport encoding for compiled blueprints.

pub mod sanitize;
pub mod transport;

pub use sanitize::{SanitizationError, clean, deep_clean, validate_no_control_characters};
pub use transport::{TransportError, decode, encode, serialize_for_transport, share_url};
