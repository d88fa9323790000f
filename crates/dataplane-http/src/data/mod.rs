//! Immutable data types for HTTP transfers.
//!
//! Addresses and transfer contexts come from the caller; request
//! parameters are produced by the decorator chain; stream results are what
//! sources and sinks hand back.

pub mod address;
pub mod config;
pub mod context;
pub mod params;
pub mod result;

pub use address::{AuthLocation, DataAddress, HttpDataAddress, keys};
pub use config::{AnonymizeConfig, DataPlaneConfig};
pub use context::TransferContext;
pub use params::{RequestParams, RequestParamsBuilder};
pub use result::StreamResult;
