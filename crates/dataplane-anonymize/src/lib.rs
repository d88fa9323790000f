//! Redaction of building records travelling through the data plane.
//!
//! The payload returned by a building-data endpoint carries the name of
//! its data trustee. When that trustee is one of the configured providers,
//! the owner's first and last name are masked before the bytes reach the
//! consumer. Every failure degrades to passing the original bytes through.

mod error;
mod model;
mod transform;

pub use error::TransformError;
pub use model::BuildingRecord;
pub use transform::{AnonymizingTransform, DEFAULT_TRUSTEE, PayloadTransform, mask};
