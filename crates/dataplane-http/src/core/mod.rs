//! Pure request construction and response classification.
//!
//! Nothing in this module performs I/O; secrets are looked up through the
//! [`crate::effects::SecretStore`] collaborator.

mod decorator;
mod partition;
mod provider;
mod status;

pub use decorator::{CommonParamsDecorator, ParamsDecorator, SinkParamsDecorator, SourceParamsDecorator};
pub use partition::partition;
pub use provider::RequestParamsProvider;
pub use status::{ResponseClass, classify};
