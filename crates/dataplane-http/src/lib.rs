//! Streaming HTTP transfer for the data plane.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Addresses, transfer contexts, request parameters and outcomes
//! - [`core`] - Decorator chains and response classification, no I/O
//! - [`effects`] - HTTP client, request bodies, data source and data sink
//!
//! A transfer flows from a [`TransferContext`] through the
//! [`RequestParamsProvider`] decorator chain into [`RequestParams`], which
//! the [`RequestFactory`] turns into an [`HttpRequest`]. The
//! [`HttpDataSource`] reads a response into [`Part`]s; the
//! [`HttpDataSink`] uploads parts in bounded parallel partitions.
//!
//! Retries and scheduling are the caller's concern.

pub mod core;
pub mod data;
pub mod effects;
mod error;
mod extension;
mod pipeline;

pub use crate::core::{
    CommonParamsDecorator, ParamsDecorator, RequestParamsProvider, ResponseClass,
    SinkParamsDecorator, SourceParamsDecorator, classify, partition,
};
pub use crate::data::{
    AnonymizeConfig, AuthLocation, DataAddress, DataPlaneConfig, HttpDataAddress, RequestParams,
    RequestParamsBuilder, StreamResult, TransferContext,
};
pub use crate::effects::{
    BodySupplier, BoxStream, ByteStream, BytesPart, ChunkedTransferBody, DataSink,
    DataSinkFactory, DataSource, DataSourceFactory, HttpClient, HttpDataSink,
    HttpDataSinkFactory, HttpDataSource, HttpDataSourceFactory, HttpPart, HttpRequest,
    HttpResponse, InMemorySecretStore, NonChunkedTransferBody, Part, PartRef, RequestFactory,
    SecretStore, TransferBody,
};

#[cfg(feature = "reqwest")]
pub use crate::effects::{ReqwestClient, ReqwestClientError};

pub use error::{Error, Result};
pub use extension::DataPlaneHttpExtension;
pub use pipeline::PipelineService;
