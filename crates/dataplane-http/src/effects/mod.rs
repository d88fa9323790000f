//! I/O: the HTTP client seam, request bodies, data sources and sinks.

mod body;
mod factory;
mod http;
mod part;
mod request;
mod secrets;
mod sink;
mod source;

pub use body::{BodySupplier, ChunkedTransferBody, NonChunkedTransferBody, TransferBody};
pub use factory::{DataSinkFactory, DataSourceFactory, HttpDataSinkFactory, HttpDataSourceFactory};
pub use http::{BoxStream, ByteStream, HttpClient, HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")]
pub use http::{ReqwestClient, ReqwestClientError};
pub use part::{BytesPart, HttpPart, Part, PartRef};
pub use request::RequestFactory;
pub use secrets::{InMemorySecretStore, SecretStore};
pub use sink::{DataSink, HttpDataSink};
pub use source::{DataSource, HttpDataSource};
