use std::sync::Arc;

use dataplane_anonymize::PayloadTransform;
use tokio::runtime::Handle;

use super::http::HttpClient;
use super::request::RequestFactory;
use super::sink::{DataSink, HttpDataSink};
use super::source::{DataSource, HttpDataSource};
use crate::core::RequestParamsProvider;
use crate::data::config::{DEFAULT_DATA_TYPE, DEFAULT_PARTITION_SIZE};
use crate::data::{HttpDataAddress, TransferContext};
use crate::error::{Error, Result};

/// Builds data sources for the transfers it can handle.
pub trait DataSourceFactory: Send + Sync {
    fn can_handle(&self, ctx: &TransferContext) -> bool;

    /// Dry-build the source, reporting why it cannot be built.
    fn validate_request(&self, ctx: &TransferContext) -> Result<()>;

    fn create_source(&self, ctx: &TransferContext) -> Result<Box<dyn DataSource>>;
}

/// Builds data sinks for the transfers it can handle.
pub trait DataSinkFactory: Send + Sync {
    fn can_handle(&self, ctx: &TransferContext) -> bool;

    /// Dry-build the sink, reporting why it cannot be built.
    fn validate_request(&self, ctx: &TransferContext) -> Result<()>;

    fn create_sink(&self, ctx: &TransferContext) -> Result<Box<dyn DataSink>>;
}

/// Creates [`HttpDataSource`]s for sources of the configured data type.
pub struct HttpDataSourceFactory<C> {
    client: Arc<C>,
    provider: Arc<RequestParamsProvider>,
    request_factory: RequestFactory,
    data_type: String,
    transform: Option<Arc<dyn PayloadTransform>>,
}

impl<C: HttpClient> HttpDataSourceFactory<C> {
    pub fn new(
        client: Arc<C>,
        provider: Arc<RequestParamsProvider>,
        request_factory: RequestFactory,
    ) -> Self {
        Self {
            client,
            provider,
            request_factory,
            data_type: DEFAULT_DATA_TYPE.to_string(),
            transform: None,
        }
    }

    #[must_use]
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Arc<dyn PayloadTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn build_source(&self, ctx: &TransferContext) -> Result<HttpDataSource<C>> {
        let address = HttpDataAddress::try_from(&ctx.source)?;
        let params = self.provider.provide_source_params(ctx)?;
        let mut source = HttpDataSource::new(
            Arc::clone(&self.client),
            self.request_factory,
            params,
            ctx.id.clone(),
        )
        .with_name(address.name.unwrap_or_default());
        if let Some(transform) = &self.transform {
            source = source.with_transform(Arc::clone(transform));
        }
        Ok(source)
    }
}

impl<C: HttpClient> DataSourceFactory for HttpDataSourceFactory<C> {
    fn can_handle(&self, ctx: &TransferContext) -> bool {
        ctx.source.kind == self.data_type
    }

    fn validate_request(&self, ctx: &TransferContext) -> Result<()> {
        self.build_source(ctx)
            .map(|_| ())
            .map_err(|e| Error::Validation(format!("Failed to build HttpDataSource: {e}")))
    }

    fn create_source(&self, ctx: &TransferContext) -> Result<Box<dyn DataSource>> {
        Ok(Box::new(self.build_source(ctx)?))
    }
}

/// Creates [`HttpDataSink`]s for destinations of the configured data type.
pub struct HttpDataSinkFactory<C> {
    client: Arc<C>,
    provider: Arc<RequestParamsProvider>,
    request_factory: RequestFactory,
    handle: Handle,
    partition_size: usize,
    data_type: String,
}

impl<C: HttpClient> HttpDataSinkFactory<C> {
    pub fn new(
        client: Arc<C>,
        provider: Arc<RequestParamsProvider>,
        request_factory: RequestFactory,
        handle: Handle,
    ) -> Self {
        Self {
            client,
            provider,
            request_factory,
            handle,
            partition_size: DEFAULT_PARTITION_SIZE,
            data_type: DEFAULT_DATA_TYPE.to_string(),
        }
    }

    #[must_use]
    pub fn with_partition_size(mut self, partition_size: usize) -> Self {
        self.partition_size = partition_size;
        self
    }

    #[must_use]
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn build_sink(&self, ctx: &TransferContext) -> Result<HttpDataSink<C>> {
        let params = self.provider.provide_sink_params(ctx)?;
        Ok(HttpDataSink::new(
            Arc::clone(&self.client),
            self.request_factory,
            params,
            ctx.id.clone(),
            self.handle.clone(),
            self.partition_size,
        ))
    }
}

impl<C: HttpClient> DataSinkFactory for HttpDataSinkFactory<C> {
    fn can_handle(&self, ctx: &TransferContext) -> bool {
        ctx.destination.kind == self.data_type
    }

    fn validate_request(&self, ctx: &TransferContext) -> Result<()> {
        self.build_sink(ctx)
            .map(|_| ())
            .map_err(|e| Error::Validation(format!("Failed to build HttpDataSink: {e}")))
    }

    fn create_sink(&self, ctx: &TransferContext) -> Result<Box<dyn DataSink>> {
        Ok(Box::new(self.build_sink(ctx)?))
    }
}
