use std::sync::Arc;

use dataplane_anonymize::{AnonymizingTransform, PayloadTransform};
use tokio::runtime::Handle;
use tracing::info;

use crate::core::{ParamsDecorator, RequestParamsProvider};
use crate::data::DataPlaneConfig;
use crate::effects::{
    HttpClient, HttpDataSinkFactory, HttpDataSourceFactory, RequestFactory, SecretStore,
};
use crate::error::Result;
use crate::pipeline::PipelineService;

/// Wires the HTTP source and sink into a [`PipelineService`].
///
/// Extra decorators registered here run after the default ones, so they
/// take precedence over them.
pub struct DataPlaneHttpExtension {
    config: DataPlaneConfig,
    source_decorators: Vec<Arc<dyn ParamsDecorator>>,
    sink_decorators: Vec<Arc<dyn ParamsDecorator>>,
}

impl DataPlaneHttpExtension {
    pub const NAME: &'static str = "Data Plane HTTP Anonymize";

    pub fn new(config: DataPlaneConfig) -> Self {
        Self {
            config,
            source_decorators: Vec::new(),
            sink_decorators: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn config(&self) -> &DataPlaneConfig {
        &self.config
    }

    #[must_use]
    pub fn with_source_decorator(mut self, decorator: impl ParamsDecorator + 'static) -> Self {
        self.source_decorators.push(Arc::new(decorator));
        self
    }

    #[must_use]
    pub fn with_sink_decorator(mut self, decorator: impl ParamsDecorator + 'static) -> Self {
        self.sink_decorators.push(Arc::new(decorator));
        self
    }

    /// Validate the configuration and build the pipeline.
    ///
    /// `handle` is the runtime sink partitions are spawned on; it is shared
    /// and its lifecycle belongs to the caller.
    pub fn initialize<C: HttpClient>(
        self,
        client: Arc<C>,
        secrets: Arc<dyn SecretStore>,
        handle: Handle,
    ) -> Result<PipelineService> {
        self.config.validate()?;

        let mut provider = RequestParamsProvider::new(secrets);
        for decorator in self.source_decorators {
            provider.register_source_decorator_arc(decorator);
        }
        for decorator in self.sink_decorators {
            provider.register_sink_decorator_arc(decorator);
        }
        let provider = Arc::new(provider);
        let request_factory = RequestFactory::new();

        let mut source_factory =
            HttpDataSourceFactory::new(Arc::clone(&client), Arc::clone(&provider), request_factory)
                .with_data_type(self.config.data_type.clone());
        if self.config.anonymize.enabled {
            let transform: Arc<dyn PayloadTransform> =
                Arc::new(AnonymizingTransform::new(self.config.anonymize.trustees.iter()));
            source_factory = source_factory.with_transform(transform);
        }
        let sink_factory = HttpDataSinkFactory::new(client, provider, request_factory, handle)
            .with_partition_size(self.config.sink_partition_size)
            .with_data_type(self.config.data_type.clone());

        let mut pipeline = PipelineService::new();
        pipeline.register_source_factory(source_factory);
        pipeline.register_sink_factory(sink_factory);

        info!(
            extension = Self::NAME,
            data_type = %self.config.data_type,
            partition_size = self.config.sink_partition_size,
            anonymize = self.config.anonymize.enabled,
            "initialized"
        );
        Ok(pipeline)
    }
}
