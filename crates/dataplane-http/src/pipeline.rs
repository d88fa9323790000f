use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::data::{StreamResult, TransferContext};
use crate::effects::{DataSinkFactory, DataSourceFactory};
use crate::error::{Error, Result};

/// Routes a transfer to the first source and sink factory that can
/// handle it.
///
/// Factories are registered at startup; the registries are append-only.
#[derive(Default)]
pub struct PipelineService {
    source_factories: Vec<Arc<dyn DataSourceFactory>>,
    sink_factories: Vec<Arc<dyn DataSinkFactory>>,
}

impl PipelineService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_source_factory(&mut self, factory: impl DataSourceFactory + 'static) {
        self.source_factories.push(Arc::new(factory));
    }

    pub fn register_sink_factory(&mut self, factory: impl DataSinkFactory + 'static) {
        self.sink_factories.push(Arc::new(factory));
    }

    fn source_factory(&self, ctx: &TransferContext) -> Option<&Arc<dyn DataSourceFactory>> {
        self.source_factories.iter().find(|f| f.can_handle(ctx))
    }

    fn sink_factory(&self, ctx: &TransferContext) -> Option<&Arc<dyn DataSinkFactory>> {
        self.sink_factories.iter().find(|f| f.can_handle(ctx))
    }

    pub fn can_handle(&self, ctx: &TransferContext) -> bool {
        self.source_factory(ctx).is_some() && self.sink_factory(ctx).is_some()
    }

    /// Dry-build both ends of the transfer.
    pub fn validate(&self, ctx: &TransferContext) -> Result<()> {
        let source = self.source_factory(ctx).ok_or_else(|| {
            Error::Validation(format!("Unknown data source type: {}", ctx.source.kind))
        })?;
        let sink = self.sink_factory(ctx).ok_or_else(|| {
            Error::Validation(format!("Unknown data sink type: {}", ctx.destination.kind))
        })?;
        source.validate_request(ctx)?;
        sink.validate_request(ctx)
    }

    /// Run one transfer from source to sink. No retry is attempted.
    ///
    /// An unroutable context is a failed outcome; a source or sink that
    /// cannot be built is an error.
    pub async fn transfer(&self, ctx: &TransferContext) -> Result<StreamResult<()>> {
        let Some(source_factory) = self.source_factory(ctx) else {
            warn!(request_id = %ctx.id, kind = %ctx.source.kind, "no data source factory for transfer");
            return Ok(StreamResult::error(format!("Unknown data source type: {}", ctx.source.kind)));
        };
        let Some(sink_factory) = self.sink_factory(ctx) else {
            warn!(request_id = %ctx.id, kind = %ctx.destination.kind, "no data sink factory for transfer");
            return Ok(StreamResult::error(format!(
                "Unknown data sink type: {}",
                ctx.destination.kind
            )));
        };

        let source = source_factory.create_source(ctx)?;
        let sink = sink_factory.create_sink(ctx)?;
        debug!(request_id = %ctx.id, process_id = %ctx.process_id, "starting transfer");

        let result = sink.transfer(source.as_ref()).await?;
        match result.failure_detail() {
            None => info!(request_id = %ctx.id, "transfer completed"),
            Some(detail) => warn!(request_id = %ctx.id, detail = %detail, "transfer failed"),
        }
        Ok(result)
    }
}
