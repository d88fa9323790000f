use std::sync::Arc;

use tracing::debug;

use super::decorator::{
    CommonParamsDecorator, ParamsDecorator, SinkParamsDecorator, SourceParamsDecorator,
};
use crate::data::{DataAddress, HttpDataAddress, RequestParams, TransferContext};
use crate::effects::SecretStore;
use crate::error::Result;

/// Builds [`RequestParams`] by running an ordered decorator chain.
///
/// Two chains exist: one for reading from the source address and one for
/// writing to the destination address. Registration is append-only and
/// happens before the provider is shared; once behind an `Arc` the chains
/// are read-only.
#[derive(Default)]
pub struct RequestParamsProvider {
    source_decorators: Vec<Arc<dyn ParamsDecorator>>,
    sink_decorators: Vec<Arc<dyn ParamsDecorator>>,
}

impl RequestParamsProvider {
    /// A provider with the default chains: the common decorator first,
    /// then the side-specific one.
    pub fn new(secrets: Arc<dyn SecretStore>) -> Self {
        let common: Arc<dyn ParamsDecorator> = Arc::new(CommonParamsDecorator::new(secrets));

        let mut provider = Self::default();
        provider.register_source_decorator_arc(Arc::clone(&common));
        provider.register_sink_decorator_arc(common);
        provider.register_source_decorator(SourceParamsDecorator);
        provider.register_sink_decorator(SinkParamsDecorator);
        provider
    }

    pub fn register_source_decorator(&mut self, decorator: impl ParamsDecorator + 'static) {
        self.source_decorators.push(Arc::new(decorator));
    }

    pub fn register_sink_decorator(&mut self, decorator: impl ParamsDecorator + 'static) {
        self.sink_decorators.push(Arc::new(decorator));
    }

    /// Register a decorator instance that is also used elsewhere.
    pub fn register_source_decorator_arc(&mut self, decorator: Arc<dyn ParamsDecorator>) {
        self.source_decorators.push(decorator);
    }

    pub fn register_sink_decorator_arc(&mut self, decorator: Arc<dyn ParamsDecorator>) {
        self.sink_decorators.push(decorator);
    }

    pub fn source_decorator_count(&self) -> usize {
        self.source_decorators.len()
    }

    pub fn sink_decorator_count(&self) -> usize {
        self.sink_decorators.len()
    }

    pub fn provide_source_params(&self, ctx: &TransferContext) -> Result<RequestParams> {
        debug!(request_id = %ctx.id, "providing source request params");
        Self::provide(&self.source_decorators, ctx, &ctx.source)
    }

    pub fn provide_sink_params(&self, ctx: &TransferContext) -> Result<RequestParams> {
        debug!(request_id = %ctx.id, "providing sink request params");
        Self::provide(&self.sink_decorators, ctx, &ctx.destination)
    }

    fn provide(
        decorators: &[Arc<dyn ParamsDecorator>],
        ctx: &TransferContext,
        address: &DataAddress,
    ) -> Result<RequestParams> {
        let address = HttpDataAddress::try_from(address)?;
        let mut params = RequestParams::builder();
        for decorator in decorators {
            decorator.decorate(ctx, &address, &mut params)?;
        }
        params.build()
    }
}
