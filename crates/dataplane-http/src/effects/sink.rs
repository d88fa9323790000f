use std::sync::Arc;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use super::body::BodySupplier;
use super::http::HttpClient;
use super::part::PartRef;
use super::request::RequestFactory;
use super::source::DataSource;
use crate::core::partition;
use crate::data::{RequestParams, StreamResult};
use crate::error::Result;

const ERROR_WRITING_DATA: &str = "Error writing data";

/// Consumes the parts of a transfer.
#[async_trait]
pub trait DataSink: Send + Sync {
    /// Pull the parts from `source` and write them out.
    ///
    /// A failed outcome of the source is returned unchanged.
    async fn transfer(&self, source: &dyn DataSource) -> Result<StreamResult<()>>;
}

/// State shared by every partition task of one sink.
struct PartWriter<C> {
    request_id: String,
    params: RequestParams,
    client: Arc<C>,
    request_factory: RequestFactory,
    permits: Semaphore,
}

impl<C: HttpClient> PartWriter<C> {
    /// A partition completes with its first upload: success ends the
    /// batch, and so does a failure.
    async fn transfer_parts(&self, parts: Vec<PartRef>) -> StreamResult<()> {
        let Some(part) = parts.first() else {
            return StreamResult::success(());
        };
        if parts.len() > 1 {
            debug!(
                request_id = %self.request_id,
                part = part.name(),
                remaining = parts.len() - 1,
                "partition completes with its first part"
            );
        }
        self.write_part(part).await
    }

    async fn write_part(&self, part: &PartRef) -> StreamResult<()> {
        let Ok(_permit) = self.permits.acquire().await else {
            return StreamResult::error(ERROR_WRITING_DATA);
        };

        let opener = Arc::clone(part);
        let supplier: BodySupplier = Box::new(move || opener.open_stream());
        let request = match self
            .request_factory
            .to_request_with_body(&self.params, supplier)
            .await
        {
            Ok(request) => request,
            Err(e) => {
                error!(request_id = %self.request_id, part = part.name(), error = %e, "failed to build HTTP request");
                return StreamResult::error(ERROR_WRITING_DATA);
            }
        };

        let url = request.url.to_string();
        let target = request.to_string();
        debug!(request_id = %self.request_id, part = part.name(), url = %url, "writing HTTP data");

        match self.client.execute(request).await {
            Ok(response) if response.is_success() => StreamResult::success(()),
            Ok(response) => {
                error!(
                    request_id = %self.request_id,
                    part = part.name(),
                    url = %url,
                    request = %target,
                    status = response.status,
                    message = %response.message,
                    "error received writing HTTP data"
                );
                StreamResult::error(ERROR_WRITING_DATA)
            }
            Err(e) => {
                error!(
                    request_id = %self.request_id,
                    part = part.name(),
                    url = %url,
                    request = %target,
                    error = %e,
                    "error writing HTTP data"
                );
                StreamResult::error(ERROR_WRITING_DATA)
            }
        }
    }
}

/// Writes parts to an HTTP endpoint in parallel partitions.
///
/// Parts are split into partitions of `partition_size`, each partition
/// runs as a task on the shared runtime, and at most `partition_size`
/// uploads of this sink are in flight at once. No part is retried.
pub struct HttpDataSink<C> {
    writer: Arc<PartWriter<C>>,
    handle: Handle,
    partition_size: usize,
}

impl<C: HttpClient> HttpDataSink<C> {
    pub fn new(
        client: Arc<C>,
        request_factory: RequestFactory,
        params: RequestParams,
        request_id: impl Into<String>,
        handle: Handle,
        partition_size: usize,
    ) -> Self {
        let partition_size = partition_size.max(1);
        Self {
            writer: Arc::new(PartWriter {
                request_id: request_id.into(),
                params,
                client,
                request_factory,
                permits: Semaphore::new(partition_size),
            }),
            handle,
            partition_size,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.writer.request_id
    }

    pub fn params(&self) -> &RequestParams {
        &self.writer.params
    }

    pub fn partition_size(&self) -> usize {
        self.partition_size
    }

    /// Write `parts`, aggregating the partition outcomes. Any failed
    /// partition, or one whose task panicked, fails the whole call.
    pub async fn transfer_parts(&self, parts: Vec<PartRef>) -> StreamResult<()> {
        let tasks: Vec<_> = partition(parts, self.partition_size)
            .into_iter()
            .map(|batch| {
                let writer = Arc::clone(&self.writer);
                self.handle.spawn(async move { writer.transfer_parts(batch).await })
            })
            .collect();

        let mut failure = None;
        for task in tasks {
            match task.await {
                Ok(StreamResult::Success(())) => {}
                Ok(failed) => {
                    failure.get_or_insert(failed);
                }
                Err(e) => {
                    error!(request_id = %self.writer.request_id, error = %e, "partition task failed");
                    failure.get_or_insert_with(|| {
                        StreamResult::error(format!(
                            "Unhandled exception raised when transferring data: {e}"
                        ))
                    });
                }
            }
        }
        failure.unwrap_or(StreamResult::Success(()))
    }
}

#[async_trait]
impl<C: HttpClient> DataSink for HttpDataSink<C> {
    async fn transfer(&self, source: &dyn DataSource) -> Result<StreamResult<()>> {
        let parts = match source.open_part_stream().await? {
            StreamResult::Success(parts) => parts,
            failed => return Ok(failed.map(|_| ())),
        };
        Ok(self.transfer_parts(parts).await)
    }
}
