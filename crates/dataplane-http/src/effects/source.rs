use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use dataplane_anonymize::PayloadTransform;
use futures_util::{StreamExt, stream};
use tracing::{debug, warn};

use super::http::{ByteStream, HttpClient};
use super::part::{HttpPart, PartRef};
use super::request::RequestFactory;
use crate::core::{ResponseClass, classify};
use crate::data::{RequestParams, StreamResult};
use crate::error::{Error, Result};

/// Largest payload buffered for a transform. Bigger bodies are passed on
/// untransformed.
pub const MAX_TRANSFORM_BYTES: usize = 50 * 1024 * 1024;

/// Produces the parts of a transfer.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Issue the read and classify its outcome.
    ///
    /// On success the returned parts own the open response; reading them
    /// to the end or dropping them releases it.
    async fn open_part_stream(&self) -> Result<StreamResult<Vec<PartRef>>>;
}

/// Reads one HTTP response as a single part.
pub struct HttpDataSource<C> {
    name: String,
    request_id: String,
    params: RequestParams,
    client: Arc<C>,
    request_factory: RequestFactory,
    transform: Option<Arc<dyn PayloadTransform>>,
    transform_limit: usize,
}

impl<C: HttpClient> HttpDataSource<C> {
    pub fn new(
        client: Arc<C>,
        request_factory: RequestFactory,
        params: RequestParams,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            name: String::new(),
            request_id: request_id.into(),
            params,
            client,
            request_factory,
            transform: None,
            transform_limit: MAX_TRANSFORM_BYTES,
        }
    }

    /// Name given to the produced part.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Rewrite the response payload before it reaches the reader.
    #[must_use]
    pub fn with_transform(mut self, transform: Arc<dyn PayloadTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Cap on the bytes buffered for the transform.
    #[must_use]
    pub fn with_transform_limit(mut self, limit: usize) -> Self {
        self.transform_limit = limit;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    fn empty_body(&self, status: u16) -> Error {
        Error::EmptyBody {
            request_id: self.request_id.clone(),
            status,
        }
    }

    /// Wait for the first non-empty chunk and put it back in front of the
    /// rest of the body.
    async fn non_empty(&self, mut body: ByteStream, status: u16) -> Result<ByteStream> {
        loop {
            match body.next().await {
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => {
                    let head = stream::iter([Ok::<_, io::Error>(chunk)]);
                    return Ok(Box::pin(head.chain(body)));
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Err(self.empty_body(status)),
            }
        }
    }

    /// The transform needs the whole payload, so the body is drained and
    /// the response released before the part is handed out.
    async fn transformed(
        &self,
        mut body: ByteStream,
        status: u16,
        transform: &dyn PayloadTransform,
    ) -> Result<ByteStream> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = body.next().await {
            buf.extend_from_slice(&chunk?);
            if buf.len() > self.transform_limit {
                warn!(
                    request_id = %self.request_id,
                    limit = self.transform_limit,
                    "payload too large to transform, passing it on unchanged"
                );
                let head = stream::iter([Ok::<_, io::Error>(buf.freeze())]);
                return Ok(Box::pin(head.chain(body)));
            }
        }
        drop(body);

        if buf.is_empty() {
            return Err(self.empty_body(status));
        }

        let payload = Bytes::from(transform.apply(&buf).into_owned());
        debug!(request_id = %self.request_id, bytes = payload.len(), "applied payload transform");
        Ok(Box::pin(stream::iter([Ok(payload)])))
    }
}

#[async_trait]
impl<C: HttpClient> DataSource for HttpDataSource<C> {
    async fn open_part_stream(&self) -> Result<StreamResult<Vec<PartRef>>> {
        let request = self.request_factory.to_request(&self.params)?;
        debug!(request_id = %self.request_id, url = %request.url, "executing HTTP request");

        let mut response = self.client.execute(request).await.map_err(Error::call)?;
        let status = response.status;

        match classify(status) {
            ResponseClass::Success => {
                let Some(body) = response.body.take() else {
                    return Err(self.empty_body(status));
                };
                let body = match self.transform.as_deref() {
                    Some(transform) => self.transformed(body, status, transform).await?,
                    None => self.non_empty(body, status).await?,
                };
                let part: PartRef = Arc::new(HttpPart::new(self.name.clone(), body));
                Ok(StreamResult::success(vec![part]))
            }
            ResponseClass::NotAuthorized => {
                warn!(request_id = %self.request_id, status, "not authorized to read HTTP data");
                Ok(StreamResult::NotAuthorized)
            }
            ResponseClass::NotFound => {
                warn!(request_id = %self.request_id, status, "HTTP data not found");
                Ok(StreamResult::NotFound)
            }
            ResponseClass::Failed => {
                warn!(request_id = %self.request_id, status, message = %response.message, "failed to read HTTP data");
                Ok(StreamResult::error(format!(
                    "Received code transferring HTTP data: {} - {}.",
                    status, response.message
                )))
            }
        }
    }
}
