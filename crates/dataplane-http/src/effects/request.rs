use bytes::Bytes;

use super::body::{BodySupplier, ChunkedTransferBody, NonChunkedTransferBody, TransferBody};
use super::http::HttpRequest;
use crate::data::RequestParams;
use crate::error::Result;

const CONTENT_TYPE: &str = "Content-Type";

/// Turns [`RequestParams`] into [`HttpRequest`]s.
///
/// Method, URL and headers are copied verbatim from the params, except
/// that a `Content-Type` header is left out when a body is attached: the
/// body carries the content type of the params.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFactory;

impl RequestFactory {
    pub fn new() -> Self {
        Self
    }

    /// Request without a streamed body, used on the read side. A fixed
    /// body carried by the params is sent buffered.
    pub fn to_request(&self, params: &RequestParams) -> Result<HttpRequest> {
        let body = params.body().map(|body| {
            TransferBody::NonChunked(NonChunkedTransferBody::from_bytes(
                Bytes::copy_from_slice(body.as_bytes()),
                params.content_type(),
            ))
        });
        self.build(params, body)
    }

    /// Request carrying the supplied body, used on the write side.
    ///
    /// With `non_chunked_body` set the body is read into memory now and
    /// sent with a `Content-Length`; otherwise it streams from the supplier
    /// when the request is written.
    pub async fn to_request_with_body(
        &self,
        params: &RequestParams,
        supplier: BodySupplier,
    ) -> Result<HttpRequest> {
        let body = if params.non_chunked_body() {
            TransferBody::NonChunked(NonChunkedTransferBody::new(supplier, params.content_type()).await)
        } else {
            TransferBody::Chunked(ChunkedTransferBody::new(supplier, params.content_type()))
        };
        self.build(params, Some(body))
    }

    fn build(&self, params: &RequestParams, body: Option<TransferBody>) -> Result<HttpRequest> {
        let headers = params
            .headers()
            .iter()
            .filter(|(name, _)| body.is_none() || !name.eq_ignore_ascii_case(CONTENT_TYPE))
            .cloned()
            .collect();
        Ok(HttpRequest {
            method: params.method().to_string(),
            url: params.url()?,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream;

    use super::*;
    use crate::effects::http::ByteStream;

    fn params(non_chunked: bool) -> RequestParams {
        let mut builder = RequestParams::builder();
        builder
            .method("put")
            .base_url("https://consumer.example")
            .path("buildings")
            .query_param("tenant", "north")
            .header("X-Api-Key", "k")
            .content_type("application/json")
            .non_chunked_body(non_chunked);
        builder.build().unwrap()
    }

    fn supplier() -> BodySupplier {
        Box::new(|| Ok(Box::pin(stream::iter([Ok::<_, std::io::Error>(Bytes::from_static(b"{}"))])) as ByteStream))
    }

    #[tokio::test]
    async fn copies_params_and_picks_body_encoding() {
        let factory = RequestFactory::new();

        let buffered = factory.to_request_with_body(&params(true), supplier()).await.unwrap();
        assert_eq!(buffered.method, "PUT");
        assert_eq!(buffered.url.as_str(), "https://consumer.example/buildings?tenant=north");
        assert_eq!(buffered.header("X-Api-Key"), Some("k"));
        let body = buffered.body.unwrap();
        assert_eq!(body.content_length(), Some(2));
        assert_eq!(body.content_type(), "application/json");

        let streamed = factory.to_request_with_body(&params(false), supplier()).await.unwrap();
        assert!(streamed.body.unwrap().is_chunked());
    }

    #[test]
    fn read_request_has_no_body_unless_params_carry_one() {
        let factory = RequestFactory::new();
        assert!(factory.to_request(&params(false)).unwrap().body.is_none());

        let mut builder = RequestParams::builder();
        builder.method("POST").base_url("https://provider.example").body("{\"q\":1}");
        let request = factory.to_request(&builder.build().unwrap()).unwrap();
        assert_eq!(request.body.unwrap().content_length(), Some(7));
    }

    #[tokio::test]
    async fn body_content_type_replaces_header() {
        let factory = RequestFactory::new();
        let mut builder = RequestParams::builder();
        builder
            .method("POST")
            .base_url("https://consumer.example")
            .header("content-type", "text/plain")
            .header("X-Api-Key", "k")
            .content_type("application/json");
        let params = builder.build().unwrap();

        let request = factory.to_request_with_body(&params, supplier()).await.unwrap();
        assert_eq!(request.header("Content-Type"), None);
        assert_eq!(request.header("X-Api-Key"), Some("k"));
        assert_eq!(request.body.unwrap().content_type(), "application/json");

        let read = factory.to_request(&params).unwrap();
        assert_eq!(read.header("Content-Type"), Some("text/plain"));
    }
}
