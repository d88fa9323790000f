#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use dataplane_http::{ByteStream, HttpClient, HttpRequest, HttpResponse, RequestParams};
use futures_util::{StreamExt, stream};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug)]
pub struct MockError(pub String);

impl std::fmt::Display for MockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MockError {}

#[derive(Debug, Clone)]
pub enum Reply {
    Status { status: u16, message: String, body: Option<Vec<Bytes>> },
    Fail(String),
}

impl Reply {
    pub fn status(status: u16) -> Self {
        Reply::Status {
            status,
            message: format!("status {status}"),
            body: None,
        }
    }

    pub fn with_body(status: u16, body: impl Into<Bytes>) -> Self {
        Reply::Status {
            status,
            message: format!("status {status}"),
            body: Some(vec![body.into()]),
        }
    }

    /// A body delivered as the given chunks; no chunks is a present but
    /// empty stream.
    pub fn with_chunks(status: u16, chunks: &[&'static str]) -> Self {
        Reply::Status {
            status,
            message: format!("status {status}"),
            body: Some(chunks.iter().map(|&c| Bytes::from_static(c.as_bytes())).collect()),
        }
    }
}

/// What the mock saw of one request, body included.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub content_length: Option<u64>,
    pub chunked: bool,
    pub body: Vec<u8>,
}

/// Scripted client. Replies are served in order; once the script is
/// exhausted the fallback reply is used.
pub struct MockClient {
    script: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    requests: Mutex<Vec<Recorded>>,
    open_bodies: Arc<AtomicUsize>,
    served_bodies: AtomicUsize,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockClient {
    pub fn new(fallback: Reply) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            requests: Mutex::new(Vec::new()),
            open_bodies: Arc::new(AtomicUsize::new(0)),
            served_bodies: AtomicUsize::new(0),
            delay: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Hold every call open for `delay` before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Highest number of `execute` calls seen running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn then(self, reply: Reply) -> Self {
        self.script.lock().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Response bodies handed out and not yet dropped.
    pub fn open_bodies(&self) -> usize {
        self.open_bodies.load(Ordering::SeqCst)
    }

    pub fn served_bodies(&self) -> usize {
        self.served_bodies.load(Ordering::SeqCst)
    }

    fn tracked(&self, chunks: Vec<Bytes>) -> ByteStream {
        self.open_bodies.fetch_add(1, Ordering::SeqCst);
        self.served_bodies.fetch_add(1, Ordering::SeqCst);
        let guard = OpenGuard(Arc::clone(&self.open_bodies));
        Box::pin(stream::iter(chunks.into_iter().map(Ok::<_, io::Error>)).map(move |chunk| {
            let _ = &guard;
            chunk
        }))
    }
}

struct OpenGuard(Arc<AtomicUsize>);

impl Drop for OpenGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl HttpClient for MockClient {
    type Error = MockError;

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let result = self.respond(request).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl MockClient {
    async fn respond(&self, request: HttpRequest) -> Result<HttpResponse, MockError> {
        let (content_length, chunked) = match &request.body {
            Some(body) => (body.content_length(), body.is_chunked()),
            None => (None, false),
        };
        let mut recorded = Recorded {
            method: request.method.clone(),
            url: request.url.to_string(),
            headers: request.headers.clone(),
            content_length,
            chunked,
            body: Vec::new(),
        };
        let written = match request.body {
            Some(body) => body.write_to(&mut recorded.body).await.map(|_| ()),
            None => Ok(()),
        };
        self.requests.lock().unwrap().push(recorded);
        written.map_err(|e| MockError(e.to_string()))?;

        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match reply {
            Reply::Fail(message) => Err(MockError(message)),
            Reply::Status { status, message, body } => {
                let mut response = HttpResponse::new(status, message);
                if let Some(chunks) = body {
                    response = response.with_body(self.tracked(chunks));
                }
                Ok(response)
            }
        }
    }
}

pub async fn read_all(mut stream: ByteStream) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    out
}

pub fn params(method: &str, base_url: &str) -> RequestParams {
    let mut builder = RequestParams::builder();
    builder.method(method).base_url(base_url);
    builder.build().unwrap()
}

/// Captures formatted log output of the current thread.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
