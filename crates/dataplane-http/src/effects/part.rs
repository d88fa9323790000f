use std::fmt;
use std::io;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures_util::stream;

use super::http::ByteStream;

/// One named unit of transferred content.
pub trait Part: Send + Sync {
    fn name(&self) -> &str;

    /// Open the content stream. The caller owns the stream and closes it
    /// by dropping it.
    fn open_stream(&self) -> io::Result<ByteStream>;
}

pub type PartRef = Arc<dyn Part>;

/// Part wrapping an open response body.
///
/// The body can be opened once; the response stays open until the stream
/// is read to the end or dropped.
pub struct HttpPart {
    name: String,
    body: Mutex<Option<ByteStream>>,
}

impl HttpPart {
    pub fn new(name: impl Into<String>, body: ByteStream) -> Self {
        Self {
            name: name.into(),
            body: Mutex::new(Some(body)),
        }
    }
}

impl Part for HttpPart {
    fn name(&self) -> &str {
        &self.name
    }

    fn open_stream(&self) -> io::Result<ByteStream> {
        let mut body = self
            .body
            .lock()
            .map_err(|_| io::Error::other("part body lock poisoned"))?;
        body.take().ok_or_else(|| {
            io::Error::other(format!("stream of part `{}` was already opened", self.name))
        })
    }
}

impl fmt::Debug for HttpPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpPart").field("name", &self.name).finish_non_exhaustive()
    }
}

/// In-memory part; can be opened any number of times.
#[derive(Debug, Clone)]
pub struct BytesPart {
    name: String,
    bytes: Bytes,
}

impl BytesPart {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl Part for BytesPart {
    fn name(&self) -> &str {
        &self.name
    }

    fn open_stream(&self) -> io::Result<ByteStream> {
        Ok(Box::pin(stream::iter([Ok::<_, io::Error>(self.bytes.clone())])))
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    #[tokio::test]
    async fn http_part_opens_once() {
        let part = HttpPart::new("building", Box::pin(stream::iter([Ok::<_, io::Error>(Bytes::from_static(b"x"))])));
        let mut stream = part.open_stream().unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), Bytes::from_static(b"x"));
        assert!(part.open_stream().is_err());
    }

    #[tokio::test]
    async fn bytes_part_reopens() {
        let part = BytesPart::new("p", "abc");
        for _ in 0..2 {
            let chunk = part.open_stream().unwrap().next().await.unwrap().unwrap();
            assert_eq!(chunk, Bytes::from_static(b"abc"));
        }
        assert_eq!(part.name(), "p");
    }
}
