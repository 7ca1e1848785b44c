//! Download streams.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt, TryStreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use super::ByteStream;

/// Body of an object download.
///
/// The stream is lazy and single-pass: chunks are pulled from the connection
/// as the caller polls, and the stream cannot be restarted. The caller owns
/// its lifecycle; dropping it releases the underlying connection.
pub struct ObjectStream {
    inner: ByteStream,
    content_length: Option<u64>,
    content_type: Option<String>,
}

impl ObjectStream {
    /// Wraps a stream of byte chunks.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
            content_length: None,
            content_type: None,
        }
    }

    /// Sets the content length announced by the server.
    #[must_use]
    pub fn with_content_length(mut self, content_length: Option<u64>) -> Self {
        self.content_length = content_length;
        self
    }

    /// Sets the content type announced by the server.
    #[must_use]
    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    /// Returns the content length announced by the server, if any.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Returns the content type announced by the server, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Adapts the stream into an [`AsyncRead`].
    pub fn into_async_read(self) -> impl AsyncRead + Send + Unpin {
        StreamReader::new(self)
    }

    /// Drains the remaining chunks into a single contiguous buffer.
    ///
    /// # Errors
    ///
    /// Returns the first error produced while reading the body.
    pub async fn collect_bytes(mut self) -> io::Result<Bytes> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.inner.try_next().await? {
            buffer.extend_from_slice(&chunk);
        }

        Ok(buffer.freeze())
    }
}

impl Stream for ObjectStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl fmt::Debug for ObjectStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStream")
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
