//! Upload content.

use std::fmt;
use std::io;
use std::path::Path;

use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt, TryStreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::Result;

/// Boxed, sendable stream of byte chunks.
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// Body of an object upload.
///
/// Content is a single-pass stream: it is consumed by the upload and cannot be
/// replayed. The length is optional and only used as a hint for the transport.
pub struct ObjectContent {
    stream: ByteStream,
    length: Option<u64>,
}

impl ObjectContent {
    /// Creates content from bytes already held in memory.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let length = bytes.len() as u64;

        Self {
            stream: stream::once(async move { Ok(bytes) }).boxed(),
            length: Some(length),
        }
    }

    /// Creates content from a stream of byte chunks.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            stream: stream.boxed(),
            length: None,
        }
    }

    /// Creates content that reads from an async reader until EOF.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self::from_stream(ReaderStream::new(reader))
    }

    /// Opens a local file and streams it as upload content.
    ///
    /// # Errors
    ///
    /// Returns an [`Io`](crate::ErrorKind::Io) error if the file cannot be
    /// opened or its metadata cannot be read.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = tokio::fs::File::open(path.as_ref()).await?;
        let length = file.metadata().await?.len();

        Ok(Self::from_reader(file).with_length(length))
    }

    /// Sets the known length of the content in bytes.
    #[must_use]
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    /// Returns the known length of the content, if any.
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// Consumes the content and returns the underlying chunk stream.
    pub fn into_stream(self) -> ByteStream {
        self.stream
    }

    /// Drains the content into a single contiguous buffer.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by the underlying stream.
    pub async fn collect_bytes(self) -> io::Result<Bytes> {
        let mut stream = self.stream;
        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.try_next().await? {
            buffer.extend_from_slice(&chunk);
        }

        Ok(buffer.freeze())
    }
}

impl fmt::Debug for ObjectContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectContent")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

impl From<Bytes> for ObjectContent {
    fn from(bytes: Bytes) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for ObjectContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&'static [u8]> for ObjectContent {
    fn from(bytes: &'static [u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<String> for ObjectContent {
    fn from(text: String) -> Self {
        Self::from_bytes(text)
    }
}

impl From<&'static str> for ObjectContent {
    fn from(text: &'static str) -> Self {
        Self::from_bytes(text)
    }
}
