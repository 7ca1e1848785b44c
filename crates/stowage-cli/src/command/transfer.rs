//! Local input and output for object transfers.

use std::path::Path;

use anyhow::Context;
use stowage_core::{ObjectContent, ObjectStream};
use tempfile::NamedTempFile;
use tokio::io::{self, AsyncWrite, AsyncWriteExt};

/// Path that selects stdin as upload input.
const STDIN_PATH: &str = "-";

/// Opens upload content from a file, or from stdin for `-`.
pub async fn open_input(path: &Path) -> anyhow::Result<ObjectContent> {
    if path == Path::new(STDIN_PATH) {
        return Ok(ObjectContent::from_reader(io::stdin()));
    }

    ObjectContent::from_file(path)
        .await
        .with_context(|| format!("failed to open '{}'", path.display()))
}

/// Copies a download stream into a writer, returning the number of bytes copied.
pub async fn copy_stream<W>(stream: ObjectStream, writer: &mut W) -> io::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut reader = stream.into_async_read();
    io::copy(&mut reader, writer).await
}

/// Writes a download stream to a file, replacing any existing one.
///
/// The data goes to a temporary file next to `path` that is renamed into place
/// once the stream ends. A failed download leaves `path` untouched.
pub async fn write_to_file(stream: ObjectStream, path: &Path) -> anyhow::Result<u64> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let (file, temp_path) = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create a temporary file in '{}'", dir.display()))?
        .into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let written = copy_stream(stream, &mut file)
        .await
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    file.flush().await?;
    drop(file);

    temp_path
        .persist(path)
        .with_context(|| format!("failed to move download into '{}'", path.display()))?;

    Ok(written)
}

/// Writes a response body followed by a newline.
pub async fn write_body<W>(writer: &mut W, body: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(body).await?;
    if !body.ends_with(b"\n") {
        writer.write_all(b"\n").await?;
    }
    Ok(())
}
