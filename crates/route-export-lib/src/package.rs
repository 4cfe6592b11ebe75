//! Archive packaging
//!
//! Each chunk becomes one deflated text entry `route-part-<n>.txt`
//! (1-indexed) inside an in-memory zip archive.

use crate::chunk::Chunk;
use crate::{ExportError, Result};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Default name of the produced archive
pub const DEFAULT_ARCHIVE_NAME: &str = "route-export.zip";

/// Name of the entry holding the chunk at `index` (0-based)
#[inline]
pub fn entry_name(index: usize) -> String {
    format!("route-part-{}.txt", index + 1)
}

/// A finished archive, ready to be written or downloaded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Archive {
    file_name: String,
    entries: Vec<String>,
    bytes: Vec<u8>,
}

impl Archive {
    /// Suggested file name for the archive
    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Entry names in archive order
    #[inline]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Compressed archive bytes
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Serialize `chunks` into a zip archive named `file_name`
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn package(chunks: &[Chunk], file_name: &str) -> Result<Archive> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut entries = Vec::with_capacity(chunks.len());

    for (index, chunk) in chunks.iter().enumerate() {
        let name = entry_name(index);
        writer.start_file(name.as_str(), options)?;
        writer.write_all(chunk.render().as_bytes())?;
        entries.push(name);
    }

    let bytes = writer.finish()?.into_inner();
    tracing::debug!(
        "Packaged {} entries into {} ({} bytes)",
        entries.len(),
        file_name,
        bytes.len()
    );

    Ok(Archive {
        file_name: file_name.to_string(),
        entries,
        bytes,
    })
}

/// [`package`] on tokio's blocking pool so compression does not stall the caller's executor
pub async fn package_async(chunks: Vec<Chunk>, file_name: String) -> Result<Archive> {
    tokio::task::spawn_blocking(move || package(&chunks, &file_name))
        .await
        .map_err(|e| ExportError::TaskJoin(e.to_string()))?
}
