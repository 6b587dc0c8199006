use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use crate::{error::Result, format::SummaryDocument};

/// Host capability: hand the user a file with the given contents and name.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn offer_download(&self, bytes: &[u8], filename: &str, media_type: &str) -> Result<()>;
}

/// Offers an exported document through `sink`.
pub async fn offer_document(sink: &dyn DownloadSink, document: &SummaryDocument) -> Result<()> {
    sink.offer_download(
        document.as_bytes(),
        &document.suggested_filename,
        document.media_type(),
    )
    .await
}

/// Saves downloads into a directory on disk.
pub struct FileDownloadSink {
    dir: PathBuf,
}

impl FileDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The user's download directory, or the working directory when the
    /// platform has none.
    pub fn default_dir() -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }
}

impl Default for FileDownloadSink {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

#[async_trait]
impl DownloadSink for FileDownloadSink {
    async fn offer_download(&self, bytes: &[u8], filename: &str, media_type: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(filename);
        fs::write(&path, bytes).await?;
        info!(path = %path.display(), media_type, size = bytes.len(), "saved download");
        Ok(())
    }
}
