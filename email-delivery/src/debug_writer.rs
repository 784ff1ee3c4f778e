use async_trait::async_trait;
use interfaces::{DeliveryError, DigestSink, RenderedDigest};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

const ARTIFACT_PREFIX: &str = "rssmon-";
const ARTIFACT_SUFFIX: &str = ".html";

/// Writes each digest to `<dir>/rssmon-<n>.html` instead of sending it.
///
/// Numbering continues after the highest artifact already in the directory,
/// so earlier runs are never overwritten.
pub struct DebugArtifactWriter {
    dir: PathBuf,
}

impl DebugArtifactWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}{}{}", ARTIFACT_PREFIX, index, ARTIFACT_SUFFIX))
    }

    /// First unused artifact number in the directory.
    async fn next_index(&self) -> std::io::Result<usize> {
        let mut next = 0;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let index = name
                .to_str()
                .and_then(|name| name.strip_prefix(ARTIFACT_PREFIX))
                .and_then(|rest| rest.strip_suffix(ARTIFACT_SUFFIX))
                .and_then(|number| number.parse::<usize>().ok());
            if let Some(index) = index {
                next = next.max(index + 1);
            }
        }
        Ok(next)
    }
}

#[async_trait]
impl DigestSink for DebugArtifactWriter {
    fn sink_name(&self) -> String {
        format!("debug:{}", self.dir.display())
    }

    async fn deliver(&mut self, digests: &[RenderedDigest]) -> Result<usize, DeliveryError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let first = self.next_index().await?;

        for (index, digest) in digests.iter().enumerate() {
            let path = self.artifact_path(first + index);
            write_new(&path, digest.html_body.as_bytes())
                .await
                .map_err(|e| DeliveryError::Send {
                    index,
                    subject: digest.subject.clone(),
                    message: format!("{}: {}", path.display(), e),
                })?;
            info!(subject = %digest.subject, "Wrote {}", path.display());
        }

        Ok(digests.len())
    }
}

async fn write_new(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(contents).await?;
    file.flush().await
}
