use crate::util::ensure_dir;
use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Uploaded bytes written to a scratch file for ingestion.
/// The file is removed when this value is dropped. Uploads larger than
/// `max_bytes` are rejected without writing more than `max_bytes + 1` bytes.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    bytes: u64,
}

impl StagedUpload {
    pub fn from_reader<R: Read>(
        work_dir: &Path,
        name: &str,
        reader: R,
        max_bytes: u64,
    ) -> Result<Self> {
        ensure_dir(work_dir)?;
        let path = work_dir.join(format!("upload_{}", sanitize_name(name)));
        let mut file = std::fs::File::create(&path)
            .with_context(|| format!("create staged upload: {}", path.display()))?;
        // Own the path before copying so a failed write still cleans up.
        let mut staged = Self { path, bytes: 0 };
        let mut limited = reader.take(max_bytes.saturating_add(1));
        staged.bytes = std::io::copy(&mut limited, &mut file)
            .with_context(|| format!("write staged upload: {}", staged.path.display()))?;
        file.flush()?;
        if staged.bytes > max_bytes {
            anyhow::bail!("upload exceeds max_input_file_bytes: {}", max_bytes);
        }
        debug!("staged upload {} bytes={}", staged.path.display(), staged.bytes);
        Ok(staged)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes == 0
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove staged upload {}: {err}", self.path.display());
            }
        }
    }
}

/// Reduce an uploaded file name to a safe single path component.
pub fn sanitize_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "contract.pdf".to_string()
    } else {
        cleaned.to_string()
    }
}
