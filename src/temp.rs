//! Scoped scratch files
//!
//! Files are created in the configured temp directory and removed when the
//! returned handle drops.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::{Builder, NamedTempFile, TempPath};

use crate::error::Result;

/// Longest base name used as-is for the file prefix
pub const MAX_FILENAME_LENGTH: usize = 160;

/// Longest extension (dot included) kept as the file suffix
pub const MAX_EXTENSION_LENGTH: usize = 6;

#[derive(Debug, Clone)]
pub struct TempFiles {
    dir: PathBuf,
}

impl TempFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create an empty scratch file named after `base`
    pub fn create(&self, base: &Path) -> Result<NamedTempFile> {
        std::fs::create_dir_all(&self.dir)?;
        let (prefix, suffix) = name_parts(base);
        let file = Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;
        tracing::debug!("created temp file {}", file.path().display());
        Ok(file)
    }

    /// Like [`TempFiles::create`], with the handle closed so a tool can write the path
    pub fn create_path(&self, base: &Path) -> Result<TempPath> {
        Ok(self.create(base)?.into_temp_path())
    }
}

/// Prefix and suffix for the scratch file derived from `base`
fn name_parts(base: &Path) -> (String, String) {
    let file_name = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let prefix = if file_name.chars().count() > MAX_FILENAME_LENGTH {
        hex_digest(&base.to_string_lossy())
    } else {
        file_name
    };

    let suffix = base
        .extension()
        .map(|ext| {
            format!(".{}", ext.to_string_lossy())
                .chars()
                .take(MAX_EXTENSION_LENGTH)
                .collect()
        })
        .unwrap_or_default();

    (prefix, suffix)
}

fn hex_digest(value: &str) -> String {
    Sha256::digest(value.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
