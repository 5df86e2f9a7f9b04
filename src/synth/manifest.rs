//! Run manifest inside the chunk directory.
//!
//! The manifest records which input and chunk parameters produced the
//! artifacts in the directory. Resuming over artifacts from a different
//! document or a different chunk bound would splice the wrong audio, so a
//! mismatch is a hard error rather than a silent skip.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Hash of the normalized input text.
    pub text_hash: String,
    /// Chunk bound the artifacts were produced under.
    pub chunk_chars: usize,
    /// Oversized-sentence policy name.
    pub policy: String,
    /// Number of chunks in the run.
    pub total_chunks: usize,
    /// Backend name; artifacts from another backend have a different format.
    pub backend: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Manifest {
    pub fn new(
        normalized_text: &str,
        chunk_chars: usize,
        policy: &str,
        total_chunks: usize,
        backend: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            text_hash: hash_text(normalized_text),
            chunk_chars,
            policy: policy.to_string(),
            total_chunks,
            backend: backend.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn matches(&self, other: &Self) -> bool {
        self.text_hash == other.text_hash
            && self.chunk_chars == other.chunk_chars
            && self.policy == other.policy
            && self.total_chunks == other.total_chunks
            && self.backend == other.backend
    }
}

/// SHA-256 of the text, truncated to 16 hex characters.
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}

/// Validate the chunk directory against the current run and persist the
/// manifest.
///
/// A manifest left by a previous run must agree with `current` on input
/// hash and chunk parameters; a fresh directory just gets the manifest
/// written.
pub fn reconcile(tmpdir: &Path, current: &Manifest) -> Result<()> {
    let path = tmpdir.join(MANIFEST_FILE);

    if path.exists() {
        let file = File::open(&path).context("failed to open run manifest")?;
        let previous: Manifest =
            serde_json::from_reader(BufReader::new(file)).context("failed to parse run manifest")?;
        if !previous.matches(current) {
            anyhow::bail!(
                "chunk directory {} holds artifacts from a different run \
                 (input text or chunk parameters changed); remove it or pass a fresh --tmpdir",
                tmpdir.display()
            );
        }
        let mut updated = previous;
        updated.updated_at = Utc::now();
        write_manifest(&path, &updated)
    } else {
        write_manifest(&path, current)
    }
}

fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    let file = File::create(path).context("failed to create run manifest")?;
    serde_json::to_writer_pretty(BufWriter::new(file), manifest)
        .context("failed to write run manifest")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hash_text_shape_and_consistency() {
        let h1 = hash_text("some normalized text");
        let h2 = hash_text("some normalized text");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 16);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(h1, hash_text("different text"));
    }

    #[test]
    fn test_reconcile_fresh_directory_writes_manifest() {
        let dir = TempDir::new().unwrap();
        let manifest = Manifest::new("text", 1200, "overflow", 3, "piper");
        reconcile(dir.path(), &manifest).unwrap();
        assert!(dir.path().join(MANIFEST_FILE).exists());
    }

    #[test]
    fn test_reconcile_accepts_matching_rerun() {
        let dir = TempDir::new().unwrap();
        let manifest = Manifest::new("text", 1200, "overflow", 3, "piper");
        reconcile(dir.path(), &manifest).unwrap();

        // Same parameters on a later run: fine, timestamp refreshed.
        let rerun = Manifest::new("text", 1200, "overflow", 3, "piper");
        reconcile(dir.path(), &rerun).unwrap();
    }

    #[test]
    fn test_reconcile_rejects_changed_parameters() {
        let dir = TempDir::new().unwrap();
        let manifest = Manifest::new("text", 1200, "overflow", 3, "piper");
        reconcile(dir.path(), &manifest).unwrap();

        let changed_bound = Manifest::new("text", 800, "overflow", 4, "piper");
        let err = reconcile(dir.path(), &changed_bound).unwrap_err();
        assert!(err.to_string().contains("different run"));

        let changed_text = Manifest::new("other text", 1200, "overflow", 3, "piper");
        assert!(reconcile(dir.path(), &changed_text).is_err());

        let changed_backend = Manifest::new("text", 1200, "overflow", 3, "gtts");
        assert!(reconcile(dir.path(), &changed_backend).is_err());
    }
}
