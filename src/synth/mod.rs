//! Per-chunk synthesis orchestration with resume support.
//!
//! Each chunk owns one artifact slot in the tmp directory, named by its
//! 1-based index. A chunk whose artifact already exists is skipped, which
//! makes an interrupted run restartable; artifacts are finalized with an
//! atomic rename so a partial file can never pass for a finished one.

pub mod manifest;

use crate::error::PipelineError;
use crate::tts::TtsBackend;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Artifact file name for a 1-based chunk index, zero-padded so lexical
/// and numeric ordering coincide.
pub fn artifact_name(index: usize, ext: &str) -> String {
    format!("chunk_{index:05}.{ext}")
}

pub struct Orchestrator {
    backend: Arc<dyn TtsBackend>,
    tmpdir: PathBuf,
    jobs: usize,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn TtsBackend>, tmpdir: impl Into<PathBuf>, jobs: usize) -> Self {
        Self {
            backend,
            tmpdir: tmpdir.into(),
            jobs: jobs.max(1),
        }
    }

    /// Synthesize every chunk that does not already have an artifact.
    ///
    /// Returns the artifact paths in chunk order, one per chunk. `on_done`
    /// fires once per chunk (skipped or synthesized) in completion order.
    /// The first backend failure aborts the run; artifacts finished before
    /// it stay on disk for a resume.
    pub async fn run<F>(&self, chunks: &[String], on_done: F) -> Result<Vec<PathBuf>>
    where
        F: Fn(usize) + Send + Sync,
    {
        let ext = self.backend.artifact_ext();
        let mut paths = Vec::with_capacity(chunks.len());
        let mut pending: Vec<(usize, String, PathBuf)> = Vec::new();

        for (i, chunk) in chunks.iter().enumerate() {
            let index = i + 1;
            let path = self.tmpdir.join(artifact_name(index, ext));
            if path.exists() {
                log::debug!("chunk {index} already synthesized, skipping");
                on_done(index);
            } else {
                pending.push((index, chunk.clone(), path.clone()));
            }
            paths.push(path);
        }

        if pending.is_empty() {
            log::info!("all {} chunks already synthesized", chunks.len());
            return Ok(paths);
        }
        log::info!(
            "synthesizing {} of {} chunks with {}",
            pending.len(),
            chunks.len(),
            self.backend.name()
        );

        if self.jobs == 1 {
            for (index, text, path) in pending {
                synthesize_chunk(Arc::clone(&self.backend), index, text, path).await?;
                on_done(index);
            }
        } else {
            self.run_parallel(pending, &on_done).await?;
        }

        Ok(paths)
    }

    /// Fan pending chunks out over at most `jobs` concurrent tasks.
    ///
    /// Chunks are independent of each other, so only the artifact paths
    /// returned by [`Orchestrator::run`] carry the ordering; completion
    /// order is irrelevant. Dropping the join set on the first error
    /// cancels the tasks still in flight.
    async fn run_parallel<F>(&self, pending: Vec<(usize, String, PathBuf)>, on_done: &F) -> Result<()>
    where
        F: Fn(usize) + Send + Sync,
    {
        let mut queue = pending.into_iter();
        let mut tasks: JoinSet<Result<usize>> = JoinSet::new();

        loop {
            while tasks.len() < self.jobs {
                let Some((index, text, path)) = queue.next() else {
                    break;
                };
                let backend = Arc::clone(&self.backend);
                tasks.spawn(async move {
                    synthesize_chunk(backend, index, text, path).await?;
                    Ok(index)
                });
            }
            match tasks.join_next().await {
                Some(joined) => {
                    let index = joined.context("synthesis task panicked")??;
                    on_done(index);
                }
                None => break,
            }
        }
        Ok(())
    }
}

/// Synthesize one chunk into its artifact slot.
///
/// The backend writes to a `.part` staging name which is renamed into
/// place only on success; a stale `.part` from an aborted run is simply
/// overwritten next time.
async fn synthesize_chunk(
    backend: Arc<dyn TtsBackend>,
    index: usize,
    text: String,
    path: PathBuf,
) -> Result<()> {
    let staging = staging_path(&path);

    backend
        .synthesize(&text, &staging)
        .await
        .map_err(|e| PipelineError::Synthesis {
            index,
            reason: format!("{e:#}"),
        })?;

    tokio::fs::rename(&staging, &path)
        .await
        .with_context(|| format!("failed to finalize {}", path.display()))?;
    log::debug!("chunk {index} synthesized ({} chars)", text.chars().count());
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.to_path_buf().into_os_string();
    staging.push(".part");
    PathBuf::from(staging)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Backend that writes a marker file and counts its invocations.
    struct MockBackend {
        calls: AtomicUsize,
        fail_on: Option<usize>,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: None,
            }
        }

        fn failing_on(index: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: Some(index),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TtsBackend for MockBackend {
        async fn synthesize(&self, text: &str, output_path: &Path) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(bad) = self.fail_on {
                // The staging name ends in chunk_{index:05}.wav.part.
                if output_path
                    .to_string_lossy()
                    .contains(&format!("chunk_{bad:05}"))
                {
                    anyhow::bail!("backend refused chunk");
                }
            }
            std::fs::write(output_path, text.as_bytes())?;
            Ok(())
        }

        fn artifact_ext(&self) -> &'static str {
            "wav"
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }

    fn chunk_strings(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("chunk text {i}")).collect()
    }

    #[test]
    fn test_artifact_name_orders_lexically() {
        assert_eq!(artifact_name(1, "wav"), "chunk_00001.wav");
        assert_eq!(artifact_name(12, "mp3"), "chunk_00012.mp3");
        assert!(artifact_name(2, "wav") < artifact_name(10, "wav"));
    }

    #[tokio::test]
    async fn test_run_produces_ordered_artifacts() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(MockBackend::new());
        let orchestrator = Orchestrator::new(backend.clone(), dir.path(), 1);

        let chunks = chunk_strings(3);
        let paths = orchestrator.run(&chunks, |_| {}).await.unwrap();

        assert_eq!(paths.len(), 3);
        for (i, path) in paths.iter().enumerate() {
            assert!(path.ends_with(artifact_name(i + 1, "wav")));
            assert_eq!(std::fs::read_to_string(path).unwrap(), chunks[i]);
        }
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(MockBackend::new());
        let orchestrator = Orchestrator::new(backend.clone(), dir.path(), 1);

        let chunks = chunk_strings(4);
        let first = orchestrator.run(&chunks, |_| {}).await.unwrap();
        assert_eq!(backend.calls(), 4);

        let second = orchestrator.run(&chunks, |_| {}).await.unwrap();
        assert_eq!(backend.calls(), 4, "no backend calls on resume");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_resume_synthesizes_only_missing_chunk() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(MockBackend::new());
        let chunks = chunk_strings(3);

        // Simulate a prior run that completed all but the last chunk.
        for i in 1..=2 {
            std::fs::write(dir.path().join(artifact_name(i, "wav")), "old audio").unwrap();
        }

        let orchestrator = Orchestrator::new(backend.clone(), dir.path(), 1);
        let paths = orchestrator.run(&chunks, |_| {}).await.unwrap();

        assert_eq!(backend.calls(), 1);
        // Existing artifacts are reused untouched.
        assert_eq!(std::fs::read_to_string(&paths[0]).unwrap(), "old audio");
        assert_eq!(std::fs::read_to_string(&paths[2]).unwrap(), chunks[2]);
    }

    #[tokio::test]
    async fn test_failure_aborts_and_keeps_prior_artifacts() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(MockBackend::failing_on(2));
        let orchestrator = Orchestrator::new(backend.clone(), dir.path(), 1);

        let chunks = chunk_strings(3);
        let err = orchestrator.run(&chunks, |_| {}).await.unwrap_err();
        assert!(format!("{err:#}").contains("chunk 2"));

        // Chunk 1 finished before the failure and stays for resume.
        assert!(dir.path().join(artifact_name(1, "wav")).exists());
        // The failed chunk left no finished artifact.
        assert!(!dir.path().join(artifact_name(2, "wav")).exists());
        assert!(!dir.path().join(artifact_name(3, "wav")).exists());
    }

    #[tokio::test]
    async fn test_parallel_run_keeps_index_order() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(MockBackend::new());
        let orchestrator = Orchestrator::new(backend.clone(), dir.path(), 4);

        let chunks = chunk_strings(9);
        let paths = orchestrator.run(&chunks, |_| {}).await.unwrap();

        assert_eq!(backend.calls(), 9);
        for (i, path) in paths.iter().enumerate() {
            assert!(path.ends_with(artifact_name(i + 1, "wav")));
            assert_eq!(std::fs::read_to_string(path).unwrap(), chunks[i]);
        }
    }

    #[tokio::test]
    async fn test_progress_fires_for_skipped_chunks() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(MockBackend::new());
        let chunks = chunk_strings(2);
        std::fs::write(dir.path().join(artifact_name(1, "wav")), "done").unwrap();

        let seen = AtomicUsize::new(0);
        let orchestrator = Orchestrator::new(backend.clone(), dir.path(), 1);
        orchestrator
            .run(&chunks, |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_staging_path_appends_part() {
        let staging = staging_path(Path::new("/tmp/chunk_00001.wav"));
        assert_eq!(staging, PathBuf::from("/tmp/chunk_00001.wav.part"));
    }
}
