//! TTS backend trait and per-backend defaults.

pub mod gtts;
pub mod piper;

use crate::text::OversizePolicy;
use anyhow::Result;
use async_trait::async_trait;
use clap::ValueEnum;
use std::path::Path;

/// Which synthesis engine drives the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Offline piper subprocess, one WAV per chunk.
    Piper,
    /// Networked Google Translate TTS, one MP3 per chunk.
    Gtts,
}

impl BackendKind {
    /// Chunk bound reflecting what the backend accepts per call.
    pub fn default_chunk_chars(self) -> usize {
        match self {
            BackendKind::Piper => 1200,
            BackendKind::Gtts => 3500,
        }
    }

    pub fn default_tmpdir(self) -> &'static str {
        match self {
            BackendKind::Piper => "piper_chunks",
            BackendKind::Gtts => "tts_chunks",
        }
    }

    pub fn default_output(self) -> &'static str {
        match self {
            BackendKind::Piper => "output.wav",
            BackendKind::Gtts => "output.mp3",
        }
    }

    pub fn default_policy(self) -> OversizePolicy {
        match self {
            BackendKind::Piper => OversizePolicy::Overflow,
            BackendKind::Gtts => OversizePolicy::HardSplit,
        }
    }
}

/// A synthesis engine that turns one chunk of text into one audio file.
#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Synthesize `text` into an audio file at `output_path`.
    ///
    /// The call blocks until the backend returns; a non-success result
    /// means no usable file was produced at `output_path`.
    async fn synthesize(&self, text: &str, output_path: &Path) -> Result<()>;

    /// File extension of the artifacts this backend produces.
    fn artifact_ext(&self) -> &'static str;

    /// Backend name for logs, errors and the run manifest.
    fn name(&self) -> &'static str;
}
