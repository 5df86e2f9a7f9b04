//! Piper subprocess backend (offline).
//!
//! Each chunk is piped to piper's stdin; piper writes one WAV to the path
//! given with `--output_file`.

use super::TtsBackend;
use crate::error::PipelineError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug)]
pub struct PiperBackend {
    exe: PathBuf,
    model: PathBuf,
}

impl PiperBackend {
    /// Resolve the executable and model up front so a missing installation
    /// is reported before any synthesis starts.
    pub fn new(exe: impl Into<PathBuf>, model: impl Into<PathBuf>) -> Result<Self> {
        let exe = exe.into();
        let exe = which::which(&exe).map_err(|_| PipelineError::BackendUnavailable {
            tool: exe.display().to_string(),
            hint: "install piper or point --piper-exe at the binary".to_string(),
        })?;

        let model = model.into();
        if !model.exists() {
            return Err(PipelineError::BackendUnavailable {
                tool: model.display().to_string(),
                hint: "download a piper voice model (.onnx) and pass it with --model".to_string(),
            }
            .into());
        }

        Ok(Self { exe, model })
    }
}

#[async_trait]
impl TtsBackend for PiperBackend {
    async fn synthesize(&self, text: &str, output_path: &Path) -> Result<()> {
        let mut child = Command::new(&self.exe)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_file")
            .arg(output_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("failed to spawn piper")?;

        let mut stdin = child.stdin.take().context("failed to open piper stdin")?;
        stdin
            .write_all(text.as_bytes())
            .await
            .context("failed to write chunk text to piper")?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .context("failed to wait for piper")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("piper exited with {}: {}", output.status, stderr.trim());
        }
        Ok(())
    }

    fn artifact_ext(&self) -> &'static str {
        "wav"
    }

    fn name(&self) -> &'static str {
        "piper"
    }
}
