//! Ordered artifact concatenation and export using ffmpeg.

use crate::error::PipelineError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Resolve ffmpeg on PATH, failing early when it is absent. Both the
/// concat step and any format conversion need it.
pub fn ensure_ffmpeg() -> Result<PathBuf> {
    which::which("ffmpeg").map_err(|_| {
        PipelineError::BackendUnavailable {
            tool: "ffmpeg".to_string(),
            hint: "install ffmpeg and make sure it is on PATH".to_string(),
        }
        .into()
    })
}

/// Concatenate artifacts in the given order and export to `output_path`.
///
/// The list must already be in chunk-index order; this function never
/// reorders it. When every artifact shares the output extension the
/// streams are copied losslessly, otherwise ffmpeg re-encodes into the
/// container implied by the output extension.
pub fn assemble(artifacts: &[PathBuf], output_path: &Path) -> Result<()> {
    if artifacts.is_empty() {
        anyhow::bail!("no audio artifacts to assemble");
    }

    for path in artifacts {
        let readable = std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
        if !readable {
            return Err(PipelineError::ArtifactCorrupt {
                reason: format!("{} is missing or empty", path.display()),
            }
            .into());
        }
    }

    let ffmpeg = ensure_ffmpeg()?;
    let copy_streams = artifacts.iter().all(|p| ext_matches(p, output_path));

    if artifacts.len() == 1 && copy_streams {
        std::fs::copy(&artifacts[0], output_path)
            .with_context(|| format!("failed to copy to {}", output_path.display()))?;
        return Ok(());
    }

    let scratch = TempDir::new().context("failed to create scratch directory")?;
    let list_file = scratch.path().join("concat.txt");
    std::fs::write(&list_file, concat_list(artifacts))
        .context("failed to write concat list")?;

    let mut cmd = Command::new(&ffmpeg);
    cmd.args(["-y", "-f", "concat", "-safe", "0", "-i"])
        .arg(&list_file);
    if copy_streams {
        cmd.args(["-c", "copy"]);
    }
    cmd.arg(output_path);

    let output = cmd.output().context("failed to run ffmpeg")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PipelineError::ArtifactCorrupt {
            reason: stderr.trim().lines().last().unwrap_or("ffmpeg failed").to_string(),
        }
        .into());
    }

    Ok(())
}

/// Build the ffmpeg concat demuxer list, one quoted path per line.
fn concat_list(artifacts: &[PathBuf]) -> String {
    let mut list = String::new();
    for path in artifacts {
        // Single quotes in the path must be escaped for the demuxer.
        let escaped = path.to_string_lossy().replace('\'', "'\\''");
        list.push_str(&format!("file '{}'\n", escaped));
    }
    list
}

fn ext_matches(a: &Path, b: &Path) -> bool {
    let ext = |p: &Path| {
        p.extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    };
    ext(a) == ext(b)
}
