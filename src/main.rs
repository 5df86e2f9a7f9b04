//! longtts - convert a long text file into a single audio file using
//! chunked TTS.
//!
//! The text is normalized, split into sentences, packed into bounded-size
//! chunks, synthesized chunk by chunk into a resumable artifact directory,
//! and finally concatenated into one output file.

mod audio;
mod config;
mod error;
mod synth;
mod text;
mod tts;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use error::PipelineError;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use text::{OversizePolicy, Sentences};
use tts::{BackendKind, TtsBackend};

#[derive(Parser, Debug)]
#[command(name = "longtts")]
#[command(about = "Convert a long text file into a single audio file using chunked TTS", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the input text file
    input: PathBuf,

    /// Synthesis backend
    #[arg(long, value_enum, default_value = "piper")]
    backend: BackendKind,

    /// Output audio file path (default: output.wav piper, output.mp3 gtts)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Maximum characters per chunk (default: 1200 piper, 3500 gtts)
    #[arg(long)]
    chunk_chars: Option<usize>,

    /// Directory for per-chunk audio artifacts; doubles as the resume
    /// checkpoint across runs
    #[arg(long)]
    tmpdir: Option<PathBuf>,

    /// Remove the chunk directory after a successful run
    #[arg(long)]
    delete_chunks: bool,

    /// Language hint for the networked backend
    #[arg(long)]
    lang: Option<String>,

    /// Handling of a single sentence longer than the chunk bound
    /// (default: overflow piper, hard-split gtts)
    #[arg(long, value_enum)]
    oversize: Option<OversizePolicy>,

    /// Parallel synthesis jobs
    #[arg(long)]
    jobs: Option<usize>,

    /// Piper voice model (.onnx)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Piper executable
    #[arg(long)]
    piper_exe: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load().context("failed to load configuration")?;
    run(args, config).await
}

async fn run(args: Args, config: Config) -> Result<()> {
    let raw = std::fs::read_to_string(&args.input).map_err(|e| PipelineError::Input {
        path: args.input.clone(),
        source: e,
    })?;

    let kind = args.backend;
    let chunk_chars = args
        .chunk_chars
        .or(config.chunk_chars)
        .unwrap_or_else(|| kind.default_chunk_chars());
    if chunk_chars == 0 {
        anyhow::bail!("--chunk-chars must be positive");
    }
    let policy = args.oversize.unwrap_or_else(|| kind.default_policy());
    let tmpdir = args
        .tmpdir
        .unwrap_or_else(|| PathBuf::from(kind.default_tmpdir()));
    let out_path = args
        .out
        .unwrap_or_else(|| PathBuf::from(kind.default_output()));
    let jobs = args.jobs.or(config.jobs).unwrap_or(1).max(1);

    // Assembly always needs ffmpeg; fail before any synthesis work.
    audio::ensure_ffmpeg()?;

    let normalized = text::normalize(&raw);
    let chunks = text::pack_chunks(Sentences::new(&normalized), chunk_chars, policy);
    if chunks.is_empty() {
        anyhow::bail!(
            "input {} contains no text to synthesize",
            args.input.display()
        );
    }
    log::info!(
        "packed {} chunks (max {} chars, {} policy)",
        chunks.len(),
        chunk_chars,
        policy.as_str()
    );

    let backend: Arc<dyn TtsBackend> = match kind {
        BackendKind::Piper => {
            let exe = args
                .piper_exe
                .or(config.piper_exe)
                .unwrap_or_else(|| PathBuf::from("piper"));
            let model = args.model.or(config.piper_model).ok_or_else(|| {
                anyhow::anyhow!(
                    "the piper backend needs a voice model; pass --model or set piper_model in {}",
                    Config::config_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|_| "the config file".to_string())
                )
            })?;
            Arc::new(tts::piper::PiperBackend::new(exe, model)?)
        }
        BackendKind::Gtts => {
            let lang = args.lang.or(config.lang).unwrap_or_else(|| "en".to_string());
            Arc::new(tts::gtts::GttsBackend::new(&lang)?)
        }
    };

    std::fs::create_dir_all(&tmpdir)
        .with_context(|| format!("failed to create {}", tmpdir.display()))?;
    let manifest = synth::manifest::Manifest::new(
        &normalized,
        chunk_chars,
        policy.as_str(),
        chunks.len(),
        backend.name(),
    );
    synth::manifest::reconcile(&tmpdir, &manifest)?;

    let orchestrator = synth::Orchestrator::new(Arc::clone(&backend), &tmpdir, jobs);

    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let artifacts = orchestrator.run(&chunks, |_index| pb.inc(1)).await?;
    pb.finish_with_message("synthesis complete");

    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    log::info!("assembling {} artifacts", artifacts.len());
    audio::assemble(&artifacts, &out_path)?;

    println!("{}", out_path.display());

    if args.delete_chunks {
        std::fs::remove_dir_all(&tmpdir)
            .with_context(|| format!("failed to remove {}", tmpdir.display()))?;
        log::info!("removed chunk directory {}", tmpdir.display());
    }

    Ok(())
}
