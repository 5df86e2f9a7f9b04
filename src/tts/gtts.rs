//! Google Translate TTS backend (networked).
//!
//! One GET per chunk against the public translate_tts endpoint; the
//! response body is the MP3 audio.

use super::TtsBackend;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

const ENDPOINT: &str = "https://translate.google.com/translate_tts";

pub struct GttsBackend {
    client: reqwest::Client,
    lang: String,
}

impl GttsBackend {
    pub fn new(lang: &str) -> Result<Self> {
        // The endpoint rejects requests without a browser-like user agent.
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0")
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            lang: lang.to_string(),
        })
    }
}

#[async_trait]
impl TtsBackend for GttsBackend {
    async fn synthesize(&self, text: &str, output_path: &Path) -> Result<()> {
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.lang.as_str()),
                ("q", text),
            ])
            .send()
            .await
            .context("TTS request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("TTS endpoint returned {}", response.status());
        }

        let bytes = response
            .bytes()
            .await
            .context("failed to read TTS response body")?;
        tokio::fs::write(output_path, &bytes)
            .await
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        Ok(())
    }

    fn artifact_ext(&self) -> &'static str {
        "mp3"
    }

    fn name(&self) -> &'static str {
        "gtts"
    }
}
