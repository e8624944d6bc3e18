// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Speech-to-text provider: `Transcribe(bytes) -> text`.

#[derive(Debug, Clone)]
pub struct SttError(pub String);

impl std::fmt::Display for SttError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "transcription failed: {}", self.0)
    }
}

impl std::error::Error for SttError {}

#[async_trait::async_trait]
pub trait SttEngine: Send + Sync {
    async fn transcribe(&self, audio: &[u8], format: &str) -> Result<String, SttError>;
}

/// Deterministic stub: decodes the audio bytes as UTF-8 text, treating the
/// "audio" payload as the literal transcript. Good enough to drive the
/// command pipeline end to end without a real STT backend.
pub struct StubSttEngine;

#[async_trait::async_trait]
impl SttEngine for StubSttEngine {
    async fn transcribe(&self, audio: &[u8], _format: &str) -> Result<String, SttError> {
        if audio.is_empty() {
            return Err(SttError("empty audio payload".to_owned()));
        }
        String::from_utf8(audio.to_vec()).map_err(|e| SttError(format!("invalid utf-8: {e}")))
    }
}
