// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text-to-speech provider: `Synthesize(text, voice, format) -> bytes`.

#[derive(Debug, Clone)]
pub struct TtsError(pub String);

impl std::fmt::Display for TtsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "synthesis failed: {}", self.0)
    }
}

impl std::error::Error for TtsError {}

#[async_trait::async_trait]
pub trait TtsEngine: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &str, format: &str) -> Result<Vec<u8>, TtsError>;
}

/// Deterministic stub: the "audio" is just the UTF-8 bytes of the text being
/// spoken, prefixed with the voice and format so fixtures can assert on it
/// without decoding anything.
pub struct StubTtsEngine;

#[async_trait::async_trait]
impl TtsEngine for StubTtsEngine {
    async fn synthesize(&self, text: &str, voice: &str, format: &str) -> Result<Vec<u8>, TtsError> {
        if text.is_empty() {
            return Err(TtsError("empty text".to_owned()));
        }
        Ok(format!("{voice}:{format}:{text}").into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_encodes_voice_and_format() {
        let bytes = StubTtsEngine.synthesize("PR #412 is ready", "default", "mp3").await.unwrap();
        assert_eq!(bytes, b"default:mp3:PR #412 is ready".to_vec());
    }

    #[tokio::test]
    async fn stub_rejects_empty_text() {
        assert!(StubTtsEngine.synthesize("", "default", "mp3").await.is_err());
    }
}
