//! Text-to-speech HTTP client.
//!
//! Narration is split into short chunks, each chunk is fetched as MP3 from the
//! translate TTS endpoint, and the bodies are concatenated in order. MP3
//! frames are self-delimiting so the joined stream plays back as one file.

use std::path::Path;
use std::time::Duration;

use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{UpstreamError, UpstreamResult};

/// Default TTS endpoint.
pub const DEFAULT_TTS_BASE_URL: &str = "https://translate.google.com";
/// Default narration language.
pub const DEFAULT_TTS_LANG: &str = "en";
/// Longest text the endpoint accepts per request, in characters.
pub const MAX_CHUNK_CHARS: usize = 100;

const TTS_USER_AGENT: &str = "Mozilla/5.0 (compatible; qclip/0.1)";

/// Configuration for the speech client.
#[derive(Debug, Clone)]
pub struct SpeechClientConfig {
    /// Base URL of the TTS service
    pub base_url: String,
    /// Language code passed as `tl`
    pub lang: String,
    /// Bound on each chunk request
    pub timeout: Duration,
}

impl Default for SpeechClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TTS_BASE_URL.to_string(),
            lang: DEFAULT_TTS_LANG.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl SpeechClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            base_url: lookup("TTS_BASE_URL").unwrap_or(defaults.base_url),
            lang: lookup("TTS_LANG")
                .filter(|l| !l.trim().is_empty())
                .unwrap_or(defaults.lang),
            timeout: lookup("TTS_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Breaks fall on whitespace where possible. A word longer than `max_chars`
/// is cut at the character limit. Chunks never start or end with whitespace
/// and are never empty.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            chunks.push(std::mem::replace(&mut current, word.to_string()));
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Client for the text-to-speech service.
#[derive(Debug, Clone)]
pub struct SpeechClient {
    http: Client,
    config: SpeechClientConfig,
}

impl SpeechClient {
    /// Create a new speech client.
    pub fn new(config: SpeechClientConfig) -> UpstreamResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(UpstreamError::Network)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SpeechClientConfig {
        &self.config
    }

    /// Synthesize `text` to MP3 bytes.
    pub async fn synthesize(&self, text: &str) -> UpstreamResult<Vec<u8>> {
        let chunks = split_chunks(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(UpstreamError::invalid_response("Nothing to synthesize"));
        }

        let url = format!("{}/translate_tts", self.config.base_url.trim_end_matches('/'));
        let total = chunks.len().to_string();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            debug!(idx, total = chunks.len(), chars = chunk.chars().count(), "Requesting TTS chunk");
            let bytes = self.fetch_chunk(&url, chunk, idx, &total).await?;
            audio.extend_from_slice(&bytes);
        }

        Ok(audio)
    }

    /// Synthesize `text` and write the MP3 to `dest`.
    ///
    /// Returns the number of bytes written.
    pub async fn synthesize_to_file(&self, text: &str, dest: &Path) -> UpstreamResult<u64> {
        let audio = self.synthesize(text).await?;
        tokio::fs::write(dest, &audio).await?;

        info!(bytes = audio.len(), lang = %self.config.lang, "Synthesized narration");
        Ok(audio.len() as u64)
    }

    async fn fetch_chunk(
        &self,
        url: &str,
        chunk: &str,
        idx: usize,
        total: &str,
    ) -> UpstreamResult<Vec<u8>> {
        let timeout = self.config.timeout;
        let idx = idx.to_string();
        let textlen = chunk.chars().count().to_string();

        let response = self
            .http
            .get(url)
            .header(USER_AGENT, TTS_USER_AGENT)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.config.lang.as_str()),
                ("ttsspeed", "1"),
                ("q", chunk),
                ("total", total),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), idx = %idx, "TTS returned non-success status");
            return Err(UpstreamError::request_failed(format!(
                "Speech synthesis failed (status {})",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;

        if bytes.is_empty() {
            return Err(UpstreamError::invalid_response(format!(
                "Speech synthesis returned no audio for chunk {}",
                idx
            )));
        }

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SpeechClient {
        SpeechClient::new(SpeechClientConfig {
            base_url: server.uri(),
            ..SpeechClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_chunks("Stay hungry. By Steve", 100), vec!["Stay hungry. By Steve"]);
        assert!(split_chunks("   ", 100).is_empty());
    }

    #[test]
    fn test_chunks_break_on_whitespace() {
        let text = "one two three four five";
        let chunks = split_chunks(text, 9);
        assert_eq!(chunks, vec!["one two", "three", "four five"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 9));
    }

    #[test]
    fn test_long_word_is_hard_split() {
        let word = "a".repeat(250);
        let chunks = split_chunks(&format!("hi {} yo", word), 100);
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0], "hi");
        assert_eq!(chunks[1].len(), 100);
        assert_eq!(chunks[3].len(), 50);
        assert_eq!(chunks[4], "yo");
    }

    #[test]
    fn test_chunks_count_characters_not_bytes() {
        let text = "é".repeat(100);
        assert_eq!(split_chunks(&text, 100).len(), 1);
    }

    #[test]
    fn test_config_from_lookup() {
        let vars = HashMap::from([("TTS_LANG", "fr"), ("TTS_TIMEOUT", "5")]);
        let cfg = SpeechClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.lang, "fr");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.base_url, DEFAULT_TTS_BASE_URL);
    }

    #[tokio::test]
    async fn test_synthesize_sends_expected_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .and(query_param("client", "tw-ob"))
            .and(query_param("tl", "en"))
            .and(query_param("q", "No quote provided. By Unknown"))
            .and(query_param("total", "1"))
            .and(query_param("idx", "0"))
            .and(query_param("textlen", "29"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3mp3".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let audio = client_for(&server)
            .synthesize("No quote provided. By Unknown")
            .await
            .unwrap();
        assert_eq!(audio, b"ID3mp3");
    }

    #[tokio::test]
    async fn test_chunks_are_concatenated_in_order() {
        let server = MockServer::start().await;
        for idx in 0..3 {
            Mock::given(method("GET"))
                .and(path("/translate_tts"))
                .and(query_param("idx", idx.to_string()))
                .and(query_param("total", "3"))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'a' + idx as u8]))
                .mount(&server)
                .await;
        }

        let text = format!("{} {} {}", "x".repeat(90), "y".repeat(90), "z".repeat(90));
        let audio = client_for(&server).synthesize(&text).await.unwrap();
        assert_eq!(audio, b"abc");
    }

    #[tokio::test]
    async fn test_non_success_is_request_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).synthesize("hello").await.unwrap_err();
        assert!(matches!(err, UpstreamError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn test_empty_audio_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = client_for(&server).synthesize("hello").await.unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"mp3".to_vec())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = SpeechClient::new(SpeechClientConfig {
            base_url: server.uri(),
            timeout: Duration::from_millis(200),
            ..SpeechClientConfig::default()
        })
        .unwrap();
        let err = client.synthesize("hello").await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_synthesize_to_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp3".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("audio.mp3");
        let written = client_for(&server).synthesize_to_file("hello", &dest).await.unwrap();
        assert_eq!(written, 3);
        assert_eq!(std::fs::read(dest).unwrap(), b"mp3");
    }
}
