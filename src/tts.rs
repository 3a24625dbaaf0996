use crate::config::Config;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Serialize;

/// Fixed voice set exposed by the speech endpoint.
pub const VOICES: [&str; 6] = ["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

pub fn is_valid_voice(voice: &str) -> bool {
    VOICES.contains(&voice)
}

#[async_trait]
pub trait TtsClient: Send + Sync {
    /// Synthesize one paragraph, returning raw MPEG bytes.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>>;
}

pub fn create_tts_client(config: &Config) -> Box<dyn TtsClient> {
    Box::new(HttpTtsClient::new(
        &config.tts.url,
        &config.tts.api_key,
        &config.tts.model,
    ))
}

pub struct HttpTtsClient {
    url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct TtsRequest {
    model: String,
    input: String,
    voice: String,
}

impl HttpTtsClient {
    pub fn new(url: &str, api_key: &str, model: &str) -> Self {
        Self {
            url: url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TtsClient for HttpTtsClient {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        let body = TtsRequest {
            model: self.model.clone(),
            input: text.to_string(),
            voice: voice.to_string(),
        };

        let resp = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        // Any non-2xx aborts the whole batch upstream; no retry.
        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("TTS API error ({}): {}", status, error_text));
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_validation() {
        for voice in VOICES {
            assert!(is_valid_voice(voice));
        }
        assert!(!is_valid_voice("Nova"));
        assert!(!is_valid_voice("robot"));
        assert!(!is_valid_voice(""));
    }

    #[test]
    fn test_tts_request_wire_shape() {
        let body = TtsRequest {
            model: "tts-1-hd".to_string(),
            input: "Namaskar doston".to_string(),
            voice: "nova".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "tts-1-hd",
                "input": "Namaskar doston",
                "voice": "nova"
            })
        );
    }
}
