use crate::config::Config;
use crate::storage::{cdn_url, ObjectStore};
use crate::tts::TtsClient;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Scoped temp audio file. Removed on drop, so a failed upload cannot leak
/// files into the temp folder.
struct TempAudio {
    path: PathBuf,
}

impl TempAudio {
    fn create(dir: &Path, data: &[u8]) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create temp folder {}", dir.display()))?;
        let filename = format!("tts_{}.mp3", Uuid::new_v4().simple());
        let path = dir.join(filename);
        fs::write(&path, data)
            .with_context(|| format!("Failed to write temp audio {}", path.display()))?;
        Ok(Self { path })
    }

    fn file_name(&self) -> &str {
        // Always present: the name is generated above.
        self.path.file_name().unwrap().to_str().unwrap()
    }
}

impl Drop for TempAudio {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Failed to remove temp audio {}: {}", self.path.display(), e);
        }
    }
}

/// Synthesize each narration paragraph, upload the audio and derive its CDN
/// URL.
///
/// Output keys are numbered from 2 in input iteration order, independent of
/// the numeric suffixes in the input keys: the intro slide's narration is
/// covered by the anchor greeting and never gets its own audio, so `slide1`
/// never appears here. The first TTS or upload failure aborts the batch with
/// no partial result.
pub async fn synthesize_and_upload(
    paragraphs: &Map<String, Value>,
    voice: &str,
    tts: &dyn TtsClient,
    store: &dyn ObjectStore,
    config: &Config,
) -> Result<Map<String, Value>> {
    let temp_dir = Path::new(&config.story.temp_folder);
    let mut result = Map::new();

    let pb = ProgressBar::new(paragraphs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut index = 2usize;
    for (key, value) in paragraphs {
        let text = value
            .as_str()
            .with_context(|| format!("Paragraph {} is not a string", key))?;

        pb.set_message(format!("slide{}", index));

        let audio = tts
            .synthesize(text, voice)
            .await
            .with_context(|| format!("TTS synthesis failed for slide{}", index))?;

        let temp = TempAudio::create(temp_dir, &audio)?;
        let object_key = format!("{}{}", config.storage.key_prefix, temp.file_name());

        store
            .upload(&temp.path, &object_key)
            .await
            .with_context(|| format!("Upload failed for slide{}", index))?;

        let url = cdn_url(&config.storage.cdn_base, &object_key);

        let mut entry = Map::new();
        entry.insert(format!("s{}paragraph1", index), Value::String(text.to_string()));
        entry.insert(format!("audio_url{}", index), Value::String(url));
        entry.insert("voice".to_string(), Value::String(voice.to_string()));
        result.insert(format!("slide{}", index), Value::Object(entry));

        index += 1;
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LlmConfig, StorageConfig, StoryConfig, TtsConfig};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    fn test_config(temp_dir: &Path) -> Config {
        Config {
            llm: LlmConfig {
                provider: "openai".to_string(),
                api_key: "k".to_string(),
                model: "gpt-4".to_string(),
                endpoint: None,
                api_version: "2024-02-01".to_string(),
            },
            tts: TtsConfig {
                url: "http://localhost/tts".to_string(),
                api_key: "k".to_string(),
                model: "tts-1-hd".to_string(),
                voice: None,
            },
            storage: StorageConfig {
                access_key: "a".to_string(),
                secret_key: "s".to_string(),
                region: "us-east-1".to_string(),
                bucket: "b".to_string(),
                key_prefix: "audio/".to_string(),
                cdn_base: "https://cdn.example.com/".to_string(),
            },
            story: StoryConfig {
                temp_folder: temp_dir.to_string_lossy().to_string(),
                ..StoryConfig::default()
            },
        }
    }

    struct MockTtsClient {
        fail: bool,
    }

    #[async_trait]
    impl TtsClient for MockTtsClient {
        async fn synthesize(&self, _text: &str, _voice: &str) -> Result<Vec<u8>> {
            if self.fail {
                Err(anyhow::anyhow!("Mock TTS error"))
            } else {
                Ok(vec![0u8; 16])
            }
        }
    }

    struct MockObjectStore {
        keys: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl MockObjectStore {
        fn new(fail: bool) -> Self {
            Self {
                keys: Arc::new(Mutex::new(Vec::new())),
                fail,
            }
        }
    }

    #[async_trait]
    impl ObjectStore for MockObjectStore {
        async fn upload(&self, local_path: &Path, key: &str) -> Result<()> {
            assert!(local_path.exists(), "temp file must exist during upload");
            if self.fail {
                return Err(anyhow::anyhow!("Mock upload error"));
            }
            self.keys.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    fn paragraphs(count: usize) -> Map<String, Value> {
        let mut map = Map::new();
        for i in 1..=count {
            map.insert(
                format!("s{}paragraph1", i),
                Value::String(format!("Paragraph {}", i)),
            );
        }
        map
    }

    fn temp_dir_is_empty(dir: &Path) -> bool {
        !dir.exists() || fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_output_numbering_starts_at_two() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = test_config(dir.path());
        let tts = MockTtsClient { fail: false };
        let store = MockObjectStore::new(false);

        let result =
            synthesize_and_upload(&paragraphs(3), "nova", &tts, &store, &config).await?;

        let keys: Vec<&String> = result.keys().collect();
        assert_eq!(keys, vec!["slide2", "slide3", "slide4"]);

        // Numbering lags the restructured input by one: slide 1's intro audio
        // is never synthesized here. Preserved on purpose.
        assert!(result.get("slide1").is_none());

        let slide2 = result["slide2"].as_object().unwrap();
        assert_eq!(slide2["s2paragraph1"], "Paragraph 1");
        assert_eq!(slide2["voice"], "nova");
        let url = slide2["audio_url2"].as_str().unwrap();
        assert!(url.starts_with("https://cdn.example.com/audio/tts_"));
        assert!(url.ends_with(".mp3"));

        assert!(temp_dir_is_empty(dir.path()), "temp files must be removed");
        Ok(())
    }

    #[tokio::test]
    async fn test_numbering_ignores_input_key_names() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = test_config(dir.path());
        let tts = MockTtsClient { fail: false };
        let store = MockObjectStore::new(false);

        let mut input = Map::new();
        input.insert("s7paragraph1".to_string(), Value::String("A".to_string()));
        input.insert("intro".to_string(), Value::String("B".to_string()));

        let result = synthesize_and_upload(&input, "echo", &tts, &store, &config).await?;

        let keys: Vec<&String> = result.keys().collect();
        assert_eq!(keys, vec!["slide2", "slide3"]);
        assert_eq!(result["slide3"].as_object().unwrap()["s3paragraph1"], "B");
        Ok(())
    }

    #[tokio::test]
    async fn test_tts_failure_aborts_batch() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = test_config(dir.path());
        let tts = MockTtsClient { fail: true };
        let store = MockObjectStore::new(false);

        let result = synthesize_and_upload(&paragraphs(2), "nova", &tts, &store, &config).await;
        assert!(result.is_err());
        assert!(store.keys.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_failure_still_removes_temp_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = test_config(dir.path());
        let tts = MockTtsClient { fail: false };
        let store = MockObjectStore::new(true);

        let result = synthesize_and_upload(&paragraphs(1), "nova", &tts, &store, &config).await;
        assert!(result.is_err());
        assert!(
            temp_dir_is_empty(dir.path()),
            "temp audio must be removed even when the upload fails"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_object_keys_use_configured_prefix() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = test_config(dir.path());
        let tts = MockTtsClient { fail: false };
        let store = MockObjectStore::new(false);

        synthesize_and_upload(&paragraphs(2), "fable", &tts, &store, &config).await?;

        let keys = store.keys.lock().unwrap();
        assert_eq!(keys.len(), 2);
        for key in keys.iter() {
            assert!(key.starts_with("audio/tts_"));
            assert!(key.ends_with(".mp3"));
        }
        Ok(())
    }
}
