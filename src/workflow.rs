use crate::amp::assemble_story;
use crate::article::fetch_article;
use crate::classify::classify;
use crate::config::Config;
use crate::llm::LlmClient;
use crate::script::{restructure_slides, ScriptGenerator};
use crate::sentiment::tag_sentiment;
use crate::storage::ObjectStore;
use crate::tts::{is_valid_voice, TtsClient, VOICES};
use crate::uploader::synthesize_and_upload;
use anyhow::{anyhow, Context, Result};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// The three pipeline stages behind the CLI. Stage boundaries are files on
/// purpose: the JSON written by one stage is reviewed by hand before it is
/// fed to the next.
pub struct StoryPipeline {
    config: Config,
    llm: Box<dyn LlmClient>,
    tts: Box<dyn TtsClient>,
    store: Box<dyn ObjectStore>,
    http: reqwest::Client,
}

impl StoryPipeline {
    pub fn new(
        config: Config,
        llm: Box<dyn LlmClient>,
        tts: Box<dyn TtsClient>,
        store: Box<dyn ObjectStore>,
    ) -> Self {
        Self {
            config,
            llm,
            tts,
            store,
            http: reqwest::Client::new(),
        }
    }

    /// Stage 1: article -> classified, narrated story -> structured narration
    /// JSON. Returns the path of the structured narration file.
    pub async fn generate(&self, url: &str, persona: &str) -> Result<PathBuf> {
        println!("Fetching article...");
        let article = fetch_article(&self.http, url).await?;

        let sentiment = tag_sentiment(&article.summary);

        println!("Classifying article...");
        let classification = classify(self.llm.as_ref(), &article.full_text).await?;

        println!(
            "Generating slide scripts ({} / {} / {})...",
            classification.category, classification.subcategory, classification.emotion
        );
        let generator = ScriptGenerator::new(&self.config);
        let story = generator
            .generate(self.llm.as_ref(), &classification, &article.full_text)
            .await?;

        let bundle = json!({
            "title": article.title,
            "summary": article.summary,
            "sentiment": sentiment,
            "emotion": story.emotion,
            "category": story.category,
            "subcategory": story.subcategory,
            "persona": persona,
            "slides": story.slides,
        });

        let timestamp = unix_timestamp()?;
        let story_path = self.output_path(&format!("story_{}.json", timestamp));
        write_json(&story_path, &bundle)?;
        println!("Story bundle written to {}", story_path.display());

        let structured = restructure_slides(&story.slides);
        let structured_path =
            self.output_path(&format!("structured_slides_{}.json", timestamp));
        write_json(&structured_path, &Value::Object(structured))?;
        println!("Structured narration written to {}", structured_path.display());

        Ok(structured_path)
    }

    /// Stage 2: structured narration JSON -> per-slide audio on the CDN ->
    /// TTS output JSON.
    pub async fn synthesize(&self, input: &Path, voice: &str) -> Result<PathBuf> {
        if !is_valid_voice(voice) {
            return Err(anyhow!(
                "Unknown voice '{}'. Expected one of: {}",
                voice,
                VOICES.join(", ")
            ));
        }

        let paragraphs = read_json_object(input)?;
        println!("Loaded {} paragraphs", paragraphs.len());

        let output =
            synthesize_and_upload(&paragraphs, voice, self.tts.as_ref(), self.store.as_ref(), &self.config)
                .await?;

        let output_path = self.output_path(&format!("tts_output_{}.json", unix_timestamp()?));
        write_json(&output_path, &Value::Object(output))?;
        println!("TTS output written to {}", output_path.display());

        Ok(output_path)
    }

    /// Stage 3: TTS output JSON + template -> final web story HTML.
    pub async fn assemble(&self, input: &Path) -> Result<PathBuf> {
        let tts_output = read_json_object(input)?;

        let template_path = &self.config.story.template_path;
        let template = fs::read_to_string(template_path)
            .with_context(|| format!("Failed to read template {}", template_path))?;

        let html = assemble_story(&tts_output, &template)?;

        let output_path = self.output_path(&format!("web_story_{}.html", unix_timestamp()?));
        fs::write(&output_path, html)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        println!("Web story written to {}", output_path.display());

        Ok(output_path)
    }

    fn output_path(&self, filename: &str) -> PathBuf {
        Path::new(&self.config.story.output_folder).join(filename)
    }
}

fn unix_timestamp() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn read_json_object(path: &Path) -> Result<Map<String, Value>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON object", path.display()))
}
