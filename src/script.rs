use crate::classify::{Classification, ARTICLE_PROMPT_LIMIT};
use crate::config::Config;
use crate::llm::LlmClient;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_CHARACTER_SKETCH: &str =
    "Rohan Sharma is a sincere and articulate Hindi-English news anchor...";

/// Audience personas offered at generation time. Recorded in the story bundle
/// for downstream editorial use.
pub const PERSONAS: [&str; 5] = [
    "genz",
    "millenial",
    "working professionals",
    "creative thinkers",
    "spiritual explorers",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slide {
    pub title: String,
    pub prompt: String,
    pub image_prompt: String,
    pub script: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryOutput {
    pub category: String,
    pub subcategory: String,
    pub emotion: String,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Deserialize)]
pub struct OutlineSlide {
    pub title: String,
    pub prompt: String,
}

#[derive(Deserialize)]
struct OutlineResponse {
    slides: Vec<OutlineSlide>,
}

/// Outcome of parsing an outline response. A malformed body degrades to an
/// empty story rather than failing the run.
#[derive(Debug)]
pub enum ParsedOutline {
    Parsed(Vec<OutlineSlide>),
    UseDefault,
}

pub fn parse_outline(raw: &str) -> ParsedOutline {
    let clean = strip_code_blocks(raw);
    match serde_json::from_str::<OutlineResponse>(&clean) {
        Ok(response) => ParsedOutline::Parsed(response.slides),
        Err(_) => ParsedOutline::UseDefault,
    }
}

pub fn strip_code_blocks(s: &str) -> String {
    let s = s.trim();
    if s.starts_with("```json") {
        s.trim_start_matches("```json")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else if s.starts_with("```") {
        s.trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else {
        s.to_string()
    }
}

pub struct ScriptGenerator {
    character_sketch: String,
}

impl ScriptGenerator {
    pub fn new(config: &Config) -> Self {
        Self {
            character_sketch: config
                .story
                .character_sketch
                .clone()
                .unwrap_or_else(|| DEFAULT_CHARACTER_SKETCH.to_string()),
        }
    }

    #[cfg(test)]
    pub fn with_sketch(character_sketch: &str) -> Self {
        Self {
            character_sketch: character_sketch.to_string(),
        }
    }

    /// Build the full slide deck: one outline call, a locally synthesized
    /// intro slide, then one narration call per outline entry.
    pub async fn generate(
        &self,
        llm: &dyn LlmClient,
        classification: &Classification,
        article_text: &str,
    ) -> Result<StoryOutput> {
        let excerpt: String = article_text.chars().take(ARTICLE_PROMPT_LIMIT).collect();

        let system_prompt = "You are a digital content editor.\n\n\
            Create a structured 5-slide web story from the article below. Each slide must contain:\n\
            - A short English title (for the slide)\n\
            - A prompt: a clear instruction telling another GPT model what narration to write (don't write the narration here)\n\n\
            Format:\n\
            {\n  \"slides\": [\n    { \"title\": \"...\", \"prompt\": \"...\" },\n    ...\n  ]\n}";

        let user_prompt = format!(
            "Category: {}\nSubcategory: {}\nEmotion: {}\n\nArticle:\n\"\"\"{}\"\"\"",
            classification.category, classification.subcategory, classification.emotion, excerpt
        );

        let outline_response = llm.chat(system_prompt, user_prompt.trim()).await?;

        let outline = match parse_outline(&outline_response) {
            ParsedOutline::Parsed(slides) => slides,
            ParsedOutline::UseDefault => {
                log::warn!("Outline response was not valid JSON, producing an empty story");
                return Ok(StoryOutput {
                    category: classification.category.clone(),
                    subcategory: classification.subcategory.clone(),
                    emotion: classification.emotion.clone(),
                    slides: Vec::new(),
                });
            }
        };

        let mut slides = vec![intro_slide(article_text)];

        for entry in outline {
            let narration_prompt = format!(
                "Write a 3–4 line Hindi-English narration in the voice of Rohan Sharma.\n\n\
                Instruction: {}\n\
                Tone: Warm, simple, and clear. Avoid self-introduction.\n\n\
                Character sketch:\n{}",
                entry.prompt, self.character_sketch
            );

            let narration = llm
                .chat(
                    "You write news narration in Hindi-English mix.",
                    narration_prompt.trim(),
                )
                .await?;

            slides.push(Slide {
                image_prompt: format!("Modern vector-style visual for: {}", entry.title),
                title: entry.title,
                prompt: entry.prompt,
                script: narration.trim().to_string(),
            });
        }

        Ok(StoryOutput {
            category: classification.category.clone(),
            subcategory: classification.subcategory.clone(),
            emotion: classification.emotion.clone(),
            slides,
        })
    }
}

/// Slide 1 is synthesized from the headline, never from the LLM.
fn intro_slide(article_text: &str) -> Slide {
    let headline = article_text
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .replace('"', "");

    Slide {
        title: headline.chars().take(80).collect(),
        prompt: "Intro slide with greeting and headline.".to_string(),
        image_prompt: format!(
            "Vector-style illustration of Rohan Sharma presenting news: {}",
            headline
        ),
        script: format!(
            "Namaskar doston, main hoon Rohan Sharma. Aaj ki badi khabar: {}",
            headline
        ),
    }
}

/// Flatten the slide deck into the structured-narration interchange map:
/// `s{n}paragraph1` -> trimmed script, n 1-based, insertion order = slide order.
pub fn restructure_slides(slides: &[Slide]) -> Map<String, Value> {
    let mut structured = Map::new();
    for (idx, slide) in slides.iter().enumerate() {
        structured.insert(
            format!("s{}paragraph1", idx + 1),
            Value::String(slide.script.trim().to_string()),
        );
    }
    structured
}
