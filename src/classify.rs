use crate::llm::LlmClient;
use crate::script::strip_code_blocks;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Characters of article text included in LLM prompts. Longer articles are
/// silently truncated to bound prompt cost.
pub const ARTICLE_PROMPT_LIMIT: usize = 3000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub category: String,
    pub subcategory: String,
    pub emotion: String,
}

impl Classification {
    pub fn fallback() -> Self {
        Self {
            category: "Unknown".to_string(),
            subcategory: "General".to_string(),
            emotion: "Neutral".to_string(),
        }
    }
}

/// Outcome of parsing a classification response. Only a malformed or
/// field-incomplete JSON body selects the default; transport errors never
/// reach this point.
#[derive(Debug, PartialEq, Eq)]
pub enum ParsedClassification {
    Parsed(Classification),
    UseDefault,
}

pub fn parse_classification(raw: &str) -> ParsedClassification {
    let clean = strip_code_blocks(raw);
    match serde_json::from_str::<Classification>(&clean) {
        Ok(result) => ParsedClassification::Parsed(result),
        Err(_) => ParsedClassification::UseDefault,
    }
}

pub async fn classify(llm: &dyn LlmClient, article_text: &str) -> Result<Classification> {
    let excerpt: String = article_text.chars().take(ARTICLE_PROMPT_LIMIT).collect();

    let prompt = format!(
        "You are an expert news analyst.\n\n\
        Analyze the following news article and return:\n\n\
        1. category\n\
        2. subcategory\n\
        3. emotion\n\n\
        Article:\n\"\"\"{}\"\"\"\n\n\
        Return as JSON:\n\
        {{\n  \"category\": \"...\",\n  \"subcategory\": \"...\",\n  \"emotion\": \"...\"\n}}",
        excerpt
    );

    let response = llm
        .chat(
            "Classify article into category, subcategory, and emotion.",
            prompt.trim(),
        )
        .await?;

    match parse_classification(&response) {
        ParsedClassification::Parsed(result) => Ok(result),
        ParsedClassification::UseDefault => Ok(Classification::fallback()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[test]
    fn test_parse_classification_valid_json_passes_through() {
        let raw = r#"{"category": "Politics", "subcategory": "Elections", "emotion": "Concern"}"#;
        assert_eq!(
            parse_classification(raw),
            ParsedClassification::Parsed(Classification {
                category: "Politics".to_string(),
                subcategory: "Elections".to_string(),
                emotion: "Concern".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_classification_strips_code_fences() {
        let raw = "```json\n{\"category\": \"Sports\", \"subcategory\": \"Cricket\", \"emotion\": \"Joy\"}\n```";
        match parse_classification(raw) {
            ParsedClassification::Parsed(c) => assert_eq!(c.category, "Sports"),
            ParsedClassification::UseDefault => panic!("fenced JSON should parse"),
        }
    }

    #[test]
    fn test_parse_classification_non_json_uses_default() {
        assert_eq!(
            parse_classification("I could not classify this article."),
            ParsedClassification::UseDefault
        );
    }

    #[test]
    fn test_parse_classification_missing_field_uses_default() {
        let raw = r#"{"category": "Politics", "emotion": "Concern"}"#;
        assert_eq!(parse_classification(raw), ParsedClassification::UseDefault);
    }

    #[derive(Debug)]
    struct FixedLlmClient {
        response: String,
    }

    #[async_trait]
    impl LlmClient for FixedLlmClient {
        async fn chat(&self, _system: &str, _user: &str) -> Result<String> {
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn test_classify_returns_fallback_on_garbage_response() -> Result<()> {
        let llm = FixedLlmClient {
            response: "not json at all".to_string(),
        };
        let result = classify(&llm, "Some article text.").await?;
        assert_eq!(result, Classification::fallback());
        assert_eq!(result.category, "Unknown");
        assert_eq!(result.subcategory, "General");
        assert_eq!(result.emotion, "Neutral");
        Ok(())
    }

    #[derive(Debug)]
    struct FailingLlmClient;

    #[async_trait]
    impl LlmClient for FailingLlmClient {
        async fn chat(&self, _system: &str, _user: &str) -> Result<String> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_classify_propagates_transport_errors() {
        let result = classify(&FailingLlmClient, "Some article text.").await;
        assert!(result.is_err(), "transport failure must not degrade to the default");
    }
}
