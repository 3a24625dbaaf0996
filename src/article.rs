use anyhow::{anyhow, Context, Result};
use scraper::{Html, Selector};

#[derive(Debug, Clone)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub full_text: String,
}

/// Download a news article and reduce it to title, summary and body text.
///
/// Any network or parse failure propagates to the caller; there is no retry.
pub async fn fetch_article(client: &reqwest::Client, url: &str) -> Result<Article> {
    let parsed = url::Url::parse(url).with_context(|| format!("Invalid article URL: {}", url))?;

    let resp = client
        .get(parsed)
        .send()
        .await
        .with_context(|| format!("Failed to download article: {}", url))?;

    if !resp.status().is_success() {
        return Err(anyhow!("Article fetch returned {} for {}", resp.status(), url));
    }

    let html = resp.text().await?;
    parse_article(&html)
}

pub fn parse_article(html: &str) -> Result<Article> {
    let document = Html::parse_document(html);

    // Static selectors, infallible to parse.
    let og_title = Selector::parse(r#"meta[property="og:title"]"#).unwrap();
    let title_tag = Selector::parse("title").unwrap();
    let description = Selector::parse(r#"meta[name="description"]"#).unwrap();
    let og_description = Selector::parse(r#"meta[property="og:description"]"#).unwrap();
    let paragraph = Selector::parse("p").unwrap();

    let title = document
        .select(&og_title)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string)
        .or_else(|| {
            document
                .select(&title_tag)
                .next()
                .map(|el| el.text().collect::<String>())
        })
        .map(|t| t.trim().to_string())
        .unwrap_or_default();

    let paragraphs: Vec<String> = document
        .select(&paragraph)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if paragraphs.is_empty() {
        return Err(anyhow!("No article text found in page"));
    }

    let summary = document
        .select(&description)
        .chain(document.select(&og_description))
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| paragraphs[0].clone());

    Ok(Article {
        title,
        summary,
        full_text: paragraphs.join("\n"),
    })
}
