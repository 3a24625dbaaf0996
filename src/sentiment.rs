use vader_sentiment::SentimentIntensityAnalyzer;

/// Map a polarity score in [-1, 1] to a coarse label. The 0.2 thresholds are
/// strict inequalities, so the boundary values themselves read as neutral.
pub fn label_polarity(polarity: f64) -> &'static str {
    if polarity > 0.2 {
        "positive"
    } else if polarity < -0.2 {
        "negative"
    } else {
        "neutral"
    }
}

pub fn tag_sentiment(text: &str) -> &'static str {
    let analyzer = SentimentIntensityAnalyzer::new();
    let scores = analyzer.polarity_scores(text);
    let polarity = scores.get("compound").copied().unwrap_or(0.0);
    label_polarity(polarity)
}
