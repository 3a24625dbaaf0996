use anyhow::{bail, Result};
use log::warn;
use serde_json::{Map, Value};

/// Marker the template must contain; replaced by the rendered slides.
pub const SLIDE_PLACEHOLDER: &str = "<!-- SLIDES -->";

/// Numeric suffix of a slide key ("slide12" -> 12). Keys without trailing
/// digits carry no position and are ignored by the assembler.
fn slide_index(key: &str) -> Option<usize> {
    let start = key
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    key[start..].parse().ok()
}

/// Normalize quote characters for attribute-safe interpolation.
pub fn escape_narration(text: &str) -> String {
    text.replace('\u{2019}', "&rsquo;").replace('"', "&quot;")
}

fn render_slide(paragraph: &str, audio_url: &str) -> String {
    format!(
        r#"    <amp-story-page class="story-slide">
      <amp-story-grid-layer template="fill" class="slide-backdrop">
        <div class="gradient-overlay"></div>
      </amp-story-grid-layer>
      <amp-story-grid-layer template="vertical" class="slide-content">
        <div class="narration-card" animate-in="fly-in-bottom" animate-in-duration="1.2s">
          <p class="narration-text" animate-in="fade-in" animate-in-delay="0.4s">{}</p>
        </div>
      </amp-story-grid-layer>
      <amp-story-grid-layer template="fill">
        <amp-audio src="{}" layout="nodisplay" autoplay></amp-audio>
      </amp-story-grid-layer>
    </amp-story-page>
"#,
        escape_narration(paragraph),
        audio_url
    )
}

/// Render every slide of a TTS output into the template.
///
/// Slides are ordered by the numeric suffix of their keys, not by map order.
/// A slide missing its paragraph or audio URL is skipped with a warning.
pub fn assemble_story(tts_output: &Map<String, Value>, template: &str) -> Result<String> {
    if !template.contains(SLIDE_PLACEHOLDER) {
        bail!("Template is missing the {} placeholder", SLIDE_PLACEHOLDER);
    }

    let mut ordered: Vec<(usize, &String)> = tts_output
        .keys()
        .filter_map(|key| slide_index(key).map(|idx| (idx, key)))
        .collect();
    ordered.sort_by_key(|(idx, _)| *idx);

    let mut fragments = String::new();
    for (idx, key) in ordered {
        let Some(entry) = tts_output.get(key).and_then(Value::as_object) else {
            warn!("Skipping {}: not an object", key);
            continue;
        };

        let paragraph = entry
            .get(&format!("s{}paragraph1", idx))
            .and_then(Value::as_str);
        let audio_url = entry
            .get(&format!("audio_url{}", idx))
            .and_then(Value::as_str);

        let (Some(paragraph), Some(audio_url)) = (paragraph, audio_url) else {
            warn!("Skipping {}: missing paragraph or audio URL", key);
            continue;
        };

        fragments.push_str(&render_slide(paragraph, audio_url));
    }

    Ok(template.replace(SLIDE_PLACEHOLDER, &fragments))
}
