use crate::config::Config;
use crate::script::PERSONAS;
use crate::tts::{is_valid_voice, VOICES};
use anyhow::{bail, Result};
use inquire::Select;

/// Pick the audience persona: CLI argument if given, otherwise an interactive
/// prompt.
pub fn resolve_persona(arg: Option<String>) -> Result<String> {
    if let Some(persona) = arg {
        if PERSONAS.contains(&persona.as_str()) {
            return Ok(persona);
        }
        bail!(
            "Unknown persona '{}'. Expected one of: {}",
            persona,
            PERSONAS.join(", ")
        );
    }

    let options: Vec<String> = PERSONAS.iter().map(|p| p.to_string()).collect();
    let selection = Select::new("Choose audience persona:", options).prompt()?;
    Ok(selection)
}

/// Pick the TTS voice: CLI argument, then configured default, then an
/// interactive prompt.
pub fn resolve_voice(config: &Config, arg: Option<String>) -> Result<String> {
    if let Some(voice) = arg {
        if is_valid_voice(&voice) {
            return Ok(voice);
        }
        bail!(
            "Unknown voice '{}'. Expected one of: {}",
            voice,
            VOICES.join(", ")
        );
    }

    if let Some(voice) = &config.tts.voice {
        if is_valid_voice(voice) {
            return Ok(voice.clone());
        }
    }

    let options: Vec<String> = VOICES.iter().map(|v| v.to_string()).collect();
    let selection = Select::new("Choose Voice:", options).prompt()?;
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_persona_accepts_known_value() {
        assert_eq!(
            resolve_persona(Some("genz".to_string())).unwrap(),
            "genz"
        );
    }

    #[test]
    fn test_resolve_persona_rejects_unknown_value() {
        assert!(resolve_persona(Some("boomers".to_string())).is_err());
    }
}
