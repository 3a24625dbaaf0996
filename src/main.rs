use anyhow::{Context, Result};
use news2webstory::config::Config;
use news2webstory::llm::create_llm;
use news2webstory::setup;
use news2webstory::storage::{ObjectStore, S3Store};
use news2webstory::tts::create_tts_client;
use news2webstory::workflow::StoryPipeline;
use std::path::Path;

fn print_usage() {
    eprintln!("Usage: news2webstory <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  generate <url> [persona]     Fetch an article and generate the narrated story");
    eprintln!("  synthesize <narration.json> [voice]");
    eprintln!("                               Synthesize audio for each paragraph and upload it");
    eprintln!("  assemble <tts_output.json>   Render the final AMP web story HTML");
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        print_usage();
        anyhow::bail!("No command given");
    };

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            eprintln!("Please ensure 'config.yml' exists with llm, tts and storage settings.");
            return Err(e);
        }
    };

    config.ensure_directories()?;

    match command.as_str() {
        "generate" => {
            let url = args
                .get(2)
                .context("Usage: news2webstory generate <url> [persona]")?;
            let persona = setup::resolve_persona(args.get(3).cloned())?;

            let llm = create_llm(&config)?;
            let tts = create_tts_client(&config);
            let store: Box<dyn ObjectStore> = Box::new(S3Store::new(&config.storage));
            let pipeline = StoryPipeline::new(config, llm, tts, store);
            pipeline.generate(url, &persona).await?;
        }
        "synthesize" => {
            let input = args
                .get(2)
                .context("Usage: news2webstory synthesize <narration.json> [voice]")?
                .clone();
            let voice = setup::resolve_voice(&config, args.get(3).cloned())?;

            let llm = create_llm(&config)?;
            let tts = create_tts_client(&config);
            let store: Box<dyn ObjectStore> = Box::new(S3Store::new(&config.storage));
            let pipeline = StoryPipeline::new(config, llm, tts, store);
            pipeline.synthesize(Path::new(&input), &voice).await?;
        }
        "assemble" => {
            let input = args
                .get(2)
                .context("Usage: news2webstory assemble <tts_output.json>")?
                .clone();

            let llm = create_llm(&config)?;
            let tts = create_tts_client(&config);
            let store: Box<dyn ObjectStore> = Box::new(S3Store::new(&config.storage));
            let pipeline = StoryPipeline::new(config, llm, tts, store);
            pipeline.assemble(Path::new(&input)).await?;
        }
        _ => {
            print_usage();
            anyhow::bail!("Unknown command: {}", command);
        }
    }

    Ok(())
}
