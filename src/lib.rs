pub mod amp;
pub mod article;
pub mod classify;
pub mod config;
pub mod llm;
pub mod script;
pub mod sentiment;
pub mod setup;
pub mod storage;
pub mod tts;
pub mod uploader;
pub mod workflow;
