// Lead qualification engine.
// Flow per lead: build_prompt → TextGenerator::generate → normalize → score → classify.
// All backend calls go through llm_client::TextGenerator; nothing here talks HTTP.

pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod prompts;
pub mod scoring;
