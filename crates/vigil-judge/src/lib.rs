//! LLM judge client: sends a video-analysis artifact and its source
//! transcript to an OpenRouter-hosted model and parses the returned
//! seven-dimension verdict.

pub mod client;
pub mod error;
pub mod parse;

pub use client::{JudgeClient, JudgeConfig, JudgeVerdict};
pub use error::{JudgeError, JudgeResult};
