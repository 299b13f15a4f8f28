//! Test utilities for dragon-core crate
//!
//! Common helpers shared by the unit test modules.

use std::path::PathBuf;
use tempfile::Builder;

/// Creates a temporary config file with the given content.
/// Uses tempfile::Builder to ensure unique directories for parallel tests.
///
/// # Panics
/// Panics if temp directory creation or file writing fails.
pub fn create_temp_config(content: &str) -> PathBuf {
    let temp_dir = Builder::new()
        .prefix("dragon-test")
        .rand_bytes(8)
        .tempdir()
        .unwrap();
    let config_path = temp_dir.path().join("dragon.yml");
    std::fs::write(&config_path, content).unwrap();
    // Keep the temp directory alive by leaking it (this is just for tests)
    let _ = Box::leak(Box::new(temp_dir));
    config_path
}

/// A chat completion body as returned by OpenAI compatible providers.
pub fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "gen-1",
        "object": "chat.completion",
        "created": 1684,
        "model": "openai/gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 20, "completion_tokens": 30, "total_tokens": 50}
    })
}
