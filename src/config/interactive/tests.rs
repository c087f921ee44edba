use super::load_existing_config as load_existing_config_impl;
use crate::config::OllamaConfig;
use std::fs;
use tempfile::TempDir;

#[test]
fn load_existing_config() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    fs::write(
        temp_dir.path().join("config.toml"),
        "[ollama]\nmodel = \"all-minilm\"\nembedding_dimension = 384\n",
    )
    .expect("should write config file");

    let config = load_existing_config_impl(temp_dir.path());

    assert_eq!(config.ollama.model, "all-minilm");
    assert_eq!(config.ollama.embedding_dimension, 384);
    assert!(config.ollama.port > 0);
    assert_eq!(config.get_base_dir(), temp_dir.path());
}

#[test]
fn broken_config_falls_back_to_defaults() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    fs::write(temp_dir.path().join("config.toml"), "[ollama\n").expect("should write config file");

    let config = load_existing_config_impl(temp_dir.path());

    assert_eq!(config.ollama, OllamaConfig::default());
    assert_eq!(config.get_base_dir(), temp_dir.path());
}

#[test]
fn missing_config_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");

    let config = load_existing_config_impl(&temp_dir.path().join("fresh"));

    assert_eq!(config.ollama, OllamaConfig::default());
    assert_eq!(config.get_base_dir(), temp_dir.path().join("fresh"));
}
