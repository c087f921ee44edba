// Configuration management module
// TOML settings for the embedding backend, page fetching and ranking

pub mod interactive;
pub mod settings;


pub use interactive::{run_interactive_config, show_config};
pub use settings::{CONFIG_DIR_ENV, Config, ConfigError, OllamaConfig};
