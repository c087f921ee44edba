use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{error, info};

use crate::config::Config;
use crate::embeddings::OllamaClient;
use crate::pipeline::{CrawlPipeline, parse_seed_list};

/// Rank every page linked from `urls` by relevance to `query` and print the
/// result as JSON on stdout
#[inline]
pub async fn rank_links(query: &str, urls: &[String], limit: Option<usize>) -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;
    let seeds = parse_seed_list(urls);

    info!("Ranking links from {} seeds for query {:?}", seeds.len(), query);

    let pipeline = CrawlPipeline::from_config(&config).context("Failed to set up pipeline")?;

    let spinner = if console::user_attended_stderr() {
        let spinner = ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .expect("style template is valid"),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    } else {
        ProgressBar::hidden()
    };
    spinner.set_message(format!("Crawling {} seed pages", seeds.len()));

    let outcome = pipeline.search(query, &seeds).await;
    spinner.finish_and_clear();

    let mut ranked = outcome.context("Ranking failed")?;
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }

    let json = serde_json::to_string_pretty(&ranked).context("Failed to serialize results")?;
    println!("{}", json);

    Ok(())
}

/// Check that the Ollama server is reachable and serves the configured model
#[inline]
pub fn check_health() -> Result<()> {
    let config = Config::load_default().unwrap_or_default();

    println!("🤖 Ollama Status:");
    let client = match OllamaClient::new(&config.ollama) {
        Ok(client) => client,
        Err(e) => {
            println!("   ❌ Ollama: Invalid configuration - {}", e);
            return Err(e).context("Failed to create Ollama client");
        }
    };

    match client.health_check() {
        Ok(()) => {
            println!(
                "   ✅ Ollama: Connected ({}:{})",
                config.ollama.host, config.ollama.port
            );
            println!("   📋 Model: {}", client.model());
            println!("   🔢 Embedding Dimension: {}", client.embedding_dimension());
            Ok(())
        }
        Err(e) => {
            error!("Ollama health check failed: {:#}", e);
            println!("   ❌ Ollama: Unhealthy - {:#}", e);
            Err(e)
        }
    }
}
