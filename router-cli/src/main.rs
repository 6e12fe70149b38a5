//! vLLM Router CLI Tool
//!
//! Command line interface for checking router configuration and backends

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::debug;
use vllm_router_core::config::loader::load_config_from_path;
use vllm_router_discovery::DiscoveryService;

#[derive(Parser)]
#[command(name = "vllm-router-cli")]
#[command(about = "A CLI tool for operating vLLM Router")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration file
    ValidateConfig {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,
    },
    /// Probe every configured backend once and print the resulting route table
    Probe {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,
        /// Print the route table as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate example configuration file
    GenerateConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config_example.toml")]
        output: String,
    },
    /// Ask a running router to refresh and list its models
    Models {
        /// Base URL of the running router
        #[arg(short, long, default_value = "http://127.0.0.1:5000")]
        url: String,
    },
}

/// `/available_models` 的响应
#[derive(Debug, Deserialize)]
struct AvailableModels {
    available_models: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ValidateConfig { config } => {
            println!("Validating configuration file: {}", config);
            match load_config_from_path(&config) {
                Ok(cfg) => {
                    println!("✅ Configuration is valid");
                    println!("  - {} backends configured", cfg.discovery.addresses.len());
                    if let Ok(default) = cfg.discovery.default_backend() {
                        println!("  - default backend: {}", default);
                    }
                    println!(
                        "  - discovery every {}s (probe timeout {}s)",
                        cfg.discovery.interval_seconds, cfg.discovery.probe_timeout_seconds
                    );
                    println!("  - listening on {}", cfg.server.bind_address);
                }
                Err(e) => {
                    eprintln!("❌ Configuration validation failed: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Probe { config, json } => {
            let cfg = load_config_from_path(&config)?;
            probe_backends(&cfg, json).await?;
        }
        Commands::GenerateConfig { output } => {
            println!("Generating configuration file: {}", output);
            std::fs::write(&output, EXAMPLE_CONFIG)
                .with_context(|| format!("Failed to write '{}'", output))?;
            println!("✅ Configuration file generated successfully");
        }
        Commands::Models { url } => {
            list_router_models(&url).await?;
        }
    }

    Ok(())
}

/// 执行一次完整探测
async fn probe_backends(cfg: &vllm_router_core::Config, as_json: bool) -> Result<()> {
    let service = DiscoveryService::new(&cfg.discovery)?;
    println!("Probing {} backends...", service.addresses().len());

    let report = service.sweep().await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(report.table.as_ref())?);
    } else {
        println!("Route table ({} models):", report.table.len());
        for model in report.table.models() {
            if let Some(backend) = report.table.get(&model) {
                println!("  {} -> {}", model, backend);
            }
        }
    }

    for (backend, error) in &report.failures {
        eprintln!("❌ {}: {}", backend, error);
    }
    println!("Sweep finished in {:?}", report.duration);

    if report.table.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

async fn list_router_models(url: &str) -> Result<()> {
    let endpoint = format!("{}/available_models", url.trim_end_matches('/'));
    debug!("Requesting {}", endpoint);

    let response = reqwest::get(&endpoint)
        .await
        .with_context(|| format!("Failed to reach router at {}", url))?
        .error_for_status()?;
    let models: AvailableModels = response.json().await?;

    if models.available_models.is_empty() {
        println!("No models available");
    }
    for model in models.available_models {
        println!("{}", model);
    }
    Ok(())
}

const EXAMPLE_CONFIG: &str = include_str!("../../config_example.toml");

#[cfg(test)]
mod tests {
    use super::*;
    use vllm_router_core::config::loader::parse_config;

    #[test]
    fn test_example_config_is_valid() {
        let config = parse_config(EXAMPLE_CONFIG).unwrap();

        assert_eq!(config.discovery.addresses.len(), 2);
        assert_eq!(config.discovery.default_index, 0);
        assert_eq!(config.server.bind_address, "0.0.0.0:5000");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["vllm-router-cli", "probe", "--config", "a.toml", "--json"])
            .unwrap();
        match cli.command {
            Commands::Probe { config, json } => {
                assert_eq!(config, "a.toml");
                assert!(json);
            }
            _ => panic!("expected probe command"),
        }
    }
}
