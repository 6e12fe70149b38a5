//! vLLM Router Server
//!
//! Main entry point for the model-aware inference proxy

use vllm_router::start_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    start_server().await
}
