use crate::cli::{Args, Command};
use anyhow::Context;
use clap::Parser;
use sparql_mediator_engine::{FederationConfig, HttpKnowledgeNetwork, Mediator};
use sparql_mediator_web::{ServerConfig, TokenRegistry};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    init_logging();

    let matches = Args::parse();
    match matches.command {
        Command::Serve {
            bind,
            cors,
            knowledge_engine_url,
            knowledge_base_id_prefix,
            tokens_file,
            endpoint_name,
            request_timeout,
        } => {
            let tokens = match tokens_file {
                Some(path) => TokenRegistry::load(&path)
                    .with_context(|| format!("Could not load tokens from {}", path.display()))?,
                None => {
                    info!("No tokens file given, answering all requests as a single requester");
                    TokenRegistry::disabled()
                }
            };

            let network = HttpKnowledgeNetwork::new(
                knowledge_engine_url,
                Duration::from_secs(request_timeout),
            )
            .context("Could not create the knowledge engine client")?;
            let mediator = Mediator::with_network(
                Arc::new(network),
                FederationConfig::new(knowledge_base_id_prefix),
            );

            sparql_mediator_web::serve(ServerConfig {
                mediator: Arc::new(mediator),
                tokens,
                bind,
                cors,
                endpoint_name,
            })
            .await
        }
    }
}

/// Logs to stdout, filtered by `RUST_LOG` and `info` if it is not set.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
