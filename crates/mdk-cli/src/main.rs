use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::info;

use mdk_deployment::{write_report_json, DeploymentConfig, ModelDeployment};
use mdk_eval::BinaryClassificationEvaluator;
use mdk_inference::HttpInferenceRunner;
use mdk_registry::HttpRegistryClient;
use mdk_tracking::HttpTrackingStore;

#[derive(Parser)]
#[command(name = "mdk")]
#[command(about = "ModelDesk deployment CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the staging candidate against production and promote or archive it.
    Deploy {
        /// Layered config paths in merge order (base -> env -> model)
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Directory the deployment report is written to
        #[arg(long = "report-dir", default_value = "reports")]
        report_dir: PathBuf,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

/// Service base URLs from the `endpoints` config section.
#[derive(Debug, Deserialize)]
struct Endpoints {
    registry_uri: String,
    tracking_uri: String,
    scoring_uri: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Deploy {
            config_paths,
            report_dir,
        } => {
            let loaded = mdk_config::load_layered_yaml(&config_paths)?;
            info!(config_hash = %loaded.config_hash, "loaded layered config");

            let endpoints: Endpoints = loaded.section("endpoints")?;
            let config: DeploymentConfig = loaded.section("deployment")?;

            let deployment = ModelDeployment::new(
                config,
                Box::new(HttpRegistryClient::new(&endpoints.registry_uri)),
                Box::new(HttpTrackingStore::new(&endpoints.tracking_uri)),
                Box::new(HttpInferenceRunner::new(&endpoints.scoring_uri)),
                Box::new(BinaryClassificationEvaluator::new()),
            );

            let report = deployment.run().await?;
            let path = write_report_json(&report_dir, &report)
                .context("failed to write deployment report")?;

            println!("decision={}", report.decision.as_str());
            println!("candidate_version={}", report.candidate_version);
            println!("report={}", path.display());
        }

        Commands::ConfigHash { paths } => {
            let loaded = mdk_config::load_layered_yaml(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
