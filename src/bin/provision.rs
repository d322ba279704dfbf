//! Provision (or plan) a single company's bot from the command line.
//!
//! Usage: provision --company-id ID [--dry-run]
//!   --dry-run : print the service and variable names that would be created

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use zappybot_provisioner::{
    config::Config,
    db,
    db::company::PgTenantStore,
    models::company::ProvisionResponse,
    services::{
        provisioner::{ProvisioningSettings, Provisioner},
        railway::RailwayClient,
    },
};

#[derive(Parser)]
#[command(name = "provision", about = "Provision a company's lead-qualification bot")]
struct Args {
    /// Company id to provision
    #[arg(long)]
    company_id: String,

    /// Resolve the company and print the plan without calling the provider
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = Config::from_env()?;
    let settings = ProvisioningSettings::from_config(&config)?;

    let pool = db::create_pool(&config.database_url).await?;
    let store = Arc::new(PgTenantStore::new(pool));
    let provider = Arc::new(RailwayClient::from_config(&config));
    let provisioner = Provisioner::new(store, provider, settings);

    if args.dry_run {
        let plan = provisioner.plan(&args.company_id).await?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let outcome = provisioner.provision(&args.company_id).await?;
    if !outcome.recorded {
        tracing::warn!("Endpoint was not written back; update companies.service_url manually");
    }

    let response = ProvisionResponse {
        message: if outcome.reused {
            "Bot already provisioned".into()
        } else {
            "Bot provisioned and deployment triggered".into()
        },
        service_id: outcome.service_id,
        service_url: outcome.service_url,
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
