use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use sfmc_client::{AsyncClient, Config, HttpSettings};
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod command;

use cli::{Cli, Commands, Credentials};
use command::{
    run_automation, run_data_extension, run_query, run_rest, run_soap, run_subscriber, run_token,
};

/// Flags first, then the `SFMC_*` variables in `env`.
fn resolve_config(credentials: Credentials, env: HashMap<String, String>) -> Result<Config> {
    let mut builder = Config::builder().environment(env);
    if let Some(value) = credentials.client_id {
        builder = builder.client_id(value);
    }
    if let Some(value) = credentials.client_secret {
        builder = builder.client_secret(value);
    }
    if let Some(value) = credentials.tenant_subdomain {
        builder = builder.tenant_subdomain(value);
    }
    if let Some(value) = credentials.account_id {
        builder = builder.account_id(value);
    }
    if let Some(value) = credentials.account_name {
        builder = builder.account_name(value);
    }
    builder.build().context("Invalid Marketing Cloud configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = resolve_config(cli.credentials, std::env::vars().collect())?;
    let settings = HttpSettings::default().with_timeout(Duration::from_secs(cli.timeout));
    let client = AsyncClient::builder(config)
        .settings(settings)
        .build()
        .context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Token { show } => run_token(&client, show).await?,
        Commands::Rest { path, method, data } => {
            run_rest(&client, &path, &method, data.as_deref()).await?
        }
        Commands::Soap { action, body } => run_soap(&client, &action, &body).await?,
        Commands::DataExtension(command) => run_data_extension(&client, command).await?,
        Commands::Subscriber(command) => run_subscriber(&client, command).await?,
        Commands::Automation(command) => run_automation(&client, command).await?,
        Commands::Query(command) => run_query(&client, command).await?,
    }

    Ok(())
}
