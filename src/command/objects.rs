use anyhow::{Context, Result};
use sfmc_client::AsyncClient;

use super::{print_found, print_json};
use crate::cli::{DataExtensionCommand, ObjectCommand, SubscriberCommand};

pub async fn run_data_extension(client: &AsyncClient, command: DataExtensionCommand) -> Result<()> {
    let manager = client.data_extensions();
    match command {
        DataExtensionCommand::Get { key } => {
            let found = manager
                .get_by_key(&key)
                .await
                .with_context(|| format!("Failed to retrieve data extension {}", key))?;
            print_found(found, "data extension")
        }
        DataExtensionCommand::Search { name } => {
            let items = manager
                .get_by_name(&name)
                .await
                .context("Data extension search failed")?;
            print_found(items, "matching data extensions")
        }
        DataExtensionCommand::Fields { name } => {
            let fields = manager
                .get_fields(&name)
                .await
                .context("Failed to retrieve data extension fields")?;
            print_found(fields, "matching data extension")
        }
        DataExtensionCommand::ById { id } => print_json(&manager.get_by_id(&id).await?),
    }
}

pub async fn run_subscriber(client: &AsyncClient, command: SubscriberCommand) -> Result<()> {
    match command {
        SubscriberCommand::Get { key } => {
            let found = client
                .subscribers()
                .get_by_key(&key)
                .await
                .with_context(|| format!("Failed to retrieve subscriber {}", key))?;
            print_found(found, "subscriber")
        }
    }
}

pub async fn run_automation(client: &AsyncClient, command: ObjectCommand) -> Result<()> {
    let manager = client.automations();
    match command {
        ObjectCommand::Get { key } => print_found(manager.get_by_key(&key).await?, "automation"),
        ObjectCommand::ById { id } => print_json(&manager.get_by_id(&id).await?),
    }
}

pub async fn run_query(client: &AsyncClient, command: ObjectCommand) -> Result<()> {
    let manager = client.queries();
    match command {
        ObjectCommand::Get { key } => print_found(manager.get_by_key(&key).await?, "query"),
        ObjectCommand::ById { id } => print_json(&manager.get_by_id(&id).await?),
    }
}
