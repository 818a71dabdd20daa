use anyhow::{Context, Result};
use sfmc_client::AsyncClient;

pub async fn run_token(client: &AsyncClient, show: bool) -> Result<()> {
    let token = client
        .auth()
        .get_token()
        .await
        .context("Failed to authenticate")?;

    println!("✅ Authenticated to {}", client.config().tenant_subdomain());
    println!("   Account: {}", client.config().account_id());
    if let Some(cached) = client.auth().cached_token() {
        println!("   Expires: {}", cached.expires_at.to_rfc3339());
    }
    if show {
        println!("   Token: {}", token);
    }

    Ok(())
}
