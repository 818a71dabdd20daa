use std::path::Path;

use anyhow::{Context, Result};
use sfmc_client::AsyncClient;
use tokio::io::AsyncReadExt;

/// Body fragment from a file, or from stdin when `body` is `-`.
async fn read_fragment(body: &Path) -> Result<String> {
    if body == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read SOAP body from stdin")?;
        Ok(buf)
    } else {
        tokio::fs::read_to_string(body)
            .await
            .with_context(|| format!("Failed to read SOAP body from {}", body.display()))
    }
}

pub async fn run_soap(client: &AsyncClient, action: &str, body: &Path) -> Result<()> {
    let fragment = read_fragment(body).await?;

    let doc = client
        .make_soap_request(action, fragment.trim())
        .await
        .with_context(|| format!("SOAP {} failed", action))?;

    println!("{}", doc.raw());
    Ok(())
}
