use anyhow::{Context, Result};
use serde_json::Value;
use sfmc_client::AsyncClient;

use super::print_json;

pub async fn run_rest(
    client: &AsyncClient,
    path: &str,
    method: &str,
    data: Option<&str>,
) -> Result<()> {
    let payload: Option<Value> = data
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("--data is not valid JSON")?;

    let method = method.to_ascii_uppercase();
    let response = client
        .make_rest_request(path, method.as_str(), payload.as_ref())
        .await
        .with_context(|| format!("{} {} failed", method, path))?;

    print_json(&response)
}
