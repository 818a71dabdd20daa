mod objects;
mod rest;
mod soap;
mod token;

pub use objects::{run_automation, run_data_extension, run_query, run_subscriber};
pub use rest::run_rest;
pub use soap::run_soap;
pub use token::run_token;

use anyhow::Result;
use serde::Serialize;

/// Pretty-print a JSON-serializable result on stdout.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an optional lookup result, or a note on stderr when nothing matched.
fn print_found<T: Serialize>(value: Option<T>, what: &str) -> Result<()> {
    match value {
        Some(value) => print_json(&value),
        None => {
            eprintln!("No {} found.", what);
            Ok(())
        }
    }
}
