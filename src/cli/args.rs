use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sfmc_client::http::DEFAULT_TIMEOUT_SECS;

/// sfmc - Salesforce Marketing Cloud REST/SOAP command line client
#[derive(Parser)]
#[command(name = "sfmc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub credentials: Credentials,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags override the `SFMC_*` environment variables.
#[derive(Args, Debug, Clone)]
pub struct Credentials {
    #[arg(long, global = true, env = "SFMC_CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(long, global = true, env = "SFMC_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    #[arg(long, global = true, env = "SFMC_TENANT_SUBDOMAIN")]
    pub tenant_subdomain: Option<String>,

    /// Business unit MID; wins over --account-name. SFMC_ACCOUNT_ID is
    /// only used when no account name resolves.
    #[arg(long, global = true)]
    pub account_id: Option<String>,

    /// Name looked up in the SFMC_ACCOUNT_IDS JSON mapping
    #[arg(long, global = true, env = "SFMC_ACCOUNT_NAME")]
    pub account_name: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authenticate and report the token expiry
    Token {
        /// Also print the access token
        #[arg(long)]
        show: bool,
    },
    /// Call a REST endpoint and print the JSON response
    Rest {
        /// Path relative to the tenant's REST host, e.g. data/v1/customobjects
        path: String,

        /// GET, POST, PUT or DELETE
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// JSON request body
        #[arg(long)]
        data: Option<String>,
    },
    /// Post a SOAP body fragment and print the raw XML response
    Soap {
        /// SOAPAction header, e.g. Retrieve
        action: String,

        /// File holding the body fragment, or '-' for stdin
        body: PathBuf,
    },
    /// Data extension lookups
    #[command(name = "data-extension", subcommand)]
    DataExtension(DataExtensionCommand),
    /// Subscriber lookups
    #[command(subcommand)]
    Subscriber(SubscriberCommand),
    /// Automation lookups
    #[command(subcommand)]
    Automation(ObjectCommand),
    /// Query activity lookups
    #[command(subcommand)]
    Query(ObjectCommand),
}

#[derive(Subcommand)]
pub enum DataExtensionCommand {
    /// Look up by customer key (SOAP)
    Get { key: String },
    /// Search by full or partial name
    Search { name: String },
    /// Fields of the first data extension matching a name
    Fields { name: String },
    /// Look up by object id
    ById { id: String },
}

#[derive(Subcommand)]
pub enum SubscriberCommand {
    /// Look up by subscriber key (SOAP)
    Get { key: String },
}

#[derive(Subcommand)]
pub enum ObjectCommand {
    /// Look up by customer key (SOAP)
    Get { key: String },
    /// Look up by id (REST)
    ById { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rest_command() {
        let cli = Cli::try_parse_from([
            "sfmc",
            "--tenant-subdomain",
            "mc123",
            "rest",
            "data/v1/customobjects",
            "-X",
            "post",
            "--data",
            r#"{"name": "Orders"}"#,
        ])
        .unwrap();

        assert_eq!(cli.credentials.tenant_subdomain.as_deref(), Some("mc123"));
        assert_eq!(cli.timeout, DEFAULT_TIMEOUT_SECS);
        match cli.command {
            Commands::Rest { path, method, data } => {
                assert_eq!(path, "data/v1/customobjects");
                assert_eq!(method, "post");
                assert!(data.is_some());
            }
            _ => panic!("expected rest command"),
        }
    }

    #[test]
    fn test_parse_nested_object_commands() {
        let cli = Cli::try_parse_from(["sfmc", "data-extension", "by-id", "abc", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::DataExtension(DataExtensionCommand::ById { ref id }) if id == "abc"
        ));

        let cli = Cli::try_parse_from(["sfmc", "query", "get", "nightly"]).unwrap();
        assert!(matches!(cli.command, Commands::Query(ObjectCommand::Get { .. })));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["sfmc"]).is_err());
    }
}
