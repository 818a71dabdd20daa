mod args;

pub use args::{Cli, Commands, Credentials, DataExtensionCommand, ObjectCommand, SubscriberCommand};
