pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::AzCliClient;
pub use config::Settings;
pub use core::{lister::SecretLister, output::SecretPrinter};
pub use utils::error::{Result, SecretsError};
