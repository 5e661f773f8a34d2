// Adapters layer: concrete implementations for external systems.

pub mod az_cli;

pub use az_cli::AzCliClient;
