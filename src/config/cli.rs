use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "az-list-secrets")]
#[command(about = "List the secrets of an Azure Key Vault with their values, using the az CLI")]
pub struct CliConfig {
    /// Name of the Key Vault to read
    pub vault_name: String,

    /// Path to a TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the az binary (defaults to AZ_LIST_SECRETS_AZ_PATH, then `az`)
    #[arg(long)]
    pub az_path: Option<String>,

    /// Maximum number of concurrent `az keyvault secret show` calls
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Kill any az invocation that runs longer than this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Stop at the first secret that cannot be shown
    #[arg(long)]
    pub fail_fast: bool,

    /// Treat undecodable az output as an error instead of an empty value
    #[arg(long)]
    pub strict_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Write logs to stderr as JSON")]
    pub log_json: bool,
}
