#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::az_cli::resolve_program;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_program_path, validate_range, Validate,
};
use std::time::Duration;
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
pub const MAX_CONCURRENCY_LIMIT: usize = 64;

/// 合併命令列參數、設定檔、環境變數與預設值後的設定
#[derive(Debug, Clone)]
pub struct Settings {
    pub vault_name: String,
    pub program: String,
    pub max_concurrency: usize,
    pub timeout: Option<Duration>,
    pub fail_fast: bool,
    pub strict_json: bool,
}

impl Settings {
    pub fn new(vault_name: impl Into<String>) -> Self {
        Self {
            vault_name: vault_name.into(),
            program: resolve_program(None),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: None,
            fail_fast: false,
            strict_json: false,
        }
    }

    /// 套用設定檔中有提供的欄位
    pub fn with_file(mut self, file: &TomlConfig) -> Self {
        if let Some(program) = &file.cli.program {
            self.program = program.clone();
        }
        if let Some(seconds) = file.cli.timeout_seconds {
            self.timeout = Some(Duration::from_secs(seconds));
        }
        if let Some(concurrency) = file.execution.max_concurrency {
            self.max_concurrency = concurrency;
        }
        if let Some(fail_fast) = file.execution.fail_fast {
            self.fail_fast = fail_fast;
        }
        if let Some(strict_json) = file.execution.strict_json {
            self.strict_json = strict_json;
        }
        self
    }

    /// 優先順序：命令列參數 > 設定檔 > 環境變數 > 預設值
    #[cfg(feature = "cli")]
    pub fn from_cli(cli: &CliConfig) -> Result<Self> {
        let mut settings = Self::new(cli.vault_name.clone());

        if let Some(path) = &cli.config {
            tracing::info!("📁 Loading settings from: {}", path.display());
            let file = TomlConfig::from_file(path)?;
            file.validate()?;
            settings = settings.with_file(&file);
        }

        if let Some(program) = &cli.az_path {
            settings.program = program.clone();
        }
        if let Some(seconds) = cli.timeout_secs {
            settings.timeout = Some(Duration::from_secs(seconds));
        }
        if let Some(concurrency) = cli.max_concurrency {
            settings.max_concurrency = concurrency;
        }
        settings.fail_fast |= cli.fail_fast;
        settings.strict_json |= cli.strict_json;

        Ok(settings)
    }
}

impl ConfigProvider for Settings {
    fn vault_name(&self) -> &str {
        &self.vault_name
    }

    fn program(&self) -> &str {
        &self.program
    }

    fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    fn strict_json(&self) -> bool {
        self.strict_json
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("vault_name", &self.vault_name)?;
        validate_program_path("az_path", &self.program)?;
        validate_range(
            "max_concurrency",
            self.max_concurrency,
            1,
            MAX_CONCURRENCY_LIMIT,
        )?;
        if let Some(timeout) = self.timeout {
            validate_range("timeout_secs", timeout.as_secs(), 1, 86_400)?;
        }
        Ok(())
    }
}
