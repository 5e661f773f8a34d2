use crate::utils::error::{Result, SecretsError};
use crate::utils::validation::{validate_program_path, validate_range, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub cli: CliSection,
    #[serde(default)]
    pub execution: ExecutionSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliSection {
    pub program: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionSection {
    pub max_concurrency: Option<usize>,
    pub fail_fast: Option<bool>,
    pub strict_json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| SecretsError::ConfigError {
            message: format!(
                "cannot read settings file '{}': {}",
                path.as_ref().display(),
                e
            ),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SecretsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${AZ_PATH})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SecretsError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(program) = &self.cli.program {
            validate_program_path("cli.program", program)?;
        }
        if let Some(seconds) = self.cli.timeout_seconds {
            validate_range("cli.timeout_seconds", seconds, 1, 86_400)?;
        }
        if let Some(concurrency) = self.execution.max_concurrency {
            validate_range("execution.max_concurrency", concurrency, 1, 64)?;
        }
        Ok(())
    }
}
