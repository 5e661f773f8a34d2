use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("Concurrency limiter closed: {0}")]
    PermitError(#[from] tokio::sync::AcquireError),

    #[error("Failed to start '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} failed with {status}:\n{output}")]
    CommandFailed {
        operation: String,
        command: String,
        status: String,
        output: String,
    },

    #[error("'{command}' did not finish within {seconds}s")]
    TimeoutError { command: String, seconds: u64 },

    #[error("Could not decode {what}: {message}")]
    DecodeError { what: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{failed} of {total} secrets could not be shown")]
    PartialFailure { failed: usize, total: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    ExternalCommand,
    Decoding,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SecretsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SecretsError::ConfigError { .. }
            | SecretsError::ConfigValidationError { .. }
            | SecretsError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SecretsError::CommandFailed { .. }
            | SecretsError::TimeoutError { .. }
            | SecretsError::PartialFailure { .. } => ErrorCategory::ExternalCommand,
            SecretsError::DecodeError { .. } => ErrorCategory::Decoding,
            SecretsError::IoError(_)
            | SecretsError::TaskError(_)
            | SecretsError::PermitError(_)
            | SecretsError::SpawnError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Decoding => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::ExternalCommand => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 依嚴重程度決定行程結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium | ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SecretsError::SpawnError { .. } => {
                "Install the Azure CLI or point --az-path / AZ_LIST_SECRETS_AZ_PATH at the az binary"
            }
            SecretsError::CommandFailed { .. } => {
                "Run 'az login' and check that the vault name is correct and you have 'list'/'get' secret permissions"
            }
            SecretsError::TimeoutError { .. } => {
                "Increase --timeout-secs or check network connectivity to Azure"
            }
            SecretsError::DecodeError { .. } => {
                "Check the az CLI version, or drop --strict-json to tolerate unexpected output"
            }
            SecretsError::PartialFailure { .. } => {
                "Review the failed secrets above; use --fail-fast to stop at the first failure"
            }
            SecretsError::ConfigError { .. }
            | SecretsError::ConfigValidationError { .. }
            | SecretsError::InvalidConfigValueError { .. } => {
                "Check the command-line flags and the settings file"
            }
            SecretsError::IoError(_)
            | SecretsError::TaskError(_)
            | SecretsError::PermitError(_) => {
                "Retry the command; if it keeps failing run with --verbose"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SecretsError::CommandFailed {
                operation, output, ..
            } => {
                let first_line = output
                    .lines()
                    .find(|l| !l.trim().is_empty())
                    .unwrap_or("no output");
                format!("{} failed: {}", operation, first_line.trim())
            }
            SecretsError::SpawnError { program, .. } => {
                format!("Could not run '{}'", program)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SecretsError>;
