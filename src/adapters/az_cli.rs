use crate::domain::model::{Listing, ListingEntry, ShowEntry};
use crate::domain::ports::{ConfigProvider, SecretSource};
use crate::utils::error::{Result, SecretsError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// 指定 `az` 執行檔路徑的環境變數
pub const AZ_PATH_ENV: &str = "AZ_LIST_SECRETS_AZ_PATH";

pub const DEFAULT_PROGRAM: &str = "az";

/// 決定 `az` 執行檔：明確設定優先，其次是 [`AZ_PATH_ENV`]，最後是 PATH 上的 `az`
pub fn resolve_program(configured: Option<&str>) -> String {
    select_program(configured, std::env::var(AZ_PATH_ENV).ok())
}

/// 同 [`resolve_program`]，但環境變數值由呼叫端提供
pub fn select_program(configured: Option<&str>, env_value: Option<String>) -> String {
    if let Some(program) = configured {
        return program.to_string();
    }

    match env_value {
        Some(path) if !path.trim().is_empty() => path,
        _ => DEFAULT_PROGRAM.to_string(),
    }
}

/// 透過 `az` CLI 存取 Key Vault 的客戶端
#[derive(Debug, Clone)]
pub struct AzCliClient {
    program: String,
    timeout: Option<Duration>,
    strict_json: bool,
}

impl AzCliClient {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
            strict_json: false,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(config.program())
            .with_timeout(config.timeout())
            .with_strict_json(config.strict_json())
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_strict_json(mut self, strict_json: bool) -> Self {
        self.strict_json = strict_json;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn list_args(vault_name: &str) -> Vec<String> {
        [
            "keyvault",
            "secret",
            "list",
            "--vault-name",
            vault_name,
            "--output",
            "json",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    pub fn show_args(vault_name: &str, secret_id: &str) -> Vec<String> {
        [
            "keyvault",
            "secret",
            "show",
            "--id",
            secret_id,
            "--vault-name",
            vault_name,
            "--output",
            "json",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// 執行 `az` 指令並回傳 stdout
    ///
    /// 非零結束碼轉為 [`SecretsError::CommandFailed`]，內含 stdout 與 stderr 的完整輸出
    async fn run(&self, operation: &str, args: &[String]) -> Result<String> {
        let command_line = format!("{} {}", self.program, args.join(" "));
        tracing::debug!("Running: {}", command_line);

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let child = command.output();

        // 逾時時丟棄 future，kill_on_drop 會結束子行程
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child).await.map_err(|_| {
                SecretsError::TimeoutError {
                    command: command_line.clone(),
                    seconds: limit.as_secs(),
                }
            })?,
            None => child.await,
        }
        .map_err(|source| SecretsError::SpawnError {
            program: self.program.clone(),
            source,
        })?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        tracing::debug!("'{}' exited with {}", command_line, output.status);
        Err(SecretsError::CommandFailed {
            operation: operation.to_string(),
            command: command_line,
            status: output.status.to_string(),
            output: combined,
        })
    }
}

#[async_trait]
impl SecretSource for AzCliClient {
    async fn list_secrets(&self, vault_name: &str) -> Result<Listing> {
        let raw = self.run("Listing", &Self::list_args(vault_name)).await?;
        let entries = decode_listing(&raw, self.strict_json)?;
        tracing::debug!("Decoded {} listing entries", entries.len());
        Ok(Listing { raw, entries })
    }

    async fn show_secret(&self, vault_name: &str, secret_id: &str) -> Result<ShowEntry> {
        let raw = self
            .run("Show", &Self::show_args(vault_name, secret_id))
            .await?;
        decode_output(&format!("secret '{}'", secret_id), &raw, self.strict_json)
    }
}

/// 解碼 `az` 的 JSON 輸出
///
/// 非 strict 模式下，無法解碼的輸出以 `T::default()` 取代並記錄警告
pub fn decode_output<T>(what: &str, raw: &str, strict: bool) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(e) if strict => Err(SecretsError::DecodeError {
            what: what.to_string(),
            message: e.to_string(),
        }),
        Err(e) => {
            tracing::warn!("⚠️ Ignoring undecodable {}: {}", what, e);
            Ok(T::default())
        }
    }
}

/// 解碼列表陣列
///
/// 非 strict 模式下逐筆解碼：壞掉的元素以空的 [`ListingEntry`] 取代，其餘照常保留；
/// 最外層不是 JSON 陣列時才得到空列表
pub fn decode_listing(raw: &str, strict: bool) -> Result<Vec<ListingEntry>> {
    if strict {
        return decode_output("secret listing", raw, true);
    }

    let elements: Vec<serde_json::Value> = decode_output("secret listing", raw, false)?;
    Ok(elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            ListingEntry::deserialize(element).unwrap_or_else(|e| {
                tracing::warn!("⚠️ Ignoring undecodable listing entry #{}: {}", index, e);
                ListingEntry::default()
            })
        })
        .collect())
}
