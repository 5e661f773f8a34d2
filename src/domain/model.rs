use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// `az keyvault secret list` 陣列中的一筆
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    #[serde(default, alias = "Id", alias = "ID", deserialize_with = "null_as_empty")]
    pub id: String,
}

/// `az keyvault secret show` 回傳的物件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowEntry {
    #[serde(default, alias = "Value", deserialize_with = "null_as_empty")]
    pub value: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// 原始列表輸出與解碼後的項目
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub raw: String,
    pub entries: Vec<ListingEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub name: String,
    pub value: String,
}

impl SecretRecord {
    pub fn new(id: &str, entry: ShowEntry) -> Self {
        Self {
            name: display_name(id).to_string(),
            value: entry.value,
        }
    }
}

/// secret 識別碼以 `/` 分隔的最後一段
pub fn display_name(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretFailure {
    pub id: String,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretOutcome {
    Shown(SecretRecord),
    Failed(SecretFailure),
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total: usize,
    pub shown: usize,
    pub failed: Vec<SecretFailure>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}
