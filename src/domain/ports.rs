use crate::domain::model::{Listing, ShowEntry};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// secret 列表與值的來源
#[async_trait]
pub trait SecretSource: Send + Sync {
    async fn list_secrets(&self, vault_name: &str) -> Result<Listing>;
    async fn show_secret(&self, vault_name: &str, secret_id: &str) -> Result<ShowEntry>;
}

pub trait ConfigProvider: Send + Sync {
    fn vault_name(&self) -> &str;
    fn program(&self) -> &str;
    fn max_concurrency(&self) -> usize;
    fn timeout(&self) -> Option<Duration>;
    fn fail_fast(&self) -> bool;
    fn strict_json(&self) -> bool;
}
