use crate::core::output::SecretPrinter;
use crate::domain::model::{display_name, RunSummary, SecretFailure, SecretOutcome, SecretRecord};
use crate::domain::ports::{ConfigProvider, SecretSource};
use crate::utils::error::Result;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// 先列出 vault，再並行查詢每個 secret
///
/// 同時最多 `max_concurrency` 個 show 呼叫；前面的項目都完成後，依列表順序輸出
pub struct SecretLister<S: SecretSource + 'static> {
    source: Arc<S>,
    vault_name: String,
    max_concurrency: usize,
    fail_fast: bool,
}

impl<S: SecretSource + 'static> SecretLister<S> {
    pub fn new<C: ConfigProvider>(source: S, config: &C) -> Self {
        Self {
            source: Arc::new(source),
            vault_name: config.vault_name().to_string(),
            max_concurrency: config.max_concurrency().max(1),
            fail_fast: config.fail_fast(),
        }
    }

    pub async fn run<O: Write, E: Write>(
        &self,
        printer: &mut SecretPrinter<O, E>,
    ) -> Result<RunSummary> {
        let started = Instant::now();
        printer.connecting(&self.vault_name)?;

        // 列表失敗一律中止，不會發出任何 show
        tracing::info!("🔍 Listing secrets in vault '{}'", self.vault_name);
        let listing = self.source.list_secrets(&self.vault_name).await?;
        printer.listing(&listing.raw)?;
        printer.secrets_heading()?;

        let total = listing.entries.len();
        tracing::info!(
            "Found {} secrets, showing with up to {} concurrent calls",
            total,
            self.max_concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        for (index, entry) in listing.entries.into_iter().enumerate() {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let vault_name = self.vault_name.clone();
            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => source.show_secret(&vault_name, &entry.id).await,
                    Err(e) => Err(e.into()),
                };
                (index, entry.id, result)
            });
        }

        let mut summary = RunSummary {
            total,
            ..RunSummary::default()
        };
        let mut finished: Vec<Option<SecretOutcome>> = vec![None; total];
        let mut next_to_print = 0;

        while let Some(joined) = tasks.join_next().await {
            let (index, id, result) = joined?;
            let outcome = match result {
                Ok(entry) => SecretOutcome::Shown(SecretRecord::new(&id, entry)),
                Err(e) if self.fail_fast => {
                    tracing::error!("❌ Show failed for '{}', aborting: {}", id, e);
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("⚠️ Show failed for '{}': {}", id, e);
                    SecretOutcome::Failed(SecretFailure {
                        name: display_name(&id).to_string(),
                        id,
                        error: e.user_friendly_message(),
                    })
                }
            };
            finished[index] = Some(outcome);

            while let Some(outcome) = finished.get_mut(next_to_print).and_then(Option::take) {
                match outcome {
                    SecretOutcome::Shown(record) => {
                        printer.secret(&record)?;
                        summary.shown += 1;
                    }
                    SecretOutcome::Failed(failure) => {
                        printer.failure(&failure)?;
                        summary.failed.push(failure);
                    }
                }
                next_to_print += 1;
            }
        }

        summary.elapsed = started.elapsed();
        tracing::debug!("Run finished in {:?}", summary.elapsed);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::domain::model::{Listing, ListingEntry, ShowEntry};
    use crate::utils::error::SecretsError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    enum Reply {
        Value(&'static str, u64),
        Fail(u64),
    }

    struct MockSource {
        listing: std::result::Result<Vec<&'static str>, ()>,
        replies: HashMap<&'static str, Reply>,
        calls: Arc<Mutex<Vec<(String, String)>>>,
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl MockSource {
        fn new(ids: Vec<&'static str>) -> Self {
            Self {
                listing: Ok(ids),
                replies: HashMap::new(),
                calls: Arc::new(Mutex::new(Vec::new())),
                in_flight: Arc::new(AtomicUsize::new(0)),
                peak: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing_listing() -> Self {
            let mut source = Self::new(vec![]);
            source.listing = Err(());
            source
        }

        fn reply(mut self, id: &'static str, reply: Reply) -> Self {
            self.replies.insert(id, reply);
            self
        }
    }

    fn command_failed(operation: &str) -> SecretsError {
        SecretsError::CommandFailed {
            operation: operation.to_string(),
            command: "az keyvault secret".to_string(),
            status: "exit status: 1".to_string(),
            output: "ERROR: Forbidden\n".to_string(),
        }
    }

    #[async_trait]
    impl SecretSource for MockSource {
        async fn list_secrets(&self, _vault_name: &str) -> Result<Listing> {
            match &self.listing {
                Ok(ids) => Ok(Listing {
                    raw: "[...]".to_string(),
                    entries: ids
                        .iter()
                        .map(|id| ListingEntry { id: id.to_string() })
                        .collect(),
                }),
                Err(()) => Err(command_failed("Listing")),
            }
        }

        async fn show_secret(&self, vault_name: &str, secret_id: &str) -> Result<ShowEntry> {
            self.calls
                .lock()
                .await
                .push((vault_name.to_string(), secret_id.to_string()));

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let reply = self
                .replies
                .get(secret_id)
                .cloned()
                .unwrap_or(Reply::Value("", 0));
            let delay = match &reply {
                Reply::Value(_, ms) | Reply::Fail(ms) => *ms,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match reply {
                Reply::Value(value, _) => Ok(ShowEntry {
                    value: value.to_string(),
                }),
                Reply::Fail(_) => Err(command_failed("Show")),
            }
        }
    }

    fn output_of(printer: SecretPrinter<Vec<u8>, Vec<u8>>) -> (String, String) {
        let (out, err) = printer.into_inner();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_empty_vault_prints_headers_only() {
        let lister = SecretLister::new(MockSource::new(vec![]), &Settings::new("kv"));
        let mut printer = SecretPrinter::new(Vec::new(), Vec::new());

        let summary = lister.run(&mut printer).await.unwrap();

        assert_eq!(summary.total, 0);
        assert!(summary.is_success());
        let (out, err) = output_of(printer);
        assert_eq!(
            out,
            "Connecting to Azure Key Vault: kv\n\nListing:\n[...]\nSecrets:\n\n"
        );
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn test_one_show_per_listed_id() {
        let source = MockSource::new(vec!["/v/a/secret1", "/v/a/secret2"]);
        let calls = Arc::clone(&source.calls);
        let lister = SecretLister::new(source, &Settings::new("kv"));
        let mut printer = SecretPrinter::new(Vec::new(), Vec::new());

        lister.run(&mut printer).await.unwrap();

        let mut calls = calls.lock().await.clone();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                ("kv".to_string(), "/v/a/secret1".to_string()),
                ("kv".to_string(), "/v/a/secret2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_blocks_follow_listing_order() {
        // 後面的項目先完成，輸出仍須依列表順序
        let source = MockSource::new(vec!["/s/first", "/s/second", "/s/third"])
            .reply("/s/first", Reply::Value("1", 60))
            .reply("/s/second", Reply::Value("2", 30))
            .reply("/s/third", Reply::Value("3", 0));
        let lister = SecretLister::new(source, &Settings::new("kv"));
        let mut printer = SecretPrinter::new(Vec::new(), Vec::new());

        let summary = lister.run(&mut printer).await.unwrap();

        assert_eq!(summary.shown, 3);
        let (out, _) = output_of(printer);
        let first = out.find("Name  | first").unwrap();
        let second = out.find("Name  | second").unwrap();
        let third = out.find("Name  | third").unwrap();
        assert!(first < second && second < third);
        assert!(out.contains("Name  | second\nValue | 2\n\n"));
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let ids = vec!["/s/a", "/s/b", "/s/c", "/s/d", "/s/e", "/s/f"];
        let mut source = MockSource::new(ids.clone());
        for id in ids {
            source = source.reply(id, Reply::Value("v", 20));
        }
        let peak = Arc::clone(&source.peak);

        let mut settings = Settings::new("kv");
        settings.max_concurrency = 2;
        let lister = SecretLister::new(source, &settings);
        let mut printer = SecretPrinter::new(Vec::new(), Vec::new());

        let summary = lister.run(&mut printer).await.unwrap();

        assert_eq!(summary.shown, 6);
        let peak = peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 2, "peak concurrency was {}", peak);
    }

    #[tokio::test]
    async fn test_listing_failure_issues_no_show() {
        let source = MockSource::failing_listing();
        let calls = Arc::clone(&source.calls);
        let lister = SecretLister::new(source, &Settings::new("kv"));
        let mut printer = SecretPrinter::new(Vec::new(), Vec::new());

        let err = lister.run(&mut printer).await.unwrap_err();

        assert!(matches!(err, SecretsError::CommandFailed { .. }));
        assert!(calls.lock().await.is_empty());
        let (out, _) = output_of(printer);
        assert!(!out.contains("Secrets:"));
    }

    #[tokio::test]
    async fn test_collect_mode_reports_failures_and_continues() {
        let source = MockSource::new(vec!["/s/ok1", "/s/broken", "/s/ok2"])
            .reply("/s/ok1", Reply::Value("one", 0))
            .reply("/s/broken", Reply::Fail(0))
            .reply("/s/ok2", Reply::Value("two", 10));
        let lister = SecretLister::new(source, &Settings::new("kv"));
        let mut printer = SecretPrinter::new(Vec::new(), Vec::new());

        let summary = lister.run(&mut printer).await.unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.shown, 2);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].name, "broken");
        assert_eq!(summary.failed[0].id, "/s/broken");
        assert!(!summary.is_success());

        let (out, err) = output_of(printer);
        assert!(out.contains("Name  | ok1\nValue | one"));
        assert!(out.contains("Name  | ok2\nValue | two"));
        assert_eq!(err, "Failed | broken | Show failed: ERROR: Forbidden\n");
    }

    #[tokio::test]
    async fn test_fail_fast_returns_first_error() {
        let source = MockSource::new(vec!["/s/slow", "/s/broken"])
            .reply("/s/slow", Reply::Value("late", 500))
            .reply("/s/broken", Reply::Fail(0));
        let mut settings = Settings::new("kv");
        settings.fail_fast = true;
        let lister = SecretLister::new(source, &settings);
        let mut printer = SecretPrinter::new(Vec::new(), Vec::new());

        let err = lister.run(&mut printer).await.unwrap_err();

        assert!(matches!(
            err,
            SecretsError::CommandFailed { ref operation, .. } if operation == "Show"
        ));
        let (out, _) = output_of(printer);
        assert!(!out.contains("Value | late"));
    }
}
