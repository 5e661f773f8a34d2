use az_list_secrets::utils::{logger, validation::Validate};
use az_list_secrets::{AzCliClient, CliConfig, SecretLister, SecretPrinter, SecretsError, Settings};
use clap::Parser;

fn exit_with(error: &SecretsError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        error,
        error.category(),
        error.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", error.recovery_suggestion());

    eprintln!("❌ {}", error.user_friendly_message());
    eprintln!("💡 {}", error.recovery_suggestion());
    std::process::exit(error.exit_code());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting az-list-secrets");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 合併並驗證設定
    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }
    tracing::debug!("Resolved settings: {:?}", settings);

    let source = AzCliClient::from_config(&settings);
    let lister = SecretLister::new(source, &settings);
    let mut printer = SecretPrinter::stdio();

    match lister.run(&mut printer).await {
        Ok(summary) if summary.is_success() => {
            tracing::info!(
                "✅ Shown {} of {} secrets in {:?}",
                summary.shown,
                summary.total,
                summary.elapsed
            );
        }
        Ok(summary) => {
            for failure in &summary.failed {
                tracing::debug!("Failed secret: {} ({})", failure.name, failure.id);
            }
            exit_with(&SecretsError::PartialFailure {
                failed: summary.failed.len(),
                total: summary.total,
            });
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}
