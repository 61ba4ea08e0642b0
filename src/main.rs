use clap::Parser;
use customer_lookup::config::toml_config::TomlConfig;
use customer_lookup::utils::error::{ErrorSeverity, LookupError};
use customer_lookup::utils::{logger, validation::Validate};
use customer_lookup::{CliConfig, ConfigProvider, LookupServer};

#[tokio::main]
async fn main() {
    let args = CliConfig::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting customer-lookup");
    if args.verbose {
        tracing::debug!("CLI config: {:?}", args);
    }

    let result = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => run(&config, args.check).await,
                Err(e) => Err(e),
            }
        }
        None => run(&args, args.check).await,
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ customer-lookup failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run<C>(config: &C, check_only: bool) -> Result<(), LookupError>
where
    C: ConfigProvider + Validate,
{
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(config);

    let server = LookupServer::from_config(config).await?;

    if check_only {
        let snapshot = server.service().store().current();
        println!("✅ {} is valid", snapshot.source());
        println!("  Rows: {}", snapshot.len());
        println!("  Phone numbers indexed: {}", snapshot.indexed_phones());
        println!("  Duplicate phone numbers: {}", snapshot.duplicate_phones());
        return Ok(());
    }

    server.run().await
}

fn display_config_summary(config: &dyn ConfigProvider) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("  Data file: {} (delimiter '{}')", config.csv_path(), config.delimiter());
    tracing::info!("  Bind address: {}", config.bind_addr());
    tracing::info!("  Default fields: {}", config.default_fields().join(", "));
    tracing::info!("  CORS: {}", if config.cors_enabled() { "any origin" } else { "disabled" });
    match config.reload_interval() {
        Some(every) => tracing::info!("  Reload every: {:?}", every),
        None => tracing::info!("  Reload: startup only"),
    }
}
