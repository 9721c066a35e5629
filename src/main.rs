//! PlaysTV Recovery - CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use playstv_recovery::{
    archive::WaybackClient,
    cli::Args,
    config::{parse_account, validate_config, Config},
    download::{recover_account, RecoveryStats},
    error::{exit_codes, Error, Result},
    fs::get_account_folder,
    output::{
        print_banner, print_error, print_info, print_recovery_stats, print_run_summary,
        print_success, print_warning,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        tracing::debug!(
            "Configuration file not found: {}, using defaults",
            config_path.display()
        );
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);
    let account = parse_account(config.account()?)?;
    config.account = Some(account.clone());

    validate_config(&config)?;

    let account_folder = get_account_folder(&config, &account)?;
    print_run_summary(
        &account,
        &account_folder.display().to_string(),
        &config.options.existing_files.to_string(),
        config.options.concurrency,
    );

    let client = WaybackClient::new(&config.archive, config.options.requests_per_second)?;

    print_info(&format!("Looking up archived snapshots for {}...", account));
    let mut stats = RecoveryStats::new(&account);
    recover_account(Arc::new(client), &config, &mut stats).await?;

    print_recovery_stats(&stats);

    if stats.recovered() == 0 {
        return Err(Error::NoVideos(account));
    }

    if stats.failed > 0 {
        print_warning(&format!(
            "{} video(s) could not be recovered, rerun to retry them",
            stats.failed
        ));
    }

    print_success(&format!(
        "{} video(s) saved to {}",
        stats.recovered(),
        account_folder.display()
    ));

    Ok(())
}
