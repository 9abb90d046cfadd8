use anyhow::Result;
use dotenvy::dotenv;
use std::env;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;

use telepay::cli::{Cli, Commands};
use telepay::core::config::{self, BotConfig};
use telepay::core::rate_limiter::RateLimiter;
use telepay::core::{init_logger, log_configuration};
use telepay::storage::PaymentStore;
use telepay::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, TelegramNotifier};
use telepay::workflow::notify::broadcast_text;
use telepay::workflow::{import_employees, Keyboard, Notifier, Recipients};

/// Main entry point for the payment request bot
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log panics from handler tasks instead of losing them on stderr
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // .env must be loaded before LOG_FILE_PATH is first read
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::ImportEmployees { dry_run }) => run_import(dry_run),
        Some(Commands::Run) | None => run_bot().await,
    }
}

/// Runs the bot until Ctrl+C
async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    let bot_config = BotConfig::from_env()?;
    log_configuration(&bot_config);

    let store = PaymentStore::open(&config::DATABASE_PATH)?;

    let bot = create_bot(&bot_config)?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(bot.clone()));
    let recipients = Arc::new(Recipients::from_config(&bot_config));
    let rate_limiter = RateLimiter::with_limits(bot_config.rate_limit_max, bot_config.rate_limit_window);
    let deps = HandlerDeps::new(store, Arc::clone(&notifier), Arc::clone(&recipients), rate_limiter);

    let notified = broadcast_text(
        notifier.as_ref(),
        &recipients.admin_ids,
        "🤖 <b>Bot started and ready!</b>",
        Keyboard::AdminMenu,
    )
    .await;
    log::info!("Startup notice delivered to {}/{} admins", notified, recipients.admin_ids.len());

    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Imports EMPLOYEE_IDS into the roster on behalf of the first admin
fn run_import(dry_run: bool) -> Result<()> {
    let user_ids = config::parse_id_list(&env::var("EMPLOYEE_IDS").unwrap_or_default());
    if user_ids.is_empty() {
        log::warn!("EMPLOYEE_IDS is empty, nothing to import");
        return Ok(());
    }

    if dry_run {
        for user_id in &user_ids {
            println!("would import {}", user_id);
        }
        log::info!("Dry run: {} ids would be imported", user_ids.len());
        return Ok(());
    }

    let added_by = env::var("ADMIN_IDS")
        .or_else(|_| env::var("ADMIN_ID"))
        .ok()
        .and_then(|raw| config::parse_id_list(&raw).first().copied())
        .unwrap_or(0);

    let store = PaymentStore::open(&config::DATABASE_PATH)?;
    let report = import_employees(&store, &user_ids, added_by);
    log::info!(
        "Import finished: {} added, {} already active, {} failed ({} active in total)",
        report.added,
        report.skipped,
        report.failed,
        store.active_employee_count()
    );

    if report.failed > 0 {
        anyhow::bail!("{} employees could not be imported", report.failed);
    }
    Ok(())
}
