use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use timesheets::api::HttpBackend;
use timesheets::config::Config;
use timesheets::logger;
use timesheets::store::selectors;
use timesheets::sync::{FetchOutcome, SyncService};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    if let Some(flag) = args.next() {
        if flag == "--generate-config" {
            let path = match args.next() {
                Some(path) => PathBuf::from(path),
                None => Config::get_default_config_path()?,
            };
            return Config::generate_default_config(path);
        }
        anyhow::bail!("Unknown argument: {flag}\nUsage: timesheets [--generate-config [path]]");
    }

    let config = Config::load()?;
    logger::init(&config.logging)?;

    let backend = HttpBackend::new(&config.api).context("Failed to build HTTP client")?;
    let sync_service = SyncService::new(Arc::new(backend));

    if !config.sync.fetch_on_startup {
        println!("Startup fetch disabled; nothing to do.");
        return Ok(());
    }

    let results = sync_service.preload(&config.sync.preload_kinds()).await;
    for (kind, outcome) in results {
        match outcome {
            FetchOutcome::Loaded(count) => println!("✅ {kind}: {count} loaded"),
            FetchOutcome::Failed(message) => println!("❌ {kind}: {message}"),
            other => println!("⚠️  {kind}: {other:?}"),
        }
    }

    let pending = sync_service
        .read(|state| {
            selectors::select_timesheets(state)
                .items
                .iter()
                .filter(|sheet| sheet.attributes.status == timesheets::entities::TimesheetStatus::Submitted)
                .count()
        })
        .await;
    println!("📋 {pending} timesheet(s) awaiting review");

    Ok(())
}
