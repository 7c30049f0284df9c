mod cli;

use anyhow::Context;
use clap::Parser;
use stockroom_inventory::InventoryManager;
use stockroom_store::{app_config::Config, JsonListStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockroom=info,stockroom_store=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load config")?;

    let root = cli.data_dir.clone().unwrap_or_else(|| config.storage.root.clone());
    tracing::debug!(
        root = %root.display(),
        strict = config.storage.strict_reads,
        "Opening storage"
    );

    let store = JsonListStore::open(&root)
        .with_context(|| format!("Failed to open storage at {}", root.display()))?;

    let default_list = &config.inventory.default_list;
    let mut manager = if config.storage.strict_reads {
        InventoryManager::open_strict(store, default_list)?
    } else {
        InventoryManager::open(store, default_list)?
    };

    if let Some(list) = cli.list.as_deref() {
        if !cli.command.targets_lists() {
            manager
                .switch_list(list)
                .with_context(|| format!("Cannot use list {list}"))?;
        }
    }

    cli::run(&mut manager, cli.command, &config.inventory.default_unit)
}
