use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use stockroom_catalog::{timestamp, FilterMode, Product};
use stockroom_core::ListRepository;
use stockroom_inventory::InventoryManager;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "stockroom", about = "Track inventory lists stored as JSON documents")]
pub struct Cli {
    /// List to act on (defaults to the configured default list).
    #[arg(long, global = true)]
    pub list: Option<String>,

    /// Storage directory, overriding `storage.root` from config.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show every list, marking the active one.
    Lists,
    /// Create an empty list (no-op if it exists).
    CreateList { name: String },
    /// Delete a list and its document.
    DeleteList { name: String },
    /// Add a product to the list.
    Add(ProductArgs),
    /// Replace the fields of an existing product.
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Remove a product by id.
    Remove { id: Uuid },
    /// Show products matching a term and perishability filter.
    Search {
        term: Option<String>,
        /// all, perishable or non-perishable
        #[arg(long, default_value_t = FilterMode::All)]
        filter: FilterMode,
    },
}

impl Command {
    /// Commands that manage lists themselves rather than the contents of one
    pub fn targets_lists(&self) -> bool {
        matches!(
            self,
            Command::Lists | Command::CreateList { .. } | Command::DeleteList { .. }
        )
    }
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub category: String,

    #[arg(long, allow_negative_numbers = true)]
    pub quantity: i32,

    /// Unit label (defaults to `inventory.default_unit`).
    #[arg(long)]
    pub unit: Option<String>,

    /// Expiration date, e.g. 2025-01-31.
    #[arg(long, value_parser = parse_expiration)]
    pub expires: Option<DateTime<Utc>>,
}

impl ProductArgs {
    fn into_product(self, default_unit: &str) -> Product {
        let unit = self.unit.unwrap_or_else(|| default_unit.to_string());
        Product::new(self.name, self.category, self.quantity, unit, self.expires)
    }
}

fn parse_expiration(raw: &str) -> Result<DateTime<Utc>, String> {
    timestamp::parse(raw).ok_or_else(|| format!("invalid date: {raw} (expected YYYY-MM-DD)"))
}

pub fn run<R: ListRepository>(
    manager: &mut InventoryManager<R>,
    command: Command,
    default_unit: &str,
) -> anyhow::Result<()> {
    match command {
        Command::Lists => {
            manager.refresh_lists()?;
            for name in manager.list_names() {
                let marker = if name == manager.active_list() { '*' } else { ' ' };
                println!("{marker} {name}");
            }
        }
        Command::CreateList { name } => {
            if manager.create_list(&name)? {
                println!("Created list {name}");
            } else {
                println!("List {name} already exists");
            }
        }
        Command::DeleteList { name } => {
            manager
                .delete_list(&name)
                .with_context(|| format!("Failed to delete list {name}"))?;
            println!("Deleted list {name}; active list is {}", manager.active_list());
        }
        Command::Add(fields) => {
            let id = manager.add(fields.into_product(default_unit))?;
            println!("{id}");
        }
        Command::Update { id, fields } => {
            let edit = fields.into_product(default_unit).with_id(id);
            if !manager.update(&edit)? {
                println!("No product {id} in {}", manager.active_list());
            }
        }
        Command::Remove { id } => {
            if !manager.remove(id)? {
                println!("No product {id} in {}", manager.active_list());
            }
        }
        Command::Search { term, filter } => {
            let hits = manager.search(term.as_deref().unwrap_or_default(), filter);
            print_products(&hits);
        }
    }
    Ok(())
}

fn print_products(products: &[Product]) {
    println!(
        "{:<36}  {:<20} {:<14} {:>8} {:<8} {:<10}  {:<10}  STATUS",
        "ID", "NAME", "CATEGORY", "QTY", "UNIT", "CREATED", "EXPIRES"
    );
    for p in products {
        println!(
            "{:<36}  {:<20} {:<14} {:>8} {:<8} {:<10}  {:<10}  {}",
            p.id(),
            p.name,
            p.category,
            p.quantity,
            p.unit,
            p.created_display(),
            p.expiration_display(),
            p.status().label()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_expiry() {
        let cli = Cli::try_parse_from([
            "stockroom", "--list", "Pantry", "add", "--name", "Milk", "--category", "Dairy",
            "--quantity", "-2", "--expires", "2025-01-31",
        ])
        .unwrap();

        assert_eq!(cli.list.as_deref(), Some("Pantry"));
        let Command::Add(fields) = cli.command else {
            panic!("expected add");
        };
        let product = fields.into_product("pcs");
        assert_eq!(product.quantity, -2);
        assert_eq!(product.unit, "pcs");
        assert_eq!(product.expiration_display(), "2025-01-31");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Cli::try_parse_from([
            "stockroom", "add", "--name", "Milk", "--category", "Dairy", "--quantity", "two",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["stockroom", "search", "--filter", "stale"]).is_err());
        assert!(Cli::try_parse_from(["stockroom", "remove", "not-a-uuid"]).is_err());
    }

    #[test]
    fn test_search_filter_defaults_to_all() {
        let cli = Cli::try_parse_from(["stockroom", "search", "ri"]).unwrap();
        let Command::Search { term, filter } = cli.command else {
            panic!("expected search");
        };
        assert_eq!(term.as_deref(), Some("ri"));
        assert_eq!(filter, FilterMode::All);
    }
}
