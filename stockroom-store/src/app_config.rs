use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub inventory: InventoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding one document per list
    pub root: PathBuf,
    /// Surface corrupt documents as errors instead of reading them as empty
    #[serde(default)]
    pub strict_reads: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    /// List created and activated when storage holds no lists yet
    pub default_list: String,
    pub default_unit: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("config"))
    }

    pub fn load_from(dir: &Path) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .set_default("storage.root", "data")?
            .set_default("storage.strict_reads", false)?
            .set_default("inventory.default_list", "Default")?
            .set_default("inventory.default_unit", stockroom_catalog::DEFAULT_UNIT)?
            // Every file is optional; the built-in defaults above are enough to run
            .add_source(config::File::from(dir.join("default")).required(false))
            .add_source(config::File::from(dir.join(&run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::from(dir.join("local")).required(false))
            // Eg.. `STOCKROOM_STORAGE__ROOT=/var/lib/stockroom`
            .add_source(
                config::Environment::with_prefix("STOCKROOM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
