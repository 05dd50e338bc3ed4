//! Process configuration.
//!
//! Everything comes from the environment (a `.env` file is loaded by the
//! binary at startup via `dotenvy`), with working defaults for a local run.

use std::env;
use std::path::PathBuf;

/// Runtime configuration for the pipeline and the HTTP server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the three source CSV files.
    pub data_dir: PathBuf,
    /// Assets dataset file name.
    pub assets_file: String,
    /// Entities dataset file name.
    pub entities_file: String,
    /// Entity/asset join dataset file name.
    pub join_file: String,
    /// Target collection for the flat output records.
    pub collection: String,
    /// HTTP server port.
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("dataset"),
            assets_file: "assets.csv".to_string(),
            entities_file: "entities.csv".to_string(),
            join_file: "assets_entities_join.csv".to_string(),
            collection: "cherry_assets".to_string(),
            port: 3000,
        }
    }
}

impl Config {
    /// Build a configuration from the environment, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Self {
            data_dir: env::var("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            assets_file: env::var("ASSETS_FILE").unwrap_or(defaults.assets_file),
            entities_file: env::var("ENTITIES_FILE").unwrap_or(defaults.entities_file),
            join_file: env::var("JOIN_FILE").unwrap_or(defaults.join_file),
            collection: env::var("COLLECTION_NAME").unwrap_or(defaults.collection),
            port: env::var("PORT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    pub fn assets_path(&self) -> PathBuf {
        self.data_dir.join(&self.assets_file)
    }

    pub fn entities_path(&self) -> PathBuf {
        self.data_dir.join(&self.entities_file)
    }

    pub fn join_path(&self) -> PathBuf {
        self.data_dir.join(&self.join_file)
    }
}
