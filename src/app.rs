use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;
use crate::search::SearchEngine;
use crate::storage::FacultyStore;

pub struct AppContext {
    pub config_path: Option<PathBuf>,
    pub config: Config,
    pub engine: SearchEngine,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let project_root = std::env::current_dir()?;
        let config = Config::load(cli.config.as_deref(), &project_root)?;
        Ok(Self::new(
            cli.config.clone(),
            config,
            cli.output_format(),
            cli.verbose,
        ))
    }

    pub fn new(
        config_path: Option<PathBuf>,
        config: Config,
        output_format: OutputFormat,
        verbosity: u8,
    ) -> Self {
        let engine = SearchEngine::from_config(&config);
        Self {
            config_path,
            config,
            engine,
            output_format,
            verbosity,
        }
    }

    /// Open the faculty store named by the configuration.
    pub fn open_store(&self) -> Result<FacultyStore> {
        FacultyStore::open_configured(&self.config.store)
    }

    pub const fn is_json(&self) -> bool {
        self.output_format.is_machine_readable()
    }
}
