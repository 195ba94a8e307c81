use std::path::{Path, PathBuf};

mod matrix;
mod status;
mod switch;
mod terminal;
mod validate;

use anyhow::Context;
use clap::ArgAction;
use inverter_docs::{Config, Registry, Request, Session, StateTable, storage};
use matrix::Matrix;
use status::Status;
use switch::Switch;
use tracing::instrument;
use validate::Validate;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file
    #[arg(short, long, default_value = "invdoc.toml", global = true)]
    config: PathBuf,

    /// Catalog file to load instead of the configured or built-in catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let sources = Sources {
            config: self.config,
            catalog: self.catalog,
        };

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(&sources)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show test counts by category, priority and status (default)
    Status(Status),

    /// Show the test specification matrix
    Matrix(Matrix),

    /// Show the switching states of the T-type phase leg
    Switch(Switch),

    /// Check the switching table, catalog and configuration
    Validate(Validate),
}

impl Command {
    fn run(self, sources: &Sources) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(sources)?,
            Self::Matrix(command) => command.run(sources)?,
            Self::Switch(command) => command.run(sources)?,
            Self::Validate(command) => command.run(sources)?,
        }
        Ok(())
    }
}

/// Where configuration and catalog data come from.
#[derive(Debug)]
struct Sources {
    config: PathBuf,
    catalog: Option<PathBuf>,
}

impl Sources {
    /// Loads the configuration file, falling back to defaults if it does not
    /// exist.
    fn config(&self) -> anyhow::Result<Config> {
        if self.config.exists() {
            Config::load(&self.config).map_err(|e| anyhow::anyhow!(e))
        } else {
            tracing::debug!(path = %self.config.display(), "no configuration file, using defaults");
            Ok(Config::default())
        }
    }

    /// The catalog to load, if not the built-in one.
    ///
    /// The command-line flag wins over the configuration file. A configured
    /// relative path is resolved against the configuration file's directory.
    fn catalog_path(&self, config: &Config) -> Option<PathBuf> {
        self.catalog.clone().or_else(|| {
            config.catalog.as_ref().map(|path| {
                let base = self.config.parent().unwrap_or_else(|| Path::new("."));
                base.join(path)
            })
        })
    }

    fn registry(&self, config: &Config) -> anyhow::Result<Registry> {
        match self.catalog_path(config) {
            Some(path) => storage::load(&path)
                .with_context(|| format!("failed to load catalog {}", path.display())),
            None => storage::builtin::registry().context("built-in catalog is invalid"),
        }
    }

    fn state_table() -> anyhow::Result<StateTable> {
        storage::builtin::state_table().context("built-in switching table is invalid")
    }

    /// Builds a session with the configured initial selection, filter and
    /// collapsed categories applied.
    #[instrument(level = "debug")]
    fn session(&self) -> anyhow::Result<Session> {
        let config = self.config()?;
        let registry = self.registry(&config)?;
        let mut session = Session::new(Self::state_table()?, registry, config.initial_level());

        session
            .apply(Request::ChangeFilter {
                priority: config.priority_filter().to_string(),
                search: String::new(),
            })
            .context("invalid priority filter in configuration")?;

        for key in &config.collapsed {
            session
                .apply(Request::CollapseCategory(key.clone()))
                .with_context(|| format!("cannot collapse category '{key}'"))?;
        }

        Ok(session)
    }
}
