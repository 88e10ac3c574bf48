use std::path::{Path, PathBuf};

use clap::{crate_authors, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use kiln_utils::constants::BUILD_CONFIG_FILE;
use log::error;

pub mod generate;
pub mod validate;

pub trait KilnCommand {
    /// Runs the command and returns a result
    /// of the execution
    ///
    /// # Errors
    /// Can return a `miette` Error
    fn try_run(&mut self) -> miette::Result<()>;

    /// Runs the command and exits if there is an error.
    fn run(&mut self) {
        if let Err(e) = self.try_run() {
            error!("{e:?}");
            std::process::exit(1);
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "kiln",
    about,
    long_about = None,
    author = crate_authors!(),
    version,
)]
pub struct KilnArgs {
    #[command(subcommand)]
    pub command: CommandArgs,

    #[clap(flatten)]
    pub verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, Subcommand)]
pub enum CommandArgs {
    /// Generate a Dockerfile from a build config
    Generate(generate::GenerateCommand),

    /// Check a build config without rendering it
    Validate(validate::ValidateCommand),
}

/// The config file given on the command line, or `./kiln.yml`.
fn config_path(config: Option<&Path>) -> PathBuf {
    config.map_or_else(|| PathBuf::from(BUILD_CONFIG_FILE), Path::to_path_buf)
}
