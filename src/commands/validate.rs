use std::path::PathBuf;

use bon::Builder;
use clap::Args;
use colored::Colorize;
use kiln_recipe::BuildConfig;
use kiln_template::DockerfileTemplate;
use log::{info, trace};

use super::{config_path, KilnCommand};

#[derive(Debug, Clone, Args, Builder)]
pub struct ValidateCommand {
    /// The build config to check.
    ///
    /// Defaults to `kiln.yml` in the current directory.
    #[arg()]
    #[builder(into)]
    config: Option<PathBuf>,
}

impl KilnCommand for ValidateCommand {
    fn try_run(&mut self) -> miette::Result<()> {
        trace!("ValidateCommand::try_run()");

        let config_path = config_path(self.config.as_deref());
        let config = BuildConfig::parse(&config_path)?;

        let api_version = config.validate()?;

        // Ports are only checked while rendering
        let spec = config.to_spec()?;
        DockerfileTemplate::builder().spec(&spec).build().render()?;

        info!(
            "{} {}",
            config_path.display().to_string().bold(),
            "is valid".green()
        );
        if let Some(api_version) = api_version {
            info!("Requires build engine API version {api_version} or newer");
        }

        Ok(())
    }
}
