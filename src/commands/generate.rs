use std::path::PathBuf;

use bon::Builder;
use clap::Args;
use kiln_recipe::BuildConfig;
use kiln_template::DockerfileTemplate;
use log::{debug, info, trace};

use super::{config_path, KilnCommand};

#[derive(Debug, Clone, Args, Builder)]
pub struct GenerateCommand {
    /// The build config to render.
    ///
    /// Defaults to `kiln.yml` in the current directory.
    #[arg()]
    #[builder(into)]
    config: Option<PathBuf>,

    /// Directory to write the Dockerfile into instead of STDOUT
    #[arg(short, long)]
    #[builder(into)]
    output_dir: Option<PathBuf>,
}

impl KilnCommand for GenerateCommand {
    fn try_run(&mut self) -> miette::Result<()> {
        trace!("GenerateCommand::try_run()");

        let config_path = config_path(self.config.as_deref());
        info!("Generating Dockerfile for {}", config_path.display());

        let config = BuildConfig::parse(&config_path)?;
        trace!("config: {config:#?}");

        let spec = config.to_spec()?;
        let template = DockerfileTemplate::builder().spec(&spec).build();

        if let Some(output_dir) = self.output_dir.as_ref() {
            let path = template.write(output_dir)?;
            info!("Wrote {}", path.display());
        } else {
            debug!("Rendering to stdout");
            print!("{}", template.render()?);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn writes_dockerfile() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("kiln.yml");
        fs::write(&config, "from: alpine\nrun:\n- apk add curl\n").unwrap();

        GenerateCommand::builder()
            .config(config)
            .output_dir(dir.path())
            .build()
            .try_run()
            .unwrap();

        assert_eq!(
            "FROM alpine\nRUN apk add curl\n",
            fs::read_to_string(dir.path().join("Dockerfile")).unwrap()
        );
    }

    #[test]
    fn missing_config() {
        let dir = tempfile::tempdir().unwrap();

        let result = GenerateCommand::builder()
            .config(dir.path().join("missing.yml"))
            .output_dir(dir.path())
            .build()
            .try_run();

        assert!(result.is_err());
        assert!(!dir.path().join("Dockerfile").exists());
    }
}
