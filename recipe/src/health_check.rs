use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{Argument, RecipeError};

/// The `HEALTHCHECK` instruction of an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HealthCheckConfig", into = "HealthCheckConfig")]
pub enum HealthCheck {
    /// Probe the container with a command.
    Cmd(HealthCheckCommand),

    /// Disable any health check inherited from the base image.
    None,
}

/// Probe settings for [`HealthCheck::Cmd`].
///
/// Each timing value is passed through as written, e.g. `30s` or `1m30s`.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct HealthCheckCommand {
    #[builder(into)]
    pub interval: Option<String>,

    #[builder(into)]
    pub timeout: Option<String>,

    #[builder(into)]
    pub start_period: Option<String>,

    pub retries: Option<u32>,

    pub cmd: Argument,
}

/// The raw `healthcheck:` section of a config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HealthCheckConfig {
    /// Either `cmd` or `none`. Defaults to `cmd`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_period: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Argument>,
}

impl TryFrom<HealthCheckConfig> for HealthCheck {
    type Error = RecipeError;

    fn try_from(value: HealthCheckConfig) -> Result<Self, Self::Error> {
        let HealthCheckConfig {
            mode,
            interval,
            timeout,
            start_period,
            retries,
            cmd,
        } = value;

        match mode.as_deref().unwrap_or("cmd") {
            "cmd" => {
                let cmd = cmd.ok_or(RecipeError::HealthCheckMissingCmd)?;
                cmd.validate()?;
                Ok(Self::Cmd(HealthCheckCommand {
                    interval,
                    timeout,
                    start_period,
                    retries,
                    cmd,
                }))
            }
            "none" => {
                if interval.is_some()
                    || timeout.is_some()
                    || start_period.is_some()
                    || retries.is_some()
                    || cmd.is_some()
                {
                    return Err(RecipeError::HealthCheckNoneWithOptions);
                }
                Ok(Self::None)
            }
            other => Err(RecipeError::UnsupportedHealthCheckMode(other.to_string())),
        }
    }
}

impl From<HealthCheck> for HealthCheckConfig {
    fn from(value: HealthCheck) -> Self {
        match value {
            HealthCheck::None => Self {
                mode: Some("none".into()),
                ..Self::default()
            },
            HealthCheck::Cmd(HealthCheckCommand {
                interval,
                timeout,
                start_period,
                retries,
                cmd,
            }) => Self {
                mode: Some("cmd".into()),
                interval,
                timeout,
                start_period,
                retries,
                cmd: Some(cmd),
            },
        }
    }
}
