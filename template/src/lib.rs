pub mod argument;
pub mod instruction;
pub mod port;
pub mod value;

use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use bon::Builder;
use kiln_recipe::{BuildSpec, CopyRule, HealthCheck, RecipeError};
use kiln_utils::constants::DOCKERFILE_NAME;
use log::{debug, trace};
use miette::{Context, IntoDiagnostic};

use crate::{
    argument::{encode, encode_json_tokens, json_array},
    instruction::{HealthCheckOption, Instruction, InstructionWriter, HEALTHCHECK_NONE},
    port::validate_port,
    value::key_values,
};

/// Renders a [`BuildSpec`] into a Dockerfile.
///
/// Instructions are always emitted in this order, each one only
/// when its input is present:
///
/// `FROM`, `MAINTAINER`, `ENV`, `LABEL`, `EXPOSE`, `COPY`,
/// `WORKDIR`, `SHELL`, `RUN`, `VOLUME`, `HEALTHCHECK`, `CMD`,
/// `ENTRYPOINT`, `USER`.
#[derive(Debug, Clone, Copy, Builder)]
pub struct DockerfileTemplate<'a> {
    spec: &'a BuildSpec,
}

impl DockerfileTemplate<'_> {
    /// Renders the Dockerfile.
    ///
    /// All input is validated before anything is rendered, so
    /// an error never leaves a partial Dockerfile behind.
    ///
    /// # Errors
    /// Will error if a port is malformed or an argument has no tokens.
    pub fn render(&self) -> Result<String, RecipeError> {
        trace!("DockerfileTemplate::render()");
        let spec = self.spec;

        for argument in spec.arguments() {
            argument.validate()?;
        }
        let ports = spec
            .ports()
            .iter()
            .map(|port| validate_port(port))
            .collect::<Result<Vec<_>, _>>()?;
        let run_cmds = self.run_cmds();

        let mut out = InstructionWriter::new();

        out.push(Instruction::From, [spec.base_image()]);
        if let Some(maintainer) = spec.maintainer() {
            out.push(Instruction::Maintainer, [maintainer]);
        }
        if !spec.env().is_empty() {
            out.push(Instruction::Env, key_values(spec.env()));
        }
        if !spec.labels().is_empty() {
            out.push(Instruction::Label, key_values(spec.labels()));
        }
        if !ports.is_empty() {
            out.push(Instruction::Expose, ports);
        }

        self.add_copy(&mut out);

        if let Some(workdir) = spec.workdir() {
            out.push(Instruction::Workdir, [workdir]);
        }
        if let Some(shell) = spec.shell() {
            out.push(Instruction::Shell, [encode_json_tokens(shell)]);
        }
        for run in run_cmds.iter() {
            out.push(Instruction::Run, [run]);
        }

        self.add_volumes(&mut out);
        self.add_health_check(&mut out);

        if let Some(cmd) = spec.cmd() {
            out.push(Instruction::Cmd, [encode(cmd)]);
        }
        if let Some(entry_point) = spec.entry_point() {
            out.push(Instruction::Entrypoint, [encode(entry_point)]);
        }
        if let Some(user) = spec.user() {
            out.push(Instruction::User, [user]);
        }

        Ok(out.finish())
    }

    /// Renders the Dockerfile into `dir`, returning the path of the written file.
    ///
    /// # Errors
    /// Will error if rendering fails or the file can't be written.
    pub fn write<P: AsRef<Path>>(&self, dir: P) -> miette::Result<PathBuf> {
        let target = dir.as_ref().join(DOCKERFILE_NAME);
        trace!("DockerfileTemplate::write({})", target.display());

        let content = self.render()?;
        fs::write(&target, content)
            .into_diagnostic()
            .with_context(|| format!("Failed to write {}", target.display()))?;

        debug!("Wrote {}", target.display());
        Ok(target)
    }

    fn run_cmds(&self) -> Cow<'_, [String]> {
        let run_cmds = self.spec.run_cmds();
        if self.spec.optimise() && !run_cmds.is_empty() {
            debug!("Merging {} RUN commands into one layer", run_cmds.len());
            Cow::Owned(vec![run_cmds.join(" && ")])
        } else {
            Cow::Borrowed(run_cmds)
        }
    }

    fn user_for<'b>(&'b self, rule: &'b CopyRule) -> Option<&'b str> {
        rule.user().or_else(|| self.spec.assembly_user())
    }

    fn target_dir_for<'b>(&'b self, rule: &'b CopyRule) -> &'b str {
        match rule.target().unwrap_or_else(|| self.spec.basedir()) {
            "/" => "",
            dir => dir,
        }
    }

    fn add_copy(&self, out: &mut InstructionWriter) {
        for rule in self.spec.copy_rules() {
            let dest = format!("{}/{}", self.target_dir_for(rule), rule.destination());

            let Some(user) = self.user_for(rule) else {
                out.push(Instruction::Copy, [rule.source(), dest.as_str()]);
                continue;
            };

            let parts = user.trim_end_matches(':').split(':').collect::<Vec<_>>();
            // an empty owner or group can't be expressed in --chown
            let chown = match parts.as_slice() {
                [user, ..] if user.is_empty() => None,
                [user, group, ..] if !group.is_empty() => {
                    Some(format!("--chown={user}:{group}"))
                }
                [user, ..] => Some(format!("--chown={user}")),
                [] => None,
            };
            let run_as = parts.get(2).copied().filter(|run_as| !run_as.is_empty());

            if chown.is_none() {
                debug!("No owner in '{user}', copying {} without --chown", rule.source());
            }
            if run_as.is_some() {
                out.push(Instruction::User, ["root"]);
            }
            out.push(
                Instruction::Copy,
                chown
                    .as_deref()
                    .into_iter()
                    .chain([rule.source(), dest.as_str()]),
            );
            if let Some(run_as) = run_as {
                out.push(Instruction::User, [run_as]);
            }
        }
    }

    fn add_volumes(&self, out: &mut InstructionWriter) {
        let spec = self.spec;
        let export_by_default = !spec.has_base_image();

        for rule in spec.copy_rules() {
            if rule.export().unwrap_or(export_by_default) {
                debug!("Exporting target of {} as a volume", rule.source());
                add_volume(out, self.target_dir_for(rule));
            }
        }

        if spec.export_target_dir().unwrap_or(export_by_default) {
            add_volume(out, spec.basedir());
        }

        for volume in spec.volumes() {
            add_volume(out, volume);
        }
    }

    fn add_health_check(&self, out: &mut InstructionWriter) {
        match self.spec.health_check() {
            None => {}
            Some(HealthCheck::None) => {
                out.push(Instruction::Healthcheck, [HEALTHCHECK_NONE]);
            }
            Some(HealthCheck::Cmd(health_check)) => {
                let options = [
                    (HealthCheckOption::Interval, health_check.interval.clone()),
                    (HealthCheckOption::Timeout, health_check.timeout.clone()),
                    (
                        HealthCheckOption::StartPeriod,
                        health_check.start_period.clone(),
                    ),
                    (
                        HealthCheckOption::Retries,
                        health_check.retries.map(|retries| retries.to_string()),
                    ),
                ];

                let args = options
                    .into_iter()
                    .filter_map(|(option, value)| Some(option.flag(value?)))
                    .chain([Instruction::Cmd.inline([encode(&health_check.cmd)])]);

                out.push(Instruction::Healthcheck, args);
            }
        }
    }
}

/// Declares `volume` with trailing slashes removed. The root is never exported.
fn add_volume(out: &mut InstructionWriter, volume: &str) {
    let volume = volume.trim_end_matches('/');
    if volume.is_empty() {
        trace!("Skipping root volume");
        return;
    }
    out.push(Instruction::Volume, [json_array([volume])]);
}
