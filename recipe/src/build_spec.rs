use std::sync::LazyLock;

use indexmap::IndexMap;
use kiln_utils::constants::{DEFAULT_BASEDIR, DEFAULT_BASE_IMAGE};
use log::{trace, warn};
use regex::Regex;

use crate::{Argument, CopyRule, HealthCheck, RecipeError};

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$(\{[a-zA-Z0-9_]+\}|[a-zA-Z0-9_]+).*").expect("Should be a valid regex")
});

/// Everything needed to render a Dockerfile.
///
/// A `BuildSpec` is immutable once built. Use [`BuildSpec::builder`]
/// to accumulate the configuration; validation of the base directory
/// and the environment happens while accumulating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    base_image: Option<String>,
    maintainer: Option<String>,
    workdir: Option<String>,
    basedir: String,
    entry_point: Option<Argument>,
    cmd: Option<Argument>,
    export_target_dir: Option<bool>,
    assembly_user: Option<String>,
    user: Option<String>,
    health_check: Option<HealthCheck>,
    copy_rules: Vec<CopyRule>,
    ports: Vec<String>,
    shell: Option<Argument>,
    run_cmds: Vec<String>,
    env: IndexMap<String, String>,
    labels: IndexMap<String, String>,
    volumes: Vec<String>,
    optimise: bool,
}

impl Default for BuildSpec {
    fn default() -> Self {
        Self {
            base_image: None,
            maintainer: None,
            workdir: None,
            basedir: DEFAULT_BASEDIR.to_string(),
            entry_point: None,
            cmd: None,
            export_target_dir: None,
            assembly_user: None,
            user: None,
            health_check: None,
            copy_rules: Vec::new(),
            ports: Vec::new(),
            shell: None,
            run_cmds: Vec::new(),
            env: IndexMap::new(),
            labels: IndexMap::new(),
            volumes: Vec::new(),
            optimise: false,
        }
    }
}

impl BuildSpec {
    #[must_use]
    pub fn builder() -> BuildSpecBuilder {
        BuildSpecBuilder::default()
    }

    /// The configured base image, or `busybox:latest` when none was set.
    #[must_use]
    pub fn base_image(&self) -> &str {
        self.base_image.as_deref().unwrap_or(DEFAULT_BASE_IMAGE)
    }

    /// Whether a base image was configured explicitly.
    ///
    /// Without one the image is treated as a data image and
    /// target directories are exported as volumes by default.
    #[must_use]
    pub const fn has_base_image(&self) -> bool {
        self.base_image.is_some()
    }

    #[must_use]
    pub fn maintainer(&self) -> Option<&str> {
        self.maintainer.as_deref()
    }

    #[must_use]
    pub fn workdir(&self) -> Option<&str> {
        self.workdir.as_deref()
    }

    #[must_use]
    pub fn basedir(&self) -> &str {
        &self.basedir
    }

    #[must_use]
    pub const fn entry_point(&self) -> Option<&Argument> {
        self.entry_point.as_ref()
    }

    #[must_use]
    pub const fn cmd(&self) -> Option<&Argument> {
        self.cmd.as_ref()
    }

    #[must_use]
    pub const fn export_target_dir(&self) -> Option<bool> {
        self.export_target_dir
    }

    #[must_use]
    pub fn assembly_user(&self) -> Option<&str> {
        self.assembly_user.as_deref()
    }

    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    #[must_use]
    pub const fn health_check(&self) -> Option<&HealthCheck> {
        self.health_check.as_ref()
    }

    #[must_use]
    pub fn copy_rules(&self) -> &[CopyRule] {
        &self.copy_rules
    }

    #[must_use]
    pub fn ports(&self) -> &[String] {
        &self.ports
    }

    #[must_use]
    pub const fn shell(&self) -> Option<&Argument> {
        self.shell.as_ref()
    }

    #[must_use]
    pub fn run_cmds(&self) -> &[String] {
        &self.run_cmds
    }

    #[must_use]
    pub const fn env(&self) -> &IndexMap<String, String> {
        &self.env
    }

    #[must_use]
    pub const fn labels(&self) -> &IndexMap<String, String> {
        &self.labels
    }

    #[must_use]
    pub fn volumes(&self) -> &[String] {
        &self.volumes
    }

    #[must_use]
    pub const fn optimise(&self) -> bool {
        self.optimise
    }

    /// Every argument carried by the spec, for up-front validation.
    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        let health_cmd = match self.health_check.as_ref() {
            Some(HealthCheck::Cmd(command)) => Some(&command.cmd),
            Some(HealthCheck::None) | None => None,
        };

        self.cmd
            .iter()
            .chain(self.entry_point.iter())
            .chain(self.shell.iter())
            .chain(health_cmd)
    }
}

/// Accumulates a [`BuildSpec`].
///
/// ```
/// use kiln_recipe::{Argument, BuildSpec};
///
/// let spec = BuildSpec::builder()
///     .base_image("eclipse-temurin:21")
///     .basedir("/opt/app")?
///     .add("maven", "lib")
///     .env([("JAVA_OPTS", "-Xmx512m")])?
///     .cmd(Argument::exec(["java", "-jar", "/opt/app/lib/app.jar"]))
///     .build();
///
/// assert_eq!("/opt/app", spec.basedir());
/// # Ok::<(), kiln_recipe::RecipeError>(())
/// ```
#[derive(Debug, Default, Clone)]
#[must_use]
pub struct BuildSpecBuilder {
    spec: BuildSpec,
}

impl BuildSpecBuilder {
    pub fn base_image<S: Into<String>>(mut self, base_image: S) -> Self {
        self.spec.base_image = Some(base_image.into());
        self
    }

    pub fn maintainer<S: Into<String>>(mut self, maintainer: S) -> Self {
        self.spec.maintainer = Some(maintainer.into());
        self
    }

    pub fn workdir<S: Into<String>>(mut self, workdir: S) -> Self {
        self.spec.workdir = Some(workdir.into());
        self
    }

    /// Sets the directory copy rules land in unless they carry their own target.
    ///
    /// # Errors
    /// Will error if the directory is neither absolute nor starts
    /// with an environment variable such as `$HOME` or `${HOME}`.
    pub fn basedir<S: Into<String>>(mut self, basedir: S) -> Result<Self, RecipeError> {
        let basedir = basedir.into();
        trace!("BuildSpecBuilder::basedir({basedir})");

        if !basedir.starts_with('/') && !ENV_VAR_PATTERN.is_match(&basedir) {
            return Err(RecipeError::MalformedBasedir(basedir));
        }
        self.spec.basedir = basedir;
        Ok(self)
    }

    pub fn cmd(mut self, cmd: Argument) -> Self {
        self.spec.cmd = Some(cmd);
        self
    }

    pub fn entry_point(mut self, entry_point: Argument) -> Self {
        self.spec.entry_point = Some(entry_point);
        self
    }

    /// The user that owns copied files when a rule has no user of its own.
    ///
    /// A third `:` separated component (`user:group:run-as`) switches
    /// to `run-as` after each copy.
    pub fn assembly_user<S: Into<String>>(mut self, assembly_user: S) -> Self {
        self.spec.assembly_user = Some(assembly_user.into());
        self
    }

    pub fn user<S: Into<String>>(mut self, user: S) -> Self {
        self.spec.user = Some(user.into());
        self
    }

    pub fn health_check(mut self, health_check: HealthCheck) -> Self {
        self.spec.health_check = Some(health_check);
        self
    }

    pub fn add<S, D>(self, source: S, destination: D) -> Self
    where
        S: Into<String>,
        D: Into<String>,
    {
        self.add_rule(
            CopyRule::builder()
                .source(source)
                .destination(destination)
                .build(),
        )
    }

    pub fn add_rule(mut self, rule: CopyRule) -> Self {
        self.spec.copy_rules.push(rule);
        self
    }

    pub fn expose<I, S>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.ports.extend(ports.into_iter().map(Into::into));
        self
    }

    pub fn shell(mut self, shell: Argument) -> Self {
        self.spec.shell = Some(shell);
        self
    }

    /// Appends `RUN` commands. Blank commands are dropped.
    pub fn run<I, S>(mut self, run_cmds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.run_cmds.extend(
            run_cmds
                .into_iter()
                .map(Into::into)
                .filter(|cmd| !cmd.trim().is_empty()),
        );
        self
    }

    pub fn export_target_dir(mut self, export_target_dir: bool) -> Self {
        self.spec.export_target_dir = Some(export_target_dir);
        self
    }

    /// Merges entries into the environment.
    ///
    /// # Errors
    /// Will error if any value is empty.
    pub fn env<I, K, V>(mut self, env: I) -> Result<Self, RecipeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.spec
            .env
            .extend(env.into_iter().map(|(k, v)| (k.into(), v.into())));

        if let Some((key, _)) = self.spec.env.iter().find(|(_, value)| value.is_empty()) {
            return Err(RecipeError::EmptyEnvValue(key.clone()));
        }
        Ok(self)
    }

    pub fn labels<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.spec
            .labels
            .extend(labels.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn volumes<I, S>(mut self, volumes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.volumes.extend(volumes.into_iter().map(Into::into));
        self
    }

    /// Collapse all `RUN` commands into a single layer.
    pub fn optimise(mut self) -> Self {
        self.spec.optimise = true;
        self
    }

    pub fn build(self) -> BuildSpec {
        if self.spec.copy_rules.is_empty() && self.spec.base_image.is_none() {
            warn!("Neither a base image nor copy rules are configured");
        }
        self.spec
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/")]
    #[case("/maven")]
    #[case("$HOME")]
    #[case("${APP_HOME}/lib")]
    #[case("$JBOSS_HOME/standalone")]
    fn valid_basedir(#[case] basedir: &str) {
        let spec = BuildSpec::builder().basedir(basedir).unwrap().build();
        assert_eq!(basedir, spec.basedir());
    }

    #[rstest]
    #[case("maven")]
    #[case("./maven")]
    #[case("$")]
    #[case("${}")]
    #[case("${APP-HOME}")]
    fn malformed_basedir(#[case] basedir: &str) {
        assert_eq!(
            RecipeError::MalformedBasedir(basedir.into()),
            BuildSpec::builder().basedir(basedir).unwrap_err()
        );
    }

    #[test]
    fn default_basedir_and_image() {
        let spec = BuildSpec::builder().build();
        assert_eq!(DEFAULT_BASEDIR, spec.basedir());
        assert_eq!(DEFAULT_BASE_IMAGE, spec.base_image());
        assert!(!spec.has_base_image());
    }

    #[test]
    fn empty_env_value() {
        let err = BuildSpec::builder()
            .env([("FOO", "bar"), ("EMPTY", "")])
            .unwrap_err();
        assert_eq!(RecipeError::EmptyEnvValue("EMPTY".into()), err);
    }

    #[test]
    fn env_merges_in_order() {
        let spec = BuildSpec::builder()
            .env([("B", "1"), ("A", "2")])
            .unwrap()
            .env([("B", "3")])
            .unwrap()
            .build();

        assert_eq!(
            vec![("B", "3"), ("A", "2")],
            spec.env()
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn blank_run_commands_are_dropped() {
        let spec = BuildSpec::builder()
            .run(["echo a", "", "   ", "echo b"])
            .build();
        assert_eq!(vec!["echo a".to_string(), "echo b".to_string()], spec.run_cmds());
    }

    #[test]
    fn arguments_include_health_check() {
        let spec = BuildSpec::builder()
            .cmd(Argument::shell("run"))
            .health_check(HealthCheck::Cmd(
                crate::HealthCheckCommand::builder()
                    .cmd(Argument::exec(["probe"]))
                    .build(),
            ))
            .build();

        assert_eq!(
            vec![&Argument::shell("run"), &Argument::exec(["probe"])],
            spec.arguments().collect::<Vec<_>>()
        );
    }
}
