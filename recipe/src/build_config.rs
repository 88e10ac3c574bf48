use std::{collections::HashSet, fs, path::Path};

use bon::Builder;
use indexmap::IndexMap;
use kiln_utils::constants::{
    API_VERSION_BUILD_ARGS, API_VERSION_CACHE_FROM, API_VERSION_HEALTHCHECK,
};
use log::{debug, trace, warn};
use miette::{Context, IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};

use crate::{Argument, BuildSpec, CopyRule, HealthCheck, RecipeError};

/// An entry of the `copy:` list.
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
pub struct CopyConfig {
    #[builder(into)]
    pub source: String,

    #[serde(default)]
    #[builder(into, default)]
    pub destination: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<bool>,
}

/// A named bundle of build context content copied as one unit.
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
pub struct AssemblyConfig {
    /// The directory name of the assembly in the build context.
    ///
    /// Defaults to `maven`.
    #[serde(default = "AssemblyConfig::default_name")]
    #[builder(into, default = AssemblyConfig::default_name())]
    pub name: String,

    /// Where the assembly lands in the image.
    ///
    /// Defaults to `/<name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub target_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_target_dir: Option<bool>,
}

impl AssemblyConfig {
    fn default_name() -> String {
        "maven".into()
    }

    #[must_use]
    pub fn target_dir(&self) -> String {
        self.target_dir
            .clone()
            .unwrap_or_else(|| format!("/{}", self.name))
    }
}

/// The build configuration file.
///
/// ```yaml
/// from: eclipse-temurin:21-jre
/// maintainer: ops@example.com
/// env:
///   JAVA_OPTS: -Xmx512m
/// ports:
/// - 8080
/// - 8443/tcp
/// assemblies:
/// - name: app
///   target-dir: /opt/app
///   user: app:app:app
/// healthcheck:
///   interval: 30s
///   cmd: curl -f http://localhost:8080/health
/// cmd:
///   exec: [java, -jar, /opt/app/app.jar]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
pub struct BuildConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub from: Option<String>,

    /// Extended base image reference. Only `name` is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_ext: Option<IndexMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub maintainer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub workdir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<Argument>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Argument>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Argument>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub run: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub ports: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub volumes: Vec<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub env: IndexMap<String, Option<String>>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    #[builder(default)]
    pub labels: IndexMap<String, Option<String>>,

    #[serde(default)]
    #[builder(default)]
    pub optimise: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<HealthCheck>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub copy: Vec<CopyConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub assemblies: Vec<AssemblyConfig>,

    /// Build args handed to the build engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<IndexMap<String, String>>,

    /// Images the build engine may use as a layer cache.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub cache_from: Vec<String>,
}

impl BuildConfig {
    /// Parse a build config file.
    ///
    /// # Errors
    /// Errors when the file cannot be read or deserialized.
    pub fn parse<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        trace!("BuildConfig::parse({})", path.display());

        let file = fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("Failed to read {}", path.display()))?;

        debug!("Build config contents: {file}");

        serde_yaml::from_str(&file)
            .into_diagnostic()
            .with_context(|| format!("Failed to deserialize {}", path.display()))
    }

    /// The base image, falling back to the `name` of `from-ext`.
    #[must_use]
    pub fn base_image(&self) -> Option<&str> {
        self.from.as_deref().or_else(|| {
            self.from_ext
                .as_ref()
                .and_then(|ext| ext.get("name"))
                .map(String::as_str)
        })
    }

    /// Validates the config and returns the minimal build engine
    /// API version it requires, if any.
    ///
    /// # Errors
    /// Will error if two assemblies share a name or an argument is malformed.
    pub fn validate(&self) -> Result<Option<&'static str>, RecipeError> {
        trace!("BuildConfig::validate()");

        let mut names = HashSet::new();
        for assembly in &self.assemblies {
            if !names.insert(assembly.name.as_str()) {
                return Err(RecipeError::DuplicateAssemblyName(assembly.name.clone()));
            }
        }

        for argument in [&self.cmd, &self.entrypoint, &self.shell]
            .into_iter()
            .flatten()
        {
            argument.validate()?;
        }

        Ok(if !self.cache_from.is_empty() {
            Some(API_VERSION_CACHE_FROM)
        } else if self.healthcheck.is_some() {
            Some(API_VERSION_HEALTHCHECK)
        } else if self.args.is_some() {
            Some(API_VERSION_BUILD_ARGS)
        } else {
            None
        })
    }

    /// Converts the config into a [`BuildSpec`] ready for rendering.
    ///
    /// # Errors
    /// Will error if the config fails validation, an assembly target
    /// is not a valid base directory, or an environment value is empty.
    pub fn to_spec(&self) -> Result<BuildSpec, RecipeError> {
        trace!("BuildConfig::to_spec()");
        self.validate()?;

        let mut builder = BuildSpec::builder();

        if let Some(base_image) = self.base_image() {
            builder = builder.base_image(base_image);
        }
        if let Some(maintainer) = &self.maintainer {
            builder = builder.maintainer(maintainer);
        }
        if let Some(workdir) = &self.workdir {
            builder = builder.workdir(workdir);
        }
        if let Some(user) = &self.user {
            builder = builder.user(user);
        }
        if let Some(shell) = &self.shell {
            builder = builder.shell(shell.clone());
        }
        if let Some(cmd) = &self.cmd {
            builder = builder.cmd(cmd.clone());
        }
        if let Some(entrypoint) = &self.entrypoint {
            builder = builder.entry_point(entrypoint.clone());
        }
        if let Some(healthcheck) = &self.healthcheck {
            builder = builder.health_check(healthcheck.clone());
        }
        if self.optimise {
            builder = builder.optimise();
        }

        if let Some(first) = self.assemblies.first() {
            builder = builder.basedir(first.target_dir())?.export_target_dir(false);
            if let Some(user) = &first.user {
                builder = builder.assembly_user(user);
            }
        }
        for assembly in &self.assemblies {
            builder = builder.add_rule(
                CopyRule::builder()
                    .source(&assembly.name)
                    .destination("")
                    .target(assembly.target_dir())
                    .maybe_user(assembly.user.as_deref())
                    .maybe_export(assembly.export_target_dir)
                    .build(),
            );
        }
        for copy in &self.copy {
            builder = builder.add_rule(
                CopyRule::builder()
                    .source(&copy.source)
                    .destination(&copy.destination)
                    .maybe_target(copy.target.as_deref())
                    .maybe_user(copy.user.as_deref())
                    .maybe_export(copy.export)
                    .build(),
            );
        }

        let env = self
            .env
            .iter()
            .map(|(key, value)| {
                (
                    key.as_str(),
                    value.clone().unwrap_or_default(),
                )
            })
            .collect::<Vec<_>>();

        let labels = self.labels.iter().map(|(key, value)| {
            (
                key.as_str(),
                value.clone().unwrap_or_default(),
            )
        });

        let ports = non_blank(self.ports.iter().cloned());
        let volumes = non_blank(self.volumes.iter().cloned());

        if self.args.is_some() {
            warn!("Build args are passed to the build engine and are not part of the Dockerfile");
        }

        Ok(builder
            .env(env)?
            .labels(labels)
            .expose(ports)
            .volumes(volumes)
            .run(self.run.iter().map(|cmd| cmd.trim()))
            .build())
    }
}

fn non_blank<I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    entries
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    const CONFIG: &str = r"
from: eclipse-temurin:21-jre
maintainer: ops@example.com
workdir: /opt/app
ports:
- 8080
- ' '
- 8443/TCP
volumes:
- /data
- ''
env:
  JAVA_OPTS: -Xmx512m
  PORT: 8080
labels:
  version: ''
  empty:
assemblies:
- name: app
  target-dir: /opt/app
  user: app:app:app
copy:
- source: conf
  destination: /etc/app
  export: true
healthcheck:
  retries: 3
  cmd:
    exec: [curl, -f, localhost]
cmd: java -jar app.jar
";

    #[test]
    fn parse_config() {
        let config: BuildConfig = serde_yaml::from_str(CONFIG).unwrap();
        let spec = config.to_spec().unwrap();

        assert_eq!("eclipse-temurin:21-jre", spec.base_image());
        assert_eq!(Some("ops@example.com"), spec.maintainer());
        assert_eq!("/opt/app", spec.basedir());
        assert_eq!(Some("app:app:app"), spec.assembly_user());
        assert_eq!(Some(false), spec.export_target_dir());
        assert_eq!(
            vec!["8080".to_string(), "8443/TCP".to_string()],
            spec.ports()
        );
        assert_eq!(vec!["/data".to_string()], spec.volumes());
        assert_eq!(Some(&"8080".to_string()), spec.env().get("PORT"));
        assert_eq!(Some(&String::new()), spec.labels().get("empty"));
        assert_eq!(Some(&Argument::shell("java -jar app.jar")), spec.cmd());

        let rules = spec.copy_rules();
        assert_eq!(2, rules.len());
        assert_eq!("app", rules[0].source());
        assert_eq!(Some("/opt/app"), rules[0].target());
        assert_eq!("etc/app", rules[1].destination());
        assert_eq!(Some(true), rules[1].export());
    }

    #[test]
    fn numeric_looking_values_keep_their_text() {
        let config: BuildConfig = serde_yaml::from_str(
            "env:\n  JAVA_VERSION: 1.10\n  MODE: 0755\n  HEX: 0x1F\n  DEBUG: true\n\
             labels:\n  version: 1.0\nports:\n- 8080\n",
        )
        .unwrap();
        let spec = config.to_spec().unwrap();

        assert_eq!(Some(&"1.10".to_string()), spec.env().get("JAVA_VERSION"));
        assert_eq!(Some(&"0755".to_string()), spec.env().get("MODE"));
        assert_eq!(Some(&"0x1F".to_string()), spec.env().get("HEX"));
        assert_eq!(Some(&"true".to_string()), spec.env().get("DEBUG"));
        assert_eq!(Some(&"1.0".to_string()), spec.labels().get("version"));
        assert_eq!(vec!["8080".to_string()], spec.ports());
    }

    #[test]
    fn parse_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = BuildConfig::parse(file.path()).unwrap();
        assert_eq!(Some("eclipse-temurin:21-jre"), config.base_image());
    }

    #[test]
    fn from_ext_name_fallback() {
        let config: BuildConfig =
            serde_yaml::from_str("from-ext:\n  name: fedora:40\n  type: image").unwrap();
        assert_eq!(Some("fedora:40"), config.base_image());
    }

    #[test]
    fn default_assembly_target_dir() {
        let assembly = AssemblyConfig::builder().build();
        assert_eq!("maven", assembly.name);
        assert_eq!("/maven", assembly.target_dir());
    }

    #[test]
    fn duplicate_assembly_names() {
        let config = BuildConfig::builder()
            .assemblies(vec![
                AssemblyConfig::builder().name("app").build(),
                AssemblyConfig::builder().name("app").build(),
            ])
            .build();

        assert_eq!(
            Err(RecipeError::DuplicateAssemblyName("app".into())),
            config.validate()
        );
    }

    #[test]
    fn empty_env_value() {
        let config: BuildConfig = serde_yaml::from_str("env:\n  FOO:\n").unwrap();
        assert_eq!(
            Err(RecipeError::EmptyEnvValue("FOO".into())),
            config.to_spec()
        );
    }

    #[test]
    fn relative_assembly_target() {
        let config = BuildConfig::builder()
            .assemblies(vec![AssemblyConfig::builder().target_dir("opt").build()])
            .build();

        assert_eq!(
            Err(RecipeError::MalformedBasedir("opt".into())),
            config.to_spec()
        );
    }

    #[rstest]
    #[case("from: alpine", None)]
    #[case("args:\n  VERSION: '1'", Some("1.21"))]
    #[case("healthcheck:\n  mode: none\nargs: {}", Some("1.24"))]
    #[case("cache-from: [alpine]\nhealthcheck:\n  mode: none", Some("1.25"))]
    fn minimal_api_version(#[case] yaml: &str, #[case] expected: Option<&str>) {
        let config: BuildConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(Ok(expected), config.validate());
    }
}
