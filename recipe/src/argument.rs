use serde::{Deserialize, Serialize};

use crate::RecipeError;

/// An argument for `CMD`, `ENTRYPOINT`, `SHELL` and health check probes.
///
/// In a config file this can be written as a bare string, which is
/// taken as the shell form, or as a map with exactly one of
/// `shell:` or `exec:`.
///
/// ```yaml
/// cmd: java -jar app.jar
/// entrypoint:
///   exec:
///   - /bin/sh
///   - -c
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ArgumentConfig", into = "ArgumentConfig")]
pub enum Argument {
    /// A single pre-formed shell command.
    Shell(String),

    /// An ordered list of tokens run without a shell.
    Exec(Vec<String>),
}

impl Argument {
    #[must_use]
    pub fn shell<S: Into<String>>(command: S) -> Self {
        Self::Shell(command.into())
    }

    #[must_use]
    pub fn exec<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exec(tokens.into_iter().map(Into::into).collect())
    }

    /// Checks that exactly one form carries a value.
    ///
    /// # Errors
    /// Will error if the exec form holds no tokens.
    pub fn validate(&self) -> Result<(), RecipeError> {
        match self {
            Self::Exec(tokens) if tokens.is_empty() => Err(RecipeError::MalformedArgument),
            _ => Ok(()),
        }
    }

    /// Every token of the argument. A shell command is split on whitespace.
    #[must_use]
    pub fn as_strings(&self) -> Vec<&str> {
        match self {
            Self::Shell(command) => command.split_whitespace().collect(),
            Self::Exec(tokens) => tokens.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentConfig {
    Plain(String),
    Forms {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shell: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        exec: Option<Vec<String>>,
    },
}

impl TryFrom<ArgumentConfig> for Argument {
    type Error = RecipeError;

    fn try_from(value: ArgumentConfig) -> Result<Self, Self::Error> {
        match value {
            ArgumentConfig::Plain(command) => Ok(Self::Shell(command)),
            ArgumentConfig::Forms {
                shell: Some(command),
                exec: None,
            } => Ok(Self::Shell(command)),
            ArgumentConfig::Forms {
                shell: Some(command),
                exec: Some(tokens),
            } if tokens.is_empty() => Ok(Self::Shell(command)),
            ArgumentConfig::Forms {
                shell: None,
                exec: Some(tokens),
            } if !tokens.is_empty() => Ok(Self::Exec(tokens)),
            ArgumentConfig::Forms { .. } => Err(RecipeError::MalformedArgument),
        }
    }
}

impl From<Argument> for ArgumentConfig {
    fn from(value: Argument) -> Self {
        match value {
            Argument::Shell(command) => Self::Forms {
                shell: Some(command),
                exec: None,
            },
            Argument::Exec(tokens) => Self::Forms {
                shell: None,
                exec: Some(tokens),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("cmd: echo hi", Argument::shell("echo hi"))]
    #[case("cmd:\n  shell: echo hi", Argument::shell("echo hi"))]
    #[case("cmd:\n  exec: [\"/bin/sh\", \"-c\"]", Argument::exec(["/bin/sh", "-c"]))]
    fn deserialize_argument(#[case] yaml: &str, #[case] expected: Argument) {
        #[derive(Deserialize)]
        struct Wrapper {
            cmd: Argument,
        }

        let wrapper: Wrapper = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(expected, wrapper.cmd);
    }

    #[rstest]
    #[case(ArgumentConfig::Forms { shell: None, exec: None })]
    #[case(ArgumentConfig::Forms { shell: None, exec: Some(vec![]) })]
    #[case(ArgumentConfig::Forms {
        shell: Some("echo".into()),
        exec: Some(vec!["echo".into()]),
    })]
    fn malformed_argument(#[case] config: ArgumentConfig) {
        assert_eq!(
            Err(RecipeError::MalformedArgument),
            Argument::try_from(config)
        );
    }

    #[test]
    fn malformed_argument_from_yaml() {
        let result = serde_yaml::from_str::<Argument>("shell: a\nexec: [b]");
        assert!(result.is_err());
    }

    #[test]
    fn empty_exec_fails_validation() {
        assert_eq!(
            Err(RecipeError::MalformedArgument),
            Argument::Exec(vec![]).validate()
        );
        assert_eq!(Ok(()), Argument::shell("true").validate());
    }

    #[rstest]
    #[case(Argument::shell("/bin/bash  -c"), vec!["/bin/bash", "-c"])]
    #[case(Argument::exec(["powershell", "-command"]), vec!["powershell", "-command"])]
    fn as_strings(#[case] argument: Argument, #[case] expected: Vec<&str>) {
        assert_eq!(expected, argument.as_strings());
    }
}
