use std::fmt;

/// The argument of `HEALTHCHECK` that disables health checks.
pub const HEALTHCHECK_NONE: &str = "NONE";

/// A Dockerfile instruction keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    From,
    Maintainer,
    Env,
    Label,
    Expose,
    Copy,
    User,
    Workdir,
    Shell,
    Run,
    Volume,
    Healthcheck,
    Cmd,
    Entrypoint,
}

impl Instruction {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::From => "FROM",
            Self::Maintainer => "MAINTAINER",
            Self::Env => "ENV",
            Self::Label => "LABEL",
            Self::Expose => "EXPOSE",
            Self::Copy => "COPY",
            Self::User => "USER",
            Self::Workdir => "WORKDIR",
            Self::Shell => "SHELL",
            Self::Run => "RUN",
            Self::Volume => "VOLUME",
            Self::Healthcheck => "HEALTHCHECK",
            Self::Cmd => "CMD",
            Self::Entrypoint => "ENTRYPOINT",
        }
    }

    /// Renders the instruction on one line without a trailing newline.
    ///
    /// Used for instructions nested in another, like the `CMD` of a `HEALTHCHECK`.
    #[must_use]
    pub fn inline<I, S>(self, args: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut line = String::from(self.keyword());
        for arg in args {
            line.push(' ');
            line.push_str(arg.as_ref());
        }
        line
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A `HEALTHCHECK` option flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthCheckOption {
    Interval,
    Timeout,
    StartPeriod,
    Retries,
}

impl HealthCheckOption {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Interval => "interval",
            Self::Timeout => "timeout",
            Self::StartPeriod => "start-period",
            Self::Retries => "retries",
        }
    }

    /// Renders the option as `--<name>=<value>`.
    #[must_use]
    pub fn flag<T: fmt::Display>(self, value: T) -> String {
        format!("--{}={value}", self.name())
    }
}

/// Accumulates instructions, one per line.
#[derive(Debug, Default)]
pub struct InstructionWriter {
    buf: String,
}

impl InstructionWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `instruction` followed by its space separated arguments.
    pub fn push<I, S>(&mut self, instruction: Instruction, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.buf.push_str(&instruction.inline(args));
        self.buf.push('\n');
        self
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn push_lines() {
        let mut writer = InstructionWriter::new();
        writer
            .push(Instruction::From, ["busybox:latest"])
            .push(Instruction::Copy, ["--chown=a:b", "maven", "/maven/"])
            .push(Instruction::Expose, ["80", "443/tcp"]);

        assert_eq!(
            "FROM busybox:latest\nCOPY --chown=a:b maven /maven/\nEXPOSE 80 443/tcp\n",
            writer.finish()
        );
    }

    #[test]
    fn inline_has_no_newline() {
        assert_eq!(
            r#"CMD ["curl","-f"]"#,
            Instruction::Cmd.inline([r#"["curl","-f"]"#])
        );
    }

    #[test]
    fn bare_instruction() {
        let mut writer = InstructionWriter::new();
        writer.push(Instruction::Healthcheck, [HEALTHCHECK_NONE]);
        assert_eq!("HEALTHCHECK NONE\n", writer.finish());
    }

    #[test]
    fn option_flags() {
        assert_eq!("--start-period=10s", HealthCheckOption::StartPeriod.flag("10s"));
        assert_eq!("--retries=3", HealthCheckOption::Retries.flag(3));
    }
}
