use miette::Diagnostic;
use thiserror::Error;

/// Validation failures raised while accumulating or rendering a build recipe.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum RecipeError {
    #[error(
        "'basedir' must be an absolute path starting with / or start with an environment variable, got '{0}'"
    )]
    #[diagnostic(help("Use a path like '/app' or '${{APP_HOME}}/lib'"))]
    MalformedBasedir(String),

    #[error("Invalid port mapping '{0}', required format: '<port>(/tcp|udp)'")]
    #[diagnostic(help("Ports are numbers with an optional protocol, like '8080' or '53/udp'"))]
    InvalidPort(String),

    #[error("Environment variable '{0}' must not be null or empty if building an image")]
    #[diagnostic()]
    EmptyEnvValue(String),

    #[error("Unsupported health check mode: {0}")]
    #[diagnostic(help("Supported modes are 'cmd' and 'none'"))]
    UnsupportedHealthCheckMode(String),

    #[error("HealthCheck: the parameter 'cmd' is mandatory when the health check mode is set to 'cmd' (default)")]
    #[diagnostic()]
    HealthCheckMissingCmd,

    #[error("HealthCheck: no parameters are allowed when the health check mode is set to 'none'")]
    #[diagnostic()]
    HealthCheckNoneWithOptions,

    #[error("Argument conflict: either shell or exec should be specified and only in one form")]
    #[diagnostic()]
    MalformedArgument,

    #[error("Multiple assemblies use the name \"{0}\". Assembly names must be unique")]
    #[diagnostic()]
    DuplicateAssemblyName(String),
}
