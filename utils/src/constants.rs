// Images
pub const DEFAULT_BASE_IMAGE: &str = "busybox:latest";

// Paths
pub const DEFAULT_BASEDIR: &str = "/maven";
pub const DOCKERFILE_NAME: &str = "Dockerfile";
pub const BUILD_CONFIG_FILE: &str = "kiln.yml";

// Build engine API versions
pub const API_VERSION_BUILD_ARGS: &str = "1.21";
pub const API_VERSION_HEALTHCHECK: &str = "1.24";
pub const API_VERSION_CACHE_FROM: &str = "1.25";

// Kiln vars
pub const KILN_LOG: &str = "KILN_LOG";
