//! Layered service configuration loading.
//!
//! Sources, later overriding earlier:
//!  1. `/etc/repo-sync/service.yaml`: system-wide defaults
//!  2. `./config/service.yaml`: deployment-local override
//!  3. the file named by `REPO_SYNC_CONFIG_FILE`: operator-specified, required
//!  4. environment variables prefixed `REPO_SYNC__`, e.g.
//!     `REPO_SYNC__SERVER__PORT=9090` sets `server.port`
//!
//! Every [`ServiceConfig`] field has a default, so missing files produce a
//! valid configuration. A malformed file or an environment value of the
//! wrong type is an error.

use config::{Config, ConfigError, Environment, File, FileFormat};
use repo_sync_api::ServiceConfig;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_FILE_ENV: &str = "REPO_SYNC_CONFIG_FILE";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "REPO_SYNC";

const DEFAULT_FILES: [&str; 2] = ["/etc/repo-sync/service", "config/service"];

/// Path from [`CONFIG_FILE_ENV`], if set and non-empty.
pub fn explicit_config_path() -> Option<String> {
    std::env::var(CONFIG_FILE_ENV)
        .ok()
        .filter(|path| !path.trim().is_empty())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from the default files, an optional explicit file and
/// the process environment.
pub fn load(explicit_path: Option<&str>) -> Result<ServiceConfig, ConfigError> {
    load_from(&DEFAULT_FILES, explicit_path, environment())
}

pub(crate) fn load_from(
    default_files: &[&str],
    explicit_path: Option<&str>,
    environment: Environment,
) -> Result<ServiceConfig, ConfigError> {
    let mut builder = Config::builder();

    for path in default_files {
        builder = builder.add_source(
            File::with_name(path)
                .required(false)
                .format(FileFormat::Yaml),
        );
    }

    if let Some(path) = explicit_path {
        builder = builder.add_source(File::with_name(path).required(true).format(FileFormat::Yaml));
    }

    builder
        .add_source(environment)
        .build()?
        .try_deserialize()
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
