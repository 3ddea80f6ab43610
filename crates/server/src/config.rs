//! Server configuration loaded from the environment.
use std::env;
use std::path::PathBuf;

use totem_runtime::RevivalConfig;

/// Configuration for one scenario run.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Scenario file to replay.
    pub scenario: Option<PathBuf>,
    /// Write the JSON report here instead of stdout.
    pub report: Option<PathBuf>,
    pub log_stderr: bool,
    pub log_file: bool,
    /// Directory for the log file (default: platform cache directory)
    pub log_dir: Option<PathBuf>,
    /// Revival tuning used when the scenario carries none.
    pub revival: RevivalConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            scenario: None,
            report: None,
            log_stderr: true,
            log_file: false,
            log_dir: None,
            revival: RevivalConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TOTEM_SCENARIO` - Scenario file to replay
    /// - `TOTEM_REPORT` - Report output path (default: stdout)
    /// - `TOTEM_LOG_STDERR` - Log to stderr (default: true)
    /// - `TOTEM_LOG_FILE` - Log to a file (default: false, implied by `TOTEM_LOG_DIR`)
    /// - `TOTEM_LOG_DIR` - Log file directory (default: platform-specific)
    ///
    /// Revival tuning variables are read by [`RevivalConfig::from_env`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            revival: RevivalConfig::from_lookup(&lookup),
            ..Self::default()
        };

        config.scenario = read_path(&lookup, "TOTEM_SCENARIO");
        config.report = read_path(&lookup, "TOTEM_REPORT");

        if let Some(enable) = read_bool(&lookup, "TOTEM_LOG_STDERR") {
            config.log_stderr = enable;
        }

        config.log_dir = read_path(&lookup, "TOTEM_LOG_DIR");
        config.log_file = read_bool(&lookup, "TOTEM_LOG_FILE").unwrap_or(config.log_dir.is_some());

        config
    }

    /// A scenario path given on the command line wins over `TOTEM_SCENARIO`.
    #[must_use]
    pub fn with_scenario_arg(mut self, arg: Option<String>) -> Self {
        if let Some(path) = arg.filter(|path| !path.trim().is_empty()) {
            self.scenario = Some(PathBuf::from(path));
        }
        self
    }
}

fn read_path<F>(lookup: &F, key: &str) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

fn read_bool<F>(lookup: &F, key: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key)?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
