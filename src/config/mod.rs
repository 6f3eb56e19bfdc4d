// Configuration module entry point
// Loads layered configuration (defaults, TOML file, environment) and validates it

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

use crate::controllers::{ControllerSet, DEFAULT_CONTROLLERS, MAX_CONTROLLERS};
use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Default config file name (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "mpr_monitor";

/// Environment variable prefix, e.g. `MPR_MONITOR_SERVER__PORT=9090`
const ENV_PREFIX: &str = "MPR_MONITOR";

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// A missing file is not an error: defaults and environment still apply.
    pub fn load_from(config_path: &str) -> Result<Self, StartupError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("paths.html_dir", "/usr/local/share/mpr_monitor")?
            .set_default("paths.data_dir", "/var/log/mpr_monitor")?
            .set_default("controllers.count", DEFAULT_CONTROLLERS)?
            .set_default("logging.access_log", false)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check values the type system cannot express
    pub fn validate(&self) -> Result<(), StartupError> {
        self.socket_addr()?;
        self.controller_set()?;
        if self.performance.connection_timeout == 0 {
            return Err(StartupError::InvalidSetting {
                key: "performance.connection_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.performance.shutdown_timeout == 0 {
            return Err(StartupError::InvalidSetting {
                key: "performance.shutdown_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.server.workers == Some(0) {
            return Err(StartupError::InvalidSetting {
                key: "server.workers",
                reason: "must be greater than zero when set".to_string(),
            });
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|e: std::net::AddrParseError| StartupError::InvalidAddress {
            reason: e.to_string(),
            addr,
        })
    }

    pub fn controller_set(&self) -> Result<ControllerSet, StartupError> {
        ControllerSet::new(self.controllers.count).ok_or_else(|| StartupError::InvalidSetting {
            key: "controllers.count",
            reason: format!("must be between 1 and {MAX_CONTROLLERS}"),
        })
    }

    pub const fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.performance.connection_timeout)
    }

    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.performance.shutdown_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn load_file(contents: &str) -> Result<Config, StartupError> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        std::fs::write(&path, contents).unwrap();
        Config::load_from(path.to_str().unwrap())
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent");
        let cfg = Config::load_from(missing.to_str().unwrap()).unwrap();

        assert_eq!(cfg.socket_addr().unwrap(), "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.paths.html_dir, "/usr/local/share/mpr_monitor");
        assert_eq!(cfg.paths.data_dir, "/var/log/mpr_monitor");
        assert_eq!(cfg.controller_set().unwrap(), ControllerSet::default());
        assert_eq!(cfg.controllers.count, DEFAULT_CONTROLLERS);
        assert!(!cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.connection_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.shutdown_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let cfg = load_file(
            r#"
[server]
host = "127.0.0.1"
port = 9090

[paths]
data_dir = "/tmp/mpr"

[controllers]
count = 4

[logging]
access_log = true
access_log_format = "json"
"#,
        )
        .unwrap();

        assert_eq!(cfg.socket_addr().unwrap(), "127.0.0.1:9090".parse().unwrap());
        assert_eq!(cfg.paths.data_dir, "/tmp/mpr");
        assert_eq!(cfg.paths.html_dir, "/usr/local/share/mpr_monitor");
        assert_eq!(cfg.controller_set().unwrap().count(), 4);
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "json");
    }

    #[test]
    fn test_rejects_out_of_range_controller_count() {
        let err = load_file("[controllers]\ncount = 11\n").unwrap_err();
        assert!(matches!(
            err,
            StartupError::InvalidSetting { key: "controllers.count", .. }
        ));
    }

    #[test]
    fn test_rejects_bad_host() {
        let err = load_file("[server]\nhost = \"not an ip\"\n").unwrap_err();
        assert!(matches!(err, StartupError::InvalidAddress { .. }));
    }

    #[test]
    fn test_rejects_zero_timeouts() {
        let err = load_file("[performance]\nshutdown_timeout = 0\n").unwrap_err();
        assert!(matches!(
            err,
            StartupError::InvalidSetting { key: "performance.shutdown_timeout", .. }
        ));
    }

    #[test]
    fn test_environment_overrides_file_and_defaults() {
        // No other test reads server.workers, so the variable cannot leak into their checks
        std::env::set_var("MPR_MONITOR_SERVER__WORKERS", "3");
        let from_file = load_file("[server]\nworkers = 1\n");
        let from_defaults = load_file("");
        std::env::remove_var("MPR_MONITOR_SERVER__WORKERS");

        assert_eq!(from_file.unwrap().server.workers, Some(3));
        assert_eq!(from_defaults.unwrap().server.workers, Some(3));
    }
}
