// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub controllers: ControllersConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Listening socket and runtime
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Directories the server reads from
#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    /// Holds `index.html`
    pub html_dir: String,
    /// Holds `mpr{N}_stats.csv`
    pub data_dir: String,
}

/// Controller range; drives both discovery and the CSV allow-list
#[derive(Debug, Deserialize, Clone)]
pub struct ControllersConfig {
    pub count: u8,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log every request instead of only error-class responses
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Connection handling
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Upper bound on one connection's lifetime, in seconds
    pub connection_timeout: u64,
    /// How long shutdown waits for in-flight connections, in seconds
    pub shutdown_timeout: u64,
}
