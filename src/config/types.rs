use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub toolkit: ToolkitConfig,
    #[serde(default)]
    pub recognizer: RecognizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Include raw failure text in 500 responses.
    #[serde(default = "default_expose_internal_errors")]
    pub expose_internal_errors: bool,
    /// Largest accepted request body. Larger bodies get 413.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// External cheminformatics toolkit process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolkitConfig {
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_toolkit_args")]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// External image-to-structure recognition process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    #[serde(default = "default_command")]
    pub command: String,
    /// `{image}` is replaced by the scratch image path; without it the path
    /// is appended as the last argument.
    #[serde(default = "default_recognizer_args")]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Upper bound on concurrent recognizer runs. Unbounded when absent.
    #[serde(default)]
    pub max_concurrent: Option<usize>,
    /// Directory for scratch images. System temp dir when absent.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl ToolkitConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl RecognizerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            expose_internal_errors: default_expose_internal_errors(),
            max_body_bytes: default_max_body_bytes(),
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_toolkit_args(),
            env: HashMap::new(),
            timeout_secs: None,
        }
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_recognizer_args(),
            env: HashMap::new(),
            timeout_secs: None,
            max_concurrent: None,
            scratch_dir: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_expose_internal_errors() -> bool {
    true
}

fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_command() -> String {
    "python3".to_string()
}

fn default_toolkit_args() -> Vec<String> {
    vec!["bridge/rdkit_bridge.py".to_string()]
}

fn default_recognizer_args() -> Vec<String> {
    vec![
        "bridge/decimer_bridge.py".to_string(),
        "{image}".to_string(),
    ]
}
