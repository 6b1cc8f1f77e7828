use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::http::ParserConfig;
use crate::net::SocketOption;

const CONFIG_ENV: &str = "TREVI_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings for the socket and parser.
///
/// Every field has a default, so a YAML mapping may leave out any of them.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub nonblocking: bool,
    pub read_buffer_size: usize,
    pub max_header_bytes: usize,
    pub strict_request_line: bool,
    pub socket_options: SocketOptions,
}

/// Socket options to apply; unset entries are left at the OS default.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SocketOptions {
    pub broadcast: Option<bool>,
    pub debug: Option<bool>,
    pub dont_route: Option<bool>,
    pub oob_inline: Option<bool>,
    pub reuse_addr: Option<bool>,
    pub keep_alive: Option<bool>,
    pub no_sigpipe: Option<bool>,
    pub send_buffer: Option<i32>,
    pub recv_buffer: Option<i32>,
}

impl SocketOptions {
    /// The configured options, in the order they are applied.
    pub fn to_options(&self) -> Vec<SocketOption> {
        [
            self.broadcast.map(SocketOption::Broadcast),
            self.debug.map(SocketOption::Debug),
            self.dont_route.map(SocketOption::DontRoute),
            self.oob_inline.map(SocketOption::OobInline),
            self.reuse_addr.map(SocketOption::ReuseAddr),
            self.keep_alive.map(SocketOption::KeepAlive),
            self.no_sigpipe.map(SocketOption::NoSigPipe),
            self.send_buffer.map(SocketOption::SendBuffer),
            self.recv_buffer.map(SocketOption::RecvBuffer),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        let parser = ParserConfig::default();
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            nonblocking: false,
            read_buffer_size: 4096,
            max_header_bytes: parser.max_header_bytes,
            strict_request_line: parser.strict_request_line,
            socket_options: SocketOptions {
                reuse_addr: Some(true),
                ..SocketOptions::default()
            },
        }
    }
}

impl Config {
    /// Loads the YAML file named by `TREVI_CONFIG` (defaults when unset),
    /// then applies `LISTEN`, `NONBLOCKING` and `READ_BUFFER_SIZE`.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Overrides fields from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("LISTEN") {
            self.listen_addr = addr;
        }
        if let Some(value) = lookup("NONBLOCKING") {
            self.nonblocking = match value.as_str() {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "NONBLOCKING",
                        value: value.clone(),
                    });
                }
            };
        }
        if let Some(value) = lookup("READ_BUFFER_SIZE") {
            self.read_buffer_size = value.parse().map_err(|_| ConfigError::Invalid {
                key: "READ_BUFFER_SIZE",
                value,
            })?;
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen_addr.parse().map_err(|_| ConfigError::Invalid {
            key: "listen_addr",
            value: self.listen_addr.clone(),
        })
    }

    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            max_header_bytes: self.max_header_bytes,
            strict_request_line: self.strict_request_line,
        }
    }
}
