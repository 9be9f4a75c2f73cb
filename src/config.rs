use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::cli::Cli;
use crate::playlist::PROXY_PATH;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_window_size() -> f64 {
    10.0
}

fn default_initial_duration() -> f64 {
    10.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_window_size")]
    pub window_size: f64,
    #[serde(default = "default_initial_duration")]
    pub initial_duration: f64,
    #[serde(default)]
    pub event: bool,
    #[serde(default, rename = "loop")]
    pub loop_playback: bool,
    #[serde(default)]
    pub proxy_segments: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            initial_duration: default_initial_duration(),
            event: false,
            loop_playback: false,
            proxy_segments: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

impl Config {
    /// Loads `path`, or `config.toml` from the working directory if it
    /// exists, or falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load_from(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Command line flags win over the file.
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<(), ConfigError> {
        if let Some(host) = &cli.host {
            self.http.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.http.port = port;
        }
        if let Some(window_size) = cli.window_size {
            self.stream.window_size = window_size;
        }
        if let Some(initial_duration) = cli.initial_duration {
            self.stream.initial_duration = initial_duration;
        }
        self.stream.event |= cli.event;
        self.stream.loop_playback |= cli.loop_playback;
        self.stream.proxy_segments |= cli.proxy_segments;

        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let stream = &self.stream;
        if !stream.window_size.is_finite() || stream.window_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "window_size must be a positive number of seconds, got {}",
                stream.window_size
            )));
        }
        initial_duration(stream.initial_duration)?;
        if self.http.host.is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn server_config(&self) -> Result<ServerConfig, ConfigError> {
        let proxy_base_url = proxy_base_url(&self.http.host, self.http.port)?;
        Ok(ServerConfig {
            window_size: (!self.stream.event).then_some(self.stream.window_size),
            initial_duration: initial_duration(self.stream.initial_duration)?,
            loop_playback: self.stream.loop_playback,
            proxy_base_url,
            proxy_segments: self.stream.proxy_segments,
        })
    }
}

fn initial_duration(secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|e| {
        ConfigError::Invalid(format!(
            "initial_duration must be zero or more seconds, got {secs}: {e}"
        ))
    })
}

fn proxy_base_url(host: &str, port: u16) -> Result<Url, ConfigError> {
    let raw = format!("http://{host}:{port}{PROXY_PATH}");
    Url::parse(&raw).map_err(|e| ConfigError::Invalid(format!("bad proxy url {raw}: {e}")))
}

/// Settings the playlist rewriting reads on every request.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `None` selects event mode.
    pub window_size: Option<f64>,
    pub initial_duration: Duration,
    pub loop_playback: bool,
    pub proxy_base_url: Url,
    pub proxy_segments: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let config = Config::default();
        Self {
            window_size: Some(config.stream.window_size),
            initial_duration: Duration::from_secs_f64(config.stream.initial_duration),
            loop_playback: false,
            proxy_base_url: Url::parse("http://localhost:8080/proxy")
                .expect("default proxy url is valid"),
            proxy_segments: false,
        }
    }
}
