use crate::gateway::DEFAULT_PORT;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    gateway: Gateway,
    output: Output,
}

impl AppConfig {
    /// Loads defaults, then `meter_reader.*` and `meter_reader_local.*` if present, then
    /// `METER_READER_*` environment variables (`__` separates nested keys).
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("gateway.port", i64::from(DEFAULT_PORT))?
            .set_default("gateway.timeout", "10s")?
            .set_default("output.delimiter", ",")?
            .add_source(File::with_name("meter_reader").required(false))
            .add_source(File::with_name("meter_reader_local").required(false))
            .add_source(
                Environment::with_prefix("METER_READER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn output(&self) -> &Output {
        &self.output
    }
}

#[derive(Debug, Deserialize)]
pub struct Gateway {
    port: u16,
    #[serde(with = "humantime_serde")]
    timeout: Duration,
}

impl Gateway {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[derive(Debug, Deserialize)]
pub struct Output {
    delimiter: String,
}

impl Output {
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                gateway: Gateway {
                    port: DEFAULT_PORT,
                    timeout: Duration::from_secs(10),
                },
                output: Output { delimiter: ",".to_string() },
            },
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.gateway.port = port;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.gateway.timeout = timeout;
        self
    }

    pub fn delimiter(mut self, delimiter: &str) -> Self {
        self.config.output.delimiter = delimiter.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
