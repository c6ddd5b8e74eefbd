use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::types::{NfProfile, NfStatus, NfType};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NrfConfig {
    /// Empty disables all NRF interaction.
    pub uri: String,
    pub request_timeout_ms: u64,
    pub heartbeat_timer: u32,
}

impl Default for NrfConfig {
    fn default() -> Self {
        Self {
            uri: "http://nrf-service:8080".to_string(),
            request_timeout_ms: 5000,
            heartbeat_timer: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkFunctionConfig {
    pub nf_type: NfType,
    pub instance_id: String,
    pub instance_name: Option<String>,
    pub advertised_host: String,
    pub capacity: i32,
    pub priority: i32,
    pub locality: Option<String>,
}

impl Default for NetworkFunctionConfig {
    fn default() -> Self {
        Self {
            nf_type: NfType::Amf,
            instance_id: uuid::Uuid::new_v4().to_string(),
            instance_name: None,
            advertised_host: "127.0.0.1".to_string(),
            capacity: 100,
            priority: 1,
            locality: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub nrf: NrfConfig,
    pub network_function: NetworkFunctionConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

impl Config {
    /// Defaults, overlaid by `NF_CONFIG_FILE` when set, overlaid by environment variables.
    pub fn load() -> Result<Self> {
        let mut config = match env::var("NF_CONFIG_FILE") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config file")
    }

    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = env::var("NF_HOST") {
            self.server.host = host;
        }
        override_parsed("NF_PORT", &mut self.server.port)?;

        if let Ok(uri) = env::var("NRF_URI") {
            self.nrf.uri = uri;
        }
        override_parsed("NRF_REQUEST_TIMEOUT_MS", &mut self.nrf.request_timeout_ms)?;
        override_parsed("NRF_HEARTBEAT_TIMER", &mut self.nrf.heartbeat_timer)?;

        if let Ok(nf_type) = env::var("NF_TYPE") {
            self.network_function.nf_type = NfType::from(nf_type.to_uppercase());
        }
        if let Ok(instance_id) = env::var("NF_INSTANCE_ID") {
            self.network_function.instance_id = instance_id;
        }
        if let Ok(name) = env::var("NF_INSTANCE_NAME") {
            self.network_function.instance_name = Some(name);
        }
        if let Ok(host) = env::var("NF_ADVERTISED_HOST") {
            self.network_function.advertised_host = host;
        }
        override_parsed("NF_CAPACITY", &mut self.network_function.capacity)?;
        override_parsed("NF_PRIORITY", &mut self.network_function.priority)?;
        if let Ok(locality) = env::var("NF_LOCALITY") {
            self.network_function.locality = Some(locality);
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        override_parsed("METRICS_ENABLED", &mut self.metrics.enabled)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let nf = &self.network_function;
        if nf.instance_id.is_empty() {
            anyhow::bail!("network_function.instance_id cannot be empty");
        }
        if nf.advertised_host.is_empty() {
            anyhow::bail!("network_function.advertised_host cannot be empty");
        }
        if !nf.nf_type.is_known() {
            anyhow::bail!("network_function.nf_type {} is not a known NF type", nf.nf_type);
        }
        if !(0..=100).contains(&nf.capacity) {
            anyhow::bail!("network_function.capacity must be between 0 and 100");
        }
        if self.nrf.request_timeout_ms == 0 {
            anyhow::bail!("nrf.request_timeout_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn nrf_uri(&self) -> Option<&str> {
        let uri = self.nrf.uri.trim();
        if uri.is_empty() {
            None
        } else {
            Some(uri)
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.nrf.request_timeout_ms)
    }

    /// The profile this NF registers with the NRF.
    pub fn local_profile(&self) -> NfProfile {
        let nf = &self.network_function;
        let mut profile = NfProfile::new(nf.instance_id.clone(), nf.nf_type.clone(), NfStatus::Registered);
        profile.nf_instance_name = nf.instance_name.clone();
        profile.heartbeat_timer = Some(self.nrf.heartbeat_timer);
        if nf.advertised_host.parse::<std::net::Ipv6Addr>().is_ok() {
            profile.ipv6_addresses = vec![nf.advertised_host.clone()];
        } else if nf.advertised_host.parse::<std::net::Ipv4Addr>().is_ok() {
            profile.ipv4_addresses = vec![nf.advertised_host.clone()];
        } else {
            profile.fqdn = Some(nf.advertised_host.clone());
        }
        profile.capacity = Some(nf.capacity);
        profile.priority = Some(nf.priority);
        profile.locality = nf.locality.clone();
        profile
    }
}

fn override_parsed<T>(key: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Ok(value) = env::var(key) {
        *target = value
            .parse()
            .with_context(|| format!("Invalid value for {}: {}", key, value))?;
    }
    Ok(())
}
