use crate::types::BackendAddress;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// 后端发现配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DiscoverySettings {
    /// 需要探测的后端地址，按顺序排列
    pub addresses: Vec<BackendAddress>,
    /// 默认后端在 `addresses` 中的下标
    #[serde(default)]
    pub default_index: usize,
    #[serde(default = "default_discovery_interval")]
    pub interval_seconds: u64,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_seconds: u64,
    /// 关闭时等待调度任务退出的最长时间
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// 转发请求只限制连接时间，不限制总请求时间
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub cors: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingSettings {
    /// 追加写入的日志文件，不设置则只输出到标准输出
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            connect_timeout_seconds: default_connect_timeout(),
            cors: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_discovery_interval() -> u64 {
    600 // 10分钟探测一次
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_shutdown_timeout() -> u64 {
    10
}

fn default_bind_address() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

impl DiscoverySettings {
    pub fn new(addresses: Vec<BackendAddress>) -> Self {
        Self {
            addresses,
            default_index: 0,
            interval_seconds: default_discovery_interval(),
            probe_timeout_seconds: default_probe_timeout(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }

    /// 获取默认后端
    pub fn default_backend(&self) -> Result<&BackendAddress> {
        self.addresses.get(self.default_index).ok_or_else(|| {
            anyhow::anyhow!(
                "default_index {} is out of range for {} configured addresses",
                self.default_index,
                self.addresses.len()
            )
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }
}

impl ServerSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Config {
    /// 使用给定的后端地址创建配置，其余字段取默认值
    pub fn with_addresses(addresses: Vec<BackendAddress>) -> Self {
        Self {
            discovery: DiscoverySettings::new(addresses),
            server: ServerSettings::default(),
            logging: LoggingSettings::default(),
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        self.validate_discovery_config()?;
        self.validate_server_config()?;
        Ok(())
    }

    fn validate_discovery_config(&self) -> Result<()> {
        let discovery = &self.discovery;

        if discovery.addresses.is_empty() {
            anyhow::bail!("Discovery has no backend addresses defined");
        }

        let mut seen = HashSet::new();
        for address in &discovery.addresses {
            Self::validate_address(address)?;
            if !seen.insert(address.as_str().trim_end_matches('/')) {
                anyhow::bail!("Backend address '{}' is configured more than once", address);
            }
        }

        discovery.default_backend()?;

        if discovery.interval_seconds == 0 {
            anyhow::bail!("Discovery has invalid interval_seconds: cannot be 0");
        }

        if discovery.probe_timeout_seconds == 0 {
            anyhow::bail!("Discovery has invalid probe_timeout_seconds: cannot be 0");
        }

        if discovery.shutdown_timeout_seconds == 0 {
            anyhow::bail!("Discovery has invalid shutdown_timeout_seconds: cannot be 0");
        }

        Ok(())
    }

    fn validate_address(address: &BackendAddress) -> Result<()> {
        let url = reqwest::Url::parse(address.as_str()).map_err(|e| {
            anyhow::anyhow!("Backend address '{}' is not a valid URL: {}", address, e)
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!(
                "Backend address '{}' has invalid scheme. Must start with http:// or https://",
                address
            );
        }

        if url.host_str().is_none() {
            anyhow::bail!("Backend address '{}' has no host", address);
        }

        Ok(())
    }

    fn validate_server_config(&self) -> Result<()> {
        if self.server.bind_address.is_empty() {
            anyhow::bail!("Server has empty bind_address");
        }

        if self.server.connect_timeout_seconds == 0 {
            anyhow::bail!("Server has invalid connect_timeout_seconds: cannot be 0");
        }

        Ok(())
    }
}
