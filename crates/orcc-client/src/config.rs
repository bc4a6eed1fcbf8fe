//! 客户端配置
//!
//! 基础地址在构造客户端时注入，可以在代码中直接构建，也可以从配置文件
//! 和 `ORCC__` 前缀的环境变量加载（例如 `ORCC__BASE_URL`）。

use std::collections::HashMap;

use config::{Config, Environment, File};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use orcc_core::{OrccError, Result};

/// 默认后端地址
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// ORCC客户端配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 后端基础地址，可以带路径前缀
    pub base_url: String,
    /// 每个请求都会附带的请求头，优先级高于内置的 Content-Type，低于调用方传入的请求头
    pub default_headers: HashMap<String, String>,
    /// User-Agent
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_headers: HashMap::new(),
            user_agent: Some(concat!("orcc-client/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// 从可选的配置文件和环境变量加载配置，环境变量覆盖文件
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix("ORCC").prefix_separator("__").separator("__"))
            .build()
            .map_err(|e| OrccError::Config(e.to_string()))?;

        let config: ClientConfig = settings
            .try_deserialize()
            .map_err(|e| OrccError::Config(format!("Failed to deserialize configuration: {}", e)))?;

        config.validate()?;

        match config_path {
            Some(path) => info!("Client configuration loaded from: {}", path),
            None => debug!("Client configuration loaded from environment"),
        }
        Ok(config)
    }

    /// 校验基础地址和默认请求头
    pub fn validate(&self) -> Result<()> {
        self.parsed_base_url()?;
        self.header_map()?;
        Ok(())
    }

    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| OrccError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(OrccError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                url.scheme(),
                self.base_url
            )));
        }

        if url.cannot_be_a_base() {
            return Err(OrccError::InvalidUrl(format!(
                "{} cannot be used as a base address",
                self.base_url
            )));
        }

        Ok(url)
    }

    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| OrccError::Config(format!("Invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| OrccError::Config(format!("Invalid value for header '{}': {}", name, e)))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}
