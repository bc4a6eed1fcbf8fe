//! 错误定义模块

use thiserror::Error;

/// ORCC客户端统一错误类型
#[derive(Error, Debug)]
pub enum OrccError {
    /// 后端返回非2xx状态；显示文本即提取出的错误消息
    #[error("{message}")]
    Request {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("响应解析错误 [{endpoint}]: {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("网络错误 [{endpoint}]: {message}")]
    Transport { endpoint: String, message: String },

    #[error("配置错误: {0}")]
    Config(String),

    #[error("无效的URL: {0}")]
    InvalidUrl(String),

    #[error("无效的取值: {0}")]
    InvalidValue(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OrccError {
    /// 后端返回的HTTP状态码（仅 `Request` 错误携带）
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// 出错的端点路径
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Request { endpoint, .. }
            | Self::Parse { endpoint, .. }
            | Self::Transport { endpoint, .. } => Some(endpoint.as_str()),
            _ => None,
        }
    }
}

/// ORCC客户端统一结果类型
pub type Result<T> = std::result::Result<T, OrccError>;
