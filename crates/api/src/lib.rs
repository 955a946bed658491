//! DataPilot 后端接口模块
//!
//! 封装 `/api/chat` 与 `/api/experiments` 两个 HTTP 接口，
//! 为界面层提供统一的 [`RemoteService`] 抽象。

use thiserror::Error;

pub mod client;
pub mod config;
pub mod types;

pub use client::{HttpClient, RemoteService};
pub use config::{ApiConfig, CHAT_PATH, DEFAULT_BASE_URL, EXPERIMENTS_PATH};
pub use types::{ChatReply, ChatReplyBody, ChatRequest, ExperimentRecord, ToolCall};

/// 接口调用错误
///
/// 所有变体只携带字符串，便于在界面事件中克隆传递。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("无效的服务地址: {0}")]
    InvalidUrl(String),

    #[error("HTTP 客户端初始化失败: {0}")]
    Client(String),

    #[error("连接失败: {0}")]
    Connect(String),

    #[error("请求超时: {0}")]
    Timeout(String),

    #[error("请求失败: {0}")]
    Transport(String),

    #[error("响应解析失败: {0}")]
    Decode(String),

    #[error("请求被中断: {0}")]
    Aborted(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err.to_string())
        } else if err.is_connect() {
            ApiError::Connect(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::Client(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// 接口调用结果类型
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::Connect("connection refused".to_string());
        assert_eq!(err.to_string(), "连接失败: connection refused");

        let err = ApiError::Decode("expected value".to_string());
        assert!(err.to_string().contains("expected value"));
    }

    #[test]
    fn test_from_url_parse_error() {
        let err: ApiError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_from_json_error() {
        let err: ApiError = serde_json::from_str::<ChatReplyBody>("<html>")
            .unwrap_err()
            .into();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
