//! 接口配置模块

use crate::Result;
use std::time::Duration;
use url::Url;

/// 默认后端地址
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// 聊天接口路径
pub const CHAT_PATH: &str = "/api/chat";

/// 实验列表接口路径
pub const EXPERIMENTS_PATH: &str = "/api/experiments";

/// 接口配置
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// 后端地址
    pub base_url: String,

    /// 单次请求超时（`None` 表示不限时）
    pub request_timeout: Option<Duration>,

    /// 建立连接超时
    pub connect_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Some(Duration::from_secs(120)),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ApiConfig {
    /// 创建新的配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置后端地址
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 设置请求超时
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 设置连接超时
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// 解析接口完整地址
    ///
    /// `path` 以 `/` 开头时相对于站点根路径解析，与浏览器中的绝对路径请求一致。
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.base_url)?;
        Ok(base.join(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiError;

    #[test]
    fn test_config_builder() {
        let config = ApiConfig::new()
            .with_base_url("http://localhost:8080")
            .with_request_timeout(None)
            .with_connect_timeout(Duration::from_secs(3));

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_endpoint_resolves_from_site_root() {
        let config = ApiConfig::new().with_base_url("http://localhost:5000/ui/index.html");
        let url = config.endpoint(CHAT_PATH).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/chat");

        let url = config.endpoint(EXPERIMENTS_PATH).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/experiments");
    }

    #[test]
    fn test_endpoint_invalid_base() {
        let config = ApiConfig::new().with_base_url("localhost");
        assert!(matches!(config.endpoint(CHAT_PATH), Err(ApiError::InvalidUrl(_))));
    }
}
