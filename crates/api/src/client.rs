//! 后端接口客户端
//!
//! [`RemoteService`] 是界面层依赖的远程服务抽象，[`HttpClient`] 是基于 reqwest 的实现。

use crate::config::{ApiConfig, CHAT_PATH, EXPERIMENTS_PATH};
use crate::types::{ChatReply, ChatReplyBody, ChatRequest, ExperimentRecord};
use crate::Result;
use url::Url;

/// 远程服务 trait
///
/// 界面层只通过该 trait 访问后端，测试中可以替换为内存实现。
#[async_trait::async_trait]
pub trait RemoteService: Send + Sync {
    /// 发送一条聊天消息并等待回复
    ///
    /// # 错误
    ///
    /// 连接失败、超时或响应无法解析时返回错误；
    /// 后端通过 `error` 字段报告的业务错误以 [`ChatReply::Rejected`] 返回。
    async fn chat(&self, message: &str) -> Result<ChatReply>;

    /// 获取实验列表
    async fn experiments(&self) -> Result<Vec<ExperimentRecord>>;
}

/// 基于 reqwest 的 HTTP 客户端
#[derive(Debug, Clone)]
pub struct HttpClient {
    chat_url: Url,
    experiments_url: Url,
    http: reqwest::Client,
}

impl HttpClient {
    /// 根据配置创建客户端
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            chat_url: config.endpoint(CHAT_PATH)?,
            experiments_url: config.endpoint(EXPERIMENTS_PATH)?,
            http: builder.build()?,
        })
    }

    /// 聊天接口地址
    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    /// 实验列表接口地址
    pub fn experiments_url(&self) -> &Url {
        &self.experiments_url
    }

    /// 读取响应体并按 JSON 解析
    ///
    /// 不检查 HTTP 状态码：后端在 4xx 响应中同样返回 JSON 错误体。
    async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!("响应状态 {}，长度 {} 字节", status, body.len());
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait::async_trait]
impl RemoteService for HttpClient {
    async fn chat(&self, message: &str) -> Result<ChatReply> {
        tracing::info!("发送聊天请求到 {}", self.chat_url);

        let response = self
            .http
            .post(self.chat_url.clone())
            .json(&ChatRequest::new(message))
            .send()
            .await?;

        let body: ChatReplyBody = Self::read_json(response).await?;
        if let Some(ref call) = body.tool_call {
            tracing::info!("回复包含工具调用: {} {}", call.name, call.args);
        }
        body.into_reply()
    }

    async fn experiments(&self) -> Result<Vec<ExperimentRecord>> {
        tracing::info!("加载实验列表: {}", self.experiments_url);

        let response = self.http.get(self.experiments_url.clone()).send().await?;
        let records: Vec<ExperimentRecord> = Self::read_json(response).await?;

        tracing::debug!("收到 {} 条实验记录", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiError;

    #[test]
    fn test_client_urls() {
        let config = ApiConfig::new().with_base_url("http://127.0.0.1:5000");
        let client = HttpClient::new(&config).unwrap();
        assert_eq!(client.chat_url().as_str(), "http://127.0.0.1:5000/api/chat");
        assert_eq!(
            client.experiments_url().as_str(),
            "http://127.0.0.1:5000/api/experiments"
        );
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let config = ApiConfig::new().with_base_url("::not-a-url");
        let err = HttpClient::new(&config).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}
