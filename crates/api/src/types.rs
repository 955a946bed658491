//! 接口数据类型
//!
//! 定义聊天与实验列表接口的请求、响应格式。

use crate::{ApiError, Result};
use serde::{Deserialize, Serialize};

/// 聊天请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// 用户输入的消息
    pub message: String,
}

impl ChatRequest {
    /// 创建聊天请求
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 后端附带的工具调用信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// 工具名称
    pub name: String,

    /// 工具参数（后端以任意 JSON 形式给出）
    #[serde(default)]
    pub args: serde_json::Value,
}

/// 聊天响应体（原始线上格式）
///
/// 成功时包含 `response`，失败时包含 `error`。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReplyBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCall>,
}

impl ChatReplyBody {
    /// 成功响应
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
            ..Self::default()
        }
    }

    /// 业务错误响应
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// 转换为聊天结果
    ///
    /// 非空的 `error` 优先；两个字段都缺失时视为响应格式错误。
    pub fn into_reply(self) -> Result<ChatReply> {
        match (self.error, self.response) {
            (Some(error), _) if !error.is_empty() => Ok(ChatReply::Rejected(error)),
            (_, Some(text)) => Ok(ChatReply::Answer {
                text,
                tool_call: self.tool_call,
            }),
            _ => Err(ApiError::Decode(
                "响应中既没有 response 也没有 error 字段".to_string(),
            )),
        }
    }
}

/// 聊天结果
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    /// 正常回复
    Answer {
        text: String,
        tool_call: Option<ToolCall>,
    },
    /// 后端报告的业务错误
    Rejected(String),
}

impl ChatReply {
    /// 创建不带工具调用的回复
    pub fn answer(text: impl Into<String>) -> Self {
        Self::Answer {
            text: text.into(),
            tool_call: None,
        }
    }
}

/// 实验记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    /// 实验名称
    pub name: String,

    /// 实验状态（如 "running"、"done"）
    pub status: String,
}

impl ExperimentRecord {
    /// 创建实验记录
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }

    /// 列表中显示的文本，格式为 `名称 (状态)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.status)
    }
}
