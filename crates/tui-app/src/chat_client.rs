//! 聊天会话客户端
//!
//! 负责一次只允许一个请求在途的聊天收发流程：
//! 记录用户消息、禁用输入框、等待回复、写入回复并恢复输入框。

use crate::components::{ChatPanelState, TranscriptEntry};
use api::{ApiError, ChatReply, RemoteService};

/// 业务错误前缀
pub const ERROR_PREFIX: &str = "Error: ";

/// 请求失败前缀
pub const NETWORK_ERROR_PREFIX: &str = "Network Error: ";

/// 将请求结果转换为要显示的文本
pub fn render_outcome(outcome: &Result<ChatReply, ApiError>) -> String {
    match outcome {
        Ok(ChatReply::Answer { text, .. }) => text.clone(),
        Ok(ChatReply::Rejected(error)) => format!("{}{}", ERROR_PREFIX, error),
        Err(err) => format!("{}{}", NETWORK_ERROR_PREFIX, err),
    }
}

/// 聊天会话客户端
///
/// 持有聊天面板状态以及显式的 `busy` 标志。`busy` 为真时拒绝新的发送，
/// 不依赖输入框是否被禁用。
#[derive(Debug, Clone, Default)]
pub struct ChatClient {
    panel: ChatPanelState,
    busy: bool,
}

impl ChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否有请求在途
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn panel(&self) -> &ChatPanelState {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ChatPanelState {
        &mut self.panel
    }

    /// 开始一次发送
    ///
    /// 读取输入框内容（去除首尾空白）。内容为空或已有请求在途时返回 `None`，不产生任何副作用。
    /// 否则依次：追加用户消息、清空输入框、禁用输入框、标记忙碌，并返回要发送的文本。
    pub fn begin_send(&mut self) -> Option<String> {
        if self.busy {
            tracing::warn!("已有聊天请求在途，忽略本次发送");
            return None;
        }

        let text = self.panel.input().value().trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.panel.add_entry(TranscriptEntry::user(text.clone()));
        let input = self.panel.input_mut();
        input.clear();
        input.set_enabled(false);
        self.busy = true;

        tracing::debug!("开始发送聊天消息，长度 {} 字符", text.chars().count());
        Some(text)
    }

    /// 完成一次发送
    ///
    /// 无论成功失败都会写入一条系统消息，然后恢复输入框并聚焦。
    pub fn complete_send(&mut self, outcome: Result<ChatReply, ApiError>) {
        if !self.busy {
            tracing::warn!("收到没有对应请求的聊天结果，已忽略");
            return;
        }

        match &outcome {
            Ok(ChatReply::Answer { tool_call: Some(call), .. }) => {
                tracing::info!("收到回复（工具调用: {}）", call.name);
            }
            Ok(ChatReply::Answer { .. }) => tracing::info!("收到回复"),
            Ok(ChatReply::Rejected(error)) => tracing::warn!("后端返回错误: {}", error),
            Err(err) => tracing::error!("聊天请求失败: {}", err),
        }

        self.panel.add_entry(TranscriptEntry::system(render_outcome(&outcome)));
        self.release();
    }

    fn release(&mut self) {
        self.busy = false;
        let input = self.panel.input_mut();
        input.set_enabled(true);
        input.focus();
    }

    /// 发送输入框中的消息并等待回复
    ///
    /// 返回是否真正发出了请求。
    pub async fn send_message(&mut self, service: &dyn RemoteService) -> bool {
        let Some(text) = self.begin_send() else {
            return false;
        };

        let outcome = service.chat(&text).await;
        self.complete_send(outcome);
        true
    }
}
