//! 测试用的内存远程服务

use api::{ApiError, ChatReply, ExperimentRecord, RemoteService};
use std::collections::VecDeque;
use std::sync::Mutex;

/// 按预设脚本返回结果的远程服务
#[derive(Debug, Default)]
pub struct ScriptedService {
    chat_replies: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    chat_messages: Mutex<Vec<String>>,
    experiments: Mutex<VecDeque<Result<Vec<ExperimentRecord>, ApiError>>>,
    experiment_calls: Mutex<usize>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat(self, reply: Result<ChatReply, ApiError>) -> Self {
        self.chat_replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn with_experiments(self, result: Result<Vec<ExperimentRecord>, ApiError>) -> Self {
        self.experiments.lock().unwrap().push_back(result);
        self
    }

    /// 收到的聊天消息
    pub fn chat_messages(&self) -> Vec<String> {
        self.chat_messages.lock().unwrap().clone()
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_messages.lock().unwrap().len()
    }

    pub fn experiment_calls(&self) -> usize {
        *self.experiment_calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl RemoteService for ScriptedService {
    async fn chat(&self, message: &str) -> api::Result<ChatReply> {
        self.chat_messages.lock().unwrap().push(message.to_string());
        self.chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("没有预设的回复".to_string())))
    }

    async fn experiments(&self) -> api::Result<Vec<ExperimentRecord>> {
        *self.experiment_calls.lock().unwrap() += 1;
        self.experiments
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
