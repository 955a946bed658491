//! 事件处理模块
//!
//! 处理键盘输入、定时刷新以及网络请求完成事件。

use api::{ApiError, ChatReply, ExperimentRecord};
use crossterm::event::{KeyEvent, KeyEventKind};
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

/// 应用事件
#[derive(Debug, Clone)]
pub enum Event {
    /// 键盘输入事件
    Input(KeyEvent),
    /// 粘贴事件
    Paste(String),
    /// 聊天请求完成（成功或失败）
    ChatCompleted(Result<ChatReply, ApiError>),
    /// 实验列表加载完成
    ExperimentsLoaded(Result<Vec<ExperimentRecord>, ApiError>),
    /// 定时刷新事件
    Tick,
}

/// 事件处理器
pub struct EventHandler {
    /// 事件发送器
    pub tx: tokio::sync::mpsc::Sender<Event>,
}

impl EventHandler {
    /// 创建新的事件处理器
    pub fn new(tx: tokio::sync::mpsc::Sender<Event>) -> Self {
        Self { tx }
    }

    /// 启动键盘输入监听
    pub async fn run_keyboard_listener(&self) -> AppResult<()> {
        let mut reader = crossterm::event::EventStream::new();

        while let Some(event) = reader.next().await {
            match event {
                Ok(crossterm::event::Event::Key(key_event)) => {
                    // 只处理按键按下事件，忽略重复和释放事件
                    if key_event.kind == KeyEventKind::Press {
                        self.tx.send(Event::Input(key_event)).await?;
                    }
                }
                Ok(crossterm::event::Event::Paste(content)) => {
                    self.tx.send(Event::Paste(content)).await?;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!("键盘事件错误: {:?}", err);
                    return Err(AppError::Io(err));
                }
            }
        }

        Ok(())
    }

    /// 启动定时器
    pub async fn run_ticker(&self, tick_rate: Duration) -> AppResult<()> {
        let mut interval = tokio::time::interval(tick_rate);

        loop {
            interval.tick().await;
            self.tx.send(Event::Tick).await?;
        }
    }
}

/// 应用错误类型
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("发送错误: {0}")]
    Send(String),

    #[error("接口错误: {0}")]
    Api(#[from] ApiError),
}

impl From<tokio::sync::mpsc::error::SendError<Event>> for AppError {
    fn from(err: tokio::sync::mpsc::error::SendError<Event>) -> Self {
        AppError::Send(err.to_string())
    }
}

/// 应用结果类型
pub type AppResult<T> = Result<T, AppError>;
