//! TUI 应用模块
//!
//! 提供基于 Ratatui 的终端用户界面：聊天、实验列表以及二者之间的面板切换。

pub mod app;
pub mod chat_client;
pub mod components;
pub mod event;
pub mod ui;

#[cfg(test)]
mod testing;

pub use app::TuiApp;
pub use chat_client::{render_outcome, ChatClient, ERROR_PREFIX, NETWORK_ERROR_PREFIX};
pub use event::{AppError, AppResult, Event, EventHandler};

/// 运行 TUI 应用的便捷函数
pub use app::run_tui;
