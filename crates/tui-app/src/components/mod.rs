//! UI 组件模块
//!
//! 包含各种可复用的 UI 组件。

pub mod chat_panel;
pub mod experiment_list;
pub mod tabs;

pub use chat_panel::{ChatPanel, ChatPanelState, InputField, Origin, TranscriptEntry};
pub use experiment_list::{ExperimentList, ExperimentListState, LoadStatus, LOAD_ERROR_PLACEHOLDER};
pub use tabs::{AppTab, TabBar, TabsState};
