//! 实验列表组件
//!
//! 显示启动时从后端加载的实验记录。

use api::{ApiError, ExperimentRecord};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

/// 加载失败时显示的占位条目
pub const LOAD_ERROR_PLACEHOLDER: &str = "Error loading experiments";

/// 加载状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Loaded,
    Failed,
}

impl LoadStatus {
    pub fn as_str(&self) -> &str {
        match self {
            LoadStatus::Loading => "加载中",
            LoadStatus::Loaded => "已加载",
            LoadStatus::Failed => "加载失败",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            LoadStatus::Loading => Color::Yellow,
            LoadStatus::Loaded => Color::Green,
            LoadStatus::Failed => Color::Red,
        }
    }
}

/// 实验列表状态
#[derive(Debug, Clone)]
pub struct ExperimentListState {
    /// 加载状态
    pub status: LoadStatus,
    /// 列表条目（已格式化）
    pub items: Vec<String>,
    /// 光标位置
    pub cursor: usize,
}

impl Default for ExperimentListState {
    fn default() -> Self {
        Self {
            status: LoadStatus::Loading,
            items: Vec::new(),
            cursor: 0,
        }
    }
}

impl ExperimentListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用加载结果整体替换列表
    ///
    /// 成功时每条记录一行，保持服务端顺序；失败时只保留一个占位条目。
    pub fn apply(&mut self, result: Result<Vec<ExperimentRecord>, ApiError>) {
        match result {
            Ok(records) => {
                self.items = records.iter().map(ExperimentRecord::label).collect();
                self.status = LoadStatus::Loaded;
            }
            Err(err) => {
                tracing::warn!("加载实验列表失败: {}", err);
                self.items = vec![LOAD_ERROR_PLACEHOLDER.to_string()];
                self.status = LoadStatus::Failed;
            }
        }
        self.cursor = 0;
    }

    /// 获取当前光标项
    pub fn get_current(&self) -> Option<&str> {
        self.items.get(self.cursor).map(String::as_str)
    }

    /// 移动光标向上
    pub fn move_up(&mut self) {
        if !self.items.is_empty() && self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    /// 移动光标向下
    pub fn move_down(&mut self) {
        if !self.items.is_empty() && self.cursor < self.items.len() - 1 {
            self.cursor += 1;
        }
    }
}

/// 实验列表组件
pub struct ExperimentList<'a> {
    /// 列表状态
    pub state: &'a ExperimentListState,
    /// 标题
    pub title: String,
    /// 边框样式
    pub border_style: Style,
}

impl<'a> ExperimentList<'a> {
    /// 创建新的实验列表
    pub fn new(state: &'a ExperimentListState) -> Self {
        Self {
            state,
            title: "实验".to_string(),
            border_style: Style::default().fg(Color::Blue),
        }
    }

    /// 设置标题
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// 设置边框样式
    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }
}

impl<'a> Widget for ExperimentList<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!("{} [{}]", self.title, self.state.status.as_str());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.border_style);

        if self.state.status == LoadStatus::Loading {
            Paragraph::new("正在加载实验列表...")
                .block(block)
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        }

        let item_style = Style::default().fg(self.state.status.color());
        let items: Vec<ListItem> = self
            .state
            .items
            .iter()
            .map(|label| ListItem::new(label.as_str()).style(item_style))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut list_state = ListState::default().with_selected(Some(self.state.cursor));
        StatefulWidget::render(list, area, buf, &mut list_state);
    }
}
