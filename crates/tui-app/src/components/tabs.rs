//! Tab 切换组件
//!
//! 管理面板切换和标签栏渲染。

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Tabs as RatatuiTabs, Widget},
};

/// 面板类型
///
/// 每个变体既是标签（触发器），也是对应面板的标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppTab {
    Chat,        // 聊天
    Experiments, // 实验列表
}

impl AppTab {
    pub fn title(&self) -> &'static str {
        match self {
            AppTab::Chat => "[F1] 聊天",
            AppTab::Experiments => "[F2] 实验",
        }
    }

    pub fn all() -> &'static [AppTab] {
        &[AppTab::Chat, AppTab::Experiments]
    }

    pub fn index(&self) -> usize {
        match self {
            AppTab::Chat => 0,
            AppTab::Experiments => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(AppTab::Chat),
            1 => Some(AppTab::Experiments),
            _ => None,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            AppTab::Chat => AppTab::Experiments,
            AppTab::Experiments => AppTab::Chat,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            AppTab::Chat => AppTab::Experiments,
            AppTab::Experiments => AppTab::Chat,
        }
    }
}

/// 面板集合状态
///
/// 只保存当前选中的面板，标签高亮与面板可见性都由它推导，二者不会不一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabsState {
    current: AppTab,
}

impl Default for TabsState {
    fn default() -> Self {
        Self::new(AppTab::Chat)
    }
}

impl TabsState {
    /// 创建新的面板状态
    pub fn new(current: AppTab) -> Self {
        Self { current }
    }

    /// 当前选中的面板
    pub fn current(&self) -> AppTab {
        self.current
    }

    /// 选中面板，返回状态是否发生变化
    ///
    /// 重复选中当前面板不会改变任何状态。
    pub fn select(&mut self, tab: AppTab) -> bool {
        if self.current == tab {
            return false;
        }
        tracing::debug!("切换面板: {:?} -> {:?}", self.current, tab);
        self.current = tab;
        true
    }

    /// 切换到下一个面板
    pub fn next(&mut self) {
        self.select(self.current.next());
    }

    /// 切换到上一个面板
    pub fn previous(&mut self) {
        self.select(self.current.previous());
    }

    /// 标签是否处于激活状态
    pub fn is_active(&self, tab: AppTab) -> bool {
        self.current == tab
    }

    /// 面板是否可见
    pub fn is_visible(&self, tab: AppTab) -> bool {
        self.current == tab
    }
}

/// 标签栏组件
pub struct TabBar {
    state: TabsState,
}

impl TabBar {
    /// 创建标签栏
    pub fn new(state: TabsState) -> Self {
        Self { state }
    }

    fn titles(&self) -> Vec<&'static str> {
        AppTab::all().iter().map(|t| t.title()).collect()
    }
}

impl Widget for TabBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let index = self.state.current().index();

        let tabs = RatatuiTabs::new(self.titles())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Blue)),
            )
            .style(Style::default().fg(Color::White))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .select(index)
            .divider(" | ");

        tabs.render(area, buf);
    }
}
