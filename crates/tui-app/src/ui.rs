//! UI 渲染模块
//!
//! 负责整个应用的 UI 渲染。

use crate::components::{AppTab, ChatPanel, ExperimentList, TabBar};
use crate::TuiApp;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// 绘制 UI
pub fn draw_ui(f: &mut Frame, app: &TuiApp) {
    let size = f.area();

    // 主布局：header, tabs, body, footer
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(size);

    draw_header(f, main_chunks[0], app);
    f.render_widget(TabBar::new(app.tabs()), main_chunks[1]);

    // 只绘制当前可见的面板
    match app.tabs().current() {
        AppTab::Chat => draw_chat_panel(f, main_chunks[2], app),
        AppTab::Experiments => draw_experiment_panel(f, main_chunks[2], app),
    }

    draw_footer(f, main_chunks[3], app);
}

/// 绘制 Header
fn draw_header(f: &mut Frame, area: Rect, app: &TuiApp) {
    let mut spans = vec![
        Span::styled(
            "DataPilot",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("后端: {}", app.base_url()),
            Style::default().fg(Color::Green),
        ),
    ];

    if app.chat().is_busy() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("请求中...", Style::default().fg(Color::Yellow)));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .alignment(Alignment::Left);

    f.render_widget(header, area);
}

/// 绘制聊天面板
fn draw_chat_panel(f: &mut Frame, area: Rect, app: &TuiApp) {
    let state = app.chat().panel();
    let chat_panel = ChatPanel::new(state)
        .title("聊天")
        .border_style(Style::default().fg(Color::Green));

    f.render_widget(chat_panel, area);

    if let Some(position) = ChatPanel::cursor_position(state, area) {
        f.set_cursor_position(position);
    }
}

/// 绘制实验列表面板
fn draw_experiment_panel(f: &mut Frame, area: Rect, app: &TuiApp) {
    let list = ExperimentList::new(app.experiments())
        .title("实验列表")
        .border_style(Style::default().fg(Color::Green));

    f.render_widget(list, area);
}

/// 绘制 Footer
fn draw_footer(f: &mut Frame, area: Rect, app: &TuiApp) {
    let help_keys = match app.tabs().current() {
        AppTab::Chat => "[输入文字] 打字 [Enter] 发送 [↑↓] 滚动 | [Ctrl+C] 退出",
        AppTab::Experiments => "[↑↓] 选择 | [q] 退出",
    };
    let help_text = format!("[Tab/F1/F2] 切换面板 | {}", help_keys);

    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);

    f.render_widget(footer, area);
}
