//! 聊天面板组件
//!
//! 提供聊天记录、输入框状态以及对应的渲染。

use std::borrow::Cow;
use std::cell::Cell;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// 输入框提示符
const INPUT_PROMPT: &str = "> ";

/// 控制字符的替代显示
const REPLACEMENT_CHAR: char = '\u{FFFD}';

const TAB_EXPANSION: &str = "    ";

/// 聊天记录来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// 用户发送
    User,
    /// 后端回复或客户端生成的提示
    System,
}

impl Origin {
    pub fn label(&self) -> &'static str {
        match self {
            Origin::User => "你",
            Origin::System => "助手",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Origin::User => Color::Cyan,
            Origin::System => Color::Green,
        }
    }
}

/// 聊天记录条目
///
/// 创建后不再修改，只按顺序追加。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub text: String,
    pub origin: Origin,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::User,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::System,
        }
    }

    /// 用于显示的文本
    ///
    /// 制表符展开为空格，其余除换行外的控制字符（ESC、BEL 等）替换为 U+FFFD，
    /// 不会原样写到终端。
    pub fn display_text(&self) -> Cow<'_, str> {
        if !self.text.chars().any(|c| c != '\n' && c.is_control()) {
            return Cow::Borrowed(&self.text);
        }

        let mut out = String::with_capacity(self.text.len());
        for c in self.text.chars() {
            match c {
                '\n' => out.push('\n'),
                '\t' => out.push_str(TAB_EXPANSION),
                '\r' => {}
                c if c.is_control() => out.push(REPLACEMENT_CHAR),
                c => out.push(c),
            }
        }
        Cow::Owned(out)
    }
}

/// 输入框状态
///
/// 光标位置按字符计数。禁用时所有编辑操作都被忽略。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    buffer: String,
    cursor: usize,
    enabled: bool,
    focused: bool,
}

impl Default for InputField {
    fn default() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            enabled: true,
            focused: true,
        }
    }
}

impl InputField {
    /// 输入框内容
    pub fn value(&self) -> &str {
        &self.buffer
    }

    /// 直接设置内容，光标移到末尾
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.buffer = value.into();
        self.cursor = self.buffer.chars().count();
    }

    /// 清空内容
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// 光标位置（字符索引）
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map_or(self.buffer.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    /// 在光标处插入字符
    pub fn insert_char(&mut self, c: char) {
        if !self.enabled {
            return;
        }
        let offset = self.byte_offset(self.cursor);
        self.buffer.insert(offset, c);
        self.cursor += 1;
    }

    /// 在光标处插入一段文本（粘贴）
    ///
    /// 输入框只有一行：换行和制表符变成空格，其余控制字符丢弃。
    pub fn insert_str(&mut self, text: &str) {
        if !self.enabled {
            return;
        }
        let cleaned: String = text
            .chars()
            .filter_map(|c| match c {
                '\n' | '\t' => Some(' '),
                '\r' => None,
                c if c.is_control() => None,
                c => Some(c),
            })
            .collect();
        let offset = self.byte_offset(self.cursor);
        self.buffer.insert_str(offset, &cleaned);
        self.cursor += cleaned.chars().count();
    }

    /// 退格
    pub fn backspace(&mut self) {
        if !self.enabled || self.cursor == 0 {
            return;
        }
        let offset = self.byte_offset(self.cursor - 1);
        self.buffer.remove(offset);
        self.cursor -= 1;
    }

    /// 删除光标处字符
    pub fn delete(&mut self) {
        if !self.enabled || self.cursor >= self.char_len() {
            return;
        }
        let offset = self.byte_offset(self.cursor);
        self.buffer.remove(offset);
    }

    pub fn move_left(&mut self) {
        if self.enabled && self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.enabled && self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        if self.enabled {
            self.cursor = 0;
        }
    }

    pub fn move_end(&mut self) {
        if self.enabled {
            self.cursor = self.char_len();
        }
    }
}

/// 聊天面板状态
#[derive(Debug, Clone, Default)]
pub struct ChatPanelState {
    /// 聊天记录（只追加）
    transcript: Vec<TranscriptEntry>,
    /// 输入框
    input: InputField,
    /// 底部隐藏的渲染行数，0 表示显示最新消息
    scroll_offset: usize,
    /// 上次渲染时可向上滚动的最大行数
    max_scroll: Cell<usize>,
    /// 上次渲染时消息区的高度
    viewport_height: Cell<u16>,
}

impl ChatPanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条记录并滚动到最新
    pub fn add_entry(&mut self, entry: TranscriptEntry) {
        self.transcript.push(entry);
        self.scroll_to_bottom();
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn input(&self) -> &InputField {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputField {
        &mut self.input
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// 向上滚动一行（查看更早的消息）
    pub fn scroll_up(&mut self) {
        self.scroll_up_by(1);
    }

    /// 向下滚动一行
    pub fn scroll_down(&mut self) {
        self.scroll_down_by(1);
    }

    /// 向上翻一页
    pub fn page_up(&mut self) {
        self.scroll_up_by(self.page_size());
    }

    /// 向下翻一页
    pub fn page_down(&mut self) {
        self.scroll_down_by(self.page_size());
    }

    /// 向上滚动若干行，不超过上次渲染得到的上限
    pub fn scroll_up_by(&mut self, lines: usize) {
        self.scroll_offset = self
            .scroll_offset
            .saturating_add(lines)
            .min(self.max_scroll.get());
    }

    pub fn scroll_down_by(&mut self, lines: usize) {
        self.scroll_offset = self
            .scroll_offset
            .min(self.max_scroll.get())
            .saturating_sub(lines);
    }

    fn page_size(&self) -> usize {
        usize::from(self.viewport_height.get().max(1))
    }

    /// 记录渲染结果，供后续滚动计算上限
    fn record_layout(&self, max_scroll: usize, viewport_height: u16) {
        self.max_scroll.set(max_scroll);
        self.viewport_height.set(viewport_height);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }
}

/// 面板内部布局：消息区 + 输入区
fn split_inner(inner: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(inner);
    (chunks[0], chunks[1])
}

/// 输入文本所在的单行区域
fn input_line(input_area: Rect) -> Rect {
    Rect {
        x: input_area.x,
        y: input_area.y.saturating_add(1),
        width: input_area.width,
        height: input_area.height.saturating_sub(1),
    }
}

fn entry_lines(entry: &TranscriptEntry) -> Vec<Line<'static>> {
    let style = Style::default().fg(entry.origin.color());
    let text = entry.display_text();
    let mut lines = Vec::new();

    for (i, part) in text.split('\n').enumerate() {
        if i == 0 {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} › ", entry.origin.label()),
                    style.add_modifier(Modifier::BOLD),
                ),
                Span::styled(part.to_string(), style),
            ]));
        } else {
            lines.push(Line::from(Span::styled(part.to_string(), style)));
        }
    }

    lines
}

/// 聊天面板组件
pub struct ChatPanel<'a> {
    /// 聊天面板状态
    pub state: &'a ChatPanelState,
    /// 标题
    pub title: String,
    /// 边框样式
    pub border_style: Style,
}

impl<'a> ChatPanel<'a> {
    /// 创建新的聊天面板
    pub fn new(state: &'a ChatPanelState) -> Self {
        Self {
            state,
            title: "聊天".to_string(),
            border_style: Style::default().fg(Color::Gray),
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

    /// 计算输入光标在屏幕上的位置
    ///
    /// 输入框禁用或失去焦点时不显示光标。
    pub fn cursor_position(state: &ChatPanelState, area: Rect) -> Option<Position> {
        let input = state.input();
        if !input.is_enabled() || !input.is_focused() {
            return None;
        }

        let inner = Block::default().borders(Borders::ALL).inner(area);
        let (_, input_area) = split_inner(inner);
        let line = input_line(input_area);
        if line.height == 0 {
            return None;
        }

        let before: String = input.value().chars().take(input.cursor()).collect();
        let offset = Line::from(format!("{}{}", INPUT_PROMPT, before)).width() as u16;
        let x = line
            .x
            .saturating_add(offset)
            .min(line.right().saturating_sub(1));
        Some(Position::new(x, line.y))
    }

    /// 渲染消息列表
    ///
    /// 整个记录按区域宽度折行后，显示底部往上第 `scroll_offset` 行结束的一屏。
    fn render_message_list(&self, area: Rect, buf: &mut Buffer) {
        let transcript = self.state.transcript();

        if transcript.is_empty() {
            let text = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "开始聊天",
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled("提示: ", Style::default().fg(Color::Gray)),
                    Span::styled(
                        "在下方输入消息，按 Enter 发送",
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
            ];

            Paragraph::new(text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(area, buf);
            return;
        }

        let lines: Vec<Line> = transcript.iter().flat_map(entry_lines).collect();
        let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });

        let total = paragraph.line_count(area.width);
        let max_scroll = total.saturating_sub(usize::from(area.height));
        self.state.record_layout(max_scroll, area.height);

        let offset = self.state.scroll_offset().min(max_scroll);
        let top = u16::try_from(max_scroll - offset).unwrap_or(u16::MAX);
        paragraph.scroll((top, 0)).render(area, buf);
    }

    /// 渲染输入框
    fn render_input_box(&self, area: Rect, buf: &mut Buffer) {
        let input = self.state.input();

        let rule = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray));
        rule.render(area, buf);

        let line = if input.is_enabled() {
            Line::from(vec![
                Span::styled(INPUT_PROMPT, Style::default().fg(Color::Yellow)),
                Span::styled(input.value(), Style::default().fg(Color::White)),
            ])
        } else {
            Line::from(vec![
                Span::styled(INPUT_PROMPT, Style::default().fg(Color::DarkGray)),
                Span::styled("等待回复中...", Style::default().fg(Color::DarkGray)),
            ])
        };

        Paragraph::new(line)
            .alignment(Alignment::Left)
            .render(input_line(area), buf);
    }
}

impl<'a> Widget for ChatPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title.clone())
            .borders(Borders::ALL)
            .border_style(self.border_style);
        let inner_area = block.inner(area);
        block.render(area, buf);

        let (messages_area, input_area) = split_inner(inner_area);
        self.render_message_list(messages_area, buf);
        self.render_input_box(input_area, buf);
    }
}
