//! TUI 应用主逻辑
//!
//! 管理应用状态和主事件循环。

use crate::chat_client::ChatClient;
use crate::components::{AppTab, ExperimentListState, TabsState};
use crate::event::{AppResult, Event, EventHandler};
use api::{ApiError, RemoteService};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::Stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// 事件通道容量
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// 界面刷新间隔
const TICK_RATE: Duration = Duration::from_millis(250);

/// 终端模式守卫
///
/// 进入 raw mode 后立即创建，析构时关闭 raw mode、离开备用屏幕并显示光标。
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> AppResult<Self> {
        crossterm::terminal::enable_raw_mode()?;
        let guard = TerminalGuard;
        crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::EnterAlternateScreen,
            crossterm::event::EnableBracketedPaste
        )?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = crossterm::terminal::disable_raw_mode() {
            tracing::warn!("关闭 raw mode 失败: {}", err);
        }
        if let Err(err) = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::DisableBracketedPaste,
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        ) {
            tracing::warn!("恢复终端失败: {}", err);
        }
    }
}

/// TUI 应用
///
/// 页面上所有可变状态都归它所有，每次运行只创建一个。
pub struct TuiApp {
    /// 远程服务
    service: Arc<dyn RemoteService>,
    /// 后端地址（仅用于显示）
    base_url: String,
    /// 面板切换状态
    tabs: TabsState,
    /// 聊天会话
    chat: ChatClient,
    /// 实验列表状态
    experiments: ExperimentListState,
    /// 实验列表是否已经请求过
    experiments_requested: bool,
    /// 事件发送器（分发给后台任务）
    event_tx: mpsc::Sender<Event>,
    /// 事件接收器
    event_rx: mpsc::Receiver<Event>,
    /// 运行状态
    running: bool,
}

impl TuiApp {
    /// 创建新的 TUI 应用
    pub fn new(service: Arc<dyn RemoteService>, base_url: impl Into<String>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            service,
            base_url: base_url.into(),
            tabs: TabsState::default(),
            chat: ChatClient::new(),
            experiments: ExperimentListState::new(),
            experiments_requested: false,
            event_tx,
            event_rx,
            running: true,
        }
    }

    /// 运行应用
    pub async fn run(&mut self) -> AppResult<()> {
        // guard 析构时恢复终端，初始化中途失败也一样
        let _guard = TerminalGuard::enter()?;

        let backend = CrosstermBackend::new(std::io::stdout());
        let mut terminal = Terminal::new(backend)?;

        self.event_loop(&mut terminal).await
    }

    async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> AppResult<()> {
        // 启动键盘监听
        let keyboard = EventHandler::new(self.event_tx.clone());
        tokio::spawn(async move {
            if let Err(err) = keyboard.run_keyboard_listener().await {
                tracing::error!("键盘监听退出: {}", err);
            }
        });

        // 启动定时器
        let ticker = EventHandler::new(self.event_tx.clone());
        tokio::spawn(async move {
            if let Err(err) = ticker.run_ticker(TICK_RATE).await {
                tracing::debug!("定时器退出: {}", err);
            }
        });

        self.load_experiments();

        while self.running {
            terminal.draw(|f| {
                crate::ui::draw_ui(f, self);
            })?;

            match self.next_event().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }

        Ok(())
    }

    /// 等待下一个事件
    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    /// 加载实验列表
    ///
    /// 每次运行只发出一次请求，失败不重试。
    pub fn load_experiments(&mut self) {
        if self.experiments_requested {
            tracing::debug!("实验列表已请求过，跳过");
            return;
        }
        self.experiments_requested = true;

        let service = self.service.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = service.experiments().await;
            if tx.send(Event::ExperimentsLoaded(result)).await.is_err() {
                tracing::warn!("事件通道已关闭，丢弃实验列表结果");
            }
        });
    }

    /// 发送输入框中的聊天消息
    fn submit_chat(&mut self) {
        if let Some(text) = self.chat.begin_send() {
            self.spawn_chat_request(text);
        }
    }

    /// 在后台任务中发出聊天请求
    ///
    /// 请求任务 panic 或被取消时同样回报一个失败结果，保证输入框一定会被恢复。
    fn spawn_chat_request(&self, text: String) {
        let service = self.service.clone();
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let request = tokio::spawn(async move { service.chat(&text).await });
            let outcome = match request.await {
                Ok(outcome) => outcome,
                Err(err) => Err(ApiError::Aborted(err.to_string())),
            };

            if tx.send(Event::ChatCompleted(outcome)).await.is_err() {
                tracing::warn!("事件通道已关闭，丢弃聊天结果");
            }
        });
    }

    /// 分发事件
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Input(key_event) => self.handle_key_event(key_event),
            Event::Paste(content) => self.handle_paste_event(&content),
            Event::ChatCompleted(outcome) => self.chat.complete_send(outcome),
            Event::ExperimentsLoaded(result) => self.experiments.apply(result),
            Event::Tick => {}
        }
    }

    /// 处理键盘事件
    pub fn handle_key_event(&mut self, key_event: KeyEvent) {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
        let on_chat = self.tabs.is_visible(AppTab::Chat);

        match key_event.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.running = false;
            }
            KeyCode::Tab => self.tabs.next(),
            KeyCode::BackTab => self.tabs.previous(),
            KeyCode::F(1) => {
                self.tabs.select(AppTab::Chat);
            }
            KeyCode::F(2) => {
                self.tabs.select(AppTab::Experiments);
            }
            // 聊天面板
            KeyCode::Enter if on_chat && !key_event.modifiers.contains(KeyModifiers::SHIFT) => {
                self.submit_chat();
            }
            KeyCode::Backspace if on_chat => self.chat.panel_mut().input_mut().backspace(),
            KeyCode::Delete if on_chat => self.chat.panel_mut().input_mut().delete(),
            KeyCode::Left if on_chat => self.chat.panel_mut().input_mut().move_left(),
            KeyCode::Right if on_chat => self.chat.panel_mut().input_mut().move_right(),
            KeyCode::Home if on_chat => self.chat.panel_mut().input_mut().move_home(),
            KeyCode::End if on_chat => self.chat.panel_mut().input_mut().move_end(),
            KeyCode::Up if on_chat => self.chat.panel_mut().scroll_up(),
            KeyCode::Down if on_chat => self.chat.panel_mut().scroll_down(),
            KeyCode::PageUp if on_chat => self.chat.panel_mut().page_up(),
            KeyCode::PageDown if on_chat => self.chat.panel_mut().page_down(),
            KeyCode::Char(c) if on_chat && !ctrl => {
                self.chat.panel_mut().input_mut().insert_char(c);
            }
            // 实验面板
            KeyCode::Up if !on_chat => self.experiments.move_up(),
            KeyCode::Down if !on_chat => self.experiments.move_down(),
            KeyCode::Char('q') if !on_chat => {
                self.running = false;
            }
            _ => {}
        }
    }

    /// 处理粘贴事件
    fn handle_paste_event(&mut self, content: &str) {
        if self.tabs.is_visible(AppTab::Chat) {
            self.chat.panel_mut().input_mut().insert_str(content);
        }
    }

    /// 后端地址
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 面板切换状态
    pub fn tabs(&self) -> TabsState {
        self.tabs
    }

    /// 聊天会话
    pub fn chat(&self) -> &ChatClient {
        &self.chat
    }

    /// 实验列表状态
    pub fn experiments(&self) -> &ExperimentListState {
        &self.experiments
    }

    /// 是否仍在运行
    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// 运行 TUI 应用的便捷函数
pub async fn run_tui(service: Arc<dyn RemoteService>, base_url: impl Into<String>) -> AppResult<()> {
    let mut app = TuiApp::new(service, base_url);
    app.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{LoadStatus, Origin, TranscriptEntry, LOAD_ERROR_PLACEHOLDER};
    use crate::testing::ScriptedService;
    use api::{ChatReply, ExperimentRecord};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut TuiApp, text: &str) {
        for c in text.chars() {
            app.handle_key_event(key(KeyCode::Char(c)));
        }
    }

    async fn pump(app: &mut TuiApp) {
        let event = app.next_event().await.expect("event channel closed");
        app.handle_event(event);
    }

    #[test]
    fn test_terminal_guard_leaves_raw_mode() {
        // 没有 tty 时 enter 直接失败；有 tty 时 drop 必须恢复
        if let Ok(guard) = TerminalGuard::enter() {
            assert!(crossterm::terminal::is_raw_mode_enabled().unwrap_or(true));
            drop(guard);
        }
        assert!(!crossterm::terminal::is_raw_mode_enabled().unwrap_or(false));
    }

    #[tokio::test]
    async fn test_page_keys_scroll_transcript() {
        let service = Arc::new(ScriptedService::new());
        let mut app = TuiApp::new(service, "http://test");
        for i in 0..40 {
            app.chat.panel_mut().add_entry(TranscriptEntry::system(format!("m{}", i)));
        }

        let area = ratatui::layout::Rect::new(0, 0, 30, 12);
        let mut buf = ratatui::buffer::Buffer::empty(area);
        ratatui::widgets::Widget::render(
            crate::components::ChatPanel::new(app.chat().panel()),
            area,
            &mut buf,
        );

        app.handle_key_event(key(KeyCode::PageUp));
        assert_eq!(app.chat().panel().scroll_offset(), 8);
        app.handle_key_event(key(KeyCode::Down));
        assert_eq!(app.chat().panel().scroll_offset(), 7);
        app.handle_key_event(key(KeyCode::PageDown));
        assert_eq!(app.chat().panel().scroll_offset(), 0);
    }

    #[tokio::test]
    async fn test_chat_round_trip_through_events() {
        let service = Arc::new(ScriptedService::new().with_chat(Ok(ChatReply::answer("ok"))));
        let mut app = TuiApp::new(service.clone(), "http://test");

        type_text(&mut app, "hello");
        app.handle_key_event(key(KeyCode::Enter));

        // 请求在途：输入框禁用
        assert!(app.chat().is_busy());
        assert!(!app.chat().panel().input().is_enabled());
        assert_eq!(app.chat().panel().transcript(), &[TranscriptEntry::user("hello")]);

        pump(&mut app).await;

        assert!(!app.chat().is_busy());
        assert!(app.chat().panel().input().is_enabled());
        assert!(app.chat().panel().input().is_focused());
        assert_eq!(
            app.chat().panel().transcript(),
            &[TranscriptEntry::user("hello"), TranscriptEntry::system("ok")]
        );
        assert_eq!(service.chat_messages(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_enter_on_blank_input_sends_nothing() {
        let service = Arc::new(ScriptedService::new());
        let mut app = TuiApp::new(service.clone(), "http://test");

        type_text(&mut app, "   ");
        app.handle_key_event(key(KeyCode::Enter));

        assert!(!app.chat().is_busy());
        assert!(app.chat().panel().transcript().is_empty());
        assert_eq!(service.chat_calls(), 0);
    }

    #[tokio::test]
    async fn test_typing_ignored_while_in_flight() {
        let service = Arc::new(ScriptedService::new().with_chat(Ok(ChatReply::answer("ok"))));
        let mut app = TuiApp::new(service.clone(), "http://test");

        type_text(&mut app, "first");
        app.handle_key_event(key(KeyCode::Enter));
        type_text(&mut app, "second");
        app.handle_key_event(key(KeyCode::Enter));

        pump(&mut app).await;
        assert_eq!(service.chat_calls(), 1);
        assert!(app.chat().panel().input().value().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_restores_input() {
        let service = Arc::new(
            ScriptedService::new().with_chat(Err(ApiError::Connect("refused".to_string()))),
        );
        let mut app = TuiApp::new(service, "http://test");

        type_text(&mut app, "hi");
        app.handle_key_event(key(KeyCode::Enter));
        pump(&mut app).await;

        let transcript = app.chat().panel().transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].origin, Origin::System);
        assert!(transcript[1].text.starts_with("Network Error: "));
        assert!(app.chat().panel().input().is_enabled());
    }

    #[tokio::test]
    async fn test_tabs_switch_while_chat_in_flight() {
        let service = Arc::new(ScriptedService::new().with_chat(Ok(ChatReply::answer("ok"))));
        let mut app = TuiApp::new(service, "http://test");

        type_text(&mut app, "hi");
        app.handle_key_event(key(KeyCode::Enter));
        app.handle_key_event(key(KeyCode::F(2)));
        assert!(app.tabs().is_visible(AppTab::Experiments));

        pump(&mut app).await;
        assert_eq!(app.chat().panel().transcript().len(), 2);
        assert!(app.tabs().is_visible(AppTab::Experiments));
    }

    #[tokio::test]
    async fn test_chars_not_typed_on_experiments_tab() {
        let service = Arc::new(ScriptedService::new());
        let mut app = TuiApp::new(service, "http://test");

        app.handle_key_event(key(KeyCode::Tab));
        type_text(&mut app, "abc");
        assert!(app.chat().panel().input().value().is_empty());

        app.handle_key_event(key(KeyCode::Char('q')));
        assert!(!app.is_running());
    }

    #[tokio::test]
    async fn test_q_types_on_chat_tab() {
        let service = Arc::new(ScriptedService::new());
        let mut app = TuiApp::new(service, "http://test");

        type_text(&mut app, "q");
        assert!(app.is_running());
        assert_eq!(app.chat().panel().input().value(), "q");

        app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.is_running());
    }

    #[tokio::test]
    async fn test_paste_goes_to_chat_input() {
        let service = Arc::new(ScriptedService::new());
        let mut app = TuiApp::new(service, "http://test");

        app.handle_event(Event::Paste("粘贴内容".to_string()));
        assert_eq!(app.chat().panel().input().value(), "粘贴内容");
    }

    #[tokio::test]
    async fn test_experiments_loaded_once() {
        let service = Arc::new(ScriptedService::new().with_experiments(Ok(vec![
            ExperimentRecord::new("A", "running"),
            ExperimentRecord::new("B", "done"),
        ])));
        let mut app = TuiApp::new(service.clone(), "http://test");

        app.load_experiments();
        app.load_experiments();
        pump(&mut app).await;

        assert_eq!(service.experiment_calls(), 1);
        assert_eq!(app.experiments().status, LoadStatus::Loaded);
        assert_eq!(app.experiments().items, vec!["A (running)", "B (done)"]);
    }

    #[tokio::test]
    async fn test_experiments_failure_placeholder() {
        let service = Arc::new(
            ScriptedService::new().with_experiments(Err(ApiError::Decode("html".to_string()))),
        );
        let mut app = TuiApp::new(service, "http://test");

        app.load_experiments();
        pump(&mut app).await;

        assert_eq!(app.experiments().status, LoadStatus::Failed);
        assert_eq!(app.experiments().items, vec![LOAD_ERROR_PLACEHOLDER]);
    }
}
