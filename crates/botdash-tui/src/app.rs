//! App: the single-owner event loop.
//!
//! Architecture:
//! - `App` owns the components and `AppState` (controllers plus UI mode).
//! - A `tokio::mpsc` channel carries `AppMessage`s in from the terminal
//!   reader, request tasks and the push channel.
//! - Timers and messages are handled one at a time inside `tokio::select!`,
//!   so controller state is never shared across tasks.
//! - Components return `Vec<Action>`; controllers return `Vec<Effect>`;
//!   the App turns effects into spawned requests, room emissions and toasts.

use std::io;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use botdash_proto::client::ApiClient;
use botdash_proto::config::PollingConfig;

use crate::{
    action::{Action, ComponentId, Workspace},
    app_state::AppState,
    component::Component,
    components::{
        guild_list::{ChannelList, GuildList},
        log_panel::LogPanel,
        queue_panel::QueuePanel,
        search_panel::SearchPanel,
        status_panel::StatusPanel,
    },
    core::{self, Effect, Outcome, Request},
    error::ValidationError,
    focus::FocusRing,
    push::{self, PushHandle, PushMessage},
    session_ctl::SEEK_STEP_SECS,
    theme::C_BG,
    widgets::{
        status_bar::{self, InputMode},
        text_prompt::{PromptAction, PromptKind, TextPrompt},
        toast::ToastManager,
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

pub enum AppMessage {
    Event(Event),
    /// A spawned request finished.
    Outcome(Outcome),
    /// Result of the one-shot push connect attempt.
    PushConnected(anyhow::Result<(PushHandle, mpsc::Receiver<PushMessage>)>),
    Push(PushMessage),
}

impl From<Outcome> for AppMessage {
    fn from(outcome: Outcome) -> Self {
        AppMessage::Outcome(outcome)
    }
}

const TOAST_TICK_MS: u64 = 100;

/// `tokio::time::interval` panics on a zero period.
fn timer(period_ms: u64) -> Interval {
    let mut t = interval(Duration::from_millis(period_ms.max(1)));
    t.set_missed_tick_behavior(MissedTickBehavior::Skip);
    t
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub state: AppState,

    // ── Components ────────────────────────────────────────────────────────────
    status_panel: StatusPanel,
    log_panel: LogPanel,
    guild_list: GuildList,
    channel_list: ChannelList,
    queue_panel: QueuePanel,
    search_panel: SearchPanel,
    prompt: TextPrompt,
    toast: ToastManager,
    focus: FocusRing,

    // ── I/O ───────────────────────────────────────────────────────────────────
    client: ApiClient,
    polling: PollingConfig,
    push_url: Option<String>,
    push: Option<PushHandle>,
    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,

    should_quit: bool,
}

impl App {
    pub fn new(
        client: ApiClient,
        state: AppState,
        polling: PollingConfig,
        push_url: Option<String>,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<AppMessage>(1024);
        let focus = FocusRing::new(state.workspace.panes());
        Self {
            state,
            status_panel: StatusPanel::new(),
            log_panel: LogPanel::new(),
            guild_list: GuildList::new(),
            channel_list: ChannelList::new(),
            queue_panel: QueuePanel::new(),
            search_panel: SearchPanel::new(),
            prompt: TextPrompt::new(),
            toast: ToastManager::new(),
            focus,
            client,
            polling,
            push_url,
            push: None,
            tx,
            rx: Some(rx),
            should_quit: false,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let Some(mut rx) = self.rx.take() else {
            anyhow::bail!("event loop already started");
        };

        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: push channel ─────────────────────────────────────
        if let Some(url) = self.push_url.clone() {
            let push_tx = self.tx.clone();
            tokio::spawn(async move {
                let result = push::connect(&url).await;
                let _ = push_tx.send(AppMessage::PushConnected(result)).await;
            });
        }

        self.startup();

        // ── Periodic timers ───────────────────────────────────────────────────
        let mut status_tick = timer(self.polling.status_interval_ms);
        let mut log_tick = timer(self.polling.log_tail_interval_ms);
        let mut playlist_tick = timer(self.polling.playlist_interval_ms);
        let mut toast_tick = timer(TOAST_TICK_MS);

        // ── Main loop ─────────────────────────────────────────────────────────
        loop {
            terminal.draw(|f| self.draw(f))?;
            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => self.handle_message(msg),
                _ = status_tick.tick() => {
                    if let Some(req) = self.state.monitor.tick() {
                        self.spawn(req);
                    }
                }
                _ = log_tick.tick() => {
                    if let Some(req) = self.state.log.tick() {
                        self.spawn(req);
                    }
                }
                _ = playlist_tick.tick() => {
                    if let Some(req) = self.state.bot.tick() {
                        self.spawn(req);
                    }
                }
                _ = toast_tick.tick() => self.toast.tick(),
            }

            if self.should_quit {
                break;
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        self.state.monitor.stop();
        self.state.log.disconnect();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        info!("botdash exiting");

        Ok(())
    }

    /// Kick off polling and the log tail, then pick the persisted guild back up.
    fn startup(&mut self) {
        if let Some(req) = self.state.monitor.start() {
            self.spawn(req);
        }
        if self.state.log.connect() {
            if let Some(req) = self.state.log.tick() {
                self.spawn(req);
            }
        }
        let effects = self.state.bot.restore();
        self.run_effects(effects);
    }

    // ── Effects ───────────────────────────────────────────────────────────────

    fn spawn(&self, request: Request) {
        core::spawn_request(&self.client, request, self.tx.clone());
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Http(req) => self.spawn(req),
                Effect::Room(req) => match &self.push {
                    Some(handle) => {
                        if !handle.emit(req) {
                            debug!("push writer gone, room request dropped");
                        }
                    }
                    None => debug!("no push channel, room request dropped"),
                },
                Effect::Notify(notice) => self.toast.push(notice.message, notice.severity),
            }
        }
    }

    fn submit(&mut self, request: Result<Request, ValidationError>) {
        match request {
            Ok(req) => self.spawn(req),
            Err(e) => {
                debug!("rejected input: {}", e);
                self.toast.error(e.to_string());
            }
        }
    }

    // ── Messages ──────────────────────────────────────────────────────────────

    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind == KeyEventKind::Release {
                    return;
                }
                for action in self.handle_key(key) {
                    self.dispatch(action);
                }
            }
            AppMessage::Event(Event::Mouse(mouse)) => {
                for action in self.handle_mouse(mouse) {
                    self.dispatch(action);
                }
            }
            AppMessage::Event(_) => {}
            AppMessage::Outcome(outcome) => self.handle_outcome(outcome),
            AppMessage::PushConnected(Ok((handle, mut events))) => {
                info!("push channel connected");
                self.push = Some(handle);
                self.state.push_connected = true;
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    while let Some(msg) = events.recv().await {
                        if tx.send(AppMessage::Push(msg)).await.is_err() {
                            break;
                        }
                    }
                });
                let effects = self.state.bot.set_push_active(true);
                self.run_effects(effects);
            }
            AppMessage::PushConnected(Err(e)) => {
                warn!("push channel unavailable: {:#}", e);
                self.toast.warning("push channel unavailable, using polling");
            }
            AppMessage::Push(PushMessage::Event(event)) => self.state.bot.on_push(event),
            AppMessage::Push(PushMessage::Closed) => {
                warn!("push channel closed");
                self.push = None;
                self.state.push_connected = false;
                let effects = self.state.bot.set_push_active(false);
                self.run_effects(effects);
                self.toast.warning("push channel closed, using polling");
            }
        }
    }

    fn handle_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Status(result) => {
                self.state.server_unreachable = matches!(&result, Err(e) if e.is_transport());
                let label = chrono::Local::now().format("%H:%M:%S").to_string();
                if let Some(req) = self.state.monitor.on_status(result, &label) {
                    self.spawn(req);
                }
            }
            Outcome::LogTail(result) => self.state.log.on_output(result),
            Outcome::Cleanup(result) => {
                let effects = self.state.monitor.on_cleanup(result);
                self.run_effects(effects);
            }
            Outcome::Threshold { threshold, result } => {
                let effects = self.state.monitor.on_threshold(threshold, result);
                self.run_effects(effects);
            }
            Outcome::CacheTest(result) => {
                let effects = self.state.monitor.on_cache_test(result);
                self.run_effects(effects);
            }
            Outcome::Guilds(result) => {
                let effects = self.state.bot.on_guilds(result);
                self.run_effects(effects);
            }
            Outcome::Channels { guild_id, result } => {
                let effects = self.state.bot.on_channels(&guild_id, result);
                self.run_effects(effects);
            }
            Outcome::Playlist { guild_id, result } => {
                if let Some(req) = self.state.bot.on_playlist(&guild_id, result) {
                    self.spawn(req);
                }
            }
            Outcome::Search(result) => {
                let effects = self.state.bot.on_search(result);
                self.run_effects(effects);
            }
            Outcome::Command { command, result } => {
                let effects = self.state.bot.on_command(command, result);
                self.run_effects(effects);
            }
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        // The prompt captures every key while open.
        if self.prompt.is_active() {
            return match self.prompt.handle_key(key) {
                PromptAction::Submitted(kind, value) => {
                    self.state.input_mode = InputMode::Normal;
                    vec![Action::SubmitPrompt(kind, value)]
                }
                PromptAction::Cancelled => {
                    self.state.input_mode = InputMode::Normal;
                    vec![]
                }
                PromptAction::Editing => vec![],
            };
        }

        // Global keys
        match key.code {
            KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => {
                return vec![Action::Quit];
            }
            KeyCode::Char('q') => return vec![Action::Quit],
            KeyCode::Tab => {
                return vec![Action::SwitchWorkspace(self.state.workspace.other())];
            }
            KeyCode::BackTab => return vec![Action::FocusNext],
            KeyCode::Char(c @ '1'..='4') => {
                return vec![Action::FocusPane(c as usize - '1' as usize)];
            }
            _ => {}
        }

        let global = match self.state.workspace {
            Workspace::Monitor => match key.code {
                KeyCode::Char('c') => Some(Action::CleanupNow),
                KeyCode::Char('t') => Some(Action::OpenPrompt(PromptKind::Threshold)),
                KeyCode::Char('x') => Some(Action::CacheTest),
                KeyCode::Char('r') => Some(Action::RefreshStatus),
                KeyCode::Char('o') => Some(Action::ConnectLog),
                KeyCode::Char('a') => Some(Action::ToggleAutoScroll),
                _ => None,
            },
            Workspace::Bot => match key.code {
                KeyCode::Char('J') => Some(Action::Join),
                KeyCode::Char('L') => Some(Action::Leave),
                KeyCode::Char(' ') => Some(Action::Pause),
                KeyCode::Char('r') => Some(Action::Resume),
                KeyCode::Char('n') => Some(Action::Skip),
                KeyCode::Char('s') => Some(Action::Stop),
                KeyCode::Char('C') => Some(Action::Clear),
                KeyCode::Char(',') => Some(Action::Seek(-SEEK_STEP_SECS)),
                KeyCode::Char('.') => Some(Action::Seek(SEEK_STEP_SECS)),
                KeyCode::Char('/') => Some(Action::OpenPrompt(PromptKind::Search)),
                KeyCode::Char('i') => Some(Action::OpenPrompt(PromptKind::ImportPlaylist)),
                KeyCode::Char('R') => Some(Action::RefreshPlaylist),
                _ => None,
            },
        };
        if let Some(action) = global {
            return vec![action];
        }

        let state = &self.state;
        match self.focus.current() {
            Some(ComponentId::StatusPanel) => self.status_panel.handle_key(key, state),
            Some(ComponentId::LogPanel) => self.log_panel.handle_key(key, state),
            Some(ComponentId::GuildList) => self.guild_list.handle_key(key, state),
            Some(ComponentId::ChannelList) => self.channel_list.handle_key(key, state),
            Some(ComponentId::Queue) => self.queue_panel.handle_key(key, state),
            Some(ComponentId::SearchResults) => self.search_panel.handle_key(key, state),
            None => vec![],
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Vec<Action> {
        let state = &self.state;
        match self.focus.current() {
            Some(ComponentId::LogPanel) => self.log_panel.handle_mouse(mouse, state),
            _ => vec![],
        }
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            // ── Monitor ───────────────────────────────────────────────────────
            Action::CleanupNow => {
                let req = self.state.monitor.cleanup_now();
                self.spawn(req);
            }
            Action::CacheTest => {
                let req = self.state.monitor.cache_test();
                self.spawn(req);
            }
            Action::RefreshStatus => {
                if let Some(req) = self.state.monitor.refresh_now() {
                    self.spawn(req);
                }
            }
            Action::ConnectLog => {
                if !self.state.log.connect() {
                    self.toast.info("log tail already connected");
                    return;
                }
                if let Some(req) = self.state.log.tick() {
                    self.spawn(req);
                }
            }
            Action::ToggleAutoScroll => {
                self.state.log.view.toggle_auto_scroll();
            }
            Action::ScrollLog(delta) => self.state.log.view.scroll_by(delta),
            Action::ScrollLogTop => self.state.log.view.scroll_to_top(),
            Action::ScrollLogBottom => self.state.log.view.scroll_to_bottom(),

            // ── Bot ───────────────────────────────────────────────────────────
            Action::SelectGuild(index) => {
                let effects = self.state.bot.select_guild(index);
                self.run_effects(effects);
            }
            Action::SelectChannel(channel_id) => self.state.bot.select_channel(channel_id),
            Action::Join => {
                let req = self.state.bot.join();
                self.submit(req);
            }
            Action::Leave => {
                let req = self.state.bot.leave();
                self.submit(req);
            }
            Action::Pause => {
                let req = self.state.bot.pause();
                self.submit(req);
            }
            Action::Resume => {
                let req = self.state.bot.resume();
                self.submit(req);
            }
            Action::Skip => {
                let req = self.state.bot.skip();
                self.submit(req);
            }
            Action::Stop => {
                let req = self.state.bot.stop();
                self.submit(req);
            }
            Action::Clear => {
                let req = self.state.bot.clear();
                self.submit(req);
            }
            Action::Remove(index) => {
                let req = self.state.bot.remove(index);
                self.submit(req);
            }
            Action::Seek(delta) => {
                let req = self.state.bot.seek_by(delta);
                self.submit(req);
            }
            Action::RefreshPlaylist => {
                if let Some(req) = self.state.bot.refresh_playlist() {
                    self.spawn(req);
                }
            }
            Action::PlaySearchResult(index) => {
                let Some(song) = self.state.bot.search_results.get(index).cloned() else {
                    return;
                };
                let req = self.state.bot.play(&song);
                self.submit(req);
            }

            // ── Input ─────────────────────────────────────────────────────────
            Action::OpenPrompt(kind) => {
                let value = match kind {
                    PromptKind::Threshold => self
                        .state
                        .monitor
                        .snapshot()
                        .and_then(|s| s.cleanup.as_ref())
                        .map(|c| c.cleanup_threshold.to_string())
                        .unwrap_or_default(),
                    PromptKind::Search | PromptKind::ImportPlaylist => String::new(),
                };
                self.prompt.open(kind, &value);
                self.state.input_mode = InputMode::Input;
            }
            Action::SubmitPrompt(kind, value) => {
                let req = match kind {
                    PromptKind::Threshold => self.state.monitor.set_threshold(&value),
                    PromptKind::Search => self.state.bot.search(&value),
                    PromptKind::ImportPlaylist => self.state.bot.import(&value),
                };
                self.submit(req);
            }

            // ── Navigation ────────────────────────────────────────────────────
            Action::SwitchWorkspace(workspace) => {
                self.state.workspace = workspace;
                self.focus.set_items(workspace.panes());
            }
            Action::FocusNext => {
                self.focus.next();
            }
            Action::FocusPane(pos) => {
                self.focus.set_by_position(pos);
            }
            Action::Quit => self.should_quit = true,
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        status_bar::draw_header(
            frame,
            outer[0],
            &self.state.base_url,
            !self.state.server_unreachable,
            self.state.log.link(),
            self.state.push_connected,
        );

        match self.state.workspace {
            Workspace::Monitor => self.draw_monitor(frame, outer[1]),
            Workspace::Bot => self.draw_bot(frame, outer[1]),
        }

        if self.prompt.is_active() {
            self.prompt.draw(frame, outer[2]);
        } else {
            status_bar::draw_keys_bar(
                frame,
                outer[2],
                self.state.input_mode,
                self.state.workspace,
            );
        }

        self.toast.draw(frame, area);
    }

    fn draw_monitor(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(16), Constraint::Percentage(40)])
            .split(area);

        let focused = self.focus.is_focused(ComponentId::StatusPanel);
        self.status_panel.draw(frame, rows[0], focused, &self.state);

        self.state
            .log
            .view
            .set_viewport(LogPanel::viewport_rows(rows[1]));
        let focused = self.focus.is_focused(ComponentId::LogPanel);
        self.log_panel.draw(frame, rows[1], focused, &self.state);
    }

    fn draw_bot(&mut self, frame: &mut Frame, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(cols[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(cols[1]);

        let focus = &self.focus;
        let state = &self.state;
        self.guild_list
            .draw(frame, left[0], focus.is_focused(ComponentId::GuildList), state);
        self.channel_list
            .draw(frame, left[1], focus.is_focused(ComponentId::ChannelList), state);
        self.queue_panel
            .draw(frame, right[0], focus.is_focused(ComponentId::Queue), state);
        self.search_panel.draw(
            frame,
            right[1],
            focus.is_focused(ComponentId::SearchResults),
            state,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botdash_proto::protocol::{Guild, StatusSnapshot};
    use botdash_proto::session::SessionStore;
    use ratatui::backend::TestBackend;
    use ratatui::crossterm::event::KeyEventState;

    use crate::log_tail::LogTail;
    use crate::monitor::StatusPoller;
    use crate::session_ctl::SessionController;

    fn app(dir: &tempfile::TempDir) -> App {
        let store = SessionStore::new(dir.path().join("session.json"));
        let state = AppState::new(
            StatusPoller::new(20),
            LogTail::new(100, 1),
            SessionController::new(store),
            "http://127.0.0.1:5000".to_string(),
        );
        let client = ApiClient::new("http://127.0.0.1:5000").unwrap();
        App::new(client, state, PollingConfig::default(), None)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn tab_switches_workspace_and_focus_ring() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        assert_eq!(app.focus.current(), Some(ComponentId::StatusPanel));

        for action in app.handle_key(key(KeyCode::Tab)) {
            app.dispatch(action);
        }
        assert_eq!(app.state.workspace, Workspace::Bot);
        assert_eq!(app.focus.current(), Some(ComponentId::GuildList));

        for action in app.handle_key(key(KeyCode::Char('3'))) {
            app.dispatch(action);
        }
        assert_eq!(app.focus.current(), Some(ComponentId::Queue));
    }

    #[test]
    fn prompt_captures_keys_until_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.dispatch(Action::OpenPrompt(PromptKind::Threshold));
        assert_eq!(app.state.input_mode, InputMode::Input);

        // 'q' types into the prompt instead of quitting.
        assert!(app.handle_key(key(KeyCode::Char('q'))).is_empty());
        assert!(!app.should_quit);

        assert!(app.handle_key(key(KeyCode::Esc)).is_empty());
        assert_eq!(app.state.input_mode, InputMode::Normal);
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), vec![Action::Quit]);
    }

    #[test]
    fn monitor_keys_map_to_one_action_from_any_pane() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        assert_eq!(app.handle_key(key(KeyCode::Char('c'))), vec![Action::CleanupNow]);

        app.dispatch(Action::FocusPane(1));
        assert_eq!(app.focus.current(), Some(ComponentId::LogPanel));
        assert_eq!(
            app.handle_key(key(KeyCode::Char('a'))),
            vec![Action::ToggleAutoScroll]
        );
        assert_eq!(app.handle_key(key(KeyCode::Char('o'))), vec![Action::ConnectLog]);
        assert_eq!(app.handle_key(key(KeyCode::Char('k'))), vec![Action::ScrollLog(-1)]);
    }

    #[test]
    fn bot_commands_without_a_guild_only_toast() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.dispatch(Action::SwitchWorkspace(Workspace::Bot));
        for action in app.handle_key(key(KeyCode::Char(' '))) {
            app.dispatch(action);
        }
        assert_eq!(
            app.toast.latest(),
            Some(ValidationError::NoGuild.to_string().as_str())
        );
    }

    #[test]
    fn both_workspaces_render() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let text = screen(&mut app);
        assert!(text.contains("botdash"));
        assert!(text.contains("waiting for the first status reading"));

        let snap = StatusSnapshot {
            cpu_percent: 45.2,
            memory_percent: 60.0,
            ..StatusSnapshot::default()
        };
        app.state.monitor.on_status(Ok(snap), "12:00:00");
        let text = screen(&mut app);
        assert!(text.contains("45.2%"));

        app.dispatch(Action::SwitchWorkspace(Workspace::Bot));
        app.state.bot.guilds = vec![Guild {
            id: "g1".to_string(),
            name: "lounge".to_string(),
            icon: None,
            master_id: None,
        }];
        let text = screen(&mut app);
        assert!(text.contains("lounge"));
        assert!(text.contains("select a server"));
    }
}
