//! AppState: everything components read while handling keys and drawing.
//!
//! Components never mutate it; only the App event loop writes here, and it
//! does so through the controllers' own methods.

use crate::action::Workspace;
use crate::log_tail::LogTail;
use crate::monitor::StatusPoller;
use crate::session_ctl::SessionController;
use crate::widgets::status_bar::InputMode;

pub struct AppState {
    // ── Controllers ─────────────────────────────────────────────────────────
    pub monitor: StatusPoller,
    pub log: LogTail,
    pub bot: SessionController,

    // ── Connection ──────────────────────────────────────────────────────────
    pub base_url: String,
    /// Push channel is up and scoped.
    pub push_connected: bool,
    /// Last status fetch failed at the transport level.
    pub server_unreachable: bool,

    // ── UI mode ─────────────────────────────────────────────────────────────
    pub workspace: Workspace,
    pub input_mode: InputMode,
}

impl AppState {
    pub fn new(
        monitor: StatusPoller,
        log: LogTail,
        bot: SessionController,
        base_url: String,
    ) -> Self {
        Self {
            monitor,
            log,
            bot,
            base_url,
            push_connected: false,
            server_unreachable: false,
            workspace: Workspace::Monitor,
            input_mode: InputMode::Normal,
        }
    }
}
