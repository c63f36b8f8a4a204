//! Action enum: every user intent the App dispatches.

use crate::widgets::text_prompt::PromptKind;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    StatusPanel,
    LogPanel,
    GuildList,
    ChannelList,
    Queue,
    SearchResults,
}

/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Monitor ──────────────────────────────────────────────────────────────
    CleanupNow,
    CacheTest,
    RefreshStatus,
    ConnectLog,
    ToggleAutoScroll,
    ScrollLog(isize),
    ScrollLogTop,
    ScrollLogBottom,

    // ── Bot ──────────────────────────────────────────────────────────────────
    SelectGuild(usize),
    SelectChannel(Option<String>),
    Join,
    Leave,
    Pause,
    Resume,
    Skip,
    Stop,
    Clear,
    /// Remove the queue row with this remove index.
    Remove(usize),
    Seek(f64),
    RefreshPlaylist,
    PlaySearchResult(usize),

    // ── Input ────────────────────────────────────────────────────────────────
    OpenPrompt(PromptKind),
    SubmitPrompt(PromptKind, String),

    // ── Navigation ───────────────────────────────────────────────────────────
    SwitchWorkspace(Workspace),
    FocusNext,
    FocusPane(usize),
    Quit,
}

/// Which workspace (tab) is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workspace {
    Monitor,
    Bot,
}

impl Workspace {
    pub fn other(self) -> Self {
        match self {
            Workspace::Monitor => Workspace::Bot,
            Workspace::Bot => Workspace::Monitor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Workspace::Monitor => "MONITOR",
            Workspace::Bot => "BOT",
        }
    }

    /// Focus order of the panes shown in this workspace.
    pub fn panes(self) -> Vec<ComponentId> {
        match self {
            Workspace::Monitor => vec![ComponentId::StatusPanel, ComponentId::LogPanel],
            Workspace::Bot => vec![
                ComponentId::GuildList,
                ComponentId::ChannelList,
                ComponentId::Queue,
                ComponentId::SearchResults,
            ],
        }
    }
}
