//! Status bar: connection indicators, mode and key bindings.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::Workspace;
use crate::log_tail::LinkState;
use crate::theme::{C_ACCENT, C_CONNECTING, C_MODE_INPUT, C_MODE_NORMAL, C_MUTED, C_PLAYING, C_SECONDARY};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Input,
}

impl InputMode {
    pub fn color(self) -> Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Input => C_MODE_INPUT,
        }
    }
}

/// Header line: server address plus API, log tail and push indicators.
pub fn draw_header(
    frame: &mut Frame,
    area: Rect,
    base_url: &str,
    api_ok: bool,
    log_link: LinkState,
    push_connected: bool,
) {
    let dot = |on: bool, label: &'static str| {
        let color = if on { C_PLAYING } else { C_ACCENT };
        vec![
            Span::styled(if on { "●" } else { "○" }, Style::default().fg(color)),
            Span::styled(format!(" {}  ", label), Style::default().fg(C_SECONDARY)),
        ]
    };
    let log_color = match log_link {
        LinkState::Connected => C_PLAYING,
        LinkState::Connecting => C_CONNECTING,
        LinkState::Disconnected => C_MUTED,
    };

    let mut spans = vec![
        Span::styled(
            " botdash ",
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{}  ", base_url), Style::default().fg(C_MUTED)),
    ];
    spans.extend(dot(api_ok, "api"));
    spans.push(Span::styled("●", Style::default().fg(log_color)));
    spans.push(Span::styled(
        format!(" log {}  ", log_link.label()),
        Style::default().fg(C_SECONDARY),
    ));
    spans.extend(dot(push_connected, "push"));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn keys_hint(mode: InputMode, workspace: Workspace) -> &'static str {
    match mode {
        InputMode::Input => " type value  Enter submit  Esc cancel",
        InputMode::Normal => match workspace {
            Workspace::Monitor => {
                " c cleanup  t threshold  x cache test  r refresh  o connect log  a auto-scroll  ↑↓ scroll  S-Tab/1-2 panes  Tab bot  q quit"
            }
            Workspace::Bot => {
                " Enter select  J join  L leave  Space pause  r resume  n skip  s stop  C clear  d remove  ,/. seek  / search  i import  R refresh  S-Tab/1-4 panes  Tab monitor  q quit"
            }
        },
    }
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, workspace: Workspace) {
    let label = match mode {
        InputMode::Input => "INPUT",
        InputMode::Normal => workspace.label(),
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", label),
            Style::default()
                .fg(mode.color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys_hint(mode, workspace), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
