//! LogPanel: the tailed server log with numbered rows.
//!
//! Scroll state lives in [`crate::log_tail::LogView`]; this component only
//! turns keys into scroll actions and renders the visible window.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    log_tail::LinkState,
    theme::{C_CONNECTING, C_MUTED, C_NUMBER_HINT, C_PLAYING, C_PRIMARY, C_SECONDARY},
    widgets::pane_chrome::{pane_chrome, Badge},
};

const PAGE: isize = 10;

pub struct LogPanel;

impl LogPanel {
    pub fn new() -> Self {
        Self
    }

    /// Text rows available inside the border for a pane of `area`.
    pub fn viewport_rows(area: Rect) -> usize {
        area.height.saturating_sub(2) as usize
    }
}

impl Component for LogPanel {
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => vec![Action::ScrollLog(-1)],
            KeyCode::Down | KeyCode::Char('j') => vec![Action::ScrollLog(1)],
            KeyCode::PageUp => vec![Action::ScrollLog(-PAGE)],
            KeyCode::PageDown => vec![Action::ScrollLog(PAGE)],
            KeyCode::Home | KeyCode::Char('g') => vec![Action::ScrollLogTop],
            KeyCode::End | KeyCode::Char('G') => vec![Action::ScrollLogBottom],
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => vec![Action::ScrollLog(-3)],
            MouseEventKind::ScrollDown => vec![Action::ScrollLog(3)],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        if area.height == 0 {
            return;
        }
        let tail = &state.log;
        let (badge_text, badge_color) = match tail.link() {
            LinkState::Connected if tail.view.auto_scroll() => ("LIVE", C_PLAYING),
            LinkState::Connected => ("PAUSED", C_CONNECTING),
            LinkState::Connecting => ("…", C_CONNECTING),
            LinkState::Disconnected => ("OFF", C_MUTED),
        };
        let block = pane_chrome(
            "terminal",
            Some('2'),
            focused,
            Some(Badge {
                text: badge_text,
                color: badge_color,
            }),
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if tail.view.is_empty() {
            let hint = if tail.is_active() {
                "  waiting for output…"
            } else {
                "  press o to connect to the terminal output"
            };
            frame.render_widget(
                Paragraph::new(Span::styled(hint, Style::default().fg(C_MUTED))),
                inner,
            );
            return;
        }

        let lines: Vec<Line> = tail
            .view
            .visible()
            .map(|row| {
                let style = if row.text.starts_with("fetch failed") {
                    Style::default().fg(C_CONNECTING)
                } else if row.number == 1 {
                    Style::default().fg(C_SECONDARY)
                } else {
                    Style::default().fg(C_PRIMARY)
                };
                Line::from(vec![
                    Span::styled(
                        format!("{} ", row.gutter()),
                        Style::default().fg(C_NUMBER_HINT),
                    ),
                    Span::styled(row.text.as_str(), style),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}
