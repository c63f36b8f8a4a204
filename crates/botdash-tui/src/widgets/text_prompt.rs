//! TextPrompt: a one-line tui-input editor for threshold, search and
//! playlist id entry.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED};

/// What a prompt is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Threshold,
    Search,
    ImportPlaylist,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Threshold => "threshold (1-10)",
            PromptKind::Search => "search",
            PromptKind::ImportPlaylist => "playlist id or link",
        }
    }
}

pub enum PromptAction {
    Submitted(PromptKind, String),
    Cancelled,
    Editing,
}

pub struct TextPrompt {
    input: Input,
    kind: Option<PromptKind>,
}

impl TextPrompt {
    pub fn new() -> Self {
        Self {
            input: Input::default(),
            kind: None,
        }
    }

    /// Open for `kind`, pre-filled with `value`.
    pub fn open(&mut self, kind: PromptKind, value: &str) {
        self.input = Input::new(value.to_string());
        self.kind = Some(kind);
    }

    pub fn close(&mut self) {
        self.kind = None;
    }

    pub fn is_active(&self) -> bool {
        self.kind.is_some()
    }

    /// Esc cancels, Enter submits, anything else edits.
    pub fn handle_key(&mut self, key: KeyEvent) -> PromptAction {
        let Some(kind) = self.kind else {
            return PromptAction::Cancelled;
        };
        match key.code {
            KeyCode::Esc => {
                self.close();
                PromptAction::Cancelled
            }
            KeyCode::Enter => {
                self.close();
                PromptAction::Submitted(kind, self.input.value().to_string())
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                PromptAction::Editing
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let Some(kind) = self.kind else {
            return;
        };
        let prefix = format!("{}: ", kind.label());
        let prefix_w = prefix.chars().count() as u16;
        let scroll = self
            .input
            .visual_scroll(area.width.saturating_sub(prefix_w + 1) as usize);
        let value = self.input.value();
        let shown: String = value.chars().skip(scroll).collect();

        let line = Line::from(vec![
            Span::styled(
                prefix,
                Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD),
            ),
            Span::styled(shown, Style::default().fg(C_FILTER_FG)),
        ]);
        frame.render_widget(
            Paragraph::new(line).style(Style::default().bg(C_FILTER_BG)),
            area,
        );

        let cursor_x = area.x + prefix_w + (self.input.visual_cursor().saturating_sub(scroll)) as u16;
        frame.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(1)), area.y));
    }
}

impl Default for TextPrompt {
    fn default() -> Self {
        Self::new()
    }
}
