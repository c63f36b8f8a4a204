//! SearchPanel: results of the last song search; Enter plays a row.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::{style_selected, style_selected_focused, C_MUTED, C_PRIMARY, C_SECONDARY, C_TAG},
    widgets::pane_chrome::pane_chrome,
};

pub struct SearchPanel {
    cursor: usize,
}

impl SearchPanel {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }
}

impl Component for SearchPanel {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let len = state.bot.search_results.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = (self.cursor + 1).min(len.saturating_sub(1));
                vec![]
            }
            KeyCode::Enter if self.cursor < len => vec![Action::PlaySearchResult(self.cursor)],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("search", Some('4'), focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let songs = &state.bot.search_results;
        if songs.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  press / to search, Enter on a result plays it",
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }
        self.cursor = self.cursor.min(songs.len() - 1);

        let rows: Vec<Row> = songs
            .iter()
            .map(|s| {
                Row::new(vec![
                    Cell::from(Span::styled(s.name.clone(), Style::default().fg(C_PRIMARY))),
                    Cell::from(Span::styled(s.artists(), Style::default().fg(C_SECONDARY))),
                    Cell::from(Span::styled(s.album().to_string(), Style::default().fg(C_TAG))),
                ])
            })
            .collect();
        let header = Row::new(vec!["song", "artist", "album"])
            .style(Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD));
        let highlight = if focused {
            style_selected_focused()
        } else {
            style_selected()
        };
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(40),
                Constraint::Percentage(30),
                Constraint::Percentage(30),
            ],
        )
        .header(header)
        .row_highlight_style(highlight);

        let mut table_state = TableState::default();
        table_state.select(Some(self.cursor));
        frame.render_stateful_widget(table, inner, &mut table_state);
    }
}
