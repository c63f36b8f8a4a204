//! QueuePanel: now playing with its progress bar, then the queue table.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::{
        style_selected, style_selected_focused, C_MUTED, C_NUMBER_HINT, C_PLAYING, C_PRIMARY,
        C_SECONDARY,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        progress_bar::draw_progress,
    },
};

pub struct QueuePanel {
    cursor: usize,
}

impl QueuePanel {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }
}

impl Component for QueuePanel {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let queue = &state.bot.playlist.queue;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = (self.cursor + 1).min(queue.len().saturating_sub(1));
                vec![]
            }
            KeyCode::Char('d') | KeyCode::Delete => match queue.get(self.cursor) {
                Some(row) => vec![Action::Remove(row.remove_index)],
                None => vec![],
            },
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let view = &state.bot.playlist;
        let count = format!("{} queued", view.queue.len());
        let block = pane_chrome(
            "player",
            Some('3'),
            focused,
            Some(Badge {
                text: &count,
                color: C_SECONDARY,
            }),
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        // ── Now playing ──────────────────────────────────────────────────────
        match &view.now_playing {
            Some(now) => {
                frame.render_widget(
                    Paragraph::new(Line::from(vec![
                        Span::styled("▶ ", Style::default().fg(C_PLAYING)),
                        Span::styled(
                            now.title.as_str(),
                            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("  {}", now.artist),
                            Style::default().fg(C_SECONDARY),
                        ),
                    ])),
                    rows[0],
                );
                draw_progress(frame, rows[1], now.progress(), now.position, now.duration);
            }
            None => {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        "  not playing",
                        Style::default().fg(C_MUTED),
                    )),
                    rows[0],
                );
                draw_progress(frame, rows[1], 0.0, None, None);
            }
        }

        // ── Queue ────────────────────────────────────────────────────────────
        if view.queue.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  queue is empty", Style::default().fg(C_MUTED))),
                rows[3],
            );
            return;
        }
        self.cursor = self.cursor.min(view.queue.len() - 1);

        let table_rows: Vec<Row> = view
            .queue
            .iter()
            .map(|r| {
                Row::new(vec![
                    Cell::from(Span::styled(
                        format!("{:>3}", r.number),
                        Style::default().fg(C_NUMBER_HINT),
                    )),
                    Cell::from(Span::styled(r.title.as_str(), Style::default().fg(C_PRIMARY))),
                    Cell::from(Span::styled(r.artist.as_str(), Style::default().fg(C_SECONDARY))),
                    Cell::from(Span::styled(r.duration.as_str(), Style::default().fg(C_MUTED))),
                ])
            })
            .collect();
        let header = Row::new(vec!["#", "song", "artist", "time"])
            .style(Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD));
        let highlight = if focused {
            style_selected_focused()
        } else {
            style_selected()
        };
        let table = Table::new(
            table_rows,
            [
                Constraint::Length(4),
                Constraint::Percentage(50),
                Constraint::Percentage(35),
                Constraint::Length(6),
            ],
        )
        .header(header)
        .row_highlight_style(highlight);

        let mut table_state = TableState::default();
        table_state.select(Some(self.cursor));
        frame.render_stateful_widget(table, rows[3], &mut table_state);
    }
}
