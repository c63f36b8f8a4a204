//! GuildList and ChannelList: the two selection panes of the Bot workspace.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::{style_selected, style_selected_focused, C_ADMIN, C_MUTED, C_PLAYING, C_PRIMARY},
    widgets::pane_chrome::{pane_chrome, Badge},
};

/// Move a cursor within `len` rows.
fn step(cursor: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let target = cursor as isize + delta;
    target.clamp(0, len as isize - 1) as usize
}

fn list_keys(key: KeyEvent, cursor: &mut usize, len: usize) -> bool {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => *cursor = step(*cursor, len, -1),
        KeyCode::Down | KeyCode::Char('j') => *cursor = step(*cursor, len, 1),
        KeyCode::Home | KeyCode::Char('g') => *cursor = 0,
        KeyCode::End | KeyCode::Char('G') => *cursor = len.saturating_sub(1),
        _ => return false,
    }
    true
}

fn draw_empty(frame: &mut Frame, area: Rect, text: &str) {
    frame.render_widget(
        Paragraph::new(Span::styled(format!("  {}", text), Style::default().fg(C_MUTED))),
        area,
    );
}

// ── Guilds ────────────────────────────────────────────────────────────────────

pub struct GuildList {
    cursor: usize,
    /// Cursor follows the persisted selection until the user moves it.
    synced: bool,
}

impl GuildList {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            synced: false,
        }
    }
}

impl Component for GuildList {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let len = state.bot.guilds.len();
        if list_keys(key, &mut self.cursor, len) {
            self.synced = true;
            return vec![];
        }
        match key.code {
            KeyCode::Enter if self.cursor < len => vec![Action::SelectGuild(self.cursor)],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let guilds = &state.bot.guilds;
        let selected = state.bot.selected_guild_index();
        if !self.synced {
            if let Some(idx) = selected {
                self.cursor = idx;
                self.synced = true;
            }
        }
        self.cursor = step(self.cursor, guilds.len(), 0);

        let block = pane_chrome("servers", Some('1'), focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if guilds.is_empty() {
            draw_empty(frame, inner, "no servers loaded");
            return;
        }

        let items: Vec<ListItem> = guilds
            .iter()
            .enumerate()
            .map(|(i, g)| {
                let active = selected == Some(i);
                let marker = if active { "▶ " } else { "  " };
                let name_style = if active {
                    Style::default().fg(C_PLAYING).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(C_PRIMARY)
                };
                let (role, role_color) = if g.is_admin() {
                    ("admin", C_ADMIN)
                } else {
                    ("member", C_MUTED)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(C_PLAYING)),
                    Span::styled(g.name.clone(), name_style),
                    Span::styled(format!("  {}", role), Style::default().fg(role_color)),
                ]))
            })
            .collect();

        let highlight = if focused {
            style_selected_focused()
        } else {
            style_selected()
        };
        let mut list_state = ListState::default();
        list_state.select(Some(self.cursor));
        frame.render_stateful_widget(
            List::new(items).highlight_style(highlight),
            inner,
            &mut list_state,
        );
    }
}

// ── Channels ──────────────────────────────────────────────────────────────────

pub struct ChannelList {
    cursor: usize,
    /// Guild whose channel list the cursor was last placed in.
    synced_guild: Option<String>,
}

impl ChannelList {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            synced_guild: None,
        }
    }
}

impl Component for ChannelList {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let channels = &state.bot.channels;
        if list_keys(key, &mut self.cursor, channels.len()) {
            return vec![];
        }
        match key.code {
            KeyCode::Enter => match channels.get(self.cursor) {
                Some(c) => vec![Action::SelectChannel(Some(c.id.clone()))],
                None => vec![],
            },
            KeyCode::Backspace | KeyCode::Delete => vec![Action::SelectChannel(None)],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let channels = &state.bot.channels;
        let selected = state.bot.selected_channel_index();
        let guild = state.bot.guild_id();
        if !channels.is_empty() && self.synced_guild.as_deref() != guild {
            self.cursor = selected.unwrap_or(0);
            self.synced_guild = guild.map(str::to_string);
        }
        self.cursor = step(self.cursor, channels.len(), 0);

        let badge = if state.bot.leave_enabled() {
            Some(Badge {
                text: "IN VOICE",
                color: C_PLAYING,
            })
        } else {
            None
        };
        let title = match state.bot.guild_name() {
            Some(name) => format!("voice channels · {}", name),
            None => "voice channels".to_string(),
        };
        let block = pane_chrome(&title, Some('2'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if channels.is_empty() {
            let hint = if state.bot.guild_id().is_some() {
                "no voice channels"
            } else {
                "select a server"
            };
            draw_empty(frame, inner, hint);
            return;
        }

        let items: Vec<ListItem> = channels
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let active = selected == Some(i);
                let style = if active {
                    Style::default().fg(C_PLAYING).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(C_PRIMARY)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(if active { "▶ " } else { "  " }, Style::default().fg(C_PLAYING)),
                    Span::styled(format!("🔊 {}", c.name), style),
                ]))
            })
            .collect();

        let highlight = if focused {
            style_selected_focused()
        } else {
            style_selected()
        };
        let mut list_state = ListState::default();
        list_state.select(Some(self.cursor));
        frame.render_stateful_widget(
            List::new(items).highlight_style(highlight),
            inner,
            &mut list_state,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::step;

    #[test]
    fn cursor_steps_are_clamped() {
        assert_eq!(step(0, 0, 1), 0);
        assert_eq!(step(0, 3, -1), 0);
        assert_eq!(step(2, 3, 1), 2);
        assert_eq!(step(5, 3, 0), 2);
        assert_eq!(step(1, 3, 1), 2);
    }
}
