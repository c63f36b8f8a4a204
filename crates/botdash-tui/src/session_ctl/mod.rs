//! Bot dashboard controller: guild/channel selection, commands, playlist.
//!
//! Every method is synchronous and returns the [`Effect`]s it wants run, so
//! the whole selection and command flow can be driven without a server.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use botdash_proto::client::ApiError;
use botdash_proto::protocol::{
    Channel, Guild, ImportRequest, PlayRequest, PlaylistEntry, PushEvent, RoomRequest, SearchSong,
};
use botdash_proto::session::{Session, SessionStore};

use crate::core::{BotCommand, CommandReply, Effect, Notice, Request};
use crate::error::ValidationError;
use crate::playlist::PlaylistView;

/// Seconds moved by one seek key press.
pub const SEEK_STEP_SECS: f64 = 10.0;

static PLAYLIST_LINK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"music\.163\.com.*playlist\?id=(\d+)").ok());

/// Reduce user input to a numeric playlist id.
///
/// Accepts a bare id or a music.163.com link with `playlist?id=<digits>`.
pub fn extract_playlist_id(input: &str) -> Option<String> {
    let input = input.trim();
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return Some(input.to_string());
    }
    PLAYLIST_LINK
        .as_ref()
        .and_then(|re| re.captures(input))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub struct SessionController {
    session: Session,
    store: SessionStore,
    pub guilds: Vec<Guild>,
    pub channels: Vec<Channel>,
    pub playlist: PlaylistView,
    pub search_results: Vec<SearchSong>,
    leave_enabled: bool,
    push_active: bool,
    playlist_in_flight: bool,
    playlist_queued: bool,
}

impl SessionController {
    pub fn new(store: SessionStore) -> Self {
        let session = store.load();
        Self {
            session,
            store,
            guilds: Vec::new(),
            channels: Vec::new(),
            playlist: PlaylistView::default(),
            search_results: Vec::new(),
            leave_enabled: false,
            push_active: false,
            playlist_in_flight: false,
            playlist_queued: false,
        }
    }

    pub fn guild_id(&self) -> Option<&str> {
        self.session.guild_id.as_deref()
    }

    pub fn guild_name(&self) -> Option<&str> {
        self.session.guild_name.as_deref()
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.session.channel_id.as_deref()
    }

    pub fn leave_enabled(&self) -> bool {
        self.leave_enabled
    }

    /// Position of the selected guild in the loaded guild list.
    pub fn selected_guild_index(&self) -> Option<usize> {
        let id = self.guild_id()?;
        self.guilds.iter().position(|g| g.id == id)
    }

    /// Position of the selected channel in the loaded channel list.
    pub fn selected_channel_index(&self) -> Option<usize> {
        let id = self.channel_id()?;
        self.channels.iter().position(|c| c.id == id)
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.session) {
            warn!(
                "failed to persist session to {}: {}",
                self.store.path().display(),
                e
            );
        }
    }

    // ── Startup and push ─────────────────────────────────────────────────────

    /// Startup: load guilds and, if a guild was persisted, pick it back up
    /// without any user input.
    pub fn restore(&mut self) -> Vec<Effect> {
        let mut effects = vec![Effect::Http(Request::Guilds)];
        let Some((id, name)) = self.session.restorable_guild() else {
            return effects;
        };
        info!("restoring session: guild {} ({})", name, id);
        let id = id.to_string();
        effects.push(Effect::Http(Request::Channels {
            guild_id: id.clone(),
        }));
        if let Some(req) = self.refresh_playlist() {
            effects.push(Effect::Http(req));
        }
        if self.push_active {
            effects.push(Effect::Room(RoomRequest::JoinRoom { guild_id: id }));
        }
        effects
    }

    /// The push channel came up or went away.  Coming up re-scopes it to
    /// the selected guild.
    pub fn set_push_active(&mut self, active: bool) -> Vec<Effect> {
        self.push_active = active;
        match (active, self.guild_id()) {
            (true, Some(id)) => vec![Effect::Room(RoomRequest::JoinRoom {
                guild_id: id.to_string(),
            })],
            _ => Vec::new(),
        }
    }

    pub fn on_push(&mut self, event: PushEvent) {
        if self.guild_id() != Some(event.guild_id()) {
            debug!("ignoring push event for guild {}", event.guild_id());
            return;
        }
        match event {
            PushEvent::PlaylistUpdate { playlist, .. } => {
                self.playlist = PlaylistView::reconcile(&playlist);
            }
            PushEvent::PlayerStatus(status) => self.playlist.apply_player_status(&status),
        }
    }

    // ── Selection ────────────────────────────────────────────────────────────

    pub fn select_guild(&mut self, index: usize) -> Vec<Effect> {
        let Some(guild) = self.guilds.get(index).cloned() else {
            return Vec::new();
        };
        let previous = self.session.guild_id.clone();
        self.session.select_guild(guild.id.clone(), guild.name.clone());
        self.persist();
        info!("selected guild {} ({})", guild.name, guild.id);

        self.channels.clear();
        self.playlist = PlaylistView::default();

        let mut effects = vec![Effect::Http(Request::Channels {
            guild_id: guild.id.clone(),
        })];
        if let Some(req) = self.refresh_playlist() {
            effects.push(Effect::Http(req));
        }
        if self.push_active {
            if let Some(prev) = previous.filter(|p| *p != guild.id) {
                effects.push(Effect::Room(RoomRequest::LeaveRoom { guild_id: prev }));
            }
            effects.push(Effect::Room(RoomRequest::JoinRoom { guild_id: guild.id }));
        }
        effects
    }

    /// Channel selection is local: it persists but never calls the server.
    pub fn select_channel(&mut self, channel_id: Option<String>) {
        self.session.select_channel(channel_id);
        self.persist();
    }

    // ── Fetch results ────────────────────────────────────────────────────────

    pub fn on_guilds(&mut self, result: Result<Vec<Guild>, ApiError>) -> Vec<Effect> {
        match result {
            Ok(guilds) => {
                self.guilds = guilds;
                Vec::new()
            }
            Err(e) => {
                warn!("loading guilds failed: {}", e);
                vec![Effect::Notify(Notice::error(format!(
                    "loading servers failed: {}",
                    e
                )))]
            }
        }
    }

    pub fn on_channels(
        &mut self,
        guild_id: &str,
        result: Result<Vec<Channel>, ApiError>,
    ) -> Vec<Effect> {
        if self.guild_id() != Some(guild_id) {
            return Vec::new();
        }
        match result {
            Ok(channels) => {
                self.channels = channels;
                Vec::new()
            }
            Err(e) => {
                warn!("loading channels for {} failed: {}", guild_id, e);
                vec![Effect::Notify(Notice::error(format!(
                    "loading channels failed: {}",
                    e
                )))]
            }
        }
    }

    /// Timer or manual playlist refresh.  One request in flight at a time;
    /// a refresh asked for meanwhile runs when it lands.
    pub fn refresh_playlist(&mut self) -> Option<Request> {
        let guild_id = self.guild_id()?.to_string();
        if self.playlist_in_flight {
            self.playlist_queued = true;
            return None;
        }
        self.playlist_in_flight = true;
        Some(Request::Playlist { guild_id })
    }

    /// Periodic refresh; unlike [`Self::refresh_playlist`] it never queues.
    pub fn tick(&mut self) -> Option<Request> {
        if self.playlist_in_flight {
            return None;
        }
        self.refresh_playlist()
    }

    pub fn on_playlist(
        &mut self,
        guild_id: &str,
        result: Result<Vec<PlaylistEntry>, ApiError>,
    ) -> Option<Request> {
        self.playlist_in_flight = false;
        if self.guild_id() == Some(guild_id) {
            match result {
                Ok(entries) => self.playlist = PlaylistView::reconcile(&entries),
                Err(e) => warn!("playlist refresh failed: {}", e),
            }
        }
        if self.playlist_queued {
            self.playlist_queued = false;
            return self.refresh_playlist();
        }
        None
    }

    pub fn on_search(&mut self, result: Result<Vec<SearchSong>, ApiError>) -> Vec<Effect> {
        match result {
            Ok(songs) => {
                let notice = Notice::info(format!("{} results", songs.len()));
                self.search_results = songs;
                vec![Effect::Notify(notice)]
            }
            Err(e) => {
                warn!("search failed: {}", e);
                vec![Effect::Notify(Notice::error(format!("search failed: {}", e)))]
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    fn require_guild(&self) -> Result<String, ValidationError> {
        self.guild_id()
            .map(str::to_string)
            .ok_or(ValidationError::NoGuild)
    }

    fn require_channel(&self) -> Result<(String, String), ValidationError> {
        let guild_id = self.require_guild()?;
        let channel_id = self
            .channel_id()
            .map(str::to_string)
            .ok_or(ValidationError::NoChannel)?;
        Ok((guild_id, channel_id))
    }

    pub fn join(&self) -> Result<Request, ValidationError> {
        let (guild_id, channel_id) = self.require_channel()?;
        Ok(Request::Command(BotCommand::Join {
            guild_id,
            channel_id,
        }))
    }

    /// Only once a join has succeeded; until then there is nothing to leave.
    pub fn leave(&self) -> Result<Request, ValidationError> {
        let guild_id = self.require_guild()?;
        if !self.leave_enabled {
            return Err(ValidationError::NotInVoice);
        }
        Ok(Request::Command(BotCommand::Leave { guild_id }))
    }

    pub fn pause(&self) -> Result<Request, ValidationError> {
        let guild_id = self.require_guild()?;
        Ok(Request::Command(BotCommand::Pause { guild_id }))
    }

    pub fn resume(&self) -> Result<Request, ValidationError> {
        let guild_id = self.require_guild()?;
        Ok(Request::Command(BotCommand::Resume { guild_id }))
    }

    pub fn skip(&self) -> Result<Request, ValidationError> {
        let guild_id = self.require_guild()?;
        Ok(Request::Command(BotCommand::Skip { guild_id }))
    }

    pub fn stop(&self) -> Result<Request, ValidationError> {
        let guild_id = self.require_guild()?;
        Ok(Request::Command(BotCommand::Stop { guild_id }))
    }

    pub fn clear(&self) -> Result<Request, ValidationError> {
        let guild_id = self.require_guild()?;
        Ok(Request::Command(BotCommand::Clear { guild_id }))
    }

    /// `index` is the row's remove index, not its display number.
    pub fn remove(&self, index: usize) -> Result<Request, ValidationError> {
        let guild_id = self.require_guild()?;
        Ok(Request::Command(BotCommand::Remove { guild_id, index }))
    }

    /// Seek relative to the last known position, clamped at 0.
    pub fn seek_by(&self, delta_secs: f64) -> Result<Request, ValidationError> {
        let guild_id = self.require_guild()?;
        let position = self
            .playlist
            .now_playing
            .as_ref()
            .and_then(|n| n.position)
            .ok_or(ValidationError::NothingPlaying)?;
        let target = (position + delta_secs).max(0.0).round() as u64;
        Ok(Request::Command(BotCommand::Seek {
            guild_id,
            position: target,
        }))
    }

    pub fn play(&self, song: &SearchSong) -> Result<Request, ValidationError> {
        let (guild_id, channel_id) = self.require_channel()?;
        Ok(Request::Command(BotCommand::Play(PlayRequest {
            guild_id,
            channel_id,
            song_id: song.id.to_string(),
            song_name: song.name.clone(),
            artist_name: song.primary_artist().to_string(),
        })))
    }

    pub fn import(&self, input: &str) -> Result<Request, ValidationError> {
        let (guild_id, channel_id) = self.require_channel()?;
        let playlist_id = extract_playlist_id(input).ok_or(ValidationError::BadPlaylistId)?;
        Ok(Request::Command(BotCommand::Import(ImportRequest {
            guild_id,
            channel_id,
            playlist_id,
        })))
    }

    pub fn search(&self, keyword: &str) -> Result<Request, ValidationError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ValidationError::EmptyKeyword);
        }
        Ok(Request::Search {
            keyword: keyword.to_string(),
        })
    }

    pub fn on_command(
        &mut self,
        command: BotCommand,
        result: Result<CommandReply, ApiError>,
    ) -> Vec<Effect> {
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!("{} failed: {}", command.label(), e);
                return vec![Effect::Notify(Notice::error(format!(
                    "{} failed: {}",
                    command.label(),
                    e
                )))];
            }
        };
        info!("{} ok for guild {}", command.label(), command.guild_id());

        let message = match (&command, reply) {
            (BotCommand::Leave { .. }, _) => {
                self.leave_enabled = false;
                self.session.clear_channel();
                self.persist();
                return vec![Effect::Notify(Notice::success("left voice channel"))];
            }
            (BotCommand::Join { channel_id, .. }, _) => {
                self.leave_enabled = true;
                self.session.select_channel(Some(channel_id.clone()));
                self.persist();
                "joined voice channel".to_string()
            }
            (BotCommand::Play(req), _) => format!("playing {}", req.song_name),
            (BotCommand::Import(_), CommandReply::Imported(count)) => {
                format!("imported playlist, {} songs", count)
            }
            (BotCommand::Remove { .. }, _) => "removed from queue".to_string(),
            (BotCommand::Seek { position, .. }, _) => {
                format!("seeked to {}", crate::playlist::fmt_clock(*position as f64))
            }
            (other, _) => format!("{} ok", other.label()),
        };

        let mut effects = vec![Effect::Notify(Notice::success(message))];
        if let Some(req) = self.refresh_playlist() {
            effects.push(Effect::Http(req));
        }
        effects
    }
}

#[cfg(test)]
mod tests;
