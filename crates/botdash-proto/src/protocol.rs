//! Wire schemas for the dashboard REST API and the push channel.
//!
//! Every REST reply arrives wrapped in a `{success, ...}` envelope; the
//! envelope is stripped by [`crate::client`] before these types are decoded,
//! so they only describe the payload fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ── Status ────────────────────────────────────────────────────────────────────

/// `GET /api/system/status` payload, nested the way the server sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReply {
    pub system: SystemStats,
    pub process: ProcessStats,
    pub audio_cache: AudioCacheStats,
    #[serde(default)]
    pub cleanup_stats: Option<CleanupStats>,
    pub playback: PlaybackStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemStats {
    pub cpu_percent: f64,
    pub memory: PercentStat,
    pub disk: PercentStat,
    pub network: NetworkStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PercentStat {
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct NetworkStats {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessStats {
    pub pid: u32,
    pub cpu_percent: f64,
    /// Seconds since the bot process started.
    pub uptime: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct AudioCacheStats {
    pub count: u64,
    pub max_size: u64,
    #[serde(default)]
    pub size_mb: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CleanupStats {
    pub cleanup_threshold: u32,
    /// guild id → songs played since the last cleanup
    #[serde(default)]
    pub song_play_count: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct PlaybackStats {
    pub active_guilds: u64,
    pub playing_songs: u64,
    pub queued_songs: u64,
}

/// One point-in-time status reading, flattened from [`StatusReply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub process_uptime_seconds: f64,
    pub process_pid: u32,
    pub process_cpu_percent: f64,
    pub network: NetworkStats,
    pub playback: PlaybackStats,
    pub audio_cache: AudioCacheStats,
    pub cleanup: Option<CleanupStats>,
}

impl From<StatusReply> for StatusSnapshot {
    fn from(reply: StatusReply) -> Self {
        Self {
            cpu_percent: reply.system.cpu_percent,
            memory_percent: reply.system.memory.percent,
            disk_percent: reply.system.disk.percent,
            process_uptime_seconds: reply.process.uptime,
            process_pid: reply.process.pid,
            process_cpu_percent: reply.process.cpu_percent,
            network: reply.system.network,
            playback: reply.playback,
            audio_cache: reply.audio_cache,
            cleanup: reply.cleanup_stats,
        }
    }
}

// ── Terminal tail / maintenance ───────────────────────────────────────────────

/// `GET /api/terminal/output?last_position=N`
#[derive(Debug, Clone, Deserialize)]
pub struct TerminalOutput {
    #[serde(default)]
    pub output: String,
    /// Size of the server's log file when the chunk was read.
    pub file_size: u64,
}

/// `POST /api/system/cleanup`
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupReport {
    #[serde(default)]
    pub message: Option<String>,
    pub details: CleanupDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanupDetails {
    pub cache_before: u64,
    pub cache_after: u64,
    pub cache_cleared: i64,
    pub memory_freed_mb: f64,
}

/// `POST /api/system/cleanup/config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThresholdRequest {
    pub threshold: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageReply {
    #[serde(default)]
    pub message: String,
}

/// `POST /api/cache/test`
#[derive(Debug, Clone, Deserialize)]
pub struct CacheTestReply {
    #[serde(default)]
    pub message: String,
    pub cache_count: u64,
}

// ── Guilds, channels, playlist ────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GuildsReply {
    #[serde(default)]
    pub guilds: Vec<Guild>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Guild {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub master_id: Option<String>,
}

impl Guild {
    /// The server sends an empty string when the guild has no master.
    pub fn is_admin(&self) -> bool {
        self.master_id.as_deref().is_some_and(|m| !m.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsReply {
    #[serde(default)]
    pub channels: Vec<Channel>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistReply {
    #[serde(default)]
    pub playlist: Vec<PlaylistEntry>,
}

/// One track as reported by the server.  At most one entry per playlist has
/// `playing == true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub playing: bool,
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    /// Index in the server-side queue; what `/api/remove` expects.
    #[serde(default)]
    pub queue_index: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportReply {
    #[serde(default)]
    pub count: u64,
}

/// Reply with nothing beyond the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {}

// ── Search ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SearchReply {
    #[serde(default)]
    pub songs: Vec<SearchSong>,
}

/// Song ids are numeric upstream but some mirrors send strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SongId {
    Num(u64),
    Text(String),
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SongId::Num(n) => write!(f, "{}", n),
            SongId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchSong {
    pub id: SongId,
    pub name: String,
    #[serde(default)]
    pub ar: Vec<ArtistRef>,
    #[serde(default)]
    pub al: Option<AlbumRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlbumRef {
    pub name: String,
}

impl SearchSong {
    /// All artist names joined with ", ", or "-" when none are listed.
    pub fn artists(&self) -> String {
        if self.ar.is_empty() {
            "-".to_string()
        } else {
            self.ar
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    /// First listed artist; this is what a play request carries.
    pub fn primary_artist(&self) -> &str {
        self.ar.first().map(|a| a.name.as_str()).unwrap_or("-")
    }

    pub fn album(&self) -> &str {
        self.al.as_ref().map(|a| a.name.as_str()).unwrap_or("-")
    }
}

// ── Command bodies ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildRequest {
    pub guild_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinRequest {
    pub guild_id: String,
    pub channel_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayRequest {
    pub guild_id: String,
    pub channel_id: String,
    pub song_id: String,
    pub song_name: String,
    pub artist_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRequest {
    pub guild_id: String,
    pub channel_id: String,
    pub playlist_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoveRequest {
    pub guild_id: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeekRequest {
    pub guild_id: String,
    pub position: u64,
}

// ── Push channel ──────────────────────────────────────────────────────────────

/// Server-initiated Socket.IO events.
///
/// A `42["name", {...}]` packet is read as `{"event": name, "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum PushEvent {
    PlaylistUpdate {
        guild_id: String,
        #[serde(default)]
        playlist: Vec<PlaylistEntry>,
    },
    PlayerStatus(PlayerStatus),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlayerStatus {
    pub guild_id: String,
    #[serde(default)]
    pub playing: bool,
    #[serde(default)]
    pub song_name: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub position: Option<f64>,
}

impl PushEvent {
    pub fn guild_id(&self) -> &str {
        match self {
            PushEvent::PlaylistUpdate { guild_id, .. } => guild_id,
            PushEvent::PlayerStatus(status) => &status.guild_id,
        }
    }
}

/// Client emissions scoping which guild's broadcasts we receive.
///
/// Serialized adjacently tagged; the push channel turns that into `[event, data]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RoomRequest {
    JoinRoom { guild_id: String },
    LeaveRoom { guild_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS_JSON: &str = r#"{
        "system": {
            "cpu_percent": 45.2,
            "memory": {"total": 8000, "available": 3200, "percent": 60.0, "used": 4800},
            "disk": {"total": 100, "used": 70, "free": 30, "percent": 70.0},
            "network": {"bytes_sent": 1048576, "bytes_recv": 3145728, "packets_sent": 1, "packets_recv": 2}
        },
        "process": {"pid": 4242, "memory_rss": 1, "memory_vms": 2, "cpu_percent": 12.5,
                    "create_time": 1700000000.0, "uptime": 7380.0},
        "audio_cache": {"count": 3, "max_size": 10, "total_size": 3145728, "size_mb": 3.0},
        "cleanup_stats": {"song_play_count": {"1234567890": 4}, "cleanup_threshold": 5,
                          "cache_count": 3, "cache_max_size": 10},
        "playback": {"active_guilds": 1, "playing_songs": 1, "queued_songs": 6},
        "timestamp": 1700007380.0
    }"#;

    #[test]
    fn status_reply_flattens_into_snapshot() {
        let reply: StatusReply = serde_json::from_str(STATUS_JSON).unwrap();
        let snap = StatusSnapshot::from(reply);
        assert_eq!(snap.cpu_percent, 45.2);
        assert_eq!(snap.memory_percent, 60.0);
        assert_eq!(snap.disk_percent, 70.0);
        assert_eq!(snap.process_pid, 4242);
        assert_eq!(snap.network.bytes_recv, 3145728);
        assert_eq!(snap.playback.queued_songs, 6);
        assert_eq!(snap.audio_cache.max_size, 10);
        let cleanup = snap.cleanup.unwrap();
        assert_eq!(cleanup.cleanup_threshold, 5);
        assert_eq!(cleanup.song_play_count.get("1234567890"), Some(&4));
    }

    #[test]
    fn cleanup_stats_are_optional() {
        let mut value: serde_json::Value = serde_json::from_str(STATUS_JSON).unwrap();
        value.as_object_mut().unwrap().remove("cleanup_stats");
        let reply: StatusReply = serde_json::from_value(value).unwrap();
        assert!(reply.cleanup_stats.is_none());
    }

    #[test]
    fn playlist_entry_tolerates_missing_fields() {
        let entry: PlaylistEntry =
            serde_json::from_str(r#"{"id": "local", "name": "Intro", "playing": true}"#).unwrap();
        assert!(entry.playing);
        assert_eq!(entry.artist, None);
        assert_eq!(entry.position, None);
        assert_eq!(entry.queue_index, None);
    }

    #[test]
    fn search_song_accepts_numeric_and_string_ids() {
        let songs: Vec<SearchSong> = serde_json::from_str(
            r#"[
                {"id": 186016, "name": "晴天", "ar": [{"name": "周杰伦"}], "al": {"name": "叶惠美"}},
                {"id": "abc", "name": "Untitled"}
            ]"#,
        )
        .unwrap();
        assert_eq!(songs[0].id.to_string(), "186016");
        assert_eq!(songs[0].artists(), "周杰伦");
        assert_eq!(songs[0].album(), "叶惠美");
        assert_eq!(songs[1].id, SongId::Text("abc".into()));
        assert_eq!(songs[1].artists(), "-");
        assert_eq!(songs[1].primary_artist(), "-");
        assert_eq!(songs[1].album(), "-");
    }

    #[test]
    fn guild_admin_flag_ignores_empty_master() {
        let guild: Guild =
            serde_json::from_str(r#"{"id": "1", "name": "g", "icon": "", "master_id": ""}"#)
                .unwrap();
        assert!(!guild.is_admin());
        let guild: Guild =
            serde_json::from_str(r#"{"id": "1", "name": "g", "master_id": "99"}"#).unwrap();
        assert!(guild.is_admin());
    }

    #[test]
    fn push_events_decode_by_tag() {
        let ev: PushEvent = serde_json::from_str(
            r#"{"event": "playlist_update", "data": {"guild_id": "g1", "playlist": [{"name": "a"}]}}"#,
        )
        .unwrap();
        assert_eq!(ev.guild_id(), "g1");
        match ev {
            PushEvent::PlaylistUpdate { playlist, .. } => assert_eq!(playlist.len(), 1),
            other => panic!("unexpected event {:?}", other),
        }

        let ev: PushEvent = serde_json::from_str(
            r#"{"event": "player_status", "data": {"guild_id": "g2", "playing": true,
                "song_name": "s", "artist_name": "a", "position": 12}}"#,
        )
        .unwrap();
        match ev {
            PushEvent::PlayerStatus(status) => {
                assert!(status.playing);
                assert_eq!(status.position, Some(12.0));
            }
            other => panic!("unexpected event {:?}", other),
        }

        assert!(serde_json::from_str::<PushEvent>(r#"{"event": "pong", "data": {}}"#).is_err());
    }

    #[test]
    fn room_requests_encode_as_events() {
        let json = serde_json::to_value(RoomRequest::JoinRoom {
            guild_id: "g1".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"event": "join_room", "data": {"guild_id": "g1"}})
        );
    }
}
