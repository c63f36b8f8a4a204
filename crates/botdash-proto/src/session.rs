use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The guild/channel the dashboard is pointed at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "currentGuildId", default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    #[serde(rename = "currentGuildName", default, skip_serializing_if = "Option::is_none")]
    pub guild_name: Option<String>,
    #[serde(rename = "currentChannelId", default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

impl Session {
    /// Guild id and name, if both were persisted.  A session restores only
    /// when it has both.
    pub fn restorable_guild(&self) -> Option<(&str, &str)> {
        match (self.guild_id.as_deref(), self.guild_name.as_deref()) {
            (Some(id), Some(name)) if !id.is_empty() && !name.is_empty() => Some((id, name)),
            _ => None,
        }
    }

    pub fn select_guild(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.guild_id = Some(id.into());
        self.guild_name = Some(name.into());
    }

    /// `None` or an empty id deselects the channel.
    pub fn select_channel(&mut self, id: Option<String>) {
        self.channel_id = id.filter(|c| !c.is_empty());
    }

    pub fn clear_channel(&mut self) {
        self.channel_id = None;
    }
}

/// Durable home of the [`Session`]: a small JSON file.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable file yields an empty session.
    pub fn load(&self) -> Session {
        if let Ok(content) = std::fs::read_to_string(&self.path) {
            match serde_json::from_str::<Session>(&content) {
                Ok(session) => return session,
                Err(e) => {
                    tracing::warn!("ignoring corrupt session file {}: {}", self.path.display(), e)
                }
            }
        }
        Session::default()
    }

    pub fn save(&self, session: &Session) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("s").join("session.json"));
        assert_eq!(store.load(), Session::default());

        let mut session = Session::default();
        session.select_guild("g1", "Guild One");
        session.select_channel(Some("c9".into()));
        store.save(&session).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("currentGuildId"));
        assert_eq!(store.load(), session);
    }

    #[test]
    fn cleared_channel_is_dropped_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let mut session = Session::default();
        session.select_guild("g1", "Guild One");
        session.select_channel(Some("c9".into()));
        store.save(&session).unwrap();

        session.clear_channel();
        store.save(&session).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("currentChannelId"));
        assert_eq!(store.load().guild_id.as_deref(), Some("g1"));
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(SessionStore::new(path).load(), Session::default());
    }

    #[test]
    fn restore_requires_id_and_name() {
        let mut session = Session {
            guild_id: Some("g1".into()),
            ..Default::default()
        };
        assert_eq!(session.restorable_guild(), None);
        session.guild_name = Some("Guild".into());
        assert_eq!(session.restorable_guild(), Some(("g1", "Guild")));
    }

    #[test]
    fn empty_channel_selection_deselects() {
        let mut session = Session::default();
        session.select_channel(Some(String::new()));
        assert_eq!(session.channel_id, None);
    }
}
