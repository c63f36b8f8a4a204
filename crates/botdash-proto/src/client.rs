//! Typed client for the dashboard REST API.
//!
//! All endpoints answer with a JSON object carrying `success: bool`; on
//! failure it also carries an `error` string.  [`unwrap_envelope`] turns that
//! into either the typed payload or [`ApiError::Api`].

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::protocol::{
    Ack, CacheTestReply, Channel, ChannelsReply, CleanupReport, Guild, GuildRequest, GuildsReply,
    ImportReply, ImportRequest, JoinRequest, MessageReply, PlayRequest, PlaylistEntry,
    PlaylistReply, RemoveRequest, SearchReply, SearchSong, SeekRequest, StatusReply,
    StatusSnapshot, TerminalOutput, ThresholdRequest,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network failure, HTTP error status or an unreadable body.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Body was JSON but not the shape we expected.
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The server answered `success: false`.
    #[error("{message}")]
    Api { message: String },
}

impl ApiError {
    /// True for the transport tier (network / decode), false for structured
    /// application failures.
    pub fn is_transport(&self) -> bool {
        !matches!(self, ApiError::Api { .. })
    }
}

/// Strip the `{success, error}` envelope off a decoded reply.
pub fn unwrap_envelope<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    let success = value
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !success {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(ApiError::Api { message });
    }
    Ok(serde_json::from_value(value)?)
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("botdash/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        decode(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        decode(response).await
    }

    /// POST with no body; the maintenance endpoints take no parameters.
    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .post(self.url(path))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .send()
            .await?;
        decode(response).await
    }

    // ── Monitor ───────────────────────────────────────────────────────────────

    pub async fn system_status(&self) -> Result<StatusSnapshot, ApiError> {
        let reply: StatusReply = self.get("/api/system/status", &[]).await?;
        Ok(reply.into())
    }

    pub async fn terminal_output(&self, last_position: u64) -> Result<TerminalOutput, ApiError> {
        let pos = last_position.to_string();
        self.get("/api/terminal/output", &[("last_position", pos.as_str())])
            .await
    }

    pub async fn cleanup_now(&self) -> Result<CleanupReport, ApiError> {
        self.post_empty("/api/system/cleanup").await
    }

    pub async fn set_cleanup_threshold(&self, threshold: u8) -> Result<MessageReply, ApiError> {
        self.post("/api/system/cleanup/config", &ThresholdRequest { threshold })
            .await
    }

    pub async fn cache_test(&self) -> Result<CacheTestReply, ApiError> {
        self.post_empty("/api/cache/test").await
    }

    // ── Guilds / playlist ─────────────────────────────────────────────────────

    pub async fn guilds(&self) -> Result<Vec<Guild>, ApiError> {
        let reply: GuildsReply = self.get("/api/guilds", &[]).await?;
        Ok(reply.guilds)
    }

    pub async fn channels(&self, guild_id: &str) -> Result<Vec<Channel>, ApiError> {
        let reply: ChannelsReply = self.get("/api/channels", &[("guild_id", guild_id)]).await?;
        Ok(reply.channels)
    }

    pub async fn current_playlist(&self, guild_id: &str) -> Result<Vec<PlaylistEntry>, ApiError> {
        let reply: PlaylistReply = self
            .get("/api/playlist/current", &[("guild_id", guild_id)])
            .await?;
        Ok(reply.playlist)
    }

    pub async fn search(&self, keyword: &str) -> Result<Vec<SearchSong>, ApiError> {
        let reply: SearchReply = self.get("/api/search", &[("keyword", keyword)]).await?;
        Ok(reply.songs)
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    pub async fn join(&self, guild_id: &str, channel_id: &str) -> Result<(), ApiError> {
        let body = JoinRequest {
            guild_id: guild_id.to_string(),
            channel_id: channel_id.to_string(),
        };
        self.post::<_, Ack>("/api/join", &body).await.map(|_| ())
    }

    pub async fn leave(&self, guild_id: &str) -> Result<(), ApiError> {
        self.guild_command("/api/leave", guild_id).await
    }

    pub async fn play(&self, request: &PlayRequest) -> Result<(), ApiError> {
        self.post::<_, Ack>("/api/play", request).await.map(|_| ())
    }

    pub async fn pause(&self, guild_id: &str) -> Result<(), ApiError> {
        self.guild_command("/api/pause", guild_id).await
    }

    pub async fn resume(&self, guild_id: &str) -> Result<(), ApiError> {
        self.guild_command("/api/resume", guild_id).await
    }

    pub async fn skip(&self, guild_id: &str) -> Result<(), ApiError> {
        self.guild_command("/api/skip", guild_id).await
    }

    pub async fn stop(&self, guild_id: &str) -> Result<(), ApiError> {
        self.guild_command("/api/stop", guild_id).await
    }

    pub async fn clear(&self, guild_id: &str) -> Result<(), ApiError> {
        self.guild_command("/api/clear", guild_id).await
    }

    pub async fn remove(&self, guild_id: &str, index: usize) -> Result<(), ApiError> {
        let body = RemoveRequest {
            guild_id: guild_id.to_string(),
            index,
        };
        self.post::<_, Ack>("/api/remove", &body).await.map(|_| ())
    }

    pub async fn seek(&self, guild_id: &str, position: u64) -> Result<(), ApiError> {
        let body = SeekRequest {
            guild_id: guild_id.to_string(),
            position,
        };
        self.post::<_, Ack>("/api/seek", &body).await.map(|_| ())
    }

    /// Returns how many songs were queued.
    pub async fn import_playlist(&self, request: &ImportRequest) -> Result<u64, ApiError> {
        let reply: ImportReply = self.post("/api/playlist", request).await?;
        Ok(reply.count)
    }

    async fn guild_command(&self, path: &str, guild_id: &str) -> Result<(), ApiError> {
        let body = GuildRequest {
            guild_id: guild_id.to_string(),
        };
        self.post::<_, Ack>(path, &body).await.map(|_| ())
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status_error = response.error_for_status_ref().err();
    let bytes = response.bytes().await?;
    match (serde_json::from_slice::<Value>(&bytes), status_error) {
        (Ok(value), None) => unwrap_envelope(value),
        // An error status that still carries a structured message
        (Ok(value), Some(_)) if value.get("error").is_some() => unwrap_envelope(value),
        (_, Some(e)) => Err(ApiError::Transport(e)),
        (Err(e), None) => Err(ApiError::Decode(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_failure_carries_server_message() {
        let err = unwrap_envelope::<Ack>(json!({"success": false, "error": "缺少guild_id参数"}))
            .unwrap_err();
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "缺少guild_id参数");
    }

    #[test]
    fn envelope_without_success_is_a_failure() {
        let err = unwrap_envelope::<Ack>(json!({"output": ""})).unwrap_err();
        assert!(matches!(err, ApiError::Api { ref message } if message == "unknown error"));
    }

    #[test]
    fn envelope_success_decodes_payload() {
        let out: TerminalOutput = unwrap_envelope(json!({
            "success": true, "output": "a\nb\n", "file_size": 42, "timestamp": 1.0
        }))
        .unwrap();
        assert_eq!(out.file_size, 42);
        assert_eq!(out.output, "a\nb\n");
    }

    #[test]
    fn envelope_success_with_wrong_shape_is_decode_error() {
        let err = unwrap_envelope::<TerminalOutput>(json!({"success": true})).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert!(err.is_transport());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://127.0.0.1:5000/").unwrap();
        assert_eq!(client.url("/api/guilds"), "http://127.0.0.1:5000/api/guilds");
    }
}
