//! Request plumbing between the controllers and the network.
//!
//! Controllers never perform I/O.  They return [`Effect`]s describing what
//! should happen next; the App spawns one task per [`Request`] via
//! [`spawn_request`], and each task sends a single [`Outcome`] back into the
//! event loop.  Everything that touches controller state therefore runs on
//! the loop, in arrival order.

use tokio::sync::mpsc;
use tracing::debug;

use botdash_proto::client::{ApiClient, ApiError};
use botdash_proto::protocol::{
    CacheTestReply, Channel, CleanupReport, Guild, ImportRequest, MessageReply, PlayRequest,
    PlaylistEntry, RoomRequest, SearchSong, StatusSnapshot, TerminalOutput,
};

use crate::widgets::toast::Severity;

/// A mutating call against the bot.  Every variant is keyed by guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Join { guild_id: String, channel_id: String },
    Leave { guild_id: String },
    Play(PlayRequest),
    Pause { guild_id: String },
    Resume { guild_id: String },
    Skip { guild_id: String },
    Stop { guild_id: String },
    Clear { guild_id: String },
    Remove { guild_id: String, index: usize },
    Seek { guild_id: String, position: u64 },
    Import(ImportRequest),
}

impl BotCommand {
    pub fn guild_id(&self) -> &str {
        match self {
            BotCommand::Join { guild_id, .. }
            | BotCommand::Leave { guild_id }
            | BotCommand::Pause { guild_id }
            | BotCommand::Resume { guild_id }
            | BotCommand::Skip { guild_id }
            | BotCommand::Stop { guild_id }
            | BotCommand::Clear { guild_id }
            | BotCommand::Remove { guild_id, .. }
            | BotCommand::Seek { guild_id, .. } => guild_id,
            BotCommand::Play(req) => &req.guild_id,
            BotCommand::Import(req) => &req.guild_id,
        }
    }

    /// Verb used in toasts and logs.
    pub fn label(&self) -> &'static str {
        match self {
            BotCommand::Join { .. } => "join",
            BotCommand::Leave { .. } => "leave",
            BotCommand::Play(_) => "play",
            BotCommand::Pause { .. } => "pause",
            BotCommand::Resume { .. } => "resume",
            BotCommand::Skip { .. } => "skip",
            BotCommand::Stop { .. } => "stop",
            BotCommand::Clear { .. } => "clear",
            BotCommand::Remove { .. } => "remove",
            BotCommand::Seek { .. } => "seek",
            BotCommand::Import(_) => "import",
        }
    }
}

/// What a successful command returned beyond the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandReply {
    Done,
    Imported(u64),
}

/// One network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Status,
    LogTail { offset: u64 },
    CleanupNow,
    SetThreshold(u8),
    CacheTest,
    Guilds,
    Channels { guild_id: String },
    Playlist { guild_id: String },
    Search { keyword: String },
    Command(BotCommand),
}

/// The typed result of a [`Request`], delivered back to the loop.
#[derive(Debug)]
pub enum Outcome {
    Status(Result<StatusSnapshot, ApiError>),
    LogTail(Result<TerminalOutput, ApiError>),
    Cleanup(Result<CleanupReport, ApiError>),
    Threshold {
        threshold: u8,
        result: Result<MessageReply, ApiError>,
    },
    CacheTest(Result<CacheTestReply, ApiError>),
    Guilds(Result<Vec<Guild>, ApiError>),
    Channels {
        guild_id: String,
        result: Result<Vec<Channel>, ApiError>,
    },
    Playlist {
        guild_id: String,
        result: Result<Vec<PlaylistEntry>, ApiError>,
    },
    Search(Result<Vec<SearchSong>, ApiError>),
    Command {
        command: BotCommand,
        result: Result<CommandReply, ApiError>,
    },
}

/// A user-facing message produced by a controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }
}

/// Something a controller wants the App to do on its behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Http(Request),
    Room(RoomRequest),
    Notify(Notice),
}

/// Run `request` on its own task and send the outcome through `tx`.
///
/// The task holds no controller state; if the loop has gone away the
/// outcome is simply dropped.
pub fn spawn_request<M>(client: &ApiClient, request: Request, tx: mpsc::Sender<M>)
where
    M: From<Outcome> + Send + 'static,
{
    let client = client.clone();
    tokio::spawn(async move {
        let outcome = execute(&client, request).await;
        let _ = tx.send(M::from(outcome)).await;
    });
}

pub async fn execute(client: &ApiClient, request: Request) -> Outcome {
    debug!("request: {:?}", request);
    match request {
        Request::Status => Outcome::Status(client.system_status().await),
        Request::LogTail { offset } => Outcome::LogTail(client.terminal_output(offset).await),
        Request::CleanupNow => Outcome::Cleanup(client.cleanup_now().await),
        Request::SetThreshold(threshold) => Outcome::Threshold {
            threshold,
            result: client.set_cleanup_threshold(threshold).await,
        },
        Request::CacheTest => Outcome::CacheTest(client.cache_test().await),
        Request::Guilds => Outcome::Guilds(client.guilds().await),
        Request::Channels { guild_id } => {
            let result = client.channels(&guild_id).await;
            Outcome::Channels { guild_id, result }
        }
        Request::Playlist { guild_id } => {
            let result = client.current_playlist(&guild_id).await;
            Outcome::Playlist { guild_id, result }
        }
        Request::Search { keyword } => Outcome::Search(client.search(&keyword).await),
        Request::Command(command) => {
            let result = run_command(client, &command).await;
            Outcome::Command { command, result }
        }
    }
}

async fn run_command(client: &ApiClient, command: &BotCommand) -> Result<CommandReply, ApiError> {
    match command {
        BotCommand::Join {
            guild_id,
            channel_id,
        } => client.join(guild_id, channel_id).await?,
        BotCommand::Leave { guild_id } => client.leave(guild_id).await?,
        BotCommand::Play(req) => client.play(req).await?,
        BotCommand::Pause { guild_id } => client.pause(guild_id).await?,
        BotCommand::Resume { guild_id } => client.resume(guild_id).await?,
        BotCommand::Skip { guild_id } => client.skip(guild_id).await?,
        BotCommand::Stop { guild_id } => client.stop(guild_id).await?,
        BotCommand::Clear { guild_id } => client.clear(guild_id).await?,
        BotCommand::Remove { guild_id, index } => client.remove(guild_id, *index).await?,
        BotCommand::Seek { guild_id, position } => client.seek(guild_id, *position).await?,
        BotCommand::Import(req) => {
            let count = client.import_playlist(req).await?;
            return Ok(CommandReply::Imported(count));
        }
    }
    Ok(CommandReply::Done)
}
