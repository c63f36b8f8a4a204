//! Client-side rejections. None of these ever reach the network.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("cleanup threshold must be a whole number between 1 and 10")]
    ThresholdOutOfRange,
    #[error("select a server first")]
    NoGuild,
    #[error("select a voice channel first")]
    NoChannel,
    #[error("enter a search keyword")]
    EmptyKeyword,
    #[error("enter a playlist id or a music.163.com playlist link")]
    BadPlaylistId,
    #[error("the bot has not joined a voice channel")]
    NotInVoice,
    #[error("nothing is playing")]
    NothingPlaying,
}
