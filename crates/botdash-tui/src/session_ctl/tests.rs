//! Selection, command and push flow of the bot dashboard controller.
//!
//! Every test drives the controller with canned results and a session file
//! in a temp dir; no server is involved.

use super::*;
use botdash_proto::protocol::{ArtistRef, PlayerStatus, SongId};
use tempfile::TempDir;

fn guild(id: &str, name: &str) -> Guild {
    Guild {
        id: id.to_string(),
        name: name.to_string(),
        icon: None,
        master_id: None,
    }
}

fn channel(id: &str) -> Channel {
    Channel {
        id: id.to_string(),
        name: format!("voice-{}", id),
    }
}

fn song() -> SearchSong {
    SearchSong {
        id: SongId::Num(186016),
        name: "Sunny Day".to_string(),
        ar: vec![
            ArtistRef {
                name: "Jay".to_string(),
            },
            ArtistRef {
                name: "Guest".to_string(),
            },
        ],
        al: None,
    }
}

fn entry(name: &str, playing: bool) -> PlaylistEntry {
    PlaylistEntry {
        name: Some(name.to_string()),
        playing,
        ..Default::default()
    }
}

fn api_err(msg: &str) -> ApiError {
    ApiError::Api {
        message: msg.to_string(),
    }
}

fn controller(dir: &TempDir) -> SessionController {
    SessionController::new(SessionStore::new(dir.path().join("session.json")))
}

/// A controller with guilds loaded and guild `g1` selected.
fn with_guild(dir: &TempDir) -> SessionController {
    let mut ctl = controller(dir);
    ctl.on_guilds(Ok(vec![guild("g1", "Alpha"), guild("g2", "Beta")]));
    ctl.select_guild(0);
    ctl.on_playlist("g1", Ok(Vec::new()));
    ctl
}

fn has_request(effects: &[Effect], req: &Request) -> bool {
    effects.iter().any(|e| matches!(e, Effect::Http(r) if r == req))
}

// ── Selection and restore ─────────────────────────────────────────────────────

#[test]
fn selecting_a_guild_persists_and_fetches_channels_and_playlist() {
    let dir = TempDir::new().unwrap();
    let mut ctl = controller(&dir);
    ctl.on_guilds(Ok(vec![guild("g1", "Alpha")]));

    let effects = ctl.select_guild(0);
    assert!(has_request(
        &effects,
        &Request::Channels {
            guild_id: "g1".into()
        }
    ));
    assert!(has_request(
        &effects,
        &Request::Playlist {
            guild_id: "g1".into()
        }
    ));
    assert!(
        !effects.iter().any(|e| matches!(e, Effect::Room(_))),
        "no push channel, no room emission"
    );
    assert_eq!(ctl.guild_name(), Some("Alpha"));
    assert_eq!(ctl.selected_guild_index(), Some(0));
}

#[test]
fn reload_restores_the_selected_guild_without_user_input() {
    let dir = TempDir::new().unwrap();
    {
        let mut ctl = controller(&dir);
        ctl.on_guilds(Ok(vec![guild("g1", "Alpha"), guild("g2", "Beta")]));
        ctl.select_guild(1);
        ctl.select_channel(Some("c9".into()));
    }

    let mut reloaded = controller(&dir);
    assert_eq!(reloaded.guild_id(), Some("g2"));
    assert_eq!(reloaded.guild_name(), Some("Beta"));
    assert_eq!(reloaded.channel_id(), Some("c9"));

    let effects = reloaded.restore();
    assert!(has_request(&effects, &Request::Guilds));
    assert!(has_request(
        &effects,
        &Request::Channels {
            guild_id: "g2".into()
        }
    ));
    assert!(has_request(
        &effects,
        &Request::Playlist {
            guild_id: "g2".into()
        }
    ));

    reloaded.on_guilds(Ok(vec![guild("g1", "Alpha"), guild("g2", "Beta")]));
    assert_eq!(reloaded.selected_guild_index(), Some(1));
    reloaded.on_channels("g2", Ok(vec![channel("c1"), channel("c9")]));
    assert_eq!(reloaded.selected_channel_index(), Some(1));
}

#[test]
fn empty_store_restores_nothing_but_the_guild_list() {
    let dir = TempDir::new().unwrap();
    let mut ctl = controller(&dir);
    assert_eq!(ctl.restore(), vec![Effect::Http(Request::Guilds)]);
}

#[test]
fn channel_selection_never_calls_the_server() {
    let dir = TempDir::new().unwrap();
    let mut ctl = with_guild(&dir);
    ctl.select_channel(Some("c1".into()));
    assert_eq!(ctl.channel_id(), Some("c1"));
    ctl.select_channel(Some(String::new()));
    assert_eq!(ctl.channel_id(), None);
}

#[test]
fn channel_results_for_another_guild_are_dropped() {
    let dir = TempDir::new().unwrap();
    let mut ctl = with_guild(&dir);
    ctl.on_channels("g2", Ok(vec![channel("x")]));
    assert!(ctl.channels.is_empty());
}

#[test]
fn switching_guilds_moves_the_push_room() {
    let dir = TempDir::new().unwrap();
    let mut ctl = with_guild(&dir);
    assert_eq!(
        ctl.set_push_active(true),
        vec![Effect::Room(RoomRequest::JoinRoom {
            guild_id: "g1".into()
        })]
    );

    let effects = ctl.select_guild(1);
    let rooms: Vec<&RoomRequest> = effects
        .iter()
        .filter_map(|e| match e {
            Effect::Room(r) => Some(r),
            _ => None,
        })
        .collect();
    assert_eq!(
        rooms,
        vec![
            &RoomRequest::LeaveRoom {
                guild_id: "g1".into()
            },
            &RoomRequest::JoinRoom {
                guild_id: "g2".into()
            },
        ]
    );
}

// ── Commands ──────────────────────────────────────────────────────────────────

#[test]
fn channel_bound_commands_short_circuit_without_a_channel() {
    let dir = TempDir::new().unwrap();
    let ctl = with_guild(&dir);
    assert_eq!(ctl.join(), Err(ValidationError::NoChannel));
    assert_eq!(ctl.play(&song()), Err(ValidationError::NoChannel));
    assert_eq!(ctl.import("123"), Err(ValidationError::NoChannel));
    assert!(ctl.pause().is_ok(), "guild-only commands still go out");
}

#[test]
fn commands_need_a_guild() {
    let dir = TempDir::new().unwrap();
    let ctl = controller(&dir);
    assert_eq!(ctl.leave(), Err(ValidationError::NoGuild));
    assert_eq!(ctl.skip(), Err(ValidationError::NoGuild));
    assert_eq!(ctl.join(), Err(ValidationError::NoGuild));
}

#[test]
fn play_sends_first_artist_and_stringified_id() {
    let dir = TempDir::new().unwrap();
    let mut ctl = with_guild(&dir);
    ctl.select_channel(Some("c1".into()));
    let req = ctl.play(&song()).unwrap();
    assert_eq!(
        req,
        Request::Command(BotCommand::Play(PlayRequest {
            guild_id: "g1".into(),
            channel_id: "c1".into(),
            song_id: "186016".into(),
            song_name: "Sunny Day".into(),
            artist_name: "Jay".into(),
        }))
    );
}

#[test]
fn playlist_ids_are_extracted_from_links() {
    assert_eq!(extract_playlist_id(" 24381616 "), Some("24381616".into()));
    assert_eq!(
        extract_playlist_id("https://music.163.com/#/playlist?id=24381616&userid=1"),
        Some("24381616".into())
    );
    assert_eq!(
        extract_playlist_id("https://music.163.com/playlist?id=99"),
        Some("99".into())
    );
    assert_eq!(extract_playlist_id("https://example.com/playlist?id=5"), None);
    assert_eq!(extract_playlist_id("abc"), None);
    assert_eq!(extract_playlist_id(""), None);
    assert!(PLAYLIST_LINK.is_some(), "link pattern compiles");

    let dir = TempDir::new().unwrap();
    let mut ctl = with_guild(&dir);
    ctl.select_channel(Some("c1".into()));
    assert_eq!(ctl.import("not a playlist"), Err(ValidationError::BadPlaylistId));
}

#[test]
fn blank_search_is_rejected() {
    let dir = TempDir::new().unwrap();
    let ctl = controller(&dir);
    assert_eq!(ctl.search("   "), Err(ValidationError::EmptyKeyword));
    assert_eq!(
        ctl.search(" jay "),
        Ok(Request::Search {
            keyword: "jay".into()
        })
    );
}

#[test]
fn successful_command_confirms_and_refreshes_the_playlist() {
    let dir = TempDir::new().unwrap();
    let mut ctl = with_guild(&dir);
    let effects = ctl.on_command(
        BotCommand::Skip {
            guild_id: "g1".into(),
        },
        Ok(CommandReply::Done),
    );
    assert_eq!(effects[0], Effect::Notify(Notice::success("skip ok")));
    assert!(has_request(
        &effects,
        &Request::Playlist {
            guild_id: "g1".into()
        }
    ));
}

#[test]
fn failed_command_surfaces_the_error_and_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut ctl = with_guild(&dir);
    ctl.select_channel(Some("c1".into()));
    let before = ctl.session.clone();
    let effects = ctl.on_command(
        BotCommand::Leave {
            guild_id: "g1".into(),
        },
        Err(api_err("bot is not in a voice channel")),
    );
    assert_eq!(
        effects,
        vec![Effect::Notify(Notice::error(
            "leave failed: bot is not in a voice channel"
        ))]
    );
    assert_eq!(ctl.session, before);
}

#[test]
fn join_enables_leave_and_leave_clears_the_persisted_channel() {
    let dir = TempDir::new().unwrap();
    let mut ctl = with_guild(&dir);
    ctl.select_channel(Some("c1".into()));
    let join = match ctl.join().unwrap() {
        Request::Command(cmd) => cmd,
        other => panic!("unexpected request {:?}", other),
    };
    ctl.on_command(join, Ok(CommandReply::Done));
    assert!(ctl.leave_enabled());

    let effects = ctl.on_command(
        BotCommand::Leave {
            guild_id: "g1".into(),
        },
        Ok(CommandReply::Done),
    );
    assert!(!ctl.leave_enabled());
    assert_eq!(ctl.channel_id(), None);
    assert!(
        !effects.iter().any(|e| matches!(e, Effect::Http(_))),
        "leave does not refresh the playlist"
    );

    let reloaded = controller(&dir);
    assert_eq!(reloaded.channel_id(), None);
    assert_eq!(reloaded.guild_id(), Some("g1"), "guild survives leave");
}

#[test]
fn leave_is_refused_until_a_join_succeeds() {
    let dir = TempDir::new().unwrap();
    let mut ctl = with_guild(&dir);
    ctl.select_channel(Some("c1".into()));
    assert_eq!(ctl.leave(), Err(ValidationError::NotInVoice));

    ctl.on_command(
        BotCommand::Join {
            guild_id: "g1".into(),
            channel_id: "c1".into(),
        },
        Ok(CommandReply::Done),
    );
    assert_eq!(
        ctl.leave(),
        Ok(Request::Command(BotCommand::Leave {
            guild_id: "g1".into()
        }))
    );
}

#[test]
fn import_reports_the_song_count() {
    let dir = TempDir::new().unwrap();
    let mut ctl = with_guild(&dir);
    let effects = ctl.on_command(
        BotCommand::Import(ImportRequest {
            guild_id: "g1".into(),
            channel_id: "c1".into(),
            playlist_id: "7".into(),
        }),
        Ok(CommandReply::Imported(12)),
    );
    assert_eq!(
        effects[0],
        Effect::Notify(Notice::success("imported playlist, 12 songs"))
    );
}

#[test]
fn search_results_replace_the_table() {
    let dir = TempDir::new().unwrap();
    let mut ctl = controller(&dir);
    ctl.on_search(Ok(vec![song(), song()]));
    assert_eq!(ctl.search_results.len(), 2);
    let effects = ctl.on_search(Err(api_err("upstream timeout")));
    assert_eq!(ctl.search_results.len(), 2);
    assert_eq!(
        effects,
        vec![Effect::Notify(Notice::error("search failed: upstream timeout"))]
    );
}

#[test]
fn seek_is_relative_to_the_last_known_position() {
    let dir = TempDir::new().unwrap();
    let mut ctl = with_guild(&dir);
    assert_eq!(ctl.seek_by(10.0), Err(ValidationError::NothingPlaying));

    let mut playing = entry("now", true);
    playing.position = Some(4.0);
    playing.duration = Some(200.0);
    ctl.tick();
    ctl.on_playlist("g1", Ok(vec![playing]));

    assert_eq!(
        ctl.seek_by(SEEK_STEP_SECS),
        Ok(Request::Command(BotCommand::Seek {
            guild_id: "g1".into(),
            position: 14
        }))
    );
    assert_eq!(
        ctl.seek_by(-SEEK_STEP_SECS),
        Ok(Request::Command(BotCommand::Seek {
            guild_id: "g1".into(),
            position: 0
        }))
    );
}

// ── Playlist refresh and push ─────────────────────────────────────────────────

#[test]
fn timer_refresh_needs_a_guild_and_keeps_one_request_outstanding() {
    let dir = TempDir::new().unwrap();
    let mut ctl = controller(&dir);
    assert_eq!(ctl.tick(), None);

    let mut ctl = with_guild(&dir);
    let req = ctl.tick();
    assert_eq!(
        req,
        Some(Request::Playlist {
            guild_id: "g1".into()
        })
    );
    assert_eq!(ctl.tick(), None);
    assert_eq!(ctl.on_playlist("g1", Ok(vec![entry("a", true)])), None);
    assert_eq!(
        ctl.playlist.now_playing.as_ref().map(|n| n.title.as_str()),
        Some("a")
    );
}

#[test]
fn refresh_asked_for_mid_fetch_runs_afterwards() {
    let dir = TempDir::new().unwrap();
    let mut ctl = with_guild(&dir);
    ctl.tick();
    let effects = ctl.on_command(
        BotCommand::Clear {
            guild_id: "g1".into(),
        },
        Ok(CommandReply::Done),
    );
    assert_eq!(effects.len(), 1);
    assert_eq!(
        ctl.on_playlist("g1", Ok(Vec::new())),
        Some(Request::Playlist {
            guild_id: "g1".into()
        })
    );
}

#[test]
fn failed_refresh_keeps_the_previous_view() {
    let dir = TempDir::new().unwrap();
    let mut ctl = with_guild(&dir);
    ctl.tick();
    ctl.on_playlist("g1", Ok(vec![entry("a", false)]));
    ctl.tick();
    ctl.on_playlist("g1", Err(api_err("db locked")));
    assert_eq!(ctl.playlist.queue.len(), 1);
}

#[test]
fn push_events_are_filtered_to_the_selected_guild() {
    let dir = TempDir::new().unwrap();
    let mut ctl = with_guild(&dir);

    ctl.on_push(PushEvent::PlaylistUpdate {
        guild_id: "g2".into(),
        playlist: vec![entry("other", false)],
    });
    assert_eq!(ctl.playlist, crate::playlist::PlaylistView::default());

    ctl.on_push(PushEvent::PlaylistUpdate {
        guild_id: "g1".into(),
        playlist: vec![entry("mine", true), entry("next", false)],
    });
    assert_eq!(ctl.playlist.queue.len(), 1);

    ctl.on_push(PushEvent::PlayerStatus(PlayerStatus {
        guild_id: "g1".into(),
        playing: false,
        ..Default::default()
    }));
    assert!(ctl.playlist.now_playing.is_none());
    assert_eq!(ctl.playlist.queue.len(), 1);
}
