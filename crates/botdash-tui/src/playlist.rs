//! Playlist reconciliation.
//!
//! The view is rebuilt wholesale from every fetched or pushed list; nothing
//! here patches a previous render.

use botdash_proto::protocol::{PlayerStatus, PlaylistEntry};

#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub position: Option<f64>,
    pub duration: Option<f64>,
}

impl NowPlaying {
    /// 0..=100, or 0 when the position is unknown.
    pub fn progress(&self) -> f64 {
        match self.position {
            Some(pos) => progress_percent(pos, self.duration.unwrap_or(0.0)),
            None => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueueRow {
    /// 1-based display number.
    pub number: usize,
    pub title: String,
    pub artist: String,
    pub duration: String,
    /// What `/api/remove` expects for this row.
    pub remove_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistView {
    pub now_playing: Option<NowPlaying>,
    pub queue: Vec<QueueRow>,
}

impl PlaylistView {
    pub fn reconcile(entries: &[PlaylistEntry]) -> Self {
        let now_playing = entries.iter().find(|e| e.playing).map(|e| NowPlaying {
            title: title_of(e.name.as_deref()),
            artist: artist_of(e.artist.as_deref()),
            position: e.position,
            duration: e.duration,
        });
        let queue = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.playing)
            .enumerate()
            .map(|(n, (idx, e))| QueueRow {
                number: n + 1,
                title: title_of(e.name.as_deref()),
                artist: artist_of(e.artist.as_deref()),
                duration: fmt_duration(e.duration),
                remove_index: e.queue_index.unwrap_or(idx),
            })
            .collect();
        Self { now_playing, queue }
    }

    /// Apply a pushed player status.  The queue is left alone; only the
    /// now-playing block is replaced.
    pub fn apply_player_status(&mut self, status: &PlayerStatus) {
        self.now_playing = if status.playing {
            Some(NowPlaying {
                title: title_of(status.song_name.as_deref()),
                artist: artist_of(status.artist_name.as_deref()),
                position: status.position,
                duration: None,
            })
        } else {
            None
        };
    }
}

fn title_of(name: Option<&str>) -> String {
    match name {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => "Unknown song".to_string(),
    }
}

fn artist_of(artist: Option<&str>) -> String {
    match artist {
        Some(a) if !a.is_empty() => a.to_string(),
        _ => "Unknown artist".to_string(),
    }
}

/// `position / max(duration, position, 1)` as a percentage in 0..=100.
pub fn progress_percent(position: f64, duration: f64) -> f64 {
    let position = if position.is_finite() { position.max(0.0) } else { 0.0 };
    let duration = if duration.is_finite() { duration } else { 0.0 };
    let denom = duration.max(position).max(1.0);
    (position / denom * 100.0).clamp(0.0, 100.0)
}

/// `mm:ss`; minutes are not wrapped into hours.
pub fn fmt_clock(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Like [`fmt_clock`] but "--:--" when the duration is unknown or zero.
pub fn fmt_duration(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s.is_finite() && s > 0.0 => fmt_clock(s),
        _ => "--:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, playing: bool) -> PlaylistEntry {
        PlaylistEntry {
            name: Some(name.to_string()),
            artist: Some(format!("{} artist", name)),
            playing,
            ..Default::default()
        }
    }

    #[test]
    fn playing_entry_drives_now_playing_and_is_excluded_from_the_queue() {
        let mut playing = entry("b", true);
        playing.position = Some(30.0);
        playing.duration = Some(120.0);
        let entries = vec![entry("a", false), playing, entry("c", false), entry("d", false)];

        let view = PlaylistView::reconcile(&entries);
        let now = view.now_playing.as_ref().unwrap();
        assert_eq!(now.title, "b");
        assert_eq!(now.artist, "b artist");
        assert_eq!(now.progress(), 25.0);

        let titles: Vec<&str> = view.queue.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c", "d"]);
        let numbers: Vec<usize> = view.queue.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn remove_index_prefers_the_server_queue_index() {
        let mut a = entry("a", false);
        a.queue_index = Some(7);
        let entries = vec![entry("p", true), a, entry("b", false)];
        let view = PlaylistView::reconcile(&entries);
        assert_eq!(view.queue[0].remove_index, 7);
        assert_eq!(view.queue[1].remove_index, 2);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let entries = vec![entry("x", true), entry("y", false)];
        let first = PlaylistView::reconcile(&entries);
        let second = PlaylistView::reconcile(&entries);
        assert_eq!(first, second);
    }

    #[test]
    fn nothing_playing_means_no_now_playing_block() {
        let view = PlaylistView::reconcile(&[entry("q", false)]);
        assert!(view.now_playing.is_none());
        assert_eq!(view.queue.len(), 1);
        assert_eq!(PlaylistView::reconcile(&[]), PlaylistView::default());
    }

    #[test]
    fn missing_names_get_placeholders() {
        let view = PlaylistView::reconcile(&[PlaylistEntry::default()]);
        assert_eq!(view.queue[0].title, "Unknown song");
        assert_eq!(view.queue[0].artist, "Unknown artist");
        assert_eq!(view.queue[0].duration, "--:--");
    }

    #[test]
    fn progress_is_bounded_and_never_nan() {
        assert_eq!(progress_percent(0.0, 0.0), 0.0);
        assert_eq!(progress_percent(50.0, 0.0), 100.0);
        assert_eq!(progress_percent(300.0, 200.0), 100.0);
        assert_eq!(progress_percent(-5.0, 100.0), 0.0);
        assert_eq!(progress_percent(0.5, 0.0), 50.0);
        assert_eq!(progress_percent(f64::NAN, 10.0), 0.0);
        for (p, d) in [(1.0, 3.0), (10.0, 0.0), (1e9, 1.0), (0.0, 1e9)] {
            let pct = progress_percent(p, d);
            assert!((0.0..=100.0).contains(&pct));
        }
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(fmt_clock(0.0), "00:00");
        assert_eq!(fmt_clock(65.9), "01:05");
        assert_eq!(fmt_clock(3600.0), "60:00");
        assert_eq!(fmt_duration(None), "--:--");
        assert_eq!(fmt_duration(Some(0.0)), "--:--");
        assert_eq!(fmt_duration(Some(215.0)), "03:35");
    }

    #[test]
    fn player_status_replaces_now_playing_only() {
        let mut view = PlaylistView::reconcile(&[entry("a", true), entry("b", false)]);
        view.apply_player_status(&PlayerStatus {
            guild_id: "g".into(),
            playing: true,
            song_name: Some("pushed".into()),
            artist_name: None,
            position: Some(12.0),
        });
        let now = view.now_playing.as_ref().unwrap();
        assert_eq!(now.title, "pushed");
        assert_eq!(now.artist, "Unknown artist");
        assert_eq!(now.duration, None);
        assert_eq!(view.queue.len(), 1);

        view.apply_player_status(&PlayerStatus {
            guild_id: "g".into(),
            playing: false,
            ..Default::default()
        });
        assert!(view.now_playing.is_none());
    }
}
