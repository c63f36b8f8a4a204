//! System monitor: status polling, rolling charts and maintenance actions.

use std::collections::VecDeque;

use tracing::{info, warn};

use botdash_proto::client::ApiError;
use botdash_proto::protocol::{CacheTestReply, CleanupReport, MessageReply, StatusSnapshot};

use crate::core::{Effect, Notice, Request};
use crate::error::ValidationError;

pub const THRESHOLD_MIN: u8 = 1;
pub const THRESHOLD_MAX: u8 = 10;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// ── Time series ───────────────────────────────────────────────────────────────

/// Bounded FIFO of labelled points.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    points: VecDeque<(String, f64)>,
    capacity: usize,
}

impl TimeSeries {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        if self.capacity == 0 {
            return;
        }
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back((label.into(), value));
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<f64> {
        self.points.back().map(|(_, v)| *v)
    }

    /// `(x, y)` pairs for a ratatui chart dataset, x being the point index.
    pub fn chart_points(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, (_, v))| (i as f64, *v))
            .collect()
    }

    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|(_, v)| *v).fold(0.0, f64::max)
    }

    pub fn first_label(&self) -> Option<&str> {
        self.points.front().map(|(l, _)| l.as_str())
    }

    pub fn last_label(&self) -> Option<&str> {
        self.points.back().map(|(l, _)| l.as_str())
    }
}

/// Two series that always grow together, so their lengths never differ.
#[derive(Debug, Clone)]
pub struct DualSeries {
    pub first: TimeSeries,
    pub second: TimeSeries,
}

impl DualSeries {
    pub fn new(capacity: usize) -> Self {
        Self {
            first: TimeSeries::new(capacity),
            second: TimeSeries::new(capacity),
        }
    }

    pub fn push(&mut self, label: &str, first: f64, second: f64) {
        self.first.push(label, first);
        self.second.push(label, second);
    }
}

// ── Derived view ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Ok,
    Warning,
    Error,
}

/// Badge levels for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badges {
    pub cpu: Level,
    pub memory: Level,
    pub disk: Level,
    pub process_cpu: Level,
    pub cache: Level,
    pub playback: Level,
}

impl Badges {
    pub fn from_snapshot(snap: &StatusSnapshot) -> Self {
        let over = |value: f64, limit: f64, level: Level| {
            if value > limit {
                level
            } else {
                Level::Ok
            }
        };
        let cache = if snap.audio_cache.count >= snap.audio_cache.max_size {
            Level::Warning
        } else {
            Level::Ok
        };
        let playback = if snap.playback.active_guilds > 0 {
            Level::Ok
        } else {
            Level::Warning
        };
        Self {
            cpu: over(snap.cpu_percent, 80.0, Level::Warning),
            memory: over(snap.memory_percent, 80.0, Level::Warning),
            disk: over(snap.disk_percent, 90.0, Level::Error),
            process_cpu: over(snap.process_cpu_percent, 50.0, Level::Warning),
            cache,
            playback,
        }
    }
}

/// Display strings for one snapshot.  A pure function of the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Gauges {
    pub cpu: String,
    pub memory: String,
    pub disk: String,
    pub uptime: String,
    pub process: String,
    pub playback: String,
    pub cache: String,
    pub cache_size: String,
    pub cache_fill_percent: f64,
    pub cleanup_threshold: String,
    pub play_counts: String,
}

impl Gauges {
    pub fn from_snapshot(snap: &StatusSnapshot) -> Self {
        let cache = snap.audio_cache;
        let cache_fill_percent = if cache.max_size == 0 {
            0.0
        } else {
            (cache.count as f64 / cache.max_size as f64 * 100.0).clamp(0.0, 100.0)
        };
        let (cleanup_threshold, play_counts) = match &snap.cleanup {
            Some(c) => (c.cleanup_threshold.to_string(), play_count_summary(c)),
            None => ("-".to_string(), "none".to_string()),
        };
        Self {
            cpu: percent(snap.cpu_percent),
            memory: percent(snap.memory_percent),
            disk: percent(snap.disk_percent),
            uptime: fmt_uptime(snap.process_uptime_seconds),
            process: format!(
                "PID {} | CPU {}",
                snap.process_pid,
                percent(snap.process_cpu_percent)
            ),
            playback: format!(
                "{} active | {} playing | {} queued",
                snap.playback.active_guilds, snap.playback.playing_songs, snap.playback.queued_songs
            ),
            cache: format!("{}/{}", cache.count, cache.max_size),
            cache_size: format!("{:.2} MB", cache.size_mb),
            cache_fill_percent,
            cleanup_threshold,
            play_counts,
        }
    }
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn fmt_uptime(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
}

fn play_count_summary(cleanup: &botdash_proto::protocol::CleanupStats) -> String {
    if cleanup.song_play_count.is_empty() {
        return "none".to_string();
    }
    cleanup
        .song_play_count
        .iter()
        .map(|(guild, count)| {
            let short: String = guild.chars().take(8).collect();
            format!("{}: {}", short, count)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a threshold typed by the user.  Only whole numbers in 1..=10 pass.
pub fn validate_threshold(input: &str) -> Result<u8, ValidationError> {
    let value: i64 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::ThresholdOutOfRange)?;
    if (THRESHOLD_MIN as i64..=THRESHOLD_MAX as i64).contains(&value) {
        Ok(value as u8)
    } else {
        Err(ValidationError::ThresholdOutOfRange)
    }
}

// ── Poller ────────────────────────────────────────────────────────────────────

/// Owns the status view and guarantees at most one status request in flight.
pub struct StatusPoller {
    snapshot: Option<StatusSnapshot>,
    pub resources: DualSeries,
    pub network: DualSeries,
    running: bool,
    in_flight: bool,
    refresh_queued: bool,
    last_cache_test: Option<String>,
}

impl StatusPoller {
    pub fn new(series_capacity: usize) -> Self {
        Self {
            snapshot: None,
            resources: DualSeries::new(series_capacity),
            network: DualSeries::new(series_capacity),
            running: false,
            in_flight: false,
            refresh_queued: false,
            last_cache_test: None,
        }
    }

    pub fn snapshot(&self) -> Option<&StatusSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn gauges(&self) -> Option<Gauges> {
        self.snapshot.as_ref().map(Gauges::from_snapshot)
    }

    pub fn badges(&self) -> Option<Badges> {
        self.snapshot.as_ref().map(Badges::from_snapshot)
    }

    pub fn last_cache_test(&self) -> Option<&str> {
        self.last_cache_test.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Begin polling.  Returns the immediate first fetch.
    pub fn start(&mut self) -> Option<Request> {
        self.running = true;
        self.tick()
    }

    /// Stop scheduling fetches.  An outstanding request still lands.
    pub fn stop(&mut self) {
        self.running = false;
        self.refresh_queued = false;
    }

    /// Periodic fetch.  Skipped while stopped or while one is outstanding.
    pub fn tick(&mut self) -> Option<Request> {
        if !self.running || self.in_flight {
            return None;
        }
        self.in_flight = true;
        Some(Request::Status)
    }

    /// Out-of-band fetch after a mutation.  Queued behind an outstanding one.
    pub fn refresh_now(&mut self) -> Option<Request> {
        if self.in_flight {
            self.refresh_queued = true;
            return None;
        }
        self.in_flight = true;
        Some(Request::Status)
    }

    /// Apply a status result.  `label` is the wall-clock label for the new
    /// chart point.
    pub fn on_status(
        &mut self,
        result: Result<StatusSnapshot, ApiError>,
        label: &str,
    ) -> Option<Request> {
        self.in_flight = false;
        match result {
            Ok(snap) => {
                self.resources
                    .push(label, snap.cpu_percent, snap.memory_percent);
                self.network.push(
                    label,
                    snap.network.bytes_sent as f64 / BYTES_PER_MB,
                    snap.network.bytes_recv as f64 / BYTES_PER_MB,
                );
                self.snapshot = Some(snap);
            }
            Err(e) => warn!("status fetch failed: {}", e),
        }
        if self.refresh_queued {
            self.refresh_queued = false;
            self.in_flight = true;
            return Some(Request::Status);
        }
        None
    }

    // ── Maintenance actions ──────────────────────────────────────────────────

    pub fn cleanup_now(&self) -> Request {
        Request::CleanupNow
    }

    pub fn set_threshold(&self, input: &str) -> Result<Request, ValidationError> {
        validate_threshold(input).map(Request::SetThreshold)
    }

    pub fn cache_test(&self) -> Request {
        Request::CacheTest
    }

    pub fn on_cleanup(&mut self, result: Result<CleanupReport, ApiError>) -> Vec<Effect> {
        match result {
            Ok(report) => {
                let d = &report.details;
                info!("cleanup done: {:?}", d);
                let message = format!(
                    "cleanup done: cache {} -> {} ({} cleared), {:.2} MB freed",
                    d.cache_before, d.cache_after, d.cache_cleared, d.memory_freed_mb
                );
                self.after_mutation(Notice::success(message))
            }
            Err(e) => mutation_failed("cleanup", e),
        }
    }

    pub fn on_threshold(&mut self, threshold: u8, result: Result<MessageReply, ApiError>) -> Vec<Effect> {
        match result {
            Ok(reply) => {
                let message = if reply.message.is_empty() {
                    format!("cleanup threshold set to {}", threshold)
                } else {
                    reply.message
                };
                self.after_mutation(Notice::success(message))
            }
            Err(e) => mutation_failed("threshold update", e),
        }
    }

    pub fn on_cache_test(&mut self, result: Result<CacheTestReply, ApiError>) -> Vec<Effect> {
        match result {
            Ok(reply) => {
                let line = format!("{} ({} cached)", reply.message, reply.cache_count);
                self.last_cache_test = Some(line.clone());
                self.after_mutation(Notice::success(line))
            }
            Err(e) => mutation_failed("cache test", e),
        }
    }

    fn after_mutation(&mut self, notice: Notice) -> Vec<Effect> {
        let mut effects = vec![Effect::Notify(notice)];
        if let Some(req) = self.refresh_now() {
            effects.push(Effect::Http(req));
        }
        effects
    }
}

fn mutation_failed(what: &str, e: ApiError) -> Vec<Effect> {
    warn!("{} failed: {}", what, e);
    vec![Effect::Notify(Notice::error(format!("{} failed: {}", what, e)))]
}
