//! Incremental tail of the bot's server-side log file.

use std::collections::VecDeque;

use tracing::{debug, warn};

use botdash_proto::client::ApiError;
use botdash_proto::protocol::TerminalOutput;

use crate::core::Request;

pub const CONNECT_BANNER: &str = "connected to terminal output stream";

/// Byte offset into the server's log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogCursor {
    last_offset: u64,
}

impl LogCursor {
    pub fn offset(&self) -> u64 {
        self.last_offset
    }

    /// Track the size the server reported.  The server rewinds to 0 itself
    /// when its file shrinks, so the reported value is taken as is.
    pub fn advance_to(&mut self, file_size: u64) {
        self.last_offset = file_size;
    }

    pub fn reset(&mut self) {
        self.last_offset = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

impl LinkState {
    pub fn label(self) -> &'static str {
        match self {
            LinkState::Disconnected => "disconnected",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub number: u64,
    pub text: String,
}

impl LogRow {
    pub fn gutter(&self) -> String {
        format!("{:04}", self.number)
    }
}

/// Capped row buffer plus its scroll position.
///
/// `scroll` is the index of the top visible row.
#[derive(Debug)]
pub struct LogView {
    rows: VecDeque<LogRow>,
    max_rows: usize,
    next_number: u64,
    scroll: usize,
    viewport: usize,
    auto_scroll: bool,
    scroll_threshold: usize,
}

impl LogView {
    pub fn new(max_rows: usize, scroll_threshold: usize) -> Self {
        Self {
            rows: VecDeque::new(),
            max_rows: max_rows.max(1),
            next_number: 1,
            scroll: 0,
            viewport: 1,
            auto_scroll: true,
            scroll_threshold,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    pub fn visible(&self) -> impl Iterator<Item = &LogRow> {
        self.rows.iter().skip(self.scroll).take(self.viewport)
    }

    fn bottom(&self) -> usize {
        self.rows.len().saturating_sub(self.viewport)
    }

    pub fn push(&mut self, text: impl Into<String>) {
        self.rows.push_back(LogRow {
            number: self.next_number,
            text: text.into(),
        });
        self.next_number += 1;
        while self.rows.len() > self.max_rows {
            self.rows.pop_front();
            self.scroll = self.scroll.saturating_sub(1);
        }
        if self.auto_scroll {
            self.scroll = self.bottom();
        }
    }

    /// Called by the renderer with the number of text rows it has.
    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport = rows.max(1);
        if self.auto_scroll {
            self.scroll = self.bottom();
        } else {
            self.scroll = self.scroll.min(self.bottom());
        }
    }

    pub fn toggle_auto_scroll(&mut self) -> bool {
        self.auto_scroll = !self.auto_scroll;
        if self.auto_scroll {
            self.scroll = self.bottom();
        }
        self.auto_scroll
    }

    /// Manual scroll.  Scrolling up leaves follow mode; reaching the bottom
    /// again (within the threshold) re-enables it.
    pub fn scroll_by(&mut self, delta: isize) {
        let target = if delta < 0 {
            self.scroll.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll.saturating_add(delta as usize)
        };
        self.scroll = target.min(self.bottom());
        if delta < 0 && self.scroll < self.bottom() {
            self.auto_scroll = false;
        }
        if !self.auto_scroll && self.bottom() - self.scroll <= self.scroll_threshold {
            self.auto_scroll = true;
            self.scroll = self.bottom();
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
        if self.bottom() > self.scroll_threshold {
            self.auto_scroll = false;
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.bottom();
        self.auto_scroll = true;
    }
}

/// The log-tail controller: link state, cursor and view.
pub struct LogTail {
    cursor: LogCursor,
    link: LinkState,
    in_flight: bool,
    pub view: LogView,
}

impl LogTail {
    pub fn new(max_rows: usize, scroll_threshold: usize) -> Self {
        Self {
            cursor: LogCursor::default(),
            link: LinkState::Disconnected,
            in_flight: false,
            view: LogView::new(max_rows, scroll_threshold),
        }
    }

    pub fn link(&self) -> LinkState {
        self.link
    }

    /// Armed, whether or not a fetch has succeeded yet.
    pub fn is_active(&self) -> bool {
        self.link != LinkState::Disconnected
    }

    /// Arm the tail.  Returns false when already armed.
    ///
    /// The cursor restarts at 0, so the first fetch replays the whole file.
    /// The link reads `Connecting` until that fetch succeeds.
    pub fn connect(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        self.link = LinkState::Connecting;
        self.cursor.reset();
        self.in_flight = false;
        self.view.push(CONNECT_BANNER);
        debug!("log tail connecting");
        true
    }

    pub fn disconnect(&mut self) {
        self.link = LinkState::Disconnected;
    }

    pub fn tick(&mut self) -> Option<Request> {
        if !self.is_active() || self.in_flight {
            return None;
        }
        self.in_flight = true;
        Some(Request::LogTail {
            offset: self.cursor.offset(),
        })
    }

    pub fn on_output(&mut self, result: Result<TerminalOutput, ApiError>) {
        self.in_flight = false;
        match result {
            Ok(chunk) => {
                if self.link == LinkState::Connecting {
                    self.link = LinkState::Connected;
                }
                self.cursor.advance_to(chunk.file_size);
                for line in chunk.output.split('\n') {
                    let line = line.trim_end();
                    if !line.is_empty() {
                        self.view.push(line);
                    }
                }
            }
            Err(e) => {
                warn!("log tail fetch failed: {}", e);
                if self.is_active() {
                    self.view.push(format!("fetch failed: {}", e));
                }
            }
        }
    }
}
