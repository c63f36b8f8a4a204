//! StatusPanel: gauges, badges, the two rolling charts and the cache block.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, Paragraph},
    Frame,
};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    monitor::{Badges, DualSeries, Gauges, Level},
    theme::{
        level_color, style_secondary, C_MUTED, C_PRIMARY, C_SECONDARY, C_SERIES_A, C_SERIES_B,
    },
    widgets::pane_chrome::{pane_chrome, Badge},
};

pub struct StatusPanel;

impl StatusPanel {
    pub fn new() -> Self {
        Self
    }
}

fn badge_text(level: Level) -> &'static str {
    match level {
        Level::Ok => "ok",
        Level::Warning => "warn",
        Level::Error => "high",
    }
}

fn draw_gauge(frame: &mut Frame, area: Rect, title: &str, percent: f64, text: &str, level: Level) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_MUTED))
        .title(Span::styled(title, style_secondary()))
        .title_top(
            Line::from(Span::styled(
                format!(" {} ", badge_text(level)),
                Style::default()
                    .fg(level_color(level))
                    .add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        );
    let ratio = if percent.is_finite() {
        (percent / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(level_color(level)))
        .ratio(ratio)
        .label(Span::styled(
            text.to_string(),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(gauge, area);
}

fn draw_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    series: &DualSeries,
    names: (&str, &str),
    y_max: f64,
    unit: &str,
) {
    let first = series.first.chart_points();
    let second = series.second.chart_points();
    let datasets = vec![
        Dataset::default()
            .name(names.0.to_string())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(C_SERIES_A))
            .data(&first),
        Dataset::default()
            .name(names.1.to_string())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(C_SERIES_B))
            .data(&second),
    ];

    let x_max = (series.first.capacity().max(2) - 1) as f64;
    let x_labels = vec![
        series.first.first_label().unwrap_or("").to_string(),
        series.first.last_label().unwrap_or("").to_string(),
    ];
    let y_labels = vec!["0".to_string(), format!("{:.0}{}", y_max, unit)];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(C_MUTED))
                .title(Span::styled(title.to_string(), style_secondary())),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(C_MUTED))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(C_MUTED))
                .bounds([0.0, y_max])
                .labels(y_labels),
        );
    frame.render_widget(chart, area);
}

fn info_line<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(C_MUTED)),
        Span::styled(value, Style::default().fg(C_PRIMARY)),
    ])
}

impl Component for StatusPanel {
    /// Monitor actions are workspace keys, dispatched by the App.
    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let poller = &state.monitor;
        let badge = if poller.is_busy() {
            Some(Badge {
                text: "…",
                color: C_SECONDARY,
            })
        } else {
            None
        };
        let block = pane_chrome("system", Some('1'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let (Some(gauges), Some(badges)) = (poller.gauges(), poller.badges()) else {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  waiting for the first status reading…",
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        };
        let snap = poller.snapshot().cloned().unwrap_or_default();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(6),
            ])
            .split(inner);

        // ── Gauges ───────────────────────────────────────────────────────────
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 4),
                Constraint::Ratio(1, 4),
                Constraint::Ratio(1, 4),
                Constraint::Ratio(1, 4),
            ])
            .split(rows[0]);
        draw_gauge(frame, cols[0], "cpu", snap.cpu_percent, &gauges.cpu, badges.cpu);
        draw_gauge(frame, cols[1], "memory", snap.memory_percent, &gauges.memory, badges.memory);
        draw_gauge(frame, cols[2], "disk", snap.disk_percent, &gauges.disk, badges.disk);
        draw_gauge(
            frame,
            cols[3],
            "cache",
            gauges.cache_fill_percent,
            &gauges.cache,
            badges.cache,
        );

        // ── Process / playback / cache text ─────────────────────────────────
        draw_details(frame, rows[1], &gauges, &badges, poller.last_cache_test());

        // ── Charts ───────────────────────────────────────────────────────────
        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[2]);
        draw_chart(
            frame,
            charts[0],
            "cpu / memory %",
            &poller.resources,
            ("cpu", "memory"),
            100.0,
            "%",
        );
        let net_max = poller
            .network
            .first
            .max_value()
            .max(poller.network.second.max_value())
            .max(1.0)
            .ceil();
        let net_title = match (poller.network.first.latest(), poller.network.second.latest()) {
            (Some(sent), Some(recv)) => format!("network MB  ↑{:.1} ↓{:.1}", sent, recv),
            _ => "network MB".to_string(),
        };
        draw_chart(
            frame,
            charts[1],
            &net_title,
            &poller.network,
            ("sent", "recv"),
            net_max,
            "",
        );
    }
}

fn draw_details(
    frame: &mut Frame,
    area: Rect,
    gauges: &Gauges,
    badges: &Badges,
    cache_test: Option<&str>,
) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let process_style = Style::default().fg(level_color(badges.process_cpu));
    let playback_style = Style::default().fg(level_color(badges.playback));
    let left = vec![
        info_line("uptime", gauges.uptime.clone()),
        Line::from(vec![
            Span::styled(format!("{:<12}", "process"), Style::default().fg(C_MUTED)),
            Span::styled(gauges.process.clone(), process_style),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<12}", "playback"), Style::default().fg(C_MUTED)),
            Span::styled(gauges.playback.clone(), playback_style),
        ]),
    ];
    frame.render_widget(Paragraph::new(left), halves[0]);

    let mut right = vec![
        info_line("cache size", gauges.cache_size.clone()),
        info_line("threshold", gauges.cleanup_threshold.clone()),
        info_line("plays", gauges.play_counts.clone()),
    ];
    if let Some(line) = cache_test {
        right.push(info_line("cache test", line.to_string()));
    }
    frame.render_widget(Paragraph::new(right), halves[1]);
}
