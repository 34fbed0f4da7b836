//! Rendering for the dashboard.

use airwatch_core::{Band, Snapshot};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Sparkline};

use super::app::App;
use crate::format::{format_age, format_clock, format_datetime, format_ppm};

const BORDER_TYPE: BorderType = BorderType::Rounded;

/// Terminal color for a severity band.
fn band_color(band: Band) -> Color {
    let (r, g, b) = band.color().rgb();
    Color::Rgb(r, g, b)
}

/// Window values scaled for the sparkline widget, oldest first.
///
/// Non-finite values render as an empty bar.
pub(crate) fn sparkline_data(snapshot: &Snapshot) -> Vec<u64> {
    snapshot
        .window
        .iter()
        .map(|r| {
            if r.value.is_finite() && r.value > 0.0 {
                r.value.round() as u64
            } else {
                0
            }
        })
        .collect()
}

/// Draw the whole dashboard.
pub fn draw(frame: &mut Frame, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(7), // Value + status cards
            Constraint::Min(5),    // Chart
            Constraint::Length(app.latest_count.min(10) as u16 + 2),
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    draw_header(frame, layout[0], app);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[1]);
    draw_value_card(frame, cards[0], &app.snapshot);
    draw_status_card(frame, cards[1], &app.snapshot);

    draw_chart(frame, layout[2], &app.snapshot);
    draw_latest(frame, layout[3], app);
    draw_footer(frame, layout[4], app);

    if app.show_help {
        draw_help_overlay(frame);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            " airwatch ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(app.source.as_str()),
    ];
    if app.snapshot.paused {
        spans.push(Span::styled(
            "  [PAUSED]",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BORDER_TYPE),
    );
    frame.render_widget(header, area);
}

fn draw_value_card(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let color = snapshot.current_band.map_or(Color::DarkGray, band_color);
    let label = snapshot.current_band.map_or("NO DATA", |b| b.label());

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format_ppm(snapshot.current_value),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::from(Span::styled(label, Style::default().fg(color))).alignment(Alignment::Center),
    ];

    let card = Paragraph::new(lines).block(
        Block::default()
            .title(" Current ")
            .borders(Borders::ALL)
            .border_type(BORDER_TYPE)
            .border_style(Style::default().fg(color)),
    );
    frame.render_widget(card, area);
}

fn draw_status_card(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let (status, status_color) = if snapshot.is_online {
        ("ONLINE", Color::Green)
    } else {
        ("OFFLINE", Color::Red)
    };
    let dim = Style::default().fg(Color::DarkGray);

    let last = match snapshot.last_reading_at {
        Some(ts) => format!(
            "{} ({})",
            format_clock(ts),
            format_age(snapshot.seconds_since_last)
        ),
        None => "never".to_string(),
    };

    let stats = &snapshot.stats;
    let mut lines = vec![
        Line::from(Span::styled(
            status,
            Style::default()
                .fg(status_color)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![Span::styled("Last reading: ", dim), Span::raw(last)]),
        Line::from(vec![
            Span::styled("Polls: ", dim),
            Span::raw(format!(
                "{} ok, {} empty, {} failed",
                stats.success_count, stats.empty_count, stats.failure_count
            )),
        ]),
    ];
    if stats.consecutive_failures > 0
        && let Some(err) = &stats.last_error
    {
        lines.push(Line::from(Span::styled(
            err.as_str(),
            Style::default().fg(Color::Red),
        )));
    }

    let card = Paragraph::new(lines).block(
        Block::default()
            .title(" Status ")
            .borders(Borders::ALL)
            .border_type(BORDER_TYPE),
    );
    frame.render_widget(card, area);
}

fn draw_chart(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let title = match &snapshot.summary {
        Some(s) => format!(
            " Window ({}) min {:.1} / mean {:.1} / max {:.1} ppm ",
            s.count, s.min, s.mean, s.max
        ),
        None => " Window ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BORDER_TYPE);

    let data = sparkline_data(snapshot);
    if data.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "Waiting for readings...",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let color = snapshot
        .summary
        .as_ref()
        .map_or(Color::Cyan, |s| band_color(s.worst));
    let sparkline = Sparkline::default()
        .block(block)
        .data(&data)
        .style(Style::default().fg(color));
    frame.render_widget(sparkline, area);
}

fn draw_latest(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .snapshot
        .latest(app.latest_count)
        .map(|r| {
            let band = app.thresholds.evaluate(r.value);
            ListItem::new(Line::from(vec![
                Span::raw(format_datetime(r.timestamp)),
                Span::raw("  "),
                Span::styled(
                    format!("{:>10}", format_ppm(Some(r.value))),
                    Style::default().fg(band_color(band)),
                ),
                Span::raw("  "),
                Span::styled(band.label(), Style::default().fg(band_color(band))),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Latest ")
            .borders(Borders::ALL)
            .border_type(BORDER_TYPE),
    );
    frame.render_widget(list, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let line = match app.status() {
        Some(msg) => Line::from(Span::styled(msg, Style::default().fg(Color::Yellow))),
        None => {
            let pause = if app.snapshot.paused { "resume" } else { "pause" };
            Line::from(vec![
                key_span("q"),
                Span::raw(" quit  "),
                key_span("p"),
                Span::raw(format!(" {}  ", pause)),
                key_span("r"),
                Span::raw(" refresh  "),
                key_span("?"),
                Span::raw(" help"),
            ])
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn key_span(key: &str) -> Span<'_> {
    Span::styled(
        key,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}

fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();
    let width = 44.min(area.width.saturating_sub(2));
    let height = 12.min(area.height.saturating_sub(2));
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    let help_area = Rect::new(x, y, width, height);
    frame.render_widget(Clear, help_area);

    let shortcut = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("{:>10}", key), Style::default().fg(Color::Cyan)),
            Span::raw("  "),
            Span::raw(desc),
        ])
    };
    let lines = vec![
        Line::from(""),
        shortcut("q / Esc", "Quit"),
        shortcut("p / Space", "Pause or resume the chart"),
        shortcut("r", "Poll now"),
        shortcut("?", "Toggle this help"),
        Line::from(""),
        Line::from(Span::styled(
            "  Pausing freezes the chart; polling continues.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let help = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_type(BORDER_TYPE)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(help, help_area);
}
