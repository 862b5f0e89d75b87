//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. Drawing
//! is a pure function of the `App` state and settings.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Tabs, Wrap},
};
use std::time::Duration;

use crate::app::{App, Filter};
use crate::catalog::{Track, cover_url};
use crate::config::Settings;

const CONTROLS: &[(&str, &str)] = &[
    ("j/k/↑/↓", "up/down"),
    ("gg/G", "top/bottom"),
    ("enter", "play selected"),
    ("space/p", "play/pause"),
    ("h/b", "prev"),
    ("l/n", "next"),
    ("1/2/tab", "for you/top tracks"),
    ("/", "search"),
    ("esc", "clear search"),
    ("m/L", "playlist"),
    ("q", "quit"),
];

/// Render the controls help text.
fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{}] {}", k, v))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Accent of the selected track as a terminal color, when enabled and parseable.
fn accent_color(app: &App, settings: &Settings) -> Option<Color> {
    if !settings.ui.accent_background {
        return None;
    }
    let (r, g, b) = app.selected_track()?.accent_rgb()?;
    Some(Color::Rgb(r, g, b))
}

fn accent_block<'a>(title: &'a str, accent: Option<Color>) -> Block<'a> {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1));
    match accent {
        Some(c) => block.border_style(Style::default().fg(c)),
        None => block,
    }
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, settings: &Settings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let accent = accent_color(app, settings);

    // Header
    let mut header = Paragraph::new(settings.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" spindle ")
                .title_alignment(Alignment::Center),
        );
    if let Some(c) = accent {
        header = header.style(Style::default().bg(c));
    }
    frame.render_widget(header, chunks[0]);

    if app.loading {
        draw_loading(frame, chunks[1]);
    } else {
        draw_body(frame, chunks[1], app, settings, accent);
    }

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding::horizontal(1)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[2]);
}

/// Placeholder shown while the catalog request is in flight.
fn draw_loading(frame: &mut Frame, area: Rect) {
    let skeleton = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::from("Loading catalog…".bold()), Line::from("")];
    for _ in 0..5 {
        lines.push(Line::from(Span::styled(
            format!("{}  {}", "▇".repeat(3), "▇".repeat(16)),
            skeleton,
        )));
        lines.push(Line::from(Span::styled(
            format!("     {}", "▇".repeat(8)),
            skeleton,
        )));
    }
    let placeholder = Paragraph::new(lines).block(Block::bordered().title(" tracks "));
    frame.render_widget(placeholder, area);
}

fn draw_body(frame: &mut Frame, area: Rect, app: &App, settings: &Settings, accent: Option<Color>) {
    let show_list = app.panel_visible();

    if app.is_compact() {
        // One panel at a time on narrow terminals.
        if show_list {
            draw_track_panel(frame, area, app);
        } else {
            draw_player(frame, area, app, settings, accent);
        }
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    draw_track_panel(frame, columns[0], app);
    draw_player(frame, columns[1], app, settings, accent);
}

fn draw_track_panel(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(area);

    let selected_tab = match app.filter {
        Filter::ForYou => 0,
        Filter::TopTracks => 1,
    };
    let tabs = Tabs::new(vec![Filter::ForYou.label(), Filter::TopTracks.label()])
        .select(selected_tab)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, rows[0]);

    let search_text = if app.search_query.is_empty() && !app.search_mode {
        Span::styled("Search Songs, Artist", Style::default().fg(Color::DarkGray))
    } else if app.search_mode {
        Span::raw(format!("{}▏", app.search_query))
    } else {
        Span::raw(app.search_query.as_str())
    };
    let search_title = if app.search_mode { " search (esc clears) " } else { " search " };
    let search = Paragraph::new(Line::from(search_text)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(search_title)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(search, rows[1]);

    let visible = app.visible_tracks();
    let list_block = Block::default().borders(Borders::ALL).title(" tracks ");
    if visible.is_empty() {
        let empty = Paragraph::new("No songs found")
            .alignment(Alignment::Center)
            .block(list_block);
        frame.render_widget(empty, rows[2]);
        return;
    }

    let selected = app.selected_index();
    let items: Vec<ListItem> = visible
        .iter()
        .map(|&i| track_item(&app.tracks[i], Some(i) == selected))
        .collect();

    let list = List::new(items)
        .block(list_block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.cursor.min(visible.len() - 1)));
    frame.render_stateful_widget(list, rows[2], &mut state);
}

fn track_item(track: &Track, is_current: bool) -> ListItem<'static> {
    let marker = if is_current { "♪ " } else { "  " };
    let mut spans = vec![
        Span::raw(marker),
        Span::styled(track.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(track.artist.clone(), Style::default().fg(Color::Gray)),
    ];
    if let Some(d) = track.duration.as_deref() {
        spans.push(Span::styled(
            format!("  {d}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    ListItem::new(Line::from(spans))
}

fn draw_player(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    settings: &Settings,
    accent: Option<Color>,
) {
    let block = accent_block(" now playing ", accent);

    let Some(track) = app.selected_track() else {
        let message = if app.has_tracks() {
            "Nothing to play"
        } else {
            "No songs available"
        };
        let idle = Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(idle, area);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let mut info = vec![
        Line::from(track.name.as_str().bold()),
        Line::from(Span::styled(
            track.artist.as_str(),
            Style::default().fg(Color::Gray),
        )),
    ];
    if let Some(cover) = track.cover.as_deref() {
        info.push(Line::from(Span::styled(
            format!("cover: {}", cover_url(&settings.catalog.assets_url, cover)),
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(Paragraph::new(info).wrap(Wrap { trim: true }), rows[0]);

    let total = track
        .duration
        .clone()
        .unwrap_or_else(|| "--:--".to_string());
    let gauge_color = accent.unwrap_or(Color::White);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(gauge_color).bg(Color::Black))
        .ratio((app.progress / 100.0).clamp(0.0, 1.0))
        .label(format!("{} / {}", format_mmss(app.elapsed), total));
    frame.render_widget(gauge, rows[2]);

    let play_glyph = if app.is_playing { "⏸" } else { "▶" };
    let transport = Paragraph::new(format!("⏮    {play_glyph}    ⏭"))
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(transport, rows[4]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Track;
    use ratatui::{Terminal, backend::TestBackend};

    fn track(id: u64, name: &str, top: bool) -> Track {
        Track {
            id,
            name: name.into(),
            artist: "Artist".into(),
            cover: Some("abc".into()),
            url: "https://example.invalid/x.mp3".into(),
            duration: Some("3:00".into()),
            top_track: top,
            accent: Some("#331E00".into()),
        }
    }

    fn render(app: &App, width: u16) -> String {
        let settings = Settings::default();
        let mut terminal = Terminal::new(TestBackend::new(width, 30)).unwrap();
        terminal.draw(|f| draw(f, app, &settings)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn format_mmss_pads_minutes_and_seconds() {
        assert_eq!(format_mmss(Duration::from_secs(0)), "00:00");
        assert_eq!(format_mmss(Duration::from_secs(75)), "01:15");
    }

    #[test]
    fn controls_text_lists_every_binding() {
        let text = controls_text();
        for (k, _) in CONTROLS {
            assert!(text.contains(&format!("[{k}]")));
        }
    }

    #[test]
    fn footer_shows_every_key_on_wide_screens() {
        let mut app = App::new(100);
        app.set_viewport_width(120);
        app.finish_loading(Ok(vec![track(1, "Colors", false)]), false);
        let screen = render(&app, 120);
        for key in ["[j/k/↑/↓]", "[h/b]", "[l/n]", "[esc]", "[m/L]", "[q]"] {
            assert!(screen.contains(key), "missing {key}");
        }
    }

    #[test]
    fn loading_state_renders_placeholder() {
        let app = App::new(100);
        assert!(render(&app, 120).contains("Loading catalog"));
    }

    #[test]
    fn empty_search_renders_no_songs_found() {
        let mut app = App::new(100);
        app.set_viewport_width(120);
        app.finish_loading(Ok(vec![track(1, "Colors", false)]), false);
        app.set_search_query("zzz");
        assert!(render(&app, 120).contains("No songs found"));
    }

    #[test]
    fn wide_layout_shows_list_and_player() {
        let mut app = App::new(100);
        app.set_viewport_width(120);
        app.finish_loading(Ok(vec![track(1, "Colors", true), track(2, "Saturn", false)]), false);
        let screen = render(&app, 120);
        assert!(screen.contains("Top Tracks"));
        assert!(screen.contains("Saturn"));
        assert!(screen.contains("now playing"));
    }

    #[test]
    fn compact_layout_hides_list_after_selection() {
        let mut app = App::new(100);
        app.set_viewport_width(60);
        app.finish_loading(Ok(vec![track(1, "Colors", true), track(2, "Saturn", false)]), false);
        app.select_track(1);
        let screen = render(&app, 60);
        assert!(screen.contains("now playing"));
        assert!(!screen.contains("For You"));
    }

    #[test]
    fn accent_color_follows_selected_track() {
        let mut app = App::new(100);
        app.finish_loading(Ok(vec![track(1, "Colors", true)]), false);
        let settings = Settings::default();
        assert_eq!(
            accent_color(&app, &settings),
            Some(Color::Rgb(0x33, 0x1e, 0x00))
        );

        let mut plain = Settings::default();
        plain.ui.accent_background = false;
        assert_eq!(accent_color(&app, &plain), None);
    }
}
