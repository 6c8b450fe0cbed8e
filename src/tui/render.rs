//! UI rendering functions for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use super::state::App;
use super::types::{Focus, Screen, SidebarRow};
use crate::pipeline::PageView;
use crate::types::Episode;

const ACCENT: Color = Color::Rgb(0x6e, 0x36, 0x6e);

/// Draw the UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content (sidebar + cards)
            Constraint::Length(3), // Pagination
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, app, chunks[0]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(34), // Sidebar (fixed width)
            Constraint::Min(0),     // Cards
        ])
        .split(chunks[1]);

    draw_sidebar(frame, app, content_chunks[0]);

    match app.screen {
        Screen::Loading => draw_loading(frame, app, content_chunks[1]),
        Screen::Browse => draw_cards(frame, app, content_chunks[1]),
    }

    draw_pagination(frame, app, chunks[2]);
    draw_footer(frame, app, chunks[3]);

    if let Some(error) = &app.error_message {
        draw_error_popup(frame, error);
    }

    if app.show_help {
        draw_help_modal(frame);
    }
}

fn entry_count_label(count: usize) -> String {
    format!("{} {}", count, if count == 1 { "entry" } else { "entries" })
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "schedule-watcher",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!(
                "[Sort: {} {}]",
                app.view.sort_key,
                app.view.sort_direction.symbol()
            ),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", entry_count_label(app.total_count)),
            Style::default().fg(Color::Green),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_sidebar(frame: &mut Frame, app: &mut App, area: Rect) {
    let border_style = if app.focus == Focus::Sidebar {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let rows = app.sidebar_rows();
    if rows.is_empty() {
        let empty = Paragraph::new("No filters")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Filters")
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
        return;
    }

    let filters = &app.schedule.filters;
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| match row {
            SidebarRow::Category(category) => {
                let state = if filters.all_enabled(*category) {
                    "all"
                } else {
                    "some off"
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        category.label(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(" ({})", state),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            }
            SidebarRow::Entry(key) => {
                let enabled = filters
                    .get(key)
                    .map(|entry| entry.enabled())
                    .unwrap_or(true);
                let mark = if enabled { "[x]" } else { "[ ]" };
                // Truncate long values (use chars to avoid UTF-8 panics)
                let value = if key.value.chars().count() > 24 {
                    format!("{}...", key.value.chars().take(21).collect::<String>())
                } else {
                    key.value.clone()
                };
                let style = if enabled {
                    Style::default()
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(Span::styled(format!("  {} {}", mark, value), style))
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Filters")
                .border_style(border_style),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.filter_list_state);
}

fn card_lines(episode: &Episode) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            episode.show.name.clone(),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Airing: {}", episode.air_time_display()),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            episode.position_display(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(episode.name.clone()),
    ];
    if let Some(url) = episode.show.image_url() {
        lines.push(Line::from(Span::styled(
            url.to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));
    lines
}

fn draw_cards(frame: &mut Frame, app: &mut App, area: Rect) {
    let border_style = if app.focus == Focus::Main {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Upcoming Episodes")
        .border_style(border_style);

    if app.page_items.is_empty() {
        let message = if app.schedule.episodes.is_empty() {
            "No upcoming episodes.\n\nPress 'r' to reload."
        } else {
            "No episodes match the current filters."
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .page_items
        .iter()
        .map(|episode| ListItem::new(card_lines(episode)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Black))
        .highlight_symbol("▌ ");

    frame.render_stateful_widget(list, area, &mut app.card_list_state);
}

fn pagination_spans(app: &App) -> Vec<Span<'static>> {
    if app.total_pages == 0 {
        return vec![Span::styled("No pages", Style::default().fg(Color::DarkGray))];
    }

    let dim = Style::default().fg(Color::DarkGray);
    let on_first = app.view.page <= 1;
    let on_last = app.view.page >= app.total_pages;

    let mut spans = vec![
        Span::styled("« 1", if on_first { dim } else { Style::default() }),
        Span::raw("  "),
    ];
    for page in app.page_window.clone() {
        let span = if page == app.view.page {
            Span::styled(
                format!(" {} ", page),
                Style::default()
                    .fg(Color::White)
                    .bg(ACCENT)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw(format!(" {} ", page))
        };
        spans.push(span);
    }
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("{} »", app.total_pages),
        if on_last { dim } else { Style::default() },
    ));
    spans.push(Span::styled(
        format!("   Page {} of {}", app.view.page, app.total_pages),
        dim,
    ));
    spans
}

fn draw_pagination(frame: &mut Frame, app: &App, area: Rect) {
    let pagination = Paragraph::new(Line::from(pagination_spans(app)))
        .block(Block::default().borders(Borders::ALL).title("Pages"));

    frame.render_widget(pagination, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match (&app.screen, &app.focus) {
        (Screen::Loading, _) => "[?] help  [q] quit",
        (Screen::Browse, Focus::Sidebar) => {
            "[↑↓] navigate  [Space] toggle  [a/n] all/none  [←→] page  [s] sort  [d] direction  [Tab] cards  [?] help  [q] quit"
        }
        (Screen::Browse, Focus::Main) => {
            "[↑↓] scroll  [←→] page  [1-5] pick page  [g/G] first/last  [s] sort  [d] direction  [r] reload  [Tab] filters  [?] help  [q] quit"
        }
    };

    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

fn draw_loading(frame: &mut Frame, app: &App, area: Rect) {
    let loading = Paragraph::new(app.loading_message.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Loading"));

    frame.render_widget(loading, area);
}

fn draw_error_popup(frame: &mut Frame, error: &str) {
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let popup = Paragraph::new(format!("{}\n\nPress any key, then 'r' to reload.", error))
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, area);
}

fn draw_help_modal(frame: &mut Frame) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let content = "\
Global Commands
───────────────
  ?           Show/hide this help
  Ctrl+C      Force quit
  Tab         Switch between filters and cards
  r           Reload the schedule
  q           Quit

Sorting
───────
  s           Cycle sort: air time, episode name, show name
  d           Flip ascending/descending

Pages
─────
  l / →       Next page
  h / ←       Previous page
  1-5         Page shown in that slot of the page bar
  g           First page
  G           Last page

Filters
───────
  j / ↓       Move down
  k / ↑       Move up
  Space       Toggle entry (or whole category on a heading)
  a           Enable whole category
  n           Disable whole category

Press ? to close";

    let help_text = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_text, area);
}

/// Helper function to create a centered rect.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Render one page as plain text for non-interactive output.
pub fn plain_text(view: &PageView) -> String {
    let mut out = String::new();
    for episode in &view.items {
        out.push_str(&episode.to_display());
        out.push('\n');
        out.push_str(&format!("  Airing: {}\n", episode.air_time_display()));
    }
    if view.total_pages == 0 {
        out.push_str(&format!("{}, no pages\n", entry_count_label(view.total_count)));
    } else {
        out.push_str(&format!(
            "{}, page {} of {}\n",
            entry_count_label(view.total_count),
            view.page,
            view.total_pages
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterSet;
    use crate::pipeline::{ViewState, render_view};
    use crate::types::{Airstamp, Show};
    use ratatui::{Terminal, backend::TestBackend};

    fn episode(id: u64) -> Episode {
        Episode {
            id,
            name: format!("Part {}", id),
            season: 1,
            number: Some(id as u32),
            airstamp: Airstamp::parse("not yet announced"),
            show: Show {
                name: "Example Show".to_string(),
                kind: "Scripted".to_string(),
                ..Show::default()
            },
        }
    }

    #[test]
    fn test_entry_count_label() {
        assert_eq!(entry_count_label(0), "0 entries");
        assert_eq!(entry_count_label(1), "1 entry");
        assert_eq!(entry_count_label(121), "121 entries");
    }

    #[test]
    fn test_plain_text_lists_page_and_counts() {
        let eps = vec![episode(1), episode(2), episode(3)];
        let view = ViewState {
            page: 2,
            page_size: 2,
            ..ViewState::default()
        };
        let page = render_view(&eps, &FilterSet::from_episodes(&eps), &view);
        let text = plain_text(&page);

        assert!(text.contains("Example Show S01E03 - Part 3"));
        assert!(text.contains("Airing: not yet announced"));
        assert!(!text.contains("Part 1"));
        assert!(text.ends_with("3 entries, page 2 of 2\n"));
    }

    #[test]
    fn test_plain_text_empty() {
        let page = render_view(&[], &FilterSet::new(), &ViewState::default());
        assert_eq!(plain_text(&page), "0 entries, no pages\n");
    }

    #[test]
    fn test_pagination_spans_mark_current_page() {
        let mut app = App::new(ViewState::default(), false);
        app.total_pages = 9;
        app.view = app.view.with_page(6);
        app.page_window = 4..=8;

        let spans = pagination_spans(&app);
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.starts_with("« 1"));
        assert!(text.contains(" 4  5  6  7  8 "));
        assert!(text.contains("9 »"));
        assert!(text.ends_with("Page 6 of 9"));

        let current = spans.iter().find(|s| s.content == " 6 ").unwrap();
        assert_eq!(current.style.bg, Some(ACCENT));
    }

    #[test]
    fn test_pagination_spans_without_pages() {
        let app = App::new(ViewState::default(), false);
        let spans = pagination_spans(&app);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "No pages");
    }

    #[test]
    fn test_card_lines() {
        let mut ep = episode(4);
        ep.show.image = Some(crate::types::ShowImage {
            medium: Some("https://img.example/4.jpg".to_string()),
        });
        let lines = card_lines(&ep);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[2].to_string(), "Season 1 Episode 4");
        assert_eq!(lines[4].to_string(), "https://img.example/4.jpg");
    }

    #[test]
    fn test_draw_does_not_panic() {
        let mut app = App::new(ViewState::default(), false);
        app.load(Ok(vec![]), chrono::Utc::now());
        app.set_error("Network error: offline");
        app.show_help = true;

        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();
    }
}
