//! Application state management and input handling.

use crate::error::Result;
use crate::filters::{FilterCategory, FilterKey, FilterSet};
use crate::pipeline::{Schedule, ViewState, ingest, render_view};
use crate::types::Episode;
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{error, info};
use ratatui::widgets::ListState;
use std::ops::RangeInclusive;

use super::types::{Action, Focus, Screen, SidebarRow};

/// Application state for the TUI.
pub struct App {
    /// Current screen being displayed
    pub screen: Screen,
    /// Current focus (sidebar or main)
    pub focus: Focus,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Eligible episodes and their filters from the last fetch
    pub schedule: Schedule,
    /// Page and sort selection
    pub view: ViewState,
    /// Jump to page 1 whenever a filter changes
    pub reset_page_on_filter_change: bool,
    /// Episodes on the current page, in display order
    pub page_items: Vec<Episode>,
    /// Episodes matching the filters, before paging
    pub total_count: usize,
    pub total_pages: usize,
    /// Page numbers shown in the pagination bar
    pub page_window: RangeInclusive<usize>,
    /// List state for the episode cards
    pub card_list_state: ListState,
    /// List state for the filter sidebar
    pub filter_list_state: ListState,
    /// Loading message
    pub loading_message: String,
    /// Error message to display
    pub error_message: Option<String>,
    /// Whether help modal is shown
    pub show_help: bool,
    /// When the current schedule was ingested
    pub fetched_at: Option<DateTime<Utc>>,
}

impl App {
    /// Create a new App with default state.
    pub fn new(view: ViewState, reset_page_on_filter_change: bool) -> Self {
        Self {
            screen: Screen::Loading,
            focus: Focus::Main,
            should_quit: false,
            schedule: Schedule::default(),
            view,
            reset_page_on_filter_change,
            page_items: Vec::new(),
            total_count: 0,
            total_pages: 0,
            page_window: 1..=0,
            card_list_state: ListState::default(),
            filter_list_state: ListState::default(),
            loading_message: String::new(),
            error_message: None,
            show_help: false,
            fetched_at: None,
        }
    }

    /// Set the app to loading state with a message.
    pub fn set_loading(&mut self, message: &str) {
        self.screen = Screen::Loading;
        self.loading_message = message.to_string();
    }

    /// Replace the schedule with the result of a fetch.
    ///
    /// A failed fetch leaves an empty list and an error message; there is no
    /// retry until the user reloads.
    pub fn load(&mut self, fetched: Result<Vec<Episode>>, now: DateTime<Utc>) {
        self.schedule = match fetched {
            Ok(raw) => {
                let schedule = ingest(raw, now);
                info!("{} upcoming episodes", schedule.episodes.len());
                schedule
            }
            Err(e) => {
                error!("Failed to load schedule: {}", e);
                self.set_error(&e.to_string());
                Schedule::default()
            }
        };
        self.fetched_at = Some(now);
        self.view = self.view.with_page(1);
        self.filter_list_state
            .select(if self.schedule.filters.is_empty() { None } else { Some(0) });
        self.screen = Screen::Browse;
        self.refresh();
    }

    /// Recompute the visible page from the schedule, filters and view state.
    pub fn refresh(&mut self) {
        let mut page = render_view(&self.schedule.episodes, &self.schedule.filters, &self.view);
        if page.total_pages > 0 && self.view.page > page.total_pages {
            self.view = self.view.clamp_page(page.total_pages);
            page = render_view(&self.schedule.episodes, &self.schedule.filters, &self.view);
        }

        self.total_count = page.total_count;
        self.total_pages = page.total_pages;
        self.page_window = page.window;
        self.page_items = page.items.into_iter().cloned().collect();
        self.card_list_state
            .select(if self.page_items.is_empty() { None } else { Some(0) });
    }

    /// Flattened sidebar: each non-empty category heading followed by its entries.
    pub fn sidebar_rows(&self) -> Vec<SidebarRow> {
        let mut rows = Vec::new();
        for &category in FilterCategory::all() {
            let mut entries = self.schedule.filters.entries_in(category).peekable();
            if entries.peek().is_none() {
                continue;
            }
            rows.push(SidebarRow::Category(category));
            rows.extend(entries.map(|(value, _)| SidebarRow::Entry(FilterKey::new(category, value))));
        }
        rows
    }

    fn selected_row(&self) -> Option<SidebarRow> {
        let i = self.filter_list_state.selected()?;
        self.sidebar_rows().into_iter().nth(i)
    }

    fn update_filters(&mut self, update: impl FnOnce(FilterSet) -> FilterSet) {
        let filters = std::mem::take(&mut self.schedule.filters);
        self.schedule.filters = update(filters);
        if self.reset_page_on_filter_change {
            self.view = self.view.with_page(1);
        }
        self.refresh();
    }

    /// Flip the entry under the sidebar cursor, or the whole category on a
    /// heading (all on if any entry is off, otherwise all off).
    pub fn toggle_selected_filter(&mut self) {
        match self.selected_row() {
            Some(SidebarRow::Category(category)) => {
                let enabled = self.schedule.filters.any_disabled(category);
                self.update_filters(|filters| filters.toggle_category(category, enabled));
            }
            Some(SidebarRow::Entry(key)) => {
                let enabled = self
                    .schedule
                    .filters
                    .get(&key)
                    .map(|entry| !entry.enabled())
                    .unwrap_or(true);
                self.update_filters(|filters| filters.toggle_filter(&key, enabled));
            }
            None => {}
        }
    }

    /// Enable or disable every entry of the category under the sidebar cursor.
    pub fn set_selected_category(&mut self, enabled: bool) {
        let category = match self.selected_row() {
            Some(SidebarRow::Category(category)) => category,
            Some(SidebarRow::Entry(key)) => key.category,
            None => return,
        };
        self.update_filters(|filters| filters.toggle_category(category, enabled));
    }

    /// Go to `page`, kept inside the available pages.
    pub fn go_to_page(&mut self, page: usize) {
        self.view = self.view.with_page(page).clamp_page(self.total_pages);
        self.refresh();
    }

    /// Go to the `slot`-th page number (1-based) of the pagination bar.
    pub fn go_to_window_slot(&mut self, slot: usize) {
        let page = slot
            .checked_sub(1)
            .and_then(|i| self.page_window.clone().nth(i));
        if let Some(page) = page {
            self.go_to_page(page);
        }
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.view.page.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.view.page.saturating_sub(1));
    }

    pub fn cycle_sort_key(&mut self) {
        self.view = self.view.with_sort_key(self.view.sort_key.next());
        self.refresh();
    }

    pub fn toggle_sort_direction(&mut self) {
        self.view = self
            .view
            .with_sort_direction(self.view.sort_direction.toggle());
        self.refresh();
    }

    /// Set an error message.
    pub fn set_error(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
    }

    /// Clear error message.
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Handle keyboard input and return an action.
    pub fn handle_input(&mut self, key: KeyEvent) -> Action {
        // Global quit with Ctrl+C or Ctrl+Q
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Action::Quit;
                }
                _ => {}
            }
        }

        // Any key dismisses the error popup
        if self.error_message.is_some() {
            self.clear_error();
            return Action::None;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Char('?') => {
                self.show_help = true;
                return Action::None;
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Action::Quit;
            }
            _ => {}
        }

        if self.screen == Screen::Loading {
            return Action::None;
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Sidebar => Focus::Main,
                    Focus::Main => Focus::Sidebar,
                };
                Action::None
            }
            KeyCode::Char('r') => Action::Reload,
            KeyCode::Char('s') => {
                self.cycle_sort_key();
                Action::None
            }
            KeyCode::Char('d') => {
                self.toggle_sort_direction();
                Action::None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.next_page();
                Action::None
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.previous_page();
                Action::None
            }
            KeyCode::Char(c @ '1'..='5') => {
                if let Some(slot) = c.to_digit(10) {
                    self.go_to_window_slot(slot as usize);
                }
                Action::None
            }
            KeyCode::Char('g') => {
                self.go_to_page(1);
                Action::None
            }
            KeyCode::Char('G') => {
                self.go_to_page(self.total_pages);
                Action::None
            }
            _ => match self.focus {
                Focus::Sidebar => self.handle_sidebar_input(key),
                Focus::Main => self.handle_card_input(key),
            },
        }
    }

    fn handle_sidebar_input(&mut self, key: KeyEvent) -> Action {
        let row_count = self.sidebar_rows().len();

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                let i = self.filter_list_state.selected().unwrap_or(0);
                if i > 0 {
                    self.filter_list_state.select(Some(i - 1));
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let i = self.filter_list_state.selected().unwrap_or(0);
                if i < row_count.saturating_sub(1) {
                    self.filter_list_state.select(Some(i + 1));
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected_filter(),
            KeyCode::Char('a') => self.set_selected_category(true),
            KeyCode::Char('n') => self.set_selected_category(false),
            _ => {}
        }
        Action::None
    }

    fn handle_card_input(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                let i = self.card_list_state.selected().unwrap_or(0);
                if i > 0 {
                    self.card_list_state.select(Some(i - 1));
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let i = self.card_list_state.selected().unwrap_or(0);
                if i < self.page_items.len().saturating_sub(1) {
                    self.card_list_state.select(Some(i + 1));
                }
            }
            _ => {}
        }
        Action::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::pipeline::{SortDirection, SortKey};
    use crate::types::{Airstamp, Show};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn episode(id: u64, kind: &str, name: &str) -> Episode {
        Episode {
            id,
            name: name.to_string(),
            season: 1,
            number: Some(1),
            airstamp: Airstamp::parse(format!("2025-02-{:02}T00:00:00+00:00", id)),
            show: Show {
                name: format!("Show {}", id),
                kind: kind.to_string(),
                ..Show::default()
            },
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn loaded_app(page_size: usize, reset: bool) -> App {
        let view = ViewState {
            page_size,
            ..ViewState::default()
        };
        let mut app = App::new(view, reset);
        app.load(
            Ok(vec![
                episode(1, "Scripted", "Beta"),
                episode(2, "Talk Show", "Alpha"),
                episode(3, "Talk Show", "Gamma"),
                episode(4, "Scripted", "Delta"),
                episode(5, "Scripted", "Epsilon"),
            ]),
            now(),
        );
        app
    }

    fn page_ids(app: &App) -> Vec<u64> {
        app.page_items.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_load_builds_first_page() {
        let app = loaded_app(2, false);
        assert_eq!(app.screen, Screen::Browse);
        assert_eq!(app.total_count, 5);
        assert_eq!(app.total_pages, 3);
        assert_eq!(page_ids(&app), vec![1, 2]);
        assert_eq!(app.card_list_state.selected(), Some(0));
        assert_eq!(app.page_window, 1..=3);
    }

    #[test]
    fn test_load_failure_falls_back_to_empty() {
        let mut app = App::new(ViewState::default(), false);
        app.load(Err(AppError::Network("timed out".to_string())), now());
        assert_eq!(app.screen, Screen::Browse);
        assert!(app.page_items.is_empty());
        assert_eq!(app.total_pages, 0);
        assert!(app.error_message.as_deref().unwrap().contains("timed out"));
        assert!(app.sidebar_rows().is_empty());
    }

    #[test]
    fn test_sidebar_rows_group_by_category() {
        let app = loaded_app(2, false);
        let rows = app.sidebar_rows();
        assert_eq!(
            rows,
            vec![
                SidebarRow::Category(FilterCategory::Type),
                SidebarRow::Entry(FilterKey::new(FilterCategory::Type, "Scripted")),
                SidebarRow::Entry(FilterKey::new(FilterCategory::Type, "Talk Show")),
            ]
        );
    }

    #[test]
    fn test_toggle_entry_from_sidebar() {
        let mut app = loaded_app(10, false);
        app.handle_input(key(KeyCode::Tab));
        app.handle_input(key(KeyCode::Down));
        app.handle_input(key(KeyCode::Down));
        app.handle_input(key(KeyCode::Enter));

        assert_eq!(
            app.schedule.filters.is_enabled(FilterCategory::Type, "Talk Show"),
            Some(false)
        );
        assert_eq!(page_ids(&app), vec![1, 4, 5]);
        assert_eq!(app.total_count, 3);
    }

    #[test]
    fn test_toggle_category_heading() {
        let mut app = loaded_app(10, false);
        app.focus = Focus::Sidebar;
        app.handle_input(key(KeyCode::Enter));
        assert!(app.page_items.is_empty());
        assert_eq!(app.total_pages, 0);

        app.handle_input(key(KeyCode::Char(' ')));
        assert_eq!(app.total_count, 5);
    }

    #[test]
    fn test_enable_and_disable_whole_category() {
        let mut app = loaded_app(10, false);
        app.focus = Focus::Sidebar;
        app.filter_list_state.select(Some(1));
        app.handle_input(key(KeyCode::Char('n')));
        assert!(app.schedule.filters.any_disabled(FilterCategory::Type));
        assert_eq!(app.total_count, 0);

        app.handle_input(key(KeyCode::Char('a')));
        assert!(app.schedule.filters.all_enabled(FilterCategory::Type));
        assert_eq!(app.total_count, 5);
    }

    #[test]
    fn test_page_navigation_is_clamped() {
        let mut app = loaded_app(2, false);
        app.handle_input(key(KeyCode::Right));
        assert_eq!(app.view.page, 2);
        assert_eq!(page_ids(&app), vec![3, 4]);

        app.handle_input(key(KeyCode::Char('G')));
        assert_eq!(app.view.page, 3);
        app.handle_input(key(KeyCode::Right));
        assert_eq!(app.view.page, 3);
        assert_eq!(page_ids(&app), vec![5]);

        app.handle_input(key(KeyCode::Char('g')));
        app.handle_input(key(KeyCode::Left));
        assert_eq!(app.view.page, 1);
    }

    #[test]
    fn test_number_keys_pick_from_page_window() {
        let mut app = loaded_app(1, false);
        assert_eq!(app.page_window, 1..=5);

        app.handle_input(key(KeyCode::Char('3')));
        assert_eq!(app.view.page, 3);
        assert_eq!(page_ids(&app), vec![3]);
        assert_eq!(app.page_window, 1..=5);

        app.handle_input(key(KeyCode::Char('5')));
        assert_eq!(app.view.page, 5);
        assert_eq!(app.page_window, 3..=5);

        // Slot 1 is now page 3, not page 1.
        app.handle_input(key(KeyCode::Char('1')));
        assert_eq!(app.view.page, 3);
    }

    #[test]
    fn test_number_key_outside_window_is_ignored() {
        let mut app = loaded_app(2, false);
        assert_eq!(app.page_window, 1..=3);
        app.handle_input(key(KeyCode::Char('2')));
        assert_eq!(app.view.page, 2);

        app.handle_input(key(KeyCode::Char('4')));
        assert_eq!(app.view.page, 2);
        app.go_to_window_slot(0);
        assert_eq!(app.view.page, 2);
    }

    #[test]
    fn test_filter_change_keeps_page_by_default() {
        let mut app = loaded_app(2, false);
        app.go_to_page(2);
        app.update_filters(|f| {
            f.toggle_filter(&FilterKey::new(FilterCategory::Type, "Talk Show"), false)
        });
        assert_eq!(app.view.page, 2);
        assert_eq!(page_ids(&app), vec![5]);
    }

    #[test]
    fn test_filter_change_clamps_page_past_the_end() {
        let mut app = loaded_app(2, false);
        app.go_to_page(3);
        app.update_filters(|f| {
            f.toggle_filter(&FilterKey::new(FilterCategory::Type, "Scripted"), false)
        });
        assert_eq!(app.total_pages, 1);
        assert_eq!(app.view.page, 1);
        assert_eq!(page_ids(&app), vec![2, 3]);
    }

    #[test]
    fn test_filter_change_resets_page_when_configured() {
        let mut app = loaded_app(2, true);
        app.go_to_page(2);
        app.update_filters(|f| {
            f.toggle_filter(&FilterKey::new(FilterCategory::Type, "Talk Show"), false)
        });
        assert_eq!(app.view.page, 1);
        assert_eq!(page_ids(&app), vec![1, 4]);
    }

    #[test]
    fn test_sort_shortcuts() {
        let mut app = loaded_app(10, false);
        app.handle_input(key(KeyCode::Char('s')));
        assert_eq!(app.view.sort_key, SortKey::EpisodeName);
        assert_eq!(page_ids(&app), vec![2, 1, 4, 5, 3]);

        app.handle_input(key(KeyCode::Char('d')));
        assert_eq!(app.view.sort_direction, SortDirection::Desc);
        assert_eq!(page_ids(&app), vec![3, 5, 4, 1, 2]);
    }

    #[test]
    fn test_reload_and_quit_actions() {
        let mut app = loaded_app(10, false);
        assert_eq!(app.handle_input(key(KeyCode::Char('r'))), Action::Reload);
        assert_eq!(app.handle_input(key(KeyCode::Char('q'))), Action::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_even_with_error() {
        let mut app = loaded_app(10, false);
        app.set_error("boom");
        let action = app.handle_input(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(action, Action::Quit);
    }

    #[test]
    fn test_error_popup_swallows_one_key() {
        let mut app = loaded_app(10, false);
        app.set_error("boom");
        assert_eq!(app.handle_input(key(KeyCode::Char('r'))), Action::None);
        assert!(app.error_message.is_none());
        assert_eq!(app.handle_input(key(KeyCode::Char('r'))), Action::Reload);
    }

    #[test]
    fn test_help_modal() {
        let mut app = loaded_app(10, false);
        app.handle_input(key(KeyCode::Char('?')));
        assert!(app.show_help);
        assert_eq!(app.handle_input(key(KeyCode::Char('s'))), Action::None);
        assert_eq!(app.view.sort_key, SortKey::Date);
        app.handle_input(key(KeyCode::Esc));
        assert!(!app.show_help);
    }

    #[test]
    fn test_loading_screen_ignores_navigation() {
        let mut app = App::new(ViewState::default(), false);
        app.set_loading("Fetching schedule...");
        assert_eq!(app.handle_input(key(KeyCode::Char('r'))), Action::None);
        assert_eq!(app.handle_input(key(KeyCode::Char('q'))), Action::Quit);
    }

    #[test]
    fn test_card_cursor_stays_in_page() {
        let mut app = loaded_app(2, false);
        app.handle_input(key(KeyCode::Down));
        app.handle_input(key(KeyCode::Down));
        assert_eq!(app.card_list_state.selected(), Some(1));
        app.handle_input(key(KeyCode::Up));
        app.handle_input(key(KeyCode::Up));
        assert_eq!(app.card_list_state.selected(), Some(0));
    }
}
