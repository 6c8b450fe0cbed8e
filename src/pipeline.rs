//! The episode list pipeline.
//!
//! Raw feed records go through `ingest -> apply_filters -> sort_episodes ->
//! paginate`. Every stage is a plain function over borrowed data so the view
//! can be recomputed from scratch after each state change.

use crate::error::AppError;
use crate::filters::{FilterCategory, FilterSet, NullPolicy};
use crate::types::Episode;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Number of episodes per page.
pub const PAGE_SIZE: usize = 120;

/// Maximum number of page numbers the pagination control shows at once.
pub const MAX_PAGE_BUTTONS: usize = 5;

/// Attribute the episode list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Air time.
    #[default]
    Date,
    EpisodeName,
    ShowName,
}

impl SortKey {
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Date => "Air time",
            SortKey::EpisodeName => "Episode name",
            SortKey::ShowName => "Show name",
        }
    }

    /// The next key in the cycle used by the sort shortcut.
    pub fn next(self) -> Self {
        match self {
            SortKey::Date => SortKey::EpisodeName,
            SortKey::EpisodeName => SortKey::ShowName,
            SortKey::ShowName => SortKey::Date,
        }
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "date" | "airtime" => Ok(SortKey::Date),
            "episodename" | "episode" => Ok(SortKey::EpisodeName),
            "showname" | "show" => Ok(SortKey::ShowName),
            _ => Err(AppError::InvalidInput(format!(
                "unknown sort key '{}', expected date, episode-name or show-name",
                s
            ))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(AppError::InvalidInput(format!(
                "unknown sort direction '{}', expected asc or desc",
                s
            ))),
        }
    }
}

/// Page, sort and page size selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    /// Current page, 1-based.
    pub page: usize,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page: 1,
            sort_key: SortKey::default(),
            sort_direction: SortDirection::default(),
            page_size: PAGE_SIZE,
        }
    }
}

impl ViewState {
    pub fn with_page(self, page: usize) -> Self {
        Self { page, ..self }
    }

    pub fn with_sort_key(self, sort_key: SortKey) -> Self {
        Self { sort_key, ..self }
    }

    pub fn with_sort_direction(self, sort_direction: SortDirection) -> Self {
        Self {
            sort_direction,
            ..self
        }
    }

    /// Bring `page` into `1..=total_pages` (or 1 when there are no pages).
    pub fn clamp_page(self, total_pages: usize) -> Self {
        self.with_page(self.page.clamp(1, total_pages.max(1)))
    }
}

/// Eligible episodes of one fetch plus the filters derived from them.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub episodes: Vec<Episode>,
    pub filters: FilterSet,
}

/// Keep the episodes airing strictly after `now` and derive the filter set
/// from them.
///
/// Episodes whose airstamp does not parse are not eligible.
pub fn ingest(raw: Vec<Episode>, now: DateTime<Utc>) -> Schedule {
    let received = raw.len();
    let episodes: Vec<Episode> = raw
        .into_iter()
        .filter(|episode| episode.airstamp.is_after(now))
        .collect();
    let filters = FilterSet::from_episodes(&episodes);

    debug!(
        "Ingested {} of {} episodes, {} filter entries",
        episodes.len(),
        received,
        filters.len()
    );

    Schedule { episodes, filters }
}

/// Drop the episodes excluded by `filters`, keeping input order.
pub fn apply_filters<'a>(episodes: &'a [Episode], filters: &FilterSet) -> Vec<&'a Episode> {
    let null_excluded: Vec<FilterCategory> = FilterCategory::all()
        .iter()
        .copied()
        .filter(|category| {
            category.null_policy() == NullPolicy::ExcludeWhenAnyDisabled
                && filters.any_disabled(*category)
        })
        .collect();

    episodes
        .iter()
        .filter(|episode| {
            FilterCategory::all()
                .iter()
                .all(|&category| match category.value_of(episode) {
                    Some(value) => filters.is_enabled(category, value).unwrap_or(true),
                    None => !null_excluded.contains(&category),
                })
        })
        .collect()
}

fn compare_instants(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    direction: SortDirection,
) -> Ordering {
    // Episodes without an instant go last in both directions.
    match (a, b) {
        (Some(a), Some(b)) => direction.apply(a.cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Primary collation key: decomposed, accents stripped, lowercased.
fn collation_key(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Base letters first, then accents and case, then the raw text.
fn compare_text(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(collation_key(b))
        .then_with(|| {
            a.chars()
                .flat_map(char::to_lowercase)
                .cmp(b.chars().flat_map(char::to_lowercase))
        })
        .then_with(|| a.cmp(b))
}

/// Stable sort by `key` in `direction`.
pub fn sort_episodes(
    mut episodes: Vec<&Episode>,
    key: SortKey,
    direction: SortDirection,
) -> Vec<&Episode> {
    match key {
        SortKey::Date => episodes.sort_by(|a, b| {
            compare_instants(a.airstamp.instant(), b.airstamp.instant(), direction)
        }),
        SortKey::EpisodeName => {
            episodes.sort_by(|a, b| direction.apply(compare_text(&a.name, &b.name)))
        }
        SortKey::ShowName => {
            episodes.sort_by(|a, b| direction.apply(compare_text(&a.show.name, &b.show.name)))
        }
    }
    episodes
}

/// One page of the sorted list and the counts around it.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination<'a> {
    pub items: Vec<&'a Episode>,
    pub total_pages: usize,
    /// Episodes matching the filters, before slicing.
    pub total_count: usize,
}

/// Slice page `page` (1-based) out of `sorted`.
///
/// No clamping: page 0 or a page past `total_pages` yields an empty slice.
pub fn paginate<'a>(sorted: &[&'a Episode], page: usize, page_size: usize) -> Pagination<'a> {
    let total_count = sorted.len();
    if page_size == 0 {
        return Pagination {
            items: Vec::new(),
            total_pages: 0,
            total_count,
        };
    }

    let total_pages = total_count.div_ceil(page_size);
    let items = match page.checked_sub(1) {
        Some(index) => {
            let start = index.saturating_mul(page_size);
            if start >= total_count {
                Vec::new()
            } else {
                let end = start.saturating_add(page_size).min(total_count);
                sorted[start..end].to_vec()
            }
        }
        None => Vec::new(),
    };

    Pagination {
        items,
        total_pages,
        total_count,
    }
}

/// Page numbers shown by the pagination control around `page`.
///
/// # Examples
///
/// ```
/// use schedule_watcher::pipeline::page_window;
///
/// assert_eq!(page_window(1, 9, 5), 1..=5);
/// assert_eq!(page_window(6, 9, 5), 4..=8);
/// assert_eq!(page_window(9, 9, 5), 7..=9);
/// assert!(page_window(1, 0, 5).is_empty());
/// ```
pub fn page_window(page: usize, total_pages: usize, max_buttons: usize) -> RangeInclusive<usize> {
    if max_buttons == 0 {
        return 1..=0;
    }
    let start = page.saturating_sub(max_buttons / 2).max(1);
    let end = total_pages.min(start.saturating_add(max_buttons - 1));
    start..=end
}

/// Everything the presentation needs for one render cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    pub items: Vec<&'a Episode>,
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub window: RangeInclusive<usize>,
}

/// Run filter, sort and paginate for the current state.
pub fn render_view<'a>(
    episodes: &'a [Episode],
    filters: &FilterSet,
    view: &ViewState,
) -> PageView<'a> {
    let filtered = apply_filters(episodes, filters);
    let sorted = sort_episodes(filtered, view.sort_key, view.sort_direction);
    let pagination = paginate(&sorted, view.page, view.page_size);

    PageView {
        window: page_window(view.page, pagination.total_pages, MAX_PAGE_BUTTONS),
        items: pagination.items,
        page: view.page,
        total_pages: pagination.total_pages,
        total_count: pagination.total_count,
    }
}
