//! Filter taxonomy for the episode list.
//!
//! Filters are derived once per fetch from the distinct attribute values seen
//! in the eligible episodes. Each entry belongs to one of four categories and
//! only its `enabled` flag ever changes.

use crate::types::Episode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a category treats episodes that have no value for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPolicy {
    /// Episodes without a value always pass.
    Retain,
    /// Episodes without a value are dropped as soon as any entry of the
    /// category is disabled, and kept while every entry is enabled.
    ExcludeWhenAnyDisabled,
}

/// One of the four filter groupings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    /// Program type, e.g. "Scripted".
    Type,
    Language,
    /// Broadcast network.
    Network,
    /// Web channel.
    StreamingService,
}

const NULL_POLICIES: [(FilterCategory, NullPolicy); 4] = [
    (FilterCategory::Type, NullPolicy::Retain),
    (FilterCategory::Language, NullPolicy::ExcludeWhenAnyDisabled),
    (FilterCategory::Network, NullPolicy::ExcludeWhenAnyDisabled),
    (FilterCategory::StreamingService, NullPolicy::ExcludeWhenAnyDisabled),
];

impl FilterCategory {
    /// All categories in display order.
    pub fn all() -> &'static [FilterCategory] {
        use FilterCategory::*;
        &[Type, Language, Network, StreamingService]
    }

    /// Sidebar heading for the category.
    pub fn label(&self) -> &'static str {
        match self {
            FilterCategory::Type => "Types",
            FilterCategory::Language => "Languages",
            FilterCategory::Network => "Networks",
            FilterCategory::StreamingService => "Streaming Services",
        }
    }

    pub fn null_policy(&self) -> NullPolicy {
        NULL_POLICIES
            .iter()
            .find(|(category, _)| category == self)
            .map(|(_, policy)| *policy)
            .unwrap_or(NullPolicy::Retain)
    }

    /// The episode's value for this category. Empty strings count as absent.
    pub fn value_of<'a>(&self, episode: &'a Episode) -> Option<&'a str> {
        let value = match self {
            FilterCategory::Type => Some(episode.show.kind.as_str()),
            FilterCategory::Language => episode.show.language(),
            FilterCategory::Network => episode.show.network_name(),
            FilterCategory::StreamingService => episode.show.streaming_service(),
        };
        value.filter(|v| !v.is_empty())
    }
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Addresses one filter entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterKey {
    pub category: FilterCategory,
    pub value: String,
}

impl FilterKey {
    pub fn new(category: FilterCategory, value: impl Into<String>) -> Self {
        Self {
            category,
            value: value.into(),
        }
    }
}

/// Toggle state of one distinct attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterEntry {
    enabled: bool,
    category: FilterCategory,
}

impl FilterEntry {
    fn new(category: FilterCategory) -> Self {
        Self {
            enabled: true,
            category,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn category(&self) -> FilterCategory {
        self.category
    }
}

/// The full set of filter entries, grouped by category and sorted by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    entries: BTreeMap<FilterCategory, BTreeMap<String, FilterEntry>>,
}

impl FilterSet {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one enabled entry per distinct value observed in `episodes`.
    pub fn from_episodes(episodes: &[Episode]) -> Self {
        let mut set = Self::new();
        for episode in episodes {
            for &category in FilterCategory::all() {
                if let Some(value) = category.value_of(episode) {
                    set.insert(category, value);
                }
            }
        }
        set
    }

    fn insert(&mut self, category: FilterCategory, value: &str) {
        self.entries
            .entry(category)
            .or_default()
            .entry(value.to_string())
            .or_insert_with(|| FilterEntry::new(category));
    }

    pub fn get(&self, key: &FilterKey) -> Option<&FilterEntry> {
        self.entries.get(&key.category)?.get(&key.value)
    }

    /// Whether the entry for `value` is enabled, or `None` if the value was
    /// never seen.
    pub fn is_enabled(&self, category: FilterCategory, value: &str) -> Option<bool> {
        self.entries
            .get(&category)?
            .get(value)
            .map(FilterEntry::enabled)
    }

    pub fn any_disabled(&self, category: FilterCategory) -> bool {
        self.entries_in(category).any(|(_, entry)| !entry.enabled)
    }

    /// True for categories with no entries.
    pub fn all_enabled(&self, category: FilterCategory) -> bool {
        !self.any_disabled(category)
    }

    /// Entries of one category, ordered by value.
    pub fn entries_in(
        &self,
        category: FilterCategory,
    ) -> impl Iterator<Item = (&str, &FilterEntry)> + '_ {
        self.entries
            .get(&category)
            .into_iter()
            .flat_map(|values| values.iter().map(|(value, entry)| (value.as_str(), entry)))
    }

    /// Number of entries across all categories.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set the `enabled` flag of a single entry. Unknown keys leave the set
    /// unchanged.
    pub fn toggle_filter(mut self, key: &FilterKey, enabled: bool) -> Self {
        if let Some(entry) = self
            .entries
            .get_mut(&key.category)
            .and_then(|values| values.get_mut(&key.value))
        {
            entry.enabled = enabled;
        }
        self
    }

    /// Set the `enabled` flag of every entry in `category`.
    pub fn toggle_category(mut self, category: FilterCategory, enabled: bool) -> Self {
        if let Some(values) = self.entries.get_mut(&category) {
            for entry in values.values_mut() {
                entry.enabled = enabled;
            }
        }
        self
    }
}
