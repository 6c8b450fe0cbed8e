//! Type definitions for the schedule-watcher application.
//!
//! This module contains the episode records fetched from the schedule feed.
//! Records are immutable once deserialized; the pipeline only derives views
//! over them.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The airing instant of an episode.
///
/// Keeps the raw feed text next to the parsed instant. A string that is not
/// RFC 3339 keeps its text and has no instant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Airstamp {
    raw: String,
    instant: Option<DateTime<Utc>>,
}

impl Airstamp {
    /// Parse an airstamp as sent by the feed (e.g. `2024-05-01T01:00:00+00:00`).
    ///
    /// # Examples
    ///
    /// ```
    /// use schedule_watcher::types::Airstamp;
    ///
    /// let stamp = Airstamp::parse("2024-05-01T01:00:00+02:00");
    /// assert_eq!(stamp.instant().unwrap().to_rfc3339(), "2024-04-30T23:00:00+00:00");
    ///
    /// let broken = Airstamp::parse("soon");
    /// assert!(broken.instant().is_none());
    /// assert_eq!(broken.as_str(), "soon");
    /// ```
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let instant = DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc));
        Self { raw, instant }
    }

    /// Parsed instant, if the raw text was valid.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.instant
    }

    /// Raw text as received.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this airstamp lies strictly after `now`.
    ///
    /// Unparseable airstamps are never after anything.
    pub fn is_after(&self, now: DateTime<Utc>) -> bool {
        self.instant.map(|instant| instant > now).unwrap_or(false)
    }
}

/// Poster images of a show.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ShowImage {
    #[serde(default)]
    pub medium: Option<String>,
}

/// A broadcast network or a web channel (streaming service).
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Channel {
    #[serde(default)]
    pub name: Option<String>,
}

/// The show an episode belongs to.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Show {
    /// Display name of the show.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Program type, e.g. "Scripted" or "Talk Show".
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,

    /// Show language, absent for some web productions.
    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub image: Option<ShowImage>,

    /// Broadcast network.
    #[serde(default)]
    pub network: Option<Channel>,

    /// Streaming service.
    #[serde(rename = "webChannel", default)]
    pub web_channel: Option<Channel>,
}

impl Show {
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn network_name(&self) -> Option<&str> {
        self.network.as_ref().and_then(|n| n.name.as_deref())
    }

    pub fn streaming_service(&self) -> Option<&str> {
        self.web_channel.as_ref().and_then(|c| c.name.as_deref())
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(|i| i.medium.as_deref())
    }
}

/// Episode as it appears in the feed; the show sits under `_embedded`.
#[derive(Debug, Deserialize)]
struct RawEpisode {
    id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    season: u32,
    #[serde(default)]
    number: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    airstamp: String,
    #[serde(rename = "_embedded")]
    embedded: RawEmbedded,
}

#[derive(Debug, Deserialize)]
struct RawEmbedded {
    show: Show,
}

impl From<RawEpisode> for Episode {
    fn from(raw: RawEpisode) -> Self {
        Episode {
            id: raw.id,
            name: raw.name,
            season: raw.season,
            number: raw.number,
            airstamp: Airstamp::parse(raw.airstamp),
            show: raw.embedded.show,
        }
    }
}

/// A single airing of a show episode.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(from = "RawEpisode")]
pub struct Episode {
    /// Unique identifier for the episode.
    pub id: u64,

    /// Episode title, possibly empty.
    pub name: String,

    pub season: u32,

    /// Episode number within the season; absent for specials.
    pub number: Option<u32>,

    pub airstamp: Airstamp,

    pub show: Show,
}

impl Episode {
    /// Season and episode position as shown on a card.
    ///
    /// # Examples
    ///
    /// ```
    /// use schedule_watcher::types::{Airstamp, Episode, Show};
    ///
    /// let mut ep = Episode {
    ///     id: 1,
    ///     name: "Pilot".to_string(),
    ///     season: 2,
    ///     number: Some(5),
    ///     airstamp: Airstamp::parse("2030-01-01T00:00:00+00:00"),
    ///     show: Show::default(),
    /// };
    /// assert_eq!(ep.position_display(), "Season 2 Episode 5");
    ///
    /// ep.number = None;
    /// assert_eq!(ep.position_display(), "Season 2 Special");
    /// ```
    pub fn position_display(&self) -> String {
        match self.number {
            Some(number) => format!("Season {} Episode {}", self.season, number),
            None => format!("Season {} Special", self.season),
        }
    }

    /// Airing time in the local timezone, or the raw text if it did not parse.
    pub fn air_time_display(&self) -> String {
        match self.airstamp.instant() {
            Some(instant) => instant
                .with_timezone(&Local)
                .format("%a %b %e %Y, %H:%M")
                .to_string(),
            None => self.airstamp.as_str().to_string(),
        }
    }

    /// One-line summary used by the plain-text output.
    pub fn to_display(&self) -> String {
        let position = match self.number {
            Some(number) => format!("S{:02}E{:02}", self.season, number),
            None => format!("S{:02} Special", self.season),
        };
        if self.name.is_empty() {
            format!("{} {}", self.show.name, position)
        } else {
            format!("{} {} - {}", self.show.name, position, self.name)
        }
    }
}
