//! The editorial timeline model the codec reads from and builds.
//!
//! A [`Timeline`] owns an ordered list of [`Track`]s. Each track holds
//! [`Item`]s in playback order, and each [`Clip`] points at its media through
//! a [`MediaReference`]. Every object carries a [`Metadata`] container.

use crate::metadata::Metadata;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A time value expressed as `value / rate` seconds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RationalTime {
    pub value: f64,
    pub rate: f64,
}

impl RationalTime {
    pub fn new(value: f64, rate: f64) -> RationalTime {
        RationalTime { value, rate }
    }

    /// A time at a rate of 1 Hz, so that `value` is in seconds.
    pub fn from_seconds(seconds: f64) -> RationalTime {
        RationalTime::new(seconds, 1.0)
    }

    pub fn to_seconds(&self) -> f64 {
        if self.rate == 0.0 {
            return 0.0;
        }
        self.value / self.rate
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_time: RationalTime,
    pub duration: RationalTime,
}

impl TimeRange {
    pub fn new(start_time: RationalTime, duration: RationalTime) -> TimeRange {
        TimeRange {
            start_time,
            duration,
        }
    }

    /// A range starting at zero and lasting `seconds`, both at 1 Hz.
    pub fn from_seconds(seconds: f64) -> TimeRange {
        TimeRange::new(RationalTime::from_seconds(0.0), RationalTime::from_seconds(seconds))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    Video,
    Audio,
    Other(String),
}

impl Default for TrackKind {
    fn default() -> TrackKind {
        TrackKind::Video
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrackKind::Video => write!(f, "Video"),
            TrackKind::Audio => write!(f, "Audio"),
            TrackKind::Other(kind) => write!(f, "{}", kind),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub name: String,
    pub tracks: Vec<Track>,
    pub metadata: Metadata,
}

impl Timeline {
    pub fn new(name: impl Into<String>) -> Timeline {
        Timeline {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn append_track(&mut self, track: Track) {
        self.tracks.push(track);
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub kind: TrackKind,
    pub children: Vec<Item>,
    pub metadata: Metadata,
}

impl Track {
    pub fn new(name: impl Into<String>, kind: TrackKind) -> Track {
        Track {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn append_child(&mut self, item: impl Into<Item>) {
        self.children.push(item.into());
    }

    /// The clips of this track in order, skipping any other kind of item.
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.children.iter().filter_map(|item| match item {
            Item::Clip(clip) => Some(clip),
            _ => None,
        })
    }
}

/// A child of a [`Track`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Clip(Clip),
    Gap(Gap),
}

impl From<Clip> for Item {
    fn from(clip: Clip) -> Item {
        Item::Clip(clip)
    }
}

impl From<Gap> for Item {
    fn from(gap: Gap) -> Item {
        Item::Gap(gap)
    }
}

/// Empty space on a track.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub duration: RationalTime,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub name: String,
    pub source_range: Option<TimeRange>,
    pub media_reference: MediaReference,
    pub metadata: Metadata,
}

impl Clip {
    pub fn new(
        name: impl Into<String>,
        media_reference: MediaReference,
        source_range: Option<TimeRange>,
    ) -> Clip {
        Clip {
            name: name.into(),
            source_range,
            media_reference,
            metadata: Metadata::default(),
        }
    }

    /// Duration of the clip's source range, or zero when it has none.
    pub fn duration(&self) -> RationalTime {
        self.source_range
            .map(|range| range.duration)
            .unwrap_or_else(|| RationalTime::from_seconds(0.0))
    }

    /// Target URL of an external media reference.
    pub fn target_url(&self) -> Option<&str> {
        match &self.media_reference {
            MediaReference::External(reference) => Some(reference.target_url.as_str()),
            MediaReference::Missing => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MediaReference {
    External(ExternalReference),
    Missing,
}

impl Default for MediaReference {
    fn default() -> MediaReference {
        MediaReference::Missing
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalReference {
    pub target_url: String,
    pub metadata: Metadata,
}

impl ExternalReference {
    pub fn new(target_url: impl Into<String>) -> ExternalReference {
        ExternalReference {
            target_url: target_url.into(),
            metadata: Metadata::default(),
        }
    }
}
