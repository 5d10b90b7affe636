//! Contains the structs produced by decoding a playlist.
//!
//! The main type here is [`DecodedPlaylist`]: the playlist-level attributes
//! plus one [`SegmentDescriptor`] per URI line. It converts into a
//! [`Timeline`] holding a single video track.

use crate::error::Error;
use crate::metadata::{HlsMetadata, InitByteRange, Metadata, StreamingMetadata};
use crate::timeline::{Clip, ExternalReference, MediaReference, TimeRange, Timeline, Track, TrackKind};
use std::fmt;
use std::str::FromStr;

/// One classified, non-blank playlist line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistLine {
    /// `#EXT<name>[:<value>]`. The name keeps its `EXT` prefix, e.g.
    /// `EXTINF` or `EXT-X-KEY`.
    Tag { name: String, value: String },
    /// Any other line starting with `#`, without the `#`.
    Comment(String),
    /// A media segment or variant URI, verbatim.
    Uri(String),
}

impl PlaylistLine {
    pub fn is_tag(&self, tag_name: &str) -> bool {
        matches!(self, PlaylistLine::Tag { name, .. } if name == tag_name)
    }
}

/// [`#EXT-X-BYTERANGE:<n>[@<o>]`]
/// (https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.2.2)
///
/// The EXT-X-BYTERANGE tag indicates that a Media Segment is a sub-range
/// of the resource identified by its URI. An omitted offset is stored as
/// zero; the decoder resolves it against the end of the previous range.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub count: u64,
    pub offset: u64,
}

impl ByteRange {
    pub fn new(count: u64, offset: u64) -> ByteRange {
        ByteRange { count, offset }
    }

    /// First byte past the end of the range.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.count)
    }
}

impl FromStr for ByteRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<ByteRange, Error> {
        let parts: Vec<&str> = s.split('@').collect();
        let parse = |part: &str| {
            part.trim()
                .parse::<u64>()
                .map_err(|_| Error::MalformedByteRange(s.to_string()))
        };

        match parts.as_slice() {
            [count] => Ok(ByteRange::new(parse(count)?, 0)),
            [count, offset] => Ok(ByteRange::new(parse(count)?, parse(offset)?)),
            _ => Err(Error::MalformedByteRange(s.to_string())),
        }
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.offset > 0 {
            write!(f, "{}@{}", self.count, self.offset)
        } else {
            write!(f, "{}", self.count)
        }
    }
}

impl From<InitByteRange> for ByteRange {
    fn from(range: InitByteRange) -> ByteRange {
        ByteRange::new(range.byte_count, range.byte_offset)
    }
}

impl From<ByteRange> for InitByteRange {
    fn from(range: ByteRange) -> InitByteRange {
        InitByteRange {
            byte_count: range.count,
            byte_offset: range.offset,
        }
    }
}

/// [`#EXT-X-MAP:<attribute-list>`]
/// (https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.2.5)
///
/// The Media Initialization Section that applies to every segment after the
/// tag until the next EXT-X-MAP.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InitSegment {
    pub uri: String,
    pub byte_range: Option<ByteRange>,
}

/// Playlist-level tags of a media playlist. Each is `None` when the tag is
/// absent; a repeated tag keeps its last value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MediaPlaylistAttributes {
    /// `#EXT-X-VERSION:<n>`
    pub version: Option<u32>,
    /// `#EXT-X-TARGETDURATION:<s>`
    pub target_duration: Option<u64>,
    /// `#EXT-X-MEDIA-SEQUENCE:<number>`
    pub media_sequence: Option<u64>,
    /// `#EXT-X-PLAYLIST-TYPE:<EVENT|VOD>`
    pub playlist_type: Option<String>,
}

/// One media segment, built from the tags preceding its URI line.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SegmentDescriptor {
    pub uri: String,
    /// `#EXTINF:<duration>,[<title>]`, in seconds.
    pub duration: f64,
    /// `#EXTINF:<duration>,[<title>]`
    pub title: Option<String>,
    /// `#EXT-X-BYTERANGE:<n>[@<o>]`, with the offset resolved.
    pub byte_range: Option<ByteRange>,
    /// Most recent `#EXT-X-MAP`.
    pub init_segment: Option<InitSegment>,
    /// Raw attribute list of the most recent `#EXT-X-KEY`.
    pub key: Option<String>,
    /// `#EXT-X-PROGRAM-DATE-TIME:<YYYY-MM-DDThh:mm:ssZ>`, raw.
    pub program_date_time: Option<String>,
    /// Number of `#EXT-X-DISCONTINUITY` tags before this segment.
    pub discontinuity_index: u64,
}

impl SegmentDescriptor {
    /// Display name: the title, or the URI when there is none.
    pub fn name(&self) -> &str {
        match &self.title {
            Some(title) if !title.is_empty() => title,
            _ => &self.uri,
        }
    }

    pub fn program_date_time(&self) -> Option<&str> {
        self.program_date_time.as_deref()
    }

    /// The program date time parsed as RFC 3339. `None` when absent or not
    /// a valid date.
    pub fn parsed_program_date_time(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        self.program_date_time
            .as_deref()
            .and_then(|pdt| chrono::DateTime::parse_from_rfc3339(pdt).ok())
    }

    fn metadata(&self) -> Metadata {
        let mut hls = HlsMetadata {
            key: self.key.clone(),
            program_date_time: self.program_date_time.clone(),
            ..Default::default()
        };
        if self.discontinuity_index > 0 {
            hls.discontinuity_sequence = Some(self.discontinuity_index);
        }

        let mut streaming = StreamingMetadata::default();
        if let Some(range) = self.byte_range {
            streaming.byte_count = Some(range.count);
            streaming.byte_offset = Some(range.offset);
        }
        if let Some(init) = &self.init_segment {
            streaming.init_uri = Some(init.uri.clone());
            streaming.init_byterange = init.byte_range.map(InitByteRange::from);
        }

        Metadata {
            hls,
            streaming,
            ..Default::default()
        }
    }
}

impl From<SegmentDescriptor> for Clip {
    fn from(segment: SegmentDescriptor) -> Clip {
        let metadata = segment.metadata();
        let source_range = if segment.duration > 0.0 {
            Some(TimeRange::from_seconds(segment.duration))
        } else {
            None
        };

        let mut reference = ExternalReference::new(segment.uri.as_str());
        reference.metadata = metadata.clone();

        let mut clip = Clip::new(
            segment.name(),
            MediaReference::External(reference),
            source_range,
        );
        clip.metadata = metadata;
        clip
    }
}

/// A decoded media playlist.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DecodedPlaylist {
    pub attributes: MediaPlaylistAttributes,
    pub segments: Vec<SegmentDescriptor>,
}

impl From<MediaPlaylistAttributes> for HlsMetadata {
    fn from(attributes: MediaPlaylistAttributes) -> HlsMetadata {
        HlsMetadata {
            version: attributes.version,
            target_duration: attributes.target_duration,
            media_sequence: attributes.media_sequence,
            playlist_type: attributes.playlist_type,
            ..Default::default()
        }
    }
}

impl From<DecodedPlaylist> for Timeline {
    fn from(playlist: DecodedPlaylist) -> Timeline {
        let mut track = Track::new("", TrackKind::Video);
        track.metadata.hls = playlist.attributes.into();
        for segment in playlist.segments {
            track.append_child(Clip::from(segment));
        }

        let mut timeline = Timeline::new("HLS Playlist");
        timeline.append_track(track);
        timeline
    }
}

impl fmt::Display for DecodedPlaylist {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[Media Playlist | duration: {:?} ~ seq: {:?} ~ type: {:?} ~ segments: {}",
            self.attributes.target_duration,
            self.attributes.media_sequence,
            self.attributes.playlist_type,
            self.segments.len(),
        )?;
        writeln!(f, "]")?;

        for (i, segment) in self.segments.iter().enumerate() {
            write!(f, " {} -> {}", i + 1, segment)?;
        }

        Ok(())
    }
}

impl fmt::Display for SegmentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[Segment |")?;

        if let Some(v) = &self.title {
            write!(f, " title: {:?}", v)?;
        }

        write!(f, " ~ duration: {:?}", self.duration)?;

        if let Some(v) = &self.byte_range {
            write!(f, " ~ byterange: {}", v)?;
        }

        if self.discontinuity_index > 0 {
            write!(f, " ~ discontinuity: {}", self.discontinuity_index)?;
        }

        if let Some(v) = &self.program_date_time {
            write!(f, " ~ datetime: {:?}", v)?;
        }

        writeln!(f, " ~ uri: {:?}]", self.uri)
    }
}
