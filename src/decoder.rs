//! Decodes media playlists into segment descriptors and timelines.
//!
//! # Examples
//!
//! ```
//! use hls_timeline::{parse_timeline, Item};
//!
//! let input = b"#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXTINF:9.9,First\nsegment1.ts\n#EXT-X-ENDLIST\n";
//! let timeline = parse_timeline(input).unwrap();
//!
//! let track = &timeline.tracks[0];
//! assert_eq!(track.metadata.hls.target_duration, Some(10));
//! match &track.children[0] {
//!     Item::Clip(clip) => assert_eq!(clip.name, "First"),
//!     _ => unreachable!(),
//! }
//! ```

use std::io::BufRead;
use std::mem;
use std::str::FromStr;

use tracing::{debug, trace, warn};

use crate::attributes::AttributeList;
use crate::error::{Error, Result};
use crate::parser;
use crate::playlist::*;
use crate::timeline::Timeline;

/// A variant stream before any `#EXTINF` marks a master playlist.
const MASTER_TAG: &str = "EXT-X-STREAM-INF";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Fail on malformed numeric fields and byte ranges instead of
    /// substituting zero or dropping the range.
    pub strict: bool,
}

/// Reads a playlist line by line.
pub struct Decoder<R> {
    reader: R,
    options: DecodeOptions,
}

impl<R: BufRead> Decoder<R> {
    pub fn new(reader: R) -> Decoder<R> {
        Decoder::with_options(reader, DecodeOptions::default())
    }

    pub fn with_options(reader: R, options: DecodeOptions) -> Decoder<R> {
        Decoder { reader, options }
    }

    /// Decodes the playlist into its attributes and segments.
    pub fn decode_playlist(self) -> Result<DecodedPlaylist> {
        let mut builder: Option<MediaPlaylistBuilder> = None;

        for line in self.reader.lines() {
            let line = line?;
            let entry = match parser::classify_line(&line) {
                Some(entry) => entry,
                None => continue,
            };

            match builder.as_mut() {
                Some(builder) => builder.push(entry)?,
                None if entry.is_tag("EXTM3U") => {
                    builder = Some(MediaPlaylistBuilder::new(self.options));
                }
                None => {
                    return Err(Error::invalid_playlist(format!(
                        "expected #EXTM3U as the first line, found {:?}",
                        line.trim()
                    )));
                }
            }
        }

        match builder {
            Some(builder) => builder.finish(),
            None => Err(Error::invalid_playlist("empty playlist")),
        }
    }

    /// Decodes the playlist into a timeline with a single video track.
    pub fn decode(self) -> Result<Timeline> {
        self.decode_playlist().map(Timeline::from)
    }
}

/// Decode a media playlist from bytes.
///
/// # Examples
///
/// ```
/// use hls_timeline::{parse_playlist, Error};
///
/// let playlist = parse_playlist(b"#EXTM3U\n#EXTINF:9.9,\nsegment1.ts\n").unwrap();
/// assert_eq!(playlist.segments[0].duration, 9.9);
///
/// assert!(matches!(parse_playlist(b""), Err(Error::InvalidPlaylist(_))));
/// ```
pub fn parse_playlist(input: &[u8]) -> Result<DecodedPlaylist> {
    Decoder::new(input).decode_playlist()
}

/// Decode a media playlist from bytes into a timeline.
pub fn parse_timeline(input: &[u8]) -> Result<Timeline> {
    Decoder::new(input).decode()
}

// -----------------------------------------------------------------------------------------------
// Decode state
// -----------------------------------------------------------------------------------------------

/// Values that apply only to the next URI line. Taken, and so reset to
/// their defaults, every time a segment is emitted.
#[derive(Debug, Default)]
struct PendingSegment {
    duration: f64,
    title: Option<String>,
    byte_range: Option<ByteRange>,
    program_date_time: Option<String>,
}

/// Rolling state of one decode pass.
///
/// `pending` is reset on every emitted segment. Everything else persists
/// until a later tag replaces it: the key and init segment are replaced by
/// the next `EXT-X-KEY` / `EXT-X-MAP`, `discontinuity_count` only grows, and
/// `last_byte_range_end` tracks the end of the last emitted byte range.
#[derive(Debug, Default)]
struct DecodeState {
    pending: PendingSegment,
    key: Option<String>,
    init_segment: Option<InitSegment>,
    discontinuity_count: u64,
    last_byte_range_end: u64,
}

impl DecodeState {
    fn emit(&mut self, uri: String) -> SegmentDescriptor {
        let pending = mem::take(&mut self.pending);
        if let Some(range) = pending.byte_range {
            self.last_byte_range_end = range.end();
        }

        SegmentDescriptor {
            uri,
            duration: pending.duration,
            title: pending.title.filter(|title| !title.is_empty()),
            byte_range: pending.byte_range,
            init_segment: self.init_segment.clone(),
            key: self.key.clone(),
            program_date_time: pending.program_date_time,
            discontinuity_index: self.discontinuity_count,
        }
    }
}

struct MediaPlaylistBuilder {
    options: DecodeOptions,
    attributes: MediaPlaylistAttributes,
    segments: Vec<SegmentDescriptor>,
    state: DecodeState,
    seen_extinf: bool,
}

impl MediaPlaylistBuilder {
    fn new(options: DecodeOptions) -> MediaPlaylistBuilder {
        MediaPlaylistBuilder {
            options,
            attributes: MediaPlaylistAttributes::default(),
            segments: Vec::new(),
            state: DecodeState::default(),
            seen_extinf: false,
        }
    }

    fn push(&mut self, entry: PlaylistLine) -> Result<()> {
        match entry {
            PlaylistLine::Tag { name, value } => self.push_tag(&name, &value),
            PlaylistLine::Uri(uri) => {
                let segment = self.state.emit(uri);
                self.segments.push(segment);
                Ok(())
            }
            PlaylistLine::Comment(_) => Ok(()),
        }
    }

    fn push_tag(&mut self, name: &str, value: &str) -> Result<()> {
        if !self.seen_extinf && name == MASTER_TAG {
            return Err(Error::UnsupportedPlaylist(
                "master playlists cannot be decoded".to_string(),
            ));
        }

        let value = value.trim();
        match name {
            "EXT-X-VERSION" => {
                self.attributes.version = Some(self.number(name, value)?);
            }
            "EXT-X-TARGETDURATION" => {
                self.attributes.target_duration = Some(self.number(name, value)?);
            }
            "EXT-X-MEDIA-SEQUENCE" => {
                self.attributes.media_sequence = Some(self.number(name, value)?);
            }
            "EXT-X-PLAYLIST-TYPE" => {
                self.attributes.playlist_type = Some(value.to_string());
            }
            "EXT-X-MAP" => {
                let attrs = AttributeList::parse(value);
                let uri = attrs.get("URI").unwrap_or_default();
                if uri.is_empty() {
                    warn!(value, "#EXT-X-MAP without URI");
                }
                let byte_range = match attrs.get("BYTERANGE") {
                    Some(range) => self.byte_range(name, range)?,
                    None => None,
                };
                self.state.init_segment = Some(InitSegment {
                    uri: uri.to_string(),
                    byte_range,
                });
            }
            "EXTINF" => {
                self.seen_extinf = true;
                let (duration, title) = parser::duration_title(value);
                self.state.pending.duration = self.number(name, duration)?;
                self.state.pending.title = title.map(str::to_string);
            }
            "EXT-X-BYTERANGE" => {
                let mut range = self.byte_range(name, value)?;
                if let Some(range) = range.as_mut() {
                    if range.offset == 0 && self.state.last_byte_range_end > 0 {
                        range.offset = self.state.last_byte_range_end;
                    }
                }
                self.state.pending.byte_range = range;
            }
            "EXT-X-KEY" => {
                self.state.key = Some(value.to_string());
            }
            "EXT-X-PROGRAM-DATE-TIME" => {
                self.state.pending.program_date_time = Some(value.to_string());
            }
            "EXT-X-DISCONTINUITY" => {
                self.state.discontinuity_count += 1;
            }
            _ => trace!(tag = name, "ignoring tag"),
        }

        Ok(())
    }

    /// Parses a numeric tag value, substituting zero unless decoding strictly.
    fn number<T: FromStr + Default>(&self, tag: &str, value: &str) -> Result<T> {
        match value.parse() {
            Ok(n) => Ok(n),
            Err(_) if self.options.strict => Err(Error::malformed_field(tag, value)),
            Err(_) => {
                warn!(tag, value, "malformed number, using 0");
                Ok(T::default())
            }
        }
    }

    /// Parses a byte range, dropping it unless decoding strictly.
    fn byte_range(&self, tag: &str, value: &str) -> Result<Option<ByteRange>> {
        match value.parse::<ByteRange>() {
            Ok(range) => Ok(Some(range)),
            Err(_) if self.options.strict => Err(Error::malformed_field(tag, value)),
            Err(err) => {
                warn!(tag, %err, "ignoring byterange");
                Ok(None)
            }
        }
    }

    fn finish(self) -> Result<DecodedPlaylist> {
        if !self.seen_extinf {
            return Err(Error::UnsupportedPlaylist(
                "no #EXTINF or #EXT-X-STREAM-INF found".to_string(),
            ));
        }

        debug!(
            segments = self.segments.len(),
            discontinuities = self.state.discontinuity_count,
            "decoded media playlist"
        );
        Ok(DecodedPlaylist {
            attributes: self.attributes,
            segments: self.segments,
        })
    }
}
