//! Renders timelines as playlist text.
//!
//! A timeline with a single track becomes a media playlist. More than one
//! track, or the `master_playlist` switch in the timeline's `"HLS"` metadata,
//! produces a master playlist instead.
//!
//! # Examples
//!
//! ```
//! use hls_timeline::*;
//!
//! let mut track = Track::new("video", TrackKind::Video);
//! track.metadata.hls.target_duration = Some(10);
//! track.append_child(Clip::new(
//!     "segment1.ts",
//!     MediaReference::External(ExternalReference::new("segment1.ts")),
//!     Some(TimeRange::from_seconds(9.9)),
//! ));
//!
//! let mut timeline = Timeline::new("HLS Playlist");
//! timeline.append_track(track);
//!
//! let mut v: Vec<u8> = Vec::new();
//! timeline.write_to(&mut v).unwrap();
//! assert_eq!(
//!     String::from_utf8(v).unwrap(),
//!     "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:10\n#EXTINF:9.900000,\nsegment1.ts\n#EXT-X-ENDLIST\n"
//! );
//! ```

use std::io::Write;

use serde_json::Value;
use tracing::debug;

use crate::attributes::AttributeList;
use crate::error::{Error, Result};
use crate::metadata::{HlsMetadata, StreamingMetadata};
use crate::playlist::ByteRange;
use crate::timeline::{Clip, Timeline, Track, TrackKind};

/// Attributes not allowed on `#EXT-X-I-FRAME-STREAM-INF`.
const IFRAME_EXCLUDED: [&str; 4] = ["FRAME-RATE", "AUDIO", "SUBTITLES", "CLOSED-CAPTIONS"];

const DEFAULT_AUDIO_GROUP: &str = "audio1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// `#EXT-X-VERSION` of a media playlist whose track has no version.
    pub default_version: u32,
    /// `#EXT-X-VERSION` of every master playlist.
    pub master_version: u32,
    /// Write a master playlist even for a single track.
    pub force_master: bool,
}

impl Default for EncodeOptions {
    fn default() -> EncodeOptions {
        EncodeOptions {
            default_version: 3,
            master_version: 6,
            force_master: false,
        }
    }
}

/// Writes timelines to `W`. The playlist is rendered in full before
/// anything is written, so a failed encode leaves the writer untouched.
pub struct Encoder<W> {
    writer: W,
    options: EncodeOptions,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Encoder<W> {
        Encoder::with_options(writer, EncodeOptions::default())
    }

    pub fn with_options(writer: W, options: EncodeOptions) -> Encoder<W> {
        Encoder { writer, options }
    }

    pub fn encode(&mut self, timeline: &Timeline) -> Result<()> {
        let output = render(timeline, &self.options)?;
        self.writer.write_all(&output)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl Timeline {
    /// Write the timeline as a media or master playlist.
    pub fn write_to<T: Write>(&self, w: &mut T) -> Result<()> {
        Encoder::new(w).encode(self)
    }
}

/// Render the timeline as playlist text.
pub fn encode_to_string(timeline: &Timeline) -> Result<String> {
    let output = render(timeline, &EncodeOptions::default())?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}

fn render(timeline: &Timeline, options: &EncodeOptions) -> Result<Vec<u8>> {
    let force_master =
        options.force_master || timeline.metadata.hls.master_playlist.unwrap_or(false);

    let mut output = Vec::new();
    match timeline.tracks.as_slice() {
        [] => return Err(Error::NoTracks),
        [track] if !force_master => {
            debug!(clips = track.children.len(), "encoding media playlist");
            write_media_playlist(&mut output, track, options)?;
        }
        tracks => {
            debug!(tracks = tracks.len(), "encoding master playlist");
            write_master_playlist(&mut output, timeline, options)?;
        }
    }
    Ok(output)
}

// -----------------------------------------------------------------------------------------------
// Media playlist
// -----------------------------------------------------------------------------------------------

/// Init segment in effect for a clip, compared to suppress repeated
/// `#EXT-X-MAP` tags.
#[derive(Debug, PartialEq)]
struct InitInfo<'a> {
    uri: &'a str,
    byte_range: Option<ByteRange>,
}

impl<'a> InitInfo<'a> {
    fn of(streaming: &'a StreamingMetadata) -> Option<InitInfo<'a>> {
        let uri = streaming.init_uri.as_deref();
        let byte_range = streaming.init_byterange.map(ByteRange::from);
        if uri.is_none() && byte_range.is_none() {
            return None;
        }
        Some(InitInfo {
            uri: uri.unwrap_or_default(),
            byte_range,
        })
    }

    fn attributes(&self) -> AttributeList {
        let mut attrs = AttributeList::new();
        attrs.insert_quoted("URI", self.uri);
        if let Some(range) = self.byte_range {
            attrs.insert_quoted("BYTERANGE", range.to_string());
        }
        attrs
    }
}

fn write_media_playlist<T: Write>(w: &mut T, track: &Track, options: &EncodeOptions) -> Result<()> {
    let hls = &track.metadata.hls;

    writeln!(w, "#EXTM3U")?;
    writeln!(w, "#EXT-X-VERSION:{}", hls.version.unwrap_or(options.default_version))?;
    if let Some(v) = hls.target_duration {
        writeln!(w, "#EXT-X-TARGETDURATION:{}", v)?;
    }
    if let Some(v) = hls.media_sequence {
        writeln!(w, "#EXT-X-MEDIA-SEQUENCE:{}", v)?;
    }
    if let Some(v) = &hls.playlist_type {
        writeln!(w, "#EXT-X-PLAYLIST-TYPE:{}", v)?;
    }

    let mut last_init: Option<InitInfo> = None;
    let mut last_key: Option<&str> = None;
    let mut discontinuities = 0;

    for clip in track.clips() {
        let clip_hls = &clip.metadata.hls;
        let streaming = &clip.metadata.streaming;

        let discontinuity = clip_hls.discontinuity_sequence.unwrap_or(0);
        while discontinuities < discontinuity {
            writeln!(w, "#EXT-X-DISCONTINUITY")?;
            discontinuities += 1;
        }

        let key = clip_hls.key.as_deref();
        if key != last_key {
            writeln!(w, "#EXT-X-KEY:{}", key.unwrap_or("METHOD=NONE"))?;
            last_key = key;
        }

        let init = InitInfo::of(streaming);
        if init.is_some() && init != last_init {
            if let Some(init) = &init {
                writeln!(w, "#EXT-X-MAP:{}", init.attributes())?;
            }
            last_init = init;
        }

        if let Some(pdt) = &clip_hls.program_date_time {
            writeln!(w, "#EXT-X-PROGRAM-DATE-TIME:{}", pdt)?;
        }

        write_extinf(w, clip)?;

        if let Some(count) = streaming.byte_count {
            let range = ByteRange::new(count, streaming.byte_offset.unwrap_or(0));
            writeln!(w, "#EXT-X-BYTERANGE:{}", range)?;
        }

        writeln!(w, "{}", clip.target_url().unwrap_or_default())?;
    }

    writeln!(w, "#EXT-X-ENDLIST")?;
    Ok(())
}

fn write_extinf<T: Write>(w: &mut T, clip: &Clip) -> Result<()> {
    let duration = clip.duration().to_seconds();
    let uri = clip.target_url().unwrap_or_default();
    if clip.name.is_empty() || clip.name == uri {
        writeln!(w, "#EXTINF:{:.6},", duration)?;
    } else {
        writeln!(w, "#EXTINF:{:.6},{}", duration, clip.name)?;
    }
    Ok(())
}

// -----------------------------------------------------------------------------------------------
// Master playlist
// -----------------------------------------------------------------------------------------------

fn write_master_playlist<T: Write>(
    w: &mut T,
    timeline: &Timeline,
    options: &EncodeOptions,
) -> Result<()> {
    writeln!(w, "#EXTM3U")?;
    writeln!(w, "#EXT-X-VERSION:{}", options.master_version)?;

    for (key, value) in &timeline.metadata.hls.extra {
        match value {
            Value::Null => writeln!(w, "#{}", key)?,
            Value::String(s) => writeln!(w, "#{}:{}", key, s)?,
            other => writeln!(w, "#{}:{}", key, other)?,
        }
    }

    let videos: Vec<&Track> = tracks_of_kind(timeline, TrackKind::Video).collect();
    let audios: Vec<&Track> = tracks_of_kind(timeline, TrackKind::Audio).collect();

    for audio in &audios {
        writeln!(w, "#EXT-X-MEDIA:{}", media_attributes(audio))?;
    }
    if !audios.is_empty() {
        writeln!(w)?;
    }

    let mut iframes_written = false;
    for video in &videos {
        if let Some(iframe_uri) = &video.metadata.hls.iframe_uri {
            let mut attrs = stream_inf_attributes(&video.metadata.streaming);
            for name in IFRAME_EXCLUDED.iter() {
                attrs.remove(name);
            }
            attrs.insert_quoted("URI", iframe_uri.as_str());
            writeln!(w, "#EXT-X-I-FRAME-STREAM-INF:{}", attrs)?;
            iframes_written = true;
        }
    }
    if iframes_written {
        writeln!(w)?;
    }

    for video in &videos {
        let mut attrs = stream_inf_attributes(&video.metadata.streaming);
        if let Some(audio) = linked_audio(video, &audios) {
            merge_audio(&mut attrs, &audio.metadata.streaming);
        }

        writeln!(w, "#EXT-X-STREAM-INF:{}", attrs)?;
        writeln!(w, "{}", track_uri(video, &video.metadata.hls))?;
        writeln!(w)?;
    }

    Ok(())
}

fn tracks_of_kind(timeline: &Timeline, kind: TrackKind) -> impl Iterator<Item = &Track> {
    timeline.tracks.iter().filter(move |track| track.kind == kind)
}

fn track_uri(track: &Track, hls: &HlsMetadata) -> String {
    hls.uri
        .clone()
        .unwrap_or_else(|| format!("{}.m3u8", track.name))
}

fn group_id(streaming: &StreamingMetadata) -> &str {
    streaming.group_id.as_deref().unwrap_or(DEFAULT_AUDIO_GROUP)
}

fn media_attributes(audio: &Track) -> AttributeList {
    let streaming = &audio.metadata.streaming;

    let mut attrs = AttributeList::new();
    attrs.insert_unquoted("TYPE", "AUDIO");
    attrs.insert_quoted("GROUP-ID", group_id(streaming));
    attrs.insert_quoted("NAME", audio.name.as_str());
    attrs.insert_quoted("URI", track_uri(audio, &audio.metadata.hls));
    if streaming.autoselect == Some(true) {
        attrs.insert_unquoted("AUTOSELECT", "YES");
    }
    if streaming.default == Some(true) {
        attrs.insert_unquoted("DEFAULT", "YES");
    }
    attrs
}

fn stream_inf_attributes(streaming: &StreamingMetadata) -> AttributeList {
    let mut attrs = AttributeList::new();
    if let Some(bandwidth) = streaming.bandwidth {
        attrs.insert_unquoted("BANDWIDTH", bandwidth);
    }
    if let Some(codec) = &streaming.codec {
        attrs.insert_quoted("CODECS", codec.as_str());
    }
    if let Some(frame_rate) = streaming.frame_rate {
        attrs.insert_unquoted("FRAME-RATE", frame_rate);
    }
    if let (Some(width), Some(height)) = (streaming.width, streaming.height) {
        attrs.insert_unquoted("RESOLUTION", format!("{}x{}", width, height));
    }
    attrs
}

/// Names of the audio tracks a video track is paired with. Read from the
/// `"HLS"` namespace, falling back to a top-level `linked_tracks` array.
fn linked_track_names(video: &Track) -> Vec<&str> {
    if !video.metadata.hls.linked_tracks.is_empty() {
        return video.metadata.hls.linked_tracks.iter().map(String::as_str).collect();
    }
    match video.metadata.other.get("linked_tracks") {
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// The first audio track, in track order, that the video links to.
fn linked_audio<'a>(video: &Track, audios: &[&'a Track]) -> Option<&'a Track> {
    let names = linked_track_names(video);
    audios
        .iter()
        .copied()
        .find(|audio| names.contains(&audio.name.as_str()))
}

/// Folds a linked audio rendition into a video's stream attributes.
fn merge_audio(attrs: &mut AttributeList, audio: &StreamingMetadata) {
    if let Some(audio_codec) = audio.codec.as_deref().filter(|c| !c.is_empty()) {
        if let Some(codecs) = attrs.get("CODECS") {
            let codecs = format!("{},{}", codecs, audio_codec);
            attrs.insert_quoted("CODECS", codecs);
        }
    }

    attrs.insert_quoted("AUDIO", group_id(audio));

    if let Some(audio_bandwidth) = audio.bandwidth.filter(|b| *b > 0) {
        if let Ok(bandwidth) = attrs.get_int("BANDWIDTH") {
            attrs.insert_unquoted("BANDWIDTH", bandwidth.saturating_add(audio_bandwidth));
        }
    }
}
