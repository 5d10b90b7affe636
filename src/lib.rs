//! A library to convert HLS playlists (HTTP Live Streaming) [link]
//! (https://tools.ietf.org/html/draft-pantos-http-live-streaming-19)
//! to and from an editorial timeline.
//!
//! # Examples
//!
//! Decoding a media playlist into a timeline.
//!
//! ```
//! use hls_timeline::{parse_timeline, TrackKind};
//! use std::io::Read;
//!
//! let mut file = std::fs::File::open("sample-playlists/media-simple.m3u8").unwrap();
//! let mut bytes: Vec<u8> = Vec::new();
//! file.read_to_end(&mut bytes).unwrap();
//!
//! match parse_timeline(&bytes) {
//!     Ok(timeline) => {
//!         assert_eq!(timeline.tracks.len(), 1);
//!         assert_eq!(timeline.tracks[0].kind, TrackKind::Video);
//!     }
//!     Err(e) => panic!("Parsing error: \n{}", e),
//! }
//! ```
//!
//! Decoding the segment list directly
//!
//! ```
//! use hls_timeline::parse_playlist;
//!
//! let input = b"#EXTM3U\n#EXT-X-KEY:METHOD=AES-128,URI=\"key.bin\"\n#EXTINF:4.0,\na.ts\n#EXTINF:4.0,\nb.ts\n";
//! let playlist = parse_playlist(input).unwrap();
//!
//! for segment in &playlist.segments {
//!     assert_eq!(segment.key.as_deref(), Some("METHOD=AES-128,URI=\"key.bin\""));
//! }
//! ```
//!
//! Creating a master playlist and writing it to a vec
//!
//! ```
//! use hls_timeline::*;
//!
//! let mut video = Track::new("video", TrackKind::Video);
//! video.metadata.streaming.bandwidth = Some(123456);
//! video.metadata.hls.linked_tracks = vec!["english".into()];
//!
//! let mut audio = Track::new("english", TrackKind::Audio);
//! audio.metadata.streaming.bandwidth = Some(12345);
//!
//! let mut timeline = Timeline::new("master");
//! timeline.append_track(video);
//! timeline.append_track(audio);
//!
//! let mut v: Vec<u8> = Vec::new();
//! timeline.write_to(&mut v).unwrap();
//!
//! let output = String::from_utf8(v).unwrap();
//! assert!(output.contains("#EXT-X-STREAM-INF:BANDWIDTH=135801,AUDIO=\"audio1\"\nvideo.m3u8\n"));
//! ```

pub mod attributes;
pub mod encoder;
pub mod error;
pub mod metadata;
pub mod playlist;
pub mod timeline;

#[cfg(feature = "parser")]
pub mod decoder;
#[cfg(feature = "parser")]
pub mod parser;

pub use attributes::{AttributeList, AttributeValue};
pub use encoder::{encode_to_string, EncodeOptions, Encoder};
pub use error::{AttributeError, Error, Result};
pub use metadata::{HlsMetadata, InitByteRange, Metadata, StreamingMetadata};
pub use playlist::*;
pub use timeline::*;

#[cfg(feature = "parser")]
pub use decoder::{parse_playlist, parse_timeline, DecodeOptions, Decoder};
