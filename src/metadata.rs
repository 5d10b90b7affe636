//! Typed metadata namespaces.
//!
//! Timeline objects carry two namespaces the codec understands: the
//! HLS-specific one (raw tag values passed through untouched) under the key
//! `"HLS"`, and the format-agnostic `"streaming"` one (bandwidth, codecs,
//! byte ranges, init segments). Keys this crate does not know about are kept
//! in the `extra` / `other` maps so that nothing is lost on a round trip.
//!
//! The serde representation of [`Metadata`] is the dictionary layout other
//! timeline tools exchange.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "HLS", default, skip_serializing_if = "HlsMetadata::is_empty")]
    pub hls: HlsMetadata,
    #[serde(default, skip_serializing_if = "StreamingMetadata::is_empty")]
    pub streaming: StreamingMetadata,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.hls.is_empty() && self.streaming.is_empty() && self.other.is_empty()
    }
}

/// The `"HLS"` namespace.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HlsMetadata {
    /// `#EXT-X-VERSION`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// `#EXT-X-TARGETDURATION`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_duration: Option<u64>,
    /// `#EXT-X-MEDIA-SEQUENCE`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_sequence: Option<u64>,
    /// `#EXT-X-PLAYLIST-TYPE`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_type: Option<String>,
    /// URI of a track's media playlist inside a master playlist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// URI of a video track's I-frame playlist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iframe_uri: Option<String>,
    /// Timeline-level switch forcing master output for a single track.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_playlist: Option<bool>,
    /// Raw `#EXT-X-KEY` attribute list in effect for a segment.
    #[serde(rename = "EXT-X-KEY", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Raw `#EXT-X-PROGRAM-DATE-TIME` value of a segment.
    #[serde(rename = "EXT-X-PROGRAM-DATE-TIME", skip_serializing_if = "Option::is_none")]
    pub program_date_time: Option<String>,
    /// Number of `#EXT-X-DISCONTINUITY` tags seen before a segment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discontinuity_sequence: Option<u64>,
    /// Names of audio tracks a video track should be paired with.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub linked_tracks: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl HlsMetadata {
    pub fn is_empty(&self) -> bool {
        *self == HlsMetadata::default()
    }
}

/// The `"streaming"` namespace.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoselect: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_byterange: Option<InitByteRange>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl StreamingMetadata {
    pub fn is_empty(&self) -> bool {
        *self == StreamingMetadata::default()
    }
}

/// Byte range of an init segment, nested under `init_byterange`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitByteRange {
    pub byte_count: u64,
    #[serde(default)]
    pub byte_offset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_namespaces() {
        let metadata: Metadata = serde_json::from_value(json!({
            "HLS": {
                "uri": "v1/prog_index.m3u8",
                "iframe_uri": "v1/iframe_index.m3u8",
                "EXT-X-KEY": "METHOD=AES-128,URI=\"key.bin\"",
                "EXT-X-INDEPENDENT-SEGMENTS": null,
                "linked_tracks": ["a1"]
            },
            "streaming": {
                "bandwidth": 123456,
                "frame_rate": 23.976,
                "init_byterange": { "byte_count": 652, "byte_offset": 0 }
            },
            "OTIO": { "source": "editor" }
        }))
        .unwrap();

        assert_eq!(metadata.hls.uri.as_deref(), Some("v1/prog_index.m3u8"));
        assert_eq!(
            metadata.hls.key.as_deref(),
            Some("METHOD=AES-128,URI=\"key.bin\"")
        );
        assert_eq!(
            metadata.hls.extra.get("EXT-X-INDEPENDENT-SEGMENTS"),
            Some(&Value::Null)
        );
        assert_eq!(metadata.streaming.bandwidth, Some(123456));
        assert_eq!(metadata.streaming.frame_rate, Some(23.976));
        assert_eq!(
            metadata.streaming.init_byterange,
            Some(InitByteRange {
                byte_count: 652,
                byte_offset: 0
            })
        );
        assert_eq!(metadata.hls.linked_tracks, vec!["a1".to_string()]);
        assert_eq!(metadata.other.get("OTIO"), Some(&json!({ "source": "editor" })));
    }

    #[test]
    fn empty_namespaces_are_not_serialized() {
        let mut metadata = Metadata::default();
        assert!(metadata.is_empty());
        assert_eq!(serde_json::to_value(&metadata).unwrap(), json!({}));

        metadata.streaming.byte_count = Some(10);
        assert_eq!(
            serde_json::to_value(&metadata).unwrap(),
            json!({ "streaming": { "byte_count": 10 } })
        );
    }
}
