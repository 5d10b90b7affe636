use hls_timeline::*;
use std::fs;
use std::io::Read;
use std::path;

fn all_sample_m3u_playlists() -> Vec<path::PathBuf> {
    let path: std::path::PathBuf = ["sample-playlists"].iter().collect();
    fs::read_dir(path.to_str().unwrap())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|dir| dir.path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "m3u8"))
        .collect()
}

fn getm3u(path: &str) -> String {
    let mut buf = String::new();
    let mut file = fs::File::open(path).unwrap_or_else(|_| panic!("Can't find m3u8: {}", path));
    file.read_to_string(&mut buf).expect("Can't read file");
    buf
}

fn get_sample_playlist(name: &str) -> String {
    let path: std::path::PathBuf = ["sample-playlists", name].iter().collect();
    getm3u(path.to_str().unwrap())
}

fn is_master_sample(path: &path::Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.starts_with("master"))
}

// -----------------------------------------------------------------------------------------------
// Playlist

fn print_parse_playlist_test(playlist_name: &str) -> DecodedPlaylist {
    let input: String = get_sample_playlist(playlist_name);
    println!("Parsing playlist file: {:?}", playlist_name);
    let parsed = parse_playlist(input.as_bytes());

    match parsed {
        Ok(playlist) => {
            print!("{}", playlist);
            playlist
        }
        Err(e) => panic!("Parsing failed:\n {}", e),
    }
}

#[test]
fn playlist_media_simple() {
    let playlist = print_parse_playlist_test("media-simple.m3u8");
    assert_eq!(playlist.segments.len(), 3);
    for segment in &playlist.segments {
        assert_eq!(segment.duration, 9.9);
        assert_eq!(segment.title, None);
    }
    assert_eq!(playlist.attributes.playlist_type.as_deref(), Some("VOD"));
    assert_eq!(playlist.attributes.media_sequence, Some(0));
}

#[test]
fn playlist_media_encrypted() {
    let playlist = print_parse_playlist_test("media-encrypted.m3u8");
    let key = "METHOD=AES-128,URI=\"https://example.com/key.bin\",IV=0x12345678901234567890123456789012";
    assert_eq!(playlist.segments.len(), 2);
    for segment in &playlist.segments {
        assert_eq!(segment.key.as_deref(), Some(key));
    }

    let attrs = AttributeList::parse(key);
    assert_eq!(attrs.get("METHOD"), Some("AES-128"));
    assert_eq!(attrs.get("URI"), Some("https://example.com/key.bin"));
    assert_eq!(attrs.get("IV"), Some("0x12345678901234567890123456789012"));
}

#[test]
fn playlist_media_discontinuity() {
    let playlist = print_parse_playlist_test("media-discontinuity.m3u8");
    let indices: Vec<u64> = playlist
        .segments
        .iter()
        .map(|segment| segment.discontinuity_index)
        .collect();
    assert_eq!(indices, vec![0, 1, 2]);

    let dates: Vec<Option<&str>> = playlist
        .segments
        .iter()
        .map(SegmentDescriptor::program_date_time)
        .collect();
    assert_eq!(
        dates,
        vec![
            Some("2023-01-01T00:00:00.000Z"),
            None,
            Some("2023-01-01T00:05:00.000Z")
        ]
    );

    let first = playlist.segments[0].parsed_program_date_time().unwrap();
    let last = playlist.segments[2].parsed_program_date_time().unwrap();
    assert_eq!((last - first).num_seconds(), 300);
}

#[test]
fn playlist_media_byteranges() {
    let playlist = print_parse_playlist_test("media-byteranges.m3u8");
    let ranges: Vec<ByteRange> = playlist
        .segments
        .iter()
        .filter_map(|segment| segment.byte_range)
        .collect();
    assert_eq!(
        ranges,
        vec![
            ByteRange::new(534220, 652),
            ByteRange::new(535192, 534872),
            ByteRange::new(227848, 1070064),
        ]
    );

    for segment in &playlist.segments {
        let init = segment.init_segment.as_ref().unwrap();
        assert_eq!(init.uri, "init.mp4");
        assert_eq!(init.byte_range, Some(ByteRange::new(652, 0)));
    }
}

#[test]
fn playlist_media_titles() {
    let playlist = print_parse_playlist_test("media-titles.m3u8");
    let names: Vec<&str> = playlist.segments.iter().map(SegmentDescriptor::name).collect();
    assert_eq!(
        names,
        vec![
            "Opening Titles",
            "http://media.example.com/second.ts",
            "Closing Credits"
        ]
    );
}

#[test]
fn playlist_types() {
    for path_buf in all_sample_m3u_playlists() {
        let path = path_buf.to_str().unwrap();
        let input = getm3u(path);
        let result = parse_playlist(input.as_bytes());

        println!("{:?} = {:?}", path, result.as_ref().map(|p| p.segments.len()));

        if is_master_sample(&path_buf) {
            assert!(matches!(result, Err(Error::UnsupportedPlaylist(_))));
        } else {
            assert!(result.is_ok());
        }
    }
}

#[test]
fn playlist_invalid() {
    for input in &["This is not a valid playlist", ""] {
        assert!(matches!(
            parse_playlist(input.as_bytes()),
            Err(Error::InvalidPlaylist(_))
        ));
    }
}

#[test]
fn playlist_not_ending_in_newline() {
    let input = get_sample_playlist("media-simple.m3u8");
    let trimmed = input.trim_end().replace("\n", "\r\n");
    let playlist = parse_playlist(trimmed.as_bytes()).unwrap();
    assert_eq!(playlist.segments.len(), 3);
    assert_eq!(playlist.segments[2].uri, "segment3.ts");
}

// -----------------------------------------------------------------------------------------------
// Timeline

#[test]
fn timeline_from_media_playlist() {
    let input = get_sample_playlist("media-byteranges.m3u8");
    let timeline = parse_timeline(input.as_bytes()).unwrap();

    assert_eq!(timeline.name, "HLS Playlist");
    assert_eq!(timeline.tracks.len(), 1);

    let track = &timeline.tracks[0];
    assert_eq!(track.kind, TrackKind::Video);
    assert_eq!(track.metadata.hls.version, Some(7));
    assert_eq!(track.metadata.hls.target_duration, Some(10));

    let clips: Vec<&Clip> = track.clips().collect();
    assert_eq!(clips.len(), 3);
    assert_eq!(clips[0].name, "segment.m4s");
    assert_eq!(clips[0].target_url(), Some("segment.m4s"));
    assert_eq!(clips[2].duration().to_seconds(), 4.2);

    let streaming = &clips[1].metadata.streaming;
    assert_eq!(streaming.byte_count, Some(535192));
    assert_eq!(streaming.byte_offset, Some(534872));
    assert_eq!(streaming.init_uri.as_deref(), Some("init.mp4"));
    assert_eq!(
        streaming.init_byterange,
        Some(InitByteRange {
            byte_count: 652,
            byte_offset: 0
        })
    );
}

#[test]
fn timeline_serializes_namespaces() {
    let input = get_sample_playlist("media-encrypted.m3u8");
    let timeline = parse_timeline(input.as_bytes()).unwrap();

    let json = serde_json::to_value(&timeline).unwrap();
    assert_eq!(json["tracks"][0]["metadata"]["HLS"]["target_duration"], 10);
    assert_eq!(
        json["tracks"][0]["children"][0]["Clip"]["metadata"]["HLS"]["EXT-X-KEY"],
        "METHOD=AES-128,URI=\"https://example.com/key.bin\",IV=0x12345678901234567890123456789012"
    );

    let back: Timeline = serde_json::from_value(json).unwrap();
    assert_eq!(back, timeline);
}

// -----------------------------------------------------------------------------------------------
// Creating playlists

#[test]
fn write_media_playlist() {
    let input = get_sample_playlist("media-simple.m3u8");
    let timeline = parse_timeline(input.as_bytes()).unwrap();

    let mut written: Vec<u8> = Vec::new();
    timeline.write_to(&mut written).unwrap();

    assert_eq!(
        std::str::from_utf8(&written).unwrap(),
        "#EXTM3U\n\
         #EXT-X-VERSION:3\n\
         #EXT-X-TARGETDURATION:10\n\
         #EXT-X-MEDIA-SEQUENCE:0\n\
         #EXT-X-PLAYLIST-TYPE:VOD\n\
         #EXTINF:9.900000,\n\
         segment1.ts\n\
         #EXTINF:9.900000,\n\
         segment2.ts\n\
         #EXTINF:9.900000,\n\
         segment3.ts\n\
         #EXT-X-ENDLIST\n"
    );
}

#[test]
fn write_master_playlist() {
    let mut video = Track::new("v1", TrackKind::Video);
    video.metadata.streaming.bandwidth = Some(123456);
    video.metadata.streaming.codec = Some("avc1.64002a".into());
    video.metadata.streaming.frame_rate = Some(23.976);
    video.metadata.streaming.width = Some(1920);
    video.metadata.streaming.height = Some(1080);
    video.metadata.hls.uri = Some("v1/prog_index.m3u8".into());
    video.metadata.hls.iframe_uri = Some("v1/iframe_index.m3u8".into());
    video.metadata.hls.linked_tracks = vec!["English".into()];

    let mut audio = Track::new("English", TrackKind::Audio);
    audio.metadata.streaming.bandwidth = Some(12345);
    audio.metadata.streaming.codec = Some("mp4a.40.2".into());
    audio.metadata.streaming.group_id = Some("aud1".into());
    audio.metadata.hls.uri = Some("a1/prog_index.m3u8".into());

    let mut timeline = Timeline::new("master");
    timeline.append_track(video);
    timeline.append_track(audio);

    let output = encode_to_string(&timeline).unwrap();
    println!("{}", output);

    let iframe = output
        .lines()
        .find(|line| line.starts_with("#EXT-X-I-FRAME-STREAM-INF:"))
        .unwrap();
    assert!(!iframe.contains("FRAME-RATE"));
    assert!(iframe.contains("URI=\"v1/iframe_index.m3u8\""));

    assert!(output.contains(
        "#EXT-X-STREAM-INF:BANDWIDTH=135801,CODECS=\"avc1.64002a,mp4a.40.2\",FRAME-RATE=23.976,RESOLUTION=1920x1080,AUDIO=\"aud1\"\nv1/prog_index.m3u8\n"
    ));
    assert!(output.contains(
        "#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aud1\",NAME=\"English\",URI=\"a1/prog_index.m3u8\"\n"
    ));

    // Master output is not decodable.
    assert!(matches!(
        parse_playlist(output.as_bytes()),
        Err(Error::UnsupportedPlaylist(_))
    ));
}

#[test]
fn write_empty_timeline() {
    let timeline = Timeline::new("nothing");
    let mut written: Vec<u8> = Vec::new();
    assert!(matches!(timeline.write_to(&mut written), Err(Error::NoTracks)));
    assert!(written.is_empty());
}

//
// Roundtrip

#[test]
fn parsing_write_to_should_produce_the_same_structure() {
    for playlist in all_sample_m3u_playlists() {
        if is_master_sample(&playlist) {
            continue;
        }
        let input = getm3u(playlist.to_str().unwrap());

        let expected = parse_playlist(input.as_bytes()).unwrap();
        let mut written: Vec<u8> = Vec::new();
        Timeline::from(expected.clone()).write_to(&mut written).unwrap();

        let actual = parse_playlist(&written).unwrap();

        assert_eq!(
            expected,
            actual,
            "\n\nFailed parser input:\n\n{}\n\nOriginal input:\n\n{}",
            std::str::from_utf8(&written).unwrap(),
            input
        );
    }
}
