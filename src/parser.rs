//! nom grammar for playlist lines and attribute lists.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_till, take_while, take_while1};
use nom::character::complete::{char, digit1, hex_digit1, one_of};
use nom::combinator::{eof, map, opt, peek, recognize, rest};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::IResult;

use crate::attributes::{AttributeList, AttributeValue};
use crate::playlist::PlaylistLine;

// -----------------------------------------------------------------------------------------------
// Lines
// -----------------------------------------------------------------------------------------------

/// Classifies one line of a playlist. Blank lines yield `None`.
///
/// # Examples
///
/// ```
/// use hls_timeline::parser::classify_line;
/// use hls_timeline::PlaylistLine;
///
/// assert_eq!(
///     classify_line("#EXTINF:9.9,\r"),
///     Some(PlaylistLine::Tag { name: "EXTINF".into(), value: "9.9,".into() })
/// );
/// assert_eq!(classify_line("segment1.ts"), Some(PlaylistLine::Uri("segment1.ts".into())));
/// assert_eq!(classify_line("   "), None);
/// ```
pub fn classify_line(line: &str) -> Option<PlaylistLine> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match alt((ext_tag, comment_tag))(line) {
        Ok((_, entry)) => Some(entry),
        Err(_) => Some(PlaylistLine::Uri(line.to_string())),
    }
}

fn ext_tag(i: &str) -> IResult<&str, PlaylistLine> {
    map(
        tuple((
            char('#'),
            recognize(pair(tag("EXT"), take_till(|c: char| c == ':'))),
            opt(preceded(char(':'), rest)),
        )),
        |(_, name, value): (char, &str, Option<&str>)| PlaylistLine::Tag {
            name: name.to_string(),
            value: value.unwrap_or_default().to_string(),
        },
    )(i)
}

fn comment_tag(i: &str) -> IResult<&str, PlaylistLine> {
    map(preceded(char('#'), rest), |text: &str| {
        PlaylistLine::Comment(text.to_string())
    })(i)
}

/// Splits an `#EXTINF` value at its first comma into the duration text and
/// the optional title.
pub fn duration_title(value: &str) -> (&str, Option<&str>) {
    let parsed: IResult<&str, (&str, Option<&str>)> =
        pair(take_till(|c: char| c == ','), opt(preceded(char(','), rest)))(value);
    match parsed {
        Ok((_, (duration, title))) => (duration.trim(), title.map(str::trim)),
        Err(_) => (value.trim(), None),
    }
}

// -----------------------------------------------------------------------------------------------
// Attribute lists
// -----------------------------------------------------------------------------------------------

/// Parses a raw attribute list.
///
/// Values are matched in a fixed order of shapes: quoted-string, `WxH`
/// resolution, `0x` hexadecimal, decimal number, enumerated token. A shape
/// only matches when it runs up to a comma, whitespace or the end of input.
/// An attribute that matches no shape is dropped and parsing resumes after
/// the next comma.
///
/// # Examples
///
/// ```
/// use hls_timeline::parser::attribute_list;
///
/// let attrs = attribute_list(r#"URI="init.mp4",BYTERANGE="652@0",BANDWIDTH=1280000,RESOLUTION=1920x1080"#);
/// assert_eq!(attrs.get("URI"), Some("init.mp4"));
/// assert_eq!(attrs.get("RESOLUTION"), Some("1920x1080"));
/// ```
pub fn attribute_list(input: &str) -> AttributeList {
    let mut attrs = AttributeList::new();
    let mut remaining = input;

    loop {
        remaining = remaining.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if remaining.is_empty() {
            break;
        }

        match attribute(remaining) {
            Ok((rest, (name, value))) => {
                attrs.insert(name, value);
                remaining = rest;
            }
            Err(_) => match remaining.find(',') {
                Some(idx) => remaining = &remaining[idx + 1..],
                None => break,
            },
        }
    }

    attrs
}

fn attribute(i: &str) -> IResult<&str, (&str, AttributeValue)> {
    pair(terminated(attribute_name, char('=')), attribute_value)(i)
}

fn attribute_name(i: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_')(i)
}

fn attribute_value(i: &str) -> IResult<&str, AttributeValue> {
    alt((
        map(value_end(quoted), |s: &str| AttributeValue::Quoted(s.to_string())),
        map(
            alt((
                value_end(resolution),
                value_end(hexadecimal),
                value_end(decimal),
                value_end(enumerated),
            )),
            |s: &str| AttributeValue::Unquoted(s.to_string()),
        ),
    ))(i)
}

/// Accepts `inner` only when it is followed by a value separator.
fn value_end<'a, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str>
where
    F: FnMut(&'a str) -> IResult<&'a str, &'a str>,
{
    terminated(inner, peek(alt((eof, recognize(one_of(", \t"))))))
}

fn quoted(i: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c: char| c != '"'), char('"'))(i)
}

fn resolution(i: &str) -> IResult<&str, &str> {
    recognize(tuple((digit1, char('x'), digit1)))(i)
}

fn hexadecimal(i: &str) -> IResult<&str, &str> {
    recognize(pair(tag("0x"), hex_digit1))(i)
}

fn decimal(i: &str) -> IResult<&str, &str> {
    recognize(tuple((opt(char('-')), digit1, opt(pair(char('.'), digit1)))))(i)
}

fn enumerated(i: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')(i)
}
