pub const EXTM3U: &str = "#EXTM3U";
pub const EXTINF: &str = "#EXTINF:";
pub const ENDLIST: &str = "#EXT-X-ENDLIST";
pub const DISCONTINUITY: &str = "#EXT-X-DISCONTINUITY";
pub const STREAM_INF: &str = "#EXT-X-STREAM-INF:";
pub const PLAYLIST_TYPE: &str = "#EXT-X-PLAYLIST-TYPE:";
pub const MEDIA_SEQUENCE: &str = "#EXT-X-MEDIA-SEQUENCE:";

#[derive(Debug, Clone, PartialEq)]
pub enum LineMetadata {
    /// Segment URI in a media playlist.
    Segment {
        /// Playback offset in seconds at which the segment begins.
        time: f64,
        /// Position of the governing `#EXTINF` in the emitted line sequence.
        start_index: usize,
        /// Last segment before `#EXT-X-ENDLIST` (never set when looping).
        end: bool,
    },
    /// Variant or rendition URI in a master playlist.
    Variant,
    Endlist,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistLine {
    pub raw: String,
    pub metadata: Option<LineMetadata>,
}

impl PlaylistLine {
    pub fn plain(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            metadata: None,
        }
    }

    pub fn is_tag(&self) -> bool {
        is_tag(&self.raw)
    }
}

pub fn is_tag(line: &str) -> bool {
    line.starts_with('#')
}

/// A URI line is anything that is neither blank nor a tag/comment.
pub fn is_uri(line: &str) -> bool {
    !line.is_empty() && !is_tag(line)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistKind {
    Media,
    Master,
    Unrecognized,
}

/// Trims the body, splits it on `\n` or `\r\n` and trims every line.
/// A leading byte order mark counts as whitespace.
pub fn split_lines(body: &str) -> Vec<String> {
    body.trim_start_matches('\u{FEFF}')
        .trim()
        .lines().map(|l| l.trim().to_string()).collect()
}

pub fn kind_of(lines: &[String]) -> PlaylistKind {
    if lines.first().map(String::as_str) != Some(EXTM3U) {
        return PlaylistKind::Unrecognized;
    }
    if lines.iter().any(|l| l.starts_with(STREAM_INF)) {
        PlaylistKind::Master
    } else {
        PlaylistKind::Media
    }
}

/// Duration of an `#EXTINF:<duration>,<title>` line, if it parses.
///
/// Only the leading number counts, so attribute-style lines such as
/// `#EXTINF:10 tvg-id="x",Title` still yield `10`.
pub fn extinf_duration(line: &str) -> Option<f64> {
    let rest = line.strip_prefix(EXTINF)?;
    let text = rest.split(',').next().unwrap_or(rest).trim_start();
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(text.len());
    (1..=end)
        .rev()
        .find_map(|len| text[..len].parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}
