use super::lines::{LineMetadata, PlaylistLine, ENDLIST, MEDIA_SEQUENCE, PLAYLIST_TYPE};
use super::media::ParsedMediaPlaylist;

/// The part of a media playlist that has "aired" by a given stream time.
#[derive(Debug)]
pub struct Window {
    pub header: Vec<PlaylistLine>,
    pub body: Vec<PlaylistLine>,
    /// `Some` in live (sliding window) mode, `None` in event mode.
    pub media_sequence: Option<u64>,
    /// The source ran out of segments before `current_time`. Never set when looping.
    pub reached_end: bool,
}

/// Reads `playlist` up to `current_time` and, when `window_size` is set,
/// drops the segments that have scrolled out of the live window.
///
/// In live mode lines are dropped while reading, so the working buffer holds
/// the header plus about `window_size` seconds of lines however long the
/// stream has been running.
pub fn build_window(
    playlist: &ParsedMediaPlaylist,
    current_time: f64,
    window_size: Option<f64>,
) -> Window {
    let start_time = window_size.map(|size| (current_time - size).max(0.0));
    let mut read = Vec::new();
    let mut header_end = None;
    // emitted lines already drained from between the header and the body
    let mut dropped = 0;
    let mut scrolled: u64 = 0;
    let mut aired_end = 0;
    let mut reader = playlist.reader();

    // Reading stops at the first segment starting after `current_time`; that
    // segment's leading tags are not part of the body.
    let reached_end = loop {
        let Some(line) = reader.next() else {
            break true;
        };
        let Some(LineMetadata::Segment {
            time, start_index, ..
        }) = line.metadata
        else {
            read.push(line);
            continue;
        };

        // keep #EXTM3U in the header even if the first segment has no #EXTINF
        let header_len = *header_end.get_or_insert(start_index.max(1));
        if time > current_time {
            break false;
        }
        read.push(line);

        if start_time.is_some_and(|start| time <= start) {
            // the window starts at this segment's #EXTINF
            let cut = start_index.saturating_sub(header_len + dropped);
            read.drain(header_len..header_len + cut);
            dropped += cut;
            scrolled += 1;
        }
        aired_end = read.len();
    };

    let header_end = header_end.unwrap_or(1).min(read.len());
    let body_end = if reached_end {
        read.len()
    } else {
        aired_end.max(header_end)
    };
    read.truncate(body_end);
    let body = read.split_off(header_end);

    Window {
        header: read,
        body,
        media_sequence: window_size.map(|_| scrolled.saturating_sub(1)),
        reached_end,
    }
}

impl Window {
    /// Rewrites the sequence/type tags for the window's mode and returns
    /// header and body as one ordered list of lines.
    pub fn into_lines(self) -> Vec<PlaylistLine> {
        let mut lines: Vec<PlaylistLine> = self
            .header
            .into_iter()
            .filter(|l| !l.raw.starts_with(PLAYLIST_TYPE) && !l.raw.starts_with(MEDIA_SEQUENCE))
            .collect();
        let at = lines.len().min(1);

        match self.media_sequence {
            Some(sequence) => {
                lines.insert(at, PlaylistLine::plain(format!("{MEDIA_SEQUENCE}{sequence}")));
            }
            None => {
                lines.insert(at, PlaylistLine::plain(format!("{PLAYLIST_TYPE}EVENT")));
            }
        }

        lines.extend(self.body.into_iter().filter(|l| l.raw != ENDLIST));

        if self.media_sequence.is_none() && self.reached_end {
            lines.push(PlaylistLine {
                raw: ENDLIST.to_string(),
                metadata: Some(LineMetadata::Endlist),
            });
        }

        lines
    }

    pub fn segment_count(&self) -> usize {
        self.body
            .iter()
            .filter(|l| matches!(l.metadata, Some(LineMetadata::Segment { .. })))
            .count()
    }
}
