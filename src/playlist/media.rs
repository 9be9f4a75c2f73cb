use super::lines::{
    extinf_duration, is_uri, LineMetadata, PlaylistLine, DISCONTINUITY, ENDLIST, EXTINF,
};

/// A media playlist ready to be read as a timeline.
///
/// Parsing only validates and stores the lines; timing is computed by each
/// [`LineReader`] as it walks them, so the same playlist can be re-read from
/// the start any number of times.
#[derive(Debug, Clone)]
pub struct ParsedMediaPlaylist {
    lines: Vec<String>,
    looping: bool,
    urls_start: usize,
}

impl ParsedMediaPlaylist {
    /// Looping is only honoured when at least one segment exists and the
    /// segments add up to a positive duration, otherwise a looping reader
    /// would never advance the clock.
    pub fn new(lines: Vec<String>, loop_playback: bool) -> Self {
        let urls_start = lines
            .iter()
            .position(|l| l.starts_with(EXTINF))
            .or_else(|| lines.iter().position(|l| is_uri(l)))
            .unwrap_or(0);
        let looping = loop_playback && total_duration(&lines) > 0.0;

        Self {
            lines,
            looping,
            urls_start,
        }
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn reader(&self) -> LineReader<'_> {
        LineReader {
            playlist: self,
            next: 0,
            emitted: 0,
            time: 0.0,
            segment_duration: 0.0,
            start_index: 0,
        }
    }
}

/// Sum of the durations a single pass over `lines` assigns to its segments.
fn total_duration(lines: &[String]) -> f64 {
    let mut total = 0.0;
    let mut pending = 0.0;
    let mut has_segment = false;
    for line in lines {
        if let Some(d) = extinf_duration(line) {
            pending = d;
        } else if is_uri(line) {
            has_segment = true;
            total += pending;
            pending = 0.0;
        }
    }
    if has_segment {
        total
    } else {
        0.0
    }
}

/// Single-pass cursor over a [`ParsedMediaPlaylist`].
///
/// In loop mode the iterator never returns `None`: after the last line it
/// emits a synthetic `#EXT-X-DISCONTINUITY` and continues from the first
/// `#EXTINF`, with segment times still increasing.
pub struct LineReader<'a> {
    playlist: &'a ParsedMediaPlaylist,
    next: usize,
    emitted: usize,
    time: f64,
    segment_duration: f64,
    start_index: usize,
}

impl LineReader<'_> {
    fn emit(&mut self, line: PlaylistLine) -> PlaylistLine {
        self.emitted += 1;
        line
    }
}

impl Iterator for LineReader<'_> {
    type Item = PlaylistLine;

    fn next(&mut self) -> Option<PlaylistLine> {
        let playlist = self.playlist;
        let lines = &playlist.lines;
        let looping = playlist.looping;

        loop {
            if self.next >= lines.len() {
                if !looping {
                    return None;
                }
                self.next = playlist.urls_start;
                return Some(self.emit(PlaylistLine::plain(DISCONTINUITY)));
            }

            let i = self.next;
            self.next += 1;
            let raw = &lines[i];

            if raw == ENDLIST {
                if looping {
                    continue;
                }
                let line = PlaylistLine {
                    raw: raw.clone(),
                    metadata: Some(LineMetadata::Endlist),
                };
                return Some(self.emit(line));
            }

            if raw.starts_with(EXTINF) {
                if let Some(duration) = extinf_duration(raw) {
                    self.segment_duration = duration;
                }
                self.start_index = self.emitted;
                return Some(self.emit(PlaylistLine::plain(raw.clone())));
            }

            if is_uri(raw) {
                let end = !looping && lines.get(i + 1).is_some_and(|l| l == ENDLIST);
                let line = PlaylistLine {
                    raw: raw.clone(),
                    metadata: Some(LineMetadata::Segment {
                        time: self.time,
                        start_index: self.start_index,
                        end,
                    }),
                };
                self.time += self.segment_duration;
                self.segment_duration = 0.0;
                return Some(self.emit(line));
            }

            return Some(self.emit(PlaylistLine::plain(raw.clone())));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::lines::split_lines;

    const PLAYLIST: &str = include_str!("../../tests/fixtures/playlist.m3u8");

    fn segment(raw: &str, time: f64, start_index: usize, end: bool) -> PlaylistLine {
        PlaylistLine {
            raw: raw.to_string(),
            metadata: Some(LineMetadata::Segment {
                time,
                start_index,
                end,
            }),
        }
    }

    fn segment_times(lines: &[PlaylistLine]) -> Vec<f64> {
        lines
            .iter()
            .filter_map(|l| match l.metadata {
                Some(LineMetadata::Segment { time, .. }) => Some(time),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_parses_fixture_timeline() {
        let playlist = ParsedMediaPlaylist::new(split_lines(PLAYLIST), false);
        let lines: Vec<_> = playlist.reader().collect();

        assert_eq!(
            lines,
            vec![
                PlaylistLine::plain("#EXTM3U"),
                PlaylistLine::plain("#EXT-X-TARGETDURATION:6"),
                PlaylistLine::plain("#EXT-X-VERSION:3"),
                PlaylistLine::plain("#EXT-X-MEDIA-SEQUENCE:0"),
                PlaylistLine::plain("#EXT-X-PLAYLIST-TYPE:VOD"),
                PlaylistLine::plain("#EXT-X-INDEPENDENT-SEGMENTS"),
                PlaylistLine::plain("#EXTINF:6.00000,"),
                PlaylistLine::plain("#EXT-X-BITRATE:377"),
                segment("fileSequence0.ts", 0.0, 6, false),
                PlaylistLine::plain("#EXTINF:6.00000,"),
                PlaylistLine::plain("#EXT-X-BITRATE:385"),
                segment("fileSequence1.ts", 6.0, 9, false),
                PlaylistLine::plain("#EXTINF:6.00000,"),
                PlaylistLine::plain("#EXT-X-BITRATE:388"),
                segment("fileSequence2.ts", 12.0, 12, false),
                PlaylistLine::plain("#EXTINF:6.00000,"),
                PlaylistLine::plain("#EXT-X-BITRATE:378"),
                segment("fileSequence3.ts", 18.0, 15, true),
                PlaylistLine {
                    raw: "#EXT-X-ENDLIST".to_string(),
                    metadata: Some(LineMetadata::Endlist),
                },
            ]
        );
    }

    #[test]
    fn test_readers_are_independent() {
        let playlist = ParsedMediaPlaylist::new(split_lines(PLAYLIST), false);
        let mut first = playlist.reader();
        first.by_ref().take(10).for_each(drop);

        let second: Vec<_> = playlist.reader().collect();
        assert_eq!(second.len(), 19);
        assert_eq!(second[0].raw, "#EXTM3U");
        assert_eq!(first.next().map(|l| l.raw), Some("#EXT-X-BITRATE:385".to_string()));
    }

    #[test]
    fn test_times_are_running_sum_of_durations() {
        let body = "#EXTM3U\n#EXTINF:2.5,\na.ts\n#EXTINF:4,\nb.ts\n#EXTINF:1.25,\nc.ts\n";
        let playlist = ParsedMediaPlaylist::new(split_lines(body), false);
        let lines: Vec<_> = playlist.reader().collect();

        assert_eq!(segment_times(&lines), vec![0.0, 2.5, 6.5]);
    }

    #[test]
    fn test_malformed_duration_keeps_previous_value() {
        let body = "#EXTM3U\n#EXTINF:3,\n#EXTINF:bogus,\na.ts\n#EXTINF:3,\nb.ts\nc.ts";
        let playlist = ParsedMediaPlaylist::new(split_lines(body), false);
        let lines: Vec<_> = playlist.reader().collect();

        // c.ts has no #EXTINF of its own, the duration was consumed by b.ts
        assert_eq!(segment_times(&lines), vec![0.0, 3.0, 6.0]);
    }

    #[test]
    fn test_loop_wraps_with_discontinuity() {
        let playlist = ParsedMediaPlaylist::new(split_lines(PLAYLIST), true);
        assert!(playlist.is_looping());

        // one lap is 18 lines once the endlist is skipped
        let lines: Vec<_> = playlist.reader().take(18 + 3 * 13).collect();

        let discontinuities: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.raw == DISCONTINUITY)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(discontinuities, vec![18, 31, 44]);
        assert!(lines.iter().all(|l| l.raw != ENDLIST));
        assert_eq!(lines[19].raw, "#EXTINF:6.00000,");
        assert_eq!(lines[21], segment("fileSequence0.ts", 24.0, 19, false));

        let times = segment_times(&lines);
        assert_eq!(times.len(), 4 + 3 * 4);
        assert!(times.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(times.last().copied(), Some(15.0 * 6.0));
    }

    #[test]
    fn test_loop_start_index_tracks_emitted_position() {
        let playlist = ParsedMediaPlaylist::new(split_lines(PLAYLIST), true);
        let lines: Vec<_> = playlist.reader().take(200).collect();

        for line in &lines {
            if let Some(LineMetadata::Segment { start_index, .. }) = line.metadata {
                assert!(lines[start_index].raw.starts_with(EXTINF));
            }
        }
    }

    #[test]
    fn test_loop_without_duration_falls_back_to_single_pass() {
        let body = "#EXTM3U\n#EXT-X-TARGETDURATION:6\n#EXT-X-ENDLIST";
        let playlist = ParsedMediaPlaylist::new(split_lines(body), true);
        assert!(!playlist.is_looping());
        assert_eq!(playlist.reader().count(), 3);

        let zero = "#EXTM3U\n#EXTINF:0,\na.ts";
        let playlist = ParsedMediaPlaylist::new(split_lines(zero), true);
        assert!(!playlist.is_looping());
        assert_eq!(playlist.reader().count(), 3);
    }
}
