use super::lines::{is_uri, LineMetadata, PlaylistLine};

/// Master playlist lines with every variant/rendition URI marked for rewriting.
#[derive(Debug, Clone)]
pub struct ParsedMasterPlaylist {
    pub lines: Vec<PlaylistLine>,
}

impl ParsedMasterPlaylist {
    pub fn new(lines: Vec<String>) -> Self {
        let lines = lines
            .into_iter()
            .map(|raw| {
                let metadata = is_uri(&raw).then_some(LineMetadata::Variant);
                PlaylistLine { raw, metadata }
            })
            .collect();
        Self { lines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::lines::split_lines;

    const MASTER: &str = include_str!("../../tests/fixtures/master.m3u8");

    #[test]
    fn test_marks_variant_uris_only() {
        let parsed = ParsedMasterPlaylist::new(split_lines(MASTER));

        assert_eq!(parsed.lines.len(), 10);
        let variants: Vec<&str> = parsed
            .lines
            .iter()
            .filter(|l| l.metadata == Some(LineMetadata::Variant))
            .map(|l| l.raw.as_str())
            .collect();
        assert_eq!(variants, vec!["v5/prog_index.m3u8", "v9/prog_index.m3u8"]);

        // blank separators survive untouched
        assert_eq!(parsed.lines[3], PlaylistLine::plain(""));
        assert_eq!(parsed.lines[8], PlaylistLine::plain(""));
    }
}
