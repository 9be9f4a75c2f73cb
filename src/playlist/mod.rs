mod lines;
mod master;
mod media;
mod rewrite;
mod window;

use std::time::Instant;

pub use lines::{LineMetadata, PlaylistKind, PlaylistLine};
pub use master::ParsedMasterPlaylist;
pub use media::ParsedMediaPlaylist;
pub use rewrite::{UrlRewriter, PROXY_PATH};
pub use window::build_window;

use crate::clock::StreamClock;
use crate::config::ServerConfig;

const LINE_TERMINATOR: &str = "\r\n";

#[derive(Debug)]
pub enum Playlist {
    Media(ParsedMediaPlaylist),
    Master(ParsedMasterPlaylist),
    Unrecognized,
}

pub fn classify(body: &str, loop_playback: bool) -> Playlist {
    let lines = lines::split_lines(body);
    match lines::kind_of(&lines) {
        PlaylistKind::Media => Playlist::Media(ParsedMediaPlaylist::new(lines, loop_playback)),
        PlaylistKind::Master => Playlist::Master(ParsedMasterPlaylist::new(lines)),
        PlaylistKind::Unrecognized => Playlist::Unrecognized,
    }
}

#[derive(Debug, PartialEq)]
pub enum Rendered {
    Media(String),
    Master(String),
    /// Not a playlist we understand; the caller serves the original body.
    PassThrough,
}

pub fn render_manifest(
    body: &str,
    request_url: &str,
    config: &ServerConfig,
    clock: &StreamClock,
) -> Rendered {
    render_manifest_at(body, request_url, config, clock, Instant::now())
}

pub fn render_manifest_at(
    body: &str,
    request_url: &str,
    config: &ServerConfig,
    clock: &StreamClock,
    now: Instant,
) -> Rendered {
    let rewriter = UrlRewriter::new(request_url, &config.proxy_base_url);

    match classify(body, config.loop_playback) {
        Playlist::Media(playlist) => {
            let current_time = clock.elapsed_at(now, config.initial_duration);
            let window = build_window(&playlist, current_time, config.window_size);
            tracing::debug!(
                url = %request_url,
                current_time,
                looping = playlist.is_looping(),
                segments = window.segment_count(),
                media_sequence = ?window.media_sequence,
                reached_end = window.reached_end,
                "built media playlist window"
            );
            Rendered::Media(serialize(&window.into_lines(), &rewriter, config.proxy_segments))
        }
        Playlist::Master(playlist) => Rendered::Master(serialize(&playlist.lines, &rewriter, true)),
        Playlist::Unrecognized => Rendered::PassThrough,
    }
}

/// `proxy_uris` is always set for master variants and set for media segments only with `proxy_segments`.
fn serialize(lines: &[PlaylistLine], rewriter: &UrlRewriter<'_>, proxy_uris: bool) -> String {
    let mut out = String::new();
    let mut push = |line: &str| {
        out.push_str(line);
        out.push_str(LINE_TERMINATOR);
    };

    for line in lines {
        match line.metadata {
            Some(LineMetadata::Segment { .. }) | Some(LineMetadata::Variant) => {
                for rewritten in rewriter.rewrite_uri(&line.raw, proxy_uris) {
                    push(&rewritten);
                }
            }
            _ if line.is_tag() => push(&rewriter.rewrite_tag(&line.raw)),
            _ => push(&line.raw),
        }
    }

    out
}
