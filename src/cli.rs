use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Default, Parser)]
#[command(name = "hls-mock-origin")]
#[command(author, version, about = "Serves on-demand HLS playlists as if they were live")]
pub struct Cli {
    /// Host to bind to and to advertise in proxied URLs
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seconds of content visible in the live window
    #[arg(long)]
    pub window_size: Option<f64>,

    /// Seconds of content already "aired" when the stream starts
    #[arg(long)]
    pub initial_duration: Option<f64>,

    /// Event playlist: keep every aired segment instead of sliding a window
    #[arg(long)]
    pub event: bool,

    /// Repeat the playlist forever, separated by discontinuities
    #[arg(long = "loop")]
    pub loop_playback: bool,

    /// Route segment requests through the proxy as well
    #[arg(long)]
    pub proxy_segments: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
