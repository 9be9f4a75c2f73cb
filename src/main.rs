use clap::Parser;
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod clock;
mod config;
mod playlist;

use api::AppState;
use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("hls_mock_origin={}", cli.log_level).parse()?),
        )
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli)?;
    let server_config = config.server_config()?;

    let mode = if server_config.window_size.is_some() {
        "live"
    } else {
        "event"
    };
    tracing::info!(
        mode,
        window_size = ?server_config.window_size,
        initial_duration_secs = server_config.initial_duration.as_secs_f64(),
        loop_playback = server_config.loop_playback,
        proxy = %server_config.proxy_base_url,
        "loaded config"
    );

    let state = AppState::new(server_config);
    api::start_server(state, &config.http.host, config.http.port).await?;

    tracing::info!("stopped");
    Ok(())
}
