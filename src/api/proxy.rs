use std::path::Path;

use axum::body::Bytes;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("'url' query param missing")]
    MissingTarget,
    #[error("invalid target url: {0}")]
    InvalidTarget(String),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            ProxyError::MissingTarget | ProxyError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        (status, self.to_string()).into_response()
    }
}

/// What the origin answered, kept verbatim so it can be relayed.
pub struct Upstream {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

pub async fn fetch(client: &reqwest::Client, url: &Url) -> Result<Upstream, ProxyError> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
    let body = response.bytes().await?;

    Ok(Upstream {
        status,
        content_type,
        body,
    })
}

pub fn parse_target(target: Option<String>) -> Result<Url, ProxyError> {
    let target = target
        .filter(|t| !t.trim().is_empty())
        .ok_or(ProxyError::MissingTarget)?;
    Url::parse(&target).map_err(|_| ProxyError::InvalidTarget(target))
}

/// Playlists are recognised by a `.m3u8` extension on the URL path.
pub fn is_playlist_url(url: &Url) -> bool {
    Path::new(url.path())
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("m3u8"))
}
