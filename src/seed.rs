//! Seed data: the static JSON file that populates an empty database.
//!
//! A seed file is a JSON array of article objects using the camelCase keys
//! `title`, `category`, `author`, `authorUrl`, `publishedOn` and `body`. It
//! can live on disk, behind an HTTP(S) URL, or be the copy compiled into the
//! binary.

use futures::{Stream, StreamExt};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::storage::NewArticle;
use crate::util::{validate_url, UrlValidationError};

/// Largest seed file we are willing to read (10MB).
pub const MAX_SEED_SIZE: usize = 10 * 1024 * 1024;

/// Seed data compiled into the binary, used when nothing else is configured.
pub const BUNDLED_SEED: &[u8] = include_bytes!("../data/hackerIpsum.json");

/// Config/CLI spelling of [`SeedSource::Bundled`].
pub const BUNDLED_SEED_NAME: &str = "bundled";

/// Errors that can occur while loading seed data.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Seed request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Seed request returned HTTP status {0}")]
    HttpStatus(u16),
    #[error("Seed data exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("Seed data is not a valid article list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Seed URL rejected: {0}")]
    Url(#[from] UrlValidationError),
}

/// Where seed data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    Bundled,
    File(PathBuf),
    Url(Url),
}

impl Default for SeedSource {
    fn default() -> Self {
        SeedSource::Bundled
    }
}

impl fmt::Display for SeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedSource::Bundled => f.write_str("bundled seed data"),
            SeedSource::File(path) => write!(f, "{}", path.display()),
            SeedSource::Url(url) => write!(f, "{url}"),
        }
    }
}

impl FromStr for SeedSource {
    type Err = SeedError;

    /// `"bundled"` (or blank) selects the compiled-in seed, `http://` and
    /// `https://` strings become validated URLs, anything else is a file path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.is_empty() || lower == BUNDLED_SEED_NAME {
            Ok(SeedSource::Bundled)
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(SeedSource::Url(validate_url(trimmed)?))
        } else {
            Ok(SeedSource::File(PathBuf::from(trimmed)))
        }
    }
}

/// Load and parse the seed articles from `source`.
///
/// `client` is only used for URL sources.
pub async fn load_seed(
    source: &SeedSource,
    client: &reqwest::Client,
) -> Result<Vec<NewArticle>, SeedError> {
    let articles = match source {
        SeedSource::Bundled => parse_seed(BUNDLED_SEED)?,
        SeedSource::File(path) => parse_seed(&read_seed_file(path).await?)?,
        SeedSource::Url(url) => parse_seed(&fetch_seed_url(client, url).await?)?,
    };

    tracing::info!(source = %source, count = articles.len(), "Loaded seed data");
    Ok(articles)
}

/// Parse a seed JSON document.
pub fn parse_seed(bytes: &[u8]) -> Result<Vec<NewArticle>, SeedError> {
    Ok(serde_json::from_slice(bytes)?)
}

async fn read_seed_file(path: &Path) -> Result<Vec<u8>, SeedError> {
    let io_err = |source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    };

    let metadata = tokio::fs::metadata(path).await.map_err(io_err)?;
    if metadata.len() > MAX_SEED_SIZE as u64 {
        return Err(SeedError::TooLarge {
            limit: MAX_SEED_SIZE,
        });
    }

    tokio::fs::read(path).await.map_err(io_err)
}

async fn fetch_seed_url(client: &reqwest::Client, url: &Url) -> Result<Vec<u8>, SeedError> {
    tracing::debug!(url = %url, "Requesting seed data");
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SeedError::HttpStatus(status.as_u16()));
    }

    read_limited_bytes(response, MAX_SEED_SIZE).await
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, SeedError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(SeedError::TooLarge { limit });
        }
    }

    // Content-Length is optional (chunked responses), so the stream is capped too
    read_limited_stream(response.bytes_stream(), limit).await
}

async fn read_limited_stream<S, B, E>(stream: S, limit: usize) -> Result<Vec<u8>, SeedError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<SeedError>,
{
    let mut stream = std::pin::pin!(stream);
    let mut bytes = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Into::<SeedError>::into)?;
        let chunk = chunk.as_ref();
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(SeedError::TooLarge { limit });
        }
        bytes.extend_from_slice(chunk);
    }

    Ok(bytes)
}
