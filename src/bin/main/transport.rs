use std::{
    fmt,
    io::{Read, Write},
};

use base64::{Engine, engine::general_purpose::URL_SAFE};
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use serde::{Deserialize, Serialize};

const DOC_QUERY_KEY: &str = "doc=";

/// Shareable article payload. Unknown fields from other producers are ignored.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub(super) struct Article {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) title: Option<String>,
    #[serde(default)]
    pub(super) content: String,
}

#[derive(Debug)]
pub(super) enum TransportError {
    Base64(base64::DecodeError),
    Gzip(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64(err) => write!(f, "token is not base64url: {err}"),
            Self::Gzip(err) => write!(f, "token payload is not valid gzip: {err}"),
            Self::Json(err) => write!(f, "token payload is not an article: {err}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<base64::DecodeError> for TransportError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64(err)
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Gzip(err)
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Article -> JSON -> gzip -> base64url with `=` written as `.`.
pub(super) fn encode(article: &Article) -> Result<String, TransportError> {
    let json = serde_json::to_vec(article)?;

    let mut gzip = GzEncoder::new(Vec::new(), Compression::default());
    gzip.write_all(&json)?;
    let compressed = gzip.finish()?;

    Ok(URL_SAFE.encode(compressed).replace('=', "."))
}

/// Reverse of [`encode`]. Also accepts a full reader URL carrying `doc=...`.
pub(super) fn decode(token: &str) -> Result<Article, TransportError> {
    let token = token_from_input(token).replace('.', "=");
    let compressed = URL_SAFE.decode(token.as_bytes())?;

    // GzDecoder verifies the trailer CRC and length at end of stream.
    let mut json = Vec::new();
    GzDecoder::new(compressed.as_slice()).read_to_end(&mut json)?;

    Ok(serde_json::from_slice(&json)?)
}

fn token_from_input(input: &str) -> &str {
    let input = input.trim();
    let Some(start) = input.rfind(DOC_QUERY_KEY) else {
        return input;
    };

    let rest = &input[start + DOC_QUERY_KEY.len()..];
    let end = rest.find(['&', '#']).unwrap_or(rest.len());
    &rest[..end]
}
