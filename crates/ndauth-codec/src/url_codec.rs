//! Applying parameter sets to URLs and reading them back out.
//!
//! Neither direction fails: an unparsable URL encodes to itself and decodes
//! to an empty parameter set.

use url::Url;

use crate::error::CodecError;
use crate::escape::unescape;
use crate::query::{join, EncoderOptions, QueryEncoder};
use crate::value::Parameters;

/// Parse a URL string, keeping the offending input in the error.
pub fn parse_url(input: &str) -> Result<Url, CodecError> {
    Url::parse(input).map_err(|source| CodecError::InvalidUrl {
        url: input.to_string(),
        source,
    })
}

/// Encodes parameter sets onto URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlCodec {
    encoder: QueryEncoder,
}

impl UrlCodec {
    pub fn new(options: EncoderOptions) -> Self {
        Self {
            encoder: QueryEncoder::new(options),
        }
    }

    pub fn encoder(&self) -> &QueryEncoder {
        &self.encoder
    }

    /// Append the sorted query components of `parameters` after the URL's
    /// existing query items.
    ///
    /// Existing items are kept byte-for-byte. Components are already escaped
    /// and are written as-is. With no parameters (or nothing to emit) the URL
    /// is returned unchanged.
    pub fn encode(&self, url: &Url, parameters: Option<&Parameters>) -> Url {
        let Some(parameters) = parameters.filter(|p| !p.is_empty()) else {
            return url.clone();
        };
        let components = self.encoder.query_components(parameters);
        if components.is_empty() {
            return url.clone();
        }

        let appended = join(&components);
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{appended}"),
            _ => appended,
        };

        let mut encoded = url.clone();
        encoded.set_query(Some(&query));
        encoded
    }

    /// String form of [`encode`](Self::encode). Input that does not parse as
    /// a URL comes back unchanged.
    pub fn encode_str(&self, url: &str, parameters: Option<&Parameters>) -> String {
        match Url::parse(url) {
            Ok(parsed) => self.encode(&parsed, parameters).into(),
            Err(_) => url.to_string(),
        }
    }
}

/// Read the query items of `url` in the order they appear.
///
/// Keys and values are percent-decoded once and stored as strings. Items
/// without `=` carry no value and are skipped, as are empty items. A key
/// that appears twice keeps its first position and its last value.
///
/// Decoding is flat: `user[a]=1` comes back as the top-level key `user[a]`,
/// and `ids[]=1&ids[]=2` collapses to `ids[]=2`. Re-encoding a decoded set
/// is stable from the second round trip on.
pub fn decode(url: &Url) -> Parameters {
    url.query().map(decode_query).unwrap_or_default()
}

/// [`decode`] for a URL string. Unparsable input decodes to an empty set.
pub fn decode_str(url: &str) -> Parameters {
    Url::parse(url).map(|u| decode(&u)).unwrap_or_default()
}

/// Decode a raw query string (the part after `?`, without the fragment).
pub fn decode_query(query: &str) -> Parameters {
    let mut params = Parameters::new();
    for item in query.split('&').filter(|item| !item.is_empty()) {
        if let Some((key, value)) = item.split_once('=') {
            params.insert(unescape(key), unescape(value));
        }
    }
    params
}
