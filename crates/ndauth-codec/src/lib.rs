//! Query encoding for the ndauth handshake.
//!
//! This crate provides:
//! - Percent-escaping tuned for query components
//! - A closed parameter value type and an ordered parameter set
//! - Canonical (sorted, flattened, escaped) query string construction
//! - Encoding parameter sets onto URLs and decoding them back out
//!
//! Everything here is pure and infallible on untrusted input; signing lives
//! in `ndauth-crypto`.

mod error;
mod escape;
mod query;
mod url_codec;
mod value;

pub use error::CodecError;
pub use escape::{escape, unescape, QUERY_COMPONENT};
pub use query::{
    join, ArrayEncoding, BoolEncoding, EncoderOptions, KeyCase, QueryComponent, QueryEncoder,
};
pub use url_codec::{decode, decode_query, decode_str, parse_url, UrlCodec};
pub use value::{ParameterValue, Parameters};

pub use url::Url;
