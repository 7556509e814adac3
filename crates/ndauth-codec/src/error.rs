use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid URL \"{url}\": {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
