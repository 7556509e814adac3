use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid partner profile: missing {field}")]
    MissingField { field: &'static str },

    #[error("Invalid redemption host \"{host}\"")]
    InvalidRedemptionHost { host: String },

    #[error("Codec error: {0}")]
    Codec(#[from] ndauth_codec::CodecError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
